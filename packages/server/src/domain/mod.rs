//! Domain layer for the chat relay.
//!
//! This module contains the message and connection models together with the
//! traits the relay core depends on, independent of WebSocket or storage details.

pub mod connection;
pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use connection::ConnectionSink;
pub use entity::ChatMessage;
pub use error::{DeliveryError, MessageLogError};
pub use factory::ConnectionIdFactory;
pub use repository::MessageLog;
pub use value_object::ConnectionId;
