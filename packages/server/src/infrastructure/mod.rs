//! Infrastructure layer: wire formats, storage backends and connection plumbing.

pub mod dto;
pub mod registry;
pub mod repository;
pub mod websocket;
