//! Shared utilities for the Parley server and client.

pub mod logger;
pub mod time;
