//! MessageLog backends
//!
//! Concrete implementations of the domain's `MessageLog` trait. Use cases depend on
//! the trait only, never on these types.

pub mod file;
pub mod inmemory;

pub use file::FileMessageLog;
pub use inmemory::InMemoryMessageLog;
