pub mod entity;
pub mod error;
pub mod message;
pub mod port;

#[cfg(feature = "test-utils")]
pub mod testing;
