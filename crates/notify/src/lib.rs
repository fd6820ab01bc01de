//! # fcm-notify
//!
//! Firebase Cloud Messaging channel: recipient batching, HTTP submission and
//! failure signalling on top of the ports defined in `fcm-core`.

pub mod chunk;
pub mod fcm;
pub mod sink;
