//! # thermolog-protocol
//!
//! Message types and codec for the thermolog device's web interface.
//!
//! This crate defines the HTTP endpoints, request bodies and the JSON
//! readings pushed over the `/ws` WebSocket.

pub mod codec;
pub mod messages;

pub use codec::*;
pub use messages::*;
