//! Echo endpoint and its client
//!
//! The endpoint is the stub backend of the chat: it replies with whatever
//! message it was sent.

mod client;
mod protocol;
mod server;

pub use client::{EchoClient, EchoError, HttpEchoClient};
pub use server::Server;
