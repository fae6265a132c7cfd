//! Minimal STOMP 1.2 client over `tokio-tungstenite`.
//!
//! Covers what a subscribe-only consumer needs: CONNECT with a bearer
//! token, heart-beat negotiation, SUBSCRIBE, MESSAGE/ERROR delivery and a
//! fixed-delay reconnect loop.

mod client;
mod connection;
mod frame;
mod types;

pub use client::{StompChannelFactory, StompClient};
pub use frame::{decode_all, Frame, FrameError};
