//! Chat relay
//!
//! A conversation controller for chat front ends, and the proxy that relays
//! its conversations to the Anthropic Messages API with server-held
//! credentials.

pub mod api;
pub mod config;
pub mod conversation;
pub mod llm;
pub mod proxy;
