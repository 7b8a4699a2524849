//! Arbor Daemon - HTTP surface for the registry and resolver
//!
//! Exposes the producer mutation surface (create / add documents /
//! activate / retire app deployments) and the persisted-document
//! resolution endpoints consumed at request time.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;
