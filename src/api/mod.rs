//! REST gateway for the grocery items API.
//!
//! This module provides the `ItemGateway` trait, the seam between the
//! coordinators and the wire, and `HttpItemGateway`, its reqwest-backed
//! implementation speaking to the four CRUD endpoints of the remote store.
//!
//! The gateway is a pure boundary: it performs no retries and never
//! interprets failures, it only maps them into `GatewayError` and forwards
//! them untouched.

pub mod client;
pub mod error;

pub use client::{HttpItemGateway, ItemGateway};
pub use error::GatewayError;
