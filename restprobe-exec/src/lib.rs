#![forbid(unsafe_code)]

//! Blocking HTTP transport for restprobe method calls.
//!
//! This crate is intentionally thin; schema parsing and call execution live
//! in `restprobe-core` behind the `Transport` seam.

pub mod http;

pub use crate::http::ReqwestTransport;
