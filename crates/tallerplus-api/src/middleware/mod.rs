//! # Middleware Stack
//!
//! - `metrics`: per-request counter and latency histogram.
//!
//! Bearer-token authentication lives in `crate::auth`, next to the token
//! type it verifies.

pub mod metrics;
