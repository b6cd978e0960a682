//! # API Route Modules
//!
//! - `auth`: `POST /auth/login`, the only public write endpoint.
//! - `clients`: client CRUD under `/clients`, behind the bearer token.
//!   The router in `lib.rs` applies the auth middleware to this group.

pub mod auth;
pub mod clients;
