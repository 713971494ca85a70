//! # estate API
//!
//! JSON REST surface over a loaded [`EstateContext`](estate_storage::EstateContext).

pub mod rest;

pub use rest::RestApi;
