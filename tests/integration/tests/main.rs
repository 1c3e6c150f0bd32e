//! End-to-End Integration Tests
//!
//! These tests run the keeps suite and the HTTP client against an
//! in-process mock server.

mod auth;
mod common;
