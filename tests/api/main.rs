//! HTTP API integration tests.
//!
//! Each test gets a throwaway SQLite database and photo directory in a
//! tempdir. Vision provider paths run against an in-process mock server.
//!
//! Run with: cargo test --test api


mod analysis_tests;
mod auth_tests;
mod photo_tests;
mod session_tests;
