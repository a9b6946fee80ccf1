//! Unit tests for deno-provision
//!
//! These tests use fake ports and run fast without touching a real target.

mod helpers;
