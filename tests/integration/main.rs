//! Integration tests for Dataset-Mirror
//!
//! These tests use wiremock to stand in for the open-data portal and a
//! `MemoryStore` for the bucket, and drive the whole pipeline end-to-end.

mod pipeline_tests;
