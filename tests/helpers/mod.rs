// ABOUTME: Test helper module exports
// ABOUTME: HTTP request builders for exercising Axum routers in tests

#![allow(dead_code)]

pub mod axum_test;
