//! Integration tests for the lending server

mod api_tests;
mod common;
mod payment_gateway;
