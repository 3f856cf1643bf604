//! Integration test harness

mod cli_test;
mod extract_test;
