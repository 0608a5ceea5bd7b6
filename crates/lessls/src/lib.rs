// lib.rs - LESS language server library.
//
// main.rs only parses arguments and starts the server from `backend`;
// everything else lives here so benches/ and tests/ can reach it.

pub mod backend;
pub mod cache;
pub mod config;
pub mod document;
pub mod fs;
pub mod handlers;
pub mod path;
pub mod scanner;
pub mod state;
pub mod symbols;
pub mod syntax;
// test_utils is available in test builds and when the `test-support` feature is enabled.
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
