//! Route handlers for the HTTP API.

pub mod config;
pub mod health;
pub mod rows;
