//! HTTP surface: form login, session handling, and the authorization gate.

pub mod app;
pub mod config;
pub mod errors;
pub mod middleware;
pub mod routes;
pub mod security;
