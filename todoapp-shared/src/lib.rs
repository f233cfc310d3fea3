//! # Todo App Shared Library
//!
//! Types, persistence and authentication primitives used by the Todo App
//! API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, JWT tokens, the auth gate and the ownership guard
//! - `db`: Connection pool and migrations
//! - `models`: Database models and their queries
//! - `store`: Persistence traits injected into request handlers

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

