//! HTTP service for ID generation.
//!
//! ## Structure
//!
//! - [`handler`] - axum routes and the bench loop.
//! - [`state`] - generators shared by every request (`AppState`).
//! - [`error`] - `ApiError` and its mapping onto HTTP statuses.

pub mod error;
pub mod handler;
pub mod state;
