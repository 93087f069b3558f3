//! # Procura Gateway
//!
//! Axum HTTP surface for the e-procurement portal: bearer-token auth for
//! vendors and admins, the REST routes over the tender registry and bid
//! ledger, and the error-to-status mapping.

pub mod auth;
pub mod error;
pub mod extract;
pub mod routes;
pub mod server;

pub use server::{build_router, start, AppState};
