//! Web layer for the charging-station gateway.
//!
//! Provides HTTP endpoints for nearby stations, the regional snapshot and
//! the operator roster.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
