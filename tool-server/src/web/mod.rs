//! HTTP host for the dispatcher.
//!
//! Exposes the same tools as the stdio server, for clients that would
//! rather speak plain JSON over HTTP.

mod routes;
mod state;

pub use routes::{AppError, create_router};
pub use state::AppState;
