//! Monthly and quarterly nutrition reports.

mod dto;
mod error;
pub mod handlers;
pub mod monthly;
pub mod percentages;
pub mod quarterly;

pub use error::ReportError;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::report_routes()
}
