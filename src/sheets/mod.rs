//! Google Sheets API v4 access for the spreadsheet-backed roster.
//!
//! Modules:
//! - auth: service-account JWT grant and token cache
//! - client: `spreadsheets.values` get / update / append
//! - types: credential and payload types

pub mod auth;
pub mod client;
pub mod types;

use crate::error::AppError;

/// Convert any displayable error into `AppError::Storage`.
pub(crate) fn sheets_err(e: impl std::fmt::Display) -> AppError {
    AppError::Storage(e.to_string())
}
