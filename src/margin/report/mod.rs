pub mod chart;
pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod reconcile;

pub use error::{ReportError, Result};
