//! Core library for the margin-report command line application.
//!
//! The library joins a marketplace sales export with a product reference table,
//! computes per-product profit and sorts products into profitability tiers.
//! Table readers live under [`margin::report::io`], the data representations
//! inside [`margin::report::model`], the join in [`margin::report::reconcile`],
//! the profit aggregation and tiering in [`margin::report::classify`], and the
//! end-to-end orchestration under [`margin::report::pipeline`].

pub mod margin;

pub use margin::report::{
    ReportError, Result, chart, classify, config, error, export, io, model, pipeline, reconcile,
};
