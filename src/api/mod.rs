//! Trends API boundary
//!
//! `TrendsApi` is the seam between the engine and the REST service. The
//! engine only ever talks to the trait; `HttpTrendsApi` is the production
//! implementation over reqwest.

pub mod client;

pub use client::{HttpTrendsApi, TrendsApi};
