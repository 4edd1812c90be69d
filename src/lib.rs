//! Portfolio command center for the Nusantara Group holding company.
//!
//! The seed dataset is resident in memory; every page is recomputed from it
//! on request and served as HTML or as a JSON view model.

pub mod config;
pub mod filter;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod model;
pub mod seed;
pub mod server;
pub mod session;
pub mod views;
