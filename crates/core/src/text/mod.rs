//! Text comparison metrics.

pub mod metrics;
