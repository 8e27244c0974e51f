//! Daily accumulation and derived progress reports.

pub mod achievements;
pub mod daily;
pub mod report;
