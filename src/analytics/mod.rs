//! Request analytics: the append-only gateway request log and its report.

pub mod logger;
pub mod reporter;
