//! Request-log reporter: per-operation aggregation for `glycowise stats`.

use std::collections::HashMap;
use std::path::Path;

use crate::analytics::logger::{self, Operation, Outcome, RequestLogEntry};

// ---------------------------------------------------------------------------
// Aggregated stats
// ---------------------------------------------------------------------------

/// Summary statistics for `glycowise stats`.
#[derive(Debug, Default)]
pub struct Stats {
    pub total_requests: usize,
    pub operation_stats: Vec<OperationStat>,
}

/// Aggregated numbers for one gateway operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationStat {
    pub operation: Operation,
    pub count: usize,
    pub ok: usize,
    pub fallback: usize,
    pub errors: usize,
    pub avg_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl OperationStat {
    /// Share of calls that did not end in a transport error, in percent.
    pub fn success_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            ((self.count - self.errors) as f64 / self.count as f64) * 100.0
        }
    }
}

// ---------------------------------------------------------------------------
// Stats computation
// ---------------------------------------------------------------------------

/// Compute stats from the log at `path`, optionally limited to the last
/// `days` days.
pub fn compute_stats(path: &Path, days: Option<u32>) -> Stats {
    let entries = logger::read_entries_since_days(path, days);
    build_stats(&entries)
}

fn build_stats(entries: &[RequestLogEntry]) -> Stats {
    let mut by_operation: HashMap<Operation, Vec<&RequestLogEntry>> = HashMap::new();
    for entry in entries {
        by_operation.entry(entry.operation).or_default().push(entry);
    }

    let mut operation_stats: Vec<OperationStat> = by_operation
        .into_iter()
        .map(|(operation, group)| {
            let count = group.len();
            let total_latency: u64 = group.iter().map(|e| e.latency_ms).sum();
            OperationStat {
                operation,
                count,
                ok: group.iter().filter(|e| e.outcome == Outcome::Ok).count(),
                fallback: group
                    .iter()
                    .filter(|e| e.outcome == Outcome::Fallback)
                    .count(),
                errors: group.iter().filter(|e| e.outcome == Outcome::Error).count(),
                avg_latency_ms: total_latency / count as u64,
                max_latency_ms: group.iter().map(|e| e.latency_ms).max().unwrap_or(0),
            }
        })
        .collect();

    // Busiest first, name as tie-breaker for stable output
    operation_stats.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.operation.as_str().cmp(b.operation.as_str()))
    });

    Stats {
        total_requests: entries.len(),
        operation_stats,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(operation: Operation, outcome: Outcome, latency_ms: u64) -> RequestLogEntry {
        RequestLogEntry {
            timestamp: "2026-03-01T10:00:00+00:00".to_string(),
            operation,
            outcome,
            latency_ms,
            model: "gpt-3.5-turbo".to_string(),
            error: None,
        }
    }

    #[test]
    fn empty_log_has_no_stats() {
        let stats = build_stats(&[]);
        assert_eq!(stats.total_requests, 0);
        assert!(stats.operation_stats.is_empty());
    }

    #[test]
    fn groups_by_operation_and_outcome() {
        let entries = vec![
            entry(Operation::AssessRisk, Outcome::Ok, 1000),
            entry(Operation::AssessRisk, Outcome::Fallback, 2000),
            entry(Operation::AssessRisk, Outcome::Error, 3000),
            entry(Operation::AdviseDiet, Outcome::Ok, 500),
        ];
        let stats = build_stats(&entries);
        assert_eq!(stats.total_requests, 4);
        assert_eq!(stats.operation_stats.len(), 2);

        let risk = &stats.operation_stats[0];
        assert_eq!(risk.operation, Operation::AssessRisk);
        assert_eq!(risk.count, 3);
        assert_eq!(risk.ok, 1);
        assert_eq!(risk.fallback, 1);
        assert_eq!(risk.errors, 1);
        assert_eq!(risk.avg_latency_ms, 2000);
        assert_eq!(risk.max_latency_ms, 3000);
        assert!((risk.success_pct() - 66.666).abs() < 0.01);

        let diet = &stats.operation_stats[1];
        assert_eq!(diet.operation, Operation::AdviseDiet);
        assert_eq!(diet.success_pct(), 100.0);
    }

    #[test]
    fn ties_are_ordered_by_name() {
        let entries = vec![
            entry(Operation::AdviseExercise, Outcome::Ok, 10),
            entry(Operation::AdviseDiet, Outcome::Ok, 10),
        ];
        let stats = build_stats(&entries);
        assert_eq!(stats.operation_stats[0].operation, Operation::AdviseDiet);
        assert_eq!(stats.operation_stats[1].operation, Operation::AdviseExercise);
    }
}
