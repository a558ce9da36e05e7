//! Merges per-backend results into a single report.

use crate::domain::{AggregatedReport, BackendResult, Headline};

/// Builds the report from results in dispatch order.
///
/// Backends without entries are dropped. The headline is the top entry of
/// the first remaining backend; when nothing remains the report has no
/// headline and no per-backend results.
pub fn aggregate(results: Vec<BackendResult>) -> AggregatedReport {
    let per_backend: Vec<BackendResult> = results.into_iter().filter(|r| !r.is_empty()).collect();

    let headline = per_backend.iter().find_map(|result| {
        result.top().map(|top| Headline {
            label: top.name.clone(),
            score: top.probability,
            backend: result.backend,
        })
    });

    AggregatedReport {
        headline,
        per_backend,
    }
}
