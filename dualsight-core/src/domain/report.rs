//! Classification results and the aggregated report handed to rendering or
//! transport layers.

use super::BackendId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One ranked class prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationEntry {
    /// Class identifier from the class table (e.g. an ImageNet synset id).
    pub class_id: String,
    /// Display name with underscores replaced by spaces.
    pub name: String,
    /// Softmax probability in `[0, 1]`.
    pub probability: f32,
    /// Position of this class in the model's output vector.
    pub original_index: usize,
}

/// Ranked predictions and timing for a single backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendResult {
    pub backend: BackendId,
    /// Entries sorted by probability, highest first. Empty when the backend
    /// was unavailable or its forward pass failed.
    pub entries: Vec<ClassificationEntry>,
    pub elapsed_seconds: f64,
}

impl BackendResult {
    /// The top ranked entry, if any.
    pub fn top(&self) -> Option<&ClassificationEntry> {
        self.entries.first()
    }

    /// Whether this backend produced any prediction.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The single prediction selected for primary display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub label: String,
    pub score: f32,
    /// Backend whose top entry was promoted to the headline.
    pub backend: BackendId,
}

/// Merged view over every usable backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedReport {
    /// Absent when no backend produced output.
    pub headline: Option<Headline>,
    /// Usable backends in dispatch order.
    pub per_backend: Vec<BackendResult>,
}

impl AggregatedReport {
    /// Returns `true` when no backend produced a classification.
    pub fn is_empty(&self) -> bool {
        self.headline.is_none() && self.per_backend.is_empty()
    }

    /// Result for a specific backend, if it was usable.
    pub fn backend(&self, backend: BackendId) -> Option<&BackendResult> {
        self.per_backend.iter().find(|r| r.backend == backend)
    }

    /// Serializes the report as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for AggregatedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.headline {
            Some(h) => writeln!(f, "{} ({:.2}%)", h.label, h.score * 100.0)?,
            None => writeln!(f, "no prediction")?,
        }
        if self.per_backend.is_empty() {
            return Ok(());
        }
        writeln!(f, "{:<20} {:>12}  {}", "backend", "time (s)", "top entry")?;
        for result in &self.per_backend {
            let top = result
                .top()
                .map(|e| format!("{} ({:.4})", e.name, e.probability))
                .unwrap_or_default();
            writeln!(
                f,
                "{:<20} {:>12.4}  {}",
                result.backend.display_name(),
                result.elapsed_seconds,
                top
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, probability: f32, index: usize) -> ClassificationEntry {
        ClassificationEntry {
            class_id: format!("n{index:08}"),
            name: name.to_string(),
            probability,
            original_index: index,
        }
    }

    #[test]
    fn test_display_empty_report() {
        let report = AggregatedReport::default();
        assert!(report.is_empty());
        assert_eq!(report.to_string(), "no prediction\n");
    }

    #[test]
    fn test_display_table() {
        let report = AggregatedReport {
            headline: Some(Headline {
                label: "tabby cat".to_string(),
                score: 0.5,
                backend: BackendId::Portable,
            }),
            per_backend: vec![BackendResult {
                backend: BackendId::Portable,
                entries: vec![entry("tabby cat", 0.5, 281)],
                elapsed_seconds: 0.125,
            }],
        };
        let text = report.to_string();
        assert!(text.starts_with("tabby cat (50.00%)"));
        assert!(text.contains("Portable (CPU)"));
        assert!(text.contains("0.1250"));
        assert!(report.backend(BackendId::Accelerated).is_none());
    }

    #[test]
    fn test_json_field_names() {
        let result = BackendResult {
            backend: BackendId::Accelerated,
            entries: vec![entry("goldfish", 0.9, 1)],
            elapsed_seconds: 0.0,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["backend"], "accelerated");
        assert_eq!(value["entries"][0]["original_index"], 1);
        assert_eq!(value["entries"][0]["class_id"], "n00000001");
    }
}
