//! Turns raw backend outputs into ranked class predictions.

use super::softmax::softmax;
use super::topk::top_k;
use crate::core::constants::DEFAULT_TOPK;
use crate::core::inference::BackendOutput;
use crate::domain::{BackendResult, ClassificationEntry};
use crate::utils::dict::ClassTable;

/// Softmax plus top-k ranking against a class table.
#[derive(Debug, Clone)]
pub struct Classifier {
    class_table: ClassTable,
    topk: usize,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ClassTable::default(), DEFAULT_TOPK)
    }
}

impl Classifier {
    pub fn new(class_table: ClassTable, topk: usize) -> Self {
        Self { class_table, topk }
    }

    pub fn topk(&self) -> usize {
        self.topk
    }

    pub fn class_table(&self) -> &ClassTable {
        &self.class_table
    }

    /// Ranks `raw` and returns at most `k` entries, most probable first.
    /// Equal probabilities keep the lower output index first.
    pub fn classify(&self, raw: &[f32], k: usize) -> Vec<ClassificationEntry> {
        classify(raw, k, &self.class_table)
    }

    /// Classifies one backend's output with the configured `k`. Empty
    /// outputs become empty results carrying the recorded elapsed time.
    pub fn classify_output(&self, output: &BackendOutput) -> BackendResult {
        BackendResult {
            backend: output.backend,
            entries: self.classify(&output.output.values, self.topk),
            elapsed_seconds: output.output.elapsed_seconds,
        }
    }

    /// Classifies every output, keeping their order.
    pub fn classify_all(&self, outputs: &[BackendOutput]) -> Vec<BackendResult> {
        outputs.iter().map(|o| self.classify_output(o)).collect()
    }
}

fn display_name(raw: &str) -> String {
    raw.replace('_', " ")
}

/// Ranks `raw` against `class_table`; see [`Classifier::classify`].
pub fn classify(raw: &[f32], k: usize, class_table: &ClassTable) -> Vec<ClassificationEntry> {
    if raw.is_empty() {
        return Vec::new();
    }
    let probabilities = softmax(raw);
    top_k(&probabilities, k)
        .into_iter()
        .map(|selected| {
            let (class_id, name) = class_table.resolve(selected.index);
            ClassificationEntry {
                class_id,
                name: display_name(&name),
                probability: selected.score,
                original_index: selected.index,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::inference::RawOutput;
    use crate::domain::BackendId;

    fn table() -> ClassTable {
        ClassTable::parse("n01440764 tench\nn01443537 goldfish\nn01484850 great_white_shark\n")
    }

    #[test]
    fn test_classify_three_logits() {
        let entries = classify(&[2.0, 1.0, 0.1], 2, &table());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].original_index, 0);
        assert_eq!(entries[0].class_id, "n01440764");
        assert_eq!(entries[0].name, "tench");
        assert!((entries[0].probability - 0.659).abs() < 1e-3);
        assert_eq!(entries[1].original_index, 1);
        assert!((entries[1].probability - 0.242).abs() < 1e-3);
    }

    #[test]
    fn test_underscores_become_spaces() {
        let entries = classify(&[0.0, 0.0, 5.0], 1, &table());
        assert_eq!(entries[0].name, "great white shark");
        assert_eq!(entries[0].class_id, "n01484850");
    }

    #[test]
    fn test_indices_beyond_table() {
        let entries = classify(&[0.0, 0.0, 0.0, 9.0], 1, &table());
        assert_eq!(entries[0].class_id, "3");
        assert_eq!(entries[0].name, "class 3");
    }

    #[test]
    fn test_empty_and_short_inputs() {
        assert!(classify(&[], 5, &table()).is_empty());
        assert_eq!(classify(&[1.0, 2.0], 5, &table()).len(), 2);
    }

    #[test]
    fn test_entries_sorted_with_stable_ties() {
        let entries = classify(&[1.0, 3.0, 1.0, 3.0], 4, &ClassTable::default());
        let order: Vec<usize> = entries.iter().map(|e| e.original_index).collect();
        assert_eq!(order, vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_classify_output_keeps_timing() {
        let classifier = Classifier::new(table(), 1);
        assert_eq!(classifier.topk(), 1);
        assert_eq!(classifier.class_table(), &table());
        let output = BackendOutput::new(
            BackendId::Accelerated,
            RawOutput::completed(vec![0.5, 3.0, 0.1], 0.25),
        );
        let result = classifier.classify_output(&output);
        assert_eq!(result.backend, BackendId::Accelerated);
        assert_eq!(result.entries.len(), 1);
        assert_eq!(result.entries[0].name, "goldfish");
        assert_eq!(result.elapsed_seconds, 0.25);

        let absent = BackendOutput::new(BackendId::Portable, RawOutput::absent());
        let result = classifier.classify_output(&absent);
        assert!(result.is_empty());
        assert_eq!(result.elapsed_seconds, 0.0);
    }
}
