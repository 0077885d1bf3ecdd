//! Top-k selection over classifier probability rows.

/// Top-k classes of one probability row, best first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TopkResult {
    /// Class indexes, highest score first.
    pub indexes: Vec<usize>,
    /// Scores parallel to `indexes`.
    pub scores: Vec<f32>,
}

impl TopkResult {
    /// The best `(index, score)` pair, if the row was non-empty.
    pub fn best(&self) -> Option<(usize, f32)> {
        Some((*self.indexes.first()?, *self.scores.first()?))
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indexes
            .iter()
            .copied()
            .zip(self.scores.iter().copied())
    }
}

/// A processor for extracting the top-k classes from probability rows.
///
/// Sorting is stable, so equal scores keep ascending index order and the
/// first entry always agrees with a lowest-index-wins arg-max.
#[derive(Debug, Clone, Copy)]
pub struct Topk {
    k: usize,
}

impl Topk {
    /// Creates a processor keeping `k` classes (at least one).
    pub fn new(k: usize) -> Self {
        Self { k: k.max(1) }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    /// Extracts the top-k classes of a single row.
    ///
    /// # Arguments
    ///
    /// * `row` - Scores for every class of one prediction.
    ///
    /// # Returns
    ///
    /// * `TopkResult` - At most `k` entries; empty for an empty row.
    pub fn process_row(&self, row: &[f32]) -> TopkResult {
        let mut indexed_scores: Vec<(usize, f32)> = row.iter().copied().enumerate().collect();

        // Sort by score in descending order
        indexed_scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let (indexes, scores) = indexed_scores.into_iter().take(self.k).unzip();
        TopkResult { indexes, scores }
    }

    /// Processes every row of a batch.
    pub fn process(&self, rows: &[Vec<f32>]) -> Vec<TopkResult> {
        rows.iter().map(|row| self.process_row(row)).collect()
    }
}

impl Default for Topk {
    fn default() -> Self {
        Self::new(crate::core::constants::DEFAULT_TOPK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topk_orders_descending() {
        let topk = Topk::new(2);
        let results = topk.process(&[vec![0.1, 0.8, 0.1], vec![0.7, 0.2, 0.1]]);
        assert_eq!(results[0].indexes, vec![1, 0]);
        assert_eq!(results[1].indexes, vec![0, 1]);
        assert_eq!(results[1].scores, vec![0.7, 0.2]);
    }

    #[test]
    fn test_topk_ties_keep_lowest_index_first() {
        let result = Topk::new(3).process_row(&[0.2, 0.4, 0.4, 0.0]);
        assert_eq!(result.indexes, vec![1, 2, 0]);
        assert_eq!(result.best(), Some((1, 0.4)));
    }

    #[test]
    fn test_topk_k_larger_than_classes() {
        let result = Topk::new(5).process_row(&[0.1, 0.8]);
        assert_eq!(result.indexes.len(), 2);
    }

    #[test]
    fn test_topk_zero_k_keeps_one() {
        assert_eq!(Topk::new(0).k(), 1);
    }

    #[test]
    fn test_topk_empty_row() {
        let result = Topk::default().process_row(&[]);
        assert!(result.indexes.is_empty());
        assert_eq!(result.best(), None);
    }
}
