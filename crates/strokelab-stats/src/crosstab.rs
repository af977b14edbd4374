use std::collections::{BTreeMap, BTreeSet};

/// A contingency table of co-occurrence counts between two categorical
/// variables.
///
/// Row and column categories are sorted ascending. Only categories that occur
/// in at least one pair appear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crosstab<R, C> {
    rows: Vec<R>,
    cols: Vec<C>,
    /// `counts[row][col]`
    counts: Vec<Vec<u64>>,
}

impl<R, C> Default for Crosstab<R, C> {
    fn default() -> Self {
        Self {
            rows: vec![],
            cols: vec![],
            counts: vec![],
        }
    }
}

impl<R, C> Crosstab<R, C>
where
    R: Ord + Clone,
    C: Ord + Clone,
{
    /// Counts each `(row, col)` pair.
    #[must_use]
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (R, C)>,
    {
        let mut cells = BTreeMap::<(R, C), u64>::new();
        for pair in pairs {
            *cells.entry(pair).or_default() += 1;
        }

        let row_index = cells
            .keys()
            .map(|(r, _)| r.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, r)| (r, i))
            .collect::<BTreeMap<_, _>>();
        let col_index = cells
            .keys()
            .map(|(_, c)| c.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, i))
            .collect::<BTreeMap<_, _>>();

        let mut counts = vec![vec![0; col_index.len()]; row_index.len()];
        for ((r, c), count) in &cells {
            counts[row_index[r]][col_index[c]] = *count;
        }

        Self {
            rows: row_index.into_keys().collect(),
            cols: col_index.into_keys().collect(),
            counts,
        }
    }

    #[must_use]
    pub fn get(&self, row: &R, col: &C) -> u64 {
        match (self.rows.binary_search(row), self.cols.binary_search(col)) {
            (Ok(r), Ok(c)) => self.counts[r][c],
            _ => 0,
        }
    }

    /// Drops rows and columns whose total does not exceed `min_count`.
    ///
    /// Removing a row lowers column totals and vice versa, so totals are
    /// recomputed and the filter repeated until nothing changes. Every row and
    /// column of the result has a total greater than `min_count`.
    ///
    /// ```
    /// # use strokelab_stats::crosstab::Crosstab;
    /// let mut pairs = vec![("forehand", "drive"); 12];
    /// pairs.push(("forehand", "hook"));
    /// pairs.push(("squatting", "drive"));
    /// let table = Crosstab::from_pairs(pairs).filter_sparse(10);
    /// assert_eq!(table.rows(), ["forehand"]);
    /// assert_eq!(table.cols(), ["drive"]);
    /// assert_eq!(table.total(), 12);
    /// ```
    #[must_use]
    pub fn filter_sparse(mut self, min_count: u64) -> Self {
        loop {
            let keep_rows = self
                .row_totals()
                .into_iter()
                .map(|total| total > min_count)
                .collect::<Vec<_>>();
            let keep_cols = self
                .col_totals()
                .into_iter()
                .map(|total| total > min_count)
                .collect::<Vec<_>>();
            if keep_rows.iter().all(|&k| k) && keep_cols.iter().all(|&k| k) {
                return self;
            }
            self = self.retain(&keep_rows, &keep_cols);
        }
    }

    fn retain(self, keep_rows: &[bool], keep_cols: &[bool]) -> Self {
        let cols = self
            .cols
            .into_iter()
            .zip(keep_cols)
            .filter_map(|(c, &keep)| keep.then_some(c))
            .collect();
        let (rows, counts) = self
            .rows
            .into_iter()
            .zip(self.counts)
            .zip(keep_rows)
            .filter_map(|(row, &keep)| keep.then_some(row))
            .map(|(r, counts)| {
                let counts = counts
                    .into_iter()
                    .zip(keep_cols)
                    .filter_map(|(count, &keep)| keep.then_some(count))
                    .collect::<Vec<_>>();
                (r, counts)
            })
            .unzip();
        Self { rows, cols, counts }
    }
}

impl<R, C> Crosstab<R, C> {
    #[must_use]
    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    #[must_use]
    pub fn cols(&self) -> &[C] {
        &self.cols
    }

    /// Counts indexed as `[row][col]`.
    #[must_use]
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    #[must_use]
    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    #[must_use]
    pub fn col_totals(&self) -> Vec<u64> {
        (0..self.cols.len())
            .map(|c| self.counts.iter().map(|row| row[c]).sum())
            .collect()
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Whether no cell survived.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.cols.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_marginals() {
        let table = Crosstab::from_pairs([
            ("forehand", "drive"),
            ("forehand", "drive"),
            ("forehand", "flip"),
            ("backhand", "flip"),
        ]);
        assert_eq!(table.rows(), ["backhand", "forehand"]);
        assert_eq!(table.cols(), ["drive", "flip"]);
        assert_eq!(table.counts(), [vec![0, 1], vec![2, 1]]);
        assert_eq!(table.row_totals(), [1, 3]);
        assert_eq!(table.col_totals(), [2, 2]);
        assert_eq!(table.total(), 4);
        assert_eq!(table.max_count(), 2);
        assert_eq!(table.get(&"backhand", &"drive"), 0);
        assert_eq!(table.get(&"unknown", &"drive"), 0);
    }

    #[test]
    fn test_empty_table() {
        let table = Crosstab::<String, String>::from_pairs([]);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
        assert!(table.filter_sparse(10).is_empty());
    }

    #[test]
    fn test_filter_repeats_until_stable() {
        // "b" survives the first pass (total 11) but drops below the threshold
        // once the sparse column "y" is removed.
        let mut pairs = vec![("a", "x"); 20];
        pairs.extend(vec![("b", "x"); 3]);
        pairs.extend(vec![("b", "y"); 8]);
        let table = Crosstab::from_pairs(pairs).filter_sparse(10);

        assert_eq!(table.rows(), ["a"]);
        assert_eq!(table.cols(), ["x"]);
        for total in table.row_totals().into_iter().chain(table.col_totals()) {
            assert!(total > 10);
        }
    }

    #[test]
    fn test_filter_can_empty_the_table() {
        let table = Crosstab::from_pairs([("a", "x"), ("b", "y")]).filter_sparse(10);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let table = Crosstab::from_pairs([("a", "x"), ("b", "y")]);
        assert_eq!(table.clone().filter_sparse(0), table);
    }
}
