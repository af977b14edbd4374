use std::collections::BTreeMap;

/// Value counts of a categorical variable.
///
/// Entries are ordered by count, most frequent first; equal counts are
/// ordered by value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<K> {
    entries: Vec<(K, u64)>,
    total: u64,
}

impl<K> Default for FrequencyTable<K> {
    fn default() -> Self {
        Self {
            entries: vec![],
            total: 0,
        }
    }
}

impl<K: Ord> FrequencyTable<K> {
    /// Counts occurrences of each value.
    ///
    /// ```
    /// # use strokelab_stats::frequency::FrequencyTable;
    /// let table = FrequencyTable::from_values([3, 2, 3, 1, 2, 3]);
    /// assert_eq!(table.entries(), [(3, 3), (2, 2), (1, 1)]);
    /// assert_eq!(table.total(), 6);
    /// ```
    #[must_use]
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = K>,
    {
        let mut counts = BTreeMap::<K, u64>::new();
        for value in values {
            *counts.entry(value).or_default() += 1;
        }
        let total = counts.values().sum();
        let mut entries = counts.into_iter().collect::<Vec<_>>();
        // stable: ties stay in key order
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        Self { entries, total }
    }

    #[must_use]
    pub fn get(&self, value: &K) -> u64 {
        self.entries
            .iter()
            .find(|(k, _)| k == value)
            .map_or(0, |(_, count)| *count)
    }
}

impl<K> FrequencyTable<K> {
    #[must_use]
    pub fn entries(&self) -> &[(K, u64)] {
        &self.entries
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Number of distinct values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count of the most frequent value.
    #[must_use]
    pub fn max_count(&self) -> u64 {
        self.entries.first().map_or(0, |(_, count)| *count)
    }
}
