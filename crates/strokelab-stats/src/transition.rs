/// Empirical transition probabilities between consecutive observations.
///
/// Categories form a closed set fixed up front. Each observation `i` is
/// paired with observation `i + 1`; a pair is counted only when both sides
/// are present and belong to the set. Each row of counts is normalized to sum
/// to 1 and rounded to two decimals. A row with no observed transitions is
/// all zeros.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionMatrix<K> {
    categories: Vec<K>,
    /// `counts[from][to]`
    counts: Vec<Vec<u64>>,
    /// `probabilities[from][to]`
    probabilities: Vec<Vec<f64>>,
}

impl<K> TransitionMatrix<K>
where
    K: PartialEq + Clone,
{
    #[must_use]
    pub fn from_sequence<I>(categories: &[K], sequence: I) -> Self
    where
        I: IntoIterator<Item = Option<K>>,
    {
        let n = categories.len();
        let mut counts = vec![vec![0_u64; n]; n];

        let mut prev: Option<usize> = None;
        for item in sequence {
            let current = item.and_then(|value| categories.iter().position(|c| *c == value));
            if let (Some(from), Some(to)) = (prev, current) {
                counts[from][to] += 1;
            }
            prev = current;
        }

        let probabilities = counts.iter().map(|row| normalize_row(row)).collect();

        Self {
            categories: categories.to_vec(),
            counts,
            probabilities,
        }
    }

    #[must_use]
    pub fn count(&self, from: &K, to: &K) -> Option<u64> {
        let (f, t) = self.index_pair(from, to)?;
        Some(self.counts[f][t])
    }

    #[must_use]
    pub fn probability(&self, from: &K, to: &K) -> Option<f64> {
        let (f, t) = self.index_pair(from, to)?;
        Some(self.probabilities[f][t])
    }

    fn index_pair(&self, from: &K, to: &K) -> Option<(usize, usize)> {
        let f = self.categories.iter().position(|c| c == from)?;
        let t = self.categories.iter().position(|c| c == to)?;
        Some((f, t))
    }
}

impl<K> TransitionMatrix<K> {
    #[must_use]
    pub fn categories(&self) -> &[K] {
        &self.categories
    }

    #[must_use]
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    #[must_use]
    pub fn probabilities(&self) -> &[Vec<f64>] {
        &self.probabilities
    }

    /// Number of counted transitions.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }
}

#[expect(clippy::cast_precision_loss)]
fn normalize_row(row: &[u64]) -> Vec<f64> {
    let sum = row.iter().sum::<u64>();
    if sum == 0 {
        return vec![0.0; row.len()];
    }
    row.iter()
        .map(|&count| round2(count as f64 / sum as f64))
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
