//! All statistics of one analysis run

use strokelab_pipeline::record::LabelSchema;
use strokelab_stats::{
    crosstab::Crosstab, frequency::FrequencyTable, kmeans::KMeans, transition::TransitionMatrix,
};

use crate::{
    audit::LabelAudit,
    features::ClusterView,
    schema::{self, Column, STROKE_CATEGORIES},
    table::{Dataset, LabelTable},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Row variable of the cross-tabulation.
    pub crosstab_rows: Column,
    /// Column variable of the cross-tabulation.
    pub crosstab_cols: Column,
    /// Categories whose marginal total is at most this are filtered out.
    pub min_count: u64,
    pub kmeans: KMeans,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            crosstab_rows: Column::Stroke,
            crosstab_cols: Column::Action,
            min_count: 10,
            kmeans: KMeans::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub schema: LabelSchema,
    pub table: LabelTable,
    pub audit: LabelAudit,
    /// Value counts of every schema column, in label order.
    pub distributions: Vec<(Column, FrequencyTable<String>)>,
    /// Cross-tabulation of `options.crosstab_rows` by `options.crosstab_cols`
    /// after the sparsity filter.
    pub crosstab: Crosstab<String, String>,
    /// Stroke transitions over [`STROKE_CATEGORIES`].
    pub transitions: TransitionMatrix<String>,
    pub clusters: ClusterView,
    pub options: AnalysisOptions,
}

impl AnalysisReport {
    /// Computes every statistic over `dataset`.
    ///
    /// Degenerate inputs give empty results rather than errors: an empty
    /// dataset yields empty tables, a column the schema lacks yields an empty
    /// cross-tabulation, and too few videos yield no clustering.
    #[must_use]
    pub fn new(dataset: &Dataset, options: &AnalysisOptions) -> Self {
        let table = LabelTable::new(dataset);
        let audit = LabelAudit::new(&table);
        if audit.malformed > 0 {
            tracing::warn!(
                malformed = audit.malformed,
                expected_parts = dataset.schema.arity(),
                "labels with unexpected part count"
            );
        }

        let distributions = schema::columns(dataset.schema)
            .iter()
            .map(|&column| {
                let values = table.column(column).into_iter().flatten().map(str::to_owned);
                (column, FrequencyTable::from_values(values))
            })
            .collect();

        let pairs = table
            .column_pairs(options.crosstab_rows, options.crosstab_cols)
            .into_iter()
            .map(|(r, c)| (r.to_owned(), c.to_owned()));
        let crosstab = Crosstab::from_pairs(pairs).filter_sparse(options.min_count);
        if crosstab.is_empty() {
            tracing::warn!(
                rows = %options.crosstab_rows,
                cols = %options.crosstab_cols,
                min_count = options.min_count,
                "no category survived the cross-tabulation filter"
            );
        }

        let categories = STROKE_CATEGORIES.map(str::to_owned);
        let strokes = table
            .column(Column::Stroke)
            .into_iter()
            .map(|value| value.map(str::to_owned));
        let transitions = TransitionMatrix::from_sequence(&categories, strokes);

        let clusters = ClusterView::new(dataset.schema, &dataset.videos, &options.kmeans);

        Self {
            schema: dataset.schema,
            table,
            audit,
            distributions,
            crosstab,
            transitions,
            clusters,
            options: *options,
        }
    }

    /// Value counts of `column`, if the schema has it.
    #[must_use]
    pub fn distribution(&self, column: Column) -> Option<&FrequencyTable<String>> {
        self.distributions
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, table)| table)
    }
}

#[cfg(test)]
mod tests {
    use strokelab_pipeline::record::{
        Event, EventCollection, EventVideo, Simplified, Translated,
    };

    use super::*;

    fn video(name: &str, labels: &[&str]) -> EventVideo {
        EventVideo {
            fps: 30.0,
            height: 720,
            width: 1280,
            num_frames: 1800,
            video: name.to_owned(),
            events: labels
                .iter()
                .zip(0..)
                .map(|(label, i)| Event {
                    frame: i * 15,
                    label: (*label).into(),
                    outcome: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_simplified_report() {
        let mut labels = vec!["forehand_drive"; 12];
        labels.extend(["backhand_drive", "forehand_serve", "forehand_", "squatting_drive"]);
        let collection = EventCollection::<Simplified>::new(vec![video("a.mp4", &labels)]);
        let dataset = Dataset::from_collections([collection]);
        let report = AnalysisReport::new(&dataset, &AnalysisOptions::default());

        assert_eq!(report.schema, LabelSchema::Pair);
        assert_eq!(report.audit.with_empty_part, 1);

        let actions = report.distribution(Column::Action).unwrap();
        assert_eq!(actions.entries()[0], ("drive".to_owned(), 14));
        assert_eq!(actions.total(), 15);
        assert!(report.distribution(Column::Negation).is_none());

        assert_eq!(report.crosstab.rows(), ["forehand"]);
        assert_eq!(report.crosstab.cols(), ["drive"]);
        assert_eq!(report.crosstab.total(), 12);

        let fh = "forehand".to_owned();
        let bh = "backhand".to_owned();
        // forehand x12, backhand, forehand x2, squatting
        assert_eq!(report.transitions.count(&fh, &fh), Some(12));
        assert_eq!(report.transitions.count(&fh, &bh), Some(1));
        assert_eq!(report.transitions.count(&bh, &fh), Some(1));
        assert_eq!(report.transitions.probability(&bh, &fh), Some(1.0));
    }

    #[test]
    fn test_empty_dataset_degrades() {
        let dataset = Dataset::from_collections::<Translated, _>([]);
        let report = AnalysisReport::new(&dataset, &AnalysisOptions::default());
        assert!(report.table.is_empty());
        assert!(report.crosstab.is_empty());
        assert_eq!(report.transitions.total(), 0);
        assert!(report.audit.arity.is_empty());
        assert!(report.clusters.clustering.is_none());
        assert_eq!(report.distributions.len(), 3);
    }

    #[test]
    fn test_missing_crosstab_column_degrades() {
        let collection = EventCollection::<Simplified>::new(vec![video("a.mp4", &["forehand_drive"])]);
        let options = AnalysisOptions {
            crosstab_cols: Column::Negation,
            min_count: 0,
            ..AnalysisOptions::default()
        };
        let report = AnalysisReport::new(&Dataset::from_collections([collection]), &options);
        assert!(report.crosstab.is_empty());
    }
}
