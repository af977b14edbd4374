//! Label validity audits

use strokelab_stats::frequency::FrequencyTable;

use crate::table::{LabelRow, LabelTable};

/// Data quality summary of a label table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelAudit {
    /// Part count of every label.
    pub arity: FrequencyTable<usize>,
    /// Labels whose part count differs from the schema's.
    pub malformed: usize,
    /// Labels with at least one empty part.
    pub with_empty_part: usize,
}

impl LabelAudit {
    #[must_use]
    pub fn new(table: &LabelTable) -> Self {
        let expected = table.schema().arity();
        let arity = FrequencyTable::from_values(table.rows().iter().map(|row| row.parts.len()));
        let malformed = table
            .rows()
            .iter()
            .filter(|row| row.parts.len() != expected)
            .count();
        Self {
            arity,
            malformed,
            with_empty_part: empty_part_rows(table).count(),
        }
    }
}

/// Rows whose label has at least one empty part, in table order.
pub fn empty_part_rows(table: &LabelTable) -> impl Iterator<Item = &LabelRow> {
    table.rows().iter().filter(|row| row.has_empty_part())
}

#[cfg(test)]
mod tests {
    use strokelab_pipeline::record::{Event, EventCollection, EventVideo, Simplified};

    use super::*;
    use crate::table::Dataset;

    fn table(labels: &[&str]) -> LabelTable {
        let events = labels
            .iter()
            .map(|label| Event {
                frame: 0,
                label: (*label).into(),
                outcome: None,
            })
            .collect();
        let video = EventVideo {
            fps: 25.0,
            height: 480,
            width: 640,
            num_frames: 100,
            video: "a.mp4".to_owned(),
            events,
        };
        let collection = EventCollection::<Simplified>::new(vec![video]);
        LabelTable::new(&Dataset::from_collections([collection]))
    }

    #[test]
    fn test_empty_part_rows_iff_any_part_empty() {
        let table = table(&["forehand_drive", "forehand_", "_drive", "", "a__b", "backhand_flip"]);
        let ids = empty_part_rows(&table)
            .map(|row| row.event_id)
            .collect::<Vec<_>>();
        assert_eq!(ids, [1, 2, 3, 4]);
    }

    #[test]
    fn test_audit_summary() {
        let table = table(&["forehand_drive", "forehand_no_drive", "", "backhand_flip"]);
        let audit = LabelAudit::new(&table);
        assert_eq!(audit.arity.entries(), [(2, 2), (1, 1), (3, 1)]);
        assert_eq!(audit.malformed, 2);
        assert_eq!(audit.with_empty_part, 1);
    }
}
