//! Labels decomposed into positional columns
//!
//! Collections of several partitions are concatenated in the order given.
//! Videos are numbered across the whole concatenation and events within their
//! video, which gives every row a stable `(video_id, event_id)` key.

use strokelab_pipeline::record::{EventCollection, EventStage, EventVideo, LabelSchema};

use crate::schema::{self, Column};

/// Event videos sharing one label schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub schema: LabelSchema,
    pub videos: Vec<EventVideo>,
}

impl Dataset {
    /// Concatenates collections of one stage; the schema is the stage's.
    #[must_use]
    pub fn from_collections<S, I>(collections: I) -> Self
    where
        S: EventStage,
        I: IntoIterator<Item = EventCollection<S>>,
    {
        Self {
            schema: S::SCHEMA,
            videos: collections.into_iter().flat_map(|c| c.videos).collect(),
        }
    }

    /// Wraps videos of unknown origin, detecting the schema from the labels.
    #[must_use]
    pub fn detect(videos: Vec<EventVideo>) -> Option<Self> {
        let labels = videos.iter().flat_map(|v| &v.events).map(|e| &e.label);
        let schema = schema::detect_schema(labels)?;
        Some(Self { schema, videos })
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.videos.iter().map(|v| v.events.len()).sum()
    }
}

/// One event's label split into parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRow {
    pub video_id: usize,
    pub event_id: usize,
    pub parts: Vec<String>,
}

impl LabelRow {
    #[must_use]
    pub fn has_empty_part(&self) -> bool {
        self.parts.iter().any(String::is_empty)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTable {
    schema: LabelSchema,
    rows: Vec<LabelRow>,
}

impl LabelTable {
    #[must_use]
    pub fn new(dataset: &Dataset) -> Self {
        let rows = dataset
            .videos
            .iter()
            .enumerate()
            .flat_map(|(video_id, video)| {
                video
                    .events
                    .iter()
                    .enumerate()
                    .map(move |(event_id, event)| LabelRow {
                        video_id,
                        event_id,
                        parts: event.label.parts().map(str::to_owned).collect(),
                    })
            })
            .collect();
        Self {
            schema: dataset.schema,
            rows,
        }
    }

    #[must_use]
    pub fn schema(&self) -> LabelSchema {
        self.schema
    }

    #[must_use]
    pub fn rows(&self) -> &[LabelRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of `column` in row order.
    ///
    /// Values are whitespace-trimmed. A value is `None` when the label has no
    /// part at the column's position or the trimmed part is empty; a column
    /// the schema lacks is entirely `None`.
    #[must_use]
    pub fn column(&self, column: Column) -> Vec<Option<&str>> {
        let index = schema::column_index(self.schema, column);
        self.rows
            .iter()
            .map(|row| {
                let part = row.parts.get(index?)?.trim();
                (!part.is_empty()).then_some(part)
            })
            .collect()
    }

    /// `(row, col)` value pairs of the rows where both columns are present.
    #[must_use]
    pub fn column_pairs(&self, row: Column, col: Column) -> Vec<(&str, &str)> {
        self.column(row)
            .into_iter()
            .zip(self.column(col))
            .filter_map(|(r, c)| Some((r?, c?)))
            .collect()
    }
}
