//! Record types for each pipeline stage
//!
//! # Stage Layout
//!
//! ```text
//! index  stage        record                       label schema
//! 0      original     RawExport<Original>          token list (garbled)
//! 1      decoded      RawExport<Decoded>           token list (repaired)
//! 2      reformatted  EventCollection<Reformatted> stroke_negation_action
//! 3      translated   EventCollection<Translated>  stroke_negation_action
//! 4      simplified   EventCollection<Simplified>  stroke_action
//! ```
//!
//! Stage markers are zero-sized; they only exist so that the compiler keeps
//! artifacts of different stages apart. On disk, both wrappers serialize as
//! the bare JSON array they contain.
//!
//! # Serialization
//!
//! ```json
//! [
//!   {
//!     "fps": 30.0,
//!     "height": 720,
//!     "width": 1280,
//!     "num_frames": 5400,
//!     "video": "0000001.mp4",
//!     "events": [{ "frame": 30, "label": "forehand_yes_drive" }]
//!   }
//! ]
//! ```

use std::{fmt, marker::PhantomData};

use serde::{Deserialize, Serialize};

use crate::label::Label;

/// Runtime identifier of a pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageId {
    Original,
    Decoded,
    Reformatted,
    Translated,
    Simplified,
}

impl StageId {
    #[must_use]
    pub const fn index(self) -> u8 {
        match self {
            Self::Original => 0,
            Self::Decoded => 1,
            Self::Reformatted => 2,
            Self::Translated => 3,
            Self::Simplified => 4,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Original => "original",
            Self::Decoded => "decoded",
            Self::Reformatted => "reformatted",
            Self::Translated => "translated",
            Self::Simplified => "simplified",
        }
    }

    /// Label schema of the event collections this stage produces, if any.
    #[must_use]
    pub const fn label_schema(self) -> Option<LabelSchema> {
        match self {
            Self::Original | Self::Decoded => None,
            Self::Reformatted | Self::Translated => Some(LabelSchema::Triple),
            Self::Simplified => Some(LabelSchema::Pair),
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.index(), self.name())
    }
}

/// Column layout of labels at a stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSchema {
    /// `stroke_negation_action`
    Triple,
    /// `stroke_action`
    Pair,
}

impl LabelSchema {
    #[must_use]
    pub const fn arity(self) -> usize {
        match self {
            Self::Triple => 3,
            Self::Pair => 2,
        }
    }

    #[must_use]
    pub const fn from_arity(arity: usize) -> Option<Self> {
        match arity {
            3 => Some(Self::Triple),
            2 => Some(Self::Pair),
            _ => None,
        }
    }
}

pub trait Stage: fmt::Debug + Clone + Copy + Default {
    const ID: StageId;
}

/// A stage whose artifact is an [`EventCollection`].
pub trait EventStage: Stage {
    const SCHEMA: LabelSchema;
}

macro_rules! stage_marker {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
        pub struct $name;

        impl Stage for $name {
            const ID: StageId = StageId::$name;
        }
    };
    ($name:ident, $schema:ident) => {
        stage_marker!($name);

        impl EventStage for $name {
            const SCHEMA: LabelSchema = LabelSchema::$schema;
        }
    };
}

stage_marker!(Original);
stage_marker!(Decoded);
stage_marker!(Reformatted, Triple);
stage_marker!(Translated, Triple);
stage_marker!(Simplified, Pair);

/// An annotation export before reformatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawExport<S> {
    pub videos: Vec<RawVideo>,
    #[serde(skip)]
    stage: PhantomData<S>,
}

impl<S: Stage> RawExport<S> {
    #[must_use]
    pub fn new(videos: Vec<RawVideo>) -> Self {
        Self {
            videos,
            stage: PhantomData,
        }
    }

    /// Moves the videos into a collection tagged with another stage.
    ///
    /// Only stage operations in this crate call this.
    pub(crate) fn into_stage<T: Stage>(self) -> RawExport<T> {
        RawExport::new(self.videos)
    }
}

/// A source video with its annotated action spans.
///
/// Fields other than `url` and `actions` are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawVideo {
    /// Video identifier, the file name of the recording.
    pub url: String,
    #[serde(default)]
    pub actions: Vec<RawAction>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A single annotated span.
///
/// Actions are in annotation order, which is not necessarily temporal order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawAction {
    /// Span start in seconds.
    pub start_id: f64,
    /// Span end in seconds.
    pub end_id: f64,
    #[serde(default)]
    pub label_names: Vec<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Container properties of a source video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(rename = "Video Name")]
    pub video_name: String,
    #[serde(rename = "Width")]
    pub width: i64,
    #[serde(rename = "Height")]
    pub height: i64,
    /// As reported by the container; some report a negative count.
    #[serde(rename = "Frame Count")]
    pub frame_count: i64,
    #[serde(rename = "Frame Rate (FPS)")]
    pub fps: f64,
    #[serde(rename = "Duration (s)", default)]
    pub duration_secs: Option<f64>,
}

/// One entry of the video info artifact.
///
/// Extraction writes an error entry instead of properties when a recording is
/// missing or unreadable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VideoInfoRecord {
    Extracted(VideoInfo),
    Failed {
        #[serde(rename = "Video Name")]
        video_name: String,
        #[serde(rename = "Error")]
        error: String,
    },
}

impl VideoInfoRecord {
    #[must_use]
    pub fn video_name(&self) -> &str {
        match self {
            Self::Extracted(info) => &info.video_name,
            Self::Failed { video_name, .. } => video_name,
        }
    }
}

/// A normalized event collection (stages 2 to 4).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventCollection<S> {
    pub videos: Vec<EventVideo>,
    #[serde(skip)]
    stage: PhantomData<S>,
}

impl<S: EventStage> EventCollection<S> {
    #[must_use]
    pub fn new(videos: Vec<EventVideo>) -> Self {
        Self {
            videos,
            stage: PhantomData,
        }
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.videos.iter().flat_map(|video| &video.events)
    }

    #[must_use]
    pub fn num_events(&self) -> usize {
        self.videos.iter().map(|video| video.events.len()).sum()
    }

    /// Rewrites every label, producing a collection of the next stage.
    pub(crate) fn map_labels<T, F>(mut self, mut f: F) -> EventCollection<T>
    where
        T: EventStage,
        F: FnMut(&Label) -> Label,
    {
        for event in self.videos.iter_mut().flat_map(|video| &mut video.events) {
            event.label = f(&event.label);
        }
        EventCollection::new(self.videos)
    }
}

/// A video with metadata joined in and actions converted to events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventVideo {
    pub fps: f64,
    pub height: i64,
    pub width: i64,
    pub num_frames: i64,
    pub video: String,
    pub events: Vec<Event>,
}

/// An annotated event anchored at a frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Frame index of the span start; may collide with other events.
    pub frame: i64,
    pub label: Label,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_display() {
        assert_eq!(StageId::Original.to_string(), "0_original");
        assert_eq!(Simplified::ID.to_string(), "4_simplified");
        assert_eq!(Translated::SCHEMA, LabelSchema::Triple);
        assert_eq!(Simplified::SCHEMA, LabelSchema::Pair);
    }

    #[test]
    fn test_raw_export_preserves_unknown_fields() {
        let json = r#"[{"url":"0000001.mp4","id":7,"actions":[
            {"start_id":1.0,"end_id":2.0,"label_names":["a","b"],"note":"x"}]}]"#;
        let export: RawExport<Original> = serde_json::from_str(json).unwrap();
        assert_eq!(export.videos.len(), 1);
        assert_eq!(export.videos[0].extra["id"], 7);
        assert_eq!(export.videos[0].actions[0].extra["note"], "x");

        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(value[0]["id"], 7);
        assert_eq!(value[0]["actions"][0]["note"], "x");
    }

    #[test]
    fn test_video_info_failure_entries() {
        let json = r#"[
            {"Video Name":"a.mp4","Width":1280,"Height":720,"Frame Count":300,
             "Frame Rate (FPS)":30.0,"Duration (s)":10.0},
            {"Video Name":"b.mp4","Width":640,"Height":360,"Frame Count":0,
             "Frame Rate (FPS)":0.0,"Duration (s)":null},
            {"Video Name":"c.mp4","Error":"File not found"},
            {"Video Name":"d.mkv","Width":1920,"Height":1080,"Frame Count":-1,
             "Frame Rate (FPS)":25.0,"Duration (s)":-0.04}
        ]"#;
        let records: Vec<VideoInfoRecord> = serde_json::from_str(json).unwrap();
        assert!(matches!(&records[0], VideoInfoRecord::Extracted(info) if info.fps == 30.0));
        assert!(
            matches!(&records[1], VideoInfoRecord::Extracted(info) if info.duration_secs.is_none())
        );
        assert!(matches!(&records[2], VideoInfoRecord::Failed { error, .. } if error == "File not found"));
        assert_eq!(records[2].video_name(), "c.mp4");
        assert!(matches!(&records[3], VideoInfoRecord::Extracted(info) if info.frame_count == -1));
    }

    #[test]
    fn test_event_outcome_is_optional() {
        let event = Event {
            frame: 30,
            label: Label::new("forehand_drive"),
            outcome: None,
        };
        assert_eq!(
            serde_json::to_string(&event).unwrap(),
            r#"{"frame":30,"label":"forehand_drive"}"#
        );

        let with_outcome: Event =
            serde_json::from_str(r#"{"frame":3,"label":"x","outcome":"in"}"#).unwrap();
        assert_eq!(with_outcome.outcome.as_deref(), Some("in"));
    }
}
