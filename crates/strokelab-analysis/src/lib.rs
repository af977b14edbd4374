//! Categorical analysis of normalized annotation labels
//!
//! This crate turns event collections produced by the label pipeline into
//! reports:
//!
//! 1. **Load** ([`table::Dataset`]): concatenate collections sharing one label schema
//! 2. **Decompose** ([`table::LabelTable`]): split labels into positional columns
//!    ([`schema::Column`])
//! 3. **Audit** ([`audit`]): label arity histogram and labels with empty parts
//! 4. **Aggregate** ([`report::AnalysisReport`]): value counts per column, a
//!    filtered cross-tabulation, the stroke transition matrix and per-video
//!    clusters ([`features`])
//!
//! Every step tolerates malformed labels. Missing parts become missing values
//! and are left out of the statistics instead of failing the run.
//!
//! # Example
//!
//! ```
//! use strokelab_analysis::{
//!     report::{AnalysisOptions, AnalysisReport},
//!     schema::Column,
//!     table::Dataset,
//! };
//! use strokelab_pipeline::record::{Event, EventCollection, EventVideo, Simplified};
//!
//! let events = ["forehand_drive", "backhand_drive", "forehand_serve"]
//!     .into_iter()
//!     .zip(0..)
//!     .map(|(label, frame)| Event { frame, label: label.into(), outcome: None })
//!     .collect();
//! let video = EventVideo {
//!     fps: 30.0,
//!     height: 720,
//!     width: 1280,
//!     num_frames: 900,
//!     video: "0000001.mp4".to_owned(),
//!     events,
//! };
//! let dataset = Dataset::from_collections([EventCollection::<Simplified>::new(vec![video])]);
//! let report = AnalysisReport::new(&dataset, &AnalysisOptions::default());
//!
//! let actions = report.distribution(Column::Action).unwrap();
//! assert_eq!(actions.get(&"drive".to_owned()), 2);
//! ```

pub mod audit;
pub mod features;
pub mod report;
pub mod schema;
pub mod table;
