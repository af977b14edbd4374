//! Staged label normalization for sports-video annotation exports
//!
//! Raw annotation exports pass through four stages, each of which persists its
//! result as a separate artifact before the next one runs:
//!
//! 1. **Decode** ([`codec`]): repair mojibake in raw label tokens
//! 2. **Reformat** ([`reformat`]): join per-video metadata and convert action
//!    start times to frame indices
//! 3. **Translate** ([`vocabulary`]): map label tokens to the canonical vocabulary
//! 4. **Simplify** ([`simplify`]): fold the 3-part label into a 2-part label
//!
//! The stage a collection belongs to is part of its type (see [`record`]), so a
//! translated collection can never be handed to a stage that expects a
//! reformatted one.
//!
//! # Example
//!
//! ```
//! use strokelab_pipeline::{
//!     label::Label,
//!     simplify::MergeRule,
//!     vocabulary::Vocabulary,
//! };
//!
//! let vocabulary = Vocabulary::table_tennis();
//! let translated = vocabulary.translate_label(&Label::new("正手_是_拉"));
//! assert_eq!(translated.as_str(), "forehand_yes_drive");
//!
//! let simplified = MergeRule::default().apply(&translated);
//! assert_eq!(simplified.as_str(), "forehand_serve");
//! ```

pub mod artifact;
pub mod codec;
pub mod config;
pub mod label;
pub mod orchestrator;
pub mod record;
pub mod reformat;
pub mod simplify;
pub mod vocabulary;
