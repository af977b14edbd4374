//! Folding of the negation flag into the action part
//!
//! ```text
//! stroke_yes_<any>   ->  stroke_serve
//! stroke_<flag>_act  ->  stroke_act
//! shorter labels     ->  unchanged
//! ```
//!
//! The `yes` branch discards the third part: a flagged event belongs to the
//! serve supercategory whatever action was recorded. Read the translated
//! artifact when that detail is needed.

use serde::{Deserialize, Serialize};

use crate::{
    label::Label,
    record::{EventCollection, Simplified, Translated},
};

/// Tokens used by the simplification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeRule {
    /// Flag value (second part) that selects the merged token.
    pub flag: String,
    /// Token replacing the action when the flag matches.
    pub merged: String,
}

impl Default for MergeRule {
    fn default() -> Self {
        Self {
            flag: "yes".to_owned(),
            merged: "serve".to_owned(),
        }
    }
}

impl MergeRule {
    /// Simplifies a single label.
    ///
    /// Parts beyond the third are dropped along with the flag.
    #[must_use]
    pub fn apply(&self, label: &Label) -> Label {
        let mut parts = label.parts();
        let (Some(stroke), Some(flag), Some(action)) = (parts.next(), parts.next(), parts.next())
        else {
            return label.clone();
        };

        if flag == self.flag {
            Label::from_parts([stroke, self.merged.as_str()])
        } else {
            Label::from_parts([stroke, action])
        }
    }

    #[must_use]
    pub fn simplify(&self, collection: EventCollection<Translated>) -> EventCollection<Simplified> {
        collection.map_labels(|label| self.apply(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apply(value: &str) -> String {
        MergeRule::default().apply(&Label::new(value)).as_str().to_owned()
    }

    #[test]
    fn test_flag_yes_becomes_serve() {
        assert_eq!(apply("forehand_yes_topspin"), "forehand_serve");
        assert_eq!(apply("backhand_yes_"), "backhand_serve");
    }

    #[test]
    fn test_other_flag_drops_flag() {
        assert_eq!(apply("forehand_no_topspin"), "forehand_topspin");
        assert_eq!(apply("forehand__topspin"), "forehand_topspin");
        assert_eq!(apply("forehand_Yes_topspin"), "forehand_topspin");
    }

    #[test]
    fn test_short_labels_pass_through() {
        assert_eq!(apply("forehand_topspin"), "forehand_topspin");
        assert_eq!(apply("forehand"), "forehand");
        assert_eq!(apply(""), "");
    }

    #[test]
    fn test_extra_parts_are_dropped() {
        assert_eq!(apply("forehand_no_drive_extra"), "forehand_drive");
    }

    #[test]
    fn test_custom_rule() {
        let rule = MergeRule {
            flag: "是".to_owned(),
            merged: "发球".to_owned(),
        };
        assert_eq!(rule.apply(&Label::new("正手_是_拉")).as_str(), "正手_发球");
    }
}
