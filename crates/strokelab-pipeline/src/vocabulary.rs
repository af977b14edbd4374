//! Token translation into the canonical vocabulary

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    label::Label,
    record::{EventCollection, Reformatted, Translated},
};

/// Source vocabulary of the table-tennis annotation tool.
const TABLE_TENNIS: [(&str, &str); 18] = [
    ("拉", "drive"),
    ("侧旋", "side-spin"),
    ("侧身拉", "step-around-drive"),
    ("摆短", "short-push"),
    ("控制", "control"),
    ("拧", "smash"),
    ("劈长", "long-push"),
    ("挑", "flip"),
    ("逆旋转", "reverse-pendulum"),
    ("转不转", "spin/no-spin"),
    ("普通", "normal"),
    ("勾球", "hook"),
    ("下蹲", "squatting"),
    ("中性", "neutral"),
    ("反手", "backhand"),
    ("正手", "forehand"),
    ("否", "no"),
    ("是", "yes"),
];

/// A token-to-token lookup table.
///
/// Translation is total: tokens without an entry pass through verbatim.
/// On disk this is a flat JSON object, `{"正手": "forehand", ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    map: BTreeMap<String, String>,
}

impl Vocabulary {
    #[must_use]
    pub fn new(map: BTreeMap<String, String>) -> Self {
        Self { map }
    }

    /// The built-in table for table-tennis stroke annotations.
    #[must_use]
    pub fn table_tennis() -> Self {
        TABLE_TENNIS
            .iter()
            .map(|&(from, to)| (from.to_owned(), to.to_owned()))
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[must_use]
    pub fn translate_token<'a>(&'a self, token: &'a str) -> &'a str {
        self.map.get(token).map_or(token, String::as_str)
    }

    /// Translates each part independently; the part count never changes.
    ///
    /// ```
    /// # use strokelab_pipeline::{label::Label, vocabulary::Vocabulary};
    /// let vocabulary = Vocabulary::table_tennis();
    /// let label = vocabulary.translate_label(&Label::new("反手_否_未知"));
    /// assert_eq!(label.as_str(), "backhand_no_未知");
    /// ```
    #[must_use]
    pub fn translate_label(&self, label: &Label) -> Label {
        Label::from_parts(label.parts().map(|part| self.translate_token(part)))
    }

    #[must_use]
    pub fn translate(
        &self,
        collection: EventCollection<Reformatted>,
    ) -> EventCollection<Translated> {
        collection.map_labels(|label| self.translate_label(label))
    }
}

impl FromIterator<(String, String)> for Vocabulary {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}
