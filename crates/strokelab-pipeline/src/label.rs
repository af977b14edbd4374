//! Underscore-joined composite labels

use std::{fmt, str::Split};

use serde::{Deserialize, Serialize};

/// Separator between the parts of a composite label.
pub const SEPARATOR: char = '_';

/// A composite label such as `forehand_no_drive`.
///
/// The number and meaning of the parts is not a property of the value itself;
/// it is fixed by the stage that produced the collection holding the label.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Label(String);

impl Label {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Joins parts with [`SEPARATOR`].
    ///
    /// ```
    /// # use strokelab_pipeline::label::Label;
    /// let label = Label::from_parts(["forehand", "no", "drive"]);
    /// assert_eq!(label.as_str(), "forehand_no_drive");
    /// ```
    #[must_use]
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut value = String::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                value.push(SEPARATOR);
            }
            value.push_str(part.as_ref());
        }
        Self(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits the label on [`SEPARATOR`].
    ///
    /// An empty label yields a single empty part, and adjacent separators yield
    /// empty parts in between.
    pub fn parts(&self) -> Split<'_, char> {
        self.0.split(SEPARATOR)
    }

    /// Number of parts, always at least 1.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parts().count()
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}
