//! Column layout of decomposed labels

use strokelab_pipeline::{label::Label, record::LabelSchema};
use strokelab_stats::frequency::FrequencyTable;

/// A named position within a composite label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum Column {
    #[display("stroke")]
    Stroke,
    #[display("negation")]
    Negation,
    #[display("action")]
    Action,
}

/// Stroke categories of the transition matrix.
///
/// Any other stroke value is out of category.
pub const STROKE_CATEGORIES: [&str; 2] = ["backhand", "forehand"];

/// Columns of `schema`, in label order.
#[must_use]
pub fn columns(schema: LabelSchema) -> &'static [Column] {
    match schema {
        LabelSchema::Triple => &[Column::Stroke, Column::Negation, Column::Action],
        LabelSchema::Pair => &[Column::Stroke, Column::Action],
    }
}

/// Part index of `column` under `schema`, or `None` if the schema lacks it.
#[must_use]
pub fn column_index(schema: LabelSchema, column: Column) -> Option<usize> {
    columns(schema).iter().position(|c| *c == column)
}

/// Infers the schema from the most common label arity.
///
/// Returns `None` when there are no labels or the most common arity is neither
/// 2 nor 3. Equal counts prefer the smaller arity.
///
/// ```
/// # use strokelab_analysis::schema::detect_schema;
/// # use strokelab_pipeline::{label::Label, record::LabelSchema};
/// let labels = ["forehand_drive", "backhand_flip", "forehand_no_drive"].map(Label::from);
/// assert_eq!(detect_schema(&labels), Some(LabelSchema::Pair));
/// ```
#[must_use]
pub fn detect_schema<'a, I>(labels: I) -> Option<LabelSchema>
where
    I: IntoIterator<Item = &'a Label>,
{
    let arity = FrequencyTable::from_values(labels.into_iter().map(Label::arity));
    let (modal, _) = arity.entries().first()?;
    LabelSchema::from_arity(*modal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index(LabelSchema::Triple, Column::Action), Some(2));
        assert_eq!(column_index(LabelSchema::Pair, Column::Action), Some(1));
        assert_eq!(column_index(LabelSchema::Pair, Column::Negation), None);
        assert_eq!(Column::Negation.to_string(), "negation");
    }

    #[test]
    fn test_detect_schema() {
        let triples = ["forehand_no_drive", "backhand_yes_flip", "forehand"].map(Label::from);
        assert_eq!(detect_schema(&triples), Some(LabelSchema::Triple));
        assert_eq!(detect_schema(&[]), None);

        let malformed = ["a_b_c_d", "a_b_c_d", "a_b"].map(Label::from);
        assert_eq!(detect_schema(&malformed), None);
    }
}
