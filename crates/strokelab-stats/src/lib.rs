//! Statistical tools for annotation analysis.
//!
//! This crate provides:
//!
//! - **Descriptive statistics**: mean, median, variance, standard deviation
//! - **Frequency tables**: categorical value counts
//! - **Cross-tabulation**: contingency tables with a sparsity filter
//! - **Transition matrices**: row-stochastic tables over a closed category set
//! - **K-means**: seeded clustering of numeric feature vectors
//!
//! # Modules
//!
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//! - [`frequency`]: Value counts ordered by frequency
//! - [`crosstab`]: Co-occurrence counts between two categorical variables
//! - [`transition`]: Empirical probabilities of one category following another
//! - [`kmeans`]: K-means with k-means++ seeding and feature standardization
//!
//! # Examples
//!
//! ## Counting categories
//!
//! ```
//! use strokelab_stats::frequency::FrequencyTable;
//!
//! let table = FrequencyTable::from_values(["drive", "flip", "drive"]);
//! assert_eq!(table.entries()[0], ("drive", 2));
//! ```
//!
//! ## Cross-tabulating two columns
//!
//! ```
//! use strokelab_stats::crosstab::Crosstab;
//!
//! let table = Crosstab::from_pairs([("forehand", "drive"), ("backhand", "flip")]);
//! assert_eq!(table.get(&"forehand", &"drive"), 1);
//! assert_eq!(table.total(), 2);
//! ```
//!
//! ## Building a transition matrix
//!
//! ```
//! use strokelab_stats::transition::TransitionMatrix;
//!
//! let sequence = [Some("a"), Some("b"), Some("a"), Some("a")];
//! let matrix = TransitionMatrix::from_sequence(&["a", "b"], sequence);
//! assert_eq!(matrix.probability(&"a", &"b"), Some(0.5));
//! assert_eq!(matrix.probability(&"b", &"a"), Some(1.0));
//! ```

pub mod crosstab;
pub mod descriptive;
pub mod frequency;
pub mod kmeans;
pub mod transition;
