//! Pipeline configuration
//!
//! ```json
//! {
//!   "data_dir": "data",
//!   "partitions": [
//!     { "name": "v1" },
//!     { "name": "v2", "skip_videos": ["0000110.mp4", "0000112.mp4"] }
//!   ],
//!   "vocabulary": "vocabulary.json",
//!   "outcome": "in",
//!   "merge_rule": { "flag": "yes", "merged": "serve" }
//! }
//! ```
//!
//! Every key is optional; omitted keys take the values shown by
//! [`PipelineConfig::default`].

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{
    artifact::{self, ArtifactError},
    reformat::ReformatOptions,
    simplify::MergeRule,
    vocabulary::Vocabulary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub data_dir: PathBuf,
    pub partitions: Vec<PartitionConfig>,
    /// Vocabulary file replacing the built-in table; relative paths resolve
    /// against the configuration file.
    pub vocabulary: Option<PathBuf>,
    pub outcome: Option<String>,
    pub merge_rule: MergeRule,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            partitions: vec![
                PartitionConfig::new("v1", Vec::<String>::new()),
                PartitionConfig::new("v2", ["0000110.mp4", "0000112.mp4"]),
            ],
            vocabulary: None,
            outcome: None,
            merge_rule: MergeRule::default(),
        }
    }
}

/// An independently processed dataset version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartitionConfig {
    pub name: String,
    /// Videos excluded from reformatting, such as corrupted recordings.
    #[serde(default)]
    pub skip_videos: HashSet<String>,
}

impl PartitionConfig {
    pub fn new<I, S>(name: impl Into<String>, skip_videos: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            skip_videos: skip_videos.into_iter().map(Into::into).collect(),
        }
    }
}

impl PipelineConfig {
    /// Loads a configuration file and resolves relative paths against it.
    pub fn load(path: &Path) -> Result<Self, ArtifactError> {
        let mut config: Self = artifact::read_json(path)?;
        let base = path.parent().unwrap_or(Path::new(""));
        if config.data_dir.is_relative() {
            config.data_dir = base.join(&config.data_dir);
        }
        if let Some(vocabulary) = config.vocabulary.as_mut().filter(|p| p.is_relative()) {
            *vocabulary = base.join(&*vocabulary);
        }
        Ok(config)
    }

    /// The configured vocabulary, or the built-in table-tennis table.
    pub fn load_vocabulary(&self) -> Result<Vocabulary, ArtifactError> {
        match &self.vocabulary {
            Some(path) => artifact::read_json(path),
            None => Ok(Vocabulary::table_tennis()),
        }
    }

    #[must_use]
    pub fn reformat_options(&self) -> ReformatOptions {
        ReformatOptions {
            outcome: self.outcome.clone(),
        }
    }

    #[must_use]
    pub fn partition(&self, name: &str) -> Option<&PartitionConfig> {
        self.partitions.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_default_partitions() {
        let config = PipelineConfig::default();
        assert_eq!(config.data_dir, Path::new("data"));
        assert!(config.partition("v1").unwrap().skip_videos.is_empty());
        let v2 = config.partition("v2").unwrap();
        assert!(v2.skip_videos.contains("0000110.mp4"));
        assert!(v2.skip_videos.contains("0000112.mp4"));
        assert!(config.partition("v3").is_none());
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strokelab.json");
        fs::write(
            &path,
            r#"{"partitions":[{"name":"v9"}],"vocabulary":"vocab.json","outcome":"in"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("vocab.json"), r#"{"fh":"forehand"}"#).unwrap();

        let config = PipelineConfig::load(&path).unwrap();
        assert_eq!(config.data_dir, dir.path().join("data"));
        assert_eq!(config.partitions, [PartitionConfig::new("v9", Vec::<String>::new())]);
        assert_eq!(config.reformat_options().outcome.as_deref(), Some("in"));
        assert_eq!(config.merge_rule, MergeRule::default());

        let vocabulary = config.load_vocabulary().unwrap();
        assert_eq!(vocabulary.translate_token("fh"), "forehand");
    }

    #[test]
    fn test_default_vocabulary() {
        let vocabulary = PipelineConfig::default().load_vocabulary().unwrap();
        assert_eq!(vocabulary, Vocabulary::table_tennis());
    }
}
