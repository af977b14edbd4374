//! Stage artifacts on disk
//!
//! Every stage writes its own file, `<partition>_<index>_<stage>.json`, and
//! never touches the files of other stages:
//!
//! ```text
//! data/
//! ├─ v1_0_info.json          video metadata (extraction output)
//! ├─ v1_0_original.json      raw annotation export
//! ├─ v1_1_decoded.json
//! ├─ v1_2_reformatted.json
//! ├─ v1_3_translated.json
//! └─ v1_4_simplified.json
//! ```

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    record::{EventCollection, EventStage, RawExport, Stage, StageId, VideoInfoRecord},
    reformat::VideoInfoTable,
};

#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum ArtifactError {
    #[display("artifact not found: {}", path.display())]
    NotFound { path: PathBuf },
    #[display("failed to access artifact {}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[display("failed to process JSON in artifact {}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Directory holding the artifacts of all partitions.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of a stage artifact.
    ///
    /// ```
    /// # use strokelab_pipeline::{artifact::ArtifactStore, record::StageId};
    /// let store = ArtifactStore::new("data");
    /// assert_eq!(
    ///     store.stage_path("v2", StageId::Translated),
    ///     std::path::Path::new("data/v2_3_translated.json"),
    /// );
    /// ```
    #[must_use]
    pub fn stage_path(&self, partition: &str, stage: StageId) -> PathBuf {
        self.dir.join(format!("{partition}_{stage}.json"))
    }

    #[must_use]
    pub fn info_path(&self, partition: &str) -> PathBuf {
        self.dir.join(format!("{partition}_0_info.json"))
    }

    pub fn read_video_info(&self, partition: &str) -> Result<VideoInfoTable, ArtifactError> {
        let records: Vec<VideoInfoRecord> = read_json(&self.info_path(partition))?;
        Ok(records.into_iter().collect())
    }

    pub fn read_raw<S: Stage>(&self, partition: &str) -> Result<RawExport<S>, ArtifactError> {
        read_json(&self.stage_path(partition, S::ID))
    }

    pub fn write_raw<S: Stage>(
        &self,
        partition: &str,
        export: &RawExport<S>,
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.stage_path(partition, S::ID);
        write_json(&path, export)?;
        Ok(path)
    }

    pub fn read_events<S: EventStage>(
        &self,
        partition: &str,
    ) -> Result<EventCollection<S>, ArtifactError> {
        read_json(&self.stage_path(partition, S::ID))
    }

    pub fn write_events<S: EventStage>(
        &self,
        partition: &str,
        collection: &EventCollection<S>,
    ) -> Result<PathBuf, ArtifactError> {
        let path = self.stage_path(partition, S::ID);
        write_json(&path, collection)?;
        Ok(path)
    }
}

/// Reads a whole JSON document, failing with [`ArtifactError::NotFound`] if
/// the file does not exist.
pub fn read_json<T>(path: &Path) -> Result<T, ArtifactError>
where
    T: DeserializeOwned,
{
    let file = File::open(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => ArtifactError::NotFound {
            path: path.to_owned(),
        },
        _ => ArtifactError::Io {
            path: path.to_owned(),
            source,
        },
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| ArtifactError::Json {
        path: path.to_owned(),
        source,
    })
}

/// Writes pretty-printed JSON (4-space indent, non-ASCII kept verbatim).
///
/// The document is written next to the target and renamed into place, so a
/// failed write never leaves a truncated artifact behind.
pub fn write_json<T>(path: &Path, value: &T) -> Result<(), ArtifactError>
where
    T: Serialize + ?Sized,
{
    let io_error = |source| ArtifactError::Io {
        path: path.to_owned(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }

    let tmp_path = path.with_extension("json.tmp");
    let result = write_pretty(&tmp_path, value)
        .map_err(|error| match error {
            WriteError::Io(source) => io_error(source),
            WriteError::Json(source) => ArtifactError::Json {
                path: path.to_owned(),
                source,
            },
        })
        .and_then(|()| fs::rename(&tmp_path, path).map_err(io_error));
    if result.is_err() {
        // best effort; the write error is what gets reported
        let _ = fs::remove_file(&tmp_path);
    }
    result
}

enum WriteError {
    Io(io::Error),
    Json(serde_json::Error),
}

fn write_pretty<T>(path: &Path, value: &T) -> Result<(), WriteError>
where
    T: Serialize + ?Sized,
{
    let file = File::create(path).map_err(WriteError::Io)?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value.serialize(&mut serializer).map_err(WriteError::Json)?;
    writeln!(writer).map_err(WriteError::Io)?;
    writer.flush().map_err(WriteError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        label::Label,
        record::{Event, EventVideo, Original, Simplified},
    };

    #[test]
    fn test_missing_artifact_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());

        let err = store.read_raw::<Original>("v1").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
        assert!(err.to_string().contains("v1_0_original.json"));

        let err = store.read_video_info("v1").unwrap_err();
        assert!(matches!(err, ArtifactError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path());
        fs::write(store.info_path("v1"), "{ not json").unwrap();

        let err = store.read_video_info("v1").unwrap_err();
        assert!(matches!(err, ArtifactError::Json { .. }));
    }

    #[test]
    fn test_failed_write_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v1_4_simplified.json");
        // sequence keys cannot be written as JSON object keys
        let value = std::collections::BTreeMap::from([(vec![1_u8], 1_u8)]);

        let err = write_json(&path, &value).unwrap_err();

        assert!(matches!(err, ArtifactError::Json { .. }));
        assert!(!path.exists());
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_events_written_with_utf8_and_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path().join("nested"));
        let collection = EventCollection::<Simplified>::new(vec![EventVideo {
            fps: 30.0,
            height: 720,
            width: 1280,
            num_frames: 300,
            video: "0000001.mp4".to_owned(),
            events: vec![Event {
                frame: 30,
                label: Label::new("正手_serve"),
                outcome: None,
            }],
        }]);

        let path = store.write_events("v1", &collection).unwrap();
        assert_eq!(path, store.stage_path("v1", StageId::Simplified));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("正手_serve"));
        assert!(text.contains("\n    {\n        \"fps\""));
        assert!(!path.with_extension("json.tmp").exists());

        let reloaded = store.read_events::<Simplified>("v1").unwrap();
        assert_eq!(reloaded, collection);
    }
}
