//! Stage sequencing per partition
//!
//! A partition runs decode → reformat → translate → simplify. Each stage's
//! result is written to the artifact store before the next stage starts, so a
//! failure leaves every earlier artifact intact and a later run can resume
//! from any stage by reading the previous artifact back.

use std::path::PathBuf;

use crate::{
    artifact::{ArtifactError, ArtifactStore},
    codec,
    config::{PartitionConfig, PipelineConfig},
    record::{
        Decoded, EventCollection, Original, RawExport, Reformatted, Simplified, StageId, Translated,
    },
    reformat::{self, ReformatOptions, ReformatReport},
    simplify::MergeRule,
    vocabulary::Vocabulary,
};

/// Stage implementations bound to an artifact store.
#[derive(Debug, Clone)]
pub struct Pipeline {
    store: ArtifactStore,
    vocabulary: Vocabulary,
    merge_rule: MergeRule,
    reformat_options: ReformatOptions,
}

/// What one partition run produced.
#[derive(Debug, Clone, Default)]
pub struct PartitionSummary {
    pub partition: String,
    /// Artifacts written, in stage order.
    pub written: Vec<PathBuf>,
    /// Present when the reformat stage ran.
    pub reformat: Option<ReformatReport>,
    /// Events in the last artifact written.
    pub num_events: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        store: ArtifactStore,
        vocabulary: Vocabulary,
        merge_rule: MergeRule,
        reformat_options: ReformatOptions,
    ) -> Self {
        Self {
            store,
            vocabulary,
            merge_rule,
            reformat_options,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ArtifactError> {
        let vocabulary = config.load_vocabulary()?;
        tracing::debug!(entries = vocabulary.len(), "vocabulary loaded");
        Ok(Self::new(
            ArtifactStore::new(&config.data_dir),
            vocabulary,
            config.merge_rule.clone(),
            config.reformat_options(),
        ))
    }

    #[must_use]
    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Runs every stage from `from` onward.
    ///
    /// Starting at [`StageId::Original`] is the same as starting at
    /// [`StageId::Decoded`]: the original export is input only.
    pub fn run_partition(
        &self,
        partition: &PartitionConfig,
        from: StageId,
    ) -> Result<PartitionSummary, ArtifactError> {
        let name = partition.name.as_str();
        let mut summary = PartitionSummary {
            partition: name.to_owned(),
            ..PartitionSummary::default()
        };

        let decoded = if from <= StageId::Decoded {
            let original = self.store.read_raw::<Original>(name)?;
            Some(self.decode(name, original, &mut summary)?)
        } else {
            None
        };

        let reformatted = if from <= StageId::Reformatted {
            let decoded = match decoded {
                Some(decoded) => decoded,
                None => self.store.read_raw::<Decoded>(name)?,
            };
            Some(self.reformat(partition, decoded, &mut summary)?)
        } else {
            None
        };

        let translated = if from <= StageId::Translated {
            let reformatted = match reformatted {
                Some(reformatted) => reformatted,
                None => self.store.read_events::<Reformatted>(name)?,
            };
            Some(self.translate(name, reformatted, &mut summary)?)
        } else {
            None
        };

        let translated = match translated {
            Some(translated) => translated,
            None => self.store.read_events::<Translated>(name)?,
        };
        self.simplify(name, translated, &mut summary)?;

        Ok(summary)
    }

    /// Runs a single stage, reading its input from the previous artifact.
    pub fn run_stage(
        &self,
        partition: &PartitionConfig,
        stage: StageId,
    ) -> Result<PartitionSummary, ArtifactError> {
        let name = partition.name.as_str();
        let mut summary = PartitionSummary {
            partition: name.to_owned(),
            ..PartitionSummary::default()
        };

        match stage {
            StageId::Original | StageId::Decoded => {
                let input = self.store.read_raw::<Original>(name)?;
                self.decode(name, input, &mut summary)?;
            }
            StageId::Reformatted => {
                let input = self.store.read_raw::<Decoded>(name)?;
                self.reformat(partition, input, &mut summary)?;
            }
            StageId::Translated => {
                let input = self.store.read_events::<Reformatted>(name)?;
                self.translate(name, input, &mut summary)?;
            }
            StageId::Simplified => {
                let input = self.store.read_events::<Translated>(name)?;
                self.simplify(name, input, &mut summary)?;
            }
        }

        Ok(summary)
    }

    fn decode(
        &self,
        name: &str,
        original: RawExport<Original>,
        summary: &mut PartitionSummary,
    ) -> Result<RawExport<Decoded>, ArtifactError> {
        tracing::info!(partition = name, videos = original.videos.len(), "[1] decoding labels");
        let decoded = codec::decode_export(original);
        let path = self.store.write_raw(name, &decoded)?;
        tracing::info!(partition = name, path = %path.display(), "[1] decode complete");
        summary.written.push(path);
        summary.num_events = decoded.videos.iter().map(|v| v.actions.len()).sum();
        Ok(decoded)
    }

    fn reformat(
        &self,
        partition: &PartitionConfig,
        decoded: RawExport<Decoded>,
        summary: &mut PartitionSummary,
    ) -> Result<EventCollection<Reformatted>, ArtifactError> {
        let name = partition.name.as_str();
        let info_path = self.store.info_path(name);
        tracing::info!(
            partition = name,
            info = %info_path.display(),
            skip = partition.skip_videos.len(),
            "[2] reformatting data"
        );
        let info = self.store.read_video_info(name)?;
        if info.is_empty() {
            tracing::warn!(partition = name, "video info is empty, no video can be retained");
        }
        tracing::debug!(partition = name, entries = info.len(), "video info loaded");
        let (reformatted, report) = reformat::reformat(
            &info,
            decoded,
            &partition.skip_videos,
            &self.reformat_options,
        );
        let path = self.store.write_events(name, &reformatted)?;
        tracing::info!(
            partition = name,
            path = %path.display(),
            retained = report.retained,
            skipped = report.skipped.len(),
            missing_info = report.missing_info.len(),
            "[2] reformat complete"
        );
        summary.written.push(path);
        summary.reformat = Some(report);
        summary.num_events = reformatted.num_events();
        Ok(reformatted)
    }

    fn translate(
        &self,
        name: &str,
        reformatted: EventCollection<Reformatted>,
        summary: &mut PartitionSummary,
    ) -> Result<EventCollection<Translated>, ArtifactError> {
        tracing::info!(partition = name, "[3] translating labels");
        let translated = self.vocabulary.translate(reformatted);
        let path = self.store.write_events(name, &translated)?;
        tracing::info!(partition = name, path = %path.display(), "[3] translation complete");
        summary.written.push(path);
        summary.num_events = translated.num_events();
        Ok(translated)
    }

    fn simplify(
        &self,
        name: &str,
        translated: EventCollection<Translated>,
        summary: &mut PartitionSummary,
    ) -> Result<EventCollection<Simplified>, ArtifactError> {
        tracing::info!(partition = name, "[4] simplifying labels");
        let simplified = self.merge_rule.simplify(translated);
        let path = self.store.write_events(name, &simplified)?;
        tracing::info!(partition = name, path = %path.display(), "[4] simplification complete");
        summary.written.push(path);
        summary.num_events = simplified.num_events();
        Ok(simplified)
    }
}
