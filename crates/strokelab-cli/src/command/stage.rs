//! Single stage run for one partition

use anyhow::Context as _;
use strokelab_pipeline::{config::PipelineConfig, orchestrator::Pipeline, record::StageId};

use crate::command::{self, StageName};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct StageArg {
    /// Partition to process
    pub partition: String,
}

pub(crate) fn run(config: &PipelineConfig, arg: &StageArg, stage: StageName) -> anyhow::Result<()> {
    let partitions = command::select_partitions(config, std::slice::from_ref(&arg.partition))?;
    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;
    let stage = StageId::from(stage);

    for partition in partitions {
        let summary = pipeline
            .run_stage(partition, stage)
            .with_context(|| format!("Stage {stage} failed for partition {}", partition.name))?;
        for path in &summary.written {
            println!("{}: wrote {}", summary.partition, path.display());
        }
    }
    Ok(())
}
