//! Full pipeline run over several partitions

use anyhow::Context as _;
use strokelab_pipeline::{config::PipelineConfig, orchestrator::Pipeline};

use crate::command::{self, StageName};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ProcessArg {
    /// First stage to run; earlier stages are read back from their artifacts
    #[arg(long, value_enum, default_value_t = StageName::Decode)]
    pub from: StageName,
    /// Partitions to process (comma-separated); all configured when omitted
    #[arg(long = "partition", value_delimiter = ',')]
    pub partitions: Vec<String>,
}

pub(crate) fn run(config: &PipelineConfig, arg: &ProcessArg) -> anyhow::Result<()> {
    let partitions = command::select_partitions(config, &arg.partitions)?;
    let pipeline = Pipeline::from_config(config).context("Failed to set up pipeline")?;

    let mut failed = vec![];
    for partition in partitions {
        match pipeline.run_partition(partition, arg.from.into()) {
            Ok(summary) => {
                println!(
                    "{}: {} artifacts written, {} events",
                    summary.partition,
                    summary.written.len(),
                    summary.num_events
                );
                if let Some(report) = &summary.reformat {
                    println!(
                        "  {} videos retained, {} skipped, {} without video info",
                        report.retained,
                        report.skipped.len(),
                        report.missing_info.len()
                    );
                }
            }
            Err(error) => {
                let error = anyhow::Error::from(error);
                tracing::error!(partition = %partition.name, "{error:#}");
                failed.push(partition.name.as_str());
            }
        }
    }

    if !failed.is_empty() {
        anyhow::bail!("Pipeline failed for partitions: {}", failed.join(", "));
    }
    Ok(())
}
