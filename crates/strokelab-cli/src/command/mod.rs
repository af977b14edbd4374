use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use strokelab_pipeline::{
    config::{PartitionConfig, PipelineConfig},
    record::StageId,
};

use self::{analyze::AnalyzeArg, process::ProcessArg, show_config::ShowConfigArg, stage::StageArg};

mod analyze;
mod process;
mod show_config;
mod stage;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[command(flatten)]
    global: GlobalArgs,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Clone, Args)]
pub(crate) struct GlobalArgs {
    /// Pipeline configuration file (JSON); built-in defaults when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the stage artifacts, overriding the configuration
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Run the label pipeline for every configured partition
    Process(#[clap(flatten)] ProcessArg),
    /// Repair mojibake in the original export
    Decode(#[clap(flatten)] StageArg),
    /// Join video info and convert action times to frames
    Reformat(#[clap(flatten)] StageArg),
    /// Translate label tokens to the canonical vocabulary
    Translate(#[clap(flatten)] StageArg),
    /// Fold 3-part labels into 2-part labels
    Simplify(#[clap(flatten)] StageArg),
    /// Compute label statistics and charts
    Analyze(#[clap(flatten)] AnalyzeArg),
    /// Print the effective configuration as JSON
    ShowConfig(#[clap(flatten)] ShowConfigArg),
}

/// Pipeline stages that can be run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum StageName {
    Decode,
    Reformat,
    Translate,
    Simplify,
}

impl From<StageName> for StageId {
    fn from(stage: StageName) -> Self {
        match stage {
            StageName::Decode => StageId::Decoded,
            StageName::Reformat => StageId::Reformatted,
            StageName::Translate => StageId::Translated,
            StageName::Simplify => StageId::Simplified,
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    let config = load_config(&args.global)?;
    match args.mode {
        Mode::Process(arg) => process::run(&config, &arg)?,
        Mode::Decode(arg) => stage::run(&config, &arg, StageName::Decode)?,
        Mode::Reformat(arg) => stage::run(&config, &arg, StageName::Reformat)?,
        Mode::Translate(arg) => stage::run(&config, &arg, StageName::Translate)?,
        Mode::Simplify(arg) => stage::run(&config, &arg, StageName::Simplify)?,
        Mode::Analyze(arg) => analyze::run(&config, &arg)?,
        Mode::ShowConfig(arg) => show_config::run(&config, &arg)?,
    }
    Ok(())
}

fn load_config(global: &GlobalArgs) -> anyhow::Result<PipelineConfig> {
    let mut config = match &global.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load configuration: {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(data_dir) = &global.data_dir {
        config.data_dir.clone_from(data_dir);
    }
    tracing::debug!(data_dir = %config.data_dir.display(), "configuration loaded");
    Ok(config)
}

/// Configured partitions, restricted to `names` unless it is empty.
pub(crate) fn select_partitions<'a>(
    config: &'a PipelineConfig,
    names: &[String],
) -> anyhow::Result<Vec<&'a PartitionConfig>> {
    if names.is_empty() {
        return Ok(config.partitions.iter().collect());
    }
    names
        .iter()
        .map(|name| {
            config
                .partition(name)
                .ok_or_else(|| anyhow::anyhow!("Partition {name} not found in configuration"))
        })
        .collect()
}
