use std::path::PathBuf;

use strokelab_pipeline::config::PipelineConfig;

use crate::util::Output;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct ShowConfigArg {
    /// Output file path; stdout when omitted
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(config: &PipelineConfig, arg: &ShowConfigArg) -> anyhow::Result<()> {
    Output::save_json(config, arg.output.clone())
}
