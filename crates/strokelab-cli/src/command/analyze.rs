//! Label statistics over the normalized artifacts
//!
//! Writes CSV tables and PNG charts to the output directory and prints a
//! summary to stdout. Chart rendering failures are logged and skipped.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, ValueEnum};
use strokelab_analysis::{
    audit,
    features::FEATURE_NAMES,
    report::{AnalysisOptions, AnalysisReport},
    schema::Column,
    table::{Dataset, LabelRow},
};
use strokelab_pipeline::{
    artifact::{self, ArtifactStore},
    config::{PartitionConfig, PipelineConfig},
    record::{EventStage, EventVideo, Simplified, Translated},
};
use strokelab_stats::kmeans::KMeans;

use crate::{
    command,
    plot::{Bars, Chart, Heatmap},
    util::{self, Csv},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct AnalyzeArg {
    /// Stage artifact to analyze
    #[arg(long, value_enum, default_value_t = AnalyzeStage::Simplified)]
    stage: AnalyzeStage,
    /// Partitions to combine (comma-separated); all configured when omitted
    #[arg(long = "partition", value_delimiter = ',')]
    partitions: Vec<String>,
    /// Event collection files to analyze instead of stage artifacts; the
    /// label layout is detected from the labels
    #[arg(long = "input", conflicts_with_all = ["stage", "partitions"])]
    inputs: Vec<PathBuf>,
    /// Directory for CSV tables and charts
    #[arg(long, default_value = "analysis")]
    output_dir: PathBuf,
    /// Row variable of the cross-tabulation
    #[arg(long, value_enum, default_value_t = ColumnName::Stroke)]
    rows: ColumnName,
    /// Column variable of the cross-tabulation
    #[arg(long, value_enum, default_value_t = ColumnName::Action)]
    cols: ColumnName,
    /// Drop crosstab categories whose total does not exceed this
    #[arg(long, default_value_t = 10)]
    min_count: u64,
    /// Number of video clusters
    #[arg(long, default_value_t = 3)]
    clusters: usize,
    /// Seed of the cluster initialization
    #[arg(long, default_value_t = 42)]
    seed: u64,
    /// Maximum k-means iterations
    #[arg(long, default_value_t = 100)]
    max_iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum AnalyzeStage {
    Translated,
    Simplified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ColumnName {
    Stroke,
    Negation,
    Action,
}

impl From<ColumnName> for Column {
    fn from(column: ColumnName) -> Self {
        match column {
            ColumnName::Stroke => Column::Stroke,
            ColumnName::Negation => Column::Negation,
            ColumnName::Action => Column::Action,
        }
    }
}

pub(crate) fn run(config: &PipelineConfig, arg: &AnalyzeArg) -> anyhow::Result<()> {
    let dataset = if arg.inputs.is_empty() {
        let partitions = command::select_partitions(config, &arg.partitions)?;
        let store = ArtifactStore::new(&config.data_dir);
        match arg.stage {
            AnalyzeStage::Translated => load_dataset::<Translated>(&store, &partitions)?,
            AnalyzeStage::Simplified => load_dataset::<Simplified>(&store, &partitions)?,
        }
    } else {
        load_inputs(&arg.inputs)?
    };

    let options = AnalysisOptions {
        crosstab_rows: arg.rows.into(),
        crosstab_cols: arg.cols.into(),
        min_count: arg.min_count,
        kmeans: KMeans {
            k: arg.clusters,
            max_iterations: arg.max_iterations,
            seed: arg.seed,
        },
    };
    let report = AnalysisReport::new(&dataset, &options);

    fs::create_dir_all(&arg.output_dir).with_context(|| {
        format!(
            "Failed to create output directory: {}",
            arg.output_dir.display()
        )
    })?;
    save_tables(&arg.output_dir, &report)?;
    save_charts(&arg.output_dir, &report);
    print_summary(&report);

    Ok(())
}

fn load_dataset<S: EventStage>(
    store: &ArtifactStore,
    partitions: &[&PartitionConfig],
) -> anyhow::Result<Dataset> {
    let collections = partitions
        .iter()
        .map(|partition| {
            let collection = store.read_events::<S>(&partition.name).with_context(|| {
                format!("Failed to load {} artifact of {}", S::ID, partition.name)
            })?;
            tracing::info!(
                partition = %partition.name,
                videos = collection.videos.len(),
                events = collection.num_events(),
                "artifact loaded"
            );
            Ok(collection)
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(Dataset::from_collections(collections))
}

fn load_inputs(paths: &[PathBuf]) -> anyhow::Result<Dataset> {
    let mut videos = vec![];
    for path in paths {
        let collection: Vec<EventVideo> = artifact::read_json(path)
            .with_context(|| format!("Failed to load event collection: {}", path.display()))?;
        tracing::info!(path = %path.display(), videos = collection.len(), "event collection loaded");
        videos.extend(collection);
    }
    let dataset = Dataset::detect(videos).context("No labels found to detect the label layout")?;
    tracing::info!(schema = ?dataset.schema, events = dataset.num_events(), "label layout detected");
    Ok(dataset)
}

fn save_tables(dir: &Path, report: &AnalysisReport) -> anyhow::Result<()> {
    label_audit_csv(report.table.rows().iter()).save(&dir.join("csv_labels.csv"))?;
    label_audit_csv(audit::empty_part_rows(&report.table))
        .save(&dir.join("csv_empty_labels.csv"))?;

    let mut counts = Csv::new(["action", "count"]);
    if let Some(actions) = report.distribution(Column::Action) {
        for (action, count) in actions.entries() {
            counts.push_row([action.clone(), count.to_string()]);
        }
    }
    counts.save(&dir.join("csv_label_count.csv"))?;

    let crosstab = &report.crosstab;
    let mut table = Csv::new(
        std::iter::once(report.options.crosstab_rows.to_string()).chain(crosstab.cols().iter().cloned()),
    );
    for (row, counts) in crosstab.rows().iter().zip(crosstab.counts()) {
        table.push_row(std::iter::once(row.clone()).chain(counts.iter().map(u64::to_string)));
    }
    table.save(&dir.join(format!(
        "csv_{}_{}_crosstab.csv",
        report.options.crosstab_rows, report.options.crosstab_cols
    )))?;

    let transitions = &report.transitions;
    let mut matrix =
        Csv::new(std::iter::once("from".to_owned()).chain(transitions.categories().iter().cloned()));
    for (from, row) in transitions.categories().iter().zip(transitions.probabilities()) {
        matrix.push_row(
            std::iter::once(from.clone()).chain(row.iter().map(|p| util::format_float(*p, 2))),
        );
    }
    matrix.save(&dir.join("csv_transition_matrix.csv"))?;

    let mut clusters = Csv::new(["video", "cluster"].into_iter().chain(FEATURE_NAMES));
    if let Some(clustering) = &report.clusters.clustering {
        for (features, cluster) in report.clusters.features.iter().zip(&clustering.assignments) {
            clusters.push_row(
                [features.video.clone(), cluster.to_string()]
                    .into_iter()
                    .chain(features.to_vector().into_iter().map(|v| util::format_float(v, 4))),
            );
        }
    }
    clusters.save(&dir.join("csv_clusters.csv"))?;

    Ok(())
}

fn label_audit_csv<'a, I>(rows: I) -> Csv
where
    I: IntoIterator<Item = &'a LabelRow>,
{
    let mut csv = Csv::new(["video_id", "event_id", "label_parts"]);
    for row in rows {
        // a list of strings always serializes
        let parts = serde_json::to_string(&row.parts).unwrap_or_default();
        csv.push_row([row.video_id.to_string(), row.event_id.to_string(), parts]);
    }
    csv
}

fn save_charts(dir: &Path, report: &AnalysisReport) {
    for (name, chart) in charts(report) {
        let path = dir.join(name);
        match chart.draw(&path) {
            Ok(()) => tracing::info!(path = %path.display(), "chart saved"),
            Err(error) => {
                tracing::warn!(path = %path.display(), "failed to render chart: {error:#}");
            }
        }
    }
}

/// Every chart of the report with its file name.
///
/// The set of files does not depend on the data; a table without entries
/// gives an empty chart.
fn charts(report: &AnalysisReport) -> Vec<(String, Chart)> {
    let options = &report.options;
    let mut charts = vec![];

    let distributions = report
        .distributions
        .iter()
        .map(|(column, table)| Bars {
            title: format!("{column} distribution"),
            x_desc: column.to_string(),
            entries: table.entries().to_vec(),
        })
        .collect();
    charts.push((
        "plot_action_distribution.png".to_owned(),
        Chart::Bars(distributions),
    ));

    let crosstab = &report.crosstab;
    #[expect(clippy::cast_precision_loss)]
    let values = crosstab
        .counts()
        .iter()
        .map(|row| row.iter().map(|&c| c as f64).collect())
        .collect();
    let caption = if crosstab.is_empty() {
        format!(
            "{} x {} (no category total > {})",
            options.crosstab_rows, options.crosstab_cols, options.min_count
        )
    } else {
        format!(
            "{} x {} (total > {})",
            options.crosstab_rows, options.crosstab_cols, options.min_count
        )
    };
    charts.push((
        format!(
            "plot_{}_{}_correlation.png",
            options.crosstab_rows, options.crosstab_cols
        ),
        Chart::Heatmap {
            caption,
            heatmap: Heatmap {
                row_desc: options.crosstab_rows.to_string(),
                col_desc: options.crosstab_cols.to_string(),
                row_labels: crosstab.rows().to_vec(),
                col_labels: crosstab.cols().to_vec(),
                values,
                decimals: 0,
            },
        },
    ));

    let transitions = &report.transitions;
    charts.push((
        "plot_transition_matrix.png".to_owned(),
        Chart::Heatmap {
            caption: "Stroke transition probabilities".to_owned(),
            heatmap: Heatmap {
                row_desc: "stroke".to_owned(),
                col_desc: "next stroke".to_owned(),
                row_labels: transitions.categories().to_vec(),
                col_labels: transitions.categories().to_vec(),
                values: transitions.probabilities().to_vec(),
                decimals: 2,
            },
        },
    ));

    let mut arity = report
        .audit
        .arity
        .entries()
        .iter()
        .map(|(parts, count)| (*parts, *count))
        .collect::<Vec<_>>();
    arity.sort_unstable();
    charts.push((
        "plot_labels_per_event.png".to_owned(),
        Chart::Bars(vec![Bars {
            title: "Labels per event".to_owned(),
            x_desc: "parts per label".to_owned(),
            entries: arity.into_iter().map(|(p, c)| (p.to_string(), c)).collect(),
        }]),
    ));

    let (caption, points) = match &report.clusters.clustering {
        Some(clustering) => {
            let points = report
                .clusters
                .standardized
                .iter()
                .zip(&clustering.assignments)
                .map(|(features, &cluster)| (features[0], features[2], cluster))
                .collect();
            ("Video clusters", points)
        }
        None => ("Video clusters (not enough videos)", vec![]),
    };
    charts.push((
        "plot_clusters.png".to_owned(),
        Chart::Scatter {
            caption: caption.to_owned(),
            x_desc: "events per minute (z-score)".to_owned(),
            y_desc: "backhand share (z-score)".to_owned(),
            points,
        },
    ));

    charts
}

fn print_summary(report: &AnalysisReport) {
    println!("Label Analysis Report");
    println!("=====================\n");
    println!("Events: {}", report.table.len());
    println!(
        "Labels with empty parts: {}",
        report.audit.with_empty_part
    );
    println!(
        "Labels with unexpected part count: {}",
        report.audit.malformed
    );
    println!();

    for (column, table) in &report.distributions {
        println!("{column} ({} distinct)", table.len());
        for (value, count) in table.entries() {
            println!("  {value:<24} {count:>6}");
        }
        println!();
    }

    let transitions = &report.transitions;
    println!("Stroke transitions (row: from, column: to)");
    print!("  {:<12}", "");
    for to in transitions.categories() {
        print!(" {to:>10}");
    }
    println!();
    for (from, row) in transitions.categories().iter().zip(transitions.probabilities()) {
        print!("  {from:<12}");
        for p in row {
            print!(" {p:>10.2}");
        }
        println!();
    }
    println!();

    match &report.clusters.clustering {
        Some(clustering) => {
            println!(
                "Video clusters: {} videos, sizes {:?}, inertia {:.3} ({} iterations)",
                report.clusters.features.len(),
                clustering.cluster_sizes(),
                clustering.inertia,
                clustering.iterations
            );
        }
        None => println!("Video clusters: not enough videos"),
    }
}

#[cfg(test)]
mod tests {
    use strokelab_pipeline::record::{Event, EventCollection, LabelSchema};

    use super::*;

    fn report() -> AnalysisReport {
        let mut labels = vec!["forehand_drive"; 12];
        labels.extend(["backhand_drive", "forehand_", "squatting_flip"]);
        let events = labels
            .into_iter()
            .zip(0..)
            .map(|(label, i)| Event {
                frame: i * 10,
                label: label.into(),
                outcome: None,
            })
            .collect();
        let video = EventVideo {
            fps: 30.0,
            height: 720,
            width: 1280,
            num_frames: 1800,
            video: "0000001.mp4".to_owned(),
            events,
        };
        let dataset = Dataset::from_collections([EventCollection::<Simplified>::new(vec![video])]);
        AnalysisReport::new(&dataset, &AnalysisOptions::default())
    }

    #[test]
    fn test_save_tables() {
        let dir = tempfile::tempdir().unwrap();
        save_tables(dir.path(), &report()).unwrap();
        let read = |name: &str| fs::read_to_string(dir.path().join(name)).unwrap();

        let labels = read("csv_labels.csv");
        assert_eq!(labels.lines().count(), 16);
        assert_eq!(
            labels.lines().nth(1),
            Some(r#"0,0,"[""forehand"",""drive""]""#)
        );

        assert_eq!(
            read("csv_empty_labels.csv"),
            "video_id,event_id,label_parts\n0,13,\"[\"\"forehand\"\",\"\"\"\"]\"\n"
        );
        assert_eq!(
            read("csv_label_count.csv"),
            "action,count\ndrive,13\nflip,1\n"
        );
        assert_eq!(
            read("csv_stroke_action_crosstab.csv"),
            "stroke,drive\nforehand,12\n"
        );
        assert_eq!(
            read("csv_transition_matrix.csv"),
            "from,backhand,forehand\nbackhand,0.00,1.00\nforehand,0.08,0.92\n"
        );
        assert_eq!(
            read("csv_clusters.csv"),
            "video,cluster,events_per_minute,mean_gap_secs,backhand_share\n"
        );
    }

    #[test]
    fn test_load_inputs_detects_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        let json = serde_json::json!([{
            "fps": 30.0, "height": 720, "width": 1280, "num_frames": 900,
            "video": "a.mp4",
            "events": [
                {"frame": 30, "label": "forehand_no_drive"},
                {"frame": 60, "label": "backhand_yes_flip"}
            ]
        }]);
        fs::write(&path, json.to_string()).unwrap();

        let dataset = load_inputs(std::slice::from_ref(&path)).unwrap();
        assert_eq!(dataset.schema, LabelSchema::Triple);
        assert_eq!(dataset.num_events(), 2);

        let empty = dir.path().join("empty.json");
        fs::write(&empty, "[]").unwrap();
        assert!(load_inputs(&[empty]).is_err());
    }

    #[test]
    fn test_input_conflicts_with_partition() {
        use clap::Parser as _;

        let parse = |args: &[&str]| {
            command::CommandArgs::try_parse_from(["strokelab", "analyze"].iter().chain(args))
        };
        assert!(parse(&["--input", "a.json", "--input", "b.json"]).is_ok());
        assert!(parse(&["--input", "a.json", "--partition", "v1"]).is_err());
    }

    #[test]
    fn test_charts_cover_empty_tables() {
        let options = AnalysisOptions {
            min_count: 100,
            ..AnalysisOptions::default()
        };
        let dataset = Dataset::from_collections(Vec::<EventCollection<Simplified>>::new());
        let report = AnalysisReport::new(&dataset, &options);

        let charts = charts(&report);

        let names = charts.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
        assert_eq!(
            names,
            [
                "plot_action_distribution.png",
                "plot_stroke_action_correlation.png",
                "plot_transition_matrix.png",
                "plot_labels_per_event.png",
                "plot_clusters.png",
            ]
        );
        let Chart::Heatmap { caption, heatmap } = &charts[1].1 else {
            panic!("expected heatmap");
        };
        assert!(heatmap.row_labels.is_empty());
        assert_eq!(caption, "stroke x action (no category total > 100)");
        let Chart::Scatter { points, .. } = &charts[4].1 else {
            panic!("expected scatter");
        };
        assert!(points.is_empty());
    }

    #[test]
    fn test_charts_follow_report() {
        let charts = charts(&report());
        let Chart::Heatmap { heatmap, .. } = &charts[1].1 else {
            panic!("expected heatmap");
        };
        assert_eq!(heatmap.row_labels, ["forehand"]);
        assert_eq!(heatmap.col_labels, ["drive"]);
        assert_eq!(heatmap.values, [[12.0]]);
    }
}
