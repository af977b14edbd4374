//! Raster charts of analysis results

use std::path::Path;

use plotters::{
    prelude::*,
    style::text_anchor::{HPos, Pos, VPos},
};

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(70, 110, 180);

/// One bar chart panel.
#[derive(Debug, Clone)]
pub struct Bars {
    pub title: String,
    pub x_desc: String,
    pub entries: Vec<(String, u64)>,
}

/// A labeled matrix drawn as colored cells with the values written in.
#[derive(Debug, Clone)]
pub struct Heatmap {
    pub row_desc: String,
    pub col_desc: String,
    pub row_labels: Vec<String>,
    pub col_labels: Vec<String>,
    /// `values[row][col]`
    pub values: Vec<Vec<f64>>,
    pub decimals: usize,
}

/// A chart ready to be drawn to a file.
#[derive(Debug, Clone)]
pub enum Chart {
    Bars(Vec<Bars>),
    Heatmap {
        caption: String,
        heatmap: Heatmap,
    },
    Scatter {
        caption: String,
        x_desc: String,
        y_desc: String,
        points: Vec<(f64, f64, usize)>,
    },
}

impl Chart {
    pub fn draw(&self, path: &Path) -> anyhow::Result<()> {
        match self {
            Self::Bars(panels) => bar_charts(path, panels),
            Self::Heatmap { caption, heatmap } => self::heatmap(path, caption, heatmap),
            Self::Scatter {
                caption,
                x_desc,
                y_desc,
                points,
            } => scatter(path, caption, (x_desc.as_str(), y_desc.as_str()), points),
        }
    }
}

/// Bar chart panels side by side in one figure.
pub fn bar_charts(path: &Path, panels: &[Bars]) -> anyhow::Result<()> {
    let width = 640 * u32::try_from(panels.len().max(1))?;
    let root = BitMapBackend::new(path, (width, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    for (area, panel) in root.split_evenly((1, panels.len().max(1))).iter().zip(panels) {
        let y_max = panel.entries.iter().map(|(_, c)| *c).max().unwrap_or(0) + 1;
        let labels = panel.entries.iter().map(|(l, _)| l.as_str()).collect::<Vec<_>>();

        let mut chart = ChartBuilder::on(area)
            .caption(&panel.title, (FONT, 24))
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(60)
            .build_cartesian_2d((0..labels.len().max(1)).into_segmented(), 0..y_max)?;
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(labels.len())
            .x_label_formatter(&|v| segment_label(v, &labels))
            .x_desc(&panel.x_desc)
            .y_desc("count")
            .draw()?;
        chart.draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(4)
                .data(panel.entries.iter().enumerate().map(|(i, (_, c))| (i, *c))),
        )?;
    }

    root.present()?;
    Ok(())
}

/// Annotated heatmap; an empty matrix still yields a captioned frame.
pub fn heatmap(path: &Path, caption: &str, heatmap: &Heatmap) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (900, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let rows = heatmap.row_labels.len();
    let cols = heatmap.col_labels.len();
    let max = heatmap
        .values
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);
    // rows are drawn top-down
    let row_labels = heatmap.row_labels.iter().rev().map(String::as_str).collect::<Vec<_>>();
    let col_labels = heatmap.col_labels.iter().map(String::as_str).collect::<Vec<_>>();

    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT, 28))
        .margin(20)
        .x_label_area_size(80)
        .y_label_area_size(120)
        .build_cartesian_2d(
            (0..cols.max(1)).into_segmented(),
            (0..rows.max(1)).into_segmented(),
        )?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(cols)
        .y_labels(rows)
        .x_label_formatter(&|v| segment_label(v, &col_labels))
        .y_label_formatter(&|v| segment_label(v, &row_labels))
        .x_desc(&heatmap.col_desc)
        .y_desc(&heatmap.row_desc)
        .draw()?;

    let cells = heatmap.values.iter().enumerate().flat_map(|(r, row)| {
        let y = rows - 1 - r;
        row.iter().enumerate().map(move |(c, &value)| (c, y, value))
    });
    chart.draw_series(cells.clone().map(|(x, y, value)| {
        Rectangle::new(
            [
                (SegmentValue::Exact(x), SegmentValue::Exact(y)),
                (SegmentValue::Exact(x + 1), SegmentValue::Exact(y + 1)),
            ],
            cell_color(value, max).filled(),
        )
    }))?;

    let text_style = TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.map(|(x, y, value)| {
        Text::new(
            format!("{value:.prec$}", prec = heatmap.decimals),
            (SegmentValue::CenterOf(x), SegmentValue::CenterOf(y)),
            text_style.clone(),
        )
    }))?;

    root.present()?;
    Ok(())
}

/// Scatter plot of `(x, y, group)` points, one color per group.
pub fn scatter(
    path: &Path,
    caption: &str,
    (x_desc, y_desc): (&str, &str),
    points: &[(f64, f64, usize)],
) -> anyhow::Result<()> {
    let root = BitMapBackend::new(path, (900, 700)).into_drawing_area();
    root.fill(&WHITE)?;

    let x_range = padded_range(points.iter().map(|p| p.0));
    let y_range = padded_range(points.iter().map(|p| p.1));
    let mut chart = ChartBuilder::on(&root)
        .caption(caption, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;
    chart.configure_mesh().x_desc(x_desc).y_desc(y_desc).draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(x, y, group)| Circle::new((x, y), 6, Palette99::pick(group).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn segment_label(value: &SegmentValue<usize>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i).copied().unwrap_or_default().to_owned(),
        SegmentValue::Exact(_) | SegmentValue::Last => String::new(),
    }
}

/// White for 0, shading to [`BAR_COLOR`] at `max`.
#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn cell_color(value: f64, max: f64) -> RGBColor {
    let t = if max > 0.0 { (value / max).clamp(0.0, 1.0) } else { 0.0 };
    let mix = |c: u8| (255.0 - (255.0 - f64::from(c)) * t).round() as u8;
    RGBColor(mix(BAR_COLOR.0), mix(BAR_COLOR.1), mix(BAR_COLOR.2))
}

fn padded_range<I>(values: I) -> std::ops::Range<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (min, max) = values
        .into_iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if min > max {
        return -1.0..1.0;
    }
    let pad = ((max - min) * 0.1).max(0.5);
    (min - pad)..(max + pad)
}
