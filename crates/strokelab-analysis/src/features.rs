//! Per-video numeric features for clustering

use strokelab_pipeline::record::{EventVideo, LabelSchema};
use strokelab_stats::{
    descriptive::DescriptiveStats,
    kmeans::{self, Clustering, KMeans},
};

use crate::schema::{self, Column, STROKE_CATEGORIES};

pub const FEATURE_NAMES: [&str; 3] = ["events_per_minute", "mean_gap_secs", "backhand_share"];

/// Annotation density and stroke mix of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFeatures {
    pub video: String,
    pub events_per_minute: f64,
    /// Mean time between consecutive events ordered by frame; 0 for a single
    /// event.
    pub mean_gap_secs: f64,
    /// Share of backhand strokes among in-category strokes.
    pub backhand_share: f64,
}

impl VideoFeatures {
    /// Computes the features, or `None` if they are undefined for the video.
    ///
    /// Features are undefined for a video without events, with a
    /// non-positive frame rate or frame count, or without a single stroke in
    /// [`STROKE_CATEGORIES`].
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_video(schema: LabelSchema, video: &EventVideo) -> Option<Self> {
        if video.events.is_empty() || video.fps <= 0.0 || video.num_frames <= 0 {
            return None;
        }

        let minutes = video.num_frames as f64 / video.fps / 60.0;
        let events_per_minute = video.events.len() as f64 / minutes;

        let mut frames = video.events.iter().map(|e| e.frame).collect::<Vec<_>>();
        frames.sort_unstable();
        let gaps = frames
            .windows(2)
            .map(|w| (w[1] - w[0]) as f64 / video.fps);
        let mean_gap_secs = DescriptiveStats::new(gaps).map_or(0.0, |stats| stats.mean);

        let stroke_index = schema::column_index(schema, Column::Stroke)?;
        let (backhand, in_category) = video
            .events
            .iter()
            .filter_map(|e| e.label.parts().nth(stroke_index).map(str::trim))
            .filter(|stroke| STROKE_CATEGORIES.contains(stroke))
            .fold((0_usize, 0_usize), |(backhand, total), stroke| {
                (backhand + usize::from(stroke == "backhand"), total + 1)
            });
        if in_category == 0 {
            return None;
        }

        Some(Self {
            video: video.video.clone(),
            events_per_minute,
            mean_gap_secs,
            backhand_share: backhand as f64 / in_category as f64,
        })
    }

    #[must_use]
    pub fn to_vector(&self) -> Vec<f64> {
        vec![
            self.events_per_minute,
            self.mean_gap_secs,
            self.backhand_share,
        ]
    }
}

/// Videos grouped by their standardized features.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterView {
    /// Videos with defined features, in dataset order.
    pub features: Vec<VideoFeatures>,
    /// Standardized feature vectors, parallel to `features`.
    pub standardized: Vec<Vec<f64>>,
    /// `None` when fewer videos than clusters have defined features.
    pub clustering: Option<Clustering>,
}

impl ClusterView {
    #[must_use]
    pub fn new(schema: LabelSchema, videos: &[EventVideo], kmeans: &KMeans) -> Self {
        let features = videos
            .iter()
            .filter_map(|video| {
                let features = VideoFeatures::from_video(schema, video);
                if features.is_none() {
                    tracing::debug!(video = %video.video, "features undefined, video excluded from clustering");
                }
                features
            })
            .collect::<Vec<_>>();

        let mut standardized = features
            .iter()
            .map(VideoFeatures::to_vector)
            .collect::<Vec<_>>();
        kmeans::standardize(&mut standardized);

        let clustering = kmeans.fit(&standardized);
        if clustering.is_none() {
            tracing::warn!(
                videos = features.len(),
                clusters = kmeans.k,
                "not enough videos with defined features for clustering"
            );
        }

        Self {
            features,
            standardized,
            clustering,
        }
    }
}

#[cfg(test)]
mod tests {
    use strokelab_pipeline::record::Event;

    use super::*;

    fn video(name: &str, fps: f64, num_frames: i64, events: &[(i64, &str)]) -> EventVideo {
        EventVideo {
            fps,
            height: 720,
            width: 1280,
            num_frames,
            video: name.to_owned(),
            events: events
                .iter()
                .map(|(frame, label)| Event {
                    frame: *frame,
                    label: (*label).into(),
                    outcome: None,
                })
                .collect(),
        }
    }

    #[test]
    fn test_features() {
        // 1 minute at 30 fps; frames out of order on purpose
        let video = video(
            "a.mp4",
            30.0,
            1800,
            &[
                (90, "forehand_drive"),
                (0, "backhand_flip"),
                (30, "forehand_serve"),
                (150, "squatting_drive"),
            ],
        );
        let features = VideoFeatures::from_video(LabelSchema::Pair, &video).unwrap();
        assert!((features.events_per_minute - 4.0).abs() < 1e-9);
        // gaps 1s, 2s, 2s
        assert!((features.mean_gap_secs - 5.0 / 3.0).abs() < 1e-9);
        assert!((features.backhand_share - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_undefined_features() {
        let schema = LabelSchema::Pair;
        assert!(VideoFeatures::from_video(schema, &video("a", 30.0, 1800, &[])).is_none());
        let event = [(0, "forehand_drive")];
        assert!(VideoFeatures::from_video(schema, &video("a", 0.0, 1800, &event)).is_none());
        assert!(VideoFeatures::from_video(schema, &video("a", 30.0, 0, &event)).is_none());
        assert!(VideoFeatures::from_video(schema, &video("a", 30.0, -1, &event)).is_none());
        let other = [(0, "squatting_drive")];
        assert!(VideoFeatures::from_video(schema, &video("a", 30.0, 1800, &other)).is_none());

        let single = VideoFeatures::from_video(schema, &video("a", 30.0, 1800, &event)).unwrap();
        assert_eq!(single.mean_gap_secs, 0.0);
    }

    #[test]
    fn test_too_few_videos_for_clustering() {
        let videos = [
            video("a", 30.0, 1800, &[(0, "forehand_drive")]),
            video("b", 30.0, 1800, &[(0, "backhand_drive")]),
        ];
        let view = ClusterView::new(LabelSchema::Pair, &videos, &KMeans::default());
        assert_eq!(view.features.len(), 2);
        assert!(view.clustering.is_none());
    }

    #[test]
    fn test_cluster_view() {
        let videos = (0..6)
            .map(|i| {
                let stroke = if i % 2 == 0 { "forehand_drive" } else { "backhand_drive" };
                let events = (0..=i).map(|j| (j * 30, stroke)).collect::<Vec<_>>();
                video(&format!("{i}.mp4"), 30.0, 1800, &events)
            })
            .collect::<Vec<_>>();
        let view = ClusterView::new(LabelSchema::Pair, &videos, &KMeans::default());
        let clustering = view.clustering.unwrap();
        assert_eq!(clustering.assignments.len(), 6);
        assert_eq!(view.standardized.len(), 6);
        assert!(clustering.assignments.iter().all(|&c| c < 3));
    }
}
