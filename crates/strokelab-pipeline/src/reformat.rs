//! Joining video metadata with action spans
//!
//! Each retained video becomes an [`EventVideo`] carrying the extracted frame
//! rate, dimensions and frame count, with one [`Event`] per raw action in
//! annotation order. Videos on the skip list are dropped with a notice;
//! videos without usable metadata are dropped with a warning.

use std::collections::{HashMap, HashSet};

use crate::{
    label::Label,
    record::{
        Decoded, Event, EventCollection, EventVideo, RawExport, RawVideo, Reformatted, VideoInfo,
        VideoInfoRecord,
    },
};

/// Converts a time offset to a frame index.
///
/// Rounds half to even, so `2.5` maps to frame 2 and `3.5` to frame 4.
///
/// ```
/// # use strokelab_pipeline::reformat::frame_index;
/// assert_eq!(frame_index(1.0, 30.0), 30);
/// assert_eq!(frame_index(1.25, 2.0), 2);
/// assert_eq!(frame_index(1.75, 2.0), 4);
/// ```
#[expect(clippy::cast_possible_truncation)]
#[must_use]
pub fn frame_index(seconds: f64, fps: f64) -> i64 {
    (seconds * fps).round_ties_even() as i64
}

/// Video info entries keyed by video name.
#[derive(Debug, Clone, Default)]
pub struct VideoInfoTable {
    entries: HashMap<String, VideoInfoRecord>,
}

impl VideoInfoTable {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, video_name: &str) -> Option<&VideoInfoRecord> {
        self.entries.get(video_name)
    }
}

/// Later entries replace earlier ones with the same video name.
impl FromIterator<VideoInfoRecord> for VideoInfoTable {
    fn from_iter<T: IntoIterator<Item = VideoInfoRecord>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|record| (record.video_name().to_owned(), record))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReformatOptions {
    /// Placeholder outcome attached to every event, omitted when `None`.
    pub outcome: Option<String>,
}

/// Videos dropped while reformatting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReformatReport {
    /// Videos on the skip list.
    pub skipped: Vec<String>,
    /// Videos without metadata or whose extraction failed.
    pub missing_info: Vec<String>,
    pub retained: usize,
}

/// Builds the reformatted event collection.
pub fn reformat(
    info: &VideoInfoTable,
    export: RawExport<Decoded>,
    skip_videos: &HashSet<String>,
    options: &ReformatOptions,
) -> (EventCollection<Reformatted>, ReformatReport) {
    let mut report = ReformatReport::default();
    let mut videos = Vec::with_capacity(export.videos.len());

    for video in export.videos {
        if skip_videos.contains(&video.url) {
            tracing::info!(video = %video.url, "skipping video");
            report.skipped.push(video.url);
            continue;
        }

        let video_info = match info.get(&video.url) {
            Some(VideoInfoRecord::Extracted(video_info)) => video_info,
            Some(VideoInfoRecord::Failed { error, .. }) => {
                tracing::warn!(video = %video.url, %error, "video info extraction failed");
                report.missing_info.push(video.url);
                continue;
            }
            None => {
                tracing::warn!(video = %video.url, "video info not found");
                report.missing_info.push(video.url);
                continue;
            }
        };

        videos.push(reformat_video(video_info, video, options));
    }

    report.retained = videos.len();
    (EventCollection::new(videos), report)
}

fn reformat_video(info: &VideoInfo, video: RawVideo, options: &ReformatOptions) -> EventVideo {
    if info.frame_count <= 0 || info.fps <= 0.0 {
        tracing::warn!(
            video = %video.url,
            frame_count = info.frame_count,
            fps = info.fps,
            "video info reports no frames"
        );
    }
    let events = video
        .actions
        .iter()
        .map(|action| {
            let frame = frame_index(action.start_id, info.fps);
            let end_frame = frame_index(action.end_id, info.fps);
            if end_frame < frame {
                tracing::debug!(
                    video = %video.url,
                    frame,
                    end_frame,
                    "action ends before it starts"
                );
            }
            Event {
                frame,
                label: Label::from_parts(&action.label_names),
                outcome: options.outcome.clone(),
            }
        })
        .collect::<Vec<_>>();
    tracing::debug!(video = %video.url, events = events.len(), "reformatted video");

    EventVideo {
        fps: info.fps,
        height: info.height,
        width: info.width,
        num_frames: info.frame_count,
        video: video.url,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RawAction;

    fn info(name: &str, fps: f64) -> VideoInfoRecord {
        VideoInfoRecord::Extracted(VideoInfo {
            video_name: name.to_owned(),
            width: 1280,
            height: 720,
            frame_count: 900,
            fps,
            duration_secs: Some(900.0 / fps),
        })
    }

    fn video(name: &str, actions: &[(f64, &[&str])]) -> RawVideo {
        RawVideo {
            url: name.to_owned(),
            actions: actions
                .iter()
                .map(|&(start, labels)| RawAction {
                    start_id: start,
                    end_id: start + 1.0,
                    label_names: labels.iter().map(|&s| s.to_owned()).collect(),
                    extra: serde_json::Map::new(),
                })
                .collect(),
            extra: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_frame_index_rounds_half_to_even() {
        assert_eq!(frame_index(0.25, 2.0), 0);
        assert_eq!(frame_index(1.25, 2.0), 2);
        assert_eq!(frame_index(1.75, 2.0), 4);
        assert_eq!(frame_index(1.3, 2.0), 3);
        assert_eq!(frame_index(0.0, 29.97), 0);
    }

    #[test]
    fn test_frame_index_is_deterministic() {
        for (seconds, fps) in [(1.0, 30.0), (12.345, 29.97), (0.5, 59.94)] {
            assert_eq!(frame_index(seconds, fps), frame_index(seconds, fps));
        }
    }

    #[test]
    fn test_reformat_joins_metadata() {
        let table = [info("a.mp4", 30.0)].into_iter().collect::<VideoInfoTable>();
        let export = RawExport::new(vec![video(
            "a.mp4",
            &[(1.0, &["正手", "是", "拉"]), (0.5, &["反手", "否", "挑"])],
        )]);

        let (collection, report) =
            reformat(&table, export, &HashSet::new(), &ReformatOptions::default());

        assert_eq!(report.retained, 1);
        let video = &collection.videos[0];
        assert_eq!(video.fps, 30.0);
        assert_eq!((video.width, video.height, video.num_frames), (1280, 720, 900));
        assert_eq!(video.video, "a.mp4");
        // annotation order is kept even when not temporal
        assert_eq!(video.events[0].frame, 30);
        assert_eq!(video.events[0].label.as_str(), "正手_是_拉");
        assert_eq!(video.events[1].frame, 15);
        assert_eq!(video.events[1].outcome, None);
    }

    #[test]
    fn test_reformat_drops_skipped_and_missing() {
        let table = [
            info("a.mp4", 30.0),
            info("skip.mp4", 30.0),
            VideoInfoRecord::Failed {
                video_name: "broken.mp4".to_owned(),
                error: "Could not open the video file.".to_owned(),
            },
        ]
        .into_iter()
        .collect::<VideoInfoTable>();
        let export = RawExport::new(vec![
            video("skip.mp4", &[(1.0, &["a"])]),
            video("a.mp4", &[(1.0, &["a"])]),
            video("unknown.mp4", &[(1.0, &["a"])]),
            video("broken.mp4", &[(1.0, &["a"])]),
        ]);
        let skip = HashSet::from(["skip.mp4".to_owned()]);

        let (collection, report) = reformat(&table, export, &skip, &ReformatOptions::default());

        assert_eq!(
            collection.videos.iter().map(|v| v.video.as_str()).collect::<Vec<_>>(),
            ["a.mp4"]
        );
        assert_eq!(report.skipped, ["skip.mp4"]);
        assert_eq!(report.missing_info, ["unknown.mp4", "broken.mp4"]);
        assert_eq!(report.retained, 1);
    }

    #[test]
    fn test_reformat_keeps_video_with_negative_frame_count() {
        let records: Vec<VideoInfoRecord> = serde_json::from_str(
            r#"[{"Video Name":"a.mkv","Width":1920,"Height":1080,"Frame Count":-1,
                 "Frame Rate (FPS)":25.0,"Duration (s)":null}]"#,
        )
        .unwrap();
        let table = records.into_iter().collect::<VideoInfoTable>();
        let export = RawExport::new(vec![video("a.mkv", &[(2.0, &["a", "b"])])]);

        let (collection, report) =
            reformat(&table, export, &HashSet::new(), &ReformatOptions::default());

        assert_eq!(report.retained, 1);
        assert!(report.missing_info.is_empty());
        assert_eq!(collection.videos[0].num_frames, -1);
        assert_eq!(collection.videos[0].events[0].frame, 50);
    }

    #[test]
    fn test_reformat_attaches_outcome_placeholder() {
        let table = [info("a.mp4", 25.0)].into_iter().collect::<VideoInfoTable>();
        let export = RawExport::new(vec![video("a.mp4", &[(2.0, &[])])]);
        let options = ReformatOptions {
            outcome: Some("in".to_owned()),
        };

        let (collection, _) = reformat(&table, export, &HashSet::new(), &options);

        let event = &collection.videos[0].events[0];
        assert_eq!(event.frame, 50);
        assert_eq!(event.label.as_str(), "");
        assert_eq!(event.outcome.as_deref(), Some("in"));
    }
}
