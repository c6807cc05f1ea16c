//! Snapping engine for timeline interactions.

use propreel_core::{ClipId, EditorConfig, Frame};
use propreel_timeline::Project;

/// A point on the timeline that can be snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapPoint {
    pub frame: Frame,
    pub kind: SnapKind,
}

/// Kind of snap point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Playhead,
    ClipEdge,
    /// Whole-second boundary.
    Second,
}

/// Outcome of a snap query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snap {
    /// Snapped frame, or the input frame when nothing was in range.
    pub frame: Frame,
    /// The point that won, if any.
    pub target: Option<SnapKind>,
}

impl Snap {
    fn none(frame: Frame) -> Self {
        Self {
            frame,
            target: None,
        }
    }

    pub fn snapped(&self) -> bool {
        self.target.is_some()
    }
}

/// Engine for computing snap targets.
#[derive(Debug, Clone)]
pub struct SnapEngine {
    pub enabled: bool,
    /// Snap distance in pixels (divided by zoom to get frames).
    pub threshold_px: f32,
}

/// Second markers always extend at least this far past the playhead.
const MARKER_LOOKAHEAD_SECONDS: Frame = 5;

/// Whole-second markers `0, spacing, 2 * spacing, ..` up to `limit`.
///
/// Kept implicit: a long timeline has far more markers than a query needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecondMarkers {
    pub spacing: Frame,
    pub limit: Frame,
}

impl SecondMarkers {
    /// Marker closest to `frame`, the earlier one on a tie.
    pub fn nearest(&self, frame: Frame) -> Option<Frame> {
        if self.spacing == 0 {
            return None;
        }
        let last = self.limit / self.spacing * self.spacing;
        let below = frame.min(last) / self.spacing * self.spacing;
        let above = below.saturating_add(self.spacing);
        if above > last || frame - below <= above - frame {
            Some(below)
        } else {
            Some(above)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Frame> {
        (0..=self.limit).step_by(self.spacing.max(1) as usize)
    }
}

/// Everything a snap query considers.
#[derive(Debug, Clone)]
pub struct SnapCandidates {
    /// Playhead, then clip edges in track order.
    pub points: Vec<SnapPoint>,
    /// Scanned after `points`.
    pub seconds: SecondMarkers,
}

impl SnapEngine {
    pub fn new(threshold_px: f32) -> Self {
        Self {
            enabled: true,
            threshold_px,
        }
    }

    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(config.snap_threshold_px)
    }

    /// Collect snap candidates from the project, in scan order: playhead,
    /// clip edges (track by track, in track order), then second markers.
    ///
    /// `exclude` drops the edges of the clip being dragged or resized so it
    /// cannot snap to itself.
    pub fn collect_snap_points(project: &Project, exclude: Option<ClipId>) -> SnapCandidates {
        let mut points = vec![SnapPoint {
            frame: project.current_frame,
            kind: SnapKind::Playhead,
        }];

        for track in &project.tracks {
            for clip in project.clips_on_track(track.id) {
                if Some(clip.id) == exclude {
                    continue;
                }
                points.push(SnapPoint {
                    frame: clip.start_frame,
                    kind: SnapKind::ClipEdge,
                });
                points.push(SnapPoint {
                    frame: clip.end_frame(),
                    kind: SnapKind::ClipEdge,
                });
            }
        }

        let fps = project.frame_rate.whole_fps();
        let limit = project
            .max_clip_end()
            .max(project.current_frame.saturating_add(MARKER_LOOKAHEAD_SECONDS * fps));

        SnapCandidates {
            points,
            seconds: SecondMarkers {
                spacing: fps,
                limit,
            },
        }
    }

    /// Snap threshold in frames at the given zoom.
    pub fn threshold_frames(&self, pixels_per_frame: f32) -> f64 {
        f64::from(self.threshold_px) / f64::from(pixels_per_frame)
    }

    /// Find the closest snap point within the threshold.
    ///
    /// Ties go to the first point in scan order.
    pub fn find_snap(&self, frame: Frame, points: &[SnapPoint], pixels_per_frame: f32) -> Snap {
        self.nearest_within(frame, points, None, pixels_per_frame)
    }

    /// Like [`Self::find_snap`], with the second markers scanned last.
    pub fn find_snap_among(
        &self,
        frame: Frame,
        candidates: &SnapCandidates,
        pixels_per_frame: f32,
    ) -> Snap {
        self.nearest_within(frame, &candidates.points, Some(candidates.seconds), pixels_per_frame)
    }

    fn nearest_within(
        &self,
        frame: Frame,
        points: &[SnapPoint],
        seconds: Option<SecondMarkers>,
        pixels_per_frame: f32,
    ) -> Snap {
        if !self.enabled || pixels_per_frame <= 0.0 || !pixels_per_frame.is_finite() {
            return Snap::none(frame);
        }
        let threshold = self.threshold_frames(pixels_per_frame);

        let mut best: Option<(SnapPoint, Frame)> = None;
        let mut consider = |point: SnapPoint| {
            let distance = point.frame.abs_diff(frame);
            if distance as f64 > threshold {
                return;
            }
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((point, distance));
            }
        };
        for point in points {
            consider(*point);
        }
        if let Some(marker) = seconds.and_then(|m| m.nearest(frame)) {
            consider(SnapPoint {
                frame: marker,
                kind: SnapKind::Second,
            });
        }

        match best {
            Some((point, _)) => Snap {
                frame: point.frame,
                target: Some(point.kind),
            },
            None => Snap::none(frame),
        }
    }

    /// Snap `frame` against the project's current candidates at its zoom.
    pub fn snap_frame(&self, project: &Project, frame: Frame, exclude: Option<ClipId>) -> Snap {
        let candidates = Self::collect_snap_points(project, exclude);
        self.find_snap_among(frame, &candidates, project.zoom)
    }

    /// Snap a clip moving to `new_start`, trying its start edge first and its
    /// end edge second. Returns the resulting start frame.
    pub fn snap_clip(
        &self,
        project: &Project,
        clip_id: ClipId,
        duration: Frame,
        new_start: Frame,
    ) -> Snap {
        let candidates = Self::collect_snap_points(project, Some(clip_id));

        let start = self.find_snap_among(new_start, &candidates, project.zoom);
        if start.snapped() {
            return start;
        }

        let end_frame = new_start.saturating_add(duration);
        let end = self.find_snap_among(end_frame, &candidates, project.zoom);
        if end.snapped() && end.frame >= duration {
            return Snap {
                frame: end.frame - duration,
                target: end.target,
            };
        }

        Snap::none(new_start)
    }
}

impl Default for SnapEngine {
    fn default() -> Self {
        Self::new(EditorConfig::default().snap_threshold_px)
    }
}
