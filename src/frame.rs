//! Per-Frame Inputs
//!
//! The host renderer fills these in once per camera per frame and hands them
//! to [`AnalogGlitchPass::evaluate`](crate::AnalogGlitchPass::evaluate):
//!
//! - [`CameraView`]: what kind of view is being rendered and whether
//!   post-processing is enabled for it.
//! - [`FrameResources`]: the frame's active color output slot. The pass reads
//!   it as its source and replaces it with its destination.
//! - [`FrameTime`]: delta and wall-clock time, usually produced by [`Timer`].

use std::time::{Duration, Instant};

use crate::graph::TextureHandle;

/// The kind of view a camera renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CameraKind {
    /// A regular in-game / application camera.
    #[default]
    Game,
    /// An editor or tooling preview (scene view, thumbnails, material previews).
    Preview,
}

/// Camera flags relevant to post-processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraView {
    pub kind: CameraKind,
    pub post_processing_enabled: bool,
}

impl Default for CameraView {
    fn default() -> Self {
        Self {
            kind: CameraKind::Game,
            post_processing_enabled: true,
        }
    }
}

impl CameraView {
    #[inline]
    #[must_use]
    pub fn is_preview(&self) -> bool {
        self.kind == CameraKind::Preview
    }
}

/// The frame's color output slot.
///
/// Passes consume `active_color` and may publish a new texture into it for
/// downstream passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResources {
    /// The texture downstream passes will read as "the scene color".
    pub active_color: TextureHandle,
    /// `true` when `active_color` is the swap-chain image itself and no
    /// intermediate color texture exists.
    pub active_target_is_backbuffer: bool,
}

impl FrameResources {
    /// Resources backed by an intermediate color texture.
    #[must_use]
    pub fn new(active_color: TextureHandle) -> Self {
        Self {
            active_color,
            active_target_is_backbuffer: false,
        }
    }

    /// Resources rendering straight into the swap-chain image.
    #[must_use]
    pub fn backbuffer(active_color: TextureHandle) -> Self {
        Self {
            active_color,
            active_target_is_backbuffer: true,
        }
    }
}

/// Time inputs for one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Time since the previous frame.
    pub delta_seconds: f32,
    /// Wall-clock time since the host started.
    pub time_seconds: f32,
}

impl FrameTime {
    #[must_use]
    pub fn new(delta_seconds: f32, time_seconds: f32) -> Self {
        Self {
            delta_seconds,
            time_seconds,
        }
    }
}

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Advances the timer; call once at the start of each frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    /// Snapshot of the current tick as pass input.
    #[must_use]
    pub fn frame_time(&self) -> FrameTime {
        FrameTime {
            delta_seconds: self.delta.as_secs_f32(),
            time_seconds: self.elapsed.as_secs_f32(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_tick_advances_elapsed() {
        let mut timer = Timer::new();
        assert_eq!(timer.frame_time(), FrameTime::default());
        std::thread::sleep(Duration::from_millis(2));
        timer.tick();
        let t = timer.frame_time();
        assert_eq!(timer.frame_count, 1);
        assert!(t.delta_seconds > 0.0);
        assert!(t.time_seconds >= t.delta_seconds);
    }

    #[test]
    fn default_camera_runs_post_processing() {
        let view = CameraView::default();
        assert!(!view.is_preview());
        assert!(view.post_processing_enabled);
    }
}
