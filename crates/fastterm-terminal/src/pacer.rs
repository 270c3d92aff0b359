//! Frame pacing for the publish loop.

use std::time::{Duration, Instant};

use crate::config::RenderConfig;

/// Paces a render loop and keeps publish statistics.
///
/// Runs at `target_fps` normally and at `max_fps` while at least one
/// animation has requested live mode. Publishes that were refused because the
/// previous frame was still flushing are counted as dropped frames.
#[derive(Debug, Clone)]
pub struct FramePacer {
    target_frame_time: Duration,
    live_frame_time: Duration,
    live_count: u32,
    last_frame: Instant,
    sample_start: Instant,
    sample_frames: u32,
    measured_fps: f32,
    published: u64,
    dropped: u64,
}

impl Default for FramePacer {
    fn default() -> Self {
        Self::new(30, 60)
    }
}

impl FramePacer {
    /// Creates a pacer running at `target_fps`, or `max_fps` when live.
    pub fn new(target_fps: u32, max_fps: u32) -> Self {
        let target_fps = target_fps.max(1);
        let max_fps = max_fps.max(target_fps);
        let now = Instant::now();

        Self {
            target_frame_time: Duration::from_secs_f64(1.0 / f64::from(target_fps)),
            live_frame_time: Duration::from_secs_f64(1.0 / f64::from(max_fps)),
            live_count: 0,
            last_frame: now,
            sample_start: now,
            sample_frames: 0,
            measured_fps: 0.0,
            published: 0,
            dropped: 0,
        }
    }

    /// Creates a pacer from the frame rates in `config`.
    pub fn from_config(config: &RenderConfig) -> Self {
        Self::new(config.target_fps, config.max_fps)
    }

    /// Requests the faster live frame rate. Pair with [`drop_live`](Self::drop_live).
    pub fn request_live(&mut self) {
        self.live_count += 1;
    }

    /// Releases one live request.
    pub fn drop_live(&mut self) {
        self.live_count = self.live_count.saturating_sub(1);
    }

    /// Returns whether any live request is outstanding.
    #[inline]
    pub fn is_live(&self) -> bool {
        self.live_count > 0
    }

    /// Returns the frame budget currently in effect.
    #[inline]
    pub fn frame_time(&self) -> Duration {
        if self.is_live() {
            self.live_frame_time
        } else {
            self.target_frame_time
        }
    }

    /// Returns how long to wait after a frame that took `elapsed`.
    pub fn frame_delay(&self, elapsed: Duration) -> Duration {
        self.frame_time().saturating_sub(elapsed)
    }

    /// Marks the start of a frame and returns the time since the previous one.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;
        self.sample_frames += 1;

        let sample = now.duration_since(self.sample_start);
        if sample >= Duration::from_secs(1) {
            self.measured_fps = self.sample_frames as f32 / sample.as_secs_f32();
            self.sample_frames = 0;
            self.sample_start = now;
        }

        delta
    }

    /// Records the outcome of a publish attempt.
    pub fn record_publish(&mut self, published: bool) {
        if published {
            self.published += 1;
        } else {
            self.dropped += 1;
        }
    }

    /// Returns the frames per second measured over the last full second.
    #[inline]
    pub fn measured_fps(&self) -> f32 {
        self.measured_fps
    }

    /// Returns how many frames were handed to the terminal.
    #[inline]
    pub fn published_frames(&self) -> u64 {
        self.published
    }

    /// Returns how many frames were dropped because a flush was in flight.
    #[inline]
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Sleeps for the rest of the frame budget.
    pub async fn wait(&self, elapsed: Duration) {
        let delay = self.frame_delay(elapsed);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}
