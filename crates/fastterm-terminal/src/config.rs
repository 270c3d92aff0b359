//! Rendering configuration.
//!
//! [`RenderConfig`] collects the knobs a host application usually wants to
//! expose: execution modes for bulk cell work, frame pacing and the alignment
//! used when the terminal is resized. It can be loaded from TOML.

use fastterm_buffer::ExecutionMode;
use fastterm_core::{Alignment, Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for a draw context and its frame loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Execution mode for `draw_cells`.
    pub draw_mode: ExecutionMode,

    /// Execution mode for frame buffer resizes.
    pub resize_mode: ExecutionMode,

    /// Execution mode for clearing the next frame after a publish.
    pub clear_mode: ExecutionMode,

    /// Parallel requests covering fewer cells than this run sequentially.
    pub parallel_threshold: usize,

    /// Frame rate while idle.
    pub target_fps: u32,

    /// Frame rate while something is animating.
    pub max_fps: u32,

    /// Which part of the content survives a terminal resize.
    pub resize_alignment: Alignment,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            draw_mode: ExecutionMode::Sequential,
            resize_mode: ExecutionMode::Sequential,
            clear_mode: ExecutionMode::Sequential,
            parallel_threshold: 16 * 1024,
            target_fps: 30,
            max_fps: 60,
            resize_alignment: Alignment::TopLeft,
        }
    }
}

impl RenderConfig {
    /// Parses a configuration from TOML. Missing keys keep their defaults.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastterm_buffer::ExecutionMode;
    /// use fastterm_core::Alignment;
    /// use fastterm_terminal::RenderConfig;
    ///
    /// let config = RenderConfig::from_toml_str(
    ///     r#"
    ///     draw_mode = "parallel"
    ///     resize_alignment = "bottom-right"
    ///     "#,
    /// )
    /// .unwrap();
    /// assert_eq!(config.draw_mode, ExecutionMode::Parallel);
    /// assert_eq!(config.resize_alignment, Alignment::BottomRight);
    /// assert_eq!(config.target_fps, 30);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Serializes the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| Error::Config(e.to_string()))
    }

    /// Uses parallel execution for every bulk operation.
    pub fn parallel() -> Self {
        Self {
            draw_mode: ExecutionMode::Parallel,
            resize_mode: ExecutionMode::Parallel,
            clear_mode: ExecutionMode::Parallel,
            ..Default::default()
        }
    }

    /// Builder: set the draw execution mode.
    pub fn with_draw_mode(mut self, mode: ExecutionMode) -> Self {
        self.draw_mode = mode;
        self
    }

    /// Builder: set the resize execution mode.
    pub fn with_resize_mode(mut self, mode: ExecutionMode) -> Self {
        self.resize_mode = mode;
        self
    }

    /// Builder: set the clear execution mode.
    pub fn with_clear_mode(mut self, mode: ExecutionMode) -> Self {
        self.clear_mode = mode;
        self
    }

    /// Builder: set the parallel threshold in cells.
    pub fn with_parallel_threshold(mut self, cells: usize) -> Self {
        self.parallel_threshold = cells;
        self
    }

    /// Builder: set idle and animating frame rates.
    pub fn with_fps(mut self, target_fps: u32, max_fps: u32) -> Self {
        self.target_fps = target_fps;
        self.max_fps = max_fps;
        self
    }

    /// Builder: set the resize alignment.
    pub fn with_resize_alignment(mut self, alignment: Alignment) -> Self {
        self.resize_alignment = alignment;
        self
    }

    /// Returns the mode to actually use for `requested` work over `cells` cells.
    #[inline]
    pub const fn mode_for(&self, requested: ExecutionMode, cells: usize) -> ExecutionMode {
        requested.for_workload(cells, self.parallel_threshold)
    }
}
