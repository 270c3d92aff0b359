//! The triple-buffered draw context.
//!
//! A [`DrawContext`] owns three frame buffers:
//!
//! - `current`: the frame being drawn, exclusively owned by the caller
//! - `staged`: the last published frame, being diffed and written out
//! - `previously_staged`: the frame before that, the diff baseline
//!
//! [`DrawContext::publish`] rotates the roles and hands the diff of `staged`
//! against `previously_staged` to the blocking pool. Only one flush runs at a
//! time; while it does, `publish` refuses and the caller drops the frame.

use std::fmt;
use std::sync::Arc;

use fastterm_buffer::{Cell, ExecutionMode, FrameBuffer, SizeChange};
use fastterm_core::{Alignment, Error, Point, Rect, Result, Size};
use futures::FutureExt;
use smallvec::SmallVec;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

use crate::config::RenderConfig;
use crate::diff::{FrameStats, write_frame};
use crate::output::RawOutput;
use crate::writer::SharedWriter;

type SizeListener = Box<dyn Fn(&SizeChange) + Send + Sync>;

/// Draws frames into a back buffer and publishes them to a terminal.
///
/// # Examples
///
/// ```
/// use fastterm_buffer::{Cell, ExecutionMode};
/// use fastterm_core::{Alignment, Color, Rect, Size};
/// use fastterm_terminal::{CaptureOutput, DrawContext, Writer};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> fastterm_core::Result<()> {
/// let capture = CaptureOutput::new();
/// let writer = Writer::new(capture.clone()).shared();
/// let mut ctx = DrawContext::new(Size::new(8, 2));
///
/// let bounds = ctx.current().bounds();
/// ctx.push_rectangle(bounds, Alignment::TopLeft);
/// ctx.push_rectangle(Rect::new(0, 0, 2, 1), Alignment::BottomRight);
/// ctx.draw_cells(ExecutionMode::Sequential, |p| {
///     Cell::styled(['h', 'i'][p.x as usize], Color::WHITE, Color::BLACK)
/// });
///
/// assert!(ctx.publish(&writer));
/// let stats = ctx.close().await?.expect("a frame was published");
/// assert!(stats.full_repaint);
/// assert!(capture.text().contains("hi"));
/// # Ok(())
/// # }
/// ```
pub struct DrawContext {
    current: FrameBuffer,
    staged: Arc<FrameBuffer>,
    previously_staged: Arc<FrameBuffer>,
    rectangles: SmallVec<[Rect; 8]>,
    flush_task: Option<JoinHandle<Result<FrameStats>>>,
    last_flush: Option<Result<FrameStats>>,
    listeners: Vec<SizeListener>,
    config: RenderConfig,
}

impl DrawContext {
    /// Creates a context drawing at `size` with the default configuration.
    pub fn new(size: Size) -> Self {
        Self::with_config(size, RenderConfig::default())
    }

    /// Creates a context drawing at `size`.
    ///
    /// The published buffers start empty, so the first frame is repainted in
    /// full.
    pub fn with_config(size: Size, config: RenderConfig) -> Self {
        Self {
            current: FrameBuffer::new(size),
            staged: Arc::new(FrameBuffer::new(Size::ZERO)),
            previously_staged: Arc::new(FrameBuffer::new(Size::ZERO)),
            rectangles: SmallVec::new(),
            flush_task: None,
            last_flush: None,
            listeners: Vec::new(),
            config,
        }
    }

    /// Returns the configuration.
    #[inline]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    /// Returns the frame being drawn.
    #[inline]
    pub fn current(&self) -> &FrameBuffer {
        &self.current
    }

    /// Returns the frame being drawn, for direct cell access.
    #[inline]
    pub fn current_mut(&mut self) -> &mut FrameBuffer {
        &mut self.current
    }

    /// Returns the last published frame.
    #[inline]
    pub fn staged(&self) -> &FrameBuffer {
        &self.staged
    }

    /// Returns the frame published before [`staged`](Self::staged).
    #[inline]
    pub fn previously_staged(&self) -> &FrameBuffer {
        &self.previously_staged
    }

    /// Returns the size of the frame being drawn.
    #[inline]
    pub fn size(&self) -> Size {
        self.current.size()
    }

    /// Resizes the frame being drawn.
    ///
    /// The published frames keep their size, so the next publish after a
    /// resize repaints everything.
    pub fn resize(&mut self, size: Size, alignment: Alignment, mode: ExecutionMode) {
        let old = self.current.size();
        if old == size {
            return;
        }

        let mode = self.config.mode_for(mode, size.area().max(old.area()));
        self.current.resize(size, alignment, mode);

        let change = SizeChange {
            old,
            new: size,
            alignment,
        };
        for listener in &self.listeners {
            listener(&change);
        }
    }

    /// Registers a listener called after every [`resize`](Self::resize).
    pub fn on_size_changed<F>(&mut self, listener: F)
    where
        F: Fn(&SizeChange) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ========================================================================
    // Rectangle stack
    // ========================================================================

    /// Pushes `rect` placed inside the current rectangle by `alignment`.
    ///
    /// The pushed rectangle is clipped to the current one, so nesting can only
    /// shrink the drawable area. A request that does not overlap pushes
    /// [`Rect::ZERO`]. Returns the rectangle that was pushed.
    pub fn push_rectangle(&mut self, rect: Rect, alignment: Alignment) -> Rect {
        let top = self.rectangle();
        let pushed = top
            .intersection(alignment.place(top, rect))
            .unwrap_or(Rect::ZERO);
        self.rectangles.push(pushed);
        pushed
    }

    /// Pops the current rectangle. Returns whether there was one.
    pub fn pop_rectangle(&mut self) -> bool {
        self.rectangles.pop().is_some()
    }

    /// Returns the current rectangle, or [`Rect::PLANE`] when none is pushed.
    #[inline]
    pub fn rectangle(&self) -> Rect {
        self.rectangles.last().copied().unwrap_or(Rect::PLANE)
    }

    /// Returns whether the current rectangle has a drawable area.
    #[inline]
    pub fn is_rectangle_not_empty(&self) -> bool {
        let rect = self.rectangle();
        rect.width > 0 && rect.height > 0
    }

    /// Returns how many rectangles are pushed.
    #[inline]
    pub fn rectangle_depth(&self) -> usize {
        self.rectangles.len()
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Fills the current rectangle with cells produced by `callback`.
    ///
    /// `callback` receives coordinates relative to the rectangle origin and
    /// may run on several threads at once in parallel mode. See
    /// [`FrameBuffer::draw_cells`] for how candidates are composed.
    pub fn draw_cells<F>(&mut self, mode: ExecutionMode, callback: F)
    where
        F: Fn(Point) -> Cell + Sync,
    {
        let rect = self.rectangle();
        let cells = rect
            .intersection(self.current.bounds())
            .map_or(0, Rect::area);
        let mode = self.config.mode_for(mode, cells);
        self.current.draw_cells(rect, mode, callback);
    }

    // ========================================================================
    // Publishing
    // ========================================================================

    /// Publishes the current frame to `writer`.
    ///
    /// Returns `false` without touching anything while the previous frame is
    /// still being written. Otherwise rotates the buffers, clears the
    /// rectangle stack, prepares an empty frame at the published size for
    /// drawing, starts the diff on the blocking pool and returns `true`.
    ///
    /// Outside a Tokio runtime the diff runs on the calling thread.
    pub fn publish<O: RawOutput>(&mut self, writer: &SharedWriter<O>) -> bool {
        if self.is_flush_in_flight() {
            debug!("previous frame still flushing, dropping this one");
            return false;
        }
        self.collect_finished();
        if self.flush_task.is_some() {
            return false;
        }
        self.rotate();

        let staged = Arc::clone(&self.staged);
        let previous = Arc::clone(&self.previously_staged);
        let writer = Arc::clone(writer);
        let flush = move || {
            let mut writer = writer.blocking_lock();
            let stats = write_frame(&staged, &previous, &mut *writer)?;
            trace!(?stats, size = %staged.size(), "frame flushed");
            Ok(stats)
        };

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => self.flush_task = Some(handle.spawn_blocking(flush)),
            Err(_) => self.record(flush()),
        }
        true
    }

    fn rotate(&mut self) {
        let retired = std::mem::replace(&mut self.previously_staged, Arc::clone(&self.staged));
        let recycled = Arc::try_unwrap(retired).unwrap_or_else(|shared| {
            warn!("retired frame still shared, allocating a new one");
            FrameBuffer::new(shared.size())
        });
        let finished = std::mem::replace(&mut self.current, recycled);
        self.staged = Arc::new(finished);
        self.rectangles.clear();

        let size = self.staged.size();
        self.current.set_size(size);
        let mode = self.config.mode_for(self.config.clear_mode, size.area());
        self.current.clear(mode);
    }

    /// Moves the result of a finished flush into `last_flush`.
    ///
    /// The handle is polled outside the cooperative budget, so a finished task
    /// always yields its result. A handle that still reports pending stays in
    /// place.
    fn collect_finished(&mut self) {
        let Some(task) = self.flush_task.as_mut() else {
            return;
        };
        let Some(joined) = tokio::task::unconstrained(task).now_or_never() else {
            debug!("flush task not ready yet, keeping it");
            return;
        };
        self.flush_task = None;
        let result = joined
            .map_err(|e| Error::FlushTask(e.to_string()))
            .and_then(|r| r);
        self.record(result);
    }

    fn record(&mut self, result: Result<FrameStats>) {
        if let Err(e) = &result {
            warn!(error = %e, "frame flush failed");
        }
        self.last_flush = Some(result);
    }

    /// Returns whether a flush task is still running.
    #[inline]
    pub fn is_flush_in_flight(&self) -> bool {
        self.flush_task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Returns the error of the last collected flush, if it failed.
    ///
    /// Results are collected by the next [`publish`](Self::publish),
    /// [`wait_flush`](Self::wait_flush) or
    /// [`take_flush_result`](Self::take_flush_result).
    pub fn last_flush_error(&self) -> Option<&Error> {
        self.last_flush.as_ref().and_then(|result| result.as_ref().err())
    }

    /// Takes the result of the most recent finished flush.
    pub fn take_flush_result(&mut self) -> Option<Result<FrameStats>> {
        if !self.is_flush_in_flight() {
            self.collect_finished();
        }
        self.last_flush.take()
    }

    /// Waits for the in-flight flush, if any, and records its result.
    pub async fn wait_flush(&mut self) {
        if let Some(task) = self.flush_task.take() {
            let result = task
                .await
                .map_err(|e| Error::FlushTask(e.to_string()))
                .and_then(|r| r);
            self.record(result);
        }
    }

    /// Waits for the outstanding flush and returns the last flush result.
    pub async fn close(mut self) -> Result<Option<FrameStats>> {
        self.wait_flush().await;
        self.last_flush.take().transpose()
    }
}

impl fmt::Debug for DrawContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawContext")
            .field("size", &self.current.size())
            .field("staged", &self.staged.size())
            .field("previously_staged", &self.previously_staged.size())
            .field("rectangles", &self.rectangles)
            .field("flush_in_flight", &self.is_flush_in_flight())
            .finish_non_exhaustive()
    }
}
