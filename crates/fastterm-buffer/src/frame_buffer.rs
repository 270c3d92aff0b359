//! Resizable frame buffer.
//!
//! A [`FrameBuffer`] is a row-major grid of [`Cell`]s. Resizing keeps the
//! content anchored according to an [`Alignment`], so shrinking a buffer
//! anchored bottom-right drops columns and rows from the top-left.

use std::fmt;

use fastterm_core::{Alignment, Point, Rect, Size};
use tracing::debug;

use crate::Cell;
use crate::parallel::{ExecutionMode, for_each_chunk_mut};

/// Describes a completed resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeChange {
    /// The size before the resize.
    pub old: Size,
    /// The size after the resize.
    pub new: Size,
    /// The alignment the content was anchored with.
    pub alignment: Alignment,
}

type SizeChangeListener = Box<dyn Fn(&SizeChange) + Send + Sync>;

/// A 2D grid of cells with alignment-preserving resize.
///
/// The cell count always equals `width * height`.
///
/// # Examples
///
/// ```
/// use fastterm_buffer::{Cell, ExecutionMode, FrameBuffer};
/// use fastterm_core::{Alignment, Size};
///
/// let mut frame = FrameBuffer::new(Size::new(2, 1));
/// frame.set(1, 0, Cell::new('x'));
///
/// frame.resize(Size::new(1, 1), Alignment::TopRight, ExecutionMode::Sequential);
/// assert_eq!(frame.get(0, 0).map(|c| c.character), Some('x'));
/// ```
pub struct FrameBuffer {
    /// Cell storage in row-major order.
    cells: Vec<Cell>,

    /// Copy of the old content used when a resize keeps the cell count.
    scratch: Vec<Cell>,

    size: Size,

    listeners: Vec<SizeChangeListener>,
}

impl FrameBuffer {
    /// Creates a buffer of the given size filled with [`Cell::EMPTY`].
    pub fn new(size: Size) -> Self {
        Self {
            cells: vec![Cell::EMPTY; size.area()],
            scratch: Vec::new(),
            size,
            listeners: Vec::new(),
        }
    }

    /// Returns the buffer dimensions.
    #[inline]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Returns the buffer width.
    #[inline]
    pub const fn width(&self) -> u16 {
        self.size.width
    }

    /// Returns the buffer height.
    #[inline]
    pub const fn height(&self) -> u16 {
        self.size.height
    }

    /// Returns the total number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns true if the buffer has no cells.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns a rectangle covering the entire buffer.
    #[inline]
    pub const fn bounds(&self) -> Rect {
        Rect::from_size(self.size)
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.size.width && y < self.size.height {
            Some(y as usize * self.size.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Converts a signed point to a linear index if it lies inside the buffer.
    #[inline]
    pub fn index_of(&self, point: Point) -> Option<usize> {
        if !self.bounds().contains_point(point) {
            return None;
        }
        self.index(u16::try_from(point.x).ok()?, u16::try_from(point.y).ok()?)
    }

    /// Gets a reference to the cell at (x, y).
    #[inline]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    /// Gets a mutable reference to the cell at (x, y).
    #[inline]
    pub fn get_mut(&mut self, x: u16, y: u16) -> Option<&mut Cell> {
        self.index(x, y).map(|i| &mut self.cells[i])
    }

    /// Replaces the cell at (x, y).
    ///
    /// Returns `false` if the coordinates are out of bounds.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        match self.get_mut(x, y) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Returns a slice of the underlying cell storage.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Returns a mutable slice of the underlying cell storage.
    #[inline]
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Returns a slice of cells for a specific row.
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y < self.size.height {
            let start = y as usize * self.size.width as usize;
            Some(&self.cells[start..start + self.size.width as usize])
        } else {
            None
        }
    }

    /// Collects the characters of a row into a string. Handy in tests and logs.
    pub fn row_text(&self, y: u16) -> Option<String> {
        self.row(y).map(|row| row.iter().map(|c| c.character).collect())
    }

    // ========================================================================
    // Size-change notifications
    // ========================================================================

    /// Registers a callback invoked after every effective resize.
    pub fn on_size_changed<F>(&mut self, listener: F)
    where
        F: Fn(&SizeChange) + Send + Sync + 'static,
    {
        self.listeners.push(Box::new(listener));
    }

    // ========================================================================
    // Resize and clear
    // ========================================================================

    /// Resizes the buffer, keeping content anchored by `alignment`.
    ///
    /// Every destination cell `P` takes the old cell at
    /// `P + alignment.anchor_offset(old_size - new_size)` when that position
    /// was inside the old buffer, and [`Cell::EMPTY`] otherwise. A resize to
    /// the current size does nothing and notifies nobody.
    pub fn resize(&mut self, new_size: Size, alignment: Alignment, mode: ExecutionMode) {
        let old_size = self.size;
        if new_size == old_size {
            return;
        }

        let offset = alignment.anchor_offset(old_size.slack(new_size));
        if self.cells.len() == new_size.area() {
            self.scratch.clear();
            self.scratch.extend_from_slice(&self.cells);
            migrate(&self.scratch, old_size, &mut self.cells, new_size, offset, mode);
        } else {
            let mut cells = vec![Cell::EMPTY; new_size.area()];
            migrate(&self.cells, old_size, &mut cells, new_size, offset, mode);
            self.cells = cells;
        }
        self.size = new_size;

        debug!(old = %old_size, new = %new_size, %alignment, "frame buffer resized");

        let change = SizeChange {
            old: old_size,
            new: new_size,
            alignment,
        };
        for listener in &self.listeners {
            listener(&change);
        }
    }

    /// Resizes anchored top-left on the calling thread.
    pub fn set_size(&mut self, size: Size) {
        self.resize(size, Alignment::TopLeft, ExecutionMode::Sequential);
    }

    /// Resets every cell to [`Cell::EMPTY`].
    pub fn clear(&mut self, mode: ExecutionMode) {
        for_each_chunk_mut(mode, &mut self.cells, 1, |_, chunk| {
            chunk.fill(Cell::EMPTY);
        });
    }

    // ========================================================================
    // Drawing
    // ========================================================================

    /// Composes cells produced by `callback` beneath the existing content of
    /// `rect`.
    ///
    /// `callback` receives coordinates local to `rect`. Only positions inside
    /// the buffer are visited, and cells whose background is already opaque
    /// are left as they are since nothing beneath them can show through. For
    /// every other cell the candidate is layered under the existing cell with
    /// [`Cell::compose`]. Both execution modes produce the same grid.
    pub fn draw_cells<F>(&mut self, rect: Rect, mode: ExecutionMode, callback: F)
    where
        F: Fn(Point) -> Cell + Sync,
    {
        let Some(clip) = rect.intersection(self.bounds()) else {
            return;
        };

        let width = self.size.width as usize;
        let origin = rect.position();
        for_each_chunk_mut(mode, &mut self.cells, width, |start, chunk| {
            let first_row = (start / width) as i32;
            for (offset, row) in chunk.chunks_mut(width).enumerate() {
                let y = first_row + offset as i32;
                if y < clip.top() || y >= clip.bottom() {
                    continue;
                }
                for x in clip.left()..clip.right() {
                    let existing = &mut row[x as usize];
                    if existing.bg.is_opaque() {
                        continue;
                    }
                    let candidate = callback(Point::new(x, y) - origin);
                    *existing = Cell::compose(candidate, *existing);
                }
            }
        });
    }
}

/// Fills `dest` by sampling `source` at each destination position plus `offset`.
fn migrate(
    source: &[Cell],
    old_size: Size,
    dest: &mut [Cell],
    new_size: Size,
    offset: Point,
    mode: ExecutionMode,
) {
    let old_width = old_size.width as i32;
    let old_height = old_size.height as i32;
    let new_width = new_size.width as usize;

    for_each_chunk_mut(mode, dest, new_width, |start, chunk| {
        for (k, cell) in chunk.iter_mut().enumerate() {
            let index = start + k;
            let sx = (index % new_width) as i32 + offset.x;
            let sy = (index / new_width) as i32 + offset.y;
            *cell = if (0..old_width).contains(&sx) && (0..old_height).contains(&sy) {
                source[sy as usize * old_width as usize + sx as usize]
            } else {
                Cell::EMPTY
            };
        }
    });
}

impl fmt::Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("size", &self.size)
            .field("cells", &self.cells.len())
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(Size::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fastterm_core::Color;
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    fn numbered(size: Size) -> FrameBuffer {
        let mut frame = FrameBuffer::new(size);
        for (i, cell) in frame.cells_mut().iter_mut().enumerate() {
            *cell = Cell::new(char::from(b'a' + i as u8));
        }
        frame
    }

    #[test]
    fn test_new_is_empty_cells() {
        let frame = FrameBuffer::new(Size::new(3, 2));
        assert_eq!(frame.len(), 6);
        assert!(frame.cells().iter().all(|c| *c == Cell::EMPTY));
        assert_eq!(frame.bounds(), Rect::new(0, 0, 3, 2));
    }

    #[test]
    fn test_get_set_bounds() {
        let mut frame = FrameBuffer::new(Size::new(2, 2));
        assert!(frame.set(1, 1, Cell::new('z')));
        assert!(!frame.set(2, 0, Cell::new('z')));
        assert_eq!(frame.get(1, 1).map(|c| c.character), Some('z'));
        assert_eq!(frame.get(0, 2), None);
        assert_eq!(frame.index_of(Point::new(-1, 0)), None);
        assert_eq!(frame.index_of(Point::new(1, 1)), Some(3));
    }

    mod resize_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_bottom_right_grow_keeps_content_right() {
            let mut frame = numbered(Size::new(2, 2));
            frame.resize(Size::new(4, 2), Alignment::BottomRight, ExecutionMode::Sequential);
            assert_eq!(frame.size(), Size::new(4, 2));
            assert_eq!(frame.len(), 8);
            assert_eq!(frame.row_text(0).as_deref(), Some("  ab"));
            assert_eq!(frame.row_text(1).as_deref(), Some("  cd"));
            assert_eq!(frame.get(0, 0), Some(&Cell::EMPTY));
            assert_eq!(frame.get(1, 1), Some(&Cell::EMPTY));
        }

        #[test]
        fn test_top_left_shrink_crops_bottom_right() {
            let mut frame = numbered(Size::new(3, 3));
            frame.resize(Size::new(2, 2), Alignment::TopLeft, ExecutionMode::Sequential);
            assert_eq!(frame.row_text(0).as_deref(), Some("ab"));
            assert_eq!(frame.row_text(1).as_deref(), Some("de"));
        }

        #[test]
        fn test_top_right_grow_and_shrink() {
            let mut grown = numbered(Size::new(2, 2));
            grown.resize(Size::new(3, 3), Alignment::TopRight, ExecutionMode::Sequential);
            assert_eq!(grown.row_text(0).as_deref(), Some(" ab"));
            assert_eq!(grown.row_text(1).as_deref(), Some(" cd"));
            assert_eq!(grown.row_text(2).as_deref(), Some("   "));

            let mut shrunk = numbered(Size::new(3, 3));
            shrunk.resize(Size::new(2, 2), Alignment::TopRight, ExecutionMode::Sequential);
            assert_eq!(shrunk.row_text(0).as_deref(), Some("bc"));
            assert_eq!(shrunk.row_text(1).as_deref(), Some("ef"));
        }

        #[test]
        fn test_bottom_left_grow_and_shrink() {
            let mut grown = numbered(Size::new(2, 2));
            grown.resize(Size::new(3, 3), Alignment::BottomLeft, ExecutionMode::Sequential);
            assert_eq!(grown.row_text(0).as_deref(), Some("   "));
            assert_eq!(grown.row_text(1).as_deref(), Some("ab "));
            assert_eq!(grown.row_text(2).as_deref(), Some("cd "));

            let mut shrunk = numbered(Size::new(3, 3));
            shrunk.resize(Size::new(2, 2), Alignment::BottomLeft, ExecutionMode::Sequential);
            assert_eq!(shrunk.row_text(0).as_deref(), Some("de"));
            assert_eq!(shrunk.row_text(1).as_deref(), Some("gh"));
        }

        #[test]
        fn test_center_shrink() {
            let mut frame = numbered(Size::new(3, 3));
            frame.resize(Size::new(1, 1), Alignment::Center, ExecutionMode::Sequential);
            assert_eq!(frame.row_text(0).as_deref(), Some("e"));
        }

        #[test]
        fn test_same_cell_count_reuses_storage() {
            let mut frame = numbered(Size::new(3, 2));
            let before = frame.cells().as_ptr();
            frame.resize(Size::new(2, 3), Alignment::TopLeft, ExecutionMode::Sequential);
            assert_eq!(frame.cells().as_ptr(), before);
            assert_eq!(frame.row_text(0).as_deref(), Some("ab"));
            assert_eq!(frame.row_text(1).as_deref(), Some("de"));
            assert_eq!(frame.row_text(2).as_deref(), Some("  "));
        }

        #[test]
        fn test_parallel_matches_sequential() {
            for alignment in Alignment::ALL {
                let mut sequential = numbered(Size::new(5, 4));
                let mut parallel = numbered(Size::new(5, 4));
                sequential.resize(Size::new(7, 3), alignment, ExecutionMode::Sequential);
                parallel.resize(Size::new(7, 3), alignment, ExecutionMode::Parallel);
                assert_eq!(sequential.cells(), parallel.cells(), "{alignment}");
            }
        }

        #[test]
        fn test_listeners_notified_once_per_change() {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let mut frame = FrameBuffer::new(Size::new(2, 2));
            let sink = Arc::clone(&seen);
            frame.on_size_changed(move |change| sink.lock().unwrap().push(*change));

            frame.resize(Size::new(2, 2), Alignment::Center, ExecutionMode::Sequential);
            assert!(seen.lock().unwrap().is_empty());

            frame.resize(Size::new(4, 1), Alignment::Center, ExecutionMode::Parallel);
            assert_eq!(
                *seen.lock().unwrap(),
                vec![SizeChange {
                    old: Size::new(2, 2),
                    new: Size::new(4, 1),
                    alignment: Alignment::Center,
                }]
            );
        }

        #[test]
        fn test_resize_to_zero_and_back() {
            let mut frame = numbered(Size::new(2, 2));
            frame.set_size(Size::new(0, 5));
            assert!(frame.is_empty());
            frame.set_size(Size::new(2, 1));
            assert_eq!(frame.cells(), &[Cell::EMPTY, Cell::EMPTY]);
        }
    }

    #[test]
    fn test_clear_modes() {
        for mode in [ExecutionMode::Sequential, ExecutionMode::Parallel] {
            let mut frame = numbered(Size::new(4, 4));
            frame.clear(mode);
            assert!(frame.cells().iter().all(|c| *c == Cell::EMPTY));
        }
    }

    mod draw_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_draw_cells_uses_local_coordinates() {
            let mut frame = FrameBuffer::new(Size::new(4, 3));
            frame.draw_cells(Rect::new(1, 1, 2, 2), ExecutionMode::Sequential, |p| {
                Cell::new(char::from(b'0' + (p.y * 2 + p.x) as u8))
            });
            assert_eq!(frame.row_text(0).as_deref(), Some("    "));
            assert_eq!(frame.row_text(1).as_deref(), Some(" 01 "));
            assert_eq!(frame.row_text(2).as_deref(), Some(" 23 "));
        }

        #[test]
        fn test_draw_cells_clips_to_buffer() {
            let mut frame = FrameBuffer::new(Size::new(2, 2));
            frame.draw_cells(Rect::new(-1, -1, 3, 3), ExecutionMode::Sequential, |p| {
                assert!(p.x >= 1 && p.y >= 1);
                Cell::new('#')
            });
            assert_eq!(frame.row_text(0).as_deref(), Some("##"));
        }

        #[test]
        fn test_opaque_cells_are_final() {
            let mut frame = FrameBuffer::new(Size::new(1, 1));
            frame.draw_cells(frame.bounds(), ExecutionMode::Sequential, |_| {
                Cell::styled('A', Color::WHITE, Color::RED)
            });
            frame.draw_cells(frame.bounds(), ExecutionMode::Sequential, |_| {
                Cell::styled('B', Color::WHITE, Color::BLUE)
            });
            assert_eq!(frame.get(0, 0), Some(&Cell::styled('A', Color::WHITE, Color::RED)));
        }

        #[test]
        fn test_later_draws_go_beneath_translucent_cells() {
            let mut frame = FrameBuffer::new(Size::new(1, 1));
            frame.draw_cells(frame.bounds(), ExecutionMode::Sequential, |_| {
                Cell::filled(Color::argb(128, 0, 0, 255))
            });
            frame.draw_cells(frame.bounds(), ExecutionMode::Sequential, |_| {
                Cell::filled(Color::WHITE)
            });
            let cell = frame.get(0, 0).copied().unwrap_or_default();
            assert_eq!(cell.bg, Color::argb(255, 127, 127, 255));
            assert_eq!(cell.finalized_background(), Color::rgb(127, 127, 255));
        }

        #[test]
        fn test_parallel_draw_matches_sequential() {
            let paint = |p: Point| {
                Cell::styled(
                    if (p.x + p.y) % 3 == 0 { 'x' } else { ' ' },
                    Color::argb(200, (p.x * 9) as u8, 10, 10),
                    Color::argb((p.y * 20) as u8, 0, (p.x * 5) as u8, 0),
                )
            };
            let mut sequential = FrameBuffer::new(Size::new(40, 12));
            let mut parallel = FrameBuffer::new(Size::new(40, 12));
            for rect in [Rect::new(3, 2, 30, 8), Rect::new(-5, 0, 20, 20)] {
                sequential.draw_cells(rect, ExecutionMode::Sequential, paint);
                parallel.draw_cells(rect, ExecutionMode::Parallel, paint);
            }
            assert_eq!(sequential.cells(), parallel.cells());
        }
    }
}
