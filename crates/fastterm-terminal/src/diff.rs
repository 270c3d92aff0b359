//! Frame diffing.
//!
//! [`write_frame`] compares the frame about to be shown with the one shown
//! before it and stages the smallest command stream that turns the latter
//! into the former.

use fastterm_buffer::{Cell, FrameBuffer};
use fastterm_core::{Color, Point, Result};

use crate::writer::CommandWriter;

/// Counters describing one emitted frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Characters written, spaces for empty cells included.
    pub cells_written: usize,
    /// Explicit cursor moves.
    pub cursor_moves: usize,
    /// Foreground color commands.
    pub foreground_changes: usize,
    /// Background color commands.
    pub background_changes: usize,
    /// Whether the frame was repainted from scratch because the sizes differed.
    pub full_repaint: bool,
}

impl FrameStats {
    /// Returns whether nothing was emitted for this frame.
    #[inline]
    pub const fn is_unchanged(&self) -> bool {
        self.cells_written == 0
    }
}

/// Tracks what has been emitted so far for the current frame.
struct Emitter<'w, W: CommandWriter + ?Sized> {
    out: &'w mut W,
    started: bool,
    foreground: Option<Color>,
    background: Option<Color>,
    stats: FrameStats,
}

impl<'w, W: CommandWriter + ?Sized> Emitter<'w, W> {
    fn new(out: &'w mut W, full_repaint: bool) -> Self {
        Self {
            out,
            started: false,
            foreground: None,
            background: None,
            stats: FrameStats {
                full_repaint,
                ..FrameStats::default()
            },
        }
    }

    /// Hides the cursor and homes it before the first command of the frame.
    fn begin(&mut self) -> Result<()> {
        if !self.started {
            self.started = true;
            self.out.write_hide_cursor(false)?;
            self.out.write_reset_cursor(false)?;
        }
        Ok(())
    }

    fn move_to(&mut self, position: Point) -> Result<()> {
        self.begin()?;
        self.stats.cursor_moves += 1;
        self.out.write_cursor_position(position, false)
    }

    fn cell(&mut self, cell: &Cell) -> Result<()> {
        self.begin()?;
        let empty = cell.is_empty();

        let foreground = cell.finalized_foreground();
        if !empty && self.foreground != Some(foreground) {
            self.out.write_foreground_color(foreground, false)?;
            self.foreground = Some(foreground);
            self.stats.foreground_changes += 1;
        }

        let background = cell.finalized_background();
        if self.background != Some(background) {
            self.out.write_background_color(background, false)?;
            self.background = Some(background);
            self.stats.background_changes += 1;
        }

        // Control and other whitespace characters would move the cursor.
        let character = if empty || cell.character.is_whitespace() || cell.character.is_control() {
            ' '
        } else {
            cell.character
        };
        self.out.write_char(character, false)?;
        self.stats.cells_written += 1;
        Ok(())
    }

    fn finish(self) -> Result<FrameStats> {
        if self.started {
            self.out.flush_commands()?;
        }
        Ok(self.stats)
    }
}

/// Stages the commands that turn `previous` into `staged` and flushes them.
///
/// When the sizes differ every cell is repainted in row-major order, relying
/// on the terminal to wrap at the end of each row. Otherwise only changed
/// cells are written, with a cursor move wherever a changed cell does not
/// directly follow the previous write. Color commands are only emitted when
/// the color differs from the last one emitted. A frame without changes
/// emits nothing at all.
pub fn write_frame<W>(staged: &FrameBuffer, previous: &FrameBuffer, out: &mut W) -> Result<FrameStats>
where
    W: CommandWriter + ?Sized,
{
    if staged.size() != previous.size() {
        let mut emitter = Emitter::new(out, true);
        for cell in staged.cells() {
            emitter.cell(cell)?;
        }
        return emitter.finish();
    }

    let width = staged.width() as usize;
    let mut emitter = Emitter::new(out, false);
    let mut cursor = 0usize;
    for (index, (cell, old)) in staged.cells().iter().zip(previous.cells()).enumerate() {
        if cell == old {
            continue;
        }
        if cursor != index {
            emitter.move_to(Point::new((index % width) as i32, (index / width) as i32))?;
        }
        emitter.cell(cell)?;
        cursor = index + 1;
    }
    emitter.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::CaptureOutput;
    use crate::writer::Writer;
    use fastterm_core::Size;
    use pretty_assertions::assert_eq;

    fn frame(width: u16, height: u16, cells: &[(u16, u16, Cell)]) -> FrameBuffer {
        let mut frame = FrameBuffer::new(Size::new(width, height));
        for &(x, y, cell) in cells {
            frame.set(x, y, cell);
        }
        frame
    }

    fn render(staged: &FrameBuffer, previous: &FrameBuffer) -> (String, FrameStats) {
        let capture = CaptureOutput::new();
        let mut writer = Writer::new(capture.clone());
        let stats = write_frame(staged, previous, &mut writer).unwrap();
        (capture.text(), stats)
    }

    #[test]
    fn test_identical_frames_emit_nothing() {
        let a = frame(3, 1, &[(0, 0, Cell::styled('A', Color::RED, Color::BLUE))]);
        let b = frame(3, 1, &[(0, 0, Cell::styled('A', Color::RED, Color::BLUE))]);
        let (text, stats) = render(&a, &b);
        assert_eq!(text, "");
        assert!(stats.is_unchanged());
    }

    #[test]
    fn test_full_repaint_on_size_change() {
        let staged = frame(
            3,
            1,
            &[
                (0, 0, Cell::styled('A', Color::RED, Color::BLACK)),
                (2, 0, Cell::styled('B', Color::BLUE, Color::BLACK)),
            ],
        );
        let previous = FrameBuffer::new(Size::ZERO);
        let (text, stats) = render(&staged, &previous);
        assert_eq!(
            text,
            concat!(
                "\x1b[?25l\x1b[1;1H",
                "\x1b[38;2;255;0;0m\x1b[48;2;0;0;0mA",
                " ",
                "\x1b[38;2;0;0;255mB",
            )
        );
        assert_eq!(
            stats,
            FrameStats {
                cells_written: 3,
                cursor_moves: 0,
                foreground_changes: 2,
                background_changes: 1,
                full_repaint: true,
            }
        );
    }

    #[test]
    fn test_full_repaint_tracks_emitted_background() {
        let staged = frame(
            3,
            1,
            &[
                (0, 0, Cell::filled(Color::WHITE)),
                (1, 0, Cell::filled(Color::WHITE)),
            ],
        );
        let (text, stats) = render(&staged, &FrameBuffer::default());
        assert_eq!(
            text,
            concat!(
                "\x1b[?25l\x1b[1;1H",
                "\x1b[38;2;255;255;255m\x1b[48;2;255;255;255m  ",
                "\x1b[48;2;0;0;0m ",
            )
        );
        assert_eq!(stats.background_changes, 2);
        assert_eq!(stats.foreground_changes, 1);
    }

    #[test]
    fn test_single_changed_cell_is_minimal() {
        let previous = frame(4, 2, &[]);
        let staged = frame(4, 2, &[(2, 1, Cell::styled('x', Color::GREEN, Color::BLACK))]);
        let (text, stats) = render(&staged, &previous);
        assert_eq!(
            text,
            "\x1b[?25l\x1b[1;1H\x1b[2;3H\x1b[38;2;0;255;0m\x1b[48;2;0;0;0mx"
        );
        assert_eq!(stats.cells_written, 1);
        assert_eq!(stats.cursor_moves, 1);
    }

    #[test]
    fn test_contiguous_run_elides_cursor_moves() {
        let previous = frame(5, 1, &[]);
        let run = Cell::styled('-', Color::WHITE, Color::BLACK);
        let staged = frame(5, 1, &[(1, 0, run), (2, 0, run), (4, 0, run)]);
        let (text, stats) = render(&staged, &previous);
        assert_eq!(
            text,
            concat!(
                "\x1b[?25l\x1b[1;1H",
                "\x1b[1;2H\x1b[38;2;255;255;255m\x1b[48;2;0;0;0m--",
                "\x1b[1;5H-",
            )
        );
        assert_eq!(stats.cursor_moves, 2);
        assert_eq!(stats.foreground_changes, 1);
        assert_eq!(stats.background_changes, 1);
    }

    #[test]
    fn test_change_at_origin_needs_no_move() {
        let previous = frame(2, 1, &[]);
        let staged = frame(2, 1, &[(0, 0, Cell::styled('o', Color::WHITE, Color::BLACK))]);
        let (text, stats) = render(&staged, &previous);
        assert_eq!(stats.cursor_moves, 0);
        assert!(text.ends_with('o'));
    }

    #[test]
    fn test_erased_cell_writes_space_without_foreground() {
        let previous = frame(1, 1, &[(0, 0, Cell::new('z'))]);
        let staged = frame(1, 1, &[]);
        let (text, stats) = render(&staged, &previous);
        assert_eq!(text, "\x1b[?25l\x1b[1;1H\x1b[48;2;0;0;0m ");
        assert_eq!(stats.foreground_changes, 0);
    }

    #[test]
    fn test_control_characters_render_as_space() {
        let previous = frame(1, 1, &[]);
        let staged = frame(1, 1, &[(0, 0, Cell::styled('\n', Color::WHITE, Color::BLUE))]);
        let (text, _) = render(&staged, &previous);
        assert!(text.ends_with("\x1b[48;2;0;0;255m "));
    }
}
