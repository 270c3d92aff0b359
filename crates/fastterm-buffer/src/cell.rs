//! Terminal cell representation.
//!
//! A [`Cell`] is one character position of a frame: a glyph plus a
//! foreground and background color, both of which may be translucent.

use fastterm_core::Color;

/// A single cell in a frame buffer.
///
/// Cells are plain values. Two cells are equal when their character and both
/// colors are equal, which is what the frame diff relies on.
///
/// # Examples
///
/// ```
/// use fastterm_buffer::Cell;
/// use fastterm_core::Color;
///
/// let cell = Cell::new('A')
///     .with_fg(Color::WHITE)
///     .with_bg(Color::BLUE);
/// assert!(!cell.is_empty());
/// assert!(Cell::EMPTY.is_empty());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    /// The character displayed in this cell.
    pub character: char,

    /// Foreground (glyph) color.
    pub fg: Color,

    /// Background color.
    pub bg: Color,
}

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// A space with transparent colors. Written by clear and resize.
    pub const EMPTY: Self = Self {
        character: ' ',
        fg: Color::TRANSPARENT,
        bg: Color::TRANSPARENT,
    };

    /// Creates a cell with the given character, a white foreground and a
    /// transparent background.
    #[inline]
    pub const fn new(character: char) -> Self {
        Self {
            character,
            fg: Color::WHITE,
            bg: Color::TRANSPARENT,
        }
    }

    /// Creates a cell from all of its parts.
    #[inline]
    pub const fn styled(character: char, fg: Color, bg: Color) -> Self {
        Self { character, fg, bg }
    }

    /// Creates a space cell that only carries a background color.
    #[inline]
    pub const fn filled(bg: Color) -> Self {
        Self {
            character: ' ',
            fg: Color::TRANSPARENT,
            bg,
        }
    }

    /// Sets the character.
    #[inline]
    pub const fn with_char(self, character: char) -> Self {
        Self { character, ..self }
    }

    /// Sets the foreground color.
    #[inline]
    pub const fn with_fg(self, fg: Color) -> Self {
        Self { fg, ..self }
    }

    /// Sets the background color.
    #[inline]
    pub const fn with_bg(self, bg: Color) -> Self {
        Self { bg, ..self }
    }

    /// Returns whether drawing this cell would leave nothing visible.
    ///
    /// That is the case when the background is transparent and either the
    /// foreground is transparent or the character is whitespace.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bg.a == 0 && (self.fg.a == 0 || self.character.is_whitespace())
    }

    /// Returns the background as the terminal will show it.
    ///
    /// Terminals have no real background transparency, so the color is
    /// scaled by its own alpha (an implicit black backdrop) and made opaque.
    #[inline]
    pub fn finalized_background(&self) -> Color {
        self.bg.premultiplied_opaque()
    }

    /// Returns the foreground as the terminal will show it.
    ///
    /// The glyph color is blended over this cell's own background first, so
    /// faint glyphs fade into the background, then made opaque.
    #[inline]
    pub fn finalized_foreground(&self) -> Color {
        Color::alpha_blend(self.bg, self.fg).opaque()
    }

    /// Layers `append` on top of `base`.
    ///
    /// An empty `append` leaves `base` untouched. A whitespace `append` keeps
    /// the glyph of `base` and only tints it, so color-only draws never erase
    /// text. Both the glyph color and the background are blended with the
    /// background of `append`.
    ///
    /// # Examples
    ///
    /// ```
    /// use fastterm_buffer::Cell;
    /// use fastterm_core::Color;
    ///
    /// let text = Cell::styled('x', Color::WHITE, Color::BLACK);
    /// let tint = Cell::filled(Color::argb(128, 255, 0, 0));
    /// let tinted = Cell::compose(text, tint);
    /// assert_eq!(tinted.character, 'x');
    /// assert_eq!(tinted.bg, Color::argb(255, 128, 0, 0));
    /// ```
    pub fn compose(base: Self, append: Self) -> Self {
        if append.is_empty() {
            return base;
        }

        let (character, source_fg) = if append.character.is_whitespace() {
            (base.character, base.fg)
        } else {
            (append.character, append.fg)
        };

        Self {
            character,
            fg: Color::alpha_blend(source_fg, append.bg),
            bg: Color::alpha_blend(base.bg, append.bg),
        }
    }
}

impl From<char> for Cell {
    #[inline]
    fn from(character: char) -> Self {
        Self::new(character)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cell_default_is_empty_sentinel() {
        assert_eq!(Cell::default(), Cell::EMPTY);
        assert_eq!(Cell::EMPTY.character, ' ');
        assert_eq!(Cell::EMPTY.fg, Color::TRANSPARENT);
        assert_eq!(Cell::EMPTY.bg, Color::TRANSPARENT);
    }

    #[test]
    fn test_cell_builder() {
        let cell = Cell::new('A').with_fg(Color::RED).with_bg(Color::BLUE);
        assert_eq!(cell, Cell::styled('A', Color::RED, Color::BLUE));
        assert_eq!(cell.with_char('B').character, 'B');
    }

    #[test]
    fn test_is_empty() {
        assert!(Cell::EMPTY.is_empty());
        // Visible glyph on a transparent background.
        assert!(!Cell::new('A').is_empty());
        // Whitespace never shows a glyph.
        assert!(Cell::styled('\t', Color::WHITE, Color::TRANSPARENT).is_empty());
        // Transparent glyph color.
        assert!(Cell::styled('A', Color::TRANSPARENT, Color::TRANSPARENT).is_empty());
        // Any background alpha makes it visible.
        assert!(!Cell::filled(Color::argb(1, 0, 0, 0)).is_empty());
    }

    #[test]
    fn test_finalized_background() {
        assert_eq!(Cell::EMPTY.finalized_background(), Color::BLACK);
        assert_eq!(Cell::filled(Color::BLUE).finalized_background(), Color::BLUE);
        assert_eq!(
            Cell::filled(Color::argb(128, 255, 100, 0)).finalized_background(),
            Color::rgb(128, 50, 0)
        );
    }

    #[test]
    fn test_finalized_foreground_blends_over_own_background() {
        let cell = Cell::styled('x', Color::argb(128, 0, 0, 255), Color::WHITE);
        assert_eq!(cell.finalized_foreground(), Color::rgb(127, 127, 255));

        let opaque = Cell::styled('x', Color::RED, Color::BLUE);
        assert_eq!(opaque.finalized_foreground(), Color::RED);
    }

    mod compose_tests {
        use super::*;
        use pretty_assertions::assert_eq;

        #[test]
        fn test_transparent_append_is_identity() {
            let base = Cell::styled('A', Color::RED, Color::argb(40, 1, 2, 3));
            assert_eq!(Cell::compose(base, Cell::EMPTY), base);
            assert_eq!(Cell::compose(base, Cell::styled('Z', Color::TRANSPARENT, Color::TRANSPARENT)), base);
        }

        #[test]
        fn test_whitespace_append_keeps_glyph() {
            let base = Cell::styled('A', Color::WHITE, Color::BLACK);
            let tint = Cell::filled(Color::argb(200, 0, 255, 0));
            let composed = Cell::compose(base, tint);
            assert_eq!(composed.character, 'A');
            assert_eq!(composed.fg, Color::alpha_blend(Color::WHITE, tint.bg));
            assert_eq!(composed.bg, Color::alpha_blend(Color::BLACK, tint.bg));
        }

        #[test]
        fn test_glyph_append_replaces_character() {
            let base = Cell::styled('A', Color::WHITE, Color::BLACK);
            let append = Cell::new('B').with_fg(Color::RED);
            let composed = Cell::compose(base, append);
            assert_eq!(composed.character, 'B');
            // Transparent append background leaves both colors alone.
            assert_eq!(composed.fg, Color::RED);
            assert_eq!(composed.bg, Color::BLACK);
        }

        #[test]
        fn test_half_transparent_background_over_white() {
            let base = Cell::filled(Color::WHITE);
            let append = Cell::filled(Color::argb(128, 0, 0, 255));
            let composed = Cell::compose(base, append);
            assert_eq!(composed.bg, Color::argb(255, 127, 127, 255));
            assert_eq!(composed.finalized_background(), Color::rgb(127, 127, 255));
        }

        #[test]
        fn test_opaque_append_background_wins() {
            let base = Cell::styled('A', Color::WHITE, Color::RED);
            let append = Cell::styled('B', Color::WHITE, Color::BLUE);
            let composed = Cell::compose(base, append);
            assert_eq!(composed.bg, Color::BLUE);
            // The glyph color is blended with the opaque background of the append.
            assert_eq!(composed.fg, Color::BLUE);
        }
    }
}
