//! A minimal text console on top of [`LcdDisplay`].
//!
//! Renders the bytes a terminal keyboard produces: printable ASCII, newline,
//! carriage return, tab and backspace. Escape sequences are consumed; only
//! cursor left and right are acted on.

use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle, MonoTextStyleBuilder},
    pixelcolor::Rgb565,
    prelude::*,
    primitives::Rectangle,
    text::{Baseline, Text},
};

use crate::LcdDisplay;

/// Glyph cell width in pixels.
pub const CELL_WIDTH: u16 = 6;
/// Glyph cell height in pixels.
pub const CELL_HEIGHT: u16 = 10;

const TAB_STOP: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Escape {
    None,
    Start,
    Csi,
}

/// Cursor state and colors for a text grid covering the display.
pub struct Console {
    column: u16,
    row: u16,
    columns: u16,
    rows: u16,
    style: MonoTextStyle<'static, Rgb565>,
    background: Rgb565,
    escape: Escape,
}

impl Console {
    /// Creates a console for a panel of `size`, cursor at the top left.
    ///
    /// # Arguments
    ///
    /// * `size` - The display size, usually `display.size()`.
    /// * `foreground` - Text color.
    /// * `background` - Cell and clear color.
    pub fn new(size: Size, foreground: Rgb565, background: Rgb565) -> Self {
        let style = MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(foreground)
            .background_color(background)
            .build();
        Self {
            column: 0,
            row: 0,
            columns: (size.width / u32::from(CELL_WIDTH)).max(1) as u16,
            rows: (size.height / u32::from(CELL_HEIGHT)).max(1) as u16,
            style,
            background,
            escape: Escape::None,
        }
    }

    /// Cursor position as `(column, row)`.
    pub fn cursor(&self) -> (u16, u16) {
        (self.column, self.row)
    }

    /// Grid size as `(columns, rows)`.
    pub fn grid(&self) -> (u16, u16) {
        (self.columns, self.rows)
    }

    /// Renders `bytes` at the cursor.
    pub fn write<DC, RST>(&mut self, display: &mut LcdDisplay<'_, DC, RST>, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(display, byte);
        }
    }

    fn write_byte<DC, RST>(&mut self, display: &mut LcdDisplay<'_, DC, RST>, byte: u8) {
        match (self.escape, byte) {
            (Escape::Start, b'[') => {
                self.escape = Escape::Csi;
                return;
            }
            (Escape::Start, _) => self.escape = Escape::None,
            (Escape::Csi, 0x40..=0x7E) => {
                self.escape = Escape::None;
                match byte {
                    b'C' => self.column = (self.column + 1).min(self.columns - 1),
                    b'D' => self.column = self.column.saturating_sub(1),
                    _ => {}
                }
                return;
            }
            (Escape::Csi, _) => return,
            (Escape::None, _) => {}
        }

        match byte {
            0x1B => self.escape = Escape::Start,
            b'\n' => self.newline(display),
            b'\r' => self.column = 0,
            b'\t' => {
                let next = (self.column / TAB_STOP + 1) * TAB_STOP;
                if next >= self.columns {
                    self.newline(display);
                } else {
                    self.column = next;
                }
            }
            0x08 | 0x7F => {
                self.column = self.column.saturating_sub(1);
                self.clear_cell(display);
            }
            0x20..=0x7E => {
                self.draw_glyph(display, byte);
                self.column += 1;
                if self.column == self.columns {
                    self.newline(display);
                }
            }
            _ => {}
        }
    }

    fn cell_origin(&self) -> Point {
        Point::new(
            i32::from(self.column * CELL_WIDTH),
            i32::from(self.row * CELL_HEIGHT),
        )
    }

    fn draw_glyph<DC, RST>(&self, display: &mut LcdDisplay<'_, DC, RST>, byte: u8) {
        let mut utf8 = [0u8; 4];
        let glyph = char::from(byte).encode_utf8(&mut utf8);
        Text::with_baseline(glyph, self.cell_origin(), self.style, Baseline::Top)
            .draw(display)
            .ok();
    }

    fn clear_cell<DC, RST>(&self, display: &mut LcdDisplay<'_, DC, RST>) {
        let cell = Size::new(CELL_WIDTH.into(), CELL_HEIGHT.into());
        display.fill_rect(&Rectangle::new(self.cell_origin(), cell), self.background);
    }

    fn newline<DC, RST>(&mut self, display: &mut LcdDisplay<'_, DC, RST>) {
        self.column = 0;
        if self.row + 1 < self.rows {
            self.row += 1;
            return;
        }
        display.scroll(i32::from(CELL_HEIGHT));
        let top = i32::from(self.row * CELL_HEIGHT);
        let band = Rectangle::new(
            Point::new(0, top),
            Size::new(display.size().width, display.size().height - top as u32),
        );
        display.fill_rect(&band, self.background);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Rig;

    fn cell_has<DC, RST>(display: &LcdDisplay<'_, DC, RST>, origin: Point, color: Rgb565) -> bool {
        (0..i32::from(CELL_WIDTH))
            .flat_map(|x| (0..i32::from(CELL_HEIGHT)).map(move |y| Point::new(x, y)))
            .any(|offset| display.pixel(origin + offset) == Some(color))
    }

    #[test]
    fn grid_fits_the_panel() {
        let console = Console::new(Size::new(240, 135), Rgb565::WHITE, Rgb565::BLACK);
        assert_eq!(console.grid(), (40, 13));
        assert_eq!(console.cursor(), (0, 0));
    }

    #[test]
    fn printable_bytes_draw_and_advance() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, b"Hi");
        assert_eq!(console.cursor(), (2, 0));
        assert!(cell_has(&display, Point::new(0, 0), Rgb565::WHITE));
        assert!(cell_has(&display, Point::new(6, 0), Rgb565::WHITE));
        assert!(!cell_has(&display, Point::new(12, 0), Rgb565::WHITE));
    }

    #[test]
    fn long_lines_wrap() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, &[b'x'; 41]);
        assert_eq!(console.cursor(), (1, 1));
    }

    #[test]
    fn control_bytes_move_the_cursor() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, b"ab\tc");
        assert_eq!(console.cursor(), (9, 0));
        console.write(&mut display, b"\r");
        assert_eq!(console.cursor(), (0, 0));
        console.write(&mut display, b"\n\n");
        assert_eq!(console.cursor(), (0, 2));
    }

    #[test]
    fn backspace_erases_the_previous_cell() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, b"A\x08");
        assert_eq!(console.cursor(), (0, 0));
        assert!(!cell_has(&display, Point::new(0, 0), Rgb565::WHITE));

        console.write(&mut display, b"\x08");
        assert_eq!(console.cursor(), (0, 0));
    }

    #[test]
    fn escape_sequences_are_not_printed() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, b"\x1b[A\x1b[1;2B");
        assert_eq!(console.cursor(), (0, 0));
        assert!(!cell_has(&display, Point::new(0, 0), Rgb565::WHITE));

        console.write(&mut display, b"xy\x1b[D");
        assert_eq!(console.cursor(), (1, 0));
        console.write(&mut display, b"\x1b[C\x1b[C");
        assert_eq!(console.cursor(), (3, 0));

        console.write(&mut display, b"\x1ba");
        assert_eq!(console.cursor(), (4, 0));
        assert!(cell_has(&display, Point::new(18, 0), Rgb565::WHITE));
    }

    #[test]
    fn newline_on_the_last_row_scrolls() {
        let mut rig = Rig::new();
        let (mut display, _) = rig.parts();
        let mut console = Console::new(display.size(), Rgb565::WHITE, Rgb565::BLACK);

        console.write(&mut display, b"top");
        console.write(&mut display, b"\n\n\n\n\n\n\n\n\n\n\n\n");
        assert_eq!(console.cursor(), (0, 12));
        assert_eq!(display.scroll_offset(), 0);

        console.write(&mut display, b"\n");
        assert_eq!(console.cursor(), (0, 12));
        assert_eq!(display.scroll_offset(), 10);
        assert!(!cell_has(&display, Point::new(0, 0), Rgb565::WHITE));
        assert!(!cell_has(&display, Point::new(0, 120), Rgb565::WHITE));
        assert_eq!(display.pixel(Point::new(0, 134)), Some(Rgb565::BLACK));
    }
}
