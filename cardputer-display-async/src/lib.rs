#![cfg_attr(not(test), no_std)]
#![deny(missing_docs)]

//! A basic, asynchronous driver for the M5 Cardputer's ST7789 LCD.
//!
//! This library provides an `LcdDisplay` struct that keeps an RGB565 frame
//! buffer in caller-supplied memory and implements the `embedded-graphics`
//! `DrawTarget` trait. Drawing only touches the buffer; [`LcdDisplay::flush`]
//! sends the rows that changed since the last flush.
//!
//! The panel is 240x135, mapped into the controller's 240x320 memory with an
//! offset that depends on the rotation. Offsets and the memory access control
//! byte live in [`LcdConfig`].
//!
//! # Example
//!
//! ```ignore
//! use cardputer_display_async::{LcdConfig, LcdDisplay};
//! use embedded_graphics::{
//!     pixelcolor::Rgb565,
//!     prelude::*,
//!     primitives::{PrimitiveStyle, Rectangle},
//! };
//!
//! const FRAME_BYTES: usize = LcdConfig::CARDPUTER.buffer_len();
//! static FRAME: ConstStaticCell<[u8; FRAME_BYTES]> = ConstStaticCell::new([0; FRAME_BYTES]);
//!
//! // ... (inside your async main function)
//!
//! let lcd_dc = Output::new(peripherals.GPIO34, Level::Low, OutputConfig::default());
//! let lcd_rst = Output::new(peripherals.GPIO33, Level::High, OutputConfig::default());
//! let mut display =
//!     LcdDisplay::new(lcd_dc, Some(lcd_rst), FRAME.take(), LcdConfig::default()).unwrap();
//! display.init(&mut spi, &mut Delay).await.ok();
//!
//! Rectangle::new(Point::new(10, 10), Size::new(100, 40))
//!     .into_styled(PrimitiveStyle::with_fill(Rgb565::GREEN))
//!     .draw(&mut display)
//!     .unwrap();
//!
//! display.flush(&mut spi).await.ok();
//! ```

use core::convert::Infallible;
use core::fmt::{self, Debug};

use embedded_graphics::{
    pixelcolor::{
        raw::{RawData, RawU16},
        Rgb565,
    },
    prelude::*,
    primitives::Rectangle,
};
use embedded_hal::digital::OutputPin;
use embedded_hal_async::{delay::DelayNs, spi::SpiDevice};
use log::{debug, info, trace};

pub mod console;

#[cfg(test)]
mod testing;

pub use console::Console;

const SWRESET: u8 = 0x01;
const SLPOUT: u8 = 0x11;
const NORON: u8 = 0x13;
const INVON: u8 = 0x21;
const DISPON: u8 = 0x29;
const CASET: u8 = 0x2A;
const RASET: u8 = 0x2B;
const RAMWR: u8 = 0x2C;
const MADCTL: u8 = 0x36;
const COLMOD: u8 = 0x3A;

/// 16 bits per pixel on the interface and in memory.
const COLMOD_RGB565: u8 = 0x55;

const BYTES_PER_PIXEL: usize = 2;

/// Panel geometry and controller settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LcdConfig {
    /// Visible width in pixels.
    pub width: u16,
    /// Visible height in pixels.
    pub height: u16,
    /// First controller column of the visible area.
    pub column_offset: u16,
    /// First controller row of the visible area.
    pub row_offset: u16,
    /// Memory access control byte, sets rotation and color order.
    pub madctl: u8,
    /// Whether the panel needs color inversion turned on.
    pub invert: bool,
}

impl LcdConfig {
    /// The Cardputer panel in landscape, keyboard below the screen.
    pub const CARDPUTER: Self = Self {
        width: 240,
        height: 135,
        column_offset: 40,
        row_offset: 53,
        madctl: 0x60,
        invert: true,
    };

    /// Size in bytes of the frame buffer this configuration needs.
    pub const fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl Default for LcdConfig {
    fn default() -> Self {
        Self::CARDPUTER
    }
}

/// Errors raised while talking to the controller.
pub enum DisplayError<SE, PE> {
    /// SPI transfer failed.
    Spi(SE),
    /// Driving the data/command or reset pin failed.
    Pin(PE),
}

impl<SE: Debug, PE: Debug> Debug for DisplayError<SE, PE> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayError::Spi(e) => write!(f, "SPI error: {e:?}"),
            DisplayError::Pin(e) => write!(f, "Pin error: {e:?}"),
        }
    }
}

/// Reasons [`LcdDisplay::new`] refuses a configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// The panel has no rows or no columns.
    EmptyPanel,
    /// The frame buffer does not match the configured panel size.
    BufferSize {
        /// Bytes the configuration needs.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

/// Represents the Cardputer LCD.
///
/// Holds the control pins, the frame buffer and the band of rows changed since
/// the last flush.
pub struct LcdDisplay<'b, DC, RST> {
    dc: DC,
    rst: Option<RST>,
    buffer: &'b mut [u8],
    config: LcdConfig,
    dirty: Option<(u16, u16)>,
    scroll: u16,
}

impl<'b, DC, RST> LcdDisplay<'b, DC, RST>
where
    DC: OutputPin,
    RST: OutputPin<Error = DC::Error>,
{
    /// Creates a new `LcdDisplay` instance.
    ///
    /// # Arguments
    ///
    /// * `dc` - The Data/Command control pin.
    /// * `rst` - The optional reset pin.
    /// * `buffer` - Frame memory, exactly [`LcdConfig::buffer_len`] bytes.
    /// * `config` - Panel geometry and controller settings. Width and height
    ///   must both be non-zero.
    pub fn new(
        dc: DC,
        rst: Option<RST>,
        buffer: &'b mut [u8],
        config: LcdConfig,
    ) -> Result<Self, ConfigError> {
        if config.width == 0 || config.height == 0 {
            return Err(ConfigError::EmptyPanel);
        }
        if buffer.len() != config.buffer_len() {
            return Err(ConfigError::BufferSize {
                expected: config.buffer_len(),
                actual: buffer.len(),
            });
        }
        Ok(Self {
            dc,
            rst,
            buffer,
            config,
            dirty: None,
            scroll: 0,
        })
    }

    /// Pulses the reset pin, if there is one.
    pub async fn reset<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DC::Error> {
        if let Some(rst) = &mut self.rst {
            info!("Resetting display...");
            rst.set_low()?;
            delay.delay_ms(10).await;
            rst.set_high()?;
            delay.delay_ms(120).await;
        }
        Ok(())
    }

    /// Sends a command to the display.
    pub async fn send_command<SPI: SpiDevice<u8>>(
        &mut self,
        spi: &mut SPI,
        command: u8,
    ) -> Result<(), DisplayError<SPI::Error, DC::Error>> {
        self.dc.set_low().map_err(DisplayError::Pin)?;
        trace!("Sending command: {command:#04x}");
        spi.write(&[command]).await.map_err(DisplayError::Spi)
    }

    /// Sends data to the display.
    pub async fn send_data<SPI: SpiDevice<u8>>(
        &mut self,
        spi: &mut SPI,
        data: &[u8],
    ) -> Result<(), DisplayError<SPI::Error, DC::Error>> {
        self.dc.set_high().map_err(DisplayError::Pin)?;
        spi.write(data).await.map_err(DisplayError::Spi)
    }

    /// Initializes the display controller.
    ///
    /// Resets the panel, wakes it, sets RGB565 and the configured rotation, and
    /// switches it on. The whole frame buffer is sent on the next flush.
    pub async fn init<SPI: SpiDevice<u8>, D: DelayNs>(
        &mut self,
        spi: &mut SPI,
        delay: &mut D,
    ) -> Result<(), DisplayError<SPI::Error, DC::Error>> {
        self.reset(delay).await.map_err(DisplayError::Pin)?;

        self.send_command(spi, SWRESET).await?;
        delay.delay_ms(150).await;
        self.send_command(spi, SLPOUT).await?;
        delay.delay_ms(120).await;

        self.send_command(spi, COLMOD).await?;
        self.send_data(spi, &[COLMOD_RGB565]).await?;
        self.send_command(spi, MADCTL).await?;
        self.send_data(spi, &[self.config.madctl]).await?;
        if self.config.invert {
            self.send_command(spi, INVON).await?;
        }
        self.send_command(spi, NORON).await?;
        self.send_command(spi, DISPON).await?;
        delay.delay_ms(20).await;

        self.mark_dirty(0, self.config.height - 1);
        info!("Display initialized");
        Ok(())
    }

    /// Writes the changed rows to the panel.
    pub async fn flush<SPI: SpiDevice<u8>>(
        &mut self,
        spi: &mut SPI,
    ) -> Result<(), DisplayError<SPI::Error, DC::Error>> {
        let Some((first, last)) = self.dirty else {
            return Ok(());
        };
        debug!("Flushing rows {first}..={last}");

        let x0 = self.config.column_offset;
        let x1 = x0 + self.config.width - 1;
        let y0 = self.config.row_offset + first;
        let y1 = self.config.row_offset + last;
        self.send_command(spi, CASET).await?;
        self.send_data(spi, &window(x0, x1)).await?;
        self.send_command(spi, RASET).await?;
        self.send_data(spi, &window(y0, y1)).await?;
        self.send_command(spi, RAMWR).await?;

        let stride = self.stride();
        let band = first as usize * stride..(last as usize + 1) * stride;
        self.dc.set_high().map_err(DisplayError::Pin)?;
        spi.write(&self.buffer[band]).await.map_err(DisplayError::Spi)?;

        self.dirty = None;
        Ok(())
    }

    /// Gives the pins back.
    pub fn release(self) -> (DC, Option<RST>) {
        (self.dc, self.rst)
    }
}

impl<DC, RST> LcdDisplay<'_, DC, RST> {
    fn stride(&self) -> usize {
        self.config.width as usize * BYTES_PER_PIXEL
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.stride() + x as usize * BYTES_PER_PIXEL
    }

    fn in_bounds(&self, point: Point) -> Option<(u16, u16)> {
        let x = u16::try_from(point.x).ok()?;
        let y = u16::try_from(point.y).ok()?;
        (x < self.config.width && y < self.config.height).then_some((x, y))
    }

    fn mark_dirty(&mut self, first: u16, last: u16) {
        self.dirty = Some(match self.dirty {
            Some((a, b)) => (a.min(first), b.max(last)),
            None => (first, last),
        });
    }

    fn write_pixel(&mut self, x: u16, y: u16, color: Rgb565) {
        let index = self.index(x, y);
        let raw = RawU16::from(color).into_inner().to_be_bytes();
        self.buffer[index..index + BYTES_PER_PIXEL].copy_from_slice(&raw);
    }

    /// Sets one pixel. Points outside the panel are ignored.
    pub fn set_pixel(&mut self, point: Point, color: Rgb565) {
        if let Some((x, y)) = self.in_bounds(point) {
            self.write_pixel(x, y, color);
            self.mark_dirty(y, y);
        }
    }

    /// Reads one pixel back from the frame buffer.
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        let (x, y) = self.in_bounds(point)?;
        let index = self.index(x, y);
        let raw = u16::from_be_bytes([self.buffer[index], self.buffer[index + 1]]);
        Some(RawU16::new(raw).into())
    }

    /// Fills a rectangle, clipped to the panel.
    pub fn fill_rect(&mut self, area: &Rectangle, color: Rgb565) {
        let clipped = area.intersection(&self.bounding_box());
        let Some(bottom_right) = clipped.bottom_right() else {
            return;
        };
        let top_left = clipped.top_left;
        for y in top_left.y..=bottom_right.y {
            for x in top_left.x..=bottom_right.x {
                self.write_pixel(x as u16, y as u16, color);
            }
        }
        self.mark_dirty(top_left.y as u16, bottom_right.y as u16);
    }

    /// Copies a row-major block of `width` pixels per row with its top left
    /// corner at `at`. Pixels falling outside the panel are dropped, as is a
    /// trailing partial row.
    pub fn blit(&mut self, at: Point, width: u32, pixels: &[Rgb565]) {
        if width == 0 {
            return;
        }
        let rows = pixels.chunks_exact(width as usize);
        for (dy, row) in rows.enumerate() {
            for (dx, color) in row.iter().enumerate() {
                self.set_pixel(at + Point::new(dx as i32, dy as i32), *color);
            }
        }
    }

    /// Scrolls the picture up by `lines`, or down if negative.
    ///
    /// Rows leaving one edge come back in at the other; clearing them is up to
    /// the caller.
    pub fn scroll(&mut self, lines: i32) {
        let height = i32::from(self.config.height);
        let rows = lines.rem_euclid(height) as usize;
        if rows != 0 {
            let stride = self.stride();
            self.buffer.rotate_left(rows * stride);
            self.mark_dirty(0, self.config.height - 1);
        }
        self.scroll = (i32::from(self.scroll) + lines).rem_euclid(height) as u16;
    }

    /// Lines scrolled so far, modulo the panel height.
    pub fn scroll_offset(&self) -> u16 {
        self.scroll
    }

    /// Fills the whole panel with `color`.
    pub fn clear(&mut self, color: Rgb565) {
        let raw = RawU16::from(color).into_inner().to_be_bytes();
        for pixel in self.buffer.chunks_exact_mut(BYTES_PER_PIXEL) {
            pixel.copy_from_slice(&raw);
        }
        self.mark_dirty(0, self.config.height - 1);
    }
}

fn window(start: u16, end: u16) -> [u8; 4] {
    let [s0, s1] = start.to_be_bytes();
    let [e0, e1] = end.to_be_bytes();
    [s0, s1, e0, e1]
}

impl<DC, RST> DrawTarget for LcdDisplay<'_, DC, RST> {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, color) in pixels.into_iter() {
            self.set_pixel(coord, color);
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_rect(area, color);
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        LcdDisplay::clear(self, color);
        Ok(())
    }
}

impl<DC, RST> OriginDimensions for LcdDisplay<'_, DC, RST> {
    fn size(&self) -> Size {
        Size::new(self.config.width.into(), self.config.height.into())
    }
}
