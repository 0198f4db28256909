//! UC1701 LCD Driver
//!
//! Driver for the EA DOGS102 (UC1701X controller, 102x64) over 4-wire SPI.
//! Drawing goes into a page-organized frame buffer; `flush` pushes all
//! eight pages to display RAM.

use core::convert::Infallible;

use embassy_time::Timer;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_hal::digital::OutputPin;
use embedded_hal_async::spi::SpiBus;

use chroma_display::{DisplayBackend, DisplayError};

/// Display dimensions
const WIDTH: usize = 102;
const HEIGHT: usize = 64;
const PAGES: usize = HEIGHT / 8;

/// Display RAM is 132 columns wide; with the segment order reversed the
/// visible window starts at column 30
const REVERSED_COLUMN_OFFSET: u8 = 30;

/// UC1701 commands
#[allow(dead_code)]
mod cmd {
    pub const SET_START_LINE: u8 = 0x40;
    pub const SEG_NORMAL: u8 = 0xA0;
    pub const SEG_REVERSE: u8 = 0xA1;
    pub const COM_NORMAL: u8 = 0xC0;
    pub const COM_REVERSE: u8 = 0xC8;
    pub const ALL_PIXELS_OFF: u8 = 0xA4;
    pub const SET_NORMAL: u8 = 0xA6;
    pub const SET_INVERSE: u8 = 0xA7;
    pub const BIAS_1_9: u8 = 0xA2;
    pub const POWER_ALL_ON: u8 = 0x2F;
    pub const RESISTOR_RATIO: u8 = 0x20;
    pub const SET_CONTRAST: u8 = 0x81;
    pub const ADVANCED_CONTROL: u8 = 0xFA;
    pub const DISPLAY_OFF: u8 = 0xAE;
    pub const DISPLAY_ON: u8 = 0xAF;
    pub const SET_PAGE_ADDR: u8 = 0xB0;
    pub const SET_HIGH_COLUMN: u8 = 0x10;
    pub const SET_LOW_COLUMN: u8 = 0x00;
    pub const SYSTEM_RESET: u8 = 0xE2;
}

/// UC1701 LCD driver
pub struct Uc1701<SPI, CS, CD, RST> {
    spi: SPI,
    cs: CS,
    /// Command/data select (A0): low for commands
    cd: CD,
    rst: RST,
    /// Frame buffer (1 bit per pixel, organized as pages)
    buffer: [[u8; WIDTH]; PAGES],
    rotate_180: bool,
    initialized: bool,
}

impl<SPI, CS, CD, RST> Uc1701<SPI, CS, CD, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    CD: OutputPin,
    RST: OutputPin,
{
    /// Create a new UC1701 driver
    ///
    /// `rotate_180` flips the panel in hardware for upside-down mounting.
    pub fn new(spi: SPI, cs: CS, cd: CD, rst: RST, rotate_180: bool) -> Self {
        Self {
            spi,
            cs,
            cd,
            rst,
            buffer: [[0; WIDTH]; PAGES],
            rotate_180,
            initialized: false,
        }
    }

    /// Reset and initialize the display
    pub async fn init(&mut self) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::Communication)?;
        Timer::after_millis(1).await;
        self.rst.set_high().map_err(|_| DisplayError::Communication)?;
        Timer::after_millis(5).await;

        let (seg, com) = if self.rotate_180 {
            (cmd::SEG_NORMAL, cmd::COM_REVERSE)
        } else {
            (cmd::SEG_REVERSE, cmd::COM_NORMAL)
        };

        // Initialization sequence for the DOGS102-6
        let init_cmds: &[u8] = &[
            cmd::SET_START_LINE | 0x00,
            seg,
            com,
            cmd::ALL_PIXELS_OFF,
            cmd::SET_NORMAL,
            cmd::BIAS_1_9,
            cmd::POWER_ALL_ON,
            cmd::RESISTOR_RATIO | 0x07,
            cmd::SET_CONTRAST,
            0x10,
            cmd::ADVANCED_CONTROL,
            0x90, // temperature compensation -0.11 %/°C
            cmd::DISPLAY_ON,
        ];
        self.command(init_cmds).await?;

        self.initialized = true;
        Ok(())
    }

    fn column_offset(&self) -> u8 {
        if self.rotate_180 {
            0
        } else {
            REVERSED_COLUMN_OFFSET
        }
    }

    /// Send command bytes
    async fn command(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cd.set_low().map_err(|_| DisplayError::Communication)?;
        self.transfer(bytes).await
    }

    /// Send display RAM bytes
    async fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cd.set_high().map_err(|_| DisplayError::Communication)?;
        self.transfer(bytes).await
    }

    async fn transfer(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::Communication)?;
        let result = match self.spi.write(bytes).await {
            Ok(()) => self.spi.flush().await,
            Err(e) => Err(e),
        };
        self.cs.set_high().map_err(|_| DisplayError::Communication)?;
        result.map_err(|_| DisplayError::Communication)
    }

    /// Set display contrast (0-63)
    #[allow(dead_code)]
    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.command(&[cmd::SET_CONTRAST, contrast & 0x3F]).await
    }
}

impl<SPI, CS, CD, RST> DrawTarget for Uc1701<SPI, CS, CD, RST> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let (x, y) = (point.x as usize, point.y as usize);
            if x >= WIDTH || y >= HEIGHT {
                continue;
            }
            let bit = 1 << (y % 8);
            if color.is_on() {
                self.buffer[y / 8][x] |= bit;
            } else {
                self.buffer[y / 8][x] &= !bit;
            }
        }
        Ok(())
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        let fill = if color.is_on() { 0xFF } else { 0x00 };
        for page in self.buffer.iter_mut() {
            page.fill(fill);
        }
        Ok(())
    }
}

impl<SPI, CS, CD, RST> OriginDimensions for Uc1701<SPI, CS, CD, RST> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}

impl<SPI, CS, CD, RST> DisplayBackend for Uc1701<SPI, CS, CD, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    CD: OutputPin,
    RST: OutputPin,
{
    /// Flush the frame buffer to the display
    async fn flush(&mut self) -> Result<(), DisplayError> {
        if !self.initialized {
            return Err(DisplayError::NotInitialized);
        }

        let column = self.column_offset();
        for page in 0..PAGES {
            self.command(&[
                cmd::SET_PAGE_ADDR | page as u8,
                cmd::SET_HIGH_COLUMN | (column >> 4),
                cmd::SET_LOW_COLUMN | (column & 0x0F),
            ])
            .await?;

            let data = self.buffer[page];
            self.data(&data).await?;
        }

        Ok(())
    }
}
