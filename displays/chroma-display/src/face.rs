//! Clock face
//!
//! Upper region: color name and date in an 8x13 bold font. Lower region:
//! hour and minute as large seven-segment digits with a fixed colon.

use embedded_graphics::mono_font::ascii::FONT_8X13_BOLD;
use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;

use chroma_core::state::StatusSnapshot;
use chroma_core::traits::StatusView;

use crate::backend::{DisplayBackend, DisplayError};
use crate::digits::{draw_colon, draw_pair};
use crate::layout::FaceLayout;

/// Boot message shown until the first render
pub const BOOT_MESSAGE: &str = "Initializing";

/// Renders snapshots onto a display backend
pub struct ClockFace<B> {
    backend: B,
    layout: FaceLayout,
}

impl<B: DisplayBackend> ClockFace<B> {
    pub fn new(backend: B, layout: FaceLayout) -> Self {
        Self { backend, layout }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn layout(&self) -> &FaceLayout {
        &self.layout
    }

    /// Show the boot message
    pub async fn show_boot(&mut self) -> Result<(), DisplayError> {
        let style = MonoTextStyle::new(&FONT_8X13_BOLD, BinaryColor::On);
        self.backend
            .clear(BinaryColor::Off)
            .map_err(|_| DisplayError::Draw)?;
        Text::new(BOOT_MESSAGE, self.layout.boot, style)
            .draw(&mut self.backend)
            .map_err(|_| DisplayError::Draw)?;
        self.backend.flush().await
    }

    /// Paint a snapshot into the frame buffer without flushing
    pub fn draw(&mut self, snapshot: &StatusSnapshot) -> Result<(), DisplayError> {
        self.paint(snapshot).map_err(|_| DisplayError::Draw)
    }

    fn paint(&mut self, snapshot: &StatusSnapshot) -> Result<(), B::Error> {
        let layout = self.layout;
        let target = &mut self.backend;
        let style = MonoTextStyle::new(&FONT_8X13_BOLD, BinaryColor::On);

        target.clear(BinaryColor::Off)?;
        Text::new(snapshot.color_name(), layout.name, style).draw(target)?;
        Text::new(snapshot.date(), layout.date, style).draw(target)?;

        let (hour, minute) = match snapshot.hour_minute() {
            Some((h, m)) => (Some(h), Some(m)),
            None => (None, None),
        };
        draw_pair(target, layout.hour, &layout.digit, hour)?;
        draw_colon(target, layout.colon, &layout.digit)?;
        draw_pair(target, layout.minute, &layout.digit, minute)?;
        Ok(())
    }
}

impl<B: DisplayBackend> StatusView for ClockFace<B> {
    async fn render(&mut self, snapshot: &StatusSnapshot) {
        if let Err(_e) = self.draw(snapshot) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Clock face draw failed: {}", _e);
            return;
        }

        if let Err(_e) = self.backend.flush().await {
            #[cfg(feature = "defmt")]
            defmt::warn!("Display flush failed: {}", _e);
        }
    }
}
