//! Display backend trait
//!
//! Defines the interface for different panel types.

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;

/// Display backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with display
    Communication,
    /// Display not initialized
    NotInitialized,
    /// Drawing into the frame buffer failed
    Draw,
}

/// Display backend trait
///
/// Drawing goes to a local frame buffer through `DrawTarget`; nothing
/// reaches the panel until `flush`.
#[allow(async_fn_in_trait)]
pub trait DisplayBackend: DrawTarget<Color = BinaryColor> {
    /// Send the frame buffer to the panel
    async fn flush(&mut self) -> Result<(), DisplayError>;
}
