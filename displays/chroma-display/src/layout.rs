//! Face geometry
//!
//! Text origins are baseline positions; digit origins are top-left
//! corners. Defaults are laid out for a 102x64 panel.

use embedded_graphics::geometry::Point;

/// Seven-segment digit dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitStyle {
    pub width: u32,
    pub height: u32,
    /// Segment stroke thickness
    pub stroke: u32,
    /// Horizontal gap between the two digits of a field
    pub spacing: u32,
}

impl Default for DigitStyle {
    fn default() -> Self {
        Self {
            width: 20,
            height: 36,
            stroke: 4,
            spacing: 3,
        }
    }
}

impl DigitStyle {
    /// Width of a two-digit field
    pub fn pair_width(&self) -> u32 {
        self.width * 2 + self.spacing
    }
}

/// Every position the clock face draws at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceLayout {
    /// Color name baseline
    pub name: Point,
    /// Date baseline
    pub date: Point,
    /// Hour digits, top-left
    pub hour: Point,
    /// Colon, top-left
    pub colon: Point,
    /// Minute digits, top-left
    pub minute: Point,
    /// Boot message baseline
    pub boot: Point,
    pub digit: DigitStyle,
}

impl Default for FaceLayout {
    fn default() -> Self {
        Self {
            name: Point::new(20, 10),
            date: Point::new(11, 23),
            hour: Point::new(0, 26),
            colon: Point::new(47, 26),
            minute: Point::new(56, 26),
            boot: Point::new(0, 30),
            digit: DigitStyle::default(),
        }
    }
}
