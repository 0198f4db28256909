//! Seven-segment glyphs for the large time readout
//!
//! Segment bits, LSB first: a (top), b (upper right), c (lower right),
//! d (bottom), e (lower left), f (upper left), g (middle).

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

use crate::layout::DigitStyle;

const SEG_A: u8 = 1 << 0;
const SEG_B: u8 = 1 << 1;
const SEG_C: u8 = 1 << 2;
const SEG_D: u8 = 1 << 3;
const SEG_E: u8 = 1 << 4;
const SEG_F: u8 = 1 << 5;
const SEG_G: u8 = 1 << 6;

/// Segment masks for 0-9
const DIGIT_SEGMENTS: [u8; 10] = [
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F,
    SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_D | SEG_E | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_G,
    SEG_B | SEG_C | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_F | SEG_G,
    SEG_A | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_E | SEG_F | SEG_G,
    SEG_A | SEG_B | SEG_C | SEG_D | SEG_F | SEG_G,
];

/// A single large character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    /// 0-9; larger values draw as a dash
    Digit(u8),
    /// Placeholder before the first time sync
    Dash,
}

impl Glyph {
    fn segments(self) -> u8 {
        match self {
            Glyph::Digit(d) => DIGIT_SEGMENTS.get(d as usize).copied().unwrap_or(SEG_G),
            Glyph::Dash => SEG_G,
        }
    }
}

/// Segment rectangles relative to the digit's top-left corner
fn segment_rect(segment: u8, style: &DigitStyle) -> Rectangle {
    let (w, h, t) = (style.width, style.height, style.stroke);
    let half = h / 2;
    let (x, y, size) = match segment {
        SEG_A => (0, 0, Size::new(w, t)),
        SEG_B => (w - t, 0, Size::new(t, half)),
        SEG_C => (w - t, half, Size::new(t, h - half)),
        SEG_D => (0, h - t, Size::new(w, t)),
        SEG_E => (0, half, Size::new(t, h - half)),
        SEG_F => (0, 0, Size::new(t, half)),
        _ => (0, half - t / 2, Size::new(w, t)),
    };
    Rectangle::new(Point::new(x as i32, y as i32), size)
}

/// Draw one glyph with its top-left corner at `origin`
pub fn draw_glyph<D>(
    target: &mut D,
    origin: Point,
    style: &DigitStyle,
    glyph: Glyph,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);
    let mask = glyph.segments();
    for bit in 0..7 {
        let segment = 1 << bit;
        if mask & segment != 0 {
            segment_rect(segment, style)
                .translate(origin)
                .into_styled(fill)
                .draw(target)?;
        }
    }
    Ok(())
}

/// Draw a zero-padded two-digit value, or two dashes for `None`
pub fn draw_pair<D>(
    target: &mut D,
    origin: Point,
    style: &DigitStyle,
    value: Option<u8>,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let (tens, ones) = match value {
        Some(v) => (Glyph::Digit(v / 10 % 10), Glyph::Digit(v % 10)),
        None => (Glyph::Dash, Glyph::Dash),
    };
    let step = (style.width + style.spacing) as i32;
    draw_glyph(target, origin, style, tens)?;
    draw_glyph(target, origin + Point::new(step, 0), style, ones)
}

/// Draw the colon between hours and minutes
pub fn draw_colon<D>(target: &mut D, origin: Point, style: &DigitStyle) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let fill = PrimitiveStyle::with_fill(BinaryColor::On);
    let dot = Size::new(style.stroke, style.stroke);
    let third = (style.height / 3) as i32;
    for y in [third, third * 2] {
        Rectangle::new(origin + Point::new(0, y - style.stroke as i32 / 2), dot)
            .into_styled(fill)
            .draw(target)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    /// Counts lit pixels in a 32x40 area
    struct Canvas {
        pixels: [[bool; 32]; 40],
    }

    impl Canvas {
        fn new() -> Self {
            Self {
                pixels: [[false; 32]; 40],
            }
        }

        fn lit(&self) -> usize {
            self.pixels.iter().flatten().filter(|&&p| p).count()
        }
    }

    impl DrawTarget for Canvas {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(p, color) in pixels {
                if (0..32).contains(&p.x) && (0..40).contains(&p.y) {
                    self.pixels[p.y as usize][p.x as usize] = color.is_on();
                }
            }
            Ok(())
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(32, 40)
        }
    }

    fn lit_for(glyph: Glyph) -> usize {
        let mut canvas = Canvas::new();
        draw_glyph(&mut canvas, Point::zero(), &DigitStyle::default(), glyph).unwrap();
        canvas.lit()
    }

    #[test]
    fn test_eight_lights_most() {
        let eight = lit_for(Glyph::Digit(8));
        for d in 0..8 {
            assert!(lit_for(Glyph::Digit(d)) < eight);
        }
        assert!(lit_for(Glyph::Digit(9)) < eight);
    }

    #[test]
    fn test_one_is_right_edge_only() {
        let mut canvas = Canvas::new();
        let style = DigitStyle::default();
        draw_glyph(&mut canvas, Point::zero(), &style, Glyph::Digit(1)).unwrap();

        let left = (style.width - style.stroke) as usize;
        for row in canvas.pixels.iter() {
            assert!(row[..left].iter().all(|&p| !p));
        }
        assert_eq!(canvas.lit(), (style.stroke * style.height) as usize);
    }

    #[test]
    fn test_dash_matches_out_of_range_digit() {
        assert_eq!(lit_for(Glyph::Dash), lit_for(Glyph::Digit(42)));
        assert_eq!(lit_for(Glyph::Dash), 20 * 4);
    }

    #[test]
    fn test_all_digits_distinct() {
        let mut seen = [[[false; 32]; 40]; 10];
        for d in 0..10u8 {
            let mut canvas = Canvas::new();
            draw_glyph(&mut canvas, Point::zero(), &DigitStyle::default(), Glyph::Digit(d)).unwrap();
            seen[d as usize] = canvas.pixels;
        }
        for a in 0..10 {
            for b in (a + 1)..10 {
                assert_ne!(seen[a], seen[b]);
            }
        }
    }
}
