use crate::color::Color;

/// Minimum WCAG contrast between body text and background (AA, normal text).
pub const MIN_TEXT_CONTRAST: f32 = 4.5;

/// YIQ brightness at or above which black text reads better than white.
const YIQ_MIDPOINT: u32 = 128;

/// Label color to draw on top of an arbitrary swatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTone {
    Black,
    White,
}

impl TextTone {
    pub fn color(self) -> Color {
        match self {
            TextTone::Black => Color::BLACK,
            TextTone::White => Color::WHITE,
        }
    }
}

/// Perceptual brightness of a color on the YIQ scale, in [0, 255].
pub fn yiq_brightness(c: Color) -> u32 {
    (c.r as u32 * 299 + c.g as u32 * 587 + c.b as u32 * 114) / 1000
}

/// Choose black or white text for readable labels on `background`.
pub fn contrast_text(background: Color) -> TextTone {
    if yiq_brightness(background) >= YIQ_MIDPOINT {
        TextTone::Black
    } else {
        TextTone::White
    }
}
