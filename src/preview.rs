use std::io::Write;

use crossterm::queue;
use crossterm::style::{
    Color as TermColor, Print, ResetColor, SetBackgroundColor, SetForegroundColor,
};

use crate::color::Color;
use crate::generator::contrast::contrast_text;
use crate::generator::ColorPalette;

const SWATCH_WIDTH: usize = 28;

fn term(color: Color) -> TermColor {
    TermColor::Rgb {
        r: color.r,
        g: color.g,
        b: color.b,
    }
}

/// Print one colored row per swatch, plus a sample line of the palette's own
/// text on its background.
pub fn render(out: &mut impl Write, palette: &ColorPalette) -> std::io::Result<()> {
    queue!(
        out,
        Print(format!("{} ({})\n", palette.name, palette.category))
    )?;

    for (label, color) in palette.swatches() {
        let cell = format!(" {:<12}{}", label, color.to_hex_upper());
        queue!(
            out,
            SetBackgroundColor(term(color)),
            SetForegroundColor(term(contrast_text(color).color())),
            Print(format!("{cell:<SWATCH_WIDTH$}")),
            ResetColor,
            Print("\n"),
        )?;
    }

    let sample = format!(
        " Aa  text on background  {:.2}:1",
        palette.text_contrast()
    );
    queue!(
        out,
        SetBackgroundColor(term(palette.background)),
        SetForegroundColor(term(palette.text)),
        Print(format!("{sample:<SWATCH_WIDTH$}")),
        ResetColor,
        Print("\n"),
    )?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(palette: &ColorPalette) -> String {
        let mut buf = Vec::new();
        render(&mut buf, palette).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn lists_every_swatch() {
        let out = rendered(&ColorPalette::default());
        assert!(out.starts_with("Default (Vibrant)\n"));
        for hex in ["#3B82F6", "#10B981", "#F59E0B", "#FFFFFF", "#2D3748"] {
            assert!(out.contains(hex), "missing {hex}");
        }
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn emits_truecolor_sequences() {
        let out = rendered(&ColorPalette::default());
        // 48;2 = background, 38;2 = foreground
        assert!(out.contains("\x1b[48;2;59;130;246m"));
        assert!(out.contains("\x1b[38;2;0;0;0m"));
        assert!(out.contains("\x1b[38;2;45;55;72m"));
    }
}
