use crate::generator::ColorPalette;

use super::PaletteExporter;

/// Plain-text listing: one `Role  #RRGGBB` line per color, annotated with
/// rgb and hsl values.
pub struct TextExporter;

impl PaletteExporter for TextExporter {
    fn name(&self) -> &str {
        "Text"
    }

    fn extension(&self) -> &str {
        "txt"
    }

    fn serialize(&self, palette: &ColorPalette) -> String {
        let mut out = String::new();
        out.push_str(&format!("Palette: {}\n", palette.name));
        out.push_str(&format!("Category: {}\n", palette.category));
        out.push('\n');
        for (label, color) in palette.swatches() {
            let hsl = color.to_hsl();
            out.push_str(&format!(
                "{:<12}{}  rgb({}, {}, {})  hsl({}, {}%, {}%)\n",
                format!("{label}:"),
                color.to_hex_upper(),
                color.r,
                color.g,
                color.b,
                hsl.hue,
                hsl.saturation,
                hsl.lightness,
            ));
        }
        out
    }
}
