use crate::generator::ColorPalette;

use super::PaletteExporter;

/// Pretty-printed JSON object with hex strings.
pub struct JsonExporter;

impl PaletteExporter for JsonExporter {
    fn name(&self) -> &str {
        "JSON"
    }

    fn extension(&self) -> &str {
        "json"
    }

    fn serialize(&self, palette: &ColorPalette) -> String {
        // Only strings and derived enums; serialization cannot fail.
        let mut out =
            serde_json::to_string_pretty(palette).expect("ColorPalette always serializes");
        out.push('\n');
        out
    }
}
