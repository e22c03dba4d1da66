use crate::generator::ColorPalette;

use super::PaletteExporter;

/// CSS custom properties on `:root`.
pub struct CssExporter;

impl PaletteExporter for CssExporter {
    fn name(&self) -> &str {
        "CSS"
    }

    fn extension(&self) -> &str {
        "css"
    }

    fn serialize(&self, palette: &ColorPalette) -> String {
        let mut out = String::new();
        out.push_str(&format!("/* {} ({}) */\n", palette.name, palette.category));
        out.push_str(":root {\n");
        for (label, color) in palette.swatches() {
            out.push_str(&format!(
                "  --color-{}: {};\n",
                label.to_ascii_lowercase(),
                color.to_hex()
            ));
        }
        out.push_str("}\n");
        out
    }
}
