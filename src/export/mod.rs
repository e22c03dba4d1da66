pub mod css;
pub mod json;
pub mod text;

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::ExportFormat;
use crate::generator::ColorPalette;

pub use css::CssExporter;
pub use json::JsonExporter;
pub use text::TextExporter;

/// A write-only rendering of a palette for download.
pub trait PaletteExporter {
    /// Human-readable format name.
    fn name(&self) -> &str;

    /// File extension without the leading dot.
    fn extension(&self) -> &str;

    /// Render the palette.
    fn serialize(&self, palette: &ColorPalette) -> String;

    /// Render the palette and save it at `path`.
    fn write_to(&self, palette: &ColorPalette, path: &Path) -> Result<()> {
        let content = self.serialize(palette);
        std::fs::write(path, content)
            .with_context(|| format!("failed to write palette to {}", path.display()))?;
        Ok(())
    }
}

/// Pick the exporter for a CLI format choice.
pub fn exporter_for(format: ExportFormat) -> Box<dyn PaletteExporter> {
    match format {
        ExportFormat::Text => Box::new(TextExporter),
        ExportFormat::Css => Box::new(CssExporter),
        ExportFormat::Json => Box::new(JsonExporter),
    }
}

/// `<slug>-palette.<ext>`, e.g. `ocean-breeze-palette.txt`.
pub fn default_file_name(palette: &ColorPalette, exporter: &dyn PaletteExporter) -> String {
    format!("{}-palette.{}", slug(&palette.name), exporter.extension())
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
