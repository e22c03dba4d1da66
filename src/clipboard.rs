use anyhow::{Context, Result};

use crate::cli::ColorRole;
use crate::generator::ColorPalette;

/// Somewhere a copied color code ends up.
pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard.
pub struct SystemClipboard(arboard::Clipboard);

impl SystemClipboard {
    pub fn open() -> Result<Self> {
        let clipboard = arboard::Clipboard::new().context("clipboard is not available")?;
        Ok(Self(clipboard))
    }
}

impl ClipboardSink for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        self.0
            .set_text(text)
            .context("failed to copy to clipboard")
    }
}

/// Copy one color of `palette` as `#RRGGBB` and return the copied text.
pub fn copy_color(
    sink: &mut dyn ClipboardSink,
    palette: &ColorPalette,
    role: ColorRole,
) -> Result<String> {
    let hex = palette.color(role).to_hex_upper();
    sink.set_text(&hex)
        .with_context(|| format!("could not copy {hex}"))?;
    tracing::debug!(color = %hex, ?role, "copied color");
    Ok(hex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl ClipboardSink for Recorder {
        fn set_text(&mut self, text: &str) -> Result<()> {
            self.0.push(text.to_string());
            Ok(())
        }
    }

    struct Unavailable;

    impl ClipboardSink for Unavailable {
        fn set_text(&mut self, _text: &str) -> Result<()> {
            anyhow::bail!("no display")
        }
    }

    #[test]
    fn copies_uppercase_hex_of_the_role() {
        let mut sink = Recorder::default();
        let palette = ColorPalette::default();

        let copied = copy_color(&mut sink, &palette, ColorRole::Accent).unwrap();
        copy_color(&mut sink, &palette, ColorRole::Text).unwrap();

        assert_eq!(copied, "#F59E0B");
        assert_eq!(sink.0, vec!["#F59E0B", "#2D3748"]);
    }

    #[test]
    fn sink_failure_is_an_error() {
        let err = copy_color(&mut Unavailable, &ColorPalette::default(), ColorRole::Primary)
            .unwrap_err();
        let chain = format!("{err:#}");
        assert!(chain.contains("could not copy #3B82F6"), "{chain}");
        assert!(chain.contains("no display"), "{chain}");
    }
}
