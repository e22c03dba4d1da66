pub mod contrast;
pub mod definitions;

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cli::{ColorRole, ThemeMode};
use crate::color::Color;

use contrast::MIN_TEXT_CONTRAST;
use definitions::{PaletteDef, DARK_PALETTES, LIGHT_PALETTES};

/// Classification tag carried by every palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Vibrant,
    Pastel,
    Earthy,
    Cool,
    Warm,
    Monochrome,
    Neon,
    Dark,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Vibrant,
        Category::Pastel,
        Category::Earthy,
        Category::Cool,
        Category::Warm,
        Category::Monochrome,
        Category::Neon,
        Category::Dark,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vibrant => "Vibrant",
            Category::Pastel => "Pastel",
            Category::Earthy => "Earthy",
            Category::Cool => "Cool",
            Category::Warm => "Warm",
            Category::Monochrome => "Monochrome",
            Category::Neon => "Neon",
            Category::Dark => "Dark",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named set of five colors plus a category tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub text: Color,
    pub name: String,
    pub category: Category,
}

impl ColorPalette {
    /// The five colors with their display labels, in canonical order.
    pub fn swatches(&self) -> [(&'static str, Color); 5] {
        [
            ("Primary", self.primary),
            ("Secondary", self.secondary),
            ("Accent", self.accent),
            ("Background", self.background),
            ("Text", self.text),
        ]
    }

    pub fn color(&self, role: ColorRole) -> Color {
        match role {
            ColorRole::Primary => self.primary,
            ColorRole::Secondary => self.secondary,
            ColorRole::Accent => self.accent,
            ColorRole::Background => self.background,
            ColorRole::Text => self.text,
        }
    }

    /// WCAG contrast ratio of the text color against the background.
    pub fn text_contrast(&self) -> f32 {
        Color::contrast_ratio(&self.text, &self.background)
    }

    /// Whether body text meets the minimum contrast against the background.
    pub fn is_readable(&self) -> bool {
        self.text_contrast() >= MIN_TEXT_CONTRAST
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self {
            primary: Color::new(0x3b, 0x82, 0xf6),
            secondary: Color::new(0x10, 0xb9, 0x81),
            accent: Color::new(0xf5, 0x9e, 0x0b),
            background: Color::WHITE,
            text: Color::new(0x2d, 0x37, 0x48),
            name: "Default".to_string(),
            category: Category::Vibrant,
        }
    }
}

impl From<&PaletteDef> for ColorPalette {
    fn from(def: &PaletteDef) -> Self {
        Self {
            primary: def.primary,
            secondary: def.secondary,
            accent: def.accent,
            background: def.background,
            text: def.text,
            name: def.name.to_string(),
            category: def.category,
        }
    }
}

/// Curated definitions appropriate to the given mode.
pub fn definitions_for(mode: ThemeMode) -> &'static [PaletteDef] {
    match mode {
        ThemeMode::Light => LIGHT_PALETTES,
        ThemeMode::Dark => DARK_PALETTES,
    }
}

/// Pick a palette uniformly at random from the curated set for `mode`.
pub fn generate_palette(mode: ThemeMode) -> ColorPalette {
    generate_palette_with(mode, &mut rand::rng())
}

/// Same as [`generate_palette`] with a caller-supplied RNG.
pub fn generate_palette_with<R: Rng + ?Sized>(mode: ThemeMode, rng: &mut R) -> ColorPalette {
    let defs = definitions_for(mode);
    // Both tables are non-empty constants.
    let def = defs.choose(rng).unwrap_or(&defs[0]);
    ColorPalette::from(def)
}
