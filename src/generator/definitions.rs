//! Hand-curated palette tables.
//!
//! Light definitions sit on near-white backgrounds with dark body text;
//! dark definitions sit on near-black backgrounds with light body text.

use crate::color::Color;

use super::Category;

/// One row of the curated table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteDef {
    pub name: &'static str,
    pub category: Category,
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub text: Color,
}

const fn rgb(hex: u32) -> Color {
    Color::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

const fn def(name: &'static str, category: Category, colors: [u32; 5]) -> PaletteDef {
    PaletteDef {
        name,
        category,
        primary: rgb(colors[0]),
        secondary: rgb(colors[1]),
        accent: rgb(colors[2]),
        background: rgb(colors[3]),
        text: rgb(colors[4]),
    }
}

//                         primary   secondary accent    background text
pub const LIGHT_PALETTES: &[PaletteDef] = &[
    def("Azure Daylight", Category::Cool, [0x3B82F6, 0x10B981, 0xF59E0B, 0xFFFFFF, 0x2D3748]),
    def("Ocean Breeze", Category::Cool, [0x0EA5E9, 0x06B6D4, 0xF97316, 0xF0F9FF, 0x0C4A6E]),
    def("Arctic Mint", Category::Cool, [0x14B8A6, 0x3B82F6, 0xA855F7, 0xF0FDFA, 0x134E4A]),
    def("Sunset Glow", Category::Warm, [0xF97316, 0xEF4444, 0xFACC15, 0xFFF7ED, 0x431407]),
    def("Forest Walk", Category::Earthy, [0x15803D, 0xA16207, 0x84CC16, 0xF7FEE7, 0x1A2E05]),
    def("Terracotta", Category::Earthy, [0xC2410C, 0x78716C, 0xCA8A04, 0xFAFAF9, 0x292524]),
    def("Cotton Candy", Category::Pastel, [0xF9A8D4, 0xA5B4FC, 0xFDE68A, 0xFDF2F8, 0x4A044E]),
    def("Lavender Fields", Category::Pastel, [0xC4B5FD, 0xA7F3D0, 0xFBCFE8, 0xF5F3FF, 0x2E1065]),
    def("Electric Pop", Category::Vibrant, [0x8B5CF6, 0xEC4899, 0x22D3EE, 0xFFFFFF, 0x1E1B4B]),
    def("Citrus Splash", Category::Vibrant, [0xF59E0B, 0x84CC16, 0xEF4444, 0xFFFBEB, 0x292524]),
    def("Paper & Ink", Category::Monochrome, [0x404040, 0x737373, 0xA3A3A3, 0xFAFAFA, 0x171717]),
    def("Highlighter", Category::Neon, [0x39FF14, 0xFF00FF, 0x00FFFF, 0xFFFFFF, 0x111111]),
];

pub const DARK_PALETTES: &[PaletteDef] = &[
    def("Deep Space", Category::Dark, [0x6366F1, 0x8B5CF6, 0xF472B6, 0x030712, 0xF9FAFB]),
    def("Midnight Neon", Category::Neon, [0x22D3EE, 0xE879F9, 0xA3E635, 0x0F172A, 0xF1F5F9]),
    def("Synthwave", Category::Vibrant, [0xF43F5E, 0xA855F7, 0xFACC15, 0x1E1B4B, 0xF5F3FF]),
    def("Ember Night", Category::Warm, [0xF97316, 0xDC2626, 0xFBBF24, 0x1C1917, 0xFAFAF9]),
    def("Nocturne Forest", Category::Earthy, [0x4ADE80, 0xA3E635, 0xFACC15, 0x052E16, 0xECFDF5]),
    def("Aurora", Category::Cool, [0x2DD4BF, 0x38BDF8, 0xC084FC, 0x082F49, 0xF0F9FF]),
    def("Graphite", Category::Monochrome, [0xA1A1AA, 0x71717A, 0xE4E4E7, 0x18181B, 0xFAFAFA]),
    def("Dusky Pastel", Category::Pastel, [0xF9A8D4, 0xA5B4FC, 0x99F6E4, 0x1F2937, 0xF9FAFB]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_unpacks_channels() {
        assert_eq!(rgb(0x3B82F6), Color::new(0x3b, 0x82, 0xf6));
        assert_eq!(rgb(0x000000), Color::BLACK);
    }

    #[test]
    fn tables_are_not_empty() {
        assert!(!LIGHT_PALETTES.is_empty());
        assert!(!DARK_PALETTES.is_empty());
    }
}
