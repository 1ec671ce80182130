//! Vertex tint colors and the dye palette used by decal layers.

/// RGBA color tint applied to every vertex of a draw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Builds an opaque color from a packed `0xRRGGBB` value.
    pub const fn from_rgb_u32(rgb: u32) -> Self {
        Self::rgb(
            ((rgb >> 16) & 0xFF) as f32 / 255.0,
            ((rgb >> 8) & 0xFF) as f32 / 255.0,
            (rgb & 0xFF) as f32 / 255.0,
        )
    }

    /// Returns the same color with a different alpha.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// The sixteen dye colors a decal layer can be tinted with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DyeColor {
    White,
    Orange,
    Magenta,
    LightBlue,
    Yellow,
    Lime,
    Pink,
    Gray,
    LightGray,
    Cyan,
    Purple,
    Blue,
    Brown,
    Green,
    Red,
    Black,
}

impl DyeColor {
    /// All dyes in palette order.
    pub const ALL: [DyeColor; 16] = [
        DyeColor::White,
        DyeColor::Orange,
        DyeColor::Magenta,
        DyeColor::LightBlue,
        DyeColor::Yellow,
        DyeColor::Lime,
        DyeColor::Pink,
        DyeColor::Gray,
        DyeColor::LightGray,
        DyeColor::Cyan,
        DyeColor::Purple,
        DyeColor::Blue,
        DyeColor::Brown,
        DyeColor::Green,
        DyeColor::Red,
        DyeColor::Black,
    ];

    /// Packed `0xRRGGBB` diffuse color of the dye.
    pub const fn rgb(self) -> u32 {
        match self {
            DyeColor::White => 0xF9FFFE,
            DyeColor::Orange => 0xF9801D,
            DyeColor::Magenta => 0xC74EBD,
            DyeColor::LightBlue => 0x3AB3DA,
            DyeColor::Yellow => 0xFED83D,
            DyeColor::Lime => 0x80C71F,
            DyeColor::Pink => 0xF38BAA,
            DyeColor::Gray => 0x474F52,
            DyeColor::LightGray => 0x9D9D97,
            DyeColor::Cyan => 0x169C9C,
            DyeColor::Purple => 0x8932B8,
            DyeColor::Blue => 0x3C44AA,
            DyeColor::Brown => 0x835432,
            DyeColor::Green => 0x5E7C16,
            DyeColor::Red => 0xB02E26,
            DyeColor::Black => 0x1D1D21,
        }
    }

    /// Diffuse color as an opaque tint.
    pub const fn diffuse(self) -> Color {
        Color::from_rgb_u32(self.rgb())
    }
}

impl From<DyeColor> for Color {
    fn from(dye: DyeColor) -> Self {
        dye.diffuse()
    }
}
