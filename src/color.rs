//! 16-color console palette and the dark/light ramps used for shading

use crossterm::style::Color;
use serde::{Deserialize, Serialize};

const BLUE_BIT: u8 = 0x1;
const GREEN_BIT: u8 = 0x2;
const RED_BIT: u8 = 0x4;
const INTENSITY_BIT: u8 = 0x8;

/// Console palette entry
///
/// The discriminant is the wire value used by console attributes: bit 0 blue,
/// bit 1 green, bit 2 red, bit 3 intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum ConsoleColor {
    Black = 0x0,
    DarkBlue = 0x1,
    DarkGreen = 0x2,
    DarkCyan = 0x3,
    DarkRed = 0x4,
    DarkMagenta = 0x5,
    DarkYellow = 0x6,
    Grey = 0x7,
    DarkGrey = 0x8,
    Blue = 0x9,
    Green = 0xa,
    Cyan = 0xb,
    Red = 0xc,
    Magenta = 0xd,
    Yellow = 0xe,
    White = 0xf,
}

impl ConsoleColor {
    /// All palette entries in wire order
    pub const ALL: [ConsoleColor; 16] = [
        ConsoleColor::Black,
        ConsoleColor::DarkBlue,
        ConsoleColor::DarkGreen,
        ConsoleColor::DarkCyan,
        ConsoleColor::DarkRed,
        ConsoleColor::DarkMagenta,
        ConsoleColor::DarkYellow,
        ConsoleColor::Grey,
        ConsoleColor::DarkGrey,
        ConsoleColor::Blue,
        ConsoleColor::Green,
        ConsoleColor::Cyan,
        ConsoleColor::Red,
        ConsoleColor::Magenta,
        ConsoleColor::Yellow,
        ConsoleColor::White,
    ];

    /// Decode the low nibble of a wire value
    pub fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 0xf) as usize]
    }

    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Red, green and blue channel flags
    pub fn channels(self) -> (bool, bool, bool) {
        let bits = self.bits();
        (bits & RED_BIT != 0, bits & GREEN_BIT != 0, bits & BLUE_BIT != 0)
    }

    pub fn is_intense(self) -> bool {
        self.bits() & INTENSITY_BIT != 0
    }

    /// Same hue with the intensity bit set
    pub fn intensified(self) -> Self {
        Self::from_bits(self.bits() | INTENSITY_BIT)
    }

    /// Same hue with the intensity bit cleared
    pub fn dimmed(self) -> Self {
        Self::from_bits(self.bits() & !INTENSITY_BIT)
    }

    /// Single hex digit for text dumps
    pub fn hex_digit(self) -> char {
        char::from_digit(self.bits() as u32, 16).unwrap_or('?')
    }
}

impl From<ConsoleColor> for Color {
    fn from(color: ConsoleColor) -> Self {
        match color {
            ConsoleColor::Black => Color::Black,
            ConsoleColor::DarkBlue => Color::DarkBlue,
            ConsoleColor::DarkGreen => Color::DarkGreen,
            ConsoleColor::DarkCyan => Color::DarkCyan,
            ConsoleColor::DarkRed => Color::DarkRed,
            ConsoleColor::DarkMagenta => Color::DarkMagenta,
            ConsoleColor::DarkYellow => Color::DarkYellow,
            ConsoleColor::Grey => Color::Grey,
            ConsoleColor::DarkGrey => Color::DarkGrey,
            ConsoleColor::Blue => Color::Blue,
            ConsoleColor::Green => Color::Green,
            ConsoleColor::Cyan => Color::Cyan,
            ConsoleColor::Red => Color::Red,
            ConsoleColor::Magenta => Color::Magenta,
            ConsoleColor::Yellow => Color::Yellow,
            ConsoleColor::White => Color::White,
        }
    }
}

/// Two tones of one hue: `dark` for the side facing away from the light
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRamp {
    pub dark: ConsoleColor,
    pub light: ConsoleColor,
}

impl ColorRamp {
    pub fn new(dark: ConsoleColor, light: ConsoleColor) -> Self {
        Self { dark, light }
    }

    /// Build a ramp from any tone of a hue
    pub fn from_base(base: ConsoleColor) -> Self {
        Self {
            dark: base.dimmed(),
            light: base.intensified(),
        }
    }

    pub fn pick(&self, lit: bool) -> ConsoleColor {
        if lit {
            self.light
        } else {
            self.dark
        }
    }
}

/// Foreground/background pair as stored in a console attribute byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttribute {
    pub fg: ConsoleColor,
    pub bg: ConsoleColor,
}

impl CellAttribute {
    pub fn new(fg: ConsoleColor, bg: ConsoleColor) -> Self {
        Self { fg, bg }
    }

    pub fn pack(self) -> u8 {
        self.fg.bits() | self.bg.bits() << 4
    }

    pub fn unpack(attribute: u8) -> Self {
        Self {
            fg: ConsoleColor::from_bits(attribute),
            bg: ConsoleColor::from_bits(attribute >> 4),
        }
    }
}

impl Default for CellAttribute {
    fn default() -> Self {
        Self::new(ConsoleColor::White, ConsoleColor::Black)
    }
}
