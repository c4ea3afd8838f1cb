//! Escape sequences the color sink wraps around a record's color range.

use std::fmt;

/// Classic 8-color SGR codes.
pub mod ansi {
    pub const RESET: &str = "\x1b[m";
    pub const BOLD: &str = "\x1b[1m";

    pub const WHITE: &str = "\x1b[37m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const ON_RED: &str = "\x1b[41m";

    pub const YELLOW_BOLD: &str = "\x1b[33m\x1b[1m";
    pub const RED_BOLD: &str = "\x1b[31m\x1b[1m";
    pub const BOLD_ON_RED: &str = "\x1b[1m\x1b[41m";
}

/// 24-bit color for callers that want their own palette instead of the 8-color defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Config files specify colors as `#RRGGBB`. Falls back to white on malformed input
    /// so a typo in config doesn't break rendering.
    #[must_use]
    pub fn from_hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Self::white();
        }

        let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
        let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
        let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);

        Self { r, g, b }
    }

    #[must_use]
    pub fn fg_ansi(self) -> String {
        format!("\x1b[38;2;{};{};{}m", self.r, self.g, self.b)
    }

    #[must_use]
    pub fn bg_ansi(self) -> String {
        format!("\x1b[48;2;{};{};{}m", self.r, self.g, self.b)
    }

    #[must_use]
    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}
