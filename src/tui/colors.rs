//! Color constants for the terminal chart.

use ratatui::style::Color;

use crate::palette::Rgb;

/// Chart background; bar opacity is blended against it.
pub const BACKGROUND: Rgb = Rgb(0, 0, 0);
/// Day gridlines
pub const GRID: Color = Color::Rgb(70, 70, 70);
/// Header and status bar accent
pub const ACCENT: Color = Color::Rgb(49, 130, 189);

/// Convert a plan color for the terminal.
pub fn to_color(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// A plan color drawn at `opacity` over the chart background.
pub fn faded(c: Rgb, opacity: f32) -> Color {
    to_color(c.over(BACKGROUND, opacity))
}
