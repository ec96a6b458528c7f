//! Colors for timeline rows and the fixed palette they are drawn from.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// An opaque 8-bit RGB color. Serialised as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Build from a `0xRRGGBB` literal.
    pub const fn hex(v: u32) -> Self {
        Rgb((v >> 16) as u8, (v >> 8) as u8, v as u8)
    }

    /// Linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }

    /// The color drawn at `opacity` over `background`.
    pub fn over(self, background: Rgb, opacity: f32) -> Rgb {
        background.lerp(self, opacity as f64)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return Err(format!("expected #rrggbb, got '{s}'"));
        }
        u32::from_str_radix(digits, 16)
            .map(Rgb::hex)
            .map_err(|_| format!("expected #rrggbb, got '{s}'"))
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// The 20-entry `tab20c` qualitative colormap: four shades each of blue,
/// orange, green, purple and grey.
pub const TAB20C: [Rgb; 20] = [
    Rgb::hex(0x3182bd),
    Rgb::hex(0x6baed6),
    Rgb::hex(0x9ecae1),
    Rgb::hex(0xc6dbef),
    Rgb::hex(0xe6550d),
    Rgb::hex(0xfd8d3c),
    Rgb::hex(0xfdae6b),
    Rgb::hex(0xfdd0a2),
    Rgb::hex(0x31a354),
    Rgb::hex(0x74c476),
    Rgb::hex(0xa1d99b),
    Rgb::hex(0xc7e9c0),
    Rgb::hex(0x756bb1),
    Rgb::hex(0x9e9ac8),
    Rgb::hex(0xbcbddc),
    Rgb::hex(0xdadaeb),
    Rgb::hex(0x636363),
    Rgb::hex(0x969696),
    Rgb::hex(0xbdbdbd),
    Rgb::hex(0xd9d9d9),
];

/// Progress overlay color, independent of the row color.
pub const OVERLAY: Rgb = Rgb::hex(0x2b2b2b);

/// Color at position `t` in `[0, 1]` along the palette, blending the two
/// nearest entries.
pub fn at(palette: &[Rgb], t: f64) -> Rgb {
    let last = palette.len().saturating_sub(1);
    let pos = t.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = (lo + 1).min(last);
    palette[lo].lerp(palette[hi], pos - lo as f64)
}

/// `n` colors sampled evenly from the first to the last palette entry.
///
/// A single sample is the first entry. Asking for more samples than the
/// palette has entries interpolates between neighbours instead of repeating.
pub fn sample(palette: &[Rgb], n: usize) -> Vec<Rgb> {
    match n {
        0 => Vec::new(),
        1 => vec![palette[0]],
        _ => (0..n)
            .map(|i| at(palette, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_round_trip_text() {
        let c = Rgb::hex(0x3182bd);
        assert_eq!(c, Rgb(0x31, 0x82, 0xbd));
        assert_eq!(c.to_string(), "#3182bd");
        assert_eq!("#3182bd".parse::<Rgb>().unwrap(), c);
        assert!("#31".parse::<Rgb>().is_err());
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#3182bd\"");
    }

    #[test]
    fn test_sample_endpoints() {
        assert!(sample(&TAB20C, 0).is_empty());
        assert_eq!(sample(&TAB20C, 1), vec![TAB20C[0]]);
        let two = sample(&TAB20C, 2);
        assert_eq!(two, vec![TAB20C[0], TAB20C[19]]);
        // Evenly spaced over 20 entries hits every entry exactly.
        assert_eq!(sample(&TAB20C, 20), TAB20C.to_vec());
    }

    #[test]
    fn test_more_samples_than_entries_are_still_distinct() {
        let many = sample(&TAB20C, 39);
        assert_eq!(many.len(), 39);
        // Even samples land on entries, odd ones between neighbours.
        assert_eq!(many[2], TAB20C[1]);
        assert_ne!(many[1], TAB20C[0]);
        assert_ne!(many[1], TAB20C[1]);
        let unique: std::collections::HashSet<_> = many.iter().collect();
        assert_eq!(unique.len(), 39);
    }

    #[test]
    fn test_over_blends_toward_background() {
        let white = Rgb(255, 255, 255);
        let black = Rgb(0, 0, 0);
        assert_eq!(white.over(black, 1.0), white);
        assert_eq!(white.over(black, 0.0), black);
        assert_eq!(white.over(black, 0.6), Rgb(153, 153, 153));
    }
}
