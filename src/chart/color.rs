//! Colors and the name-to-color ordinal scale

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::tween::Lerp;

/// The 12-color qualitative "Set3" scheme
pub const SET3: [&str; 12] = [
    "#8dd3c7", "#ffffb3", "#bebada", "#fb8072", "#80b1d3", "#fdb462", "#b3de69", "#fccde5",
    "#d9d9d9", "#bc80bd", "#ccebc5", "#ffed6f",
];

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Error for unparseable color strings
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid color: {0}")]
pub struct ParseColorError(pub String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    /// Accepts `#rgb` and `#rrggbb`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(err());
        }

        match hex.len() {
            3 => {
                let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).map(|v| v * 17);
                Ok(Rgb::new(
                    digit(0).map_err(|_| err())?,
                    digit(1).map_err(|_| err())?,
                    digit(2).map_err(|_| err())?,
                ))
            }
            6 => {
                let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
                Ok(Rgb::new(
                    byte(0).map_err(|_| err())?,
                    byte(2).map_err(|_| err())?,
                    byte(4).map_err(|_| err())?,
                ))
            }
            _ => Err(err()),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
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

impl Lerp for Rgb {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round().clamp(0.0, 255.0) as u8;
        Rgb::new(
            channel(self.r, to.r),
            channel(self.g, to.g),
            channel(self.b, to.b),
        )
    }
}

/// Ordinal scale mapping category names onto a cyclic color range
///
/// A name maps to `range[i % range.len()]` where `i` is its position in the
/// domain. Resetting the domain can therefore move a name to another color.
#[derive(Debug, Clone)]
pub struct OrdinalScale {
    domain: Vec<String>,
    index: HashMap<String, usize>,
    range: Vec<Rgb>,
}

impl OrdinalScale {
    pub fn new(range: Vec<Rgb>) -> Self {
        Self {
            domain: Vec::new(),
            index: HashMap::new(),
            range,
        }
    }

    /// Scale over the Set3 scheme
    pub fn set3() -> Self {
        Self::new(
            SET3.iter()
                .filter_map(|hex| hex.parse().ok())
                .collect(),
        )
    }

    /// Replace the domain; duplicate names keep their first position
    pub fn set_domain<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domain.clear();
        self.index.clear();
        for name in names {
            self.intern(name.into());
        }
    }

    fn intern(&mut self, name: String) -> usize {
        if let Some(&i) = self.index.get(&name) {
            return i;
        }
        let i = self.domain.len();
        self.index.insert(name.clone(), i);
        self.domain.push(name);
        i
    }

    /// Color for a name, adding unknown names to the domain
    pub fn color(&mut self, name: &str) -> Rgb {
        let i = self.intern(name.to_string());
        self.pick(i)
    }

    /// Color for a name already in the domain
    pub fn lookup(&self, name: &str) -> Option<Rgb> {
        self.index.get(name).map(|&i| self.pick(i))
    }

    fn pick(&self, i: usize) -> Rgb {
        if self.range.is_empty() {
            return Rgb::BLACK;
        }
        self.range[i % self.range.len()]
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    pub fn range(&self) -> &[Rgb] {
        &self.range
    }
}

impl Default for OrdinalScale {
    fn default() -> Self {
        Self::set3()
    }
}
