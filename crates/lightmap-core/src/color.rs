use crate::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display colors understood by the light driver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamedColor {
    Red,
    Green,
    Blue,
    White,
    Black,
    Off,
    Purple,
}

impl NamedColor {
    pub const ALL: [NamedColor; 7] = [
        NamedColor::Red,
        NamedColor::Green,
        NamedColor::Blue,
        NamedColor::White,
        NamedColor::Black,
        NamedColor::Off,
        NamedColor::Purple,
    ];

    pub fn rgb(self) -> [u8; 3] {
        match self {
            NamedColor::Red => [200, 0, 0],
            NamedColor::Green => [0, 200, 0],
            NamedColor::Blue => [0, 0, 200],
            NamedColor::White => [150, 150, 150],
            NamedColor::Black | NamedColor::Off => [0, 0, 0],
            NamedColor::Purple => [200, 0, 200],
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NamedColor::Red => "red",
            NamedColor::Green => "green",
            NamedColor::Blue => "blue",
            NamedColor::White => "white",
            NamedColor::Black => "black",
            NamedColor::Off => "off",
            NamedColor::Purple => "purple",
        }
    }
}

impl FromStr for NamedColor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.name() == wanted)
            .ok_or_else(|| CoreError::UnknownColor(s.to_string()))
    }
}

impl fmt::Display for NamedColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
