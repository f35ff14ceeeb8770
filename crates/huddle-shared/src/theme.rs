//! Background palette offered on the start screen.

use serde::{Deserialize, Serialize};

use crate::error::SharedError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundColor {
    #[default]
    Black,
    Purple,
    Grey,
    Green,
}

impl BackgroundColor {
    pub const ALL: [BackgroundColor; 4] = [
        BackgroundColor::Black,
        BackgroundColor::Purple,
        BackgroundColor::Grey,
        BackgroundColor::Green,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Purple => "purple",
            Self::Grey => "grey",
            Self::Green => "green",
        }
    }

    pub fn hex(self) -> &'static str {
        match self {
            Self::Black => "#090c08",
            Self::Purple => "#474056",
            Self::Grey => "#8a95a5",
            Self::Green => "#b9c6ae",
        }
    }

    /// Bubble colour for the local user's own messages on this background.
    pub fn own_bubble_hex(self) -> &'static str {
        match self {
            Self::Black => "#526675",
            Self::Purple => "#ba8bba",
            Self::Grey => "#223C50",
            Self::Green => "#2C4937",
        }
    }
}

impl std::fmt::Display for BackgroundColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for BackgroundColor {
    type Err = SharedError;

    /// Accepts a palette name or its hex code, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(needle) || c.hex().eq_ignore_ascii_case(needle))
            .ok_or_else(|| SharedError::UnknownColor(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_hex() {
        assert_eq!("Purple".parse::<BackgroundColor>().unwrap(), BackgroundColor::Purple);
        assert_eq!("#8A95A5".parse::<BackgroundColor>().unwrap(), BackgroundColor::Grey);
        assert!("teal".parse::<BackgroundColor>().is_err());
    }

    #[test]
    fn bubble_colours_follow_background() {
        assert_eq!(BackgroundColor::Black.own_bubble_hex(), "#526675");
        assert_eq!(BackgroundColor::Green.own_bubble_hex(), "#2C4937");
    }
}
