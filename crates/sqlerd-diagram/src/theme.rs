use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colours used by engines that take explicit styling (DOT).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub foreground: &'static str,
    pub header: &'static str,
    pub border: &'static str,
    pub edge: &'static str,
}

const LIGHT: Palette = Palette {
    background: "#ffffff",
    foreground: "#0a0f25",
    header: "#0d32b2",
    border: "#0a0f25",
    edge: "#0d32b2",
};

const DARK: Palette = Palette {
    background: "#1e1e2e",
    foreground: "#cdd6f4",
    header: "#45475a",
    border: "#6c7086",
    edge: "#cba6f7",
};

impl Theme {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(format!("invalid theme `{other}` (expected light|dark)")),
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Self::Light => LIGHT,
            Self::Dark => DARK,
        }
    }

    /// D2 built-in theme: "Neutral Default" and "Dark Mauve".
    pub fn d2_theme_id(self) -> u32 {
        match self {
            Self::Light => 0,
            Self::Dark => 200,
        }
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}
