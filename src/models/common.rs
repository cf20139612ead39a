use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Twitter,
    Instagram,
    LinkedIn,
    Facebook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tone {
    Professional,
    Casual,
    Humorous,
    Inspirational,
    Formal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageStyle {
    Photorealistic,
    Minimalist,
    Cartoon,
    Abstract,
    Vintage,
}

impl Platform {
    pub const ALL: [Platform; 4] = [
        Platform::Twitter,
        Platform::Instagram,
        Platform::LinkedIn,
        Platform::Facebook,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter",
            Platform::Instagram => "Instagram",
            Platform::LinkedIn => "LinkedIn",
            Platform::Facebook => "Facebook",
        }
    }
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Humorous,
        Tone::Inspirational,
        Tone::Formal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Humorous => "Humorous",
            Tone::Inspirational => "Inspirational",
            Tone::Formal => "Formal",
        }
    }
}

impl ImageStyle {
    pub const ALL: [ImageStyle; 5] = [
        ImageStyle::Photorealistic,
        ImageStyle::Minimalist,
        ImageStyle::Cartoon,
        ImageStyle::Abstract,
        ImageStyle::Vintage,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageStyle::Photorealistic => "Photorealistic",
            ImageStyle::Minimalist => "Minimalist",
            ImageStyle::Cartoon => "Cartoon",
            ImageStyle::Abstract => "Abstract",
            ImageStyle::Vintage => "Vintage",
        }
    }
}

macro_rules! display_and_parse {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
                    .ok_or_else(|| {
                        let names: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!("unknown {} '{}', expected one of: {}", $what, s, names.join(", "))
                    })
            }
        }
    };
}

display_and_parse!(Platform, "platform");
display_and_parse!(Tone, "tone");
display_and_parse!(ImageStyle, "image style");
