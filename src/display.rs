use crate::convert;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// 24-bit RGB color. Displays in HTML format (#rrggbb).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Color {
    pub const BLACK: Self = Self::gray(0x00);
    pub const WHITE: Self = Self::gray(0xff);

    const fn gray(level: u8) -> Self {
        Self {
            red: level,
            green: level,
            blue: level,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }
}

/// The two themes the face supports. Every field on screen is drawn with the
/// same pair, so switching schemes never leaves a half-themed frame.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScheme {
    #[default]
    Light,
    Dark,
}

impl ColorScheme {
    pub fn from_light(light: bool) -> Self {
        if light {
            Self::Light
        } else {
            Self::Dark
        }
    }

    pub fn background(self) -> Color {
        match self {
            Self::Light => Color::WHITE,
            Self::Dark => Color::BLACK,
        }
    }

    pub fn foreground(self) -> Color {
        match self {
            Self::Light => Color::BLACK,
            Self::Dark => Color::WHITE,
        }
    }
}

/// Bluetooth link to the phone
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Connectivity {
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn from_connected(connected: bool) -> Self {
        if connected {
            Self::Connected
        } else {
            Self::Disconnected
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Connected => "bt",
            Self::Disconnected => "!bt",
        }
    }
}

/// Everything that should be on screen right now. Owned by the reconciler and
/// updated one field at a time; never rebuilt wholesale.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayState {
    time_text: String,
    date_text: String,
    connectivity: Connectivity,
    battery_bars: u8,
    temperature_text: String,
    color_scheme: ColorScheme,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            time_text: String::new(),
            date_text: String::new(),
            connectivity: Connectivity::Connected,
            battery_bars: convert::battery_bars(0),
            temperature_text: convert::temperature_text(None),
            color_scheme: ColorScheme::Light,
        }
    }
}

impl DisplayState {
    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn date_text(&self) -> &str {
        &self.date_text
    }

    pub fn connectivity(&self) -> Connectivity {
        self.connectivity
    }

    pub fn connectivity_text(&self) -> &'static str {
        self.connectivity.symbol()
    }

    pub fn battery_bars(&self) -> u8 {
        self.battery_bars
    }

    pub fn battery_text(&self) -> String {
        convert::battery_text(self.battery_bars)
    }

    pub fn temperature_text(&self) -> &str {
        &self.temperature_text
    }

    pub fn color_scheme(&self) -> ColorScheme {
        self.color_scheme
    }

    pub fn set_clock(&mut self, time_text: String, date_text: String) {
        self.time_text = time_text;
        self.date_text = date_text;
    }

    pub fn set_connectivity(&mut self, connectivity: Connectivity) {
        self.connectivity = connectivity;
    }

    pub fn set_battery_bars(&mut self, bars: u8) {
        self.battery_bars = bars;
    }

    pub fn set_temperature_text(&mut self, text: String) {
        self.temperature_text = text;
    }

    pub fn set_color_scheme(&mut self, color_scheme: ColorScheme) {
        self.color_scheme = color_scheme;
    }
}
