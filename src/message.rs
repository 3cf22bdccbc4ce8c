//! Keyed messages exchanged with the phone. A message is a dictionary of
//! numeric field IDs to small typed values; every field is optional.

use log::warn;
use serde::{Deserialize, Serialize};

/// Field ID for the temperature, signed 32-bit Celsius
pub const FIELD_TEMPERATURE: u32 = 0;
/// Field ID for the color scheme flag, non-zero means light
pub const FIELD_LIGHT_COLOR_SCHEME: u32 = 1;
/// Field ID for the temperature unit flag, non-zero means Celsius
pub const FIELD_DEGREE_CELSIUS: u32 = 2;
/// Field ID for the only outbound field
pub const FIELD_REQUEST: u32 = 0;
/// Value of [FIELD_REQUEST] that asks for current weather
pub const REQUEST_WEATHER: u8 = 0;

/// A value in a message dictionary
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TupleValue {
    Int32(i32),
    Uint8(u8),
    Text(String),
}

impl TupleValue {
    fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int32(value) => Some(*value),
            Self::Uint8(value) => Some((*value).into()),
            Self::Text(_) => None,
        }
    }

    fn as_flag(&self) -> Option<bool> {
        self.as_int().map(|value| value != 0)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tuple {
    pub key: u32,
    pub value: TupleValue,
}

/// Raw message as it comes off the wire
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary(pub Vec<Tuple>);

impl Dictionary {
    pub fn push(&mut self, key: u32, value: TupleValue) {
        self.0.push(Tuple { key, value });
    }

    pub fn find(&self, key: u32) -> Option<&TupleValue> {
        self.0
            .iter()
            .find(|tuple| tuple.key == key)
            .map(|tuple| &tuple.value)
    }
}

/// Parsed inbound message. Each field is handled independently.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct InboundMessage {
    pub temperature: Option<i32>,
    pub light_color_scheme: Option<bool>,
    pub degree_celsius: Option<bool>,
}

impl InboundMessage {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Unknown fields are ignored, and a field with a value we can't use is
/// treated as missing. Neither is worth dropping the rest of the message.
impl From<&Dictionary> for InboundMessage {
    fn from(dictionary: &Dictionary) -> Self {
        let mut message = Self::default();
        for Tuple { key, value } in &dictionary.0 {
            let parsed = match *key {
                FIELD_TEMPERATURE => {
                    message.temperature = value.as_int();
                    message.temperature.is_some()
                }
                FIELD_LIGHT_COLOR_SCHEME => {
                    message.light_color_scheme = value.as_flag();
                    message.light_color_scheme.is_some()
                }
                FIELD_DEGREE_CELSIUS => {
                    message.degree_celsius = value.as_flag();
                    message.degree_celsius.is_some()
                }
                _ => {
                    warn!("Ignoring unknown message field {key}: {value:?}");
                    continue;
                }
            };
            if !parsed {
                warn!("Ignoring message field {key} with bad value {value:?}");
            }
        }
        message
    }
}

impl From<InboundMessage> for Dictionary {
    fn from(message: InboundMessage) -> Self {
        let mut dictionary = Self::default();
        if let Some(temperature) = message.temperature {
            dictionary.push(FIELD_TEMPERATURE, TupleValue::Int32(temperature));
        }
        if let Some(light) = message.light_color_scheme {
            dictionary
                .push(FIELD_LIGHT_COLOR_SCHEME, TupleValue::Uint8(light.into()));
        }
        if let Some(celsius) = message.degree_celsius {
            dictionary
                .push(FIELD_DEGREE_CELSIUS, TupleValue::Uint8(celsius.into()));
        }
        dictionary
    }
}

/// Messages the face sends to the phone
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutboundMessage {
    RefreshWeather,
}

impl From<OutboundMessage> for Dictionary {
    fn from(message: OutboundMessage) -> Self {
        let mut dictionary = Self::default();
        match message {
            OutboundMessage::RefreshWeather => dictionary
                .push(FIELD_REQUEST, TupleValue::Uint8(REQUEST_WEATHER)),
        }
        dictionary
    }
}
