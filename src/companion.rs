//! The phone side of the channel. It answers refresh requests by fetching
//! current weather, and forwards the settings page's choices to the face.

use crate::{
    config::WeatherConfig,
    error::Error,
    message::{Dictionary, InboundMessage, TupleValue, FIELD_TEMPERATURE},
    outbox::Outbox,
    reconciler::Event,
};
use anyhow::Context;
use log::{error, info};
use serde::Deserialize;
use std::{sync::mpsc::Sender, thread};

/// Gotta know weather or not it's gonna rain
#[derive(Debug)]
pub struct Companion {
    weather: Option<WeatherConfig>,
    events: Sender<Event>,
}

impl Companion {
    const API_HOST: &'static str = "https://api.openweathermap.org";

    pub fn new(weather: Option<WeatherConfig>, events: Sender<Event>) -> Self {
        Self { weather, events }
    }

    /// Spawn a thread to fetch current weather. The reading shows up later as
    /// an [Event::Message]; a failed fetch is only logged, and the next
    /// refresh request tries again.
    pub fn fetch_weather(&self) -> Result<(), Error> {
        let Some(config) = self.weather.clone() else {
            return Err(Error::Send {
                reason: "weather is not configured".into(),
            });
        };
        let events = self.events.clone();

        thread::spawn(move || {
            let result = fetch_temperature(&config).and_then(|celsius| {
                info!("Sending temperature {celsius}°C to face");
                let mut dictionary = Dictionary::default();
                dictionary.push(FIELD_TEMPERATURE, TupleValue::Int32(celsius));
                events
                    .send(Event::Message(InboundMessage::from(&dictionary)))
                    .context("Face is gone")
            });

            if let Err(err) = result {
                error!("Error fetching weather: {err:?}")
            }
        });
        Ok(())
    }
}

/// Any message from the face means "get me the weather"
impl Outbox for Companion {
    fn send(&mut self, _: Dictionary) -> Result<(), Error> {
        self.fetch_weather()?;
        self.events.send(Event::OutboxSent).map_err(|err| Error::Send {
            reason: err.to_string(),
        })
    }
}

fn fetch_temperature(config: &WeatherConfig) -> anyhow::Result<i32> {
    info!("Fetching current weather");
    let url = format!("{}/data/2.5/weather", Companion::API_HOST);
    let response = ureq::get(&url)
        .query("lat", &config.latitude.to_string())
        .query("lon", &config.longitude.to_string())
        .query("appid", &config.api_key)
        .call()
        .with_context(|| format!("Error fetching weather from {url}"))?;
    let weather: CurrentWeather = response
        .into_json()
        .context("Error parsing weather as JSON")?;
    info!("Temperature returned [K]: {}", weather.main.temp);
    Ok(kelvin_to_celsius(weather.main.temp))
}

/// https://openweathermap.org/current#fields_json
#[derive(Debug, Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    /// Kelvin, unless the request asks for other units
    temp: f64,
}

/// Round to the nearest degree, with halves going up (toward positive
/// infinity) rather than away from zero
pub fn kelvin_to_celsius(kelvin: f64) -> i32 {
    (kelvin - 273.15 + 0.5).floor() as i32
}

/// What the settings page sends back when it closes
#[derive(Copy, Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConfigData {
    #[serde(default)]
    pub light_color_scheme: Option<bool>,
    #[serde(default)]
    pub degree_celsius: Option<bool>,
}

impl From<ConfigData> for Dictionary {
    fn from(data: ConfigData) -> Self {
        InboundMessage {
            light_color_scheme: data.light_color_scheme,
            degree_celsius: data.degree_celsius,
            ..Default::default()
        }
        .into()
    }
}
