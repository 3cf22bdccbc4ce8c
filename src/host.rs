//! Platform bindings for running the face on a regular computer. Platform
//! notifications are turned into [Event]s on helper threads and sent to the
//! single dispatch loop.

use crate::{
    companion::ConfigData,
    config::Config,
    message::{Dictionary, InboundMessage},
    reconciler::{Event, Platform},
};
use anyhow::Context;
use chrono::{Local, NaiveDateTime, Timelike};
use log::{debug, info, warn};
use std::{
    fs,
    io::{self, BufRead},
    path::{Path, PathBuf},
    sync::mpsc::Sender,
    thread,
    time::Duration,
};

/// Charge to report when there's no battery to read
const DEFAULT_BATTERY_PERCENT: u8 = 100;

#[derive(Clone, Debug)]
pub struct HostPlatform {
    clock_24h: bool,
    battery_path: Option<PathBuf>,
}

impl HostPlatform {
    pub fn new(config: &Config) -> Self {
        Self {
            clock_24h: config.clock_24h,
            battery_path: config.battery_path.clone(),
        }
    }
}

impl Platform for HostPlatform {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    fn clock_is_24h(&self) -> bool {
        self.clock_24h
    }

    /// There's no phone link to lose here
    fn is_connected(&self) -> bool {
        true
    }

    fn battery_percent(&self) -> u8 {
        let Some(path) = &self.battery_path else {
            return DEFAULT_BATTERY_PERCENT;
        };
        match read_battery(path) {
            Ok(percent) => percent,
            Err(err) => {
                warn!("{err:#}");
                DEFAULT_BATTERY_PERCENT
            }
        }
    }

    fn vibrate(&mut self) {
        info!("Bzzzzt");
        // Terminal bell is the closest thing we have
        print!("\x07");
    }
}

fn read_battery(path: &Path) -> anyhow::Result<u8> {
    let contents = fs::read_to_string(path).with_context(|| {
        format!("Error reading battery level from {}", path.display())
    })?;
    let percent: u8 = contents.trim().parse().with_context(|| {
        format!("Invalid battery level {:?}", contents.trim())
    })?;
    Ok(percent.min(100))
}

/// Spawn a thread that sends a tick at the top of every minute, and a battery
/// event whenever the charge changes. Stops once the receiver is gone.
pub fn spawn_ticker(platform: HostPlatform, events: Sender<Event>) {
    thread::spawn(move || {
        let mut battery = platform.battery_percent();
        loop {
            let now = platform.now();
            let wait = 60 - u64::from(now.second());
            thread::sleep(Duration::from_secs(wait));

            if events.send(Event::Tick(platform.now())).is_err() {
                break;
            }

            let percent = platform.battery_percent();
            if percent != battery {
                battery = percent;
                if events.send(Event::Battery { percent }).is_err() {
                    break;
                }
            }
        }
        debug!("Ticker stopped");
    });
}

/// Spawn a thread that reads settings page responses from stdin, one JSON
/// object per line. Lines that don't parse are reported as dropped messages.
pub fn spawn_config_reader(events: Sender<Event>) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let event = match line {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => parse_config_line(&line),
                Err(err) => Event::MessageDropped {
                    reason: format!("Error reading stdin: {err}"),
                },
            };
            if events.send(event).is_err() {
                break;
            }
        }
        debug!("Config reader stopped");
    });
}

fn parse_config_line(line: &str) -> Event {
    match serde_json::from_str::<ConfigData>(line) {
        Ok(data) => {
            info!("Configuration page returned: {data:?}");
            Event::Message(InboundMessage::from(&Dictionary::from(data)))
        }
        Err(err) => Event::MessageDropped {
            reason: format!("Invalid configuration {line:?}: {err}"),
        },
    }
}
