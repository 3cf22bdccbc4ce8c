//! The reconciler turns platform events into display updates. Each event
//! source is independent: a tick never looks at the battery, a message never
//! looks at the link. All of them funnel through [Reconciler::handle], one
//! event at a time.

use crate::{
    convert,
    display::{ColorScheme, Connectivity, DisplayState},
    error::Error,
    message::InboundMessage,
    outbox::{self, Outbox},
    settings::{Settings, Storage},
};
use chrono::{NaiveDateTime, Timelike};
use log::{debug, error, info, trace};

/// Minutes between weather refresh requests
const REFRESH_INTERVAL_MINUTES: u32 = 10;

/// Everything the host platform provides besides events
pub trait Platform {
    /// Current local time
    fn now(&self) -> NaiveDateTime;

    /// User's 12/24-hour clock preference
    fn clock_is_24h(&self) -> bool;

    /// Whether the phone is connected right now
    fn is_connected(&self) -> bool;

    /// Current charge, 0-100
    fn battery_percent(&self) -> u8;

    /// Long haptic pulse
    fn vibrate(&mut self);
}

/// A single notification from the host
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Once a minute, with the local time of the tick
    Tick(NaiveDateTime),
    /// The phone link changed. Only sent on transitions.
    Connectivity { connected: bool },
    /// Charge percentage changed
    Battery { percent: u8 },
    /// A message arrived from the phone
    Message(InboundMessage),
    /// A message from the phone was lost before we got it
    MessageDropped { reason: String },
    /// An outbound message made it to the phone
    OutboxSent,
    /// An outbound message did not make it to the phone
    OutboxFailed { reason: String },
}

/// Owner of the display state. Reads and writes settings, calls converters,
/// and decides when to ask the phone for fresh weather.
#[derive(Debug)]
pub struct Reconciler<S, P, O> {
    settings: Settings<S>,
    platform: P,
    outbox: O,
    display: DisplayState,
}

impl<S: Storage, P: Platform, O: Outbox> Reconciler<S, P, O> {
    /// Build the initial display from the platform snapshot and whatever
    /// settings survived the last run. Nothing waits for a first event.
    pub fn new(settings: Settings<S>, platform: P, outbox: O) -> Self {
        let mut reconciler = Self {
            settings,
            platform,
            outbox,
            display: DisplayState::default(),
        };

        reconciler.update_clock(reconciler.platform.now());
        reconciler.display.set_connectivity(Connectivity::from_connected(
            reconciler.platform.is_connected(),
        ));
        reconciler.update_battery(reconciler.platform.battery_percent());
        reconciler.update_temperature();

        // Light is what we start with, so only dark needs applying
        if !reconciler.settings.light_color_scheme() {
            debug!("Applying saved dark color scheme");
            reconciler.display.set_color_scheme(ColorScheme::Dark);
        }

        info!("Face initialized: {:?}", reconciler.display);
        reconciler
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn outbox(&self) -> &O {
        &self.outbox
    }

    /// Dispatch a single event. Runs to completion; failures are logged and
    /// never stop the face.
    pub fn handle(&mut self, event: Event) {
        trace!("Handling event {event:?}");
        match event {
            Event::Tick(time) => self.on_tick(time),
            Event::Connectivity { connected } => self.on_connectivity(connected),
            Event::Battery { percent } => self.update_battery(percent),
            Event::Message(message) => self.on_message(message),
            Event::MessageDropped { reason } => {
                report(Error::Delivery { reason })
            }
            Event::OutboxSent => info!("Outbox send success"),
            Event::OutboxFailed { reason } => report(Error::Send { reason }),
        }
    }

    fn on_tick(&mut self, time: NaiveDateTime) {
        self.update_clock(time);

        // This is the only retry we have. If a request or its reply gets
        // lost, the next boundary picks it up.
        if time.minute() % REFRESH_INTERVAL_MINUTES == 0 {
            if let Err(err) = outbox::request_refresh(&mut self.outbox) {
                report(err);
            }
        }
    }

    fn on_connectivity(&mut self, connected: bool) {
        let connectivity = Connectivity::from_connected(connected);
        let was_connected =
            self.display.connectivity() == Connectivity::Connected;
        self.display.set_connectivity(connectivity);
        if was_connected && connectivity == Connectivity::Disconnected {
            info!("Phone disconnected");
            self.platform.vibrate();
        }
    }

    /// Apply each field that's present, in field order. Every field does its
    /// own write, and a failed write still updates the display.
    fn on_message(&mut self, message: InboundMessage) {
        debug!("Received message {message:?}");

        if let Some(celsius) = message.temperature {
            if let Err(err) = self.settings.set_last_temperature(celsius) {
                report(err);
            }
            self.update_temperature();
        }

        if let Some(light) = message.light_color_scheme {
            if let Err(err) = self.settings.set_light_color_scheme(light) {
                report(err);
            }
            self.display.set_color_scheme(ColorScheme::from_light(light));
        }

        if let Some(celsius) = message.degree_celsius {
            if let Err(err) = self.settings.set_degree_celsius(celsius) {
                report(err);
            }
            self.update_temperature();
        }
    }

    fn update_clock(&mut self, time: NaiveDateTime) {
        let clock_24h = self.platform.clock_is_24h();
        self.display.set_clock(
            convert::time_text(&time, clock_24h),
            convert::date_text(&time),
        );
    }

    fn update_battery(&mut self, percent: u8) {
        self.display.set_battery_bars(convert::battery_bars(percent));
    }

    /// Redraw the temperature from the saved reading, in the current unit
    fn update_temperature(&mut self) {
        let degree_celsius = self.settings.degree_celsius();
        let temperature = self
            .settings
            .last_temperature()
            .map(|celsius| convert::celsius_to_display(celsius, degree_celsius));
        self.display
            .set_temperature_text(convert::temperature_text(temperature));
    }
}

/// Log a non-fatal error, including its cause
fn report(err: Error) {
    error!("{:#}", anyhow::Error::from(err));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        message::Dictionary,
        settings::{MemoryStore, SettingKey, StoredValue},
    };

    #[derive(Debug)]
    struct FakePlatform {
        now: NaiveDateTime,
        clock_24h: bool,
        connected: bool,
        battery: u8,
        vibrations: usize,
    }

    impl Default for FakePlatform {
        fn default() -> Self {
            Self {
                now: time("2024-05-24 17:03"),
                clock_24h: true,
                connected: true,
                battery: 50,
                vibrations: 0,
            }
        }
    }

    impl Platform for FakePlatform {
        fn now(&self) -> NaiveDateTime {
            self.now
        }

        fn clock_is_24h(&self) -> bool {
            self.clock_24h
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        fn battery_percent(&self) -> u8 {
            self.battery
        }

        fn vibrate(&mut self) {
            self.vibrations += 1;
        }
    }

    #[derive(Debug, Default)]
    struct FakeOutbox {
        sent: Vec<Dictionary>,
        broken: bool,
    }

    impl Outbox for FakeOutbox {
        fn send(&mut self, message: Dictionary) -> Result<(), Error> {
            if self.broken {
                return Err(Error::Send {
                    reason: "phone unreachable".into(),
                });
            }
            self.sent.push(message);
            Ok(())
        }
    }

    type TestReconciler = Reconciler<MemoryStore, FakePlatform, FakeOutbox>;

    fn time(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn reconciler(store: MemoryStore) -> TestReconciler {
        Reconciler::new(
            Settings::new(store),
            FakePlatform::default(),
            FakeOutbox::default(),
        )
    }

    fn message(
        temperature: Option<i32>,
        light_color_scheme: Option<bool>,
        degree_celsius: Option<bool>,
    ) -> Event {
        Event::Message(InboundMessage {
            temperature,
            light_color_scheme,
            degree_celsius,
        })
    }

    #[test]
    fn test_initial_state() {
        let reconciler = reconciler(MemoryStore::default());
        let display = reconciler.display();
        assert_eq!(display.time_text(), "17:03");
        assert_eq!(display.date_text(), "Fri 24");
        assert_eq!(display.connectivity_text(), "bt");
        assert_eq!(display.battery_bars(), 3);
        assert_eq!(display.temperature_text(), "...");
        assert_eq!(display.color_scheme(), ColorScheme::Light);
        assert!(reconciler.outbox().sent.is_empty());
    }

    #[test]
    fn test_initial_state_from_settings() {
        let store = MemoryStore::default()
            .with(SettingKey::LastTemperature, StoredValue::Int(21))
            .with(SettingKey::DegreeCelsius, StoredValue::Bool(false))
            .with(SettingKey::LightColorScheme, StoredValue::Bool(false));
        let reconciler = reconciler(store);
        assert_eq!(reconciler.display().temperature_text(), "69°");
        assert_eq!(reconciler.display().color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn test_initial_state_disconnected() {
        let platform = FakePlatform {
            connected: false,
            clock_24h: false,
            battery: 100,
            ..Default::default()
        };
        let reconciler = Reconciler::new(
            Settings::new(MemoryStore::default()),
            platform,
            FakeOutbox::default(),
        );
        assert_eq!(reconciler.display().connectivity_text(), "!bt");
        assert_eq!(reconciler.display().time_text(), " 5:03");
        assert_eq!(reconciler.display().battery_text(), "||||||");
        // No transition happened, so no buzz
        assert_eq!(reconciler.platform().vibrations, 0);
    }

    #[test]
    fn test_tick_refresh_interval() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(Event::Tick(time("2024-05-24 17:20")));
        assert_eq!(reconciler.display().time_text(), "17:20");
        assert_eq!(reconciler.outbox().sent.len(), 1);

        reconciler.handle(Event::Tick(time("2024-05-24 17:21")));
        assert_eq!(reconciler.display().time_text(), "17:21");
        assert_eq!(reconciler.outbox().sent.len(), 1);

        reconciler.handle(Event::Tick(time("2024-05-24 18:00")));
        assert_eq!(reconciler.outbox().sent.len(), 2);
    }

    #[test]
    fn test_tick_send_failure_is_not_fatal() {
        let mut reconciler = Reconciler::new(
            Settings::new(MemoryStore::default()),
            FakePlatform::default(),
            FakeOutbox {
                broken: true,
                ..Default::default()
            },
        );
        reconciler.handle(Event::Tick(time("2024-05-24 17:30")));
        assert_eq!(reconciler.display().time_text(), "17:30");
        assert!(reconciler.outbox().sent.is_empty());
    }

    #[test]
    fn test_disconnect_vibrates_once() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(Event::Connectivity { connected: false });
        assert_eq!(reconciler.display().connectivity_text(), "!bt");
        assert_eq!(reconciler.platform().vibrations, 1);

        reconciler.handle(Event::Connectivity { connected: true });
        assert_eq!(reconciler.display().connectivity_text(), "bt");
        assert_eq!(reconciler.platform().vibrations, 1);
    }

    #[test]
    fn test_battery() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(Event::Battery { percent: 100 });
        assert_eq!(reconciler.display().battery_bars(), 6);
        reconciler.handle(Event::Battery { percent: 7 });
        assert_eq!(reconciler.display().battery_bars(), 1);
    }

    #[test]
    fn test_temperature_then_unit() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(message(Some(21), None, None));
        assert_eq!(reconciler.display().temperature_text(), "21°");
        assert_eq!(reconciler.settings().last_temperature(), Some(21));

        reconciler.handle(message(None, None, Some(false)));
        assert_eq!(reconciler.display().temperature_text(), "69°");
        assert_eq!(reconciler.settings().last_temperature(), Some(21));

        reconciler.handle(message(None, None, Some(true)));
        assert_eq!(reconciler.display().temperature_text(), "21°");
    }

    #[test]
    fn test_unit_without_temperature() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(message(None, None, Some(false)));
        assert_eq!(reconciler.display().temperature_text(), "...");
        assert!(!reconciler.settings().degree_celsius());
    }

    #[test]
    fn test_all_fields_in_one_message() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(message(Some(-1), Some(false), Some(false)));
        assert_eq!(reconciler.display().temperature_text(), "31°");
        assert_eq!(reconciler.display().color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn test_color_scheme_idempotent() {
        let mut reconciler = reconciler(MemoryStore::default());
        reconciler.handle(message(None, Some(false), None));
        let once = reconciler.display().clone();
        reconciler.handle(message(None, Some(false), None));
        assert_eq!(reconciler.display(), &once);
        assert!(!reconciler.settings().light_color_scheme());
    }

    #[test]
    fn test_storage_failure_keeps_display() {
        let mut reconciler = reconciler(MemoryStore::failing());
        reconciler.handle(message(Some(30), Some(false), Some(false)));
        assert_eq!(reconciler.display().temperature_text(), "86°");
        assert_eq!(reconciler.display().color_scheme(), ColorScheme::Dark);
    }

    #[test]
    fn test_failures_change_nothing() {
        let mut reconciler = reconciler(MemoryStore::default());
        let before = reconciler.display().clone();
        reconciler.handle(Event::MessageDropped {
            reason: "inbox full".into(),
        });
        reconciler.handle(Event::OutboxFailed {
            reason: "timeout".into(),
        });
        reconciler.handle(Event::OutboxSent);
        assert_eq!(reconciler.display(), &before);
        assert!(reconciler.outbox().sent.is_empty());
    }
}
