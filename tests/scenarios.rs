//! End-to-end behavior of the face, driven through the public API the same
//! way a host would: wire dictionaries in, display state and outbound
//! dictionaries out.

use chrono::NaiveDateTime;
use weatherface::{
    message::{Dictionary, InboundMessage, TupleValue},
    outbox::Outbox,
    settings::{MemoryStore, Storage},
    Error, Event, Platform, Reconciler, Settings,
};

#[derive(Default)]
struct Watch {
    connected: bool,
    vibrations: usize,
}

impl Platform for Watch {
    fn now(&self) -> NaiveDateTime {
        time("2024-05-24 09:15")
    }

    fn clock_is_24h(&self) -> bool {
        true
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    fn battery_percent(&self) -> u8 {
        80
    }

    fn vibrate(&mut self) {
        self.vibrations += 1;
    }
}

#[derive(Default)]
struct Phone {
    received: Vec<Dictionary>,
}

impl Outbox for Phone {
    fn send(&mut self, message: Dictionary) -> Result<(), Error> {
        self.received.push(message);
        Ok(())
    }
}

fn time(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
}

fn new_face(store: MemoryStore) -> Reconciler<MemoryStore, Watch, Phone> {
    let watch = Watch {
        connected: true,
        ..Default::default()
    };
    Reconciler::new(Settings::new(store), watch, Phone::default())
}

fn inbound(fields: &[(u32, TupleValue)]) -> Event {
    let mut dictionary = Dictionary::default();
    for (key, value) in fields {
        dictionary.push(*key, value.clone());
    }
    Event::Message(InboundMessage::from(&dictionary))
}

#[test]
fn temperature_then_unit_change() {
    let mut face = new_face(MemoryStore::default());
    assert_eq!(face.display().temperature_text(), "...");

    face.handle(inbound(&[(0, TupleValue::Int32(21))]));
    assert_eq!(face.display().temperature_text(), "21°");
    assert_eq!(face.settings().last_temperature(), Some(21));

    face.handle(inbound(&[(2, TupleValue::Uint8(0))]));
    assert_eq!(face.display().temperature_text(), "69°");
}

#[test]
fn unit_change_before_any_temperature() {
    let mut face = new_face(MemoryStore::default());
    face.handle(inbound(&[(2, TupleValue::Uint8(0))]));
    assert_eq!(face.display().temperature_text(), "...");
}

#[test]
fn refresh_every_ten_minutes() {
    let mut face = new_face(MemoryStore::default());
    face.handle(Event::Tick(time("2024-05-24 09:20")));
    assert_eq!(face.outbox().received.len(), 1);
    assert_eq!(
        face.outbox().received[0].find(0),
        Some(&TupleValue::Uint8(0))
    );

    face.handle(Event::Tick(time("2024-05-24 09:21")));
    assert_eq!(face.outbox().received.len(), 1);
}

#[test]
fn disconnect_buzzes_once() {
    let mut face = new_face(MemoryStore::default());
    face.handle(Event::Connectivity { connected: false });
    assert_eq!(face.display().connectivity_text(), "!bt");
    assert_eq!(face.platform().vibrations, 1);
}

#[test]
fn settings_survive_restart() {
    let mut face = new_face(MemoryStore::default());
    face.handle(inbound(&[
        (0, TupleValue::Int32(-7)),
        (1, TupleValue::Uint8(0)),
        (2, TupleValue::Uint8(0)),
    ]));
    let store = face.settings().storage().clone();
    assert!(store.read(3).is_some());
    assert!(store.read(0).is_none());

    let restarted = new_face(store);
    let display = restarted.display();
    // -63/5 truncates toward zero, so this is 20 rather than 19
    assert_eq!(display.temperature_text(), "20°");
    assert_eq!(
        display.color_scheme(),
        weatherface::display::ColorScheme::Dark
    );
    assert_eq!(display.battery_bars(), 5);
    assert_eq!(display.time_text(), " 9:15");
}
