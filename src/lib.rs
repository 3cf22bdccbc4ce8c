//! Logic for a clock face that shows the time, date, phone link, battery and
//! outside temperature. Platform notifications come in as [Event]s, the
//! [Reconciler] folds them into a [DisplayState], and user settings plus the
//! last temperature are kept in [Settings] across restarts.

pub mod companion;
pub mod config;
pub mod console;
pub mod convert;
pub mod display;
pub mod error;
pub mod host;
pub mod message;
pub mod outbox;
pub mod reconciler;
pub mod settings;

pub use crate::{
    display::DisplayState,
    error::Error,
    reconciler::{Event, Platform, Reconciler},
    settings::Settings,
};
