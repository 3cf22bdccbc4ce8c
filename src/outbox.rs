use crate::{
    error::Error,
    message::{Dictionary, OutboundMessage},
};
use log::debug;

/// Outgoing half of the phone channel. A send either goes out or fails;
/// nothing is queued.
pub trait Outbox {
    fn send(&mut self, message: Dictionary) -> Result<(), Error>;
}

/// Ask the phone for fresh weather. Sends exactly one message per call.
pub fn request_refresh(outbox: &mut impl Outbox) -> Result<(), Error> {
    debug!("Requesting weather refresh");
    outbox.send(OutboundMessage::RefreshWeather.into())
}
