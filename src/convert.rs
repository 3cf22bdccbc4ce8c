//! Pure conversions from raw readings to display text

use chrono::NaiveDateTime;

/// Shown in place of the temperature until the first reading arrives
pub const TEMPERATURE_PENDING: &str = "...";
/// Battery is drawn as a run of these, one per bar
const BATTERY_GLYPH: char = '|';
/// Most bars we'll ever draw (100% charge)
pub const MAX_BATTERY_BARS: u8 = 6;

/// Convert a Celsius reading into the user's preferred unit. Fahrenheit uses
/// integer math, truncating toward zero, so -1°C is 31°F rather than 30°F.
/// Values too big for an i32 saturate.
pub fn celsius_to_display(celsius: i32, degree_celsius: bool) -> i32 {
    if degree_celsius {
        celsius
    } else {
        let fahrenheit = i64::from(celsius) * 9 / 5 + 32;
        fahrenheit.clamp(i32::MIN.into(), i32::MAX.into()) as i32
    }
}

/// Format a temperature, or the pending placeholder if we don't have one yet
pub fn temperature_text(temperature: Option<i32>) -> String {
    match temperature {
        Some(temperature) => format!("{temperature}°"),
        None => TEMPERATURE_PENDING.to_owned(),
    }
}

/// Number of battery bars for a charge percentage. There's always at least
/// one bar, plus one for every full 20%. Anything over 100 counts as 100.
pub fn battery_bars(percent: u8) -> u8 {
    1 + percent.min(100) / 20
}

/// Draw a bar count as text. The string grows to fit, so a full battery
/// shows all six bars.
pub fn battery_text(bars: u8) -> String {
    (0..bars.min(MAX_BATTERY_BARS)).map(|_| BATTERY_GLYPH).collect()
}

/// Format the clock. Hours are space-padded, not zero-padded.
/// https://docs.rs/chrono/latest/chrono/format/strftime/index.html
pub fn time_text(time: &NaiveDateTime, clock_24h: bool) -> String {
    let format = if clock_24h { "%k:%M" } else { "%l:%M" };
    time.format(format).to_string()
}

/// Abbreviated weekday and day of month, e.g. "Fri  3"
pub fn date_text(time: &NaiveDateTime) -> String {
    time.format("%a %e").to_string()
}
