//! CLI color helpers.
//!
//! `owo-colors` handles `NO_COLOR`, `FORCE_COLOR` and TTY detection per
//! stream. The `--no-color` flag sets an in-process override on top of that.

use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::{OwoColorize, Stream};
use pulse_core::SessionState;

static NO_COLOR_FLAG: AtomicBool = AtomicBool::new(false);

/// Call once from main.rs when `--no-color` is passed.
pub fn set_no_color() {
    NO_COLOR_FLAG.store(true, Ordering::Relaxed);
}

#[derive(Debug, Clone, Copy)]
struct Rgb {
    r: u8,
    g: u8,
    b: u8,
}

impl Rgb {
    const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

const TIDE: Rgb = Rgb::from_hex(0x6FA8DC); // View names, accents
const MOSS: Rgb = Rgb::from_hex(0x6B8F5E); // Healthy / scheduled
const AMBER: Rgb = Rgb::from_hex(0xC49A5C); // Paused / idle / warnings
const RUST: Rgb = Rgb::from_hex(0xB5574B); // Failures / suspended
const SLATE: Rgb = Rgb::from_hex(0x5C6370); // Secondary info

fn paint(text: &str, stream: Stream, color: Rgb) -> String {
    if NO_COLOR_FLAG.load(Ordering::Relaxed) {
        return text.to_string();
    }
    text.if_supports_color(stream, |t| t.truecolor(color.r, color.g, color.b))
        .to_string()
}

pub fn accent(text: &str) -> String {
    paint(text, Stream::Stdout, TIDE)
}

pub fn success(text: &str) -> String {
    paint(text, Stream::Stdout, MOSS)
}

pub fn failure(text: &str) -> String {
    paint(text, Stream::Stdout, RUST)
}

pub fn muted(text: &str) -> String {
    paint(text, Stream::Stdout, SLATE)
}

/// Color a session state by what it means for the view.
pub fn state(state: SessionState) -> String {
    let text = state.to_string();
    match state {
        SessionState::Scheduled => paint(&text, Stream::Stdout, MOSS),
        SessionState::Refreshing => paint(&text, Stream::Stdout, TIDE),
        SessionState::Idle => paint(&text, Stream::Stdout, AMBER),
        SessionState::Suspended => paint(&text, Stream::Stdout, RUST),
    }
}

/// Error styling for stderr messages.
pub fn error(text: &str) -> String {
    paint(text, Stream::Stderr, RUST)
}

/// Warning styling for stderr messages.
pub fn warning(text: &str) -> String {
    paint(text, Stream::Stderr, AMBER)
}

/// Secondary info on stderr.
pub fn hint(text: &str) -> String {
    paint(text, Stream::Stderr, SLATE)
}
