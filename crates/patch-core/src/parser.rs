//! Module command parser: box text → module command.
//!
//! Built on `winnow` 0.7. Two stages:
//!
//! - [`recognize`] is the acceptance gate. It finds the first command token
//!   anywhere in the typed text (`~`, `sin`, `sq`, `square`, `)))`, `out`,
//!   `freq <decimal>`, or a bare `[+-]<digits>.<digits>` decimal).
//! - [`classify`] maps an accepted token to a [`ModuleCommand`]. Tokens that
//!   are not a known keyword or a bare decimal fall through to a
//!   `parseFloat`-style conversion, which yields `NaN` for non-numeric text.

use crate::command::EngineCommand;
use crate::id::BoxId;
use winnow::ascii::{digit0, digit1, space1};
use winnow::combinator::{alt, opt};
use winnow::prelude::*;
use winnow::token::one_of;

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Square,
}

impl Waveform {
    /// Name understood by the signal engine.
    pub fn as_str(&self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
        }
    }
}

/// A classified module command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModuleCommand {
    Osc(Waveform),
    /// Output sink.
    Out,
    /// Fixed-frequency source. May be `NaN` when reached via the fallback.
    Freq(f64),
}

impl ModuleCommand {
    /// The engine command that installs this module on box `id`.
    pub fn to_engine(&self, id: BoxId) -> EngineCommand {
        match *self {
            ModuleCommand::Osc(wave) => EngineCommand::add_osc(id, wave),
            ModuleCommand::Out => EngineCommand::add_out(id),
            ModuleCommand::Freq(freq) => EngineCommand::add_freq(id, freq),
        }
    }
}

// ─── Gate ────────────────────────────────────────────────────────────────

/// Find the first command token in `text`.
///
/// Leading/trailing whitespace is ignored. At each position the longest
/// keyword wins (`square` over `sq`). Returns `None` while the text holds no
/// complete token, e.g. `si` or `440` (a decimal needs its fractional part).
pub fn recognize(text: &str) -> Option<&str> {
    let text = text.trim();
    text.char_indices().find_map(|(i, _)| {
        let mut rest = &text[i..];
        parse_token.parse_next(&mut rest).ok()
    })
}

fn parse_token<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    alt((
        "square",
        "sq",
        "sin",
        "~",
        ")))",
        "out",
        parse_freq_token,
        parse_decimal,
    ))
    .parse_next(input)
}

fn parse_freq_token<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    ("freq", space1, parse_decimal).take().parse_next(input)
}

/// A sign directly before the digits belongs to the decimal.
fn parse_decimal<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (opt(one_of(['+', '-'])), digit1, '.', digit1)
        .take()
        .parse_next(input)
}

// ─── Classification ──────────────────────────────────────────────────────

/// Map an accepted token to its module command.
pub fn classify(token: &str) -> ModuleCommand {
    match token {
        "~" | "sin" => ModuleCommand::Osc(Waveform::Sine),
        "sq" | "square" => ModuleCommand::Osc(Waveform::Square),
        ")))" | "out" => ModuleCommand::Out,
        t if parse_decimal.parse(t).is_ok() => {
            ModuleCommand::Freq(t.parse().unwrap_or(f64::NAN))
        }
        other => ModuleCommand::Freq(parse_float(other)),
    }
}

/// JavaScript `parseFloat` semantics: the longest numeric prefix after
/// leading whitespace, or `NaN` when there is none.
pub fn parse_float(text: &str) -> f64 {
    let mut rest = text.trim_start();
    if let Some(value) = parse_infinity(rest) {
        return value;
    }
    match parse_numeric_prefix.parse_next(&mut rest) {
        Ok(prefix) => prefix.parse().unwrap_or(f64::NAN),
        Err(_) => f64::NAN,
    }
}

fn parse_infinity(text: &str) -> Option<f64> {
    let (sign, body) = match text.as_bytes().first() {
        Some(b'-') => (-1.0, &text[1..]),
        Some(b'+') => (1.0, &text[1..]),
        _ => (1.0, text),
    };
    body.starts_with("Infinity").then_some(sign * f64::INFINITY)
}

fn parse_numeric_prefix<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (
        opt(one_of(['+', '-'])),
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt(parse_exponent),
    )
        .take()
        .parse_next(input)
}

fn parse_exponent<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    (one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)
        .take()
        .parse_next(input)
}
