//! Text command protocol.
//!
//! One datagram carries one line of the form `verb SP argument`. Two verbs are
//! understood:
//!
//! - `speed <int>`: drive the motor, sign selects direction.
//! - `timeout <int>`: set the grace window (ms) used by later `speed` commands.
//!
//! Argument parsing is deliberately as permissive as C's `atoi`: leading
//! whitespace, an optional sign and the leading run of digits are taken, and
//! anything that does not start with a number reads as `0`. A present but
//! garbled argument is therefore a valid command with value `0`.
//!
//! Replies are single lines echoing the applied value, e.g. `"speed 150\n"`.

use core::fmt::{self, Write};

/// Capacity of an encoded confirmation line.
pub const REPLY_CAPACITY: usize = 24;

/// Command verbs understood on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Speed,
    Timeout,
}

/// A parsed network command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Drive at the given signed speed (clamped by the controller).
    Speed(i32),
    /// Replace the configured timeout window (ms). A negative window is kept
    /// as given: speed commands under it expire immediately.
    Timeout(i32),
}

/// Reasons a datagram did not produce a command. None of these are reported
/// back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError<'a> {
    Empty,
    MissingArgument(Verb),
    UnknownVerb(&'a [u8]),
}

impl fmt::Display for ParseError<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ParseError::Empty => f.write_str("empty command"),
            ParseError::MissingArgument(Verb::Speed) => f.write_str("argument <speed> missing"),
            ParseError::MissingArgument(Verb::Timeout) => f.write_str("argument <ms> missing"),
            ParseError::UnknownVerb(verb) => match core::str::from_utf8(verb) {
                Ok(text) => write!(f, "command '{}' is unknown", text),
                Err(_) => write!(f, "command of {} non-text bytes is unknown", verb.len()),
            },
        }
    }
}

/// Value echoed back to the last sender after a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Speed(i32),
    Timeout(i32),
}

impl Confirmation {
    /// Encode as the wire reply line.
    pub fn encode(&self) -> heapless::String<REPLY_CAPACITY> {
        let mut line = heapless::String::new();
        // longest line is "timeout -2147483648\n", well inside the capacity
        let _ = write!(line, "{}\n", self);
        line
    }
}

impl fmt::Display for Confirmation {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Confirmation::Speed(value) => write!(f, "speed {}", value),
            Confirmation::Timeout(value) => write!(f, "timeout {}", value),
        }
    }
}

/// Parse one datagram payload into a [`Command`].
///
/// The payload is split on ASCII whitespace; the first token is the verb and
/// the second its argument. Further tokens are ignored.
pub fn parse(payload: &[u8]) -> Result<Command, ParseError<'_>> {
    let mut tokens = payload
        .split(|b| b.is_ascii_whitespace() || *b == 0)
        .filter(|token| !token.is_empty());

    let verb = match tokens.next() {
        Some(b"speed") => Verb::Speed,
        Some(b"timeout") => Verb::Timeout,
        Some(other) => return Err(ParseError::UnknownVerb(other)),
        None => return Err(ParseError::Empty),
    };

    let argument = tokens.next().ok_or(ParseError::MissingArgument(verb))?;
    let value = parse_int(argument);

    Ok(match verb {
        Verb::Speed => Command::Speed(value),
        Verb::Timeout => Command::Timeout(value),
    })
}

/// Leading-integer parse in the manner of `atoi`, saturating at the `i32`
/// bounds instead of overflowing.
pub fn parse_int(text: &[u8]) -> i32 {
    let mut bytes = text.iter().copied().skip_while(u8::is_ascii_whitespace).peekable();

    let negative = match bytes.peek() {
        Some(b'-') => {
            bytes.next();
            true
        }
        Some(b'+') => {
            bytes.next();
            false
        }
        _ => false,
    };

    let mut magnitude: i64 = 0;
    for digit in bytes.take_while(u8::is_ascii_digit) {
        magnitude = (magnitude * 10 + i64::from(digit - b'0')).min(i64::from(u32::MAX));
    }

    let value = if negative { -magnitude } else { magnitude };
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}
