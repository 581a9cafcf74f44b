//! Pin specification types.
//!
//! A pin entry in the `[GPIO]` section maps a sysfs pin number to a
//! `direction,value` pair:
//!
//! ```ini
//! [GPIO]
//! 17=out,0
//! 27=in,0
//! ```

use std::fmt;
use std::str::FromStr;

/// Pin direction as reported by the sysfs `direction` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Digital input. The value file is never written.
    In,
    /// Digital output.
    Out,
}

impl Direction {
    /// The string written to / read from the `direction` file.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            other => Err(format!("direction must be 'in' or 'out', got '{other}'")),
        }
    }
}

/// Desired state of one configured pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinSpec {
    /// Sysfs pin number (written to the export file).
    pub pin: u32,
    /// Desired direction.
    pub direction: Direction,
    /// Desired value. Only applied when `direction` is `Out`.
    pub value: String,
}

impl PinSpec {
    /// Parse a `[GPIO]` entry.
    ///
    /// `key` is the pin number, `raw` the `direction,value` pair. Whitespace
    /// around either part is trimmed.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason if the pin number is not an unsigned
    /// integer, the pair does not have exactly two parts, the direction is
    /// unknown, or an output pin has an empty value.
    pub fn parse(key: &str, raw: &str) -> Result<Self, String> {
        let pin: u32 = key
            .trim()
            .parse()
            .map_err(|_| format!("pin must be an unsigned integer, got '{key}'"))?;

        let mut parts = raw.split(',');
        let (Some(direction), Some(value), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!("expected 'direction,value', got '{raw}'"));
        };

        let direction: Direction = direction.trim().parse()?;
        let value = value.trim().to_string();

        if direction == Direction::Out && value.is_empty() {
            return Err("output pin requires a value".to_string());
        }

        Ok(Self {
            pin,
            direction,
            value,
        })
    }

    /// True if the value file is part of this pin's desired state.
    pub fn drives_value(&self) -> bool {
        self.direction == Direction::Out
    }
}
