//! Bar margins
//!
//! Accepted forms, first match wins:
//! - any of `margin-top`/`margin-right`/`margin-bottom`/`margin-left` as integers
//! - `margin` as a CSS-like shorthand string of 1 to 4 numbers, where each
//!   token only needs to start with an integer (`"10px 5"`)
//! - `margin` as a single integer

use serde_json::Value;
use std::num::ParseIntError;
use tracing::warn;

use crate::json::FromJson;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarMargins {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

const SIDE_KEYS: [&str; 4] = ["margin-top", "margin-right", "margin-bottom", "margin-left"];

impl BarMargins {
    pub fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self { top, right, bottom, left }
    }

    /// Same gap on every side
    pub fn full(gap: i32) -> Self {
        Self::new(gap, gap, gap, gap)
    }

    /// Parse a shorthand string with CSS expansion rules.
    ///
    /// Returns `Ok(None)` for token counts outside 1..=4. A token that does
    /// not start with an integer fails the whole parse.
    pub fn parse_shorthand(s: &str) -> Result<Option<Self>, ParseIntError> {
        let values = s
            .split_whitespace()
            .map(leading_int)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(match values[..] {
            [all] => Some(Self::full(all)),
            [vertical, horizontal] => Some(Self::new(vertical, horizontal, vertical, horizontal)),
            [top, horizontal, bottom] => Some(Self::new(top, horizontal, bottom, horizontal)),
            [top, right, bottom, left] => Some(Self::new(top, right, bottom, left)),
            _ => None,
        })
    }
}

/// Integer at the start of `token`, ignoring any unit suffix
fn leading_int(token: &str) -> Result<i32, ParseIntError> {
    let sign = usize::from(token.starts_with(['+', '-']));
    let digits = token[sign..].bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        // Let the parser produce the error
        return token.parse();
    }
    token[..sign + digits].parse()
}

fn int_key(j: &Value, key: &str) -> Option<i32> {
    j[key].as_i64().and_then(|v| i32::try_from(v).ok())
}

/// Reads from the bar document root
impl FromJson for BarMargins {
    fn from_json(&mut self, j: &Value) {
        if SIDE_KEYS.iter().any(|key| int_key(j, key).is_some()) {
            let [top, right, bottom, left] = SIDE_KEYS.map(|key| int_key(j, key).unwrap_or(0));
            *self = Self::new(top, right, bottom, left);
        } else if let Some(raw) = j["margin"].as_str() {
            match Self::parse_shorthand(raw) {
                Ok(Some(margins)) => *self = margins,
                Ok(None) => {}
                Err(e) => warn!(margin = %raw, error = %e, "Invalid margins"),
            }
        } else if let Some(gap) = int_key(j, "margin") {
            *self = Self::full(gap);
        }
    }
}
