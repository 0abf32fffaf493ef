use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::Context as _;
use chrono::{Datelike as _, NaiveDateTime, Timelike as _};

use crate::foundation::error::{BarRaceError, BarRaceResult};

/// Time-format locale in d3's JSON layout (`fr-FR.json` and friends).
///
/// `days` and `short_days` start on Sunday.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeLocale {
    /// Pattern used by `%c`.
    pub date_time: String,
    /// Pattern used by `%x`.
    pub date: String,
    /// Pattern used by `%X`.
    pub time: String,
    /// AM/PM designators.
    pub periods: [String; 2],
    pub days: [String; 7],
    pub short_days: [String; 7],
    pub months: [String; 12],
    pub short_months: [String; 12],
}

impl Default for TimeLocale {
    fn default() -> Self {
        fn owned<const N: usize>(names: [&str; N]) -> [String; N] {
            names.map(str::to_owned)
        }

        Self {
            date_time: "%x, %X".to_owned(),
            date: "%-m/%-d/%Y".to_owned(),
            time: "%-I:%M:%S %p".to_owned(),
            periods: owned(["AM", "PM"]),
            days: owned([
                "Sunday",
                "Monday",
                "Tuesday",
                "Wednesday",
                "Thursday",
                "Friday",
                "Saturday",
            ]),
            short_days: owned(["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]),
            months: owned([
                "January",
                "February",
                "March",
                "April",
                "May",
                "June",
                "July",
                "August",
                "September",
                "October",
                "November",
                "December",
            ]),
            short_months: owned([
                "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
            ]),
        }
    }
}

impl TimeLocale {
    /// Load a locale definition from a JSON file.
    pub fn from_path(path: &Path) -> BarRaceResult<Self> {
        let f = File::open(path).with_context(|| format!("open locale '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(f)).map_err(|e| {
            BarRaceError::serde(format!("parse locale '{}': {e}", path.display()))
        })
    }

    /// Parse a locale definition from a JSON string.
    pub fn from_json_str(s: &str) -> BarRaceResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Render `dt` with a d3-style pattern.
    ///
    /// Supports `%a %A %b %B %c %d %e %H %I %m %M %p %S %x %X %y %Y %%` and the `-`, `_`, `0`
    /// padding modifiers. Unknown directives are copied through.
    pub fn format(&self, dt: &NaiveDateTime, pattern: &str) -> String {
        let mut out = String::with_capacity(pattern.len() + 16);
        self.format_into(&mut out, dt, pattern, 0);
        out
    }

    fn format_into(&self, out: &mut String, dt: &NaiveDateTime, pattern: &str, depth: u8) {
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            if c != '%' {
                out.push(c);
                continue;
            }

            let pad = match chars.peek() {
                Some('-') => Some(Pad::None),
                Some('_') => Some(Pad::Space),
                Some('0') => Some(Pad::Zero),
                _ => None,
            };
            if pad.is_some() {
                chars.next();
            }
            let Some(directive) = chars.next() else {
                out.push('%');
                break;
            };

            let nested = match directive {
                'c' => Some(self.date_time.as_str()),
                'x' => Some(self.date.as_str()),
                'X' => Some(self.time.as_str()),
                _ => None,
            };
            if let Some(p) = nested {
                // Locale patterns may not reference themselves; cap recursion anyway.
                if depth < 2 {
                    self.format_into(out, dt, p, depth + 1);
                }
                continue;
            }

            let hour12 = match dt.hour() % 12 {
                0 => 12,
                h => h,
            };
            match directive {
                'a' => out.push_str(&self.short_days[dt.weekday().num_days_from_sunday() as usize]),
                'A' => out.push_str(&self.days[dt.weekday().num_days_from_sunday() as usize]),
                'b' => out.push_str(&self.short_months[dt.month0() as usize]),
                'B' => out.push_str(&self.months[dt.month0() as usize]),
                'd' => push_num(out, dt.day(), 2, pad.unwrap_or(Pad::Zero)),
                'e' => push_num(out, dt.day(), 2, pad.unwrap_or(Pad::Space)),
                'H' => push_num(out, dt.hour(), 2, pad.unwrap_or(Pad::Zero)),
                'I' => push_num(out, hour12, 2, pad.unwrap_or(Pad::Zero)),
                'm' => push_num(out, dt.month(), 2, pad.unwrap_or(Pad::Zero)),
                'M' => push_num(out, dt.minute(), 2, pad.unwrap_or(Pad::Zero)),
                'S' => push_num(out, dt.second(), 2, pad.unwrap_or(Pad::Zero)),
                'p' => out.push_str(&self.periods[usize::from(dt.hour() >= 12)]),
                'y' => push_num(out, dt.year().rem_euclid(100) as u32, 2, pad.unwrap_or(Pad::Zero)),
                'Y' => push_num(out, dt.year().max(0) as u32, 4, pad.unwrap_or(Pad::Zero)),
                '%' => out.push('%'),
                other => {
                    out.push('%');
                    out.push(other);
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Pad {
    None,
    Space,
    Zero,
}

fn push_num(out: &mut String, v: u32, width: usize, pad: Pad) {
    match pad {
        Pad::None => out.push_str(&v.to_string()),
        Pad::Space => out.push_str(&format!("{v:>width$}")),
        Pad::Zero => out.push_str(&format!("{v:0width$}")),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/locale.rs"]
mod tests;
