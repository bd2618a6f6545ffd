//! Date and time literals
//!
//! Four shapes are recognized:
//!
//! - offset date-time: `1979-05-27T07:32:00Z`, `1979-05-27 00:32:00.999999-07:00`
//! - local date-time: `1979-05-27T07:32:00`
//! - local date: `1979-05-27`
//! - local time: `07:32:00.5`
//!
//! The `T` separator may be lowercase or a single space. Fractional seconds
//! keep nanosecond precision; extra digits are accepted and truncated.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LexError;

/// A calendar date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    /// 0-60, to allow leap seconds
    pub second: u8,
    pub nanosecond: u32,
}

/// A UTC offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Offset {
    /// `Z`
    Z,
    /// `+HH:MM` or `-HH:MM`, in minutes east of UTC
    Custom { minutes: i16 },
}

/// Which of the four shapes a [`Datetime`] has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatetimeKind {
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

/// A parsed date-time literal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Datetime {
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub offset: Option<Offset>,
}

impl Datetime {
    pub fn kind(&self) -> DatetimeKind {
        match (self.date, self.time, self.offset) {
            (Some(_), Some(_), Some(_)) => DatetimeKind::OffsetDateTime,
            (Some(_), Some(_), None) => DatetimeKind::LocalDateTime,
            (Some(_), None, _) => DatetimeKind::LocalDate,
            (None, _, _) => DatetimeKind::LocalTime,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.nanosecond != 0 {
            let fraction = format!("{:09}", self.nanosecond);
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        Ok(())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Z => f.write_str("Z"),
            Offset::Custom { minutes } => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{}{:02}:{:02}", sign, minutes / 60, minutes % 60)
            }
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = &self.date {
            write!(f, "{date}")?;
        }
        if let Some(time) = &self.time {
            if self.date.is_some() {
                f.write_str("T")?;
            }
            write!(f, "{time}")?;
        }
        if let Some(offset) = &self.offset {
            write!(f, "{offset}")?;
        }
        Ok(())
    }
}

impl FromStr for Datetime {
    type Err = LexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (datetime, len) = scan(s)?;
        if len != s.len() {
            return Err(LexError::InvalidDatetime {
                component: "trailing characters",
                text: s.to_string(),
            });
        }
        Ok(datetime)
    }
}

/// Reports whether `s` opens with `DDDD-` or `DD:`, the two shapes that
/// can only start a date-time literal
pub fn starts_datetime(s: &str) -> bool {
    let bytes = s.as_bytes();
    let digits = |n: usize| bytes.len() > n && bytes[..n].iter().all(u8::is_ascii_digit);
    (digits(4) && bytes[4] == b'-') || (digits(2) && bytes[2] == b':')
}

/// Parses the date-time literal at the start of `s`.
///
/// Returns the value and the number of bytes it spans. Anything after the
/// literal is left for the caller.
pub fn scan(s: &str) -> Result<(Datetime, usize), LexError> {
    let mut scanner = Scanner { src: s, pos: 0 };

    let datetime = if starts_date(s.as_bytes()) {
        let date = scanner.date()?;
        if scanner.at_time_separator() {
            scanner.pos += 1;
            let time = scanner.time()?;
            let offset = scanner.offset()?;
            Datetime {
                date: Some(date),
                time: Some(time),
                offset,
            }
        } else {
            Datetime {
                date: Some(date),
                time: None,
                offset: None,
            }
        }
    } else {
        let time = scanner.time()?;
        // An offset only applies to a full date-time
        if matches!(scanner.peek_at(scanner.pos), Some(b'Z' | b'z' | b'+' | b'-')) {
            return Err(scanner.error("offset"));
        }
        Datetime {
            date: None,
            time: Some(time),
            offset: None,
        }
    };

    Ok((datetime, scanner.pos))
}

fn starts_date(bytes: &[u8]) -> bool {
    bytes.len() > 4 && bytes[..4].iter().all(u8::is_ascii_digit) && bytes[4] == b'-'
}

fn is_leap_year(year: u16) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

struct Scanner<'s> {
    src: &'s str,
    pos: usize,
}

impl Scanner<'_> {
    fn peek_at(&self, index: usize) -> Option<u8> {
        self.src.as_bytes().get(index).copied()
    }

    fn error(&self, component: &'static str) -> LexError {
        let rest = &self.src[self.pos..];
        let run = rest
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '+' | '-')))
            .unwrap_or(rest.len());
        LexError::InvalidDatetime {
            component,
            text: self.src[..self.pos + run].to_string(),
        }
    }

    /// Reads exactly `n` ASCII digits
    fn digits(&mut self, n: usize, component: &'static str) -> Result<u32, LexError> {
        let mut value = 0;
        for i in 0..n {
            match self.peek_at(self.pos + i) {
                Some(b) if b.is_ascii_digit() => value = value * 10 + u32::from(b - b'0'),
                _ => return Err(self.error(component)),
            }
        }
        self.pos += n;
        Ok(value)
    }

    fn expect(&mut self, byte: u8, component: &'static str) -> Result<(), LexError> {
        if self.peek_at(self.pos) != Some(byte) {
            return Err(self.error(component));
        }
        self.pos += 1;
        Ok(())
    }

    fn date(&mut self) -> Result<Date, LexError> {
        let year = self.digits(4, "year")? as u16;
        self.expect(b'-', "date")?;
        let month = self.digits(2, "month")? as u8;
        if !(1..=12).contains(&month) {
            return Err(self.error("month"));
        }
        self.expect(b'-', "date")?;
        let day = self.digits(2, "day")? as u8;
        if day == 0 || day > days_in_month(year, month) {
            return Err(self.error("day"));
        }
        Ok(Date { year, month, day })
    }

    /// `T`, `t`, or a space followed by `DD:`
    fn at_time_separator(&self) -> bool {
        match self.peek_at(self.pos) {
            Some(b'T' | b't') => true,
            Some(b' ') => {
                let digit = |i| self.peek_at(self.pos + i).is_some_and(|b: u8| b.is_ascii_digit());
                digit(1) && digit(2) && self.peek_at(self.pos + 3) == Some(b':')
            }
            _ => false,
        }
    }

    fn time(&mut self) -> Result<Time, LexError> {
        let hour = self.digits(2, "hour")? as u8;
        if hour > 23 {
            return Err(self.error("hour"));
        }
        self.expect(b':', "time")?;
        let minute = self.digits(2, "minute")? as u8;
        if minute > 59 {
            return Err(self.error("minute"));
        }
        self.expect(b':', "time")?;
        let second = self.digits(2, "second")? as u8;
        if second > 60 {
            return Err(self.error("second"));
        }

        let mut nanosecond = 0;
        if self.peek_at(self.pos) == Some(b'.') {
            self.pos += 1;
            let mut count = 0;
            while let Some(b) = self.peek_at(self.pos).filter(u8::is_ascii_digit) {
                if count < 9 {
                    nanosecond = nanosecond * 10 + u32::from(b - b'0');
                    count += 1;
                }
                self.pos += 1;
            }
            if count == 0 {
                return Err(self.error("fractional seconds"));
            }
            nanosecond *= 10u32.pow(9 - count);
        }

        Ok(Time {
            hour,
            minute,
            second,
            nanosecond,
        })
    }

    fn offset(&mut self) -> Result<Option<Offset>, LexError> {
        match self.peek_at(self.pos) {
            Some(b'Z' | b'z') => {
                self.pos += 1;
                Ok(Some(Offset::Z))
            }
            Some(sign @ (b'+' | b'-')) => {
                self.pos += 1;
                let hours = self.digits(2, "offset hour")?;
                if hours > 23 {
                    return Err(self.error("offset hour"));
                }
                self.expect(b':', "offset")?;
                let minutes = self.digits(2, "offset minute")?;
                if minutes > 59 {
                    return Err(self.error("offset minute"));
                }
                let total = (hours * 60 + minutes) as i16;
                let minutes = if sign == b'-' { -total } else { total };
                Ok(Some(Offset::Custom { minutes }))
            }
            _ => Ok(None),
        }
    }
}
