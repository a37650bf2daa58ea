//! Domain value types shared by the inbound API and the supplier contract.
//!
//! Every wrapper holds the raw text received from the client. Turning that
//! text into a usable value is a separate `parse()` step, and checking it
//! against business rules is a separate `validate()` step, so callers can
//! tell which of the two failed.

use std::fmt;
use std::num::ParseIntError;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------ //
//  Errors                                                             //
// ------------------------------------------------------------------ //

/// Raised when raw text cannot be turned into a domain value.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid date {value:?}, expected YYYY-MM-DD")]
    Date { value: String },
    #[error("invalid integer list {value:?}: {source}")]
    IntegerList {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid occupancies: {0}")]
    Occupancies(#[from] serde_json::Error),
}

/// Raised when a parsed value breaks a business rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("currency not allowed")]
    CurrencyNotAllowed,
    #[error("country not allowed")]
    CountryNotAllowed,
    #[error("at least one room is required")]
    MinOneRoomRequired,
    #[error("at least one adult is required")]
    MinOneAdultRequired,
    #[error("negative value not allowed")]
    NegativeValue,
    #[error("empty occupancies")]
    EmptyOccupancies,
}

// ------------------------------------------------------------------ //
//  Currency / Country                                                 //
// ------------------------------------------------------------------ //

const ALLOWED_CURRENCIES: &[&str] = &["USD", "EUR"];
const ALLOWED_COUNTRIES: &[&str] = &["US", "UK", "ES"];

/// Currency code requested by the client, e.g. `EUR`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Currency(String);

impl Currency {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Only allow-listed currencies may be searched. The empty code is not
    /// allow-listed.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if ALLOWED_CURRENCIES.contains(&self.0.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::CurrencyNotAllowed)
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Country code of the guest, e.g. `ES`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Country(String);

impl Country {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if ALLOWED_COUNTRIES.contains(&self.0.as_str()) {
            Ok(())
        } else {
            Err(ValidationError::CountryNotAllowed)
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------------------------------------------ //
//  DateString                                                         //
// ------------------------------------------------------------------ //

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateString(String);

impl DateString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse strictly: the date must format back to exactly the same text.
    pub fn parse(&self) -> Result<NaiveDate, ParseError> {
        let err = || ParseError::Date {
            value: self.0.clone(),
        };
        let date = NaiveDate::parse_from_str(&self.0, DATE_FORMAT).map_err(|_| err())?;
        if date.format(DATE_FORMAT).to_string() != self.0 {
            return Err(err());
        }
        Ok(date)
    }
}

impl fmt::Display for DateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------------------------------------------ //
//  IntegerList                                                        //
// ------------------------------------------------------------------ //

/// Comma-separated integers, e.g. `1,2,3`. An enclosing `[...]` is
/// tolerated so `[1,2,3]` denotes the same list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntegerList(String);

impl IntegerList {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse into integers. Blank input yields an empty list.
    pub fn parse(&self) -> Result<Vec<i64>, ParseError> {
        let trimmed = self.0.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(trimmed)
            .trim();

        if inner.is_empty() {
            return Ok(Vec::new());
        }

        inner
            .split(',')
            .map(|token| {
                token
                    .trim()
                    .parse::<i64>()
                    .map_err(|source| ParseError::IntegerList {
                        value: self.0.clone(),
                        source,
                    })
            })
            .collect()
    }
}

impl fmt::Display for IntegerList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------------------------------------------ //
//  Occupancy                                                          //
// ------------------------------------------------------------------ //

/// Guest composition of one room request.
///
/// Keys are matched case-insensitively (`adults`, `Adults`, `ADULTS`) and
/// any other key is a parse error. Absent keys default to zero and are
/// rejected by [`Occupancies::validate`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    pub adults: i32,
    pub children: i32,
    pub rooms: i32,
}

const OCCUPANCY_FIELDS: &[&str] = &["adults", "children", "rooms"];

impl<'de> Deserialize<'de> for Occupancy {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OccupancyVisitor;

        impl<'de> Visitor<'de> for OccupancyVisitor {
            type Value = Occupancy;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an occupancy object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Occupancy, A::Error> {
                let mut occupancy = Occupancy::default();
                while let Some(key) = map.next_key::<String>()? {
                    let slot = match key.to_ascii_lowercase().as_str() {
                        "adults" => &mut occupancy.adults,
                        "children" => &mut occupancy.children,
                        "rooms" => &mut occupancy.rooms,
                        _ => return Err(de::Error::unknown_field(&key, OCCUPANCY_FIELDS)),
                    };
                    *slot = map.next_value()?;
                }
                Ok(occupancy)
            }
        }

        deserializer.deserialize_map(OccupancyVisitor)
    }
}

/// Ordered collection of [`Occupancy`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Occupancies(pub Vec<Occupancy>);

impl Occupancies {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Occupancy> {
        self.0.iter()
    }

    /// Checks entries in order; the first offending entry decides the error.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            return Err(ValidationError::EmptyOccupancies);
        }

        for occupancy in &self.0 {
            if occupancy.rooms < 1 {
                return Err(ValidationError::MinOneRoomRequired);
            }
            if occupancy.adults < 1 {
                return Err(ValidationError::MinOneAdultRequired);
            }
            if occupancy.children < 0 {
                return Err(ValidationError::NegativeValue);
            }
        }

        Ok(())
    }
}

impl From<Vec<Occupancy>> for Occupancies {
    fn from(v: Vec<Occupancy>) -> Self {
        Self(v)
    }
}

/// [`Occupancies`] as a JSON array string, e.g.
/// `[{"rooms":1,"adults":2,"children":0}]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccupancyList(String);

impl OccupancyList {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse the JSON array. Blank input yields an empty collection.
    pub fn parse(&self) -> Result<Occupancies, ParseError> {
        if self.0.trim().is_empty() {
            return Ok(Occupancies::default());
        }
        Ok(serde_json::from_str(&self.0)?)
    }
}

impl fmt::Display for OccupancyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ------------------------------------------------------------------ //
//  Conversions                                                        //
// ------------------------------------------------------------------ //

macro_rules! from_text {
    ($($ty:ident),+ $(,)?) => {
        $(
            impl From<String> for $ty {
                fn from(value: String) -> Self {
                    Self(value)
                }
            }

            impl From<&str> for $ty {
                fn from(value: &str) -> Self {
                    Self(value.to_string())
                }
            }
        )+
    };
}

from_text!(Currency, Country, DateString, IntegerList, OccupancyList);

// ------------------------------------------------------------------ //
//  Tests                                                              //
// ------------------------------------------------------------------ //
