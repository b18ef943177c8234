//! Lenient field decoding
//!
//! The backend hands out numbers as JSON numbers, numeric strings, or null
//! depending on the column type and code path that produced them. These
//! helpers are used with `#[serde(deserialize_with = ...)]` so that one bad
//! field never rejects a whole record: missing or unreadable amounts and
//! counts become zero, unreadable timestamps become `None`.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Any scalar the backend might send for a numeric field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
    /// Objects, arrays and anything else without a scalar reading
    Other(IgnoredAny),
}

/// A map of counts, or anything else read as an empty map
///
/// Keys stay text here; buffered untagged content cannot hand out integer keys.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LooseMap {
    Map(BTreeMap<String, Option<Loose>>),
    Other(IgnoredAny),
}

impl Loose {
    fn into_decimal(self) -> Decimal {
        let value = match self {
            Loose::Int(i) => Decimal::from(i),
            // Shortest round-trip text keeps 3.5 as exactly 3.5
            Loose::Float(f) => decimal_from_f64(f),
            Loose::Text(s) => s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
            Loose::Bool(_) | Loose::Other(_) => Decimal::ZERO,
        };
        value.max(Decimal::ZERO)
    }

    fn into_text(self) -> Option<String> {
        match self {
            Loose::Text(s) => Some(s),
            Loose::Int(i) => Some(i.to_string()),
            Loose::Float(f) => Some(f.to_string()),
            Loose::Bool(b) => Some(b.to_string()),
            Loose::Other(_) => None,
        }
    }

    fn into_count(self) -> u64 {
        match self {
            Loose::Int(i) => u64::try_from(i).unwrap_or(0),
            Loose::Float(f) => count_from_f64(f),
            Loose::Text(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(count_from_f64))
                    .unwrap_or(0)
            }
            Loose::Bool(_) | Loose::Other(_) => 0,
        }
    }
}

fn decimal_from_f64(f: f64) -> Decimal {
    if !f.is_finite() {
        return Decimal::ZERO;
    }
    f.to_string().parse::<Decimal>().unwrap_or(Decimal::ZERO)
}

fn count_from_f64(f: f64) -> u64 {
    if f.is_finite() && f > 0.0 {
        f.trunc() as u64
    } else {
        0
    }
}

/// Parse a free-form amount (price, revenue) the same way the wire decoder does
pub fn parse_amount(raw: &str) -> Decimal {
    Loose::Text(raw.to_string()).into_decimal()
}

/// Parse a free-form count (quantity) the same way the wire decoder does
pub fn parse_count(raw: &str) -> u64 {
    Loose::Text(raw.to_string()).into_count()
}

/// Amount: number or numeric string, null/garbage/negative as zero
pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(raw.map(Loose::into_decimal).unwrap_or(Decimal::ZERO))
}

/// Quantity: non-negative integer, fractional values truncate
pub fn quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    let count = raw.map(Loose::into_count).unwrap_or(0);
    Ok(u32::try_from(count).unwrap_or(u32::MAX))
}

/// Count: like `quantity` but for aggregate totals
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(raw.map(Loose::into_count).unwrap_or(0))
}

/// Map of counts keyed by `K`, e.g. item name or hour of day
///
/// Entries whose key does not parse as `K` are dropped.
pub fn count_map<'de, D, K>(deserializer: D) -> Result<BTreeMap<K, u64>, D::Error>
where
    D: Deserializer<'de>,
    K: FromStr + Ord,
{
    let raw: Option<LooseMap> = Option::deserialize(deserializer)?;
    let map = match raw {
        Some(LooseMap::Map(map)) => map,
        Some(LooseMap::Other(_)) | None => BTreeMap::new(),
    };
    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let key = key.trim().parse::<K>().ok()?;
            Some((key, value.map(Loose::into_count).unwrap_or(0)))
        })
        .collect())
}

/// Text that may be null
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(Loose::into_text).unwrap_or_default())
}

/// Optional amount: absent or null stays `None`
pub fn optional_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(raw.map(Loose::into_decimal))
}

/// Optional scalar rendered as text: absent, null or non-scalar is `None`
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(Loose::into_text))
}

/// Record id: positive integer, anything else as 0 ("no id")
pub fn id<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    count(deserializer)
}

/// Timestamp in any form understood by [`super::parse_timestamp`]
pub fn timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Loose> = Option::deserialize(deserializer)?;
    Ok(match raw {
        Some(Loose::Text(s)) => super::parse_timestamp(&s),
        _ => None,
    })
}
