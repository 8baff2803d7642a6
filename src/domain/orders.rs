use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

/// A charge/discharge authorization for a single battery over a window
/// (spec.md §3, "BatteryOrder").
///
/// `min_kw` is the discharge-side power cap — a historical naming quirk
/// carried over unchanged from the order book schema (spec.md §9); it is
/// NOT a lower bound.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatteryOrder {
    pub id: String,
    pub startby: DateTime<Utc>,
    pub endby: DateTime<Utc>,
    /// Maximum discharge power magnitude, despite the name.
    pub min_kw: f64,
    pub max_kw: f64,
    pub max_kwh: f64,
    pub initial_kwh: f64,
    pub end_kwh: f64,
    /// Round-trip efficiency factor in (0, 1].
    pub eta: f64,
}

/// A load with a total energy requirement and a power cap, free to
/// distribute in time (spec.md §3, "ShapeableOrder").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeableOrder {
    pub id: String,
    pub startby: DateTime<Utc>,
    pub endby: DateTime<Utc>,
    pub max_kw: f64,
    pub end_kwh: f64,
}

/// A load with a fixed power profile shape that must be placed once,
/// starting at some integer timestep (spec.md §3, "DeferrableOrder").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferrableOrder {
    pub id: String,
    pub startby: DateTime<Utc>,
    pub endby: DateTime<Utc>,
    pub duration: usize,
    pub profile_kw: ProfileKw,
}

/// `profile_kw` arrives either as a native JSON array or as the original
/// service's bracketed, comma-separated string encoding (spec.md §4.1).
/// Both decode to the same `Vec<f64>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProfileKw(pub Vec<f64>);

impl ProfileKw {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl<'de> Deserialize<'de> for ProfileKw {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ProfileKwVisitor;

        impl<'de> de::Visitor<'de> for ProfileKwVisitor {
            type Value = ProfileKw;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a sequence of numbers, or a bracketed comma-separated string of numbers")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                parse_bracketed(value).map(ProfileKw).map_err(de::Error::custom)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(v) = seq.next_element::<f64>()? {
                    values.push(v);
                }
                Ok(ProfileKw(values))
            }
        }

        deserializer.deserialize_any(ProfileKwVisitor)
    }
}

fn parse_bracketed(raw: &str) -> Result<Vec<f64>, String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    if inner.trim().is_empty() {
        return Ok(Vec::new());
    }

    inner
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|e| format!("invalid profile_kw entry {part:?}: {e}"))
        })
        .collect()
}
