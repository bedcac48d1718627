//! Duration normalization at the data-model boundary.
//!
//! Persisted projects carry durations as JSON numbers, decimal strings (`"5.30"`), or clock
//! strings (`"0:05"`, `"1:02:03.5"`). Everything past deserialization is `f64` seconds.

use std::fmt;

use crate::foundation::error::{ReelError, ReelResult};

/// Parse a textual duration into seconds.
pub fn parse_duration_secs(raw: &str) -> ReelResult<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(ReelError::validation("duration must be non-empty"));
    }

    let secs = if s.contains(':') {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() > 3 {
            return Err(ReelError::validation(format!(
                "duration '{raw}' has too many ':' fields"
            )));
        }
        let (last, leading) = parts
            .split_last()
            .ok_or_else(|| ReelError::validation(format!("invalid duration '{raw}'")))?;
        let mut total = 0.0f64;
        for field in leading {
            let v = field
                .trim()
                .parse::<u32>()
                .map_err(|_| ReelError::validation(format!("invalid duration '{raw}'")))?;
            total = total * 60.0 + f64::from(v);
        }
        let tail = last
            .trim()
            .parse::<f64>()
            .map_err(|_| ReelError::validation(format!("invalid duration '{raw}'")))?;
        if tail >= 60.0 {
            return Err(ReelError::validation(format!(
                "duration '{raw}' seconds field must be < 60"
            )));
        }
        total * 60.0 + tail
    } else {
        s.parse::<f64>()
            .map_err(|_| ReelError::validation(format!("invalid duration '{raw}'")))?
    };

    check_secs(secs)
}

/// Reject NaN, infinities, and negative values.
pub fn check_secs(secs: f64) -> ReelResult<f64> {
    if !secs.is_finite() || secs < 0.0 {
        return Err(ReelError::validation(format!(
            "duration must be finite and >= 0, got {secs}"
        )));
    }
    Ok(secs)
}

/// `deserialize_with` helper accepting a number or any string form handled by
/// [`parse_duration_secs`].
pub fn de_seconds<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct SecondsVisitor;

    impl serde::de::Visitor<'_> for SecondsVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a duration in seconds (number, decimal string, or m:ss)")
        }

        fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<f64, E> {
            check_secs(v).map_err(E::custom)
        }

        fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<f64, E> {
            check_secs(v as f64).map_err(E::custom)
        }

        fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<f64, E> {
            parse_duration_secs(v).map_err(E::custom)
        }
    }

    de.deserialize_any(SecondsVisitor)
}

/// Like [`de_seconds`], but a missing or `null` value becomes `0.0`.
pub fn de_opt_seconds<'de, D>(de: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(serde::Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "de_seconds")] f64);

    let v: Option<Wrapped> = serde::Deserialize::deserialize(de)?;
    Ok(v.map(|w| w.0).unwrap_or(0.0))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/duration.rs"]
mod tests;
