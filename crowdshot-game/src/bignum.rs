//! Arbitrary-precision crowd/soldier arithmetic and human-readable formatting.
//!
//! Crowd and soldier counts are designed to grow without bound across a
//! session, so every balance-critical quantity is a [`BigInt`]. Fractional
//! multipliers are applied through permille fixed-point scaling rather than
//! floating point, keeping the math exact at any magnitude.

use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};

/// Ordered thousand-step suffixes. Formatting saturates at the last entry.
pub const SUFFIXES: [&str; 11] = [
    "K", "M", "B", "T", "Qa", "Qi", "Sx", "Sp", "Oc", "No", "Dc",
];

/// Render a value for HUD display.
///
/// Values below 1000 in magnitude print as plain decimals. Larger values are
/// repeatedly divided by 1000, one suffix per step; when the leading part is
/// below 10 a single truncated fractional digit is kept (`1234` → `"1.2K"`).
#[must_use]
pub fn format(n: &BigInt) -> String {
    let thousand = BigInt::from(1_000);
    let mut magnitude = n.abs();
    if magnitude < thousand {
        return n.to_string();
    }

    let mut tier = 0usize;
    let mut remainder = BigInt::zero();
    while magnitude >= thousand && tier < SUFFIXES.len() {
        remainder = &magnitude % &thousand;
        magnitude = &magnitude / &thousand;
        tier += 1;
    }

    let sign = if n.is_negative() { "-" } else { "" };
    let suffix = SUFFIXES[tier - 1];
    if magnitude < BigInt::from(10) {
        let tenth = (&remainder / BigInt::from(100)).to_u8().unwrap_or(0);
        format!("{sign}{magnitude}.{tenth}{suffix}")
    } else {
        format!("{sign}{magnitude}{suffix}")
    }
}

/// Parse a decimal-string encoding back into a value.
///
/// Plain integer strings round-trip losslessly. Strings with a fractional
/// part are floored. Anything unrecognized yields zero.
#[must_use]
pub fn parse(input: &str) -> BigInt {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return BigInt::zero();
    }
    if let Ok(value) = trimmed.parse::<BigInt>() {
        return value;
    }
    if let Some((whole, frac)) = trimmed.split_once('.') {
        let whole_part = match whole {
            "" | "-" | "+" => format!("{whole}0"),
            _ => whole.to_string(),
        };
        if !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(mut value) = whole_part.parse::<BigInt>() {
                if trimmed.starts_with('-') && frac.bytes().any(|b| b != b'0') {
                    value -= 1;
                }
                return value;
            }
        }
    }
    BigInt::zero()
}

/// Floor a floating value into a big integer; non-finite values yield zero.
#[must_use]
pub fn from_f64(value: f64) -> BigInt {
    if !value.is_finite() {
        return BigInt::zero();
    }
    BigInt::from_f64(value.floor()).unwrap_or_else(BigInt::zero)
}

/// Apply a fixed-point factor: `n * numer / denom` with truncating division.
///
/// This is the only sanctioned way to take a percentage of a big integer;
/// mixing `BigInt` magnitudes with floats would silently lose precision.
#[must_use]
pub fn scale(n: &BigInt, numer: i64, denom: i64) -> BigInt {
    if denom == 0 {
        return BigInt::zero();
    }
    (n * numer) / denom
}

/// Count the decimal digits of |n|; zero counts as one digit.
#[must_use]
pub fn digit_count(n: &BigInt) -> u32 {
    u32::try_from(n.abs().to_string().len()).unwrap_or(u32::MAX)
}

/// Serialize big integers as decimal strings so the persistence boundary
/// never loses precision. Malformed stored text deserializes to zero.
pub mod serde_decimal {
    use super::parse;
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write the value as its decimal-string encoding.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    /// Read a decimal-string encoding; unrecognized text yields zero.
    ///
    /// # Errors
    ///
    /// Propagates deserializer failures.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(parse(&text))
    }
}

/// Serialize slices of big integers as decimal-string sequences.
pub mod serde_decimal_vec {
    use super::parse;
    use num_bigint::BigInt;
    use serde::{Deserialize, Deserializer, Serializer};

    /// Write each value as its decimal-string encoding.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(values: &[BigInt], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(values.iter().map(ToString::to_string))
    }

    /// Read decimal-string encodings; unrecognized entries yield zero.
    ///
    /// # Errors
    ///
    /// Propagates deserializer failures.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<BigInt>, D::Error> {
        let texts = Vec::<String>::deserialize(deserializer)?;
        Ok(texts.iter().map(|text| parse(text)).collect())
    }
}
