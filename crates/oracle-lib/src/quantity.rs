//! Unit-suffixed resource quantities
//!
//! Quantities are stored as an exact fixed-point count of 10⁻⁹ base units,
//! where the base unit is a millicore for CPU and a byte for memory. CPU and
//! memory are separate types, so comparing across dimensions does not compile.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::str::FromStr;
use thiserror::Error;

/// Fixed-point scale: stored units per base unit
const NANO: u128 = 1_000_000_000;

/// Number of fractional digits kept by the fixed-point representation
const NANO_DIGITS: usize = 9;

const KI: u128 = 1 << 10;
const MI: u128 = 1 << 20;
const GI: u128 = 1 << 30;
const TI: u128 = 1 << 40;

/// Memory suffixes tried by the formatter, largest first (binary before decimal)
const MEMORY_FORMAT_SUFFIXES: &[(&str, u128)] = &[
    ("Ti", TI),
    ("Gi", GI),
    ("Mi", MI),
    ("Ki", KI),
    ("T", 1_000_000_000_000),
    ("G", 1_000_000_000),
    ("M", 1_000_000),
    ("K", 1_000),
];

/// Error returned when a quantity string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuantityParseError {
    #[error("empty quantity string")]
    Empty,

    #[error("negative quantity '{0}'")]
    Negative(String),

    #[error("invalid number in quantity '{0}'")]
    InvalidNumber(String),

    #[error("unsupported {dimension} suffix '{suffix}' in quantity '{input}'")]
    UnsupportedSuffix {
        dimension: &'static str,
        suffix: String,
        input: String,
    },

    #[error("quantity '{0}' is finer than nano-unit precision")]
    Precision(String),

    #[error("quantity '{0}' is too large")]
    Overflow(String),
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Cpu {}
    impl Sealed for super::Memory {}
}

/// A resource dimension with its own suffix table and canonical format
pub trait Dimension:
    sealed::Sealed + Copy + Clone + fmt::Debug + Default + Eq + Ord + Hash + Send + Sync + 'static
{
    /// Lowercase dimension name used in messages
    const NAME: &'static str;

    /// Multiplier in base units for a suffix, or `None` if unsupported
    fn suffix_multiplier(suffix: &str) -> Option<u128>;

    /// Canonical string for a value expressed in nano base units
    fn format_nanos(nanos: u128) -> String;
}

/// CPU dimension (base unit: millicore)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cpu;

/// Memory dimension (base unit: byte)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Memory;

impl Dimension for Cpu {
    const NAME: &'static str = "cpu";

    fn suffix_multiplier(suffix: &str) -> Option<u128> {
        match suffix {
            "m" => Some(1),
            // bare numbers are whole cores
            "" => Some(1_000),
            _ => None,
        }
    }

    fn format_nanos(nanos: u128) -> String {
        format!("{}m", format_decimal(nanos))
    }
}

impl Dimension for Memory {
    const NAME: &'static str = "memory";

    fn suffix_multiplier(suffix: &str) -> Option<u128> {
        match suffix {
            "" => Some(1),
            "K" => Some(1_000),
            "M" => Some(1_000_000),
            "G" => Some(1_000_000_000),
            "T" => Some(1_000_000_000_000),
            "Ki" => Some(KI),
            "Mi" => Some(MI),
            "Gi" => Some(GI),
            "Ti" => Some(TI),
            _ => None,
        }
    }

    fn format_nanos(nanos: u128) -> String {
        if nanos % NANO == 0 {
            let bytes = nanos / NANO;
            if bytes > 0 {
                for (suffix, multiplier) in MEMORY_FORMAT_SUFFIXES {
                    if bytes % multiplier == 0 {
                        return format!("{}{}", bytes / multiplier, suffix);
                    }
                }
            }
        }
        format_decimal(nanos)
    }
}

/// Render a nano-unit count as a trimmed decimal in base units
fn format_decimal(nanos: u128) -> String {
    let whole = nanos / NANO;
    let frac = nanos % NANO;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", frac, width = NANO_DIGITS);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

/// A dimension-typed, non-negative resource amount
pub struct Quantity<D: Dimension> {
    nanos: u128,
    _dimension: PhantomData<D>,
}

/// CPU amount (canonical unit: millicores)
pub type CpuQuantity = Quantity<Cpu>;

/// Memory amount (canonical unit: bytes)
pub type MemoryQuantity = Quantity<Memory>;

impl<D: Dimension> Quantity<D> {
    const fn from_nanos(nanos: u128) -> Self {
        Self {
            nanos,
            _dimension: PhantomData,
        }
    }

    /// The zero quantity
    pub const fn zero() -> Self {
        Self::from_nanos(0)
    }

    /// Parse a quantity string such as `"500m"` or `"128Mi"`
    pub fn parse(input: &str) -> Result<Self, QuantityParseError> {
        let s = input.trim();
        if s.is_empty() {
            return Err(QuantityParseError::Empty);
        }
        if s.starts_with('-') {
            return Err(QuantityParseError::Negative(input.to_string()));
        }

        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, suffix) = s.split_at(split);

        let multiplier =
            D::suffix_multiplier(suffix).ok_or_else(|| QuantityParseError::UnsupportedSuffix {
                dimension: D::NAME,
                suffix: suffix.to_string(),
                input: input.to_string(),
            })?;

        let (int_part, frac_part) = match number.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (number, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(QuantityParseError::InvalidNumber(input.to_string()));
        }

        let overflow = || QuantityParseError::Overflow(input.to_string());
        let frac_part = frac_part.trim_end_matches('0');
        let mut mantissa: u128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa
                .checked_mul(10)
                .and_then(|m| m.checked_add(u128::from(b - b'0')))
                .ok_or_else(overflow)?;
        }

        let scaled = mantissa
            .checked_mul(multiplier)
            .and_then(|m| m.checked_mul(NANO))
            .ok_or_else(overflow)?;
        let divisor = u32::try_from(frac_part.len())
            .ok()
            .and_then(|exp| 10u128.checked_pow(exp))
            .ok_or_else(|| QuantityParseError::Precision(input.to_string()))?;
        if scaled % divisor != 0 {
            return Err(QuantityParseError::Precision(input.to_string()));
        }

        Ok(Self::from_nanos(scaled / divisor))
    }

    /// Canonical string representation; parses back to an equal value
    pub fn format(&self) -> String {
        D::format_nanos(self.nanos)
    }

    pub fn is_zero(&self) -> bool {
        self.nanos == 0
    }

    /// Difference, or `None` if `other` is larger
    pub fn checked_sub(&self, other: &Self) -> Option<Self> {
        self.nanos.checked_sub(other.nanos).map(Self::from_nanos)
    }

    /// Scale by an integer factor, saturating on overflow
    pub fn saturating_mul(&self, factor: u64) -> Self {
        Self::from_nanos(self.nanos.saturating_mul(u128::from(factor)))
    }

    /// Fraction of `self` removed when moving to `target` (0.0 when not a decrease)
    pub fn decrease_ratio(&self, target: &Self) -> f64 {
        match self.checked_sub(target) {
            Some(diff) if !self.is_zero() => diff.nanos as f64 / self.nanos as f64,
            _ => 0.0,
        }
    }
}

impl Quantity<Cpu> {
    pub const fn from_millicores(millicores: u64) -> Self {
        Self::from_nanos(millicores as u128 * NANO)
    }

    pub const fn from_cores(cores: u64) -> Self {
        Self::from_millicores(cores * 1_000)
    }
}

impl Quantity<Memory> {
    pub const fn from_bytes(bytes: u64) -> Self {
        Self::from_nanos(bytes as u128 * NANO)
    }

    pub const fn from_mebibytes(mebibytes: u64) -> Self {
        Self::from_nanos(mebibytes as u128 * MI * NANO)
    }

    pub const fn from_gibibytes(gibibytes: u64) -> Self {
        Self::from_nanos(gibibytes as u128 * GI * NANO)
    }
}

impl<D: Dimension> Clone for Quantity<D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: Dimension> Copy for Quantity<D> {}

impl<D: Dimension> PartialEq for Quantity<D> {
    fn eq(&self, other: &Self) -> bool {
        self.nanos == other.nanos
    }
}

impl<D: Dimension> Eq for Quantity<D> {}

impl<D: Dimension> PartialOrd for Quantity<D> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<D: Dimension> Ord for Quantity<D> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.nanos.cmp(&other.nanos)
    }
}

impl<D: Dimension> Hash for Quantity<D> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.nanos.hash(state);
    }
}

impl<D: Dimension> Default for Quantity<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<D: Dimension> fmt::Debug for Quantity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Quantity<{}>({})", D::NAME, self.format())
    }
}

impl<D: Dimension> fmt::Display for Quantity<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format())
    }
}

impl<D: Dimension> FromStr for Quantity<D> {
    type Err = QuantityParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl<D: Dimension> Serialize for Quantity<D> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format())
    }
}

impl<'de, D: Dimension> Deserialize<'de> for Quantity<D> {
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
