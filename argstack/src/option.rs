//! Option table definitions and the typed value store behind them.

use crate::error::{Error, Result};

// ============================================================================
// ArgType
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Flag; the slot is set to `true` when seen.
    None,
    String,
    Int,
    Long,
}

// ============================================================================
// StoredValue
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[doc(hidden)]
pub enum StoredValue {
    Bool(bool),
    Int(i32),
    Long(i64),
    Str(String),
}

// ============================================================================
// Opt
// ============================================================================

#[derive(Debug, Clone)]
pub struct Opt {
    pub(crate) long_name: Option<String>,
    pub(crate) short_name: Option<char>,
    pub(crate) arg_type: ArgType,
    pub(crate) val: i32,
    pub(crate) store_name: Option<String>,
    pub(crate) default_value: Option<StoredValue>,
}

impl Opt {
    /// An option matched as `--name`. An empty name gives a short-only
    /// option; add one with [`Opt::short`].
    pub fn new(name: &str) -> Self {
        Opt {
            long_name: (!name.is_empty()).then(|| name.to_string()),
            short_name: None,
            arg_type: ArgType::None,
            val: 0,
            store_name: None,
            default_value: None,
        }
    }

    pub fn short(mut self, c: char) -> Self {
        self.short_name = Some(c);
        self
    }

    pub fn arg_type(mut self, t: ArgType) -> Self {
        self.arg_type = t;
        self
    }

    /// Result code handed back by `next_opt` when this option matches.
    /// Zero (the default) keeps the option silent.
    pub fn set_val(mut self, v: i32) -> Self {
        self.val = v;
        self
    }

    pub fn store_as(mut self, name: &str) -> Self {
        self.store_name = Some(name.to_string());
        self
    }

    pub fn default_val<T: IntoStoredValue>(mut self, v: T) -> Self {
        self.default_value = Some(v.into_stored_value());
        self
    }

    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    pub fn short_name(&self) -> Option<char> {
        self.short_name
    }

    pub fn val(&self) -> i32 {
        self.val
    }

    pub fn takes_arg(&self) -> bool {
        self.arg_type != ArgType::None
    }

    /// Key the option's value lives under in the context.
    pub fn storage_key(&self) -> String {
        match (&self.store_name, &self.long_name, self.short_name) {
            (Some(s), _, _) => s.clone(),
            (None, Some(l), _) => l.clone(),
            (None, None, Some(c)) => c.to_string(),
            (None, None, None) => String::new(),
        }
    }

    /// `--long` if there is a long name, `-c` otherwise.
    pub fn canonical(&self) -> String {
        canonical_name(self.long_name.as_deref(), self.short_name)
    }

    /// Convert a raw value string according to the option's type.
    pub(crate) fn convert(&self, value: &str) -> Result<StoredValue> {
        match self.arg_type {
            ArgType::None => Ok(StoredValue::Bool(true)),
            ArgType::String => Ok(StoredValue::Str(value.to_string())),
            ArgType::Long => parse_long(value).map(StoredValue::Long),
            ArgType::Int => {
                let n = parse_long(value)?;
                let n = i32::try_from(n).map_err(|_| Error::Overflow(value.to_string()))?;
                Ok(StoredValue::Int(n))
            }
        }
    }
}

pub(crate) fn canonical_name(long: Option<&str>, short: Option<char>) -> String {
    match (long, short) {
        (Some(l), _) => format!("--{}", l),
        (None, Some(c)) => format!("-{}", c),
        (None, None) => String::new(),
    }
}

// ============================================================================
// OptionTable
// ============================================================================

/// Ordered option table. Lookups scan front to back, first match wins.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    options: Vec<Opt>,
}

impl OptionTable {
    pub fn new() -> Self {
        OptionTable {
            options: Vec::new(),
        }
    }

    pub fn option(mut self, opt: Opt) -> Self {
        self.options.push(opt);
        self
    }

    pub fn options(&self) -> &[Opt] {
        &self.options
    }

    pub fn find_long(&self, name: &str) -> Option<&Opt> {
        self.options
            .iter()
            .find(|o| o.long_name.as_deref() == Some(name))
    }

    pub fn find_short(&self, c: char) -> Option<&Opt> {
        self.options.iter().find(|o| o.short_name == Some(c))
    }
}

// ============================================================================
// Numeric conversion
// ============================================================================

/// Parse an integer the way C `strtol(s, &end, 0)` does, but strictly:
/// leading whitespace and a sign are allowed, `0x` selects hex and a
/// leading `0` octal, and anything left over is `BadNumber`. Results that
/// do not fit, or land exactly on `i64::MIN`/`i64::MAX`, are `Overflow`.
///
/// An empty string is 0, since `strtol` leaves `end` on the terminator.
pub fn parse_long(s: &str) -> Result<i64> {
    if s.is_empty() {
        return Ok(0);
    }
    let bad = || Error::BadNumber(s.to_string());

    let t = s.trim_start_matches(crate::tokenize::is_space);
    let (negative, t) = match t.as_bytes().first() {
        Some(b'-') => (true, &t[1..]),
        Some(b'+') => (false, &t[1..]),
        _ => (false, t),
    };
    let (radix, digits) = if let Some(hex) = t.strip_prefix("0x").or_else(|| t.strip_prefix("0X")) {
        (16, hex)
    } else if t.len() > 1 && t.starts_with('0') {
        (8, &t[1..])
    } else {
        (10, t)
    };
    if digits.is_empty() && radix != 8 {
        return Err(bad());
    }

    // Accumulate as a negative number so i64::MIN stays representable.
    let mut acc: i64 = 0;
    let mut overflow = false;
    for c in digits.chars() {
        let d = c.to_digit(radix).ok_or_else(bad)? as i64;
        if overflow {
            continue;
        }
        match acc.checked_mul(radix as i64).and_then(|v| v.checked_sub(d)) {
            Some(v) => acc = v,
            None => overflow = true,
        }
    }
    if overflow {
        return Err(Error::Overflow(s.to_string()));
    }

    let n = if negative {
        acc
    } else {
        acc.checked_neg()
            .ok_or_else(|| Error::Overflow(s.to_string()))?
    };
    if n == i64::MIN || n == i64::MAX {
        return Err(Error::Overflow(s.to_string()));
    }
    Ok(n)
}

// ============================================================================
// Conversions in and out of StoredValue
// ============================================================================

/// Trait for converting Rust values into StoredValue
pub trait IntoStoredValue {
    fn into_stored_value(self) -> StoredValue;
}

impl IntoStoredValue for i32 {
    fn into_stored_value(self) -> StoredValue {
        StoredValue::Int(self)
    }
}

impl IntoStoredValue for i64 {
    fn into_stored_value(self) -> StoredValue {
        StoredValue::Long(self)
    }
}

impl IntoStoredValue for &str {
    fn into_stored_value(self) -> StoredValue {
        StoredValue::Str(self.to_string())
    }
}

impl IntoStoredValue for String {
    fn into_stored_value(self) -> StoredValue {
        StoredValue::Str(self)
    }
}

impl IntoStoredValue for bool {
    fn into_stored_value(self) -> StoredValue {
        StoredValue::Bool(self)
    }
}

pub trait FromStoredValue: Sized {
    fn from_stored_value(v: &StoredValue) -> Result<Self>;
}

impl FromStoredValue for bool {
    fn from_stored_value(v: &StoredValue) -> Result<Self> {
        match v {
            StoredValue::Bool(b) => Ok(*b),
            StoredValue::Int(n) => Ok(*n != 0),
            _ => Err(Error::TypeMismatch("bool")),
        }
    }
}

impl FromStoredValue for i32 {
    fn from_stored_value(v: &StoredValue) -> Result<Self> {
        match v {
            StoredValue::Int(n) => Ok(*n),
            StoredValue::Bool(b) => Ok(i32::from(*b)),
            _ => Err(Error::TypeMismatch("i32")),
        }
    }
}

impl FromStoredValue for i64 {
    fn from_stored_value(v: &StoredValue) -> Result<Self> {
        match v {
            StoredValue::Long(n) => Ok(*n),
            StoredValue::Int(n) => Ok(i64::from(*n)),
            _ => Err(Error::TypeMismatch("i64")),
        }
    }
}

impl FromStoredValue for String {
    fn from_stored_value(v: &StoredValue) -> Result<Self> {
        match v {
            StoredValue::Str(s) => Ok(s.clone()),
            _ => Err(Error::TypeMismatch("String")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_and_signs() {
        assert_eq!(parse_long("42").unwrap(), 42);
        assert_eq!(parse_long("-17").unwrap(), -17);
        assert_eq!(parse_long("+5").unwrap(), 5);
        assert_eq!(parse_long("  7").unwrap(), 7);
        assert_eq!(parse_long("0").unwrap(), 0);
    }

    #[test]
    fn hex_and_octal() {
        assert_eq!(parse_long("0x1f").unwrap(), 31);
        assert_eq!(parse_long("0XFF").unwrap(), 255);
        assert_eq!(parse_long("010").unwrap(), 8);
        assert_eq!(parse_long("-0x10").unwrap(), -16);
    }

    #[test]
    fn trailing_garbage() {
        assert!(matches!(parse_long("abc"), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("12abc"), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("08"), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("0x"), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("7 "), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("-"), Err(Error::BadNumber(_))));
        assert!(matches!(parse_long("  "), Err(Error::BadNumber(_))));
    }

    #[test]
    fn empty_value_is_zero() {
        assert_eq!(parse_long("").unwrap(), 0);
    }

    #[test]
    fn garbage_wins_over_overflow() {
        assert!(matches!(
            parse_long("99999999999999999999x"),
            Err(Error::BadNumber(_))
        ));
    }

    #[test]
    fn range_limits() {
        assert!(matches!(
            parse_long("99999999999999999999"),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            parse_long("9223372036854775807"),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            parse_long("-9223372036854775808"),
            Err(Error::Overflow(_))
        ));
        assert_eq!(parse_long("9223372036854775806").unwrap(), i64::MAX - 1);
        assert_eq!(parse_long("-9223372036854775807").unwrap(), i64::MIN + 1);
    }

    #[test]
    fn int_conversion_checks_i32_range() {
        let opt = Opt::new("count").arg_type(ArgType::Int);
        assert_eq!(opt.convert("2147483647").unwrap(), StoredValue::Int(i32::MAX));
        assert!(matches!(opt.convert("2147483648"), Err(Error::Overflow(_))));
        assert!(matches!(opt.convert("-2147483649"), Err(Error::Overflow(_))));
    }

    #[test]
    fn names_and_keys() {
        let long = Opt::new("file").short('f');
        assert_eq!(long.canonical(), "--file");
        assert_eq!(long.storage_key(), "file");

        let short = Opt::new("").short('v');
        assert_eq!(short.long_name(), None);
        assert_eq!(short.canonical(), "-v");
        assert_eq!(short.storage_key(), "v");

        let shared = Opt::new("zip").store_as("postal");
        assert_eq!(shared.storage_key(), "postal");
    }

    #[test]
    fn first_match_wins() {
        let table = OptionTable::new()
            .option(Opt::new("dup").short('d').set_val(1))
            .option(Opt::new("dup").short('d').set_val(2));
        assert_eq!(table.find_long("dup").unwrap().val(), 1);
        assert_eq!(table.find_short('d').unwrap().val(), 1);
        assert!(table.find_long("other").is_none());
    }

    #[test]
    fn typed_retrieval() {
        assert!(bool::from_stored_value(&StoredValue::Bool(true)).unwrap());
        assert_eq!(i64::from_stored_value(&StoredValue::Int(3)).unwrap(), 3);
        assert!(matches!(
            String::from_stored_value(&StoredValue::Int(3)),
            Err(Error::TypeMismatch("String"))
        ));
    }
}
