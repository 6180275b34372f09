//! Cell values.
//!
//! `Value` is the tagged union stored in every row cell regardless of which
//! index produced the row. `Value::Null` is the SQL NULL sentinel; it is the
//! smallest value under `Ord`, and index comparators decide where NULLs sort
//! in a scan through their `NullOrdering`.

use crate::types::DataType;
use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a row cell.
#[derive(Clone, Debug)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean value
    Boolean(bool),
    /// 32-bit signed integer
    Int32(i32),
    /// 64-bit signed integer
    Int64(i64),
    /// 64-bit floating point
    Float64(f64),
    /// UTF-8 string
    String(String),
    /// DateTime stored as Unix timestamp in milliseconds
    DateTime(i64),
    /// Binary data
    Bytes(Vec<u8>),
}

/// Numeric view of a value used for cross-type comparisons.
enum Numeric {
    Int(i64),
    Float(f64),
}

impl Value {
    /// The NULL sentinel.
    pub const NULL: Value = Value::Null;

    /// Returns the data type of this value, or None if it's Null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Int32(_) => Some(DataType::Int32),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float64(_) => Some(DataType::Float64),
            Value::String(_) => Some(DataType::String),
            Value::DateTime(_) => Some(DataType::DateTime),
            Value::Bytes(_) => Some(DataType::Bytes),
        }
    }

    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int32(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as i64 for either integer width.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int32(v) => Some(i64::from(*v)),
            Value::Int64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<i64> {
        match self {
            Value::DateTime(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Checks that this value can be stored in a column of the given type.
    /// NULL fits every type; nullability is checked by the column.
    pub fn fits(&self, dt: DataType) -> bool {
        match self.data_type() {
            None => true,
            Some(own) if own == dt => true,
            Some(DataType::Int32) => dt == DataType::Int64,
            Some(_) => false,
        }
    }

    fn numeric(&self) -> Option<Numeric> {
        match self {
            Value::Int32(v) => Some(Numeric::Int(i64::from(*v))),
            Value::Int64(v) => Some(Numeric::Int(*v)),
            Value::Float64(v) => Some(Numeric::Float(*v)),
            _ => None,
        }
    }

    /// Rank used to order values of unrelated types.
    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Boolean(_) => 1,
            Value::Int32(_) | Value::Int64(_) | Value::Float64(_) => 2,
            Value::String(_) => 3,
            Value::DateTime(_) => 4,
            Value::Bytes(_) => 5,
        }
    }
}

/// Total order on floats: NaN above everything, -0.0 equal to 0.0.
fn cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact comparison of an integer with a float. Casting the integer to
/// f64 would round above 2^53 and break transitivity.
fn cmp_int_f64(x: i64, y: f64) -> Ordering {
    // 2^63 as f64; the i64 range is [-2^63, 2^63).
    const BOUND: f64 = 9_223_372_036_854_775_808.0;
    if y.is_nan() || y >= BOUND {
        return Ordering::Less;
    }
    if y < -BOUND {
        return Ordering::Greater;
    }
    // In range, so the cast truncates toward zero without saturating.
    let whole = y as i64;
    match x.cmp(&whole) {
        Ordering::Equal => cmp_f64(whole as f64, y),
        unequal => unequal,
    }
}

fn cmp_numeric(a: Numeric, b: Numeric) -> Ordering {
    match (a, b) {
        (Numeric::Int(x), Numeric::Int(y)) => x.cmp(&y),
        (Numeric::Int(x), Numeric::Float(y)) => cmp_int_f64(x, y),
        (Numeric::Float(x), Numeric::Int(y)) => cmp_int_f64(y, x).reverse(),
        (Numeric::Float(x), Numeric::Float(y)) => cmp_f64(x, y),
    }
}

/// The integer a float is equal to under `Ord`, if any.
fn integral_f64(f: f64) -> Option<i64> {
    let whole = f as i64;
    (cmp_int_f64(whole, f) == Ordering::Equal).then_some(whole)
}

/// Equality follows `Ord`: numerics of different widths that compare equal
/// are equal, so keys built from either find each other in hash maps.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_rank().hash(state);
        match self {
            Value::Null => {}
            Value::Boolean(b) => b.hash(state),
            Value::Int32(i) => i64::from(*i).hash(state),
            Value::Int64(i) => i.hash(state),
            Value::Float64(f) => match integral_f64(*f) {
                Some(i) => i.hash(state),
                None if f.is_nan() => f64::NAN.to_bits().hash(state),
                None => f.to_bits().hash(state),
            },
            Value::String(s) => s.hash(state),
            Value::DateTime(d) => d.hash(state),
            Value::Bytes(b) => b.hash(state),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        if let (Some(a), Some(b)) = (self.numeric(), other.numeric()) {
            return cmp_numeric(a, b);
        }
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            (Value::Bytes(a), Value::Bytes(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Boolean(v) => write!(f, "{}", if *v { "TRUE" } else { "FALSE" }),
            Value::Int32(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::DateTime(v) => write!(f, "TIMESTAMP {}", v),
            Value::Bytes(v) => {
                f.write_str("X'")?;
                for b in v {
                    write!(f, "{:02x}", b)?;
                }
                f.write_str("'")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}
