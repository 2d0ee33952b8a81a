//! Typed Value Containers
//!
//! A typed value holds exactly one payload of a fixed semantic kind and is
//! updated in place while rows are decoded, so one container can be reused
//! across many values.
//!
//! # Contract
//! Every kind implements [`DataValue`]:
//! - generic projections ([`DataValue::as_array`], [`DataValue::as_string`])
//!   that never mutate the container
//! - [`DataValue::absorb`], a type-checked update from any [`UpdateSource`]
//! - copies that are either shallow (payload shared) or deep
//!
//! An update either replaces the payload completely or fails before
//! touching it.
//!
//! # Update Sources
//! Inputs are a closed set of variants resolved by a single match in each
//! kind. New input shapes are added to [`UpdateSource`], never as ad hoc
//! methods on individual kinds.

pub mod geo;
pub mod multi_polygon;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::error::{ClientError, Result};

pub use geo::MultiPolygon;
pub use multi_polygon::MultiPolygonValue;

/// Semantic kind of a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Int128,
    Float32,
    Float64,
    Decimal,
    String,
    Uuid,
    Enum,
    IPv4,
    IPv6,
    Date,
    DateTime,
    Array,
    Tuple,
    Map,
    Point,
    Ring,
    Polygon,
    MultiPolygon,
}

impl ValueKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::Int8 => "Int8",
            Self::Int16 => "Int16",
            Self::Int32 => "Int32",
            Self::Int64 => "Int64",
            Self::Int128 => "Int128",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::Decimal => "Decimal",
            Self::String => "String",
            Self::Uuid => "UUID",
            Self::Enum => "Enum",
            Self::IPv4 => "IPv4",
            Self::IPv6 => "IPv6",
            Self::Date => "Date",
            Self::DateTime => "DateTime",
            Self::Array => "Array",
            Self::Tuple => "Tuple",
            Self::Map => "Map",
            Self::Point => "Point",
            Self::Ring => "Ring",
            Self::Polygon => "Polygon",
            Self::MultiPolygon => "MultiPolygon",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single driver-level value
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Bool(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    BigInteger(i128),
    Float(f32),
    Double(f64),
    /// `unscaled * 10^-scale`
    Decimal { unscaled: i128, scale: u32 },
    Str(String),
    Uuid(Uuid),
    /// Enum constant name
    Enum(String),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
}

impl Datum {
    /// Type name used in conversion errors
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "Boolean",
            Self::Char(_) => "Char",
            Self::Byte(_) => "Byte",
            Self::Short(_) => "Short",
            Self::Int(_) => "Integer",
            Self::Long(_) => "Long",
            Self::BigInteger(_) => "BigInteger",
            Self::Float(_) => "Float",
            Self::Double(_) => "Double",
            Self::Decimal { .. } => "BigDecimal",
            Self::Str(_) => "String",
            Self::Uuid(_) => "UUID",
            Self::Enum(_) => "Enum",
            Self::Ipv4(_) => "Inet4Address",
            Self::Ipv6(_) => "Inet6Address",
            Self::Date(_) => "Date",
            Self::Time(_) => "Time",
            Self::DateTime(_) => "DateTime",
        }
    }

    /// Numeric value, `None` for non-numeric data
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Byte(v) => Some(f64::from(v)),
            Self::Short(v) => Some(f64::from(v)),
            Self::Int(v) => Some(f64::from(v)),
            Self::Long(v) => Some(v as f64),
            Self::BigInteger(v) => Some(v as f64),
            Self::Float(v) => Some(f64::from(v)),
            Self::Double(v) => Some(v),
            Self::Decimal { unscaled, scale } => {
                Some(unscaled as f64 / 10f64.powi(i32::try_from(scale).unwrap_or(i32::MAX)))
            }
            _ => None,
        }
    }
}

/// Largest scale rendered in plain notation; an `i128` has at most 39 digits
const MAX_PLAIN_SCALE: u32 = 38;

fn fmt_decimal(f: &mut fmt::Formatter<'_>, unscaled: i128, scale: u32) -> fmt::Result {
    let digits = unscaled.unsigned_abs().to_string();
    let sign = if unscaled < 0 { "-" } else { "" };
    if scale > MAX_PLAIN_SCALE {
        return write!(f, "{sign}{digits}E-{scale}");
    }
    let scale = scale as usize;
    if scale == 0 {
        return write!(f, "{sign}{digits}");
    }
    let padded = format!("{digits:0>width$}", width = scale + 1);
    let (int, frac) = padded.split_at(padded.len() - scale);
    write!(f, "{sign}{int}.{frac}")
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Char(v) => write!(f, "{v}"),
            Self::Byte(v) => write!(f, "{v}"),
            Self::Short(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Long(v) => write!(f, "{v}"),
            Self::BigInteger(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Decimal { unscaled, scale } => fmt_decimal(f, *unscaled, *scale),
            Self::Str(v) | Self::Enum(v) => f.write_str(v),
            Self::Uuid(v) => write!(f, "{v}"),
            Self::Ipv4(v) => write!(f, "{v}"),
            Self::Ipv6(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{v}"),
            Self::Time(v) => write!(f, "{v}"),
            Self::DateTime(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! datum_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Datum {
                fn from(v: $ty) -> Self {
                    Self::$variant(v)
                }
            }
        )*
    };
}

datum_from!(
    bool => Bool,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    i128 => BigInteger,
    f32 => Float,
    f64 => Double,
    String => Str,
    Uuid => Uuid,
    Ipv4Addr => Ipv4,
    Ipv6Addr => Ipv6,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
);

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

/// Borrowed array of primitive values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PrimitiveArray<'a> {
    Bool(&'a [bool]),
    Char(&'a [char]),
    Byte(&'a [i8]),
    Short(&'a [i16]),
    Int(&'a [i32]),
    Long(&'a [i64]),
    Float(&'a [f32]),
    Double(&'a [f64]),
}

impl PrimitiveArray<'_> {
    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Bool(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Byte(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Elements widened to `f64`
    ///
    /// Booleans become `1.0`/`0.0` and characters their code point.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64_vec(&self) -> Vec<f64> {
        match self {
            // Both coordinates map true to 1.0. Earlier clients inverted the
            // second one (true to 0.0); that asymmetry is not reproduced.
            Self::Bool(v) => v.iter().map(|b| if *b { 1.0 } else { 0.0 }).collect(),
            Self::Char(v) => v.iter().map(|c| f64::from(u32::from(*c))).collect(),
            Self::Byte(v) => v.iter().copied().map(f64::from).collect(),
            Self::Short(v) => v.iter().copied().map(f64::from).collect(),
            Self::Int(v) => v.iter().copied().map(f64::from).collect(),
            Self::Long(v) => v.iter().map(|x| *x as f64).collect(),
            Self::Float(v) => v.iter().copied().map(f64::from).collect(),
            Self::Double(v) => v.to_vec(),
        }
    }

    /// Array text as shown in diagnostics, e.g. `[1, 2, 3]`
    #[must_use]
    pub fn describe(&self) -> String {
        fn join<T>(items: &[T], show: impl Fn(&T) -> String) -> String {
            format!("[{}]", items.iter().map(show).collect::<Vec<_>>().join(", "))
        }
        match self {
            Self::Bool(v) => join(v, ToString::to_string),
            Self::Char(v) => join(v, ToString::to_string),
            Self::Byte(v) => join(v, ToString::to_string),
            Self::Short(v) => join(v, ToString::to_string),
            Self::Int(v) => join(v, ToString::to_string),
            Self::Long(v) => join(v, ToString::to_string),
            Self::Float(v) => join(v, |x| format!("{x:?}")),
            Self::Double(v) => join(v, |x| format!("{x:?}")),
        }
    }
}

/// Input a typed value can be updated from
pub enum UpdateSource<'a> {
    /// Database NULL; resets the container to its null or empty state
    Null,
    /// A single scalar
    Scalar(Datum),
    /// A fixed-size array of primitives
    Primitives(PrimitiveArray<'a>),
    /// A generic collection
    Collection(&'a [Datum]),
    /// A forward-only cursor; only as many elements as needed are consumed
    Sequence(&'a mut dyn Iterator<Item = Datum>),
    /// Key/value pairs in key order; the values are used
    Mapping(&'a [(Datum, Datum)]),
    /// Another typed value, of this kind or any other
    Value(&'a dyn DataValue),
    /// A raw generic array, such as the `as_array` projection of a value
    Array(&'a [JsonValue]),
    /// Polygons as nested coordinate arrays: polygon, ring, point, `[x, y]`
    Nested(&'a [Vec<Vec<Vec<f64>>>]),
    /// Anything else; matched by downcasting
    Object(&'a dyn Any),
}

impl fmt::Debug for UpdateSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Scalar(v) => f.debug_tuple("Scalar").field(v).finish(),
            Self::Primitives(v) => f.debug_tuple("Primitives").field(v).finish(),
            Self::Collection(v) => f.debug_tuple("Collection").field(v).finish(),
            Self::Sequence(_) => f.write_str("Sequence(..)"),
            Self::Mapping(v) => f.debug_tuple("Mapping").field(v).finish(),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
            Self::Array(v) => f.debug_tuple("Array").field(v).finish(),
            Self::Nested(v) => f.debug_tuple("Nested").field(v).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

macro_rules! scalar_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for UpdateSource<'_> {
                fn from(v: $ty) -> Self {
                    Self::Scalar(Datum::from(v))
                }
            }
        )*
    };
}

scalar_source!(
    bool, char, i8, i16, i32, i64, i128, f32, f64, String, &str, Uuid, Ipv4Addr, Ipv6Addr, NaiveDate, NaiveTime,
    NaiveDateTime,
);

impl From<Datum> for UpdateSource<'_> {
    fn from(v: Datum) -> Self {
        Self::Scalar(v)
    }
}

macro_rules! primitive_source {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<&'a [$ty]> for UpdateSource<'a> {
                fn from(v: &'a [$ty]) -> Self {
                    Self::Primitives(PrimitiveArray::$variant(v))
                }
            }

            impl<'a, const N: usize> From<&'a [$ty; N]> for UpdateSource<'a> {
                fn from(v: &'a [$ty; N]) -> Self {
                    Self::Primitives(PrimitiveArray::$variant(v))
                }
            }

            impl<'a> From<&'a Vec<$ty>> for UpdateSource<'a> {
                fn from(v: &'a Vec<$ty>) -> Self {
                    Self::Primitives(PrimitiveArray::$variant(v))
                }
            }
        )*
    };
}

primitive_source!(
    bool => Bool,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
);

impl<'a> From<&'a [Datum]> for UpdateSource<'a> {
    fn from(v: &'a [Datum]) -> Self {
        Self::Collection(v)
    }
}

impl<'a> From<&'a Vec<Datum>> for UpdateSource<'a> {
    fn from(v: &'a Vec<Datum>) -> Self {
        Self::Collection(v)
    }
}

impl<'a> From<&'a [(Datum, Datum)]> for UpdateSource<'a> {
    fn from(v: &'a [(Datum, Datum)]) -> Self {
        Self::Mapping(v)
    }
}

impl<'a> From<&'a [JsonValue]> for UpdateSource<'a> {
    fn from(v: &'a [JsonValue]) -> Self {
        Self::Array(v)
    }
}

impl<'a> From<&'a Vec<JsonValue>> for UpdateSource<'a> {
    fn from(v: &'a Vec<JsonValue>) -> Self {
        Self::Array(v)
    }
}

impl<'a> From<&'a [Vec<Vec<Vec<f64>>>]> for UpdateSource<'a> {
    fn from(v: &'a [Vec<Vec<Vec<f64>>>]) -> Self {
        Self::Nested(v)
    }
}

impl<'a> From<&'a Vec<Vec<Vec<Vec<f64>>>>> for UpdateSource<'a> {
    fn from(v: &'a Vec<Vec<Vec<Vec<f64>>>>) -> Self {
        Self::Nested(v)
    }
}

impl<'a> From<&'a dyn DataValue> for UpdateSource<'a> {
    fn from(v: &'a dyn DataValue) -> Self {
        Self::Value(v)
    }
}

impl<'a> From<&'a MultiPolygonValue> for UpdateSource<'a> {
    fn from(v: &'a MultiPolygonValue) -> Self {
        Self::Value(v)
    }
}

/// A mutable, strongly-typed value holder
pub trait DataValue: fmt::Debug {
    /// Semantic kind of the payload
    fn kind(&self) -> ValueKind;

    /// Whether the kind has a null state distinct from empty
    fn is_nullable(&self) -> bool {
        true
    }

    fn is_null_or_empty(&self) -> bool;

    /// Payload as a generic array
    fn as_array(&self) -> Vec<JsonValue>;

    /// Payload as text
    fn as_string(&self) -> String;

    /// Payload as a SQL literal
    fn to_sql_expression(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    /// Copy the container; a shallow copy shares the payload
    fn copy_value(&self, deep: bool) -> Box<dyn DataValue>;

    fn reset_to_null_or_empty(&mut self);

    /// Replace the payload from `source`, leaving it untouched on error
    fn absorb(&mut self, source: UpdateSource<'_>) -> Result<()>;

    /// [`DataValue::absorb`] with conversion into an [`UpdateSource`]
    fn update<'s>(&mut self, source: impl Into<UpdateSource<'s>>) -> Result<&mut Self>
    where
        Self: Sized,
    {
        self.absorb(source.into())?;
        Ok(self)
    }

    /// Array projection with each element deserialized as `T`
    fn as_array_of<T: DeserializeOwned>(&self) -> Result<Vec<T>>
    where
        Self: Sized,
    {
        self.as_array()
            .into_iter()
            .map(|v| {
                serde_json::from_value(v)
                    .map_err(|e| ClientError::invalid_input(format!("Cannot project {} element: {e}", self.kind())))
            })
            .collect()
    }

    /// Map projection keyed by 1-based element position
    fn as_map_of<K, V>(&self) -> Result<BTreeMap<K, V>>
    where
        Self: Sized,
        K: DeserializeOwned + Ord,
        V: DeserializeOwned,
    {
        let mut map = BTreeMap::new();
        for (i, v) in self.as_array().into_iter().enumerate() {
            let key = serde_json::from_value(JsonValue::from(i + 1))
                .map_err(|e| ClientError::invalid_input(format!("Cannot project map key {}: {e}", i + 1)))?;
            let value = serde_json::from_value(v)
                .map_err(|e| ClientError::invalid_input(format!("Cannot project {} element: {e}", self.kind())))?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// An element that can be read as one coordinate
pub(crate) trait Coordinate {
    fn coordinate(&self) -> Result<f64>;

    fn describe(&self) -> String;
}

impl<T: Coordinate + ?Sized> Coordinate for &T {
    fn coordinate(&self) -> Result<f64> {
        (**self).coordinate()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

impl Coordinate for Datum {
    /// Numbers are used directly, anything else is parsed from its text
    fn coordinate(&self) -> Result<f64> {
        if let Some(v) = self.as_f64() {
            return Ok(v);
        }
        let text = self.to_string();
        text.trim().parse().map_err(|_| ClientError::number_format(text))
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl Coordinate for JsonValue {
    fn coordinate(&self) -> Result<f64> {
        match self {
            Self::Number(n) => n.as_f64().ok_or_else(|| ClientError::number_format(n.to_string())),
            Self::String(s) => s.trim().parse().map_err(|_| ClientError::number_format(s.clone())),
            other => Err(ClientError::number_format(other.to_string())),
        }
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl Coordinate for f64 {
    fn coordinate(&self) -> Result<f64> {
        Ok(*self)
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

pub(crate) fn describe_all<T: Coordinate>(items: &[T]) -> String {
    format!("[{}]", items.iter().map(Coordinate::describe).collect::<Vec<_>>().join(", "))
}

/// Read exactly two elements as an `(x, y)` point
pub(crate) fn point_of<T: Coordinate>(items: &[T]) -> Result<[f64; 2]> {
    match items {
        [x, y] => Ok([x.coordinate()?, y.coordinate()?]),
        _ => Err(ClientError::invalid_point(describe_all(items))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datum_numbers() {
        assert_eq!(Datum::Int(3).as_f64(), Some(3.0));
        assert_eq!(Datum::Decimal { unscaled: -12_345, scale: 2 }.as_f64(), Some(-123.45));
        assert_eq!(Datum::Str("1".into()).as_f64(), None);
    }

    #[test]
    fn test_datum_display() {
        assert_eq!(Datum::Double(1.0).to_string(), "1.0");
        assert_eq!(Datum::Decimal { unscaled: -5, scale: 3 }.to_string(), "-0.005");
        assert_eq!(Datum::Decimal { unscaled: 12_345, scale: 2 }.to_string(), "123.45");
        assert_eq!(Datum::Decimal { unscaled: 7, scale: 0 }.to_string(), "7");
        assert_eq!(Datum::Decimal { unscaled: 1, scale: 38 }.to_string().len(), 40);
        assert_eq!(Datum::Decimal { unscaled: -42, scale: u32::MAX }.to_string(), "-42E-4294967295");
        assert_eq!(Datum::from(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()).to_string(), "2024-02-29");
    }

    #[test]
    fn test_coordinate_from_text() {
        assert_eq!(Datum::Str(" 2.5 ".into()).coordinate().unwrap(), 2.5);
        assert_eq!(Datum::Char('7').coordinate().unwrap(), 7.0);
        let err = Datum::Bool(true).coordinate().unwrap_err();
        assert_eq!(err, ClientError::number_format("true"));
        assert_eq!(JsonValue::from("3").coordinate().unwrap(), 3.0);
        assert!(JsonValue::Null.coordinate().is_err());
    }

    #[test]
    fn test_point_arity() {
        assert_eq!(point_of(&[1.0, 2.0]).unwrap(), [1.0, 2.0]);
        let err = point_of(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err, ClientError::invalid_point("[1.0, 2.0, 3.0]"));
        assert!(point_of::<f64>(&[]).is_err());
    }

    #[test]
    fn test_primitive_arrays() {
        let bools = PrimitiveArray::Bool(&[true, false]);
        assert_eq!(bools.to_f64_vec(), vec![1.0, 0.0]);
        assert_eq!(PrimitiveArray::Bool(&[false, true]).to_f64_vec(), vec![0.0, 1.0]);
        assert_eq!(PrimitiveArray::Char(&['A', 'a']).to_f64_vec(), vec![65.0, 97.0]);
        assert_eq!(PrimitiveArray::Int(&[1, 2, 3]).describe(), "[1, 2, 3]");
        assert_eq!(PrimitiveArray::Double(&[1.5]).describe(), "[1.5]");
        assert!(PrimitiveArray::Long(&[]).is_empty());
    }

    #[test]
    fn test_source_conversions() {
        assert!(matches!(UpdateSource::from(5), UpdateSource::Scalar(Datum::Int(5))));
        assert!(matches!(UpdateSource::from("x"), UpdateSource::Scalar(Datum::Str(_))));
        assert!(matches!(
            UpdateSource::from(&[1.0f64, 2.0]),
            UpdateSource::Primitives(PrimitiveArray::Double(_))
        ));
        let items = vec![Datum::Int(1)];
        assert!(matches!(UpdateSource::from(&items), UpdateSource::Collection(_)));
    }
}
