//! Multi-polygon typed value
//!
//! The payload is never absent: database NULL is represented by the empty
//! multi-polygon. Updates follow the point rule: any input that is not a
//! whole multi-polygon must hold exactly two coordinates and becomes a
//! single-point multi-polygon.

use std::any::Any;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use crate::error::{ClientError, Result};

use super::geo::{MultiPolygon, Point};
use super::{point_of, Coordinate, DataValue, Datum, PrimitiveArray, UpdateSource, ValueKind};

/// Container of one [`MultiPolygon`]
///
/// Shallow copies share the payload; it is copied on the first mutation, so
/// changes through one copy are never visible through another.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiPolygonValue {
    value: Arc<MultiPolygon>,
}

fn unsupported(from: &str) -> ClientError {
    ClientError::unsupported_conversion(from, ValueKind::MultiPolygon.as_str())
}

fn primitive_point(array: &PrimitiveArray<'_>) -> Result<Point> {
    match array.to_f64_vec().as_slice() {
        [x, y] => Ok([*x, *y]),
        _ => Err(ClientError::invalid_point(array.describe())),
    }
}

/// Read at most three elements so a third one can be reported
fn sequence_point(items: &mut dyn Iterator<Item = Datum>) -> Result<Point> {
    let taken: Vec<Datum> = items.take(3).collect();
    match point_of(&taken) {
        Err(_) if taken.len() == 3 => {
            let mut shown = super::describe_all(&taken);
            shown.insert_str(shown.len() - 1, ", ...");
            Err(ClientError::invalid_point(shown))
        }
        other => other,
    }
}

/// A JSON array is either a whole multi-polygon (every element an array) or
/// a single point
fn array_value(items: &[JsonValue]) -> Result<MultiPolygon> {
    if !items.is_empty() && items.iter().all(JsonValue::is_array) {
        return nested_json(items);
    }
    point_of(items).map(MultiPolygon::point)
}

fn nested_json(polygons: &[JsonValue]) -> Result<MultiPolygon> {
    fn elements<'a>(value: &'a JsonValue, level: &str) -> Result<&'a Vec<JsonValue>> {
        value
            .as_array()
            .ok_or_else(|| ClientError::invalid_input(format!("Expected an array of {level}, got {value}")))
    }

    let mut value = MultiPolygon::new();
    for polygon in polygons {
        let mut rings = Vec::new();
        for ring in elements(polygon, "rings")? {
            let mut points = Vec::new();
            for point in elements(ring, "points")? {
                match elements(point, "coordinates")?.as_slice() {
                    [x, y] => points.push([x.coordinate()?, y.coordinate()?]),
                    _ => return Err(ClientError::invalid_point(point.to_string())),
                }
            }
            rings.push(points);
        }
        value.push_polygon(rings);
    }
    Ok(value)
}

impl MultiPolygonValue {
    /// Container holding the empty multi-polygon
    #[must_use]
    pub fn of_empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of(value: MultiPolygon) -> Self {
        Self { value: Arc::new(value) }
    }

    /// Container from nested coordinate arrays
    pub fn of_nested(polygons: &[Vec<Vec<Vec<f64>>>]) -> Result<Self> {
        MultiPolygon::from_nested(polygons).map(Self::of)
    }

    /// Update `reference` in place when given, otherwise create a new container
    pub fn of_reference(reference: Option<&mut Self>, value: MultiPolygon) -> Self {
        match reference {
            Some(existing) => existing.set(value).clone(),
            None => Self::of(value),
        }
    }

    #[must_use]
    pub fn value(&self) -> &MultiPolygon {
        &self.value
    }

    /// Replace the payload
    pub fn set(&mut self, value: MultiPolygon) -> &mut Self {
        match Arc::get_mut(&mut self.value) {
            Some(slot) => *slot = value,
            None => self.value = Arc::new(value),
        }
        self
    }

    /// Mutable payload, detached from any copy sharing it
    pub fn value_mut(&mut self) -> &mut MultiPolygon {
        Arc::make_mut(&mut self.value)
    }

    /// Copy the container; a deep copy owns a separate payload immediately
    #[must_use]
    pub fn copy(&self, deep: bool) -> Self {
        if deep {
            Self::of(MultiPolygon::clone(&self.value))
        } else {
            self.clone()
        }
    }

    /// Whether both containers currently share one payload
    #[must_use]
    pub fn shares_payload_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }

    fn adopt(&mut self, other: &Self) {
        self.value = Arc::clone(&other.value);
    }

    fn absorb_object(&mut self, object: &dyn Any) -> Result<()> {
        if let Some(value) = object.downcast_ref::<Self>() {
            return self.absorb(UpdateSource::Value(value));
        }
        if let Some(value) = object.downcast_ref::<MultiPolygon>() {
            self.set(value.clone());
            return Ok(());
        }
        if let Some(nested) = object.downcast_ref::<Vec<Vec<Vec<Vec<f64>>>>>() {
            return self.absorb(UpdateSource::Nested(nested));
        }
        if let Some(point) = object.downcast_ref::<Point>() {
            self.set(MultiPolygon::point(*point));
            return Ok(());
        }
        if let Some(&(x, y)) = object.downcast_ref::<(f64, f64)>() {
            self.set(MultiPolygon::point([x, y]));
            return Ok(());
        }
        if let Some(items) = object.downcast_ref::<Vec<f64>>() {
            return self.absorb(UpdateSource::Primitives(PrimitiveArray::Double(items)));
        }
        if let Some(items) = object.downcast_ref::<Vec<Datum>>() {
            return self.absorb(UpdateSource::Collection(items));
        }
        if let Some(items) = object.downcast_ref::<Vec<JsonValue>>() {
            return self.absorb(UpdateSource::Array(items));
        }
        if let Some(datum) = object.downcast_ref::<Datum>() {
            return Err(unsupported(datum.type_name()));
        }
        if object.is::<String>() || object.is::<&str>() {
            return Err(unsupported("String"));
        }
        Err(unsupported("Object"))
    }
}

impl From<MultiPolygon> for MultiPolygonValue {
    fn from(value: MultiPolygon) -> Self {
        Self::of(value)
    }
}

impl DataValue for MultiPolygonValue {
    fn kind(&self) -> ValueKind {
        ValueKind::MultiPolygon
    }

    fn is_nullable(&self) -> bool {
        false
    }

    fn is_null_or_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn as_array(&self) -> Vec<JsonValue> {
        self.value.to_json_polygons()
    }

    fn as_string(&self) -> String {
        self.value.to_string()
    }

    fn to_sql_expression(&self) -> String {
        self.value.to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn copy_value(&self, deep: bool) -> Box<dyn DataValue> {
        Box::new(self.copy(deep))
    }

    fn reset_to_null_or_empty(&mut self) {
        self.set(MultiPolygon::new());
    }

    fn absorb(&mut self, source: UpdateSource<'_>) -> Result<()> {
        let value = match source {
            UpdateSource::Null => MultiPolygon::new(),
            // a point needs two coordinates, a single value never fits
            UpdateSource::Scalar(datum) => return Err(unsupported(datum.type_name())),
            UpdateSource::Primitives(array) => MultiPolygon::point(primitive_point(&array)?),
            UpdateSource::Collection(items) => MultiPolygon::point(point_of(items)?),
            UpdateSource::Sequence(items) => MultiPolygon::point(sequence_point(items)?),
            UpdateSource::Mapping(pairs) => {
                let values: Vec<&Datum> = pairs.iter().map(|(_, v)| v).collect();
                MultiPolygon::point(point_of(&values)?)
            }
            UpdateSource::Value(other) => {
                if other.is_null_or_empty() {
                    MultiPolygon::new()
                } else if let Some(same) = other.as_any().downcast_ref::<Self>() {
                    self.adopt(same);
                    return Ok(());
                } else {
                    array_value(&other.as_array())?
                }
            }
            UpdateSource::Array(items) => array_value(items)?,
            UpdateSource::Nested(polygons) => MultiPolygon::from_nested(polygons)?,
            UpdateSource::Object(object) => return self.absorb_object(object),
        };
        self.set(value);
        Ok(())
    }
}
