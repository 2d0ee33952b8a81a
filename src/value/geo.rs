//! Multi-polygon geometry
//!
//! A multi-polygon is an ordered list of polygons, each an ordered list of
//! rings, each an ordered list of `(x, y)` points. Instead of four levels of
//! nested vectors it is stored as one flat point buffer plus two boundary
//! lists:
//!
//! - `ring_ends[r]` is one past the last point of ring `r`
//! - `polygon_ends[p]` is one past the last ring of polygon `p`
//!
//! Empty polygons and empty rings are allowed.
//!
//! # Text Form
//! `[` polygons `]`, polygon `[` rings `]`, ring `[` points `]`, point
//! `(x,y)`, with `,` between siblings and no whitespace, e.g.
//! `[[[(1.0,2.0),(3.0,4.0)]]]`. [`MultiPolygon::from_str`] accepts the same
//! form with optional whitespace.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde_json::Value as JsonValue;

use crate::error::{ClientError, Result};

/// One `(x, y)` coordinate pair
pub type Point = [f64; 2];

/// Flat multi-polygon storage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiPolygon {
    points: Vec<Point>,
    ring_ends: Vec<usize>,
    polygon_ends: Vec<usize>,
}

/// Borrowed view of one polygon
#[derive(Debug, Clone)]
pub struct Polygon<'a> {
    owner: &'a MultiPolygon,
    rings: Range<usize>,
}

impl<'a> Polygon<'a> {
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.rings.len()
    }

    /// Points of every ring, in order
    pub fn rings(&self) -> impl Iterator<Item = &'a [Point]> + 'a {
        let owner = self.owner;
        self.rings.clone().map(move |r| owner.ring_points(r))
    }
}

impl MultiPolygon {
    /// The empty multi-polygon
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new(), ring_ends: Vec::new(), polygon_ends: Vec::new() }
    }

    /// One polygon holding one ring holding one point
    #[must_use]
    pub fn point(point: Point) -> Self {
        Self { points: vec![point], ring_ends: vec![1], polygon_ends: vec![1] }
    }

    /// Build from nested coordinate arrays, checking every point has two values
    pub fn from_nested(polygons: &[Vec<Vec<Vec<f64>>>]) -> Result<Self> {
        let mut value = Self::new();
        for polygon in polygons {
            for ring in polygon {
                for point in ring {
                    match point.as_slice() {
                        [x, y] => value.points.push([*x, *y]),
                        _ => return Err(ClientError::invalid_point(format!("{point:?}"))),
                    }
                }
                value.ring_ends.push(value.points.len());
            }
            value.polygon_ends.push(value.ring_ends.len());
        }
        Ok(value)
    }

    /// Append a polygon given as rings of points
    pub fn push_polygon<R, P>(&mut self, rings: R) -> &mut Self
    where
        R: IntoIterator<Item = P>,
        P: IntoIterator<Item = Point>,
    {
        for ring in rings {
            self.points.extend(ring);
            self.ring_ends.push(self.points.len());
        }
        self.polygon_ends.push(self.ring_ends.len());
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygon_ends.is_empty()
    }

    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.polygon_ends.len()
    }

    /// Total number of points across all polygons
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn polygon(&self, index: usize) -> Option<Polygon<'_>> {
        let end = *self.polygon_ends.get(index)?;
        let start = if index == 0 { 0 } else { self.polygon_ends[index - 1] };
        Some(Polygon { owner: self, rings: start..end })
    }

    pub fn polygons(&self) -> impl Iterator<Item = Polygon<'_>> {
        (0..self.polygon_count()).filter_map(|i| self.polygon(i))
    }

    /// Point `point` of ring `ring` of polygon `polygon`
    #[must_use]
    pub fn point_at(&self, polygon: usize, ring: usize, point: usize) -> Option<Point> {
        self.point_index(polygon, ring, point).map(|i| self.points[i])
    }

    pub fn point_at_mut(&mut self, polygon: usize, ring: usize, point: usize) -> Option<&mut Point> {
        let i = self.point_index(polygon, ring, point)?;
        self.points.get_mut(i)
    }

    /// Every point in storage order
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    /// Nested coordinate arrays: polygon, ring, point, `[x, y]`
    #[must_use]
    pub fn to_nested(&self) -> Vec<Vec<Vec<Vec<f64>>>> {
        self.polygons()
            .map(|p| p.rings().map(|r| r.iter().map(|pt| pt.to_vec()).collect()).collect())
            .collect()
    }

    /// One JSON array per polygon
    #[must_use]
    pub fn to_json_polygons(&self) -> Vec<JsonValue> {
        self.polygons()
            .map(|p| {
                JsonValue::Array(
                    p.rings()
                        .map(|r| {
                            JsonValue::Array(
                                r.iter()
                                    .map(|[x, y]| JsonValue::Array(vec![JsonValue::from(*x), JsonValue::from(*y)]))
                                    .collect(),
                            )
                        })
                        .collect(),
                )
            })
            .collect()
    }

    fn ring_points(&self, ring: usize) -> &[Point] {
        let end = self.ring_ends[ring];
        let start = if ring == 0 { 0 } else { self.ring_ends[ring - 1] };
        &self.points[start..end]
    }

    fn point_index(&self, polygon: usize, ring: usize, point: usize) -> Option<usize> {
        let rings = self.polygon(polygon)?.rings;
        let ring = rings.start + ring;
        if ring >= rings.end {
            return None;
        }
        let end = self.ring_ends[ring];
        let start = if ring == 0 { 0 } else { self.ring_ends[ring - 1] };
        let i = start + point;
        (i < end).then_some(i)
    }
}

impl fmt::Display for MultiPolygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, polygon) in self.polygons().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            f.write_str("[")?;
            for (j, ring) in polygon.rings().enumerate() {
                if j > 0 {
                    f.write_str(",")?;
                }
                f.write_str("[")?;
                for (k, [x, y]) in ring.iter().enumerate() {
                    if k > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "({x:?},{y:?})")?;
                }
                f.write_str("]")?;
            }
            f.write_str("]")?;
        }
        f.write_str("]")
    }
}

impl FromStr for MultiPolygon {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parser = Parser { text: s, pos: 0 };
        let value = parser.multi_polygon()?;
        parser.skip_ws();
        if parser.pos != s.len() {
            return Err(parser.error("end of input"));
        }
        Ok(value)
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn error(&self, expected: &str) -> ClientError {
        ClientError::invalid_input(format!("Expected {expected} at offset {} of multi-polygon text", self.pos))
    }

    fn skip_ws(&mut self) {
        let rest = &self.text[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, ch: char) -> bool {
        self.skip_ws();
        if self.text[self.pos..].starts_with(ch) {
            self.pos += ch.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, ch: char) -> Result<()> {
        if self.eat(ch) {
            Ok(())
        } else {
            Err(self.error(&format!("'{ch}'")))
        }
    }

    /// `[` item (`,` item)* `]` or `[]`
    fn list(&mut self, mut item: impl FnMut(&mut Self) -> Result<()>) -> Result<()> {
        self.expect('[')?;
        if self.eat(']') {
            return Ok(());
        }
        loop {
            item(self)?;
            if self.eat(']') {
                return Ok(());
            }
            self.expect(',')?;
        }
    }

    fn number(&mut self) -> Result<f64> {
        self.skip_ws();
        let rest = &self.text[self.pos..];
        let len = rest.find([',', ')']).unwrap_or(rest.len());
        let token = rest[..len].trim();
        let value = token.parse().map_err(|_| ClientError::number_format(token))?;
        self.pos += len;
        Ok(value)
    }

    fn multi_polygon(&mut self) -> Result<MultiPolygon> {
        let mut value = MultiPolygon::new();
        self.list(|p| {
            p.list(|p| {
                p.list(|p| {
                    p.expect('(')?;
                    let x = p.number()?;
                    p.expect(',')?;
                    let y = p.number()?;
                    p.expect(')')?;
                    value.points.push([x, y]);
                    Ok(())
                })?;
                value.ring_ends.push(value.points.len());
                Ok(())
            })?;
            value.polygon_ends.push(value.ring_ends.len());
            Ok(())
        })?;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> MultiPolygon {
        let mut value = MultiPolygon::new();
        value
            .push_polygon([vec![[0.0, 0.0], [10.0, 0.0], [10.0, 10.0]], vec![[2.0, 2.0], [3.0, 3.0]]])
            .push_polygon(Vec::<Vec<Point>>::new())
            .push_polygon([vec![[-1.5, 2.25]]]);
        value
    }

    #[test]
    fn test_empty() {
        let value = MultiPolygon::new();
        assert!(value.is_empty());
        assert_eq!(value.to_string(), "[]");
        assert_eq!(value, MultiPolygon::default());
    }

    #[test]
    fn test_single_point() {
        let value = MultiPolygon::point([1.0, 2.0]);
        assert_eq!(value.polygon_count(), 1);
        assert_eq!(value.point_at(0, 0, 0), Some([1.0, 2.0]));
        assert_eq!(value.to_string(), "[[[(1.0,2.0)]]]");
    }

    #[test]
    fn test_layout() {
        let value = sample();
        assert_eq!(value.polygon_count(), 3);
        assert_eq!(value.point_count(), 6);
        assert_eq!(value.polygon(0).map(|p| p.ring_count()), Some(2));
        assert_eq!(value.polygon(1).map(|p| p.ring_count()), Some(0));
        assert!(value.polygon(3).is_none());
        assert_eq!(value.point_at(0, 1, 1), Some([3.0, 3.0]));
        assert_eq!(value.point_at(2, 0, 0), Some([-1.5, 2.25]));
        assert_eq!(value.point_at(0, 1, 2), None);
        assert_eq!(value.point_at(1, 0, 0), None);
    }

    #[test]
    fn test_polygon_view_clone() {
        let value = sample();
        let view = value.polygon(0).unwrap();
        let copy = view.clone();
        assert_eq!(copy.ring_count(), 2);
        assert_eq!(view.rings().collect::<Vec<_>>(), copy.rings().collect::<Vec<_>>());
        assert_eq!(view.rings().nth(1), Some(&[[2.0, 2.0], [3.0, 3.0]][..]));
    }

    #[test]
    fn test_nested_conversions() {
        let nested = vec![vec![vec![vec![1.0, 2.0], vec![3.0, 4.0]], vec![]], vec![]];
        let value = MultiPolygon::from_nested(&nested).unwrap();
        assert_eq!(value.to_nested(), nested);
        assert_eq!(value.to_string(), "[[[(1.0,2.0),(3.0,4.0)],[]],[]]");
    }

    #[test]
    fn test_nested_rejects_bad_point() {
        let nested = vec![vec![vec![vec![1.0, 2.0, 3.0]]]];
        let err = MultiPolygon::from_nested(&nested).unwrap_err();
        assert_eq!(err, ClientError::invalid_point("[1.0, 2.0, 3.0]"));
    }

    #[test]
    fn test_text_round_trip() {
        let value = sample();
        let text = value.to_string();
        assert_eq!(text, "[[[(0.0,0.0),(10.0,0.0),(10.0,10.0)],[(2.0,2.0),(3.0,3.0)]],[],[[(-1.5,2.25)]]]");
        assert_eq!(text.parse::<MultiPolygon>().unwrap(), value);
    }

    #[test]
    fn test_parse_whitespace_and_errors() {
        let value: MultiPolygon = " [ [ [ ( 1 , 2e3 ) ] ] ] ".parse().unwrap();
        assert_eq!(value.point_at(0, 0, 0), Some([1.0, 2000.0]));

        assert_eq!("[[[(1,x)]]]".parse::<MultiPolygon>().unwrap_err(), ClientError::number_format("x"));
        assert_eq!("[[[(1,2)]]".parse::<MultiPolygon>().unwrap_err().error_code(), "INVALID_INPUT");
        assert_eq!("[] []".parse::<MultiPolygon>().unwrap_err().error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_json_polygons() {
        let value = MultiPolygon::point([1.0, 2.0]);
        assert_eq!(value.to_json_polygons(), vec![serde_json::json!([[[1.0, 2.0]]])]);
    }

    #[test]
    fn test_mutation() {
        let mut value = sample();
        if let Some(p) = value.point_at_mut(0, 0, 1) {
            p[0] = 11.0;
        }
        assert_eq!(value.point_at(0, 0, 1), Some([11.0, 0.0]));
        value.points_mut()[0] = [5.0, 5.0];
        assert_eq!(value.points()[0], [5.0, 5.0]);
    }
}
