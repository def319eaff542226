//! Decode AMap polyline strings (`lng,lat;lng,lat;...`)

use crate::core::types::LngLat;
use nom::character::complete::{char, space0};
use nom::combinator::{all_consuming, verify};
use nom::number::complete::double;
use nom::sequence::{delimited, separated_pair};
use nom::{IResult, Parser};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("bad coordinate {0:?}")]
pub struct PolylineError(pub String);

/// A finite decimal; `nan` and `inf` are not coordinates
fn coordinate(input: &str) -> IResult<&str, f64> {
    delimited(space0, verify(double, |v: &f64| v.is_finite()), space0).parse(input)
}

fn lng_lat(input: &str) -> IResult<&str, LngLat> {
    separated_pair(coordinate, char(','), coordinate)
        .map(|(lng, lat)| LngLat::new(lng, lat))
        .parse(input)
}

/// Parse one `lng,lat` pair
pub fn parse_point(segment: &str) -> Option<LngLat> {
    all_consuming(lng_lat).parse(segment).ok().map(|(_, p)| p)
}

fn segments(polyline: &str) -> impl Iterator<Item = &str> {
    polyline.split(';').filter(|s| !s.trim().is_empty())
}

/// Decode a polyline, failing on the first malformed coordinate
pub fn decode_strict(polyline: &str) -> Result<Vec<LngLat>, PolylineError> {
    segments(polyline)
        .map(|s| parse_point(s).ok_or_else(|| PolylineError(s.to_string())))
        .collect()
}

/// Decode a polyline, skipping malformed coordinates
///
/// Returns the decoded points and how many segments were dropped.
pub fn decode_lenient(polyline: &str) -> (Vec<LngLat>, usize) {
    let mut points = Vec::new();
    let mut skipped = 0;
    for segment in segments(polyline) {
        match parse_point(segment) {
            Some(p) => points.push(p),
            None => {
                tracing::debug!("Skipping bad polyline coordinate {:?}", segment);
                skipped += 1;
            }
        }
    }
    (points, skipped)
}
