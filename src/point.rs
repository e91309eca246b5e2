//! Geolocated result points and keyword multisets.
//!
//! A [`Point`] is one search hit: a WGS84 longitude/latitude, a relevance
//! score, and the keywords attached to it. Points are built once per query
//! response and never mutated; cluster labels are carried separately as a
//! parallel `Vec<i64>`.

use std::collections::{BTreeMap, HashSet};

use geo::{coord, Coord, Rect};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single geolocated search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Upstream entity id, if the response carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Longitude (x).
    pub lon: f64,
    /// Latitude (y).
    pub lat: f64,
    /// Relevance score.
    pub score: f64,
    /// Keywords attached to this hit (may repeat, may be empty).
    #[serde(default)]
    pub keywords: Vec<String>,
}

impl Point {
    /// Create a point without keywords.
    pub fn new(lon: f64, lat: f64, score: f64) -> Self {
        Self {
            id: None,
            lon,
            lat,
            score,
            keywords: Vec::new(),
        }
    }

    /// Create a point from a WKT `POINT(lon lat)` location string.
    pub fn from_wkt(location: &str, score: f64) -> Result<Self> {
        let (lon, lat) = parse_wkt_point(location)?;
        Ok(Self::new(lon, lat, score))
    }

    /// Set the upstream entity id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the keyword list.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// The coordinate as a `geo` coordinate (x = lon, y = lat).
    #[inline]
    pub fn coord(&self) -> Coord<f64> {
        coord! { x: self.lon, y: self.lat }
    }

    /// The coordinate as a plain pair, as fed to the density primitive.
    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Whether both coordinates are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }
}

/// Parse a WKT point literal such as `POINT(23.72 37.98)` into `(lon, lat)`.
///
/// The tag is matched case-insensitively and whitespace around the tag,
/// the parentheses, and the numbers is ignored.
pub fn parse_wkt_point(wkt: &str) -> Result<(f64, f64)> {
    let invalid = || Error::InvalidWkt(wkt.to_string());

    let trimmed = wkt.trim();
    let tag = trimmed.get(..5).ok_or_else(invalid)?;
    if !tag.eq_ignore_ascii_case("POINT") {
        return Err(invalid());
    }
    let body = trimmed[5..]
        .trim()
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let mut parts = body.split_whitespace();
    let lon: f64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    let lat: f64 = parts.next().and_then(|s| s.parse().ok()).ok_or_else(invalid)?;
    if parts.next().is_some() || !lon.is_finite() || !lat.is_finite() {
        return Err(invalid());
    }
    Ok((lon, lat))
}

/// Drop repeated hits, keeping the first occurrence of every id.
///
/// Points without an id are always kept. Order is preserved.
pub fn dedup_by_id(points: Vec<Point>) -> Vec<Point> {
    let mut seen = HashSet::new();
    points
        .into_iter()
        .filter(|p| match &p.id {
            Some(id) => seen.insert(id.clone()),
            None => true,
        })
        .collect()
}

/// Bounding box of all points, or `None` for an empty slice.
pub fn bounds(points: &[Point]) -> Option<Rect<f64>> {
    let first = points.first()?;
    let (mut min_x, mut min_y) = (first.lon, first.lat);
    let (mut max_x, mut max_y) = (first.lon, first.lat);
    for p in &points[1..] {
        min_x = min_x.min(p.lon);
        min_y = min_y.min(p.lat);
        max_x = max_x.max(p.lon);
        max_y = max_y.max(p.lat);
    }
    Some(Rect::new(
        coord! { x: min_x, y: min_y },
        coord! { x: max_x, y: max_y },
    ))
}

/// A multiset of keywords: keyword -> occurrence count.
///
/// Backed by a `BTreeMap` so iteration and serialization order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordBag {
    counts: BTreeMap<String, usize>,
}

impl KeywordBag {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one occurrence of `keyword`.
    pub fn insert(&mut self, keyword: impl Into<String>) {
        *self.counts.entry(keyword.into()).or_insert(0) += 1;
    }

    /// Occurrences of `keyword` (0 if absent).
    pub fn count(&self, keyword: &str) -> usize {
        self.counts.get(keyword).copied().unwrap_or(0)
    }

    /// Number of distinct keywords.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether the bag holds no keywords.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Total occurrences, counting multiplicity.
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Iterate `(keyword, count)` in keyword order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(k, &c)| (k.as_str(), c))
    }

    /// Multiset union: add every occurrence in `other` to `self`.
    pub fn merge(&mut self, other: &KeywordBag) {
        for (k, c) in other.iter() {
            *self.counts.entry(k.to_string()).or_insert(0) += c;
        }
    }

    /// A copy without the given stopwords (compared case-insensitively).
    pub fn without_stopwords(&self, stopwords: &[&str]) -> KeywordBag {
        let counts = self
            .counts
            .iter()
            .filter(|(k, _)| !stopwords.iter().any(|s| s.eq_ignore_ascii_case(k)))
            .map(|(k, &c)| (k.clone(), c))
            .collect();
        KeywordBag { counts }
    }

    /// The `k` most frequent keywords, ties broken alphabetically.
    pub fn top(&self, k: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries.truncate(k);
        entries
    }
}

impl<S: Into<String>> FromIterator<S> for KeywordBag {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut bag = KeywordBag::new();
        bag.extend(iter);
        bag
    }
}

impl<S: Into<String>> Extend<S> for KeywordBag {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for keyword in iter {
            self.insert(keyword);
        }
    }
}
