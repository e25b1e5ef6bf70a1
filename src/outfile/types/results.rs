//! Decoded time series.
//!
//! A [`ResultSet`] holds, per entity class, one [`Series`] per entity in
//! catalog order, plus one series of system-wide values. A [`Period`] is the
//! raw block of one reporting period, as returned by random access.

use std::ops::{Index, Range};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::models::{EntityClass, EntityNames, VariableKey};

/// Values of one entity (or of the system) at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    timestamp: NaiveDateTime,
    keys: Arc<[VariableKey]>,
    values: Box<[f32]>,
}

impl TimeSeriesPoint {
    pub fn new(timestamp: NaiveDateTime, keys: Arc<[VariableKey]>, values: Box<[f32]>) -> Self {
        debug_assert_eq!(keys.len(), values.len());
        Self {
            timestamp,
            keys,
            values,
        }
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Value of a variable by name, or by raw code written in decimal.
    pub fn value(&self, label: &str) -> Option<f32> {
        let i = self.keys.iter().position(|k| k.matches(label))?;
        self.values.get(i).copied()
    }

    pub fn value_of(&self, key: &VariableKey) -> Option<f32> {
        let i = self.keys.iter().position(|k| k == key)?;
        self.values.get(i).copied()
    }

    pub fn keys(&self) -> &[VariableKey] {
        &self.keys
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (VariableKey, f32)> + '_ {
        self.keys.iter().copied().zip(self.values.iter().copied())
    }
}

/// Time-ordered points of one entity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<TimeSeriesPoint>,
}

impl Series {
    pub fn new(points: Vec<TimeSeriesPoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[TimeSeriesPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TimeSeriesPoint> {
        self.points.iter()
    }

    /// The point reported at exactly `timestamp`.
    pub fn at(&self, timestamp: NaiveDateTime) -> Option<&TimeSeriesPoint> {
        self.points
            .binary_search_by_key(&timestamp, |p| p.timestamp)
            .ok()
            .map(|i| &self.points[i])
    }

    /// `(timestamp, value)` pairs of one variable.
    pub fn values<'a>(&'a self, label: &'a str) -> impl Iterator<Item = (NaiveDateTime, f32)> + 'a {
        self.points
            .iter()
            .filter_map(move |p| p.value(label).map(|v| (p.timestamp, v)))
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a TimeSeriesPoint;
    type IntoIter = std::slice::Iter<'a, TimeSeriesPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Series of every entity of one class, addressable by name or index.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassSeries {
    names: EntityNames,
    series: Vec<Series>,
}

impl ClassSeries {
    pub fn new(names: EntityNames, series: Vec<Series>) -> Self {
        debug_assert_eq!(names.len(), series.len());
        Self { names, series }
    }

    pub fn empty(class: EntityClass) -> Self {
        Self {
            names: EntityNames::new(class, Vec::new()),
            series: Vec::new(),
        }
    }

    pub fn class(&self) -> EntityClass {
        self.names.class()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Series of a named entity. With duplicate names, the last one wins.
    pub fn get(&self, name: &str) -> Option<&Series> {
        self.names.index_of(name).and_then(|i| self.series.get(i))
    }

    pub fn by_index(&self, index: usize) -> Option<&Series> {
        self.series.get(index)
    }

    pub fn names(&self) -> &EntityNames {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Series)> {
        self.names.iter().zip(self.series.iter())
    }
}

impl Index<&str> for ClassSeries {
    type Output = Series;

    fn index(&self, name: &str) -> &Series {
        match self.get(name) {
            Some(series) => series,
            None => panic!("no {} named {:?}", self.class(), name),
        }
    }
}

/// Every decoded series of one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    pub(crate) subcatchments: ClassSeries,
    pub(crate) nodes: ClassSeries,
    pub(crate) links: ClassSeries,
    pub(crate) system: Series,
    pub(crate) timestamps: Vec<NaiveDateTime>,
}

impl ResultSet {
    pub fn subcatchments(&self) -> &ClassSeries {
        &self.subcatchments
    }

    pub fn nodes(&self) -> &ClassSeries {
        &self.nodes
    }

    pub fn links(&self) -> &ClassSeries {
        &self.links
    }

    pub fn system(&self) -> &Series {
        &self.system
    }

    pub fn class(&self, class: EntityClass) -> Option<&ClassSeries> {
        match class {
            EntityClass::Subcatchment => Some(&self.subcatchments),
            EntityClass::Node => Some(&self.nodes),
            EntityClass::Link => Some(&self.links),
            EntityClass::Pollutant => None,
        }
    }

    /// Timestamps of the decoded periods, in order.
    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn period_count(&self) -> usize {
        self.timestamps.len()
    }
}

/// Where one class's values sit inside a period's flat value block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpan {
    pub class: EntityClass,
    pub entities: usize,
    pub keys: Arc<[VariableKey]>,
    /// Index of the class's first value within the period block.
    pub start: usize,
}

impl ClassSpan {
    /// Values per entity.
    pub fn width(&self) -> usize {
        self.keys.len()
    }

    pub fn len(&self) -> usize {
        self.entities * self.width()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entity_range(&self, entity: usize) -> Option<Range<usize>> {
        (entity < self.entities).then(|| {
            let start = self.start + entity * self.width();
            start..start + self.width()
        })
    }
}

/// Shape of one period's value block, shared by every decoded period.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodShape {
    pub spans: Vec<ClassSpan>,
    pub system_keys: Arc<[VariableKey]>,
    pub system_start: usize,
    pub values_per_period: usize,
}

impl PeriodShape {
    pub fn span(&self, class: EntityClass) -> Option<&ClassSpan> {
        self.spans.iter().find(|s| s.class == class)
    }

    pub fn system_range(&self) -> Range<usize> {
        self.system_start..self.system_start + self.system_keys.len()
    }

    /// Byte length of one period: the timestamp plus every value.
    pub fn stride_bytes(&self) -> usize {
        8 + 4 * self.values_per_period
    }
}

/// One reporting period, decoded without touching its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub(crate) index: usize,
    pub(crate) offset: usize,
    pub(crate) serial_days: f64,
    pub(crate) timestamp: NaiveDateTime,
    pub(crate) values: Box<[f32]>,
    pub(crate) shape: Arc<PeriodShape>,
}

impl Period {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Byte offset of the period's timestamp.
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn serial_days(&self) -> f64 {
        self.serial_days
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.timestamp
    }

    /// Every value of the period in file order.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn entity_values(&self, class: EntityClass, entity: usize) -> Option<&[f32]> {
        let range = self.shape.span(class)?.entity_range(entity)?;
        self.values.get(range)
    }

    pub fn point(&self, class: EntityClass, entity: usize) -> Option<TimeSeriesPoint> {
        let span = self.shape.span(class)?;
        let values = self.values.get(span.entity_range(entity)?)?;
        Some(TimeSeriesPoint::new(
            self.timestamp,
            span.keys.clone(),
            values.into(),
        ))
    }

    pub fn system_values(&self) -> &[f32] {
        &self.values[self.shape.system_range()]
    }

    pub fn system_point(&self) -> TimeSeriesPoint {
        TimeSeriesPoint::new(
            self.timestamp,
            self.shape.system_keys.clone(),
            self.system_values().into(),
        )
    }
}
