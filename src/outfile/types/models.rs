//! Core data structures for the output file segments.
//!
//! This module defines the values produced by the forward pass:
//! - Prolog and entity counts
//! - Entity name catalog
//! - Static property tables
//! - Resolved variable codes
//! - Trailer and reporting block

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::profile::{
    ConcentrationUnits, Dialect, FlowUnits, HeaderField, PropertyField, VariableTable,
};

/// Entity classes that carry names in the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityClass {
    Subcatchment,
    Node,
    Link,
    Pollutant,
}

impl EntityClass {
    /// The variable scope results of this class are labelled with.
    /// Pollutants have no per-period block of their own.
    pub fn scope(&self) -> Option<VariableScope> {
        match self {
            EntityClass::Subcatchment => Some(VariableScope::Subcatchment),
            EntityClass::Node => Some(VariableScope::Node),
            EntityClass::Link => Some(VariableScope::Link),
            EntityClass::Pollutant => None,
        }
    }
}

impl fmt::Display for EntityClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityClass::Subcatchment => write!(f, "subcatchment"),
            EntityClass::Node => write!(f, "node"),
            EntityClass::Link => write!(f, "link"),
            EntityClass::Pollutant => write!(f, "pollutant"),
        }
    }
}

/// Scopes that own a list of result-variable codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    Subcatchment,
    Node,
    Link,
    System,
}

impl fmt::Display for VariableScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableScope::Subcatchment => write!(f, "subcatchment"),
            VariableScope::Node => write!(f, "node"),
            VariableScope::Link => write!(f, "link"),
            VariableScope::System => write!(f, "system"),
        }
    }
}

/// Label of one result float.
///
/// Codes found in the static table resolve to a name; anything else (usually
/// a pollutant-concentration slot) keeps its numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableKey {
    Named(&'static str),
    Code(i32),
}

impl VariableKey {
    /// True if `label` is this key's name, or its code written in decimal.
    pub fn matches(&self, label: &str) -> bool {
        match self {
            VariableKey::Named(name) => *name == label,
            VariableKey::Code(code) => label.parse::<i32>().is_ok_and(|c| c == *code),
        }
    }
}

impl fmt::Display for VariableKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            VariableKey::Named(name) => f.write_str(name),
            VariableKey::Code(code) => write!(f, "{}", code),
        }
    }
}

/// Entity counts declared by the prolog.
///
/// Fields a dialect does not declare stay at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub subcatchments: usize,
    pub nodes: usize,
    pub links: usize,
    pub pollutants: usize,
    pub tanks: usize,
    pub pumps: usize,
    pub valves: usize,
}

impl EntityCounts {
    pub fn count(&self, class: EntityClass) -> usize {
        match class {
            EntityClass::Subcatchment => self.subcatchments,
            EntityClass::Node => self.nodes,
            EntityClass::Link => self.links,
            EntityClass::Pollutant => self.pollutants,
        }
    }

    /// Nodes that are neither tanks nor reservoirs.
    pub fn junctions(&self) -> usize {
        self.nodes.saturating_sub(self.tanks)
    }

    /// Links that are neither pumps nor valves.
    pub fn pipes(&self) -> usize {
        self.links.saturating_sub(self.pumps + self.valves)
    }
}

/// Decoded fixed-size header.
#[derive(Debug, Clone, PartialEq)]
pub struct Prolog {
    pub dialect: Dialect,
    pub format_id: i32,
    pub version: i32,
    pub flow_unit_code: i32,
    /// `None` if the code is not in the dialect's flow-unit table.
    pub flow_units: Option<FlowUnits>,
    pub counts: EntityCounts,
}

impl Prolog {
    /// Raw value of one prolog slot, as it is stored on disk.
    pub fn field(&self, field: HeaderField) -> i64 {
        let counts = &self.counts;
        match field {
            HeaderField::FormatId => self.format_id as i64,
            HeaderField::Version => self.version as i64,
            HeaderField::FlowUnits => self.flow_unit_code as i64,
            HeaderField::Subcatchments => counts.subcatchments as i64,
            HeaderField::Nodes => counts.nodes as i64,
            HeaderField::Tanks => counts.tanks as i64,
            HeaderField::Links => counts.links as i64,
            HeaderField::Pumps => counts.pumps as i64,
            HeaderField::Valves => counts.valves as i64,
            HeaderField::Pollutants => counts.pollutants as i64,
        }
    }
}

/// Ordered name table of one entity class.
///
/// The position of a name is the entity index used by every later table.
/// Duplicate names keep their own slots; the reverse map points at the last
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityNames {
    class: EntityClass,
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl EntityNames {
    pub fn new(class: EntityClass, names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { class, names, index }
    }

    pub fn class(&self) -> EntityClass {
        self.class
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of distinct names (less than `len()` when duplicates exist).
    pub fn distinct(&self) -> usize {
        self.index.len()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// All name tables plus the pollutant unit codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCatalog {
    tables: Vec<EntityNames>,
    pollutant_units: Vec<i32>,
}

impl EntityCatalog {
    pub fn new(tables: Vec<EntityNames>, pollutant_units: Vec<i32>) -> Self {
        Self {
            tables,
            pollutant_units,
        }
    }

    /// Name table of a class, or `None` if the dialect does not name it.
    pub fn names(&self, class: EntityClass) -> Option<&EntityNames> {
        self.tables.iter().find(|t| t.class == class)
    }

    pub fn tables(&self) -> &[EntityNames] {
        &self.tables
    }

    pub fn pollutant_units(&self) -> &[i32] {
        &self.pollutant_units
    }

    pub fn pollutant_concentration_units(&self, index: usize) -> Option<ConcentrationUnits> {
        self.pollutant_units
            .get(index)
            .and_then(|code| ConcentrationUnits::from_code(*code))
    }

    /// Name of the pollutant a raw variable code refers to.
    pub fn pollutant_for(&self, table: &VariableTable, key: &VariableKey) -> Option<&str> {
        let VariableKey::Code(code) = key else {
            return None;
        };
        let slot = table.pollutant_slot(*code)?;
        self.names(EntityClass::Pollutant)?.get(slot)
    }
}

/// Static properties of one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRecord {
    fields: &'static [PropertyField],
    values: Vec<f32>,
}

impl PropertyRecord {
    pub fn new(fields: &'static [PropertyField], values: Vec<f32>) -> Self {
        debug_assert_eq!(fields.len(), values.len());
        Self { fields, values }
    }

    pub fn get(&self, field: PropertyField) -> Option<f32> {
        self.fields
            .iter()
            .position(|f| *f == field)
            .and_then(|i| self.values.get(i).copied())
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (PropertyField, f32)> + '_ {
        self.fields.iter().copied().zip(self.values.iter().copied())
    }
}

/// Property codes and per-entity records of one class.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyTable {
    pub class: EntityClass,
    /// Informational; record shape is fixed by the profile.
    pub codes: Vec<i32>,
    pub records: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyTables {
    pub tables: Vec<PropertyTable>,
}

impl PropertyTables {
    pub fn get(&self, class: EntityClass) -> Option<&PropertyTable> {
        self.tables.iter().find(|t| t.class == class)
    }

    pub fn record(&self, class: EntityClass, index: usize) -> Option<&PropertyRecord> {
        self.get(class).and_then(|t| t.records.get(index))
    }
}

/// A numeric code and what it resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableCode {
    pub code: i32,
    pub key: VariableKey,
}

/// Ordered variable codes of one scope.
///
/// The order is also the order of the floats inside each entity's block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableCodes {
    pub table: VariableTable,
    pub codes: Vec<VariableCode>,
    keys: Arc<[VariableKey]>,
}

impl VariableCodes {
    pub fn new(table: VariableTable, codes: Vec<VariableCode>) -> Self {
        let keys = codes.iter().map(|c| c.key).collect();
        Self { table, codes, keys }
    }

    pub fn scope(&self) -> VariableScope {
        self.table.scope
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn keys(&self) -> &Arc<[VariableKey]> {
        &self.keys
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableCodeTable {
    pub lists: Vec<VariableCodes>,
}

impl VariableCodeTable {
    pub fn get(&self, scope: VariableScope) -> Option<&VariableCodes> {
        self.lists.iter().find(|l| l.scope() == scope)
    }

    /// Number of variables reported for a scope (zero if absent).
    pub fn count(&self, scope: VariableScope) -> usize {
        self.get(scope).map_or(0, VariableCodes::len)
    }
}

/// The fixed trailer at the end of the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClosingRecord {
    pub id_name_offset: i32,
    pub property_offset: i32,
    pub results_offset: i32,
    pub period_count: i32,
    pub error_code: i32,
    /// Repeated identification number, for dialects that store one.
    pub closing_magic: Option<i32>,
}

/// Report start and step, stored between the variable codes and the results.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportingInfo {
    pub start_days: f64,
    pub start: NaiveDateTime,
    pub step_seconds: i32,
}

impl ReportingInfo {
    pub fn step_millis(&self) -> i64 {
        self.step_seconds as i64 * 1000
    }
}

/// Header, catalog and property segments, the part of the file that can be
/// re-encoded byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSegments {
    pub prolog: Prolog,
    pub catalog: EntityCatalog,
    pub properties: PropertyTables,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outfile::types::profile::FormatProfile;

    #[test]
    fn duplicate_names_keep_slots_and_last_index_wins() {
        let names = EntityNames::new(
            EntityClass::Node,
            vec!["J1".to_string(), "J2".to_string(), "J1".to_string()],
        );
        assert_eq!(names.len(), 3);
        assert_eq!(names.distinct(), 2);
        assert_eq!(names.get(0), Some("J1"));
        assert_eq!(names.index_of("J1"), Some(2));
        assert_eq!(names.index_of("J3"), None);
    }

    #[test]
    fn pollutant_slots_resolve_to_names() {
        let catalog = EntityCatalog::new(
            vec![EntityNames::new(
                EntityClass::Pollutant,
                vec!["TSS".to_string(), "Lead".to_string()],
            )],
            vec![0, 1],
        );
        let table = FormatProfile::DRAINAGE.variable_table(VariableScope::Link);
        assert_eq!(catalog.pollutant_for(&table, &VariableKey::Code(5)), Some("TSS"));
        assert_eq!(catalog.pollutant_for(&table, &VariableKey::Code(6)), Some("Lead"));
        assert_eq!(catalog.pollutant_for(&table, &VariableKey::Code(7)), None);
        assert_eq!(
            catalog.pollutant_for(&table, &VariableKey::Named("flowRate")),
            None
        );
        assert_eq!(
            catalog.pollutant_concentration_units(1),
            Some(ConcentrationUnits::MicrogramsPerLiter)
        );
    }

    #[test]
    fn keys_match_names_and_codes() {
        assert!(VariableKey::Named("depth").matches("depth"));
        assert!(VariableKey::Code(9).matches("9"));
        assert!(!VariableKey::Code(9).matches("depth"));
        assert_eq!(VariableKey::Code(9).to_string(), "9");
    }
}
