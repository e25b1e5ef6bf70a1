//! Format profiles for the two sibling output dialects.
//!
//! Both dialects share one segment layout (prolog, name tables, property
//! tables, variable codes, reporting block, results, trailer). What differs is
//! captured here as static data, so a single decoder can read either file once
//! a [`FormatProfile`] has been selected:
//!
//! - the order and number of prolog fields,
//! - which entity classes carry names, properties and results,
//! - the fixed property strides,
//! - the variable-code and flow-unit lookup tables,
//! - whether the trailer ends with a closing magic number.

use std::fmt;

use super::models::{EntityClass, VariableKey, VariableScope};

/// The two supported output dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Stormwater/drainage output: subcatchments, nodes, links, pollutants.
    Drainage,
    /// Pressurized distribution network output: nodes (incl. tanks), links
    /// (incl. pumps and valves) and quality constituents.
    Distribution,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Drainage => write!(f, "drainage"),
            Dialect::Distribution => write!(f, "distribution"),
        }
    }
}

/// One 4-byte integer slot of the prolog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    FormatId,
    Version,
    FlowUnits,
    Subcatchments,
    Nodes,
    Tanks,
    Links,
    Pumps,
    Valves,
    Pollutants,
}

/// One float of a per-entity static property record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyField {
    Area,
    TypeCode,
    InvertElevation,
    MaxDepth,
    UpstreamOffset,
    DownstreamOffset,
    Length,
    Elevation,
    Diameter,
}

impl PropertyField {
    pub fn name(&self) -> &'static str {
        match self {
            PropertyField::Area => "area",
            PropertyField::TypeCode => "typeCode",
            PropertyField::InvertElevation => "invertElevation",
            PropertyField::MaxDepth => "maxDepth",
            PropertyField::UpstreamOffset => "upstreamOffset",
            PropertyField::DownstreamOffset => "downstreamOffset",
            PropertyField::Length => "length",
            PropertyField::Elevation => "elevation",
            PropertyField::Diameter => "diameter",
        }
    }
}

/// The fixed property record shape of one entity class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyLayout {
    pub class: EntityClass,
    pub fields: &'static [PropertyField],
}

impl PropertyLayout {
    /// Number of floats per entity record.
    pub fn stride(&self) -> usize {
        self.fields.len()
    }
}

/// Flow units declared in the prolog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlowUnits {
    Cfs,
    Gpm,
    Mgd,
    Imgd,
    Afd,
    Cms,
    Lps,
    Lpm,
    Mld,
    Cmh,
    Cmd,
}

impl fmt::Display for FlowUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FlowUnits::Cfs => "CFS",
            FlowUnits::Gpm => "GPM",
            FlowUnits::Mgd => "MGD",
            FlowUnits::Imgd => "IMGD",
            FlowUnits::Afd => "AFD",
            FlowUnits::Cms => "CMS",
            FlowUnits::Lps => "LPS",
            FlowUnits::Lpm => "LPM",
            FlowUnits::Mld => "MLD",
            FlowUnits::Cmh => "CMH",
            FlowUnits::Cmd => "CMD",
        };
        f.write_str(label)
    }
}

/// Concentration units of a pollutant / quality constituent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConcentrationUnits {
    MilligramsPerLiter,
    MicrogramsPerLiter,
    CountsPerLiter,
}

impl ConcentrationUnits {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::MilligramsPerLiter),
            1 => Some(Self::MicrogramsPerLiter),
            2 => Some(Self::CountsPerLiter),
            _ => None,
        }
    }
}

impl fmt::Display for ConcentrationUnits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConcentrationUnits::MilligramsPerLiter => write!(f, "mg/L"),
            ConcentrationUnits::MicrogramsPerLiter => write!(f, "ug/L"),
            ConcentrationUnits::CountsPerLiter => write!(f, "count/L"),
        }
    }
}

/// A static code→name table for one variable scope.
///
/// Codes at or past the end of `names` are pollutant-concentration slots and
/// resolve to [`VariableKey::Code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableTable {
    pub scope: VariableScope,
    pub names: &'static [&'static str],
}

impl VariableTable {
    /// Resolves a numeric code to its name, if the table has one.
    pub fn name(&self, code: i32) -> Option<&'static str> {
        usize::try_from(code).ok().and_then(|i| self.names.get(i).copied())
    }

    /// Resolves a numeric code to a key. Unresolved codes pass through unchanged.
    pub fn resolve(&self, code: i32) -> VariableKey {
        match self.name(code) {
            Some(name) => VariableKey::Named(name),
            None => VariableKey::Code(code),
        }
    }

    /// Index into the pollutant list for a code past the end of the table.
    pub fn pollutant_slot(&self, code: i32) -> Option<usize> {
        usize::try_from(code)
            .ok()
            .and_then(|c| c.checked_sub(self.names.len()))
    }
}

/// Everything the decoder needs to know about one dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatProfile {
    pub dialect: Dialect,
    /// Identification number expected in the first prolog slot.
    pub magic: i32,
    pub header_layout: &'static [HeaderField],
    /// Classes whose name tables appear in the file, in file order.
    pub named_classes: &'static [EntityClass],
    /// Property tables in file order.
    pub property_layouts: &'static [PropertyLayout],
    /// Classes with per-period results, in file order. System results follow.
    pub result_classes: &'static [EntityClass],
    pub variable_tables: &'static [VariableTable],
    /// Flow unit for each prolog code, indexed by code.
    pub flow_units: &'static [FlowUnits],
    /// Whether the last trailer slot repeats the identification number.
    pub closing_magic: bool,
}

impl FormatProfile {
    pub const DRAINAGE: FormatProfile = FormatProfile {
        dialect: Dialect::Drainage,
        magic: 516_114_522,
        header_layout: &[
            HeaderField::FormatId,
            HeaderField::Version,
            HeaderField::FlowUnits,
            HeaderField::Subcatchments,
            HeaderField::Nodes,
            HeaderField::Links,
            HeaderField::Pollutants,
        ],
        named_classes: &[
            EntityClass::Subcatchment,
            EntityClass::Node,
            EntityClass::Link,
            EntityClass::Pollutant,
        ],
        property_layouts: &[
            PropertyLayout {
                class: EntityClass::Subcatchment,
                fields: &[PropertyField::Area],
            },
            PropertyLayout {
                class: EntityClass::Node,
                fields: &[
                    PropertyField::TypeCode,
                    PropertyField::InvertElevation,
                    PropertyField::MaxDepth,
                ],
            },
            PropertyLayout {
                class: EntityClass::Link,
                fields: &[
                    PropertyField::TypeCode,
                    PropertyField::UpstreamOffset,
                    PropertyField::DownstreamOffset,
                    PropertyField::MaxDepth,
                    PropertyField::Length,
                ],
            },
        ],
        result_classes: &[EntityClass::Subcatchment, EntityClass::Node, EntityClass::Link],
        variable_tables: &[
            VariableTable {
                scope: VariableScope::Subcatchment,
                names: &[
                    "rainfall",
                    "snowDepth",
                    "evaporation",
                    "infiltration",
                    "runoff",
                    "groundwater",
                    "groundwaterElevation",
                    "soilMoisture",
                ],
            },
            VariableTable {
                scope: VariableScope::Node,
                names: &[
                    "depth",
                    "head",
                    "volume",
                    "lateralInflow",
                    "totalInflow",
                    "flowLost",
                ],
            },
            VariableTable {
                scope: VariableScope::Link,
                names: &["flowRate", "flowDepth", "velocity", "volume", "areaFilled"],
            },
            VariableTable {
                scope: VariableScope::System,
                names: &[
                    "airTemperature",
                    "rainfall",
                    "snowDepth",
                    "evapInfiltRate",
                    "runoffFlow",
                    "dryWeatherInflow",
                    "groundwaterInflow",
                    "RDIIInflow",
                    "userInflow",
                    "totalInflow",
                    "flowLost",
                    "flowLeavingOutfall",
                    "volumeStored",
                    "actEvaporation",
                    "potEvaporation",
                ],
            },
        ],
        flow_units: &[
            FlowUnits::Cfs,
            FlowUnits::Gpm,
            FlowUnits::Mgd,
            FlowUnits::Cms,
            FlowUnits::Lps,
            FlowUnits::Mld,
        ],
        closing_magic: true,
    };

    pub const DISTRIBUTION: FormatProfile = FormatProfile {
        dialect: Dialect::Distribution,
        magic: 516_114_521,
        header_layout: &[
            HeaderField::FormatId,
            HeaderField::Version,
            HeaderField::FlowUnits,
            HeaderField::Nodes,
            HeaderField::Tanks,
            HeaderField::Links,
            HeaderField::Pumps,
            HeaderField::Valves,
            HeaderField::Pollutants,
        ],
        named_classes: &[EntityClass::Node, EntityClass::Link, EntityClass::Pollutant],
        property_layouts: &[
            PropertyLayout {
                class: EntityClass::Node,
                fields: &[PropertyField::Elevation],
            },
            PropertyLayout {
                class: EntityClass::Link,
                fields: &[
                    PropertyField::TypeCode,
                    PropertyField::Length,
                    PropertyField::Diameter,
                ],
            },
        ],
        result_classes: &[EntityClass::Node, EntityClass::Link],
        variable_tables: &[
            VariableTable {
                scope: VariableScope::Node,
                names: &["demand", "head", "pressure", "quality"],
            },
            VariableTable {
                scope: VariableScope::Link,
                names: &[
                    "flow",
                    "velocity",
                    "headloss",
                    "avgQuality",
                    "status",
                    "setting",
                    "reactionRate",
                    "friction",
                ],
            },
            VariableTable {
                scope: VariableScope::System,
                names: &[],
            },
        ],
        flow_units: &[
            FlowUnits::Cfs,
            FlowUnits::Gpm,
            FlowUnits::Mgd,
            FlowUnits::Imgd,
            FlowUnits::Afd,
            FlowUnits::Lps,
            FlowUnits::Lpm,
            FlowUnits::Mld,
            FlowUnits::Cmh,
            FlowUnits::Cmd,
        ],
        closing_magic: false,
    };

    pub fn for_dialect(dialect: Dialect) -> FormatProfile {
        match dialect {
            Dialect::Drainage => Self::DRAINAGE,
            Dialect::Distribution => Self::DISTRIBUTION,
        }
    }

    /// Byte length of the prolog.
    pub fn header_len(&self) -> usize {
        self.header_layout.len() * 4
    }

    pub fn flow_units(&self, code: i32) -> Option<FlowUnits> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.flow_units.get(i).copied())
    }

    pub fn property_layout(&self, class: EntityClass) -> Option<&'static PropertyLayout> {
        self.property_layouts.iter().find(|layout| layout.class == class)
    }

    /// Static lookup table for a scope. Scopes this dialect has no table for
    /// fall back to an empty one, so every code passes through raw.
    pub fn variable_table(&self, scope: VariableScope) -> VariableTable {
        self.variable_tables
            .iter()
            .find(|table| table.scope == scope)
            .copied()
            .unwrap_or(VariableTable { scope, names: &[] })
    }

    /// Scopes in the order their variable-code lists appear in the file.
    pub fn variable_scopes(&self) -> impl Iterator<Item = VariableScope> + '_ {
        self.result_classes
            .iter()
            .filter_map(|class| class.scope())
            .chain(std::iter::once(VariableScope::System))
    }
}

impl Default for FormatProfile {
    fn default() -> Self {
        Self::DRAINAGE
    }
}
