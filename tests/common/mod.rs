#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use swmm_out_reader::outfile::types::profile::HeaderField;
use swmm_out_reader::{EntityClass, FormatProfile, VariableScope};

/// Synthetic output file builder.
///
/// Property record `i` of every class holds `10 * i + k` in field `k`.
pub struct OutputFileBuilder {
    profile: FormatProfile,
    version: i32,
    flow_units: i32,
    subcatchments: Vec<String>,
    nodes: Vec<String>,
    links: Vec<String>,
    pollutants: Vec<(String, i32)>,
    tanks: i32,
    pumps: i32,
    valves: i32,
    variables: Vec<(VariableScope, Vec<i32>)>,
    report_start: f64,
    report_step: i32,
    periods: Vec<(f64, Vec<f32>)>,
    error_code: i32,
}

/// Built bytes plus the segment offsets the trailer declares.
pub struct Built {
    pub bytes: Vec<u8>,
    pub id_name_offset: usize,
    pub property_offset: usize,
    pub variables_offset: usize,
    pub results_offset: usize,
}

impl OutputFileBuilder {
    pub fn new(profile: FormatProfile) -> Self {
        Self {
            profile,
            version: 51000,
            flow_units: 0,
            subcatchments: Vec::new(),
            nodes: Vec::new(),
            links: Vec::new(),
            pollutants: Vec::new(),
            tanks: 0,
            pumps: 0,
            valves: 0,
            variables: Vec::new(),
            report_start: 100.0,
            report_step: 60,
            periods: Vec::new(),
            error_code: 0,
        }
    }

    pub fn drainage() -> Self {
        Self::new(FormatProfile::DRAINAGE)
    }

    pub fn distribution() -> Self {
        let mut builder = Self::new(FormatProfile::DISTRIBUTION);
        builder.version = 20200;
        builder
    }

    pub fn flow_units(mut self, code: i32) -> Self {
        self.flow_units = code;
        self
    }

    pub fn subcatchment(mut self, name: &str) -> Self {
        self.subcatchments.push(name.to_string());
        self
    }

    pub fn node(mut self, name: &str) -> Self {
        self.nodes.push(name.to_string());
        self
    }

    pub fn link(mut self, name: &str) -> Self {
        self.links.push(name.to_string());
        self
    }

    pub fn pollutant(mut self, name: &str, unit: i32) -> Self {
        self.pollutants.push((name.to_string(), unit));
        self
    }

    pub fn tanks(mut self, n: i32) -> Self {
        self.tanks = n;
        self
    }

    pub fn pumps(mut self, n: i32) -> Self {
        self.pumps = n;
        self
    }

    pub fn valves(mut self, n: i32) -> Self {
        self.valves = n;
        self
    }

    pub fn variables(mut self, scope: VariableScope, codes: &[i32]) -> Self {
        self.variables.push((scope, codes.to_vec()));
        self
    }

    pub fn reporting(mut self, start: f64, step_seconds: i32) -> Self {
        self.report_start = start;
        self.report_step = step_seconds;
        self
    }

    pub fn period(mut self, days: f64, values: &[f32]) -> Self {
        self.periods.push((days, values.to_vec()));
        self
    }

    pub fn error_code(mut self, code: i32) -> Self {
        self.error_code = code;
        self
    }

    fn names(&self, class: EntityClass) -> Vec<String> {
        match class {
            EntityClass::Subcatchment => self.subcatchments.clone(),
            EntityClass::Node => self.nodes.clone(),
            EntityClass::Link => self.links.clone(),
            EntityClass::Pollutant => self.pollutants.iter().map(|(n, _)| n.clone()).collect(),
        }
    }

    pub fn build(&self) -> Built {
        let mut out: Vec<u8> = Vec::new();
        let profile = &self.profile;

        for field in profile.header_layout {
            let value = match field {
                HeaderField::FormatId => profile.magic,
                HeaderField::Version => self.version,
                HeaderField::FlowUnits => self.flow_units,
                HeaderField::Subcatchments => self.subcatchments.len() as i32,
                HeaderField::Nodes => self.nodes.len() as i32,
                HeaderField::Tanks => self.tanks,
                HeaderField::Links => self.links.len() as i32,
                HeaderField::Pumps => self.pumps,
                HeaderField::Valves => self.valves,
                HeaderField::Pollutants => self.pollutants.len() as i32,
            };
            out.write_i32::<LittleEndian>(value).unwrap();
        }

        let id_name_offset = out.len();
        for class in profile.named_classes {
            for name in self.names(*class) {
                out.write_i32::<LittleEndian>(name.len() as i32).unwrap();
                out.extend_from_slice(name.as_bytes());
            }
        }
        for (_, unit) in &self.pollutants {
            out.write_i32::<LittleEndian>(*unit).unwrap();
        }

        let property_offset = out.len();
        for layout in profile.property_layouts {
            out.write_i32::<LittleEndian>(layout.stride() as i32).unwrap();
            for k in 0..layout.stride() {
                out.write_i32::<LittleEndian>(k as i32).unwrap();
            }
            for i in 0..self.names(layout.class).len() {
                for k in 0..layout.stride() {
                    out.write_f32::<LittleEndian>((10 * i + k) as f32).unwrap();
                }
            }
        }

        let variables_offset = out.len();
        for scope in profile.variable_scopes() {
            let codes = self
                .variables
                .iter()
                .find(|(s, _)| *s == scope)
                .map(|(_, codes)| codes.clone())
                .unwrap_or_default();
            out.write_i32::<LittleEndian>(codes.len() as i32).unwrap();
            for code in codes {
                out.write_i32::<LittleEndian>(code).unwrap();
            }
        }

        out.write_f64::<LittleEndian>(self.report_start).unwrap();
        out.write_i32::<LittleEndian>(self.report_step).unwrap();

        let results_offset = out.len();
        for (days, values) in &self.periods {
            out.write_f64::<LittleEndian>(*days).unwrap();
            for v in values {
                out.write_f32::<LittleEndian>(*v).unwrap();
            }
        }

        out.write_i32::<LittleEndian>(id_name_offset as i32).unwrap();
        out.write_i32::<LittleEndian>(property_offset as i32).unwrap();
        out.write_i32::<LittleEndian>(results_offset as i32).unwrap();
        out.write_i32::<LittleEndian>(self.periods.len() as i32).unwrap();
        out.write_i32::<LittleEndian>(self.error_code).unwrap();
        let last = if profile.closing_magic { profile.magic } else { 0 };
        out.write_i32::<LittleEndian>(last).unwrap();

        Built {
            bytes: out,
            id_name_offset,
            property_offset,
            variables_offset,
            results_offset,
        }
    }
}

/// Overwrites one 4-byte slot of the trailer (0 = id-name offset, ..., 5 = last slot).
pub fn set_trailer_slot(bytes: &mut [u8], slot: usize, value: i32) {
    let at = bytes.len() - 24 + slot * 4;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

/// Inserts bytes just before the trailer.
pub fn insert_before_trailer(bytes: &mut Vec<u8>, extra: &[u8]) {
    let at = bytes.len() - 24;
    bytes.splice(at..at, extra.iter().copied());
}

/// The two-period S1/J1/C1 model: one value per entity and one system value.
pub fn small_drainage_model() -> OutputFileBuilder {
    OutputFileBuilder::drainage()
        .subcatchment("S1")
        .node("J1")
        .link("C1")
        .variables(VariableScope::Subcatchment, &[0])
        .variables(VariableScope::Node, &[0])
        .variables(VariableScope::Link, &[0])
        .variables(VariableScope::System, &[0])
        .reporting(100.0, 60)
        .period(100.0, &[1.5, 2.0, 0.3, 70.0])
        .period(100.000694444, &[1.6, 2.1, 0.35, 71.0])
}

/// One node reporting [depth] plus one system value, `n` periods `step` seconds apart.
pub fn node_series(n: usize, step: i32) -> OutputFileBuilder {
    let mut builder = OutputFileBuilder::drainage()
        .node("J1")
        .variables(VariableScope::Node, &[0])
        .variables(VariableScope::System, &[0])
        .reporting(200.0, step);
    for p in 0..n {
        let days = 200.0 + (p as f64 * step as f64) / 86_400.0;
        builder = builder.period(days, &[p as f32 * 0.25, 60.0 + p as f32]);
    }
    builder
}
