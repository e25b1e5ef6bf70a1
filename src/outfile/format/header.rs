//! Prolog parsing.
//!
//! # Prolog Structure
//! ```text
//! [4 bytes] identification number (must match the profile's magic)
//! [4 bytes] engine version
//! [4 bytes] flow-unit code
//! [4 bytes × k] entity counts, in the dialect's declared order
//! [4 bytes] pollutant count
//! ```

use log::{debug, info, trace};

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::types::{
    error::{OutputError, Result},
    models::{EntityClass, EntityCounts, Prolog},
    profile::{FormatProfile, HeaderField},
};
use crate::outfile::utils;

/// Parses the prolog at the cursor, which must sit at offset 0.
///
/// Counts are checked against the bytes left in the buffer: each named entity
/// takes at least a 4-byte name prefix plus its fixed property record.
pub fn parse(cursor: &mut ByteCursor<'_>, profile: &FormatProfile) -> Result<Prolog> {
    info!("Parsing {} prolog", profile.dialect);

    let mut format_id = None;
    let mut version = 0;
    let mut flow_unit_code = 0;
    let mut counts = EntityCounts::default();

    for field in profile.header_layout {
        let offset = cursor.position();
        let value = cursor.read_i32("prolog")?;
        trace!("Prolog {:?} = {} (byte {})", field, value, offset);

        match field {
            HeaderField::FormatId => {
                if value != profile.magic {
                    return Err(OutputError::format(
                        offset,
                        format!(
                            "identification number {} is not a {} output file (expected {})",
                            value, profile.dialect, profile.magic
                        ),
                    ));
                }
                format_id = Some(value);
            }
            HeaderField::Version => version = value,
            HeaderField::FlowUnits => flow_unit_code = value,
            HeaderField::Subcatchments => {
                counts.subcatchments = utils::to_count(value, offset, "subcatchment count")?
            }
            HeaderField::Nodes => counts.nodes = utils::to_count(value, offset, "node count")?,
            HeaderField::Tanks => counts.tanks = utils::to_count(value, offset, "tank count")?,
            HeaderField::Links => counts.links = utils::to_count(value, offset, "link count")?,
            HeaderField::Pumps => counts.pumps = utils::to_count(value, offset, "pump count")?,
            HeaderField::Valves => counts.valves = utils::to_count(value, offset, "valve count")?,
            HeaderField::Pollutants => {
                counts.pollutants = utils::to_count(value, offset, "pollutant count")?
            }
        }
    }

    let format_id = format_id.ok_or_else(|| {
        OutputError::format(0, "profile declares no identification number slot")
    })?;

    check_counts(cursor, profile, &counts)?;

    let flow_units = profile.flow_units(flow_unit_code);
    if flow_units.is_none() {
        debug!("Unknown flow-unit code {}, keeping raw value", flow_unit_code);
    }

    info!(
        "Prolog parsed: version={}, flow units={}, counts={:?}",
        version,
        flow_units.map_or_else(|| flow_unit_code.to_string(), |u| u.to_string()),
        counts
    );

    Ok(Prolog {
        dialect: profile.dialect,
        format_id,
        version,
        flow_unit_code,
        flow_units,
        counts,
    })
}

fn check_counts(
    cursor: &ByteCursor<'_>,
    profile: &FormatProfile,
    counts: &EntityCounts,
) -> Result<()> {
    let offset = cursor.position();
    let remaining = cursor.remaining();

    for class in profile.named_classes {
        let stride = profile.property_layout(*class).map_or(0, |l| l.stride());
        // Name prefix + property floats; pollutants also carry a unit code.
        let extra = if *class == EntityClass::Pollutant { 4 } else { 0 };
        let min_record = 4 + 4 * stride + extra;
        let label = format!("{} records", class);
        utils::check_plausible(counts.count(*class), min_record, remaining, offset, &label)?;
    }

    if counts.tanks > counts.nodes {
        return Err(OutputError::format(
            offset,
            format!("{} tanks exceed {} nodes", counts.tanks, counts.nodes),
        ));
    }
    if counts.pumps + counts.valves > counts.links {
        return Err(OutputError::format(
            offset,
            format!(
                "{} pumps and {} valves exceed {} links",
                counts.pumps, counts.valves, counts.links
            ),
        ));
    }
    Ok(())
}
