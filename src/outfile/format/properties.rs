//! Static property tables.
//!
//! For each class with a property layout, in profile order:
//! ```text
//! [4 bytes]          property-code count n
//! [4 bytes × n]      property codes (informational)
//! [4 bytes × s × N]  one record of s floats per entity, s fixed by the profile
//! ```

use log::{debug, info, warn};

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::types::{
    error::Result,
    models::{Prolog, PropertyRecord, PropertyTable, PropertyTables},
    profile::FormatProfile,
};
use crate::outfile::utils;

pub fn parse(
    cursor: &mut ByteCursor<'_>,
    prolog: &Prolog,
    profile: &FormatProfile,
) -> Result<PropertyTables> {
    info!("Parsing property tables");

    let mut tables = Vec::with_capacity(profile.property_layouts.len());
    for layout in profile.property_layouts {
        let offset = cursor.position();
        let raw_count = cursor.read_i32("property code count")?;
        let code_count = utils::to_count(raw_count, offset, "property code count")?;
        utils::check_plausible(code_count, 4, cursor.remaining(), offset, "property codes")?;
        let codes = cursor.read_i32_vec(code_count, "property codes")?;
        if code_count != layout.stride() {
            warn!(
                "{} property table lists {} codes but records are {} floats wide",
                layout.class,
                code_count,
                layout.stride()
            );
        }

        let count = prolog.counts.count(layout.class);
        let mut records = Vec::with_capacity(count);
        for _ in 0..count {
            let mut values = vec![0f32; layout.stride()];
            cursor.read_f32_into(&mut values, "property record")?;
            records.push(PropertyRecord::new(layout.fields, values));
        }
        debug!(
            "Read {} {} property records ({} codes)",
            records.len(),
            layout.class,
            codes.len()
        );

        tables.push(PropertyTable {
            class: layout.class,
            codes,
            records,
        });
    }

    Ok(PropertyTables { tables })
}
