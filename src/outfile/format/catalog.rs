//! Entity name tables.
//!
//! Each named class stores `count` names as:
//! ```text
//! [4 bytes] name length L
//! [L bytes] one byte per character, no terminator, no padding
//! ```
//! followed, after the last class, by one 4-byte unit code per pollutant.

use encoding_rs::mem::decode_latin1;
use log::{debug, info, trace};

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::types::{
    error::{OutputError, Result},
    models::{EntityCatalog, EntityNames, Prolog},
    profile::FormatProfile,
};

/// Reads every name table declared by the profile plus the pollutant units.
pub fn parse(
    cursor: &mut ByteCursor<'_>,
    prolog: &Prolog,
    profile: &FormatProfile,
) -> Result<EntityCatalog> {
    info!("Parsing entity name tables");

    let mut tables = Vec::with_capacity(profile.named_classes.len());
    for class in profile.named_classes {
        let count = prolog.counts.count(*class);
        let mut names = Vec::with_capacity(count);
        for _ in 0..count {
            names.push(read_name(cursor)?);
        }

        let table = EntityNames::new(*class, names);
        if table.distinct() != table.len() {
            debug!(
                "{} name table has {} duplicate names; lookups resolve to the last occurrence",
                class,
                table.len() - table.distinct()
            );
        }
        debug!("Read {} {} names", table.len(), class);
        tables.push(table);
    }

    let pollutant_units = cursor.read_i32_vec(prolog.counts.pollutants, "pollutant unit codes")?;
    trace!("Pollutant unit codes: {:?}", pollutant_units);

    Ok(EntityCatalog::new(tables, pollutant_units))
}

/// Reads one length-prefixed 8-bit name.
fn read_name(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let offset = cursor.position();
    let len = cursor.read_i32("name length")?;
    let len = usize::try_from(len)
        .map_err(|_| OutputError::format(offset, format!("negative name length {}", len)))?;
    let bytes = cursor.take(len, "entity name")?;
    Ok(decode_latin1(bytes).into_owned())
}
