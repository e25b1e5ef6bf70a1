//! Result-variable code tables.
//!
//! For each result scope of the profile, followed by the system scope:
//! ```text
//! [4 bytes]      variable count n
//! [4 bytes × n]  variable codes
//! ```
//! Codes are resolved through the profile's static tables. The list order is
//! the order of the floats in every per-period entity block.

use log::{debug, info};

use crate::outfile::codec::cursor::ByteCursor;
use crate::outfile::types::{
    error::Result,
    models::{VariableCode, VariableCodeTable, VariableCodes},
    profile::FormatProfile,
};
use crate::outfile::utils;

pub fn parse(cursor: &mut ByteCursor<'_>, profile: &FormatProfile) -> Result<VariableCodeTable> {
    info!("Parsing result variable codes");

    let mut lists = Vec::new();
    for scope in profile.variable_scopes() {
        let offset = cursor.position();
        let count = utils::to_count(cursor.read_i32("variable count")?, offset, "variable count")?;
        utils::check_plausible(count, 4, cursor.remaining(), offset, "variable codes")?;

        let table = profile.variable_table(scope);
        let codes: Vec<VariableCode> = cursor
            .read_i32_vec(count, "variable codes")?
            .into_iter()
            .map(|code| VariableCode {
                code,
                key: table.resolve(code),
            })
            .collect();

        debug!(
            "{} variables: {}",
            scope,
            codes
                .iter()
                .map(|c| c.key.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        lists.push(VariableCodes::new(table, codes));
    }

    Ok(VariableCodeTable { lists })
}
