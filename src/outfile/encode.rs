//! Re-encoding of the prolog, name tables and property tables.
//!
//! The writer produces exactly the bytes the corresponding parsers consume,
//! so `read_input_segments(encode(x)) == x` for any segments read from a file.
//! Results and the trailer are never written.

use byteorder::{LittleEndian, WriteBytesExt};
use encoding_rs::mem::encode_latin1_lossy;
use log::debug;

use super::types::error::{OutputError, Result};
use super::types::models::{EntityClass, InputSegments};
use super::types::profile::FormatProfile;

/// Writes [`InputSegments`] in the byte layout of one dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputSegmentWriter {
    profile: FormatProfile,
}

impl InputSegmentWriter {
    pub fn new(profile: FormatProfile) -> Self {
        Self { profile }
    }

    /// Writer for the dialect the segments were read with.
    pub fn for_segments(segments: &InputSegments) -> Self {
        Self::new(FormatProfile::for_dialect(segments.prolog.dialect))
    }

    pub fn encode(&self, segments: &InputSegments) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.write_to(segments, &mut out)?;
        debug!("Encoded input segments: {} bytes", out.len());
        Ok(out)
    }

    /// Appends the encoded segments to `out`.
    ///
    /// Fails with a format error if a table disagrees with the prolog counts
    /// or a value does not fit its 4-byte slot.
    pub fn write_to(&self, segments: &InputSegments, out: &mut Vec<u8>) -> Result<()> {
        let InputSegments {
            prolog,
            catalog,
            properties,
        } = segments;

        for field in self.profile.header_layout {
            let value = prolog.field(*field);
            let value = i32::try_from(value).map_err(|_| {
                OutputError::format(
                    out.len(),
                    format!("{:?} value {} does not fit a 4-byte slot", field, value),
                )
            })?;
            out.write_i32::<LittleEndian>(value)?;
        }

        for class in self.profile.named_classes {
            let count = prolog.counts.count(*class);
            let names = catalog.names(*class).map_or(&[][..], |t| t.as_slice());
            expect_len(out.len(), *class, "names", count, names.len())?;
            for name in names {
                let bytes = encode_latin1_lossy(name);
                out.write_i32::<LittleEndian>(slot(out.len(), bytes.len())?)?;
                out.extend_from_slice(&bytes);
            }
        }

        let units = catalog.pollutant_units();
        expect_len(
            out.len(),
            EntityClass::Pollutant,
            "unit codes",
            prolog.counts.pollutants,
            units.len(),
        )?;
        for unit in units {
            out.write_i32::<LittleEndian>(*unit)?;
        }

        for layout in self.profile.property_layouts {
            let count = prolog.counts.count(layout.class);
            let (codes, records) = properties
                .get(layout.class)
                .map_or((&[][..], &[][..]), |t| (t.codes.as_slice(), t.records.as_slice()));
            expect_len(out.len(), layout.class, "property records", count, records.len())?;

            out.write_i32::<LittleEndian>(slot(out.len(), codes.len())?)?;
            for code in codes {
                out.write_i32::<LittleEndian>(*code)?;
            }
            for record in records {
                if record.values().len() != layout.stride() {
                    return Err(OutputError::format(
                        out.len(),
                        format!(
                            "{} property record has {} values, layout needs {}",
                            layout.class,
                            record.values().len(),
                            layout.stride()
                        ),
                    ));
                }
                for value in record.values() {
                    out.write_f32::<LittleEndian>(*value)?;
                }
            }
        }

        Ok(())
    }
}

fn slot(offset: usize, len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| {
        OutputError::format(offset, format!("length {} does not fit a 4-byte slot", len))
    })
}

fn expect_len(
    offset: usize,
    class: EntityClass,
    what: &str,
    expected: usize,
    actual: usize,
) -> Result<()> {
    if expected != actual {
        return Err(OutputError::format(
            offset,
            format!(
                "prolog declares {} {} entities, {} table has {}",
                expected, class, what, actual
            ),
        ));
    }
    Ok(())
}
