mod common;

use approx::assert_relative_eq;
use common::{
    insert_before_trailer, node_series, set_trailer_slot, small_drainage_model, OutputFileBuilder,
};
use swmm_out_reader::{
    decode, ConcentrationUnits, DecodeOptions, EntityClass, FailurePolicy, FlowUnits,
    FormatProfile, OutputError, OutputReader, PropertyField, VariableKey, VariableScope,
};

#[test]
fn two_period_model_decodes_end_to_end() {
    let built = small_drainage_model().build();
    let output = decode(&built.bytes, DecodeOptions::default()).unwrap();

    let s1 = &output.results.subcatchments()["S1"];
    assert_eq!(s1.len(), 2);
    assert_relative_eq!(s1.points()[0].value("rainfall").unwrap(), 1.5);
    assert_relative_eq!(s1.points()[1].value("rainfall").unwrap(), 1.6);
    let elapsed = s1.points()[1].timestamp() - s1.points()[0].timestamp();
    assert_eq!(elapsed.num_milliseconds(), 60_000);

    let j1 = &output.results.nodes()["J1"];
    assert_relative_eq!(j1.points()[1].value("depth").unwrap(), 2.1);
    let c1 = &output.results.links()["C1"];
    assert_relative_eq!(c1.points()[0].value("flowRate").unwrap(), 0.3);
    assert_relative_eq!(
        output.results.system().points()[1].value("airTemperature").unwrap(),
        71.0
    );

    let t0 = output.results.timestamps()[0];
    assert_eq!(t0.to_string(), "1900-04-09 00:00:00");
    assert_eq!(j1.at(t0).and_then(|p| p.value("depth")), Some(2.0));

    assert_eq!(output.reporting.step_seconds, 60);
    assert_eq!(output.closing.period_count, 2);
    assert_eq!(output.prolog.flow_units, Some(FlowUnits::Cfs));
}

#[test]
fn static_properties_are_decoded() {
    let built = small_drainage_model().build();
    let output = decode(&built.bytes, DecodeOptions::default()).unwrap();

    let node = output.properties.record(EntityClass::Node, 0).unwrap();
    assert_eq!(node.get(PropertyField::InvertElevation), Some(1.0));
    assert_eq!(node.get(PropertyField::MaxDepth), Some(2.0));
    let link = output.properties.record(EntityClass::Link, 0).unwrap();
    assert_eq!(link.get(PropertyField::Length), Some(4.0));
    let sub = output.properties.record(EntityClass::Subcatchment, 0).unwrap();
    assert_eq!(sub.get(PropertyField::Area), Some(0.0));
}

#[test]
fn name_tables_match_prolog_counts() {
    let builds = [
        (
            small_drainage_model().pollutant("TSS", 0).build(),
            FormatProfile::DRAINAGE,
        ),
        (
            OutputFileBuilder::distribution()
                .node("N1")
                .node("T1")
                .tanks(1)
                .link("P1")
                .pollutant("Chlorine", 0)
                .build(),
            FormatProfile::DISTRIBUTION,
        ),
    ];

    for (built, profile) in builds {
        let options = DecodeOptions::default().with_profile(profile);
        let reader = OutputReader::from_bytes(&built.bytes, options).unwrap();
        for table in reader.catalog().tables() {
            assert_eq!(table.len(), reader.prolog().counts.count(table.class()));
        }
    }
}

#[test]
fn unresolved_codes_keep_their_number() {
    let built = OutputFileBuilder::drainage()
        .subcatchment("S1")
        .node("J1")
        .pollutant("TSS", 1)
        .variables(VariableScope::Subcatchment, &[99])
        .variables(VariableScope::Node, &[0, 6])
        .period(300.0, &[-1.0, 1.0, 42.0])
        .reporting(300.0, 60)
        .build();
    let reader = OutputReader::from_bytes(&built.bytes, DecodeOptions::default()).unwrap();

    let nodes = reader.variables().get(VariableScope::Node).unwrap();
    assert_eq!(nodes.keys()[1], VariableKey::Code(6));
    assert_eq!(nodes.codes[1].code, 6);
    assert_eq!(
        reader.variables().get(VariableScope::Subcatchment).unwrap().keys()[0],
        VariableKey::Code(99)
    );
    assert_eq!(
        reader.pollutant_name(VariableScope::Node, &VariableKey::Code(6)),
        Some("TSS")
    );
    assert_eq!(
        reader.catalog().pollutant_concentration_units(0),
        Some(ConcentrationUnits::MicrogramsPerLiter)
    );

    let results = reader.decode().unwrap();
    let point = &results.nodes()["J1"].points()[0];
    assert_eq!(point.value("6"), Some(42.0));
    assert_eq!(point.value_of(&VariableKey::Code(6)), Some(42.0));
    assert_eq!(point.value("depth"), Some(1.0));
    assert_eq!(results.subcatchments()["S1"].points()[0].value("99"), Some(-1.0));
}

#[test]
fn reporting_interval_is_constant() {
    let built = node_series(6, 300).build();
    let output = decode(&built.bytes, DecodeOptions::default()).unwrap();
    let timestamps = output.results.timestamps();
    assert_eq!(timestamps.len(), 6);
    for pair in timestamps.windows(2) {
        assert_eq!((pair[1] - pair[0]).num_milliseconds(), output.reporting.step_millis());
    }
}

#[test]
fn duplicate_names_resolve_to_the_last_entity() {
    let built = OutputFileBuilder::drainage()
        .node("J1")
        .node("J2")
        .node("J1")
        .variables(VariableScope::Node, &[0])
        .period(10.0, &[1.0, 2.0, 3.0])
        .build();
    let output = decode(&built.bytes, DecodeOptions::default()).unwrap();
    let nodes = output.results.nodes();
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes["J1"].points()[0].value("depth"), Some(3.0));
    assert_eq!(nodes.by_index(0).unwrap().points()[0].value("depth"), Some(1.0));
}

#[test]
fn byte_removed_before_trailer_is_truncation() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    bytes.remove(bytes.len() - 25);

    match decode(&bytes, DecodeOptions::default()) {
        Err(OutputError::Truncated {
            offset,
            needed,
            available,
            ..
        }) => {
            assert_eq!(offset, built.results_offset + 24);
            assert_eq!(needed, 48);
            assert_eq!(available, 47);
        }
        other => panic!("expected truncation, got {:?}", other.map(|o| o.results)),
    }
}

#[test]
fn shifted_results_offset_is_an_integrity_error() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    set_trailer_slot(&mut bytes, 2, built.results_offset as i32 + 4);

    match OutputReader::from_bytes(&bytes, DecodeOptions::default()) {
        Err(OutputError::Integrity {
            segment,
            offset,
            declared,
        }) => {
            assert_eq!(segment, "results segment");
            assert_eq!(offset, built.results_offset);
            assert_eq!(declared, built.results_offset + 4);
        }
        other => panic!("expected integrity error, got {:?}", other.map(|r| r.num_periods())),
    }
}

#[test]
fn shifted_id_name_offset_is_an_integrity_error() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    set_trailer_slot(&mut bytes, 0, built.id_name_offset as i32 + 4);

    match OutputReader::from_bytes(&bytes, DecodeOptions::default()) {
        Err(OutputError::Integrity {
            segment,
            offset,
            declared,
        }) => {
            assert_eq!(segment, "name tables");
            assert_eq!(offset, built.id_name_offset);
            assert_eq!(declared, built.id_name_offset + 4);
        }
        other => panic!("expected integrity error, got {:?}", other.map(|r| r.num_periods())),
    }
}

#[test]
fn short_reporting_block_stops_before_the_trailer() {
    let built = OutputFileBuilder::drainage()
        .node("J1")
        .variables(VariableScope::Node, &[0])
        .build();
    let mut bytes = built.bytes.clone();
    // Drop the report step; the trailer follows the report start directly.
    bytes.drain(built.results_offset - 4..built.results_offset);

    match OutputReader::from_bytes(&bytes, DecodeOptions::default()) {
        Err(OutputError::Truncated {
            context,
            offset,
            needed,
            available,
        }) => {
            assert_eq!(context, "reporting block");
            assert_eq!(offset, built.results_offset - 4);
            assert_eq!(needed, 4);
            assert_eq!(available, 0);
        }
        other => panic!("expected truncation, got {:?}", other.map(|r| r.num_periods())),
    }
}

#[test]
fn name_table_cannot_read_into_the_trailer() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    // Everything after the prolog is gone except the trailer.
    bytes.drain(built.id_name_offset + 4..bytes.len() - 24);

    let err = OutputReader::from_bytes(&bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::Format { .. } | OutputError::Truncated { .. }));
    assert!(err.offset().unwrap() <= built.id_name_offset + 4);
}

#[test]
fn shifted_property_offset_is_an_integrity_error() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    set_trailer_slot(&mut bytes, 1, built.property_offset as i32 - 4);

    let err = OutputReader::from_bytes(&bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::Integrity { segment: "property tables", .. }));
    assert_eq!(err.offset(), Some(built.property_offset));
}

#[test]
fn failed_run_aborts_by_default() {
    let built = small_drainage_model().error_code(3).build();
    let err = decode(&built.bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::SimulationFailure { error_code: 3, .. }));
    assert_eq!(err.offset(), Some(built.bytes.len() - 8));
}

#[test]
fn failed_run_can_decode_what_is_available() {
    let built = small_drainage_model().error_code(3).build();
    let mut bytes = built.bytes.clone();
    // Three periods declared, two and a fraction written.
    set_trailer_slot(&mut bytes, 3, 3);
    insert_before_trailer(&mut bytes, &[0u8; 10]);

    let options = DecodeOptions::default().with_failure_policy(FailurePolicy::DecodeAvailable);
    let reader = OutputReader::from_bytes(&bytes, options).unwrap();
    assert_eq!(reader.num_periods(), 2);
    assert_eq!(reader.results_layout().declared_periods(), 3);
    let results = reader.decode().unwrap();
    assert_eq!(results.subcatchments()["S1"].len(), 2);

    let err = decode(&bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::SimulationFailure { .. }));
}

#[test]
fn declared_period_mismatch_without_failure_is_truncation() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    set_trailer_slot(&mut bytes, 3, 3);
    let options = DecodeOptions::default().with_failure_policy(FailurePolicy::DecodeAvailable);
    let err = decode(&bytes, options).unwrap_err();
    assert!(matches!(err, OutputError::Truncated { .. }));
}

#[test]
fn wrong_dialect_is_a_format_error() {
    let built = small_drainage_model().build();
    let options = DecodeOptions::default().with_profile(FormatProfile::DISTRIBUTION);
    let err = decode(&built.bytes, options).unwrap_err();
    assert!(matches!(err, OutputError::Format { offset: 0, .. }));
}

#[test]
fn closing_magic_must_match_prolog() {
    let built = small_drainage_model().build();
    let mut bytes = built.bytes.clone();
    set_trailer_slot(&mut bytes, 5, 123);
    let err = decode(&bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::Format { .. }));
    assert_eq!(err.offset(), Some(bytes.len() - 4));
}

#[test]
fn repeated_timestamp_is_a_format_error() {
    let built = OutputFileBuilder::drainage()
        .node("J1")
        .variables(VariableScope::Node, &[0])
        .period(5.0, &[1.0])
        .period(5.0, &[2.0])
        .build();
    let err = decode(&built.bytes, DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::Format { .. }));
    assert_eq!(err.offset(), Some(built.results_offset + 12));
}

#[test]
fn buffer_shorter_than_trailer_is_truncation() {
    let err = decode(&[0u8; 10], DecodeOptions::default()).unwrap_err();
    assert!(matches!(err, OutputError::Truncated { .. }));
}
