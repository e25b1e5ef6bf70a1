use std::env;
use std::fs;

use swmm_out_reader::{DecodeOptions, Dialect, FailurePolicy, FormatProfile, OutputReader};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-output-file> [options]", args[0]);
        eprintln!("  --dialect drainage|distribution   File dialect (default: drainage)");
        eprintln!("  --partial                         Decode the periods of a failed run");
        eprintln!("  --parallel                        Decode periods in parallel");
        std::process::exit(1);
    }

    let path = &args[1];
    let mut options = DecodeOptions::default();

    if let Some(idx) = args.iter().position(|arg| arg == "--dialect") {
        let dialect = match args.get(idx + 1).map(String::as_str) {
            Some("drainage") => Dialect::Drainage,
            Some("distribution") => Dialect::Distribution,
            Some(other) => {
                eprintln!("ERROR: Unknown dialect '{}'. Expected drainage or distribution.", other);
                std::process::exit(1);
            }
            None => {
                eprintln!("ERROR: --dialect flag requires an argument.");
                std::process::exit(1);
            }
        };
        options = options.with_profile(FormatProfile::for_dialect(dialect));
    }
    if args.iter().any(|arg| arg == "--partial") {
        options = options.with_failure_policy(FailurePolicy::DecodeAvailable);
    }
    let parallel = args.iter().any(|arg| arg == "--parallel");

    println!("Reading output file: {}", path);
    println!("{}", "=".repeat(60));

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("\nERROR: Failed to load file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let reader = match OutputReader::from_bytes(&bytes, options) {
        Ok(reader) => reader,
        Err(e) => {
            eprintln!("\nERROR: Failed to read output file");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    };

    let prolog = reader.prolog();
    println!("\nFile Information:");
    println!("  Dialect: {}", prolog.dialect);
    println!("  Version: {}", prolog.version);
    match prolog.flow_units {
        Some(units) => println!("  Flow units: {}", units),
        None => println!("  Flow units: code {}", prolog.flow_unit_code),
    }
    println!("  Report start: {}", reader.reporting().start);
    println!("  Report step: {} s", reader.reporting().step_seconds);
    if reader.closing().error_code != 0 {
        println!("  Simulation error code: {}", reader.closing().error_code);
    }

    println!("\nEntities:");
    for names in reader.catalog().tables() {
        let preview: Vec<&str> = names.iter().take(5).collect();
        let more = names.len().saturating_sub(preview.len());
        if more > 0 {
            println!(
                "  {}: {} ({}, ... and {} more)",
                names.class(),
                names.len(),
                preview.join(", "),
                more
            );
        } else {
            println!("  {}: {} ({})", names.class(), names.len(), preview.join(", "));
        }
    }

    println!("\nVariables:");
    for list in &reader.variables().lists {
        let keys: Vec<String> = list.keys().iter().map(|k| k.to_string()).collect();
        println!("  {}: {}", list.scope(), keys.join(", "));
    }

    let decoded = if parallel {
        reader.decode_parallel()
    } else {
        reader.decode()
    };

    match decoded {
        Ok(results) => {
            println!("\n{}", "=".repeat(60));
            println!(
                "SUCCESS! Decoded {} periods ({} bytes each).",
                results.period_count(),
                reader.period_stride()
            );
            println!("{}", "=".repeat(60));

            let timestamps = results.timestamps();
            if let (Some(first), Some(last)) = (timestamps.first(), timestamps.last()) {
                println!("  From {} to {}", first, last);
            }
            if let Some(point) = results.system().points().last() {
                println!("\nSystem values at {}:", point.timestamp());
                for (key, value) in point.iter() {
                    println!("  {}: {}", key, value);
                }
            }
        }
        Err(e) => {
            eprintln!("\nERROR: Failed to decode results");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
