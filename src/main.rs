use anyhow::{Context, Result};
use clap::*;
use exhume_pml::core::{ObjectParsed, ParserInput};
use exhume_pml::parsers::build_registry_with_options;
use exhume_pml::pml::format::csv_header;
use exhume_pml::pml::{PmlReader, ReaderOptions};
use log::{LevelFilter, warn};
use std::io::{BufWriter, Write};

/// Write every event of `path` as Process Monitor compatible CSV on stdout.
fn export_csv(path: &str, options: ReaderOptions) -> Result<usize> {
    let reader = PmlReader::open(path)
        .with_context(|| format!("failed to open PML {path}"))?
        .with_options(options);
    let first_event_date = reader.get(0).ok().map(|e| e.date);

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    writeln!(out, "{}", csv_header())?;

    let mut count = 0usize;
    for (index, event) in reader.iter().enumerate() {
        match event {
            Ok(event) => {
                writeln!(out, "{}", event.csv_record(first_event_date).to_csv_line())?;
                count += 1;
            }
            Err(e) => warn!("PML: skipping event {index}: {e}"),
        }
    }
    out.flush()?;
    Ok(count)
}

fn main() -> Result<()> {
    let matches = Command::new("exhume_pml")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Decode a Process Monitor PML capture and output JSONL or CSV.")
        .arg(
            Arg::new("list_parsers")
                .long("list-parsers")
                .help("List available parsers (name + description) and exit.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_parser(value_parser!(String))
                .required_unless_present("list_parsers")
                .help("Path to the PML capture"),
        )
        .arg(
            Arg::new("parser")
                .short('p')
                .long("parser")
                .value_parser(value_parser!(String))
                .required_unless_present_any(["list_parsers", "csv"])
                .help("Parser name"),
        )
        .arg(
            Arg::new("csv")
                .long("csv")
                .help("Export events in Process Monitor's CSV layout instead of JSONL.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_stacktrace")
                .long("no-stacktrace")
                .help("Do not materialize event stack traces.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no_details")
                .long("no-details")
                .help("Skip operation-specific details (path and operation are still decoded).")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log_level")
                .short('l')
                .long("log-level")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .default_value("info"),
        )
        .get_matches();

    let level_filter = match matches.get_one::<String>("log_level").map(String::as_str) {
        Some("error") => LevelFilter::Error,
        Some("warn") => LevelFilter::Warn,
        Some("debug") => LevelFilter::Debug,
        Some("trace") => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    env_logger::Builder::new().filter_level(level_filter).init();

    let options = ReaderOptions::new()
        .stacktrace(!matches.get_flag("no_stacktrace"))
        .details(!matches.get_flag("no_details"));
    let registry = build_registry_with_options(options);

    if matches.get_flag("list_parsers") {
        println!("available parsers:");
        for p in exhume_pml::list_parsers(&registry) {
            println!("  {:<24} {}", p.name, p.description);
        }
        return Ok(());
    }

    let file_path = matches
        .get_one::<String>("file")
        .context("--file is required")?;

    if matches.get_flag("csv") {
        let count = export_csv(file_path, options)?;
        eprintln!("done: exported {count} events");
        return Ok(());
    }

    let parser_name = matches
        .get_one::<String>("parser")
        .context("--parser is required")?;

    let mut count = 0usize;
    let mut sink = |obj: ObjectParsed| -> Result<()> {
        count += 1;
        println!("{}", obj.json);
        Ok(())
    };

    exhume_pml::run_parser_by_name(
        &registry,
        parser_name,
        ParserInput::Path(file_path.into()),
        &mut sink,
    )?;

    eprintln!("done: emitted {count} objects");
    Ok(())
}
