use serde::Serialize;
use std::io::{BufWriter, ErrorKind, Read, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliogenius_isbn::config::{Config, OutputFormat};
use bibliogenius_isbn::{Isbn, IsbnKind, PartsWidth, PublicationRange, RangeTable, scanner};

const USAGE: &str = "\
Usage: isbn [--ranges <file>] [--cache <file>] [--json] <command> [args]

Commands:
  check <isbn>...         validate and convert
  split [--four] <isbn>... split into registration parts
  range <isbn>            registrant range of an ISBN-13
  list <isbn> [limit]     print every ISBN-13 of that range
  scan [--image <file>]   find ISBNs in stdin text (or an image via tesseract)
  info                    describe the loaded range table
  build-cache <out>       write the parsed table to <out> (.json or .msgpack)";

#[derive(Serialize)]
struct Report<'a> {
    input: &'a str,
    isbn: &'a str,
    valid: bool,
    kind: Option<IsbnKind>,
    isbn10: Option<&'a str>,
    isbn13: Option<&'a str>,
    dashed: &'a str,
    parts: Option<&'a [String]>,
    group: Option<String>,
    agency: Option<&'a str>,
}

impl<'a> Report<'a> {
    fn new(input: &'a str, isbn: &'a Isbn, width: PartsWidth) -> Self {
        let group = isbn.registration_group();
        Self {
            input,
            isbn: isbn.as_str(),
            valid: isbn.is_valid(),
            kind: isbn.kind(),
            isbn10: isbn.isbn10(),
            isbn13: isbn.isbn13(),
            dashed: isbn.with_dashes(),
            parts: isbn.parts(width),
            group: group.map(|g| g.dashed_prefix()),
            agency: group.and_then(|g| g.agency()),
        }
    }

    fn print_text(&self) {
        if !self.valid {
            println!("{}: invalid", self.input);
            return;
        }
        println!("{}: valid {}", self.input, self.dashed);
        if let Some(isbn10) = self.isbn10 {
            println!("  ISBN-10: {}", isbn10);
        }
        if let Some(isbn13) = self.isbn13 {
            println!("  ISBN-13: {}", isbn13);
        }
        match self.parts {
            Some(parts) => println!("  parts:   {}", parts.join(" | ")),
            None => println!("  parts:   unassigned range"),
        }
        if let Some(agency) = self.agency {
            println!("  group:   {}", agency);
        }
    }
}

#[derive(Serialize)]
struct RangeReport {
    seed: String,
    prefix: String,
    parts: Vec<String>,
    number_of_publications: u64,
    range: String,
}

/// Removes `flag` and its value from `args`.
fn take_value(args: &mut Vec<String>, flag: &str) -> Option<String> {
    let pos = args.iter().position(|arg| arg == flag)?;
    args.remove(pos);
    (pos < args.len()).then(|| args.remove(pos))
}

/// Removes `--four` from `args`. `None` when it is given to any command
/// other than `split`.
fn take_width(command: &str, args: &mut Vec<String>) -> Option<PartsWidth> {
    match (take_flag(args, "--four"), command) {
        (false, _) => Some(PartsWidth::Five),
        (true, "split") => Some(PartsWidth::Four),
        (true, _) => None,
    }
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    match args.iter().position(|arg| arg == flag) {
        Some(pos) => {
            args.remove(pos);
            true
        }
        None => false,
    }
}

fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            true
        }
        Err(e) => {
            eprintln!("Failed to encode output: {}", e);
            false
        }
    }
}

fn exit_code(ok: bool) -> ExitCode {
    if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

fn load_table(config: &Config) -> Option<Arc<RangeTable>> {
    match RangeTable::load_with_cache(&config.range_file, config.cache_file.as_deref()) {
        Ok(table) => {
            tracing::info!(
                "Loaded {} registration groups from {}",
                table.len(),
                config.range_file.display()
            );
            Some(Arc::new(table))
        }
        Err(e) => {
            eprintln!(
                "Failed to load range table {}: {}",
                config.range_file.display(),
                e
            );
            None
        }
    }
}

fn check(
    table: Arc<RangeTable>,
    inputs: &[String],
    width: PartsWidth,
    output: OutputFormat,
) -> ExitCode {
    let isbns: Vec<Isbn> = inputs
        .iter()
        .map(|input| Isbn::new(input, Arc::clone(&table)))
        .collect();
    let reports: Vec<Report> = inputs
        .iter()
        .zip(&isbns)
        .map(|(input, isbn)| Report::new(input, isbn, width))
        .collect();

    let all_valid = reports.iter().all(|r| r.valid);
    match output {
        OutputFormat::Json => {
            if !print_json(&reports) {
                return ExitCode::FAILURE;
            }
        }
        OutputFormat::Text => reports.iter().for_each(Report::print_text),
    }

    if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}

fn range(table: Arc<RangeTable>, seed: &str, output: OutputFormat) -> ExitCode {
    let Some(range) = PublicationRange::new(table, seed) else {
        eprintln!("{}: not a decomposable ISBN", seed);
        return ExitCode::from(2);
    };

    let report = RangeReport {
        seed: seed.to_string(),
        prefix: range.prefix().to_string(),
        parts: range.parts().to_vec(),
        number_of_publications: range.number_of_publications(),
        range: range.to_string(),
    };
    match output {
        OutputFormat::Json => exit_code(print_json(&report)),
        OutputFormat::Text => {
            println!("{}", report.range);
            println!("  registrant:   {}", report.parts.join("-"));
            println!("  publications: {}", report.number_of_publications);
            ExitCode::SUCCESS
        }
    }
}

fn list(table: Arc<RangeTable>, seed: &str, limit: Option<&String>) -> ExitCode {
    let Some(range) = PublicationRange::new(table, seed) else {
        eprintln!("{}: not a decomposable ISBN", seed);
        return ExitCode::from(2);
    };
    let limit = match limit.map(|l| l.parse::<usize>()) {
        None => usize::MAX,
        Some(Ok(limit)) => limit,
        Some(Err(_)) => {
            eprintln!("Invalid limit");
            return ExitCode::FAILURE;
        }
    };

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    match write_isbns(&mut out, range.isbn13s().take(limit)) {
        Ok(()) => ExitCode::SUCCESS,
        // Stop quietly when the reader goes away (e.g. piped into head)
        Err(e) if e.kind() == ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Failed to write output: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// One ISBN per line, flushed at the end.
fn write_isbns(out: &mut impl Write, isbns: impl Iterator<Item = String>) -> std::io::Result<()> {
    for isbn in isbns {
        writeln!(out, "{}", isbn)?;
    }
    out.flush()
}

fn scan(mut args: Vec<String>, output: OutputFormat) -> ExitCode {
    let found = if let Some(image) = take_value(&mut args, "--image") {
        match scanner::scan_image(&image) {
            Ok(found) => found,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        let mut text = String::new();
        if let Err(e) = std::io::stdin().read_to_string(&mut text) {
            eprintln!("Failed to read stdin: {}", e);
            return ExitCode::FAILURE;
        }
        scanner::scan(&text)
    };

    match output {
        OutputFormat::Json => exit_code(print_json(&found)),
        OutputFormat::Text => {
            found.iter().for_each(|isbn| println!("{}", isbn));
            ExitCode::SUCCESS
        }
    }
}

fn info(table: &RangeTable, output: OutputFormat) -> ExitCode {
    #[derive(Serialize)]
    struct Info<'a> {
        source: Option<&'a str>,
        serial_number: Option<&'a str>,
        date: Option<&'a str>,
        groups: usize,
        rules: usize,
    }

    let header = table.header();
    let info = Info {
        source: header.source.as_deref(),
        serial_number: header.serial_number.as_deref(),
        date: header.date.as_deref(),
        groups: table.len(),
        rules: table.rule_count(),
    };
    match output {
        OutputFormat::Json => exit_code(print_json(&info)),
        OutputFormat::Text => {
            println!("source:  {}", info.source.unwrap_or("unknown"));
            println!("serial:  {}", info.serial_number.unwrap_or("unknown"));
            println!("date:    {}", info.date.unwrap_or("unknown"));
            println!("groups:  {}", info.groups);
            println!("rules:   {}", info.rules);
            ExitCode::SUCCESS
        }
    }
}

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliogenius_isbn=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let mut config = Config::from_env();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(path) = take_value(&mut args, "--ranges") {
        config.range_file = path.into();
    }
    if let Some(path) = take_value(&mut args, "--cache") {
        config.cache_file = Some(path.into());
    }
    if take_flag(&mut args, "--json") {
        config.output = OutputFormat::Json;
    }

    if args.is_empty() || take_flag(&mut args, "--help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }
    let command = args.remove(0);

    // Scanning needs no range table
    if command == "scan" {
        return scan(args, config.output);
    }

    let Some(width) = take_width(&command, &mut args) else {
        eprintln!("--four is only accepted by split\n\n{}", USAGE);
        return ExitCode::FAILURE;
    };

    let Some(table) = load_table(&config) else {
        return ExitCode::FAILURE;
    };

    match (command.as_str(), args.as_slice()) {
        ("check", [_, ..]) => check(table, &args, width, config.output),
        ("split", [_, ..]) => check(table, &args, width, config.output),
        ("range", [seed]) => range(table, seed, config.output),
        ("list", [seed, rest @ ..]) if rest.len() <= 1 => list(table, seed, rest.first()),
        ("info", []) => info(&table, config.output),
        ("build-cache", [out]) => match table.save(out) {
            Ok(()) => {
                tracing::info!("Wrote range cache to {}", out);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Failed to write {}: {}", out, e);
                ExitCode::FAILURE
            }
        },
        _ => {
            eprintln!("{}", USAGE);
            ExitCode::FAILURE
        }
    }
}
