use std::{error::Error, process::ExitCode};

use clap::Parser;
use tracing_subscriber::{EnvFilter, Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use wallclock::{BrokenDownTime, LocalTimeReader, TimeZoneSetting, utc_offset_seconds};

/// Print the current local time and its UTC offset.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// A canonical timezone name, e.g. "Pacific/Auckland". Defaults to the
    /// host's time zone.
    #[arg(long, default_value = wallclock::HOST_TIMEZONE_NAME)]
    timezone: String,

    /// Print the record as JSON.
    #[arg(long, conflicts_with = "offset_only")]
    json: bool,

    /// Only print the UTC offset in seconds.
    #[arg(long)]
    offset_only: bool,

    /// Log debug messages to stderr. `RUST_LOG` takes precedence when set.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(error) => {
            print_error(error);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<String, Box<dyn Error>> {
    let timezone = TimeZoneSetting::from_name(&args.timezone)?;
    let record = LocalTimeReader::with_timezone(timezone).current_local_time()?;

    if args.offset_only {
        return Ok(utc_offset_seconds(&record).to_string());
    }

    if args.json {
        return Ok(serde_json::to_string_pretty(&record)?);
    }

    Ok(render_fields(&record))
}

fn render_fields(record: &BrokenDownTime) -> String {
    [
        format!("year: {}", record.year()),
        format!("month: {}", record.month()),
        format!("day: {}", record.day()),
        format!("hour: {}", record.hour()),
        format!("minute: {}", record.minute()),
        format!("second: {}", record.second()),
        format!("weekday: {}", record.weekday()),
        format!("day_of_year: {}", record.day_of_year()),
        format!("is_dst: {}", record.is_dst()),
        format!("utc_offset_seconds: {}", utc_offset_seconds(record)),
        format!("abbreviation: {}", record.abbreviation().unwrap_or("-")),
    ]
    .join("\n")
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        filter::LevelFilter::DEBUG
    } else {
        filter::LevelFilter::WARN
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let stderr_log = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(env_filter))
        .init();
}

fn print_error(error: impl ToString) {
    eprintln!(
        "\x1b[31;1m{}\x1b[0m",
        capitalise_first_char(&error.to_string())
    )
}

fn capitalise_first_char(string: &str) -> String {
    let mut chars = string.chars();
    let Some(first) = chars.next() else {
        return String::with_capacity(0);
    };
    first.to_uppercase().chain(chars).collect()
}
