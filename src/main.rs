//! `markcut` binary: reads text on stdin and writes the truncated text to stdout.
//!
//! Environment:
//! - `MARKCUT_SETTINGS`: path to a JSON settings file (`{"suffix": "...", "limits": {...}}`)
//! - `MARKCUT_TEXT_LIMIT`: display-length budget, overrides the settings file
//! - `MARKCUT_SUFFIX`: truncation suffix, overrides the settings file
//! - `MARKCUT_REPORT=1`: also write the dissection as JSON to stderr
//! - `RUST_LOG`: log filter

use std::io::{self, Read, Write};
use std::process::ExitCode;

use markcut::{Cutter, CutterResult, CutterSettings, Limits};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("markcut failed: {e}");
            ExitCode::from(1)
        }
    }
}

fn run() -> CutterResult<()> {
    let cutter = Cutter::new(load_settings()?.into_config())?;
    for (key, limit) in cutter.limits() {
        tracing::debug!(key, limit, "Effective limit");
    }

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    let text = input.strip_suffix('\n').unwrap_or(&input);
    let dissection = cutter.dissect(text, &Limits::empty());
    if report_requested() {
        let json = serde_json::to_string_pretty(&dissection)?;
        writeln!(io::stderr(), "{json}")?;
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{}", dissection.content)?;
    Ok(())
}

/// Settings file first, then individual environment overrides.
fn load_settings() -> CutterResult<CutterSettings> {
    let mut settings = match std::env::var("MARKCUT_SETTINGS") {
        Ok(path) => CutterSettings::from_path(path)?,
        Err(_) => CutterSettings::default(),
    };

    if let Some(limit) = std::env::var("MARKCUT_TEXT_LIMIT")
        .ok()
        .and_then(|v| v.parse().ok())
    {
        settings.limits = settings.limits.with_text(limit);
    }

    if let Ok(suffix) = std::env::var("MARKCUT_SUFFIX") {
        settings.suffix = suffix;
    }

    Ok(settings)
}

fn report_requested() -> bool {
    std::env::var("MARKCUT_REPORT").is_ok_and(|v| v == "1")
}
