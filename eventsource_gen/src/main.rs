// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

use anyhow::{Context, Result};
use clap::Parser;
use eventsource_gen::host::HostDescription;
use eventsource_gen::model::CompilationUnit;
use eventsource_gen::settings::{FrameworkVersion, GeneratorSettings};
use eventsource_gen::writer::render_unit;
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

/// Generates EventSource implementations from template classes.
#[derive(Parser)]
#[command(name = "eventsource-gen", version)]
struct Args {
    /// JSON model of the compilation unit and its host.
    input: PathBuf,

    /// Write the generated C# here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Target framework version; 4.6 and later enable char, IntPtr and byte*.
    #[arg(long, default_value_t = FrameworkVersion::V4_6)]
    framework: FrameworkVersion,

    /// More logging (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Deserialize)]
struct Input {
    #[serde(flatten)]
    unit: CompilationUnit,
    #[serde(default)]
    host: HostDescription,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<ExitCode> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let input: Input = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let settings = GeneratorSettings::new(args.framework);
    let unit = eventsource_gen::generate_unit(&input.unit, &input.host, &settings);

    for (template_name, diagnostics) in unit.failures() {
        for diagnostic in diagnostics.iter() {
            eprintln!("{}", diagnostic.to_report_line());
        }
        log::info!("{template_name} was not generated");
    }

    let output = render_unit(&unit);
    match &args.output {
        Some(path) => fs::write(path, output)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .write_all(output.as_bytes())
            .context("failed to write to stdout")?,
    }

    Ok(if unit.has_failures() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
