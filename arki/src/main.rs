/*
Copyright 2026 Ian Moffett

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// ARK-I assembler for Y-64.
#[derive(Parser)]
#[command(name = "arki", version, about = "ARK-I assembler for Y-64", disable_version_flag = true)]
struct Opts {
    /// Input source files
    inputs: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long, default_value = "y64.bin")]
    output: PathBuf,

    /// Display the version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

fn assemble_file(input: &Path, output: &Path) -> Result<()> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("failed to read input file: {}", input.display()))?;

    let image = arki::assemble(&source)
        .with_context(|| format!("failed to assemble {}", input.display()))?;

    fs::write(output, &image)
        .with_context(|| format!("failed to write output file: {}", output.display()))?;

    info!("assembled {} ({} bytes)", input.display(), image.len());
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    let opts = Opts::parse();

    if opts.inputs.is_empty() {
        eprintln!("fatal: expected input file");
        return ExitCode::FAILURE;
    }

    let mut failed = false;
    for input in &opts.inputs {
        if let Err(err) = assemble_file(input, &opts.output) {
            eprintln!("[error]: {err:#}");
            failed = true;
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
