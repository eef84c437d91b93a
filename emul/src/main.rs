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
use emul::Soc;
use std::fs;
use std::path::PathBuf;

const GIB: usize = 0x4000_0000;

/// Y-64 system emulator.
#[derive(Parser)]
#[command(name = "emul", version, about = "Y-64 emulator - beep boop!", disable_version_flag = true)]
struct Opts {
    /// Firmware ROM file
    #[arg(short = 'f', long = "firmware")]
    firmware: PathBuf,

    /// Main memory capacity in GiB
    #[arg(short = 'r', long = "ram", default_value_t = 2)]
    ram_gib: usize,

    /// microSD media image
    #[arg(short = 's', long = "sd")]
    sd: Option<PathBuf>,

    /// Display the version
    #[arg(short = 'v', long = "version", action = ArgAction::Version)]
    version: Option<bool>,
}

fn main() -> Result<()> {
    env_logger::init();
    let opts = Opts::parse();

    let firmware = fs::read(&opts.firmware)
        .with_context(|| format!("failed to open firmware ROM: {}", opts.firmware.display()))?;

    let mut soc =
        Soc::power_up(opts.ram_gib * GIB).context("failed to perform soc power-up")?;
    soc.flash(&firmware).context("failed to flash firmware ROM")?;

    if let Some(path) = &opts.sd {
        let image = fs::read(path)
            .with_context(|| format!("failed to read microsd image: {}", path.display()))?;
        soc.bus
            .microsd_insert(&image)
            .context("failed to insert microsd media")?;
    }

    let result = soc.run();
    soc.cpu.dump();
    result.context("emulation aborted")?;
    Ok(())
}
