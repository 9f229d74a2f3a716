/*
Copyright 2026 The mipsdisasm Authors

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
use clap::Parser;
use log::LevelFilter;
use mipsdisasm::cli::{output_stem, resolve_ranges, Opts};
use mipsdisasm::{disassemble, range};
use std::fs;
use std::io::Write;

fn main() -> Result<()> {
    let opts = Opts::parse();

    env_logger::Builder::new()
        .filter_level(if opts.verbose { LevelFilter::Debug } else { LevelFilter::Warn })
        .init();

    log::info!("reading input file '{}'", opts.input.display());
    let rom = fs::read(&opts.input).with_context(|| format!("failed to read input file '{}'", opts.input.display()))?;

    let parsed_ranges = opts
        .ranges
        .iter()
        .map(|arg| range::parse(arg).map_err(anyhow::Error::msg))
        .collect::<Result<Vec<_>>>()
        .context("failed to parse a RANGE argument")?;
    let ranges = resolve_ranges(parsed_ranges, rom.len() as u64);

    let stem = output_stem(opts.output.as_deref());
    let text = disassemble(&rom, &ranges, opts.syntax.into(), opts.merge_pseudo, &stem).context("disassembly failed")?;

    match &opts.output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("failed to write output file '{}'", path.display()))?;
            println!("Wrote disassembly to {}", path.display());
        }
        None => {
            std::io::stdout().write_all(text.as_bytes()).context("failed to write disassembly to stdout")?;
        }
    }

    Ok(())
}
