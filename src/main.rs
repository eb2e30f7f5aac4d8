use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use asm12::output::AssembledImage;
use asm12::word::Are;
use asm12::AssemblerConfig;

/// Assembles source files for the 12-bit teaching machine.
#[derive(Parser)]
#[command(name = "asm12", version, about)]
struct Cli {
    /// Base file names to assemble (the source extension is added automatically).
    files: Vec<PathBuf>,

    /// Keep the macro-expanded source next to the output, even if the
    /// configuration says otherwise.
    #[arg(long)]
    keep_expanded: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            eprintln!("asm12: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when every file was read and assembled but at
/// least one had errors; `Err` only for problems outside the assembler
/// itself, like a broken configuration file.
fn run() -> Result<bool> {
    let cli = Cli::parse();

    if cli.files.is_empty() {
        anyhow::bail!("no input files");
    }

    let config = AssemblerConfig::load().context("loading configuration")?;

    let mut all_ok = true;
    for base in &cli.files {
        if !assemble_one(base, &config, cli.keep_expanded) {
            all_ok = false;
        }
    }

    Ok(all_ok)
}

fn assemble_one(base: &Path, config: &AssemblerConfig, force_keep_expanded: bool) -> bool {
    let source_path = base.with_extension(config.source_extension.trim_start_matches('.'));

    let result = match asm12::assemble_file(&source_path) {
        Ok(result) => result,
        Err(err) => {
            eprintln!("Error: {err} '{}'", source_path.display());
            return false;
        }
    };

    let file_name = source_path.display().to_string();
    asm12::diagnostics::report(&file_name, &result.diagnostics);

    let Some(image) = &result.image else {
        return false;
    };

    if let Err(err) = write_outputs(base, config, image) {
        eprintln!("Error: {err} '{}'", base.display());
        return false;
    }

    if force_keep_expanded || config.keep_expanded {
        if let Err(err) = write_expanded(base, &result.expanded_source) {
            eprintln!("Error: {err} '{}'", base.display());
        }
    }

    true
}

fn output_path(base: &Path, config: &AssemblerConfig, extension: &str) -> PathBuf {
    let file_name = base
        .file_name()
        .map(|name| Path::new(name).with_extension(extension))
        .unwrap_or_else(|| PathBuf::from(extension));
    if config.output_dir.as_os_str().is_empty() || config.output_dir == Path::new(".") {
        base.with_extension(extension)
    } else {
        config.output_dir.join(file_name)
    }
}

fn write_outputs(base: &Path, config: &AssemblerConfig, image: &AssembledImage) -> io::Result<()> {
    if !config.output_dir.as_os_str().is_empty() && config.output_dir != Path::new(".") {
        fs::create_dir_all(&config.output_dir)?;
    }

    let mut object_text = String::new();
    for word in &image.memory {
        let are = are_letter(word.are);
        object_text.push_str(&format!("{:04}\t{:04}\t{are}\n", word.address, word.value));
    }
    fs::write(output_path(base, config, "ob"), object_text)?;

    if !image.entries.is_empty() {
        let mut entry_text = String::new();
        for entry in &image.entries {
            entry_text.push_str(&format!("{}\t{:04}\n", entry.name, entry.address));
        }
        fs::write(output_path(base, config, "ent"), entry_text)?;
    }

    if !image.externals.is_empty() {
        let mut extern_text = String::new();
        for ext in &image.externals {
            extern_text.push_str(&format!("{}\t{:04}\n", ext.name, ext.address));
        }
        fs::write(output_path(base, config, "ext"), extern_text)?;
    }

    Ok(())
}

fn write_expanded(base: &Path, expanded_source: &[String]) -> io::Result<()> {
    fs::write(base.with_extension("am"), expanded_source.join("\n"))
}

fn are_letter(are: Are) -> char {
    match are {
        Are::Absolute => 'A',
        Are::Relocatable => 'R',
        Are::External => 'E',
    }
}
