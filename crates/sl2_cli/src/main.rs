use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde_json::Value as JsonValue;
use sl2_core::core_api::{Engine, Session};
use sl2_render::{
    FILE_PREVIEW_BYTES, JsonStyle, SLOT_PREVIEW_BYTES, hex_dump, modded_file_name,
    render_checksum_json, render_checksum_report, render_json, render_slot_detail,
    render_slot_table,
};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Cli {
    /// Log parse and transplant details to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the ten character slots of a save file.
    List {
        #[arg(value_name = "SAVE.sl2")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Show slot metadata and a hex preview of its raw spans.
    Inspect {
        #[arg(value_name = "SAVE.sl2")]
        path: PathBuf,
        #[arg(
            long,
            value_name = "1-10",
            value_parser = parse_slot_number,
            required_unless_present = "file",
            conflicts_with = "file"
        )]
        slot: Option<usize>,
        /// Preview the start of the whole file instead of a slot.
        #[arg(long)]
        file: bool,
        #[arg(long, value_name = "N")]
        bytes: Option<usize>,
    },
    /// Recompute and compare every stored checksum.
    Verify {
        #[arg(value_name = "SAVE.sl2")]
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Copy a character from one save file into a slot of another.
    Transplant {
        #[arg(long, value_name = "SAVE.sl2")]
        source: PathBuf,
        #[arg(long = "source-slot", value_name = "1-10", value_parser = parse_slot_number)]
        source_slot: usize,
        #[arg(long, value_name = "SAVE.sl2")]
        target: PathBuf,
        #[arg(long = "target-slot", value_name = "1-10", value_parser = parse_slot_number)]
        target_slot: usize,
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Write an untouched copy of the target next to it first.
        #[arg(long)]
        backup: bool,
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = Engine::new();
    match cli.command {
        Command::List { path, json } => {
            let session = open_or_exit(&engine, &path);
            if json {
                print_json(&render_json(session.summary(), JsonStyle::CanonicalV1));
                return;
            }
            print!("{}", render_slot_table(session.summary()));
        }
        Command::Inspect {
            path,
            slot,
            file,
            bytes,
        } => {
            let session = open_or_exit(&engine, &path);
            if file {
                let limit = bytes.unwrap_or(FILE_PREVIEW_BYTES);
                print!(
                    "{}",
                    hex_dump(
                        &format!("File Content: {}", session.file_name()),
                        session.save().bytes(),
                        Some(limit),
                    )
                );
                return;
            }

            let Some(index) = slot else {
                eprintln!("--slot or --file is required");
                process::exit(2);
            };
            let view = session.slot(index).unwrap_or_else(|e| {
                eprintln!("Error selecting slot: {e}");
                process::exit(1);
            });
            let summary = &session.summary().slots[index];
            println!("{}", session.file_name());
            print!("{}", render_slot_detail(summary));
            println!();
            print!("{}", hex_dump("Header Data", view.header_bytes, None));
            println!();
            print!(
                "{}",
                hex_dump(
                    "Slot Data",
                    view.slot_bytes,
                    Some(bytes.unwrap_or(SLOT_PREVIEW_BYTES)),
                )
            );
        }
        Command::Verify { path, json } => {
            let session = open_or_exit(&engine, &path);
            let report = session.checksums();
            if json {
                print_json(&render_checksum_json(&report));
            } else {
                print!("{}", render_checksum_report(&report));
            }
            if !report.all_valid() {
                process::exit(1);
            }
        }
        Command::Transplant {
            source,
            source_slot,
            target,
            target_slot,
            output,
            backup,
            json,
        } => run_transplant(
            &engine,
            &source,
            source_slot,
            &target,
            target_slot,
            output,
            backup,
            json,
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_transplant(
    engine: &Engine,
    source_path: &Path,
    source_slot: usize,
    target_path: &Path,
    target_slot: usize,
    output: Option<PathBuf>,
    backup: bool,
    json: bool,
) {
    let source = open_or_exit(engine, source_path);
    let target = open_or_exit(engine, target_path);

    let outcome = source
        .transplant_into(&target, source_slot, target_slot)
        .unwrap_or_else(|e| {
            eprintln!("Error transplanting character: {e}");
            process::exit(1);
        });

    let timestamp = chrono::Local::now().format(TIMESTAMP_FORMAT).to_string();
    if backup {
        let backup_path =
            target_path.with_file_name(modded_file_name(target.file_name(), "backup", &timestamp));
        fs::write(&backup_path, target.save().bytes()).unwrap_or_else(|e| {
            eprintln!("Error writing backup {}: {e}", backup_path.display());
            process::exit(1);
        });
        log::info!("wrote backup {}", backup_path.display());
    }

    let out_path = output.unwrap_or_else(|| {
        target_path.with_file_name(modded_file_name(target.file_name(), "modded", &timestamp))
    });
    fs::write(&out_path, &outcome.bytes).unwrap_or_else(|e| {
        eprintln!("Error writing {}: {e}", out_path.display());
        process::exit(1);
    });

    let character = source.summary().slots[source_slot].name.clone();
    let substitutions = outcome.owner_id_substitutions;
    let updated = target.reopen(outcome.bytes).unwrap_or_else(|e| {
        eprintln!("Error re-parsing {}: {e}", out_path.display());
        process::exit(1);
    });

    if json {
        print_json(&render_json(updated.summary(), JsonStyle::CanonicalV1));
        return;
    }

    println!(
        "Copied \"{character}\" from slot {} of {} into slot {} of {} ({substitutions} owner id substitutions)",
        source_slot + 1,
        source.file_name(),
        target_slot + 1,
        target.file_name(),
    );
    println!("Wrote edited save to {}", out_path.display());
    println!();
    print!("{}", render_slot_table(updated.summary()));
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn open_or_exit(engine: &Engine, path: &Path) -> Session {
    engine.open_path(path).unwrap_or_else(|e| {
        eprintln!("Error parsing save file: {}", path.display());
        eprintln!("  {e}");
        process::exit(1);
    })
}

fn print_json(value: &JsonValue) {
    let rendered = serde_json::to_string_pretty(value).unwrap_or_else(|e| {
        eprintln!("Error rendering JSON output: {e}");
        process::exit(1);
    });
    println!("{rendered}");
}

/// Slots are numbered from 1 on the command line.
fn parse_slot_number(value: &str) -> Result<usize, String> {
    let number: usize = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid slot '{value}', expected a number from 1"))?;
    if number == 0 {
        return Err("slot numbers start at 1".to_string());
    }
    Ok(number - 1)
}
