//! Strip command: remove line-count annotations.

use camino::Utf8PathBuf;
use clap::Args;
use tracing::{debug, instrument};

use fnlines_core::Config;
use fnlines_core::annotate::is_annotation;

use super::{OutputMode, emit_result, read_input_file};

/// Arguments for the `strip` subcommand.
#[derive(Args, Debug)]
pub struct StripArgs {
    /// File to clean. Any extension is accepted.
    pub file: Utf8PathBuf,

    /// Replace the file instead of printing the result.
    #[arg(short, long)]
    pub write: bool,
}

/// Remove every line-count annotation from a file.
#[instrument(name = "cmd_strip", skip_all, fields(file = %args.file))]
pub fn cmd_strip(args: StripArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(file = %args.file, write = args.write, "executing strip command");

    let content = read_input_file(&args.file, config.input_limit())?;
    let stripped = fnlines_core::strip_annotations(&content);
    let removed = content.lines().filter(|l| is_annotation(l)).count();

    let mode = OutputMode {
        write: args.write,
        check: false,
    };
    emit_result(&args.file, &content, &stripped, mode, global_json, "strip")?;

    if args.write && !global_json {
        println!("Removed {removed} annotation(s) from {}", args.file);
    }

    Ok(())
}
