//! Format command: Allman-style reformatting without annotations.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use fnlines_core::Config;

use super::{OutputMode, emit_result, read_source_file};

/// Arguments for the `format` subcommand.
#[derive(Args, Debug)]
pub struct FormatArgs {
    /// C source or header file.
    pub file: Utf8PathBuf,

    /// Replace the file instead of printing the result.
    #[arg(short, long, conflicts_with = "check")]
    pub write: bool,

    /// Fail if the file is not already in Allman style.
    #[arg(long)]
    pub check: bool,

    /// Process the file even if its extension is not a C extension.
    #[arg(long)]
    pub force: bool,
}

/// Move function braces onto their own lines.
#[instrument(name = "cmd_format", skip_all, fields(file = %args.file))]
pub fn cmd_format(args: FormatArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(file = %args.file, write = args.write, check = args.check, "executing format command");

    let content = read_source_file(&args.file, args.force, config)?;
    let formatted = fnlines_core::format_only(&content);

    let mode = OutputMode {
        write: args.write,
        check: args.check,
    };
    let written = emit_result(&args.file, &content, &formatted, mode, global_json, "format")?;

    if args.write && !global_json {
        let style = fnlines_core::analyze(&formatted);
        if written {
            println!(
                "{} {} ({}/{} functions in Allman style)",
                "Formatted".green(),
                args.file,
                style.functions_formatted,
                style.function_count
            );
        } else {
            println!("{} is already formatted", args.file);
        }
    }

    Ok(())
}
