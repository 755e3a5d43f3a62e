//! Annotate command: reformat, then write body line counts above each function.

use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use fnlines_core::Config;

use super::{OutputMode, emit_result, read_source_file};

/// Arguments for the `annotate` subcommand.
#[derive(Args, Debug)]
pub struct AnnotateArgs {
    /// C source or header file.
    pub file: Utf8PathBuf,

    /// Replace the file instead of printing the result.
    #[arg(short, long, conflicts_with = "check")]
    pub write: bool,

    /// Fail if the file is not already formatted and annotated.
    #[arg(long)]
    pub check: bool,

    /// Process the file even if its extension is not a C extension.
    #[arg(long)]
    pub force: bool,
}

/// Reformat a file and annotate every function with its body line count.
#[instrument(name = "cmd_annotate", skip_all, fields(file = %args.file))]
pub fn cmd_annotate(args: AnnotateArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(file = %args.file, write = args.write, check = args.check, "executing annotate command");

    let content = read_source_file(&args.file, args.force, config)?;
    let annotated = fnlines_core::annotate(&content);

    let mode = OutputMode {
        write: args.write,
        check: args.check,
    };
    let written = emit_result(
        &args.file,
        &content,
        &annotated,
        mode,
        global_json,
        "annotate",
    )?;

    if args.write && !global_json {
        let style = fnlines_core::analyze(&annotated);
        let summary = format!(
            "{}/{} functions in Allman style",
            style.functions_formatted, style.function_count
        );
        let summary = if style.is_allman_compliant() {
            summary.green().to_string()
        } else {
            summary.yellow().to_string()
        };
        let action = if written { "Updated" } else { "Unchanged" };
        println!("{action} {} ({summary})", args.file);
    }

    Ok(())
}
