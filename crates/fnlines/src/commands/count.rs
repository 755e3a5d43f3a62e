//! Count command: list functions with their body line counts.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use fnlines_core::Config;

use super::read_source_file;

/// Arguments for the `count` subcommand.
#[derive(Args, Debug)]
pub struct CountArgs {
    /// C source or header file.
    pub file: Utf8PathBuf,

    /// Maximum body lines per function (overrides config).
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Process the file even if its extension is not a C extension.
    #[arg(long)]
    pub force: bool,
}

/// Count significant body lines of every function in a file.
#[instrument(name = "cmd_count", skip_all, fields(file = %args.file))]
pub fn cmd_count(args: CountArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(file = %args.file, max_lines = ?args.max_lines, "executing count command");

    let content = read_source_file(&args.file, args.force, config)?;
    let max_lines = args.max_lines.or(config.max_lines);
    let report = fnlines_core::functions(&content, max_lines);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for function in &report.functions {
            let over = max_lines.is_some_and(|max| function.line_count > max);
            let count = if over {
                function.line_count.red().to_string()
            } else {
                function.line_count.to_string()
            };
            println!(
                "{}:{}: {} {}",
                args.file,
                function.start_line,
                function.name.bold(),
                count
            );
        }
    }

    if !report.pass {
        let max = max_lines.unwrap_or_default();
        bail!(
            "{}: {} function(s) longer than {max} lines: {}",
            args.file,
            report.over_limit.len(),
            report.over_limit.join(", "),
        );
    }
    if let Some(max) = max_lines
        && !global_json
    {
        println!(
            "{} {} functions within {max} lines",
            "PASS:".green(),
            report.functions.len()
        );
    }

    Ok(())
}
