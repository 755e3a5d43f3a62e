//! Analyze command: read-only style report.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use fnlines_core::Config;

use super::read_source_file;

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// C source or header file.
    pub file: Utf8PathBuf,

    /// Fail unless every function is already in Allman style.
    #[arg(long)]
    pub strict: bool,

    /// Process the file even if its extension is not a C extension.
    #[arg(long)]
    pub force: bool,
}

/// Report line totals and Allman compliance for a file.
#[instrument(name = "cmd_analyze", skip_all, fields(file = %args.file))]
pub fn cmd_analyze(args: AnalyzeArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(file = %args.file, strict = args.strict, "executing analyze command");

    let content = read_source_file(&args.file, args.force, config)?;
    let report = fnlines_core::analyze(&content);
    let compliant = report.is_allman_compliant();

    if global_json {
        let mut value = serde_json::to_value(report)?;
        value["allman_compliant"] = serde_json::Value::Bool(compliant);
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", args.file.bold());
        println!("  {}: {}", "Total lines".dimmed(), report.total_lines);
        println!("  {}: {}", "Code lines".dimmed(), report.code_lines);
        println!("  {}: {}", "Comment lines".dimmed(), report.comment_lines);
        println!("  {}: {}", "Empty lines".dimmed(), report.empty_lines);
        println!(
            "  {}: {}/{}",
            "Allman functions".dimmed(),
            report.functions_formatted,
            report.function_count
        );
    }

    if args.strict && !compliant {
        bail!(
            "{}: {} of {} functions are not in Allman style. Run `fnlines format --write {}`.",
            args.file,
            report.function_count - report.functions_formatted,
            report.function_count,
            args.file,
        );
    }
    if args.strict && !global_json {
        println!("{} {} is in Allman style", "PASS:".green(), args.file);
    }

    Ok(())
}
