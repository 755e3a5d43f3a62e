//! Command implementations.

use std::io::Write;

use anyhow::{Context, bail};
use camino::Utf8Path;
use owo_colors::OwoColorize;
use serde::Serialize;

use fnlines_core::Config;
use fnlines_core::error::check_input_size;

pub mod analyze;
pub mod annotate;
pub mod count;
pub mod format;
pub mod info;
#[cfg(feature = "mcp")]
pub mod serve;
pub mod strip;

/// Read a file and validate its size against the configured limit.
pub fn read_input_file(path: &Utf8Path, max_bytes: Option<usize>) -> anyhow::Result<String> {
    // Preflight: check file size via metadata before reading into memory.
    let metadata =
        std::fs::metadata(path.as_std_path()).with_context(|| format!("failed to read {path}"))?;
    let size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
    check_input_size(path.as_str(), size, max_bytes)?;

    let content = std::fs::read_to_string(path.as_std_path())
        .with_context(|| format!("failed to read {path}"))?;
    Ok(content)
}

/// Read a C source file, enforcing the extension guard unless `force` is set.
pub fn read_source_file(path: &Utf8Path, force: bool, config: &Config) -> anyhow::Result<String> {
    if !force {
        config.ensure_source_file(path)?;
    }
    read_input_file(path, config.input_limit())
}

/// Replace `path` with `contents` without ever leaving it half-written.
///
/// The new text goes to a temporary sibling first, which is then renamed
/// over the original.
pub fn write_atomically(path: &Utf8Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_str().is_empty() => dir,
        _ => Utf8Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to create temporary file next to {path}"))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("failed to write {path}"))?;
    if let Ok(metadata) = std::fs::metadata(path.as_std_path()) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .with_context(|| format!("failed to copy permissions of {path}"))?;
    }
    tmp.persist(path.as_std_path())
        .with_context(|| format!("failed to replace {path}"))?;
    Ok(())
}

/// What `--write` and `--check` do with a transformed buffer.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputMode {
    /// Replace the file in place.
    pub write: bool,
    /// Only verify that nothing would change.
    pub check: bool,
}

/// Summary of one file transformation, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct TransformOutcome<'a> {
    /// Input file.
    pub file: &'a str,
    /// Whether the output differs from the input.
    pub changed: bool,
    /// Whether the file was rewritten.
    pub written: bool,
    /// Transformed text, omitted when written back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<&'a str>,
}

/// Emit a transformed buffer according to `mode`.
///
/// `fix_hint` names the command that would bring the file up to date and is
/// used in the `--check` failure message. Returns whether the file was
/// written.
pub fn emit_result(
    path: &Utf8Path,
    original: &str,
    result: &str,
    mode: OutputMode,
    global_json: bool,
    fix_hint: &str,
) -> anyhow::Result<bool> {
    let changed = original != result;

    if mode.check {
        if global_json {
            let outcome = TransformOutcome {
                file: path.as_str(),
                changed,
                written: false,
                output: None,
            };
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        if changed {
            bail!("{path} is not up to date. Run `fnlines {fix_hint} --write {path}`.");
        }
        if !global_json {
            println!("{} {path} is up to date", "PASS:".green());
        }
        return Ok(false);
    }

    let written = mode.write && changed;
    if written {
        write_atomically(path, result)?;
        tracing::info!(file = %path, "file rewritten");
    }

    if global_json {
        let outcome = TransformOutcome {
            file: path.as_str(),
            changed,
            written,
            output: (!mode.write).then_some(result),
        };
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else if !mode.write {
        print!("{result}");
        if !result.is_empty() && !result.ends_with('\n') {
            println!();
        }
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use tempfile::TempDir;

    fn temp_file(dir: &TempDir, name: &str, contents: &str) -> Utf8PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        Utf8PathBuf::try_from(path).unwrap()
    }

    #[test]
    fn read_input_file_enforces_limit() {
        let tmp = TempDir::new().unwrap();
        let path = temp_file(&tmp, "big.c", "0123456789");

        assert_eq!(read_input_file(&path, Some(10)).unwrap(), "0123456789");
        let err = read_input_file(&path, Some(9)).unwrap_err();
        assert!(err.to_string().contains("input too large"), "{err}");
        assert!(read_input_file(&path, None).is_ok());
    }

    #[test]
    fn read_source_file_checks_extension_unless_forced() {
        let tmp = TempDir::new().unwrap();
        let path = temp_file(&tmp, "notes.txt", "int x;\n");
        let config = Config::default();

        assert!(read_source_file(&path, false, &config).is_err());
        assert!(read_source_file(&path, true, &config).is_ok());
    }

    #[test]
    fn write_atomically_replaces_contents() {
        let tmp = TempDir::new().unwrap();
        let path = temp_file(&tmp, "a.c", "old\n");

        write_atomically(&path, "new\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new\n");
        let leftovers = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(leftovers, 1, "temporary file should be renamed away");
    }

    #[test]
    fn check_mode_fails_on_change() {
        let tmp = TempDir::new().unwrap();
        let path = temp_file(&tmp, "a.c", "x\n");
        let mode = OutputMode {
            write: false,
            check: true,
        };

        assert!(emit_result(&path, "x\n", "x\n", mode, false, "format").is_ok());
        let err = emit_result(&path, "x\n", "y\n", mode, false, "format").unwrap_err();
        assert!(err.to_string().contains("fnlines format --write"), "{err}");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "x\n");
    }

    #[test]
    fn write_mode_skips_unchanged_files() {
        let tmp = TempDir::new().unwrap();
        let path = temp_file(&tmp, "a.c", "x\n");
        let mode = OutputMode {
            write: true,
            check: false,
        };

        assert!(!emit_result(&path, "x\n", "x\n", mode, false, "format").unwrap());
        assert!(emit_result(&path, "x\n", "y\n", mode, false, "format").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "y\n");
    }
}
