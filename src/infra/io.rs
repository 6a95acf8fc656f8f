//! Document input/output: files or stdio, with `--dry-run` support.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::AppContext;

/// Read the logic text from a file, or from stdin when the path is `-`.
pub fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read logic text from stdin")?;
        return Ok(buf);
    }
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Write rewritten logic text. Without `--output` the text goes to
/// stdout; with `--dry-run` nothing is written and the destination is
/// reported instead.
pub fn write_output(output: Option<&PathBuf>, text: &str, ctx: &AppContext) -> Result<()> {
    match output {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(path) => {
            if ctx.dry_run {
                if !ctx.quiet {
                    println!("dry-run: would write {} bytes to {}", text.len(), path.display());
                }
                return Ok(());
            }
            std::fs::write(path, text)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn read_round_trips_file_contents() {
        let mut f = NamedTempFile::new().unwrap();
        write!(f, "PSV01 := 1\n").unwrap();
        assert_eq!(read_input(f.path()).unwrap(), "PSV01 := 1\n");
    }

    #[test]
    fn dry_run_skips_the_write() {
        let ctx = AppContext {
            quiet: true,
            no_color: true,
            dry_run: true,
        };
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        write_output(Some(&target), "X := 1\n", &ctx).unwrap();
        assert!(!target.exists());
    }
}
