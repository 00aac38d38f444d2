//! Line-oriented files rewritten atomically.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Read one entry per line, trimming whitespace and skipping blank lines.
///
/// A missing file reads as empty.
///
/// # Errors
/// Returns error if the file exists but cannot be read.
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write entries newline-terminated to `<path>.tmp`, then rename over `path`.
///
/// # Errors
/// Returns error if the temporary file cannot be written or renamed.
pub fn write_lines_atomic<'a>(path: &Path, lines: impl IntoIterator<Item = &'a str>) -> Result<()> {
    let tmp = tmp_path(path);
    {
        let mut file = io::BufWriter::new(fs::File::create(&tmp)?);
        for line in lines {
            writeln!(file, "{line}")?;
        }
        file.flush()?;
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}
