use anyhow::{anyhow, Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::read::ZipArchive;

/// Archive entries with these extensions are treated as log files
const LOG_EXTENSIONS: [&str; 4] = [".log", ".json", ".jsonl", ".txt"];

fn is_zip(path: &Path) -> bool {
    path.to_string_lossy().to_ascii_lowercase().ends_with(".zip")
}

fn is_log_entry(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    !lower.ends_with('/') && LOG_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

/// Read every path and concatenate the contents in argument order.
///
/// Zip archives contribute all of their log entries in archive order.
/// Each source is terminated by a newline so the last line of one file
/// never runs into the first line of the next.
pub fn read_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for path in paths {
        let path = path.as_ref();
        let before = out.len();
        if is_zip(path) {
            read_zip(path, &mut out)?;
        } else {
            let mut f = File::open(path).with_context(|| format!("open log: {}", path.display()))?;
            f.read_to_end(&mut out)
                .with_context(|| format!("read log: {}", path.display()))?;
            terminate(&mut out);
        }
        log::debug!("read {} bytes from {}", out.len() - before, path.display());
    }
    Ok(out)
}

fn read_zip(path: &Path, out: &mut Vec<u8>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("open zip: {}", path.display()))?;
    let mut archive = ZipArchive::new(file).context("read zip archive")?;

    let mut found = 0usize;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        if !is_log_entry(entry.name()) {
            continue;
        }
        entry
            .read_to_end(out)
            .with_context(|| format!("read zip entry: {}", entry.name()))?;
        terminate(out);
        found += 1;
    }

    if found == 0 {
        return Err(anyhow!("no log files found in zip: {}", path.display()));
    }
    Ok(())
}

fn terminate(out: &mut Vec<u8>) {
    if out.last().is_some_and(|b| *b != b'\n') {
        out.push(b'\n');
    }
}
