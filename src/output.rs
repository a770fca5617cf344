//! Writing fixtures to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::config::{GeneratorConfig, Layout, TESTPATH_CONTENT};
use crate::error::{GarbageError, Result};
use crate::payload::Payload;

/// Buffer size for fixture writes
pub const WRITE_BUFFER_SIZE: usize = 512 * 1024;

pub const HTML_HEAD: &[u8] = b"<html><head><title>Garbage</title></head>\n<body>\n<p>";
pub const HTML_TAIL: &[u8] = b"\n</p>\n</body></html>\n\n";

/// One file produced by a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Files produced by [`write_fixtures`], in write order.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub files: Vec<WrittenFile>,
}

impl Report {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.bytes).sum()
    }
}

/// Creates (or truncates) `path` and hands a buffered writer to `body`.
///
/// The writer is flushed before returning so late write errors are not lost.
fn write_file<F>(path: &Path, body: F) -> Result<WrittenFile>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<u64>,
{
    let file = File::create(path).map_err(GarbageError::io(path))?;
    let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
    let bytes = body(&mut writer).map_err(GarbageError::io(path))?;
    writer.flush().map_err(GarbageError::io(path))?;

    debug!("wrote {} bytes to {}", bytes, path.display());
    Ok(WrittenFile {
        path: path.to_path_buf(),
        bytes,
    })
}

// Payload wrapped in the HTML skeleton
pub fn write_html(path: &Path, payload: &Payload) -> Result<WrittenFile> {
    write_file(path, |w| {
        w.write_all(HTML_HEAD)?;
        w.write_all(payload.as_bytes())?;
        w.write_all(HTML_TAIL)?;
        Ok((HTML_HEAD.len() + payload.len() + HTML_TAIL.len()) as u64)
    })
}

// Raw payload plus one trailing newline
pub fn write_blob(path: &Path, payload: &Payload) -> Result<WrittenFile> {
    write_file(path, |w| {
        w.write_all(payload.as_bytes())?;
        w.write_all(b"\n")?;
        Ok(payload.len() as u64 + 1)
    })
}

pub fn write_testpath(path: &Path) -> Result<WrittenFile> {
    write_file(path, |w| {
        w.write_all(TESTPATH_CONTENT)?;
        Ok(TESTPATH_CONTENT.len() as u64)
    })
}

/// Writes every file of `config.variant` into `config.output_dir`, overwriting
/// existing files. A missing directory is an error unless `create_dirs` is set;
/// files written before a failure are left in place.
pub fn write_fixtures(config: &GeneratorConfig, payload: &Payload) -> Result<Report> {
    if config.create_dirs {
        fs::create_dir_all(&config.output_dir).map_err(GarbageError::io(&config.output_dir))?;
    }

    let mut report = Report::default();
    let payload_path = config.payload_path();
    let written = match config.variant.layout() {
        Layout::Html => write_html(&payload_path, payload)?,
        Layout::Blob => write_blob(&payload_path, payload)?,
    };
    report.files.push(written);

    if config.variant.writes_testpath() {
        report.files.push(write_testpath(&config.testpath_path())?);
    }

    info!(
        "{} fixture: {} file(s), {} bytes in {}",
        config.variant,
        report.files.len(),
        report.total_bytes(),
        config.output_dir.display()
    );
    Ok(report)
}
