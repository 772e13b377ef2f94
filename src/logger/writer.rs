//! Size-rotating file writer plugged into `tracing_subscriber::fmt`

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use jiff::Zoned;
use tracing_subscriber::fmt::MakeWriter;

use crate::logger::config::{FileConfig, RotationConfig};
use crate::logger::error::LoggerError;

pub struct RotatingFileWriter {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

struct WriterState {
    file: BufWriter<File>,
    current_size: u64,
    rotation: RotationConfig,
    /// Set after an unrecoverable file error; output goes to stderr from then on
    fallback: bool,
}

impl RotatingFileWriter {
    pub fn new(config: &FileConfig) -> Result<Self, LoggerError> {
        if let Some(parent) = config.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = open_log_file(&config.path, config.append)?;
        let current_size = if config.append {
            fs::metadata(&config.path).map(|m| m.len()).unwrap_or(0)
        } else {
            0
        };

        Ok(Self {
            state: Arc::new(Mutex::new(WriterState {
                file,
                current_size,
                rotation: config.rotation,
                fallback: false,
            })),
            path: config.path.clone(),
        })
    }
}

impl<'a> MakeWriter<'a> for RotatingFileWriter {
    type Writer = RotatingWriterGuard;

    fn make_writer(&'a self) -> Self::Writer {
        RotatingWriterGuard {
            state: self.state.clone(),
            path: self.path.clone(),
        }
    }
}

pub struct RotatingWriterGuard {
    state: Arc<Mutex<WriterState>>,
    path: PathBuf,
}

impl Write for RotatingWriterGuard {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback {
            return io::stderr().write(buf);
        }

        if state.current_size >= state.rotation.max_size
            && let Err(e) = rotate(&mut state, &self.path)
        {
            state.fallback = true;
            eprintln!("[logger] rotation failed, falling back to stderr: {}", e);
            return io::stderr().write(buf);
        }

        match state.file.write(buf) {
            Ok(written) => {
                state.current_size += written as u64;
                Ok(written)
            }
            Err(e) => {
                state.fallback = true;
                eprintln!("[logger] file write failed, falling back to stderr: {}", e);
                io::stderr().write(buf)
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::other("Failed to acquire writer lock"))?;

        if state.fallback {
            return io::stderr().flush();
        }
        state.file.flush()
    }
}

impl Drop for RotatingWriterGuard {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            let _ = state.file.flush();
        }
    }
}

fn rotate(state: &mut WriterState, path: &Path) -> Result<(), LoggerError> {
    state.file.flush()?;

    if path.exists() {
        fs::rename(path, rotated_path(path))?;
    }

    state.file = open_log_file(path, false)?;
    state.current_size = 0;

    cleanup_rotated(path, state.rotation.max_files)
}

/// `logs/notifier.log` -> `logs/notifier.20261019_142501.log`, with a numeric
/// suffix when several rotations land in the same second.
fn rotated_path(path: &Path) -> PathBuf {
    let timestamp = Zoned::now().strftime("%Y%m%d_%H%M%S").to_string();
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let ext = path.extension().map(|e| e.to_string_lossy());

    let name = |n: usize| {
        let stamp = if n == 0 {
            timestamp.clone()
        } else {
            format!("{}-{}", timestamp, n)
        };
        match ext {
            Some(ref ext) => format!("{}.{}.{}", stem, stamp, ext),
            None => format!("{}.{}", stem, stamp),
        }
    };

    let mut n = 0;
    loop {
        let candidate = path.with_file_name(name(n));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Keeps the newest `max_files` rotated files next to `path`.
fn cleanup_rotated(path: &Path, max_files: usize) -> Result<(), LoggerError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let current = path
        .file_name()
        .ok_or_else(|| LoggerError::rotation("log path has no file name"))?;
    let prefix = format!("{}.", path.file_stem().unwrap_or_default().to_string_lossy());

    let mut rotated: Vec<(std::time::SystemTime, PathBuf)> = fs::read_dir(&dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            let name = entry.file_name();
            name != current && name.to_string_lossy().starts_with(&prefix)
        })
        .filter_map(|entry| {
            let modified = entry.metadata().and_then(|m| m.modified()).ok()?;
            Some((modified, entry.path()))
        })
        .collect();

    if rotated.len() <= max_files {
        return Ok(());
    }

    // Oldest first
    rotated.sort();
    let excess = rotated.len() - max_files;
    for (_, old) in rotated.into_iter().take(excess) {
        fs::remove_file(old)?;
    }

    Ok(())
}

fn open_log_file(path: &Path, append: bool) -> io::Result<BufWriter<File>> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)?;

    Ok(BufWriter::new(file))
}
