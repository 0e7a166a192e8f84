use super::{LogChunk, LogTextParser, ReaderError};
use crate::game_data::markers;
use memchr::{memmem, memrchr};
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

/// Identity of an open log file, used to notice when the path has been
/// rotated onto a different file.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    dev: u64,
    ino: u64,
}

#[cfg(unix)]
impl FileIdentity {
    fn of(meta: &fs::Metadata) -> Option<Self> {
        use std::os::unix::fs::MetadataExt;
        Some(Self {
            dev: meta.dev(),
            ino: meta.ino(),
        })
    }
}

#[cfg(not(unix))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileIdentity {
    created: std::time::SystemTime,
}

#[cfg(not(unix))]
impl FileIdentity {
    fn of(meta: &fs::Metadata) -> Option<Self> {
        meta.created().ok().map(|created| Self { created })
    }
}

/// Incremental reader over the append-only game log.
///
/// Each successful read returns only bytes appended since the previous one.
/// A trailing line without its newline is held back until the game finishes
/// writing it.
pub struct LogTail {
    path: PathBuf,
    file: Option<File>,
    identity: Option<FileIdentity>,
    position: u64,
    pending: Vec<u8>,
}

impl LogTail {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            identity: None,
            position: 0,
            pending: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    /// Open the log and skip everything already written; only activity from
    /// now on is of interest.
    pub fn open_at_end(&mut self) -> Result<(), ReaderError> {
        let mut file = File::open(&self.path).map_err(|source| ReaderError::OpenFile {
            path: self.path.clone(),
            source,
        })?;
        let end = file.seek(SeekFrom::End(0)).map_err(|source| ReaderError::Seek {
            path: self.path.clone(),
            source,
        })?;

        self.identity = file.metadata().ok().as_ref().and_then(FileIdentity::of);
        self.file = Some(file);
        self.position = end;
        self.pending.clear();
        tracing::info!(path = %self.path.display(), position = end, "Log file opened");
        Ok(())
    }

    pub fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::info!(path = %self.path.display(), "Log file closed");
        }
        self.identity = None;
        self.pending.clear();
    }

    /// Read newly appended, newline-terminated text. Returns `Ok(None)` when
    /// nothing complete was appended or the file is not open.
    pub fn read_appended(&mut self) -> Result<Option<String>, ReaderError> {
        let Some(file) = self.file.as_mut() else {
            return Ok(None);
        };

        let len = file
            .metadata()
            .map_err(|source| ReaderError::Metadata {
                path: self.path.clone(),
                source,
            })?
            .len();

        // truncated or replaced underneath us
        if len < self.position {
            tracing::warn!(
                path = %self.path.display(),
                len,
                position = self.position,
                "Log file shrank, reopening at end"
            );
            self.close();
            self.open_at_end()?;
            return Ok(None);
        }

        let mut buf = Vec::new();
        let read = file.read_to_end(&mut buf).map_err(|source| ReaderError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        if read == 0 {
            return Ok(None);
        }
        self.position += read as u64;
        self.pending.extend_from_slice(&buf);

        let Some(last_newline) = memrchr(b'\n', &self.pending) else {
            return Ok(None);
        };
        let complete: Vec<u8> = self.pending.drain(..=last_newline).collect();
        Ok(Some(String::from_utf8_lossy(&complete).into_owned()))
    }

    /// Close, re-stat and reopen at end. Used after a failed read and on the
    /// slow recovery cadence when the file has disappeared.
    pub fn recover(&mut self) -> Result<(), ReaderError> {
        self.close();
        fs::metadata(&self.path).map_err(|source| ReaderError::Metadata {
            path: self.path.clone(),
            source,
        })?;
        self.open_at_end()
    }

    /// Re-stat the path for the recovery cadence. True when the file is gone,
    /// was never opened, or the path now names a different or shorter file
    /// than the one being tailed.
    pub fn needs_recovery(&self) -> bool {
        if !self.is_open() {
            return true;
        }
        let Ok(meta) = fs::metadata(&self.path) else {
            return true;
        };
        self.is_rotated(&meta)
    }

    fn is_rotated(&self, meta: &fs::Metadata) -> bool {
        if meta.len() < self.position {
            return true;
        }
        match (self.identity, FileIdentity::of(meta)) {
            (Some(open), Some(current)) if open != current => {
                tracing::info!(path = %self.path.display(), "Log file rotated");
                true
            }
            _ => false,
        }
    }
}

/// Split a complete log file into ordered chunks and parse them in parallel.
///
/// Chunk boundaries never fall inside a run of bulk-init lines, so a sort
/// dump is seen whole, the same way it arrives in one live poll. Parsing is
/// stateless, so chunks may be parsed out of order; callers must still apply
/// the returned chunks sequentially.
pub fn read_log_chunks<P: AsRef<Path>>(
    path: P,
    lines_per_chunk: usize,
) -> Result<Vec<LogChunk>, ReaderError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| ReaderError::OpenFile {
        path: path.to_path_buf(),
        source,
    })?;
    let mmap = unsafe { Mmap::map(&file) }.map_err(|source| ReaderError::MemoryMap {
        path: path.to_path_buf(),
        source,
    })?;
    let bytes = mmap.as_ref();

    let ranges = chunk_ranges(bytes, lines_per_chunk.max(1));
    let parser = LogTextParser::new();

    let chunks = ranges
        .par_iter()
        .map(|&(start, end)| {
            let text = String::from_utf8_lossy(&bytes[start..end]);
            parser.parse_chunk(&text)
        })
        .collect();

    Ok(chunks)
}

fn chunk_ranges(bytes: &[u8], lines_per_chunk: usize) -> Vec<(usize, usize)> {
    let init = memmem::Finder::new(markers::BAG_INIT);
    let mut ranges = Vec::new();
    let mut chunk_start = 0;
    let mut line_start = 0;
    let mut lines = 0;
    let mut prev_was_init = false;

    for end in memchr::memchr_iter(b'\n', bytes) {
        let is_init = init.find(&bytes[line_start..end]).is_some();

        // close the chunk before this line unless it continues a sort dump
        if lines >= lines_per_chunk && !(prev_was_init && is_init) {
            ranges.push((chunk_start, line_start));
            chunk_start = line_start;
            lines = 0;
        }

        lines += 1;
        prev_was_init = is_init;
        line_start = end + 1;
    }
    if chunk_start < bytes.len() {
        ranges.push((chunk_start, bytes.len()));
    }
    ranges
}
