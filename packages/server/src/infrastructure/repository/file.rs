//! JSON-lines file backend for the message log.
//!
//! Each record occupies exactly one line of `<dir>/<name>.jsonl`. Appends are
//! serialized through a mutex and synced to disk before returning, so a record
//! acknowledged by `append` survives a process crash.
//!
//! The file only ever holds complete lines: a failed append is truncated away,
//! and a torn trailing line left by a crash is dropped on open.

use std::{
    io::{self, ErrorKind, SeekFrom},
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::{
    fs::{self, File, OpenOptions},
    io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
    sync::Mutex,
};

use crate::domain::{MessageLog, MessageLogError};

/// File extension of log files
const LOG_FILE_EXTENSION: &str = "jsonl";

/// Bytes read per step when scanning the log backwards
const TAIL_CHUNK_SIZE: u64 = 8 * 1024;

/// Append-only message log stored as a JSON-lines file
pub struct FileMessageLog {
    name: String,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileMessageLog {
    /// Open (creating if needed) the log named `name` inside `dir`.
    pub async fn open(dir: impl AsRef<Path>, name: &str) -> Result<Self, MessageLogError> {
        let dir = dir.as_ref();
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(MessageLogError::Unavailable {
                name: name.to_string(),
                reason: "log name must be a non-empty file name".to_string(),
            });
        }

        fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{name}.{LOG_FILE_EXTENSION}"));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await?;

        let len = file.metadata().await?.len();
        let committed = committed_len(&path, len).await?;
        if committed < len {
            tracing::warn!(
                path = %path.display(),
                dropped_bytes = len - committed,
                "Dropping incomplete trailing record"
            );
            file.set_len(committed).await?;
        }

        tracing::info!(path = %path.display(), "Opened message log");

        Ok(Self {
            name: name.to_string(),
            path,
            file: Mutex::new(file),
        })
    }

    /// Location of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageLog for FileMessageLog {
    fn name(&self) -> &str {
        &self.name
    }

    async fn append(&self, record: &str) -> Result<(), MessageLogError> {
        let mut line = String::with_capacity(record.len() + 1);
        line.push_str(record);
        line.push('\n');

        let mut file = self.file.lock().await;
        let committed = file.metadata().await?.len();
        if let Err(e) = write_line(&mut file, &line).await {
            if let Err(rollback) = file.set_len(committed).await {
                tracing::error!(
                    path = %self.path.display(),
                    error = %rollback,
                    "Failed to truncate partial record"
                );
            }
            return Err(e.into());
        }
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<String>, MessageLogError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Hold the writer lock so a half-written line is never observed.
        let _file = self.file.lock().await;
        match read_tail(&self.path, limit).await {
            Ok(records) => Ok(records),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn write_line(file: &mut File, line: &str) -> io::Result<()> {
    file.write_all(line.as_bytes()).await?;
    file.flush().await?;
    file.sync_data().await
}

/// Length of the prefix of the file that ends with a complete line.
async fn committed_len(path: &Path, len: u64) -> io::Result<u64> {
    let mut file = File::open(path).await?;
    let mut end = len;
    let mut chunk = Vec::new();

    while end > 0 {
        let start = end.saturating_sub(TAIL_CHUNK_SIZE);
        read_range(&mut file, start, end, &mut chunk).await?;
        if let Some(newline) = chunk.iter().rposition(|&b| b == b'\n') {
            return Ok(start + newline as u64 + 1);
        }
        end = start;
    }
    Ok(0)
}

/// Return up to `limit` trailing complete lines, oldest first.
///
/// Reads backwards from the end of the file only as far as needed.
async fn read_tail(path: &Path, limit: usize) -> io::Result<Vec<String>> {
    let mut file = File::open(path).await?;
    let mut start = file.metadata().await?.len();
    let mut tail: Vec<u8> = Vec::new();
    let mut chunk = Vec::new();

    // Bytes before the first newline may belong to an earlier, unread line.
    while start > 0 && newline_count(&tail) <= limit {
        let chunk_start = start.saturating_sub(TAIL_CHUNK_SIZE);
        read_range(&mut file, chunk_start, start, &mut chunk).await?;
        chunk.extend_from_slice(&tail);
        std::mem::swap(&mut tail, &mut chunk);
        start = chunk_start;
    }

    let mut pieces: Vec<&[u8]> = tail.split(|&b| b == b'\n').collect();
    // The piece after the last newline is empty or an incomplete record.
    pieces.pop();
    if start > 0 && !pieces.is_empty() {
        pieces.remove(0);
    }

    let lines: Vec<String> = pieces
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(|piece| String::from_utf8_lossy(piece).into_owned())
        .collect();
    let skip = lines.len().saturating_sub(limit);
    Ok(lines.into_iter().skip(skip).collect())
}

async fn read_range(file: &mut File, start: u64, end: u64, buf: &mut Vec<u8>) -> io::Result<()> {
    buf.clear();
    buf.resize((end - start) as usize, 0);
    file.seek(SeekFrom::Start(start)).await?;
    file.read_exact(buf).await?;
    Ok(())
}

fn newline_count(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}
