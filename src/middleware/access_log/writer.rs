//! Background access-log writer
//!
//! A single task owns the open log file and the last-used file name. It
//! drains the record queue, renders each record, mirrors the line to stdout
//! when enabled, and appends it to the file for the record's hour.
//!
//! Rotation compares file names as strings. Names are zero-padded and
//! year-major, so a greater name is a later hour; a record from an earlier
//! hour (clock stepped back) keeps going to the file already open.

use std::path::{Path, PathBuf};

use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWrite, AsyncWriteExt, Stdout};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use super::format::{combined_log_line, log_file_name};
use super::record::RequestRecord;
use crate::core::config::AccessLogConfig;

/// Writer state: destinations plus the rotation bookkeeping
pub struct LogWriter<W = Stdout> {
    directory: Option<PathBuf>,
    mirror: Option<W>,
    current: Option<File>,
    last_file_name: String,
}

impl LogWriter<Stdout> {
    /// Writer for the given config, mirroring to the process stdout if enabled
    pub fn new(config: &AccessLogConfig) -> Self {
        Self::with_mirror(
            config.log_directory().map(Path::to_path_buf),
            config.stdout.then(tokio::io::stdout),
        )
    }
}

impl<W> LogWriter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    /// Writer with an arbitrary mirror sink in place of stdout
    pub fn with_mirror(directory: Option<PathBuf>, mirror: Option<W>) -> Self {
        Self {
            directory,
            mirror,
            current: None,
            last_file_name: String::new(),
        }
    }

    /// Consume records until every sender is gone
    pub async fn run(mut self, mut records: mpsc::Receiver<RequestRecord>) {
        info!(
            directory = ?self.directory,
            stdout = self.mirror.is_some(),
            "Access log writer started"
        );

        while let Some(record) = records.recv().await {
            self.write_record(&record).await;
        }

        self.close_current().await;
        debug!("Access log writer stopped, queue drained");
    }

    /// Render one record and write it to the configured destinations
    pub async fn write_record(&mut self, record: &RequestRecord) {
        if let Some(directory) = self.directory.clone() {
            let file_name = log_file_name(&record.time);
            if file_name > self.last_file_name {
                self.rotate(&directory, file_name).await;
            }
        }

        let line = combined_log_line(record);

        if let Some(mirror) = self.mirror.as_mut() {
            if let Err(err) = mirror.write_all(line.as_bytes()).await {
                debug!(error = %err, "Failed to mirror access log line");
            }
        }

        if let Some(file) = self.current.as_mut() {
            let result = match file.write_all(line.as_bytes()).await {
                Ok(()) => file.flush().await,
                Err(err) => Err(err),
            };
            if let Err(err) = result {
                debug!(file = %self.last_file_name, error = %err, "Failed to write access log line");
            }
        }
    }

    /// Close the open file and open `file_name` in `directory`.
    ///
    /// On failure no file stays open and the last-used name is kept, so the
    /// next record retries the open.
    async fn rotate(&mut self, directory: &Path, file_name: String) {
        self.close_current().await;

        let path = directory.join(&file_name);
        match open_append(&path).await {
            Ok(file) => {
                debug!(path = %path.display(), "Opened access log file");
                self.current = Some(file);
                self.last_file_name = file_name;
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "Error opening access log file");
            }
        }
    }

    async fn close_current(&mut self) {
        if let Some(mut file) = self.current.take() {
            if let Err(err) = file.shutdown().await {
                debug!(file = %self.last_file_name, error = %err, "Failed to close access log file");
            }
        }
    }

    /// Name of the file currently open, if any
    pub fn current_file_name(&self) -> Option<&str> {
        self.current.as_ref().map(|_| self.last_file_name.as_str())
    }

    #[cfg(test)]
    pub(crate) fn mirror(&self) -> Option<&W> {
        self.mirror.as_ref()
    }
}

async fn open_append(path: &Path) -> std::io::Result<File> {
    let mut options = OpenOptions::new();
    options.append(true).create(true);
    #[cfg(unix)]
    options.mode(0o644);
    options.open(path).await
}
