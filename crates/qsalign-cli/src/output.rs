use crate::error::Result;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Destination of the report.
///
/// A file sink is opened without truncation, so a run that fails later never
/// clobbers an existing report. The file is only emptied right before the
/// rendered report is written.
#[derive(Debug)]
pub enum OutputSink {
    Stdout,
    File {
        path: PathBuf,
        file: File,
        created: bool,
    },
}

impl OutputSink {
    pub fn open(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(OutputSink::Stdout);
        };

        let existed = path.exists();
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;
        debug!(
            "Opened output file {:?} ({})",
            path,
            if existed { "existing" } else { "new" }
        );

        Ok(OutputSink::File {
            path: path.to_path_buf(),
            file,
            created: !existed,
        })
    }

    /// Writes the complete report and closes the sink.
    pub fn write_all(self, report: &str) -> Result<()> {
        match self {
            OutputSink::Stdout => {
                let mut stdout = io::stdout().lock();
                stdout.write_all(report.as_bytes())?;
                stdout.flush()?;
            }
            OutputSink::File {
                path,
                mut file,
                created,
            } => {
                let written = file
                    .set_len(0)
                    .and_then(|_| file.write_all(report.as_bytes()))
                    .and_then(|_| file.flush());
                if let Err(e) = written {
                    OutputSink::File {
                        path,
                        file,
                        created,
                    }
                    .discard();
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Abandons the sink after a failed run, removing the file if this run created it.
    pub fn discard(self) {
        if let OutputSink::File {
            path,
            file,
            created: true,
        } = self
        {
            drop(file);
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Could not remove incomplete output file {:?}: {}", path, e);
            }
        }
    }
}
