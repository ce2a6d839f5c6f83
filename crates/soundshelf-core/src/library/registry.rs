//! Append-only, newline-delimited list of saved clip filenames.
//!
//! The file has no header and no escaping: each line is one filename. Lines
//! are never rewritten, and duplicates are kept as-is.

use crate::{CoreError, CoreResult};

use std::{
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Read, Seek, SeekFrom, Write},
    panic::Location,
    path::{Path, PathBuf},
    sync::Mutex,
};

use error_location::ErrorLocation;
use tracing::{debug, error, info, instrument, warn};

/// One registry line: the filename of a saved clip.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryEntry {
    filename: String,
}

impl RegistryEntry {
    /// Build an entry, rejecting names that cannot be written as one line.
    #[track_caller]
    pub fn new(filename: impl Into<String>) -> CoreResult<Self> {
        let filename = filename.into();

        if filename.trim().is_empty() {
            return Err(CoreError::InvalidEntry {
                reason: "filename is empty".to_string(),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        if filename.contains(['\n', '\r']) {
            return Err(CoreError::InvalidEntry {
                reason: format!("filename {:?} contains a line break", filename),
                location: ErrorLocation::from(Location::caller()),
            });
        }

        Ok(Self { filename })
    }

    /// The filename as stored in the registry.
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

impl fmt::Display for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}

/// The durable registry file.
///
/// Loads and appends are serialized through an internal lock, so a save can
/// never interleave with the startup read.
pub struct ClipRegistry {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ClipRegistry {
    /// Registry backed by the file at `path`. Nothing is touched on disk
    /// until [`load`](Self::load) or [`append`](Self::append).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Path of the registry file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every entry in file order.
    ///
    /// A missing file is created empty and yields no entries. Blank lines are
    /// ignored; lines that are not valid UTF-8 are logged and skipped.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path))]
    pub fn load(&self) -> CoreResult<Vec<RegistryEntry>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| {
            error!("Registry lock poisoned, recovering: {}", e);
            e.into_inner()
        });

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                self.create_empty()?;
                info!("No registry found, created empty registry");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.io_error(e)),
        };

        let mut entries = Vec::new();

        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line.map_err(|e| self.io_error(e))?;

            let text = match String::from_utf8(line) {
                Ok(text) => text,
                Err(e) => {
                    warn!(line = index + 1, error = %e, "Skipping non-UTF-8 registry line");
                    continue;
                }
            };

            let text = text.strip_suffix('\r').unwrap_or(&text);
            if text.trim().is_empty() {
                continue;
            }

            entries.push(RegistryEntry {
                filename: text.to_string(),
            });
        }

        info!(entry_count = entries.len(), "Registry loaded");

        Ok(entries)
    }

    /// Append one entry and sync it to disk before returning.
    ///
    /// If a previous write was cut off mid-line, a line break is written first
    /// so the new entry starts on its own line.
    #[track_caller]
    #[instrument(skip(self), fields(path = ?self.path, filename = %entry))]
    pub fn append(&self, entry: &RegistryEntry) -> CoreResult<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| {
            error!("Registry lock poisoned, recovering: {}", e);
            e.into_inner()
        });

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;

        append_line(&mut file, entry.filename()).map_err(|e| self.io_error(e))?;

        debug!("Registry entry appended");

        Ok(())
    }

    #[track_caller]
    fn create_empty(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }

        let file = File::create(&self.path).map_err(|e| self.io_error(e))?;
        file.sync_all().map_err(|e| self.io_error(e))
    }

    #[track_caller]
    fn io_error(&self, source: io::Error) -> CoreError {
        CoreError::Registry {
            path: self.path.clone(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

/// Backing storage for [`append_line`].
pub(crate) trait RegistrySink: Read + Write + Seek {
    /// Make written bytes durable.
    fn sync(&mut self) -> io::Result<()>;

    /// Cut the storage back to `len` bytes.
    fn truncate(&mut self, len: u64) -> io::Result<()>;
}

impl RegistrySink for File {
    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)
    }
}

/// Append `filename` as one terminated line.
///
/// If the write or sync fails the sink is cut back to its previous length,
/// so a partial line is never left behind.
pub(crate) fn append_line<S: RegistrySink>(sink: &mut S, filename: &str) -> io::Result<()> {
    let original_len = sink.seek(SeekFrom::End(0))?;

    let mut line = String::with_capacity(filename.len() + 2);
    if !ends_with_newline(sink, original_len)? {
        debug!("Registry ends mid-line, terminating it first");
        line.push('\n');
    }
    line.push_str(filename);
    line.push('\n');

    let written = sink
        .seek(SeekFrom::End(0))
        .and_then(|_| sink.write_all(line.as_bytes()))
        .and_then(|()| sink.flush())
        .and_then(|()| sink.sync());

    if let Err(e) = written {
        if let Err(rollback) = sink.truncate(original_len) {
            error!(error = %rollback, "Failed to roll back partial registry line");
        }
        return Err(e);
    }

    Ok(())
}

/// True for an empty sink or one whose last byte is `\n`.
fn ends_with_newline<S: Read + Seek>(sink: &mut S, len: u64) -> io::Result<bool> {
    if len == 0 {
        return Ok(true);
    }

    sink.seek(SeekFrom::Start(len - 1))?;
    let mut last = [0_u8; 1];
    sink.read_exact(&mut last)?;

    Ok(last[0] == b'\n')
}
