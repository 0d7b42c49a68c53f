//! Final-estimate persistence.
//!
//! A sweep optionally hands each combination's final value estimates to an
//! [`EstimateSink`]. [`NpyDirSink`] writes one NumPy `.npy` (format 1.0)
//! file per combination into a results directory. The file holds the bare
//! array; everything else about the run lives in the report and the file
//! name.
//!
//! File names are `{UTC timestamp}-{combination index}.npy`. The index
//! keeps names unique within a run; the timestamp separates runs but is
//! not collision-proof across runs started within the same microsecond.

use std::error::Error;
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use diffvi_core::Element;
use ndarray::Array1;

// ── Errors ──────────────────────────────────────────────────────────

/// Failure to persist a set of estimates.
#[derive(Debug)]
pub enum PersistError {
    /// The results directory could not be created or written.
    Io {
        /// Path that was being created or written.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

impl fmt::Display for PersistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ── Sink trait ──────────────────────────────────────────────────────

/// Identifies the combination whose estimates are being saved.
#[derive(Clone, Copy, Debug)]
pub struct ArtifactKey<'a> {
    /// Zero-based position of the combination within the sweep.
    pub index: usize,
    /// Environment name.
    pub environment: &'a str,
    /// Algorithm label.
    pub algorithm: &'a str,
    /// Step size of the run.
    pub step_size: f64,
}

/// Destination for final value estimates.
pub trait EstimateSink<T: Element> {
    /// Store `estimates` and return where they went, for the report.
    fn save(&mut self, key: &ArtifactKey<'_>, estimates: &Array1<T>)
        -> Result<String, PersistError>;
}

// ── .npy directory sink ─────────────────────────────────────────────

/// Writes one `.npy` file per combination into a directory.
#[derive(Debug)]
pub struct NpyDirSink {
    dir: PathBuf,
    stamp: String,
}

impl NpyDirSink {
    /// Create the sink, creating `dir` (and parents) if missing.
    ///
    /// The timestamp shared by every file of this run is taken now.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self, PersistError> {
        Self::create_at(dir, Utc::now())
    }

    /// Like [`create`](Self::create) with an explicit run timestamp.
    pub fn create_at(dir: impl Into<PathBuf>, started: DateTime<Utc>) -> Result<Self, PersistError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| PersistError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            stamp: started.format("%Y%m%dT%H%M%S%.6fZ").to_string(),
        })
    }

    /// The results directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the combination at `index` is written to.
    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(format!("{}-{index}.npy", self.stamp))
    }
}

impl<T: Element> EstimateSink<T> for NpyDirSink {
    fn save(
        &mut self,
        key: &ArtifactKey<'_>,
        estimates: &Array1<T>,
    ) -> Result<String, PersistError> {
        let path = self.path_for(key.index);
        let io_err = |source| PersistError::Io {
            path: path.clone(),
            source,
        };
        let file = File::create(&path).map_err(io_err)?;
        let mut w = BufWriter::new(file);
        write_npy(&mut w, estimates).map_err(io_err)?;
        w.flush().map_err(io_err)?;
        Ok(path.display().to_string())
    }
}

// ── .npy encoding ───────────────────────────────────────────────────

/// `.npy` magic string.
pub const NPY_MAGIC: &[u8; 6] = b"\x93NUMPY";

/// Header alignment: magic + version + length + header is a multiple of this.
const NPY_ALIGN: usize = 64;

/// Encode a one-dimensional array as `.npy` format 1.0, little-endian,
/// C order.
pub fn write_npy<T: Element>(w: &mut dyn Write, values: &Array1<T>) -> io::Result<()> {
    let mut header = format!(
        "{{'descr': '{}', 'fortran_order': False, 'shape': ({},), }}",
        T::NPY_DESCR,
        values.len()
    );
    // 6 magic + 2 version + 2 length, then the header ending in '\n'.
    let unpadded = NPY_MAGIC.len() + 2 + 2 + header.len() + 1;
    let padding = (NPY_ALIGN - unpadded % NPY_ALIGN) % NPY_ALIGN;
    header.extend(std::iter::repeat_n(' ', padding));
    header.push('\n');

    let header_len = u16::try_from(header.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "npy header too long"))?;

    w.write_all(NPY_MAGIC)?;
    w.write_all(&[1, 0])?;
    w.write_all(&header_len.to_le_bytes())?;
    w.write_all(header.as_bytes())?;
    for &v in values {
        v.write_le(w)?;
    }
    Ok(())
}
