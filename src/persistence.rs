//! Saving and loading the whole portal as JSON.
//!
//! Paths ending in `.gz` are gzip-compressed on save and decompressed on
//! load. Everything else is plain JSON.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::info;

use crate::error::Result;
use crate::portal::CyclingPortal;

fn is_gzip(path: &Path) -> bool {
    path.extension() == Some(OsStr::new("gz"))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

impl CyclingPortal {
    /// Writes the full portal state, identifier counters included.
    ///
    /// The JSON goes to a sibling `.tmp` file first and is renamed over
    /// `path` once complete, so an interrupted save never truncates the
    /// previous file.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)?;
        }
        let tmp = temp_path(path);

        if let Err(e) = self.write_json(&tmp, is_gzip(path)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e);
        }
        std::fs::rename(&tmp, path)?;
        info!("Portal saved");
        Ok(())
    }

    fn write_json(&self, path: &Path, gzip: bool) -> Result<()> {
        let file = BufWriter::new(File::create(path)?);
        if gzip {
            let mut encoder = GzEncoder::new(file, Compression::default());
            serde_json::to_writer(&mut encoder, self)?;
            encoder.finish()?.flush()?;
        } else {
            let mut file = file;
            serde_json::to_writer(&mut file, self)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Replaces the current state with the one stored at `path`.
    ///
    /// The file is decoded completely first; if reading or decoding fails
    /// the portal is left untouched.
    #[tracing::instrument(skip(self, path), fields(path = %path.as_ref().display()))]
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = BufReader::new(File::open(path)?);
        let mut json = Vec::new();
        if is_gzip(path) {
            GzDecoder::new(file).read_to_end(&mut json)?;
        } else {
            let mut file = file;
            file.read_to_end(&mut json)?;
        }

        let loaded: CyclingPortal = serde_json::from_slice(&json)?;
        *self = loaded;
        info!(
            races = self.race_ids().len(),
            teams = self.teams().len(),
            "Portal loaded"
        );
        Ok(())
    }
}
