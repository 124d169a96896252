//! Opening the index and data files of a data set.

use std::ffi::OsString;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, ScanError};
use crate::scan::{ScanConfig, Scanner};

/// Suffix of the index file.
pub const INDEX_EXTENSION: &str = "idxf";

/// Suffix of the frame data file.
pub const DATA_EXTENSION: &str = "rawf";

/// Path of the index file for `prefix`.
pub fn index_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, INDEX_EXTENSION)
}

/// Path of the data file for `prefix`.
pub fn data_path(prefix: &Path) -> PathBuf {
    with_suffix(prefix, DATA_EXTENSION)
}

// Appends rather than replacing, since prefixes often contain dots.
fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// The opened index and data files of one acquisition.
#[derive(Debug)]
pub struct DataSet {
    prefix: PathBuf,
    index: BufReader<File>,
    data: BufReader<File>,
}

impl DataSet {
    /// Open `<prefix>.idxf` and `<prefix>.rawf` for reading.
    pub fn open(prefix: impl AsRef<Path>) -> Result<Self> {
        let prefix = prefix.as_ref().to_path_buf();
        let index = open_file(&index_path(&prefix))?;
        let data = open_file(&data_path(&prefix))?;
        Ok(Self {
            prefix,
            index: BufReader::new(index),
            data: BufReader::new(data),
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Turn the data set into a scanner over all of its windows.
    pub fn into_scanner(self, config: ScanConfig) -> Scanner<BufReader<File>, BufReader<File>> {
        Scanner::new(self.index, self.data, config)
    }
}

fn open_file(path: &Path) -> Result<File> {
    match File::open(path) {
        Ok(file) => {
            debug!(?path, "opened");
            Ok(file)
        }
        Err(source) => Err(ScanError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        }),
    }
}
