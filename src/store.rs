//! Append-only button store: one flat file per remote name.
//!
//! Each remote is a file `<data_dir>/<RemoteName>.txt` of newline-delimited
//! `label,signal` lines. Records are only ever appended; lookup is a linear
//! scan that returns the first match in file order. The format is exactly
//! what the handheld firmware wrote, so files saved by it remain readable.
//!
//! The separator is the *first* comma on a line. Labels therefore may not
//! contain a comma; signal text may (legacy 2.4 GHz payloads are raw bytes).

use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors surfaced by the store. All are reported as status messages;
/// none terminate the process.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An append/lookup was attempted with no remote name set.
    #[error("no remote name set")]
    NoActiveRemote,

    /// The remote name is unusable as a file name.
    #[error("remote name {0:?} contains filesystem-unsafe characters")]
    InvalidRemoteName(String),

    /// The label would break the one-comma-per-line record format.
    #[error("button label {0:?} is empty or contains a separator")]
    InvalidLabel(String),

    /// The backing medium could not be opened or written.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        #[source]
        source: std::io::Error,
    },

    /// Playback found no usable record for the label.
    #[error("button {0:?} not found")]
    ButtonNotFound(String),
}

/// A validated remote name, safe to use as a file name stem.
///
/// Validation rejects rather than sanitizes: the file on disk must carry
/// exactly the name the user sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteName(String);

impl RemoteName {
    pub fn new(name: &str) -> Result<Self, StoreError> {
        if name.is_empty() {
            return Err(StoreError::NoActiveRemote);
        }
        if name == "." || name == ".." {
            return Err(StoreError::InvalidRemoteName(name.to_string()));
        }
        let unsafe_char =
            |c: char| matches!(c, '/' | '\\' | '\0') || c.is_control();
        if name.chars().any(unsafe_char) {
            return Err(StoreError::InvalidRemoteName(name.to_string()));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One saved button: a label and the signal's text encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonRecord {
    pub label: String,
    pub signal: String,
}

/// The store itself: a directory of per-remote button files.
pub struct ButtonStore {
    root: PathBuf,
}

impl ButtonStore {
    /// Open a store rooted at `root`, creating the directory if missing.
    pub fn open(root: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(root)
            .map_err(|source| StoreError::StorageUnavailable { source })?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn file_path(&self, remote: &RemoteName) -> PathBuf {
        self.root.join(format!("{}.txt", remote.as_str()))
    }

    /// Append one record under `remote`, creating the file on first use.
    ///
    /// On return the record is durably the last one in file order and
    /// visible to any subsequent lookup, including across restarts.
    pub fn append(
        &self,
        remote: &RemoteName,
        label: &str,
        signal: &str,
    ) -> Result<(), StoreError> {
        if label.is_empty() || label.contains(',') || label.contains('\n') || label.contains('\r')
        {
            return Err(StoreError::InvalidLabel(label.to_string()));
        }

        let path = self.file_path(remote);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::StorageUnavailable { source })?;

        writeln!(file, "{},{}", label, signal)
            .map_err(|source| StoreError::StorageUnavailable { source })?;
        file.sync_all()
            .map_err(|source| StoreError::StorageUnavailable { source })?;

        tracing::debug!("Saved button {:?} to {:?}", label, path);
        Ok(())
    }

    /// Find the first record whose label matches byte-for-byte.
    ///
    /// A missing file means the remote has no saved buttons and returns
    /// `Ok(None)`. Malformed lines are skipped, never a scan failure.
    pub fn lookup(
        &self,
        remote: &RemoteName,
        label: &str,
    ) -> Result<Option<String>, StoreError> {
        let path = self.file_path(remote);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(StoreError::StorageUnavailable { source }),
        };

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| StoreError::StorageUnavailable { source })?;
            let Some(record) = parse_line(&line) else {
                continue;
            };
            if record.label == label {
                return Ok(Some(record.signal));
            }
        }
        Ok(None)
    }

    /// Lookup that treats "no record" and "empty signal text" as the same
    /// named failure. Matches the handheld firmware, which replayed only
    /// when its loaded data string was non-empty.
    pub fn playback(
        &self,
        remote: &RemoteName,
        label: &str,
    ) -> Result<String, StoreError> {
        match self.lookup(remote, label)? {
            Some(signal) if !signal.is_empty() => Ok(signal),
            _ => Err(StoreError::ButtonNotFound(label.to_string())),
        }
    }

    /// All well-formed records of a remote, in file (insertion) order.
    pub fn records(&self, remote: &RemoteName) -> Result<Vec<ButtonRecord>, StoreError> {
        let path = self.file_path(remote);
        let file = match fs::File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(StoreError::StorageUnavailable { source }),
        };

        let mut records = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| StoreError::StorageUnavailable { source })?;
            if let Some(record) = parse_line(&line) {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// Names of all remotes that have at least one saved button file.
    pub fn remotes(&self) -> Result<Vec<String>, StoreError> {
        let entries = fs::read_dir(&self.root)
            .map_err(|source| StoreError::StorageUnavailable { source })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StoreError::StorageUnavailable { source })?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("txt") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Parse one stored line. `None` for malformed lines: no separator, empty
/// label, or blank. Tolerates the trailing `\r` the firmware's `println`
/// wrote.
fn parse_line(line: &str) -> Option<ButtonRecord> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.is_empty() {
        return None;
    }
    let (label, signal) = line.split_once(',')?;
    if label.is_empty() {
        return None;
    }
    Some(ButtonRecord {
        label: label.to_string(),
        signal: signal.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store() -> (TempDir, ButtonStore) {
        let dir = TempDir::new().unwrap();
        let store = ButtonStore::open(dir.path()).unwrap();
        (dir, store)
    }

    fn remote(name: &str) -> RemoteName {
        RemoteName::new(name).unwrap()
    }

    #[test]
    fn test_append_then_lookup() {
        let (_dir, store) = store();
        let tv = remote("Living Room TV");

        store.append(&tv, "Power", "a1b2c3").unwrap();
        store.append(&tv, "Volume Up", "ff00ff").unwrap();

        assert_eq!(store.lookup(&tv, "Power").unwrap(), Some("a1b2c3".to_string()));
        assert_eq!(store.lookup(&tv, "Mute").unwrap(), None);
    }

    #[test]
    fn test_duplicate_label_returns_first() {
        let (_dir, store) = store();
        let tv = remote("tv");

        store.append(&tv, "Power", "first").unwrap();
        store.append(&tv, "Power", "second").unwrap();

        assert_eq!(store.lookup(&tv, "Power").unwrap(), Some("first".to_string()));
    }

    #[test]
    fn test_lookup_without_file_is_none_not_error() {
        let (_dir, store) = store();
        assert_eq!(store.lookup(&remote("nothing"), "Power").unwrap(), None);
    }

    #[test]
    fn test_malformed_line_is_skipped_not_fatal() {
        let (dir, store) = store();
        let tv = remote("tv");

        // A file with a junk line in the middle; the record after it must
        // still be reachable.
        std::fs::write(
            dir.path().join("tv.txt"),
            "Power,a1b2c3\nthis line has no separator\n,emptylabel\nMute,0f0f0f\n",
        )
        .unwrap();

        assert_eq!(store.lookup(&tv, "Mute").unwrap(), Some("0f0f0f".to_string()));
        let records = store.records(&tv).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let (_dir, store) = store();
        let tv = remote("tv");

        let pairs: Vec<(String, String)> = (0..20)
            .map(|i| (format!("btn{}", i), format!("{:06x}", i * 7)))
            .collect();
        for (label, signal) in &pairs {
            store.append(&tv, label, signal).unwrap();
        }

        let records = store.records(&tv).unwrap();
        assert_eq!(records.len(), pairs.len());
        for (record, (label, signal)) in records.iter().zip(&pairs) {
            assert_eq!(&record.label, label);
            assert_eq!(&record.signal, signal);
        }
    }

    #[test]
    fn test_playback_merges_missing_and_empty() {
        let (_dir, store) = store();
        let ac = remote("Bedroom AC");

        // No prior data at all.
        assert!(matches!(
            store.playback(&ac, "Power"),
            Err(StoreError::ButtonNotFound(_))
        ));

        // A record whose signal text is empty counts as not found too.
        store.append(&ac, "Power", "").unwrap();
        assert!(matches!(
            store.playback(&ac, "Power"),
            Err(StoreError::ButtonNotFound(_))
        ));

        store.append(&ac, "Fan", "123abc").unwrap();
        assert_eq!(store.playback(&ac, "Fan").unwrap(), "123abc");
    }

    #[test]
    fn test_signal_text_may_contain_commas() {
        let (_dir, store) = store();
        let tv = remote("tv");

        // Legacy RF24 payloads were raw bytes; only the first comma splits.
        store.append(&tv, "Power", "ab,cd,ef").unwrap();
        assert_eq!(store.lookup(&tv, "Power").unwrap(), Some("ab,cd,ef".to_string()));
    }

    #[test]
    fn test_crlf_lines_are_tolerated() {
        let (dir, store) = store();
        let tv = remote("tv");

        // The Arduino firmware's println wrote \r\n.
        std::fs::write(dir.path().join("tv.txt"), "Power,a1b2c3\r\n").unwrap();
        assert_eq!(store.lookup(&tv, "Power").unwrap(), Some("a1b2c3".to_string()));
    }

    #[test]
    fn test_remote_name_validation() {
        assert!(matches!(
            RemoteName::new(""),
            Err(StoreError::NoActiveRemote)
        ));
        assert!(matches!(
            RemoteName::new("../evil"),
            Err(StoreError::InvalidRemoteName(_))
        ));
        assert!(matches!(
            RemoteName::new("a/b"),
            Err(StoreError::InvalidRemoteName(_))
        ));
        assert!(matches!(
            RemoteName::new(".."),
            Err(StoreError::InvalidRemoteName(_))
        ));
        assert!(RemoteName::new("Living Room TV").is_ok());
    }

    #[test]
    fn test_label_validation() {
        let (_dir, store) = store();
        let tv = remote("tv");

        assert!(matches!(
            store.append(&tv, "", "abc"),
            Err(StoreError::InvalidLabel(_))
        ));
        assert!(matches!(
            store.append(&tv, "a,b", "abc"),
            Err(StoreError::InvalidLabel(_))
        ));
    }

    #[test]
    fn test_remotes_listing() {
        let (_dir, store) = store();

        store.append(&remote("tv"), "Power", "a1").unwrap();
        store.append(&remote("ac"), "Power", "b2").unwrap();

        assert_eq!(store.remotes().unwrap(), vec!["ac".to_string(), "tv".to_string()]);
    }

    #[test]
    fn test_records_survive_reopen() {
        let (dir, store) = store();
        let tv = remote("tv");
        store.append(&tv, "Power", "a1b2c3").unwrap();
        drop(store);

        let reopened = ButtonStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.lookup(&tv, "Power").unwrap(),
            Some("a1b2c3".to_string())
        );
    }
}
