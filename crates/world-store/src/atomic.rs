//! Atomic file replacement: write a sibling temp file, fsync, rename over
//! the target, fsync the parent directory.

use crate::error::StoreError;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Replace `path` with `bytes`. Readers see either the old or the new file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;

    let tmp_path = tmp_write_path(path);
    let write_result = (|| -> Result<(), StoreError> {
        let file = File::create(&tmp_path).map_err(|e| StoreError::io(&tmp_path, e))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(bytes)
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        writer.flush().map_err(|e| StoreError::io(&tmp_path, e))?;
        let file = writer
            .into_inner()
            .map_err(|e| StoreError::io(&tmp_path, e))?;
        file.sync_all().map_err(|e| StoreError::io(&tmp_path, e))?;
        Ok(())
    })();

    if let Err(error) = write_result {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        StoreError::Io {
            path: format!("{} -> {}", tmp_path.display(), path.display()),
            reason: e.to_string(),
        }
    })?;

    sync_parent(path)
}

/// Write `bytes` to a file that must not exist yet.
pub(crate) fn write_new(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::AlreadyExists {
                StoreError::EntryExists(path.display().to_string())
            } else {
                StoreError::io(path, e)
            }
        })?;
    file.write_all(bytes).map_err(|e| StoreError::io(path, e))?;
    file.sync_all().map_err(|e| StoreError::io(path, e))?;
    sync_parent(path)
}

/// Append one line to `path`, creating it if needed.
pub(crate) fn append_line(path: &Path, line: &str) -> Result<(), StoreError> {
    ensure_parent(path)?;
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| StoreError::io(path, e))?;
    writeln!(file, "{line}").map_err(|e| StoreError::io(path, e))?;
    file.sync_all().map_err(|e| StoreError::io(path, e))
}

fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
    }
    Ok(())
}

fn sync_parent(path: &Path) -> Result<(), StoreError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        let dir = File::open(parent).map_err(|e| StoreError::io(parent, e))?;
        dir.sync_all().map_err(|e| StoreError::io(parent, e))?;
    }
    Ok(())
}

fn tmp_write_path(path: &Path) -> PathBuf {
    let unique = TMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut tmp: OsString = path.as_os_str().to_os_string();
    tmp.push(format!(".tmp.{}.{}", std::process::id(), unique));
    PathBuf::from(tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_dir(prefix: &str) -> PathBuf {
        let unique = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock should be after unix epoch")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "world-store-atomic-{prefix}-{}-{unique}",
            std::process::id()
        ))
    }

    #[test]
    fn write_atomic_replaces_file_and_leaves_no_temp_files() {
        let dir = temp_dir("replace");
        let path = dir.join("nested/CanonSnapshot.json");
        write_atomic(&path, b"first\n").expect("first write should succeed");
        write_atomic(&path, b"second\n").expect("second write should succeed");

        assert_eq!(fs::read_to_string(&path).expect("read"), "second\n");
        let leftovers: Vec<_> = fs::read_dir(path.parent().expect("parent"))
            .expect("list")
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().contains(".tmp."))
            .collect();
        assert!(leftovers.is_empty());

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn write_new_refuses_to_overwrite() {
        let dir = temp_dir("new");
        let path = dir.join("0001_ep001.diff.json");
        write_new(&path, b"{}\n").expect("first write should succeed");
        match write_new(&path, b"{\"x\":1}\n") {
            Err(StoreError::EntryExists(message)) => assert!(message.contains("0001_ep001")),
            other => panic!("expected EntryExists, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).expect("read"), "{}\n");

        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn append_line_accumulates() {
        let dir = temp_dir("append");
        let path = dir.join("ledger.jsonl");
        append_line(&path, "{\"a\":1}").expect("append");
        append_line(&path, "{\"b\":2}").expect("append");
        assert_eq!(
            fs::read_to_string(&path).expect("read"),
            "{\"a\":1}\n{\"b\":2}\n"
        );

        let _ = fs::remove_dir_all(dir);
    }
}
