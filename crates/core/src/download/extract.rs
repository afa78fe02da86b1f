//! ZIP extraction for downloaded photo archives.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tracing::{debug, warn};

use super::DownloadError;

/// Extract every file of the ZIP archive at `archive_path` into `dest`.
///
/// Entries whose names would land outside `dest` are skipped. Existing
/// files with the same name are overwritten. Returns the number of files
/// written.
pub fn extract_archive(archive_path: &Path, dest: &Path) -> Result<usize, DownloadError> {
    let file = File::open(archive_path).map_err(|e| DownloadError::io(archive_path, e))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| DownloadError::Archive(format!("Not a valid ZIP archive: {}", e)))?;

    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| DownloadError::Archive(format!("Failed to read entry {}: {}", index, e)))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping archive entry with unsafe path");
            continue;
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| DownloadError::io(&target, e))?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| DownloadError::io(parent, e))?;
        }

        let mut out = File::create(&target).map_err(|e| DownloadError::io(&target, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| DownloadError::io(&target, e))?;
        extracted += 1;
    }

    debug!(dest = %dest.display(), files = extracted, "Archive extracted");
    Ok(extracted)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    /// Build an in-memory ZIP archive from (name, content) pairs.
    pub(crate) fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_extract_files_and_nested_folders() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("photos.zip");
        fs::write(
            &archive,
            zip_bytes(&[
                ("IMG_0001.jpg", b"one"),
                ("IMG_0002.jpg", b"two"),
                ("originals/IMG_0003.jpg", b"three"),
            ]),
        )
        .unwrap();

        let dest = dir.path().join("out");
        let count = extract_archive(&archive, &dest).unwrap();

        assert_eq!(count, 3);
        assert_eq!(fs::read(dest.join("IMG_0001.jpg")).unwrap(), b"one");
        assert_eq!(
            fs::read(dest.join("originals").join("IMG_0003.jpg")).unwrap(),
            b"three"
        );
    }

    #[test]
    fn test_extract_skips_entries_outside_dest() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("photos.zip");
        fs::write(
            &archive,
            zip_bytes(&[("../escape.jpg", b"bad"), ("ok.jpg", b"good")]),
        )
        .unwrap();

        let dest = dir.path().join("out");
        let count = extract_archive(&archive, &dest).unwrap();

        assert_eq!(count, 1);
        assert!(dest.join("ok.jpg").exists());
        assert!(!dir.path().join("escape.jpg").exists());
    }

    #[test]
    fn test_extract_rejects_non_zip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("photos.zip");
        fs::write(&archive, b"<html>session expired</html>").unwrap();

        let err = extract_archive(&archive, dir.path()).unwrap_err();
        assert!(matches!(err, DownloadError::Archive(_)));
    }
}
