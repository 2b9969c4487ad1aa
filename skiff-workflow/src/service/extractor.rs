//! Archive extractor
//!
//! Unpacks gzip-compressed tar archives entry by entry. Directories are created
//! with mode 0755, regular files are written with the permission bits recorded
//! in the archive. Symlinks, hard links, devices and other entry types are
//! skipped.
//!
//! Entry names are never trusted: a name containing `..`, a root or a drive
//! prefix is rejected with [`WorkflowError::UnsafeEntry`] before anything is
//! written for it.
//!
//! Extraction runs on a blocking thread that outlives a cancelled caller, so
//! the deadline is checked before every entry.

use flate2::read::GzDecoder;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use std::time::Instant;
use tar::{Archive, EntryType};
use tokio::task::spawn_blocking;
use tracing::{debug, info};

use crate::error::{Result, WorkflowError};

/// Mode given to directories created from directory entries
#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Extracts `archive_path` into `dest_path` on the blocking thread pool
///
/// # Returns
/// Paths of the regular files written, in archive order
pub async fn extract_archive(
    archive_path: &Path,
    dest_path: &Path,
    deadline: Instant,
) -> Result<Vec<PathBuf>> {
    let archive_owned = archive_path.to_path_buf();
    let dest_owned = dest_path.to_path_buf();

    spawn_blocking(move || extract_tar_gz(&archive_owned, &dest_owned, deadline))
        .await
        .map_err(|e| WorkflowError::ArchiveCorrupt {
            path: archive_path.to_path_buf(),
            reason: format!("extraction task panicked: {}", e),
        })?
}

/// Extracts a `.tar.gz` file into `dest_path`
///
/// Stops with [`WorkflowError::TimedOut`] before the first entry read after
/// `deadline`. Entries already written stay on disk.
pub fn extract_tar_gz(
    archive_path: &Path,
    dest_path: &Path,
    deadline: Instant,
) -> Result<Vec<PathBuf>> {
    debug!(?archive_path, ?dest_path, "extracting tar.gz archive");

    let file = File::open(archive_path).map_err(WorkflowError::io(archive_path))?;
    create_dir(dest_path)?;

    let mut archive = Archive::new(GzDecoder::new(BufReader::new(file)));
    let corrupt = |e: io::Error| WorkflowError::ArchiveCorrupt {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    };

    let mut extracted = Vec::new();

    for entry in archive.entries().map_err(corrupt)? {
        if Instant::now() >= deadline {
            return Err(WorkflowError::TimedOut);
        }

        let mut entry = entry.map_err(corrupt)?;
        let name = entry.path().map_err(corrupt)?.into_owned();

        let Some(relative) = sanitize_entry_path(&name)? else {
            debug!(?name, "skipping entry that names the archive root");
            continue;
        };
        let target = dest_path.join(&relative);

        match entry.header().entry_type() {
            EntryType::Directory => create_dir(&target)?,
            EntryType::Regular | EntryType::Continuous => {
                let mode = entry.header().mode().map_err(corrupt)?;

                if let Some(parent) = target.parent() {
                    create_dir(parent)?;
                }

                let mut out = OpenOptions::new()
                    .write(true)
                    .create(true)
                    .truncate(true)
                    .open(&target)
                    .map_err(WorkflowError::io(&target))?;

                io::copy(&mut entry, &mut out).map_err(corrupt)?;
                drop(out);

                set_mode(&target, mode)?;
                extracted.push(target);
            }
            other => {
                debug!(?name, entry_type = ?other, "skipping unsupported entry type");
            }
        }
    }

    info!(
        ?archive_path,
        extracted_count = extracted.len(),
        "tar.gz extraction successful"
    );

    Ok(extracted)
}

/// Reduces an entry name to a path relative to the destination
///
/// `.` components are dropped. Returns `Ok(None)` for names that reduce to
/// nothing (e.g. `./`), and [`WorkflowError::UnsafeEntry`] for names with
/// parent, root or prefix components.
fn sanitize_entry_path(name: &Path) -> Result<Option<PathBuf>> {
    let mut relative = PathBuf::new();

    for component in name.components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(WorkflowError::UnsafeEntry {
                    entry: name.to_path_buf(),
                });
            }
        }
    }

    Ok((!relative.as_os_str().is_empty()).then_some(relative))
}

#[cfg(unix)]
fn create_dir(path: &Path) -> Result<()> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
        .map_err(WorkflowError::io(path))
}

#[cfg(not(unix))]
fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(WorkflowError::io(path))
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    fs::set_permissions(path, fs::Permissions::from_mode(mode & 0o7777))
        .map_err(WorkflowError::io(path))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::time::Duration;
    use tar::{Builder, Header};

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(60)
    }

    enum Item<'a> {
        Dir(&'a str),
        File(&'a str, &'a [u8], u32),
        Symlink(&'a str, &'a str),
        /// Written without path validation, to model hostile archives
        RawFile(&'a str, &'a [u8]),
    }

    fn build_archive(path: &Path, items: &[Item]) {
        let file = File::create(path).unwrap();
        let mut builder = Builder::new(GzEncoder::new(file, Compression::default()));

        for item in items {
            let mut header = Header::new_gnu();
            match item {
                Item::Dir(name) => {
                    header.set_entry_type(EntryType::Directory);
                    header.set_mode(0o755);
                    header.set_size(0);
                    builder
                        .append_data(&mut header, name, io::empty())
                        .unwrap();
                }
                Item::File(name, data, mode) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_mode(*mode);
                    header.set_size(data.len() as u64);
                    builder.append_data(&mut header, name, *data).unwrap();
                }
                Item::Symlink(name, target) => {
                    header.set_entry_type(EntryType::Symlink);
                    header.set_size(0);
                    builder.append_link(&mut header, name, target).unwrap();
                }
                Item::RawFile(name, data) => {
                    header.set_entry_type(EntryType::Regular);
                    header.set_mode(0o644);
                    header.set_size(data.len() as u64);
                    let raw = &mut header.as_old_mut().name;
                    raw[..name.len()].copy_from_slice(name.as_bytes());
                    header.set_cksum();
                    builder.append(&header, *data).unwrap();
                }
            }
        }

        builder.into_inner().unwrap().finish().unwrap();
    }

    #[cfg(unix)]
    fn mode_of(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o7777
    }

    #[test]
    fn test_round_trip_tree_contents_and_modes() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("results.tar.gz");
        let dest = temp.path().join("out");

        build_archive(
            &archive,
            &[
                Item::Dir("outputs"),
                Item::File("outputs/output.txt", b"hello", 0o644),
                Item::Dir("outputs/nested"),
                Item::File("outputs/nested/run.sh", b"#!/bin/sh\necho hi\n", 0o750),
                Item::File("exitCode", b"0", 0o600),
            ],
        );

        let files = extract_tar_gz(&archive, &dest, later()).unwrap();

        assert_eq!(files.len(), 3);
        assert_eq!(fs::read(dest.join("outputs/output.txt")).unwrap(), b"hello");
        assert_eq!(
            fs::read(dest.join("outputs/nested/run.sh")).unwrap(),
            b"#!/bin/sh\necho hi\n"
        );
        assert_eq!(fs::read(dest.join("exitCode")).unwrap(), b"0");

        #[cfg(unix)]
        {
            assert_eq!(mode_of(&dest.join("outputs/output.txt")), 0o644);
            assert_eq!(mode_of(&dest.join("outputs/nested/run.sh")), 0o750);
            assert_eq!(mode_of(&dest.join("exitCode")), 0o600);
        }
    }

    #[test]
    fn test_files_without_directory_entries() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("flat.tar.gz");
        let dest = temp.path().join("out");

        build_archive(&archive, &[Item::File("a/b/c.txt", b"deep", 0o644)]);

        extract_tar_gz(&archive, &dest, later()).unwrap();
        assert_eq!(fs::read(dest.join("a/b/c.txt")).unwrap(), b"deep");
    }

    #[test]
    fn test_existing_file_is_truncated() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("a.tar.gz");
        let dest = temp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("output.txt"), b"a much longer previous content").unwrap();

        build_archive(&archive, &[Item::File("output.txt", b"new", 0o644)]);

        extract_tar_gz(&archive, &dest, later()).unwrap();
        assert_eq!(fs::read(dest.join("output.txt")).unwrap(), b"new");
    }

    #[test]
    fn test_symlinks_are_skipped() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("links.tar.gz");
        let dest = temp.path().join("out");

        build_archive(
            &archive,
            &[
                Item::File("real.txt", b"data", 0o644),
                Item::Symlink("link.txt", "real.txt"),
            ],
        );

        let files = extract_tar_gz(&archive, &dest, later()).unwrap();
        assert_eq!(files, vec![dest.join("real.txt")]);
        assert!(fs::symlink_metadata(dest.join("link.txt")).is_err());
    }

    #[test]
    fn test_parent_traversal_is_rejected() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("evil.tar.gz");
        let dest = temp.path().join("out");

        build_archive(&archive, &[Item::RawFile("../escape.txt", b"pwned")]);

        let err = extract_tar_gz(&archive, &dest, later()).unwrap_err();
        match err {
            WorkflowError::UnsafeEntry { entry } => {
                assert_eq!(entry, PathBuf::from("../escape.txt"));
            }
            other => panic!("Expected UnsafeEntry, got {:?}", other),
        }

        assert!(!temp.path().join("escape.txt").exists());
    }

    #[test]
    fn test_stops_at_deadline() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("results.tar.gz");
        let dest = temp.path().join("out");

        build_archive(&archive, &[Item::File("output.txt", b"hello", 0o644)]);

        let err = extract_tar_gz(&archive, &dest, Instant::now()).unwrap_err();
        assert!(err.is_timeout());
        assert!(!dest.join("output.txt").exists());
    }

    #[test]
    fn test_corrupt_archive() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("garbage.tar.gz");
        fs::write(&archive, b"this is not gzip data at all").unwrap();

        let err = extract_tar_gz(&archive, &temp.path().join("out"), later()).unwrap_err();
        assert!(matches!(err, WorkflowError::ArchiveCorrupt { .. }));
    }

    #[test]
    fn test_missing_archive() {
        let temp = tempfile::tempdir().unwrap();
        let missing = temp.path().join("nope.tar.gz");
        let err = extract_tar_gz(&missing, temp.path(), later()).unwrap_err();
        assert!(matches!(err, WorkflowError::Io { .. }));
    }

    #[test]
    fn test_sanitize_entry_path() {
        assert_eq!(
            sanitize_entry_path(Path::new("./outputs/a.txt")).unwrap(),
            Some(PathBuf::from("outputs/a.txt"))
        );
        assert_eq!(sanitize_entry_path(Path::new("./")).unwrap(), None);
        assert!(sanitize_entry_path(Path::new("a/../../b")).is_err());
        assert!(sanitize_entry_path(Path::new("/etc/passwd")).is_err());
    }

    #[tokio::test]
    async fn test_extract_archive_async() {
        let temp = tempfile::tempdir().unwrap();
        let archive = temp.path().join("results.tar.gz");
        let dest = temp.path().join("out");

        build_archive(&archive, &[Item::File("output.txt", b"hello", 0o644)]);

        let files = extract_archive(&archive, &dest, later()).await.unwrap();
        assert_eq!(files, vec![dest.join("output.txt")]);
    }
}
