// crates/merge-zip/src/reader.rs
// ============================================================================
// Module: Zip Package Reader
// Description: Validates and enumerates Appian package ZIP archives.
// Purpose: Implement `merge_core::PackageReader` (spec §4.1).
// Dependencies: merge-core, zip
// ============================================================================

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::path::Path;

use merge_core::ObjectType;
use merge_core::PackageReadError;
use merge_core::PackageReadErrorKind;
use merge_core::PackageReader;
use merge_core::PackageRole;
use merge_core::RawEntry;

// ============================================================================
// SECTION: Reader
// ============================================================================

/// Reads Appian package ZIP archives from the local filesystem (spec §4.1).
///
/// # Invariants
/// - Never returns a partial enumeration: any validation failure aborts
///   before any entries are produced.
/// - Entry order is deterministic: sorted by directory, then file name,
///   regardless of the archive's internal central-directory order.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipPackageReader;

impl ZipPackageReader {
    /// Creates a new reader. Stateless; safe to share across threads.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl PackageReader for ZipPackageReader {
    fn read(
        &self,
        path: &Path,
        role: PackageRole,
        max_bytes: u64,
    ) -> Result<Vec<RawEntry>, PackageReadError> {
        read_package(path, max_bytes).map_err(|kind| PackageReadError { role, kind })
    }
}

/// Implements [`ZipPackageReader::read`] independent of the `role` tag so
/// the error-kind logic stays easy to test in isolation.
fn read_package(path: &Path, max_bytes: u64) -> Result<Vec<RawEntry>, PackageReadErrorKind> {
    let metadata = std::fs::metadata(path).map_err(|_| PackageReadErrorKind::FileNotFound)?;
    if !metadata.is_file() {
        return Err(PackageReadErrorKind::FileNotFound);
    }
    if metadata.len() > max_bytes {
        return Err(PackageReadErrorKind::TooLarge);
    }

    let file = File::open(path).map_err(|_| PackageReadErrorKind::FileNotFound)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|_| PackageReadErrorKind::NotZip)?;

    let mut entries: Vec<(String, String, ObjectType, Vec<u8>)> = Vec::new();
    let mut saw_recognized_dir = false;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|_| PackageReadErrorKind::Corrupt)?;
        if entry.is_dir() {
            continue;
        }
        let name = entry.name().to_string();
        let (dir, file_name) = split_entry_name(&name);
        let object_type = ObjectType::from_archive_dir(dir);
        if object_type != ObjectType::Unknown {
            saw_recognized_dir = true;
        }
        if !file_name.to_ascii_lowercase().ends_with(".xml") {
            continue;
        }
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|_| PackageReadErrorKind::Corrupt)?;
        entries.push((dir.to_string(), file_name.to_string(), object_type, bytes));
    }

    if !saw_recognized_dir {
        return Err(PackageReadErrorKind::MissingAppianDirs);
    }
    if entries.is_empty() {
        return Err(PackageReadErrorKind::NoXml);
    }

    entries.sort_by(|a, b| (a.0.as_str(), a.1.as_str()).cmp(&(b.0.as_str(), b.1.as_str())));

    Ok(entries
        .into_iter()
        .map(|(_, file_name, object_type, xml)| RawEntry {
            object_type,
            file_name,
            xml,
        })
        .collect())
}

/// Splits a ZIP entry path into its top-level directory (the Appian type
/// tag) and the remaining path, joined with `/` if nested. An entry with no
/// directory component yields an empty directory string.
fn split_entry_name(name: &str) -> (&str, &str) {
    match name.split_once('/') {
        Some((dir, rest)) if !rest.is_empty() => (dir, rest),
        _ => ("", name),
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;
    use zip::write::ZipWriter;

    use super::*;

    fn build_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut writer = ZipWriter::new(cursor);
            let options =
                SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
            for (name, content) in entries {
                writer.start_file(*name, options).expect("start_file");
                writer.write_all(content).expect("write entry");
            }
            writer.finish().expect("finish zip");
        }
        buf
    }

    fn write_temp(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write temp file");
        file
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let reader = ZipPackageReader::new();
        let err = reader
            .read(Path::new("/nonexistent/path/to/package.zip"), PackageRole::Base, 1024)
            .unwrap_err();
        assert_eq!(err.kind, PackageReadErrorKind::FileNotFound);
    }

    #[test]
    fn oversized_file_is_too_large() {
        let bytes = build_zip(&[("interface/X.xml", b"<interface/>")]);
        let file = write_temp(&bytes);
        let reader = ZipPackageReader::new();
        let err = reader.read(file.path(), PackageRole::Base, 2).unwrap_err();
        assert_eq!(err.kind, PackageReadErrorKind::TooLarge);
    }

    #[test]
    fn not_a_zip_is_not_zip() {
        let file = write_temp(b"this is not a zip file at all");
        let reader = ZipPackageReader::new();
        let err = reader.read(file.path(), PackageRole::Base, 1024).unwrap_err();
        assert_eq!(err.kind, PackageReadErrorKind::NotZip);
    }

    #[test]
    fn no_recognized_directories_fails() {
        let bytes = build_zip(&[("pluginTemplate/foo.xml", b"<x/>")]);
        let file = write_temp(&bytes);
        let reader = ZipPackageReader::new();
        let err = reader.read(file.path(), PackageRole::Base, 1024 * 1024).unwrap_err();
        assert_eq!(err.kind, PackageReadErrorKind::MissingAppianDirs);
    }

    #[test]
    fn recognized_dir_with_no_xml_fails() {
        let bytes = build_zip(&[("interface/readme.txt", b"not xml")]);
        let file = write_temp(&bytes);
        let reader = ZipPackageReader::new();
        let err = reader.read(file.path(), PackageRole::Base, 1024 * 1024).unwrap_err();
        assert_eq!(err.kind, PackageReadErrorKind::NoXml);
    }

    #[test]
    fn enumerates_entries_sorted_by_directory_then_name() {
        let bytes = build_zip(&[
            ("rule/Zeta.xml", b"<rule/>"),
            ("interface/Beta.xml", b"<interface/>"),
            ("interface/Alpha.xml", b"<interface/>"),
        ]);
        let file = write_temp(&bytes);
        let reader = ZipPackageReader::new();
        let entries = reader.read(file.path(), PackageRole::Base, 1024 * 1024).expect("entries");
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].file_name, "Alpha.xml");
        assert_eq!(entries[1].file_name, "Beta.xml");
        assert_eq!(entries[2].file_name, "Zeta.xml");
        assert_eq!(entries[0].object_type, ObjectType::Interface);
        assert_eq!(entries[2].object_type, ObjectType::ExpressionRule);
    }

    #[test]
    fn entry_outside_recognized_directories_is_unknown() {
        let bytes =
            build_zip(&[("interface/X.xml", b"<interface/>"), ("pluginTemplate/Y.xml", b"<y/>")]);
        let file = write_temp(&bytes);
        let reader = ZipPackageReader::new();
        let entries = reader.read(file.path(), PackageRole::Base, 1024 * 1024).expect("entries");
        let unknown = entries.iter().find(|e| e.file_name == "Y.xml").expect("Y.xml present");
        assert_eq!(unknown.object_type, ObjectType::Unknown);
    }
}
