//! Helpers for inspecting produced archives

use std::io::{Cursor, Read};
use std::path::Path;

/// A saved archive read back into memory
pub struct SavedArchive {
    archive: zip::ZipArchive<Cursor<Vec<u8>>>,
}

impl SavedArchive {
    /// Open the archive at `path`
    pub fn open(path: &Path) -> Self {
        let bytes = std::fs::read(path)
            .unwrap_or_else(|e| panic!("archive {} should exist: {e}", path.display()));
        let archive = zip::ZipArchive::new(Cursor::new(bytes)).expect("archive should be a valid zip");
        Self { archive }
    }

    /// Entry names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.archive.file_names().map(str::to_string).collect();
        names.sort();
        names
    }

    /// Raw bytes of one entry
    pub fn bytes(&mut self, name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        self.archive
            .by_name(name)
            .unwrap_or_else(|e| panic!("entry {name} should exist: {e}"))
            .read_to_end(&mut out)
            .expect("entry should be readable");
        out
    }

    /// Text of one entry
    pub fn text(&mut self, name: &str) -> String {
        String::from_utf8(self.bytes(name)).expect("entry should be UTF-8")
    }

    /// Shared strings of the embedded workbook (every text cell lands there)
    pub fn workbook_strings(&mut self, workbook: &str) -> String {
        let xlsx = self.bytes(workbook);
        let mut inner = zip::ZipArchive::new(Cursor::new(xlsx)).expect("workbook should be a zip");
        let mut xml = String::new();
        inner
            .by_name("xl/sharedStrings.xml")
            .expect("workbook should have shared strings")
            .read_to_string(&mut xml)
            .expect("shared strings should be UTF-8");
        xml
    }
}

/// The single `.zip` file inside `dir`
pub fn only_archive_in(dir: &Path) -> std::path::PathBuf {
    let zips: Vec<_> = std::fs::read_dir(dir)
        .expect("output dir should exist")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "zip"))
        .collect();
    assert_eq!(zips.len(), 1, "expected exactly one archive, found {zips:?}");
    zips.into_iter().next().expect("checked above")
}
