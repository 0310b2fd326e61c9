//! Purpose: Find source files under input roots and load their text in batches.
//! Exports: `SourceFile`, `discover_sources`, `read_batch`.
//! Role: File plumbing for the parse pipeline; no parsing happens here.
//! Invariants: Discovery is a plain recursive walk; ignore files and hidden entries are not skipped.
//! Invariants: Returned paths are canonical and sorted within each root, roots kept in argument order.
//! Invariants: Symlinked files are followed to their targets; a file reached twice is listed once.
//! Invariants: Read failures propagate; nothing is silently skipped.
use std::collections::HashSet;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use ignore::WalkBuilder;

use crate::core::error::{Error, ErrorKind};

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

pub fn discover_sources(roots: &[PathBuf], extension: &str) -> Result<Vec<PathBuf>, Error> {
    let mut out = Vec::new();
    let mut seen = HashSet::new();
    for root in roots {
        fs::metadata(root).map_err(|err| {
            Error::from_io(err, root).with_message("input directory is not accessible")
        })?;

        let mut found = Vec::new();
        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .build();
        for entry in walker {
            let entry = entry.map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to walk input directory")
                    .with_path(root)
                    .with_source(err)
            })?;
            // `Path::is_file` follows links; dangling links report false.
            if entry.path().extension() != Some(OsStr::new(extension)) || !entry.path().is_file() {
                continue;
            }
            let path = fs::canonicalize(entry.path())
                .map_err(|err| Error::from_io(err, entry.path()))?;
            found.push(path);
        }
        found.sort();
        out.extend(found.into_iter().filter(|path| seen.insert(path.clone())));
    }
    Ok(out)
}

pub fn read_batch(paths: &[PathBuf]) -> Result<Vec<SourceFile>, Error> {
    paths
        .iter()
        .map(|path| {
            let text = fs::read_to_string(path).map_err(|err| Error::from_io(err, path))?;
            Ok(SourceFile {
                path: path.clone(),
                text,
            })
        })
        .collect()
}
