//! Purpose: Name, encode, and store per-source syntax tree artifacts.
//! Exports: `ARTIFACT_SUFFIX`, `artifact_name`, `encode_tree`, `decode_tree`, `write_artifact`,
//! `read_artifact`, `list_artifacts`.
//! Role: The on-disk format shared by the parse pipeline and directory comparison.
//! Invariants: Encoding is deterministic; equal trees always produce equal bytes.
//! Invariants: `decode_tree` inverts `encode_tree` and rejects trailing or malformed bytes as `Corrupt`.
//! Invariants: Listings hold regular files only and never include the timing log.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::error::{Error, ErrorKind};
use crate::core::syntax::SyntaxNode;
use crate::core::timing::TIMING_LOG_NAME;

pub const ARTIFACT_SUFFIX: &str = ".bin";

/// Flattens a source path into a single artifact file name.
///
/// `/src/pkg/mod.py` with extension `py` becomes `.src.pkg.mod.bin`.
pub fn artifact_name(path: &Path, extension: &str) -> String {
    let text = path.to_string_lossy();
    let dotted = format!(".{extension}");
    let stem = text.strip_suffix(dotted.as_str()).unwrap_or(text.as_ref());
    let mut name: String = stem
        .chars()
        .map(|c| if std::path::is_separator(c) { '.' } else { c })
        .collect();
    name.push_str(ARTIFACT_SUFFIX);
    name
}

pub fn encode_tree(tree: &SyntaxNode) -> Result<Vec<u8>, Error> {
    serde_json::to_vec(tree).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode syntax tree")
            .with_source(err)
    })
}

pub fn decode_tree(bytes: &[u8]) -> Result<SyntaxNode, Error> {
    let corrupt = |err: serde_json::Error| {
        Error::new(ErrorKind::Corrupt)
            .with_message("artifact is not a valid syntax tree")
            .with_source(err)
    };
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let tree = SyntaxNode::deserialize(&mut de).map_err(corrupt)?;
    de.end().map_err(corrupt)?;
    Ok(tree)
}

pub fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, Error> {
    let path = dir.join(name);
    fs::write(&path, bytes).map_err(|err| Error::from_io(err, &path))?;
    Ok(path)
}

pub fn read_artifact(dir: &Path, name: &str) -> Result<Vec<u8>, Error> {
    let path = dir.join(name);
    fs::read(&path).map_err(|err| Error::from_io(err, &path))
}

/// Names of the regular files in `dir`, sorted, with the timing log left out.
pub fn list_artifacts(dir: &Path) -> Result<Vec<String>, Error> {
    let entries = fs::read_dir(dir).map_err(|err| Error::from_io(err, dir))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| Error::from_io(err, dir))?;
        let file_type = entry
            .file_type()
            .map_err(|err| Error::from_io(err, &entry.path()))?;
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == TIMING_LOG_NAME {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
