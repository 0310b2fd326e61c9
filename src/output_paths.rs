//! Purpose: CLI path helpers: default output directory and directory-argument validation.
//! Exports: `default_output_dir`, `existing_dir`.
//! Role: Keep path defaults for `parse` and `compare` in one place.
//! Invariants: Default output directory is `compiled_AST` next to the executable.

use std::path::{Path, PathBuf};

pub(crate) const DEFAULT_OUTPUT_DIR_NAME: &str = "compiled_AST";

pub(crate) fn default_output_dir() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    output_dir_next_to(exe_dir.as_deref())
}

fn output_dir_next_to(exe_dir: Option<&Path>) -> PathBuf {
    match exe_dir {
        Some(dir) => dir.join(DEFAULT_OUTPUT_DIR_NAME),
        None => PathBuf::from(DEFAULT_OUTPUT_DIR_NAME),
    }
}

/// clap value parser accepting only paths that are existing directories.
pub(crate) fn existing_dir(value: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_dir() {
        Ok(path)
    } else {
        Err("path must be an existing directory".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{DEFAULT_OUTPUT_DIR_NAME, existing_dir, output_dir_next_to};
    use std::path::{Path, PathBuf};

    #[test]
    fn output_dir_sits_next_to_executable() {
        assert_eq!(
            output_dir_next_to(Some(Path::new("/opt/tool/bin"))),
            PathBuf::from("/opt/tool/bin").join(DEFAULT_OUTPUT_DIR_NAME)
        );
        assert_eq!(output_dir_next_to(None), PathBuf::from(DEFAULT_OUTPUT_DIR_NAME));
    }

    #[test]
    fn existing_dir_rejects_files_and_missing_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        let file = dir.path().join("f.txt");
        std::fs::write(&file, "x").expect("write");

        assert!(existing_dir(dir.path().to_str().unwrap()).is_ok());
        assert!(existing_dir(file.to_str().unwrap()).is_err());
        assert!(existing_dir(dir.path().join("nope").to_str().unwrap()).is_err());
    }
}
