//! Purpose: Byte-exact comparison of two artifact directories.
//! Exports: `CompareStatus`, `Finding`, `CompareReport`, `compare_dirs`.
//! Role: Scans every artifact once and accumulates findings; never stops early on a mismatch.
//! Invariants: The timing log is excluded from both sides.
//! Invariants: Any mismatch is `Failed`; otherwise any missing or extra file is `PassedWithWarnings`.
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::artifact::{list_artifacts, read_artifact};
use crate::core::error::Error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareStatus {
    Passed,
    PassedWithWarnings,
    Failed,
}

impl CompareStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompareStatus::Passed => "passed",
            CompareStatus::PassedWithWarnings => "passed_with_warnings",
            CompareStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for CompareStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareStatus::Passed => f.write_str("TEST PASSED"),
            CompareStatus::PassedWithWarnings => f.write_str("TEST PASSED WITH WARNINGS"),
            CompareStatus::Failed => f.write_str("TEST FAILED"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Finding {
    /// Present in the left directory only.
    MissingInRight { name: String },
    /// Present on both sides with different bytes.
    Mismatch { name: String },
    /// Names left unmatched in the right directory after the scan.
    ExtraInRight { names: Vec<String> },
}

impl Finding {
    pub fn is_error(&self) -> bool {
        matches!(self, Finding::Mismatch { .. })
    }
}

#[derive(Clone, Debug)]
pub struct CompareReport {
    pub left: PathBuf,
    pub right: PathBuf,
    pub compared: usize,
    pub findings: Vec<Finding>,
}

impl CompareReport {
    pub fn status(&self) -> CompareStatus {
        if self.findings.iter().any(Finding::is_error) {
            CompareStatus::Failed
        } else if self.findings.is_empty() {
            CompareStatus::Passed
        } else {
            CompareStatus::PassedWithWarnings
        }
    }

    /// Human-readable lines for each finding, in scan order.
    pub fn finding_lines(&self) -> Vec<String> {
        let left = self.left.display();
        let right = self.right.display();
        self.findings
            .iter()
            .map(|finding| match finding {
                Finding::MissingInRight { name } => {
                    format!("Warning: file {name} exists in {left}, but not in {right}.")
                }
                Finding::Mismatch { name } => format!("Error: file {name} does not match."),
                Finding::ExtraInRight { names } => format!(
                    "Warning: files {} exist in {right}, but not in {left}.",
                    names.join(", ")
                ),
            })
            .collect()
    }
}

pub fn compare_dirs(left: &Path, right: &Path) -> Result<CompareReport, Error> {
    let mut pending: BTreeSet<String> = list_artifacts(right)?.into_iter().collect();
    let mut findings = Vec::new();
    let mut compared = 0;

    for name in list_artifacts(left)? {
        if !pending.remove(&name) {
            findings.push(Finding::MissingInRight { name });
            continue;
        }
        compared += 1;
        let left_bytes = read_artifact(left, &name)?;
        let right_bytes = read_artifact(right, &name)?;
        if left_bytes != right_bytes {
            findings.push(Finding::Mismatch { name });
        }
    }

    if !pending.is_empty() {
        findings.push(Finding::ExtraInRight {
            names: pending.into_iter().collect(),
        });
    }

    Ok(CompareReport {
        left: left.to_path_buf(),
        right: right.to_path_buf(),
        compared,
        findings,
    })
}

#[cfg(test)]
mod tests {
    use super::{CompareStatus, Finding, compare_dirs};
    use crate::core::timing::TIMING_LOG_NAME;
    use std::fs;
    use std::path::Path;

    fn put(dir: &Path, name: &str, bytes: &[u8]) {
        fs::write(dir.join(name), bytes).expect("write");
    }

    #[test]
    fn identical_dirs_pass_even_with_different_timing_logs() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");
        for dir in [a.path(), b.path()] {
            put(dir, "x.bin", b"same");
            put(dir, "y.bin", b"also same");
        }
        put(a.path(), TIMING_LOG_NAME, b"2 took: 1s\n");
        put(b.path(), TIMING_LOG_NAME, b"2 took: 3s\n2 took: 4s\n");

        let report = compare_dirs(a.path(), b.path()).expect("compare");
        assert_eq!(report.status(), CompareStatus::Passed);
        assert_eq!(report.compared, 2);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn set_difference_is_reported_both_ways() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");
        put(a.path(), "a.bin", b"1");
        put(a.path(), "b.bin", b"2");
        put(b.path(), "b.bin", b"2");
        put(b.path(), "c.bin", b"3");

        let report = compare_dirs(a.path(), b.path()).expect("compare");
        assert_eq!(report.status(), CompareStatus::PassedWithWarnings);
        assert_eq!(
            report.findings,
            vec![
                Finding::MissingInRight {
                    name: "a.bin".to_string()
                },
                Finding::ExtraInRight {
                    names: vec!["c.bin".to_string()]
                },
            ]
        );
        let lines = report.finding_lines();
        assert!(lines[0].contains("a.bin exists in"));
        assert!(lines[1].contains("c.bin exist in"));
    }

    #[test]
    fn any_mismatch_fails_and_scan_continues() {
        let a = tempfile::tempdir().expect("tempdir");
        let b = tempfile::tempdir().expect("tempdir");
        put(a.path(), "a.bin", b"left");
        put(b.path(), "a.bin", b"right");
        put(a.path(), "b.bin", b"ok");
        put(b.path(), "b.bin", b"ok");
        put(a.path(), "c.bin", b"only left");

        let report = compare_dirs(a.path(), b.path()).expect("compare");
        assert_eq!(report.status(), CompareStatus::Failed);
        assert_eq!(report.compared, 2);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(
            report.finding_lines()[0],
            "Error: file a.bin does not match."
        );
    }

    #[test]
    fn status_lines_are_stable() {
        assert_eq!(CompareStatus::Passed.to_string(), "TEST PASSED");
        assert_eq!(
            CompareStatus::PassedWithWarnings.to_string(),
            "TEST PASSED WITH WARNINGS"
        );
        assert_eq!(CompareStatus::Failed.to_string(), "TEST FAILED");
    }
}
