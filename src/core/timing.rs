//! Purpose: Append-only store of parse timings shared by runs into one output directory.
//! Exports: `TIMING_LOG_NAME`, `TimingRecord`, `TimingLog`, `TimingSamples`, `SkippedLine`.
//! Role: Explicit handle over the `time.txt` log; callers never touch the file directly.
//! Invariants: Records are only ever appended, one line each: `<files> took: <seconds>s`.
//! Invariants: Appends hold an exclusive advisory lock for the duration of the write.
//! Invariants: A missing log reads as an empty sample set.
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::core::error::Error;

pub const TIMING_LOG_NAME: &str = "time.txt";

const RECORD_SEPARATOR: &str = " took: ";

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingRecord {
    pub files: u64,
    pub seconds: f64,
}

impl TimingRecord {
    pub fn parse_line(line: &str) -> Option<Self> {
        let (files, rest) = line.trim().split_once(RECORD_SEPARATOR)?;
        let seconds = rest.strip_suffix('s')?;
        let files = files.parse::<u64>().ok()?;
        let seconds = seconds.parse::<f64>().ok()?;
        if !seconds.is_finite() || seconds < 0.0 {
            return None;
        }
        Some(Self { files, seconds })
    }
}

impl fmt::Display for TimingRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{RECORD_SEPARATOR}{}s", self.files, self.seconds)
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SkippedLine {
    pub line_no: usize,
    pub text: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimingSamples {
    pub records: Vec<TimingRecord>,
    pub skipped: Vec<SkippedLine>,
}

#[derive(Clone, Debug)]
pub struct TimingLog {
    path: PathBuf,
}

impl TimingLog {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: dir.join(TIMING_LOG_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn append(&self, record: &TimingRecord) -> Result<(), Error> {
        let map_err = |err: io::Error| Error::from_io(err, &self.path);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(map_err)?;
        file.lock_exclusive().map_err(map_err)?;
        let line = format!("{record}\n");
        let written = file.write_all(line.as_bytes()).and_then(|()| file.flush());
        let unlocked = FileExt::unlock(&file);
        written.map_err(map_err)?;
        unlocked.map_err(map_err)
    }

    pub fn read(&self) -> Result<TimingSamples, Error> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(TimingSamples::default());
            }
            Err(err) => return Err(Error::from_io(err, &self.path)),
        };

        let mut samples = TimingSamples::default();
        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match TimingRecord::parse_line(line) {
                Some(record) => samples.records.push(record),
                None => samples.skipped.push(SkippedLine {
                    line_no: idx + 1,
                    text: line.to_string(),
                }),
            }
        }
        Ok(samples)
    }
}
