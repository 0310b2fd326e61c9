//! Purpose: Parse command pipeline: discover, read, parse (timed), write artifacts, log timing.
//! Exports: `DEFAULT_BATCH_SIZE`, `DEFAULT_EXTENSION`, `ParseConfig`, `ParseOutcome`, `run_parse`.
//! Role: Drives any `SourceParser`; owns batching and the timed region.
//! Invariants: Only the parse calls are timed; reads and artifact writes are outside the clock.
//! Invariants: Batch size bounds memory only; the artifact set does not depend on it.
//! Invariants: The first read or parse failure aborts the run and no timing record is written.
//! Invariants: Two sources that flatten to one artifact name abort the run before anything is written.
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::core::artifact::{artifact_name, encode_tree, write_artifact};
use crate::core::error::{Error, ErrorKind};
use crate::core::source::{discover_sources, read_batch};
use crate::core::syntax::SourceParser;
use crate::core::timing::{TimingLog, TimingRecord};

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_EXTENSION: &str = "py";

#[derive(Clone, Debug)]
pub struct ParseConfig {
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    pub batch_size: usize,
    pub extension: String,
}

impl ParseConfig {
    pub fn new(inputs: Vec<PathBuf>, output_dir: PathBuf) -> Self {
        Self {
            inputs,
            output_dir,
            batch_size: DEFAULT_BATCH_SIZE,
            extension: DEFAULT_EXTENSION.to_string(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParseOutcome {
    pub record: TimingRecord,
    pub batches: usize,
    pub output_dir: PathBuf,
}

pub fn run_parse<P: SourceParser>(config: &ParseConfig, parser: &mut P) -> Result<ParseOutcome, Error> {
    if config.batch_size == 0 {
        return Err(Error::new(ErrorKind::Usage)
            .with_message("batch size must be at least 1"));
    }

    let sources = discover_sources(&config.inputs, &config.extension)?;
    check_artifact_names(&sources, &config.extension)?;
    fs::create_dir_all(&config.output_dir)
        .map_err(|err| Error::from_io(err, &config.output_dir))?;

    let mut parse_time = Duration::ZERO;
    let mut batches = 0;
    for chunk in sources.chunks(config.batch_size) {
        let files = read_batch(chunk)?;

        let started = Instant::now();
        let mut trees = Vec::with_capacity(files.len());
        for file in &files {
            trees.push(parser.parse(&file.text, &file.path)?);
        }
        let elapsed = started.elapsed();
        parse_time += elapsed;

        for (file, tree) in files.iter().zip(&trees) {
            let name = artifact_name(&file.path, &config.extension);
            write_artifact(&config.output_dir, &name, &encode_tree(tree)?)?;
        }
        batches += 1;
        debug!(batch = batches, files = files.len(), ?elapsed, "batch parsed");
    }

    let record = TimingRecord {
        files: sources.len() as u64,
        seconds: parse_time.as_secs_f64(),
    };
    TimingLog::in_dir(&config.output_dir).append(&record)?;

    Ok(ParseOutcome {
        record,
        batches,
        output_dir: config.output_dir.clone(),
    })
}

fn check_artifact_names(sources: &[PathBuf], extension: &str) -> Result<(), Error> {
    let mut names: HashMap<String, &PathBuf> = HashMap::with_capacity(sources.len());
    for path in sources {
        if let Some(previous) = names.insert(artifact_name(path, extension), path) {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "{} and {} map to the same artifact name",
                    previous.display(),
                    path.display()
                ))
                .with_path(path)
                .with_hint("Rename one of the files or parse their directories separately."));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ParseConfig, run_parse};
    use crate::core::artifact::{decode_tree, list_artifacts, read_artifact};
    use crate::core::compare::{CompareStatus, compare_dirs};
    use crate::core::error::{Error, ErrorKind};
    use crate::core::syntax::{PythonParser, SourceParser, SyntaxNode};
    use crate::core::timing::{TIMING_LOG_NAME, TimingLog};
    use std::fs;
    use std::path::Path;

    /// Cheap deterministic parser: one leaf per source line.
    struct LineParser;

    impl SourceParser for LineParser {
        fn parse(&mut self, source: &str, filename: &Path) -> Result<SyntaxNode, Error> {
            if source.contains("!!") {
                return Err(Error::new(ErrorKind::Syntax).with_path(filename));
            }
            let children = source
                .lines()
                .enumerate()
                .map(|(row, line)| SyntaxNode {
                    kind: "line".to_string(),
                    field: None,
                    named: true,
                    start: [row, 0],
                    end: [row, line.len()],
                    text: Some(line.to_string()),
                    children: Vec::new(),
                })
                .collect();
            Ok(SyntaxNode {
                kind: "file".to_string(),
                field: None,
                named: true,
                start: [0, 0],
                end: [0, 0],
                text: None,
                children,
            })
        }
    }

    #[test]
    fn batch_size_does_not_change_artifacts() {
        let input = tempfile::tempdir().expect("tempdir");
        for i in 0..2500 {
            let sub = input.path().join(format!("d{}", i % 7));
            fs::create_dir_all(&sub).expect("mkdir");
            fs::write(sub.join(format!("m{i}.py")), format!("x = {i}\n")).expect("write");
        }
        let out = tempfile::tempdir().expect("tempdir");
        let small = out.path().join("small");
        let large = out.path().join("large");

        let config = ParseConfig::new(vec![input.path().to_path_buf()], small.clone())
            .with_batch_size(1000);
        let outcome = run_parse(&config, &mut LineParser).expect("parse");
        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.record.files, 2500);

        let config = ParseConfig::new(vec![input.path().to_path_buf()], large.clone())
            .with_batch_size(2500);
        let outcome = run_parse(&config, &mut LineParser).expect("parse");
        assert_eq!(outcome.batches, 1);

        assert_eq!(list_artifacts(&small).expect("list").len(), 2500);
        let report = compare_dirs(&small, &large).expect("compare");
        assert_eq!(report.status(), CompareStatus::Passed);
    }

    #[test]
    fn empty_input_still_creates_output_and_logs_zero() {
        let input = tempfile::tempdir().expect("tempdir");
        let out = tempfile::tempdir().expect("tempdir");
        let output_dir = out.path().join("nested").join("ast");

        let config = ParseConfig::new(vec![input.path().to_path_buf()], output_dir.clone());
        let outcome = run_parse(&config, &mut LineParser).expect("parse");
        assert_eq!(outcome.batches, 0);
        assert!(output_dir.is_dir());

        let samples = TimingLog::in_dir(&output_dir).read().expect("read");
        assert_eq!(samples.records.len(), 1);
        assert_eq!(samples.records[0].files, 0);
        assert_eq!(samples.records[0].seconds, 0.0);
    }

    #[test]
    fn each_run_appends_one_record() {
        let input = tempfile::tempdir().expect("tempdir");
        fs::write(input.path().join("a.py"), "a\n").expect("write");
        let out = tempfile::tempdir().expect("tempdir");

        let config = ParseConfig::new(vec![input.path().to_path_buf()], out.path().to_path_buf());
        run_parse(&config, &mut LineParser).expect("parse");
        run_parse(&config, &mut LineParser).expect("parse");

        let samples = TimingLog::in_dir(out.path()).read().expect("read");
        assert_eq!(samples.records.len(), 2);
        assert!(samples.records.iter().all(|record| record.files == 1));
    }

    #[test]
    fn parse_failure_aborts_without_timing_record() {
        let input = tempfile::tempdir().expect("tempdir");
        fs::write(input.path().join("a.py"), "fine\n").expect("write");
        fs::write(input.path().join("b.py"), "!!\n").expect("write");
        let out = tempfile::tempdir().expect("tempdir");

        let config = ParseConfig::new(vec![input.path().to_path_buf()], out.path().to_path_buf());
        let err = run_parse(&config, &mut LineParser).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);
        assert!(!out.path().join(TIMING_LOG_NAME).exists());
    }

    #[test]
    fn colliding_artifact_names_abort_before_writing() {
        let input = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(input.path().join("a")).expect("mkdir");
        fs::write(input.path().join("a.b.py"), "dotted\n").expect("write");
        fs::write(input.path().join("a/b.py"), "nested\n").expect("write");
        let out = tempfile::tempdir().expect("tempdir");
        let output_dir = out.path().join("ast");

        let config = ParseConfig::new(vec![input.path().to_path_buf()], output_dir.clone());
        let err = run_parse(&config, &mut LineParser).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
        let message = err.message().expect("message");
        assert!(message.contains("a.b.py"), "{message}");
        let nested = format!("a{}b.py", std::path::MAIN_SEPARATOR);
        assert!(message.contains(&nested), "{message}");
        assert!(message.contains("same artifact name"));
        assert!(!output_dir.exists());
    }

    #[test]
    fn zero_batch_size_is_a_usage_error() {
        let input = tempfile::tempdir().expect("tempdir");
        let config = ParseConfig::new(vec![input.path().to_path_buf()], input.path().join("out"))
            .with_batch_size(0);
        let err = run_parse(&config, &mut LineParser).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn python_round_trip_is_bit_identical() {
        let input = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(input.path().join("pkg")).expect("mkdir");
        fs::write(
            input.path().join("pkg/util.py"),
            "import os\n\nclass A:\n    def run(self, x):\n        return os.path.join(x, 'y')\n",
        )
        .expect("write");
        fs::write(input.path().join("main.py"), "print(1 + 2 * 3)\n").expect("write");

        let out = tempfile::tempdir().expect("tempdir");
        let first = out.path().join("first");
        let second = out.path().join("second");
        let mut parser = PythonParser::new().expect("parser");
        for dir in [&first, &second] {
            let config = ParseConfig::new(vec![input.path().to_path_buf()], dir.clone());
            run_parse(&config, &mut parser).expect("parse");
        }

        let report = compare_dirs(&first, &second).expect("compare");
        assert_eq!(report.status(), CompareStatus::Passed);
        assert_eq!(report.compared, 2);

        let names = list_artifacts(&first).expect("list");
        assert!(names.iter().all(|name| name.ends_with(".bin")));
        let tree = decode_tree(&read_artifact(&first, &names[0]).expect("read")).expect("decode");
        assert_eq!(tree.kind, "module");
    }
}
