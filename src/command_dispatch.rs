//! Purpose: Execute `astregress` subcommands and render their results.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap; library calls and stdout rendering live here.
//! Invariants: Timing summaries are produced only after a clean `TEST PASSED`, and the status line is
//! printed before any timing log is read.
//! Invariants: Each directory's timings are summarised independently; no cross-run test is made.

use super::*;

use astregress::core::compare::{CompareReport, CompareStatus, Finding, compare_dirs};
use astregress::core::pipeline::{ParseConfig, run_parse};
use astregress::core::sched::{SchedOutcome, request_fifo_scheduling};
use astregress::core::stats::{CONFIDENCE_LEVEL, TimingSummary, summarize};
use astregress::core::syntax::PythonParser;
use astregress::core::timing::{SkippedLine, TimingLog};
use super::output_paths::default_output_dir;
use std::path::Path;
use tracing::{info, warn};

pub(super) fn dispatch_command(command: Command) -> Result<RunOutcome, Error> {
    match command {
        Command::Parse {
            input_dirs,
            output,
            use_fifo,
            batch_size,
            extension,
        } => {
            if use_fifo {
                apply_fifo_scheduling();
            }
            let output_dir = output.unwrap_or_else(default_output_dir);
            let config = ParseConfig::new(input_dirs, output_dir)
                .with_batch_size(batch_size)
                .with_extension(extension);
            let mut parser = PythonParser::new()?;
            let outcome = run_parse(&config, &mut parser)?;
            info!(
                files = outcome.record.files,
                seconds = outcome.record.seconds,
                batches = outcome.batches,
                output = %outcome.output_dir.display(),
                "parse run recorded"
            );
            Ok(RunOutcome::ok())
        }
        Command::Compare { dir0, dir1, format } => {
            let report = compare_dirs(&dir0, &dir1)?;
            let passed = report.status() == CompareStatus::Passed;
            match format {
                CompareFormat::Human => {
                    emit_compare_human(&report);
                    if passed {
                        for dir in [&dir0, &dir1] {
                            emit_timing_human(&dir_timing(dir)?);
                        }
                    }
                }
                CompareFormat::Json => {
                    let timings = if passed {
                        [&dir0, &dir1]
                            .into_iter()
                            .map(|dir| dir_timing(dir))
                            .collect::<Result<Vec<_>, _>>()
                    } else {
                        Ok(Vec::new())
                    };
                    match timings {
                        Ok(timings) => emit_compare_json(&report, &timings),
                        Err(err) => {
                            // Report without timings; the error follows on stderr.
                            emit_compare_json(&report, &[]);
                            return Err(err);
                        }
                    }
                }
            }
            Ok(RunOutcome::ok())
        }
    }
}

fn apply_fifo_scheduling() {
    match request_fifo_scheduling() {
        SchedOutcome::Applied { priority } => {
            info!(priority, "using SCHED_FIFO scheduling");
        }
        SchedOutcome::Denied(err) => {
            warn!("cannot use SCHED_FIFO scheduling, continuing with default policy: {err}");
        }
        SchedOutcome::Unsupported => {
            warn!("SCHED_FIFO scheduling is not supported on this platform, continuing with default policy");
        }
    }
}

struct DirTiming {
    dir: PathBuf,
    skipped: Vec<SkippedLine>,
    summary: Option<TimingSummary>,
}

fn dir_timing(dir: &Path) -> Result<DirTiming, Error> {
    let log = TimingLog::in_dir(dir);
    let samples = log.read()?;
    for line in &samples.skipped {
        warn!(path = %log.path().display(), line = line.line_no, "unparseable timing line");
    }
    let summary = summarize(&samples.records).map_err(|err| err.with_path(log.path()))?;
    Ok(DirTiming {
        dir: dir.to_path_buf(),
        skipped: samples.skipped,
        summary,
    })
}

fn emit_compare_human(report: &CompareReport) {
    for line in report.finding_lines() {
        println!("{line}");
    }
    println!("{}", report.status());
}

fn emit_timing_human(timing: &DirTiming) {
    for line in &timing.skipped {
        println!(
            "Warning: cannot parse line {} of {}: {}",
            line.line_no,
            timing.dir.display(),
            line.text
        );
    }
    println!("{}", timing_line(timing));
}

fn timing_line(timing: &DirTiming) -> String {
    let dir = timing.dir.display();
    let Some(summary) = &timing.summary else {
        return format!("{dir}: no timing samples");
    };
    let runs = if summary.samples == 1 { "run" } else { "runs" };
    match summary.interval {
        Some(interval) => format!(
            "{dir}: mean {:.6}s, {:.0}% CI [{:.6}s, {:.6}s] ({} {runs} of {} files)",
            summary.mean,
            CONFIDENCE_LEVEL * 100.0,
            interval.low,
            interval.high,
            summary.samples,
            summary.files
        ),
        None => format!(
            "{dir}: mean {:.6}s ({} {runs} of {} files, too few runs for an interval)",
            summary.mean, summary.samples, summary.files
        ),
    }
}

fn finding_json(finding: &Finding) -> Value {
    match finding {
        Finding::MissingInRight { name } => json!({ "kind": "missing", "name": name }),
        Finding::Mismatch { name } => json!({ "kind": "mismatch", "name": name }),
        Finding::ExtraInRight { names } => json!({ "kind": "extra", "names": names }),
    }
}

fn timing_json(timing: &DirTiming) -> Value {
    let mut value = json!({
        "dir": timing.dir.display().to_string(),
        "skipped_lines": timing
            .skipped
            .iter()
            .map(|line| json!({ "line": line.line_no, "text": line.text }))
            .collect::<Vec<_>>(),
    });
    if let Some(summary) = &timing.summary {
        value["files"] = json!(summary.files);
        value["samples"] = json!(summary.samples);
        value["mean"] = json!(summary.mean);
        value["std_err"] = json!(summary.std_err);
        value["interval"] = match summary.interval {
            Some(interval) => json!([interval.low, interval.high]),
            None => Value::Null,
        };
    }
    value
}

fn emit_compare_json(report: &CompareReport, timings: &[DirTiming]) {
    let value = json!({
        "status": report.status().as_str(),
        "left": report.left.display().to_string(),
        "right": report.right.display().to_string(),
        "compared": report.compared,
        "findings": report.findings.iter().map(finding_json).collect::<Vec<_>>(),
        "confidence_level": CONFIDENCE_LEVEL,
        "timings": timings.iter().map(timing_json).collect::<Vec<_>>(),
        "ts": rfc3339_now(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
    );
}

#[cfg(test)]
mod tests {
    use super::{DirTiming, timing_line};
    use astregress::core::stats::{ConfidenceInterval, TimingSummary};
    use std::path::PathBuf;

    fn timing(summary: Option<TimingSummary>) -> DirTiming {
        DirTiming {
            dir: PathBuf::from("run-a"),
            skipped: Vec::new(),
            summary,
        }
    }

    #[test]
    fn timing_line_shows_interval() {
        let line = timing_line(&timing(Some(TimingSummary {
            files: 10,
            samples: 2,
            mean: 1.75,
            std_err: Some(0.25),
            interval: Some(ConfidenceInterval {
                low: -1.5,
                high: 5.0,
            }),
        })));
        assert_eq!(
            line,
            "run-a: mean 1.750000s, 95% CI [-1.500000s, 5.000000s] (2 runs of 10 files)"
        );
    }

    #[test]
    fn timing_line_without_samples() {
        assert_eq!(timing_line(&timing(None)), "run-a: no timing samples");
    }
}
