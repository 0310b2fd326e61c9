//! Purpose: Summarize parse-time samples with a Student-t confidence interval.
//! Exports: `CONFIDENCE_LEVEL`, `ConfidenceInterval`, `TimingSummary`, `summarize`, `t_critical`.
//! Role: Per-directory statistics for the compare report; no cross-sample test is performed.
//! Invariants: All records in one summary share the same file count, otherwise `ErrorKind::Internal`.
//! Invariants: Fewer than two samples produce a mean without an interval.
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::core::error::{Error, ErrorKind};
use crate::core::timing::TimingRecord;

pub const CONFIDENCE_LEVEL: f64 = 0.95;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfidenceInterval {
    pub low: f64,
    pub high: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimingSummary {
    pub files: u64,
    pub samples: usize,
    pub mean: f64,
    pub std_err: Option<f64>,
    pub interval: Option<ConfidenceInterval>,
}

pub fn summarize(records: &[TimingRecord]) -> Result<Option<TimingSummary>, Error> {
    let Some(first) = records.first() else {
        return Ok(None);
    };
    if let Some(other) = records.iter().find(|record| record.files != first.files) {
        return Err(Error::new(ErrorKind::Internal).with_message(format!(
            "timing log mixes runs over different file counts ({} and {})",
            first.files, other.files
        )));
    }

    let n = records.len();
    let mean = records.iter().map(|record| record.seconds).sum::<f64>() / n as f64;
    if n < 2 {
        return Ok(Some(TimingSummary {
            files: first.files,
            samples: n,
            mean,
            std_err: None,
            interval: None,
        }));
    }

    let variance = records
        .iter()
        .map(|record| (record.seconds - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let std_err = variance.sqrt() / (n as f64).sqrt();
    let t = t_critical((n - 1) as f64)?;
    let half_width = t * std_err;

    Ok(Some(TimingSummary {
        files: first.files,
        samples: n,
        mean,
        std_err: Some(std_err),
        interval: Some(ConfidenceInterval {
            low: mean - half_width,
            high: mean + half_width,
        }),
    }))
}

/// Two-sided Student-t critical value for `CONFIDENCE_LEVEL` with `df` degrees of freedom.
pub fn t_critical(df: f64) -> Result<f64, Error> {
    let dist = StudentsT::new(0.0, 1.0, df).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message(format!("invalid t distribution (df = {df}): {err}"))
    })?;
    Ok(dist.inverse_cdf(0.5 + CONFIDENCE_LEVEL / 2.0))
}
