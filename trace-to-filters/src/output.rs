//! Writes filter outputs to file, or summarises them in the log.
use firmware_filters::{FilterTraces, Real};
use pulse_dsp_common::Intensity;
use std::{
    fmt::{Display, Formatter},
    fs::File,
    io::{BufWriter, Error, Write},
    path::Path,
};
use tracing::instrument;

/// One row of the output file.
struct FilterRow {
    index: usize,
    trace: Intensity,
    fast: Real,
    cfd: Real,
    slow: Real,
}

impl FilterRow {
    const HEADER: &'static str = "index,trace,fast,cfd,slow";

    fn write_to_file<W: Write>(&self, file: &mut W) -> Result<(), Error> {
        writeln!(
            file,
            "{},{},{},{},{}",
            self.index, self.trace, self.fast, self.cfd, self.slow
        )
    }
}

fn rows<'a>(
    trace: &'a [Intensity],
    traces: &'a FilterTraces,
) -> impl Iterator<Item = FilterRow> + 'a {
    trace
        .iter()
        .zip(&traces.fast)
        .zip(&traces.cfd)
        .zip(&traces.slow)
        .enumerate()
        .map(|(index, (((&trace, &fast), &cfd), &slow))| FilterRow {
            index,
            trace,
            fast,
            cfd,
            slow,
        })
}

/// Writes the trace and its filter outputs as comma separated values, one sample per line.
#[instrument(skip_all, fields(path = %path.display()))]
pub(crate) fn save_to_file(
    path: &Path,
    trace: &[Intensity],
    traces: &FilterTraces,
) -> Result<(), Error> {
    let mut file = BufWriter::new(File::create(path)?);
    write_rows(&mut file, trace, traces)?;
    file.flush()
}

fn write_rows<W: Write>(
    file: &mut W,
    trace: &[Intensity],
    traces: &FilterTraces,
) -> Result<(), Error> {
    writeln!(file, "{}", FilterRow::HEADER)?;
    for row in rows(trace, traces) {
        row.write_to_file(file)?;
    }
    Ok(())
}

/// The largest value of a filter output, and where it occurs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Peak {
    pub(crate) index: usize,
    pub(crate) value: Real,
}

impl Peak {
    pub(crate) fn find(output: &[Real]) -> Option<Self> {
        output
            .iter()
            .copied()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, value)| Self { index, value })
    }
}

impl Display for Peak {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.value, self.index)
    }
}

/// Finds the first point after the CFD maximum at which the output falls through zero,
/// linearly interpolated between the two samples either side.
pub(crate) fn cfd_zero_crossing(cfd: &[Real]) -> Option<Real> {
    let peak = Peak::find(cfd)?;
    if peak.value <= 0.0 {
        return None;
    }
    cfd.get(peak.index..)?
        .windows(2)
        .enumerate()
        .find_map(|(offset, pair)| match *pair {
            [before, after] if before > 0.0 && after <= 0.0 => {
                let fraction = before / (before - after);
                Some((peak.index + offset) as Real + fraction)
            }
            _ => None,
        })
}

/// Summary of an analysis, suitable for logging.
#[derive(Debug)]
pub(crate) struct Summary {
    pub(crate) fast: Option<Peak>,
    pub(crate) cfd: Option<Peak>,
    pub(crate) slow: Option<Peak>,
    pub(crate) cfd_zero_crossing: Option<Real>,
}

impl Summary {
    pub(crate) fn new(traces: &FilterTraces) -> Self {
        Self {
            fast: Peak::find(&traces.fast),
            cfd: Peak::find(&traces.cfd),
            slow: Peak::find(&traces.slow),
            cfd_zero_crossing: cfd_zero_crossing(&traces.cfd),
        }
    }
}
