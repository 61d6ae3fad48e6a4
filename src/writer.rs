use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::{AnimatedTrajectory, Error, Result};

/// Correction applied to every coordinate on output, so that geometries written from bohr-based
/// vibration files come out at the scale visualization tools expect.
pub const DEFAULT_SCALE: f64 = 1.3 / 2.5;

/// Number of significant digits written for each coordinate.
const PRECISION: usize = 12;

/// Writes [`AnimatedTrajectory`]s as multi-frame xyz files.
///
/// Every frame is a complete xyz record: the number of atoms, a title line, and one
/// `<label> <x> <y> <z>` line per atom. An animation is just these records concatenated.
#[derive(Debug)]
pub struct TrajectoryWriter<W> {
    writer: W,
    scale: f64,
}

impl TrajectoryWriter<BufWriter<File>> {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrajectoryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            scale: DEFAULT_SCALE,
        }
    }

    /// Set the factor every coordinate is multiplied by when it is written.
    pub fn with_scale(self, scale: f64) -> Self {
        Self { scale, ..self }
    }

    /// Append all frames of `trajectory`.
    ///
    /// If the trajectory carries fewer labels than a frame has atoms, the labels are repeated
    /// from the start.
    pub fn write_trajectory(&mut self, trajectory: &AnimatedTrajectory) -> Result<()> {
        if trajectory.atom_labels.is_empty() {
            return Err(Error::EmptyLabels);
        }

        for geometry in &trajectory.frames {
            writeln!(self.writer, "{}", geometry.len())?;
            writeln!(self.writer, "{}", trajectory.title)?;
            for (position, label) in geometry.iter().zip(trajectory.atom_labels.iter().cycle()) {
                let [x, y, z] = (*position * self.scale).to_array();
                writeln!(
                    self.writer,
                    "{label} {} {} {}",
                    General(x),
                    General(y),
                    General(z)
                )?;
            }
        }
        debug!(
            "wrote {} frames for '{}'",
            trajectory.nframes(),
            trajectory.title
        );

        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Write `trajectory` to a new file at `path`, scaling every coordinate by `scale`.
pub fn write<P: AsRef<Path>>(path: P, trajectory: &AnimatedTrajectory, scale: f64) -> Result<()> {
    let mut writer = TrajectoryWriter::create(path)?.with_scale(scale);
    writer.write_trajectory(trajectory)?;
    writer.flush()
}

/// Formats a float the way C's `%.12g` does.
///
/// Uses fixed notation unless the decimal exponent is below -4 or at least the precision, in
/// which case scientific notation with a signed, two-digit exponent is used. Trailing zeros are
/// removed in both cases.
struct General(f64);

impl fmt::Display for General {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value.is_nan() {
            return write!(f, "nan");
        }
        if value.is_infinite() {
            return write!(f, "{}", if value < 0.0 { "-inf" } else { "inf" });
        }

        // The exponent must be taken after rounding to the precision, so let the formatter do it.
        let digits = PRECISION - 1;
        let scientific = format!("{value:.digits$e}");
        let (mantissa, exponent) = scientific
            .split_once('e')
            .unwrap_or((scientific.as_str(), "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);

        if exponent < -4 || exponent >= PRECISION as i32 {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(
                f,
                "{}e{sign}{:02}",
                strip_zeros(mantissa),
                exponent.unsigned_abs()
            )
        } else {
            let decimals = (PRECISION as i32 - 1 - exponent) as usize;
            write!(f, "{}", strip_zeros(&format!("{value:.decimals$}")))
        }
    }
}

fn strip_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}
