use log::debug;

use crate::{AnimatedTrajectory, Error, Geometry, MolecularFrame, Result};

/// Displaces an equilibrium geometry along a normal mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModeAnimator {
    step: f64,
}

impl ModeAnimator {
    /// The increment of the displacement coefficient between two consecutive frames.
    pub const STEP: f64 = 0.1;

    pub const fn new() -> Self {
        Self { step: Self::STEP }
    }

    pub const fn with_step(step: f64) -> Self {
        Self { step }
    }

    pub const fn step(&self) -> f64 {
        self.step
    }

    /// Produce `2 * half_width` geometries for the mode at `mode`.
    ///
    /// Frame `k` is displaced by the coefficient `(k - half_width) * step`, so the coefficients
    /// run from `-half_width * step` up to and including `(half_width - 1) * step`. There is no
    /// frame for `+half_width`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] if `frame` has no mode at `mode`, and
    /// [`Error::InvalidHalfWidth`] if `half_width` is zero.
    pub fn animate<'f>(
        &self,
        frame: &'f MolecularFrame,
        mode: usize,
        half_width: usize,
    ) -> Result<AnimatedTrajectory<'f>> {
        let displacement = frame.displacement(mode)?;
        if half_width == 0 {
            return Err(Error::InvalidHalfWidth);
        }

        let n = half_width as i64;
        let coefficients: Vec<f64> = (-n..n).map(|m| m as f64 * self.step).collect();
        let frames: Vec<Geometry> = coefficients
            .iter()
            .map(|&c| {
                frame
                    .equilibrium()
                    .iter()
                    .zip(displacement)
                    .map(|(&position, &d)| position + c * d)
                    .collect()
            })
            .collect();
        debug!(
            "animated mode {mode} over {} frames with a step of {}",
            2 * half_width,
            self.step()
        );

        Ok(AnimatedTrajectory {
            title: format!("Vibration {}", mode + 1),
            frames,
            coefficients,
            atom_labels: frame.atom_labels(),
        })
    }
}

impl Default for ModeAnimator {
    fn default() -> Self {
        Self::new()
    }
}

/// Animate a mode with the default [`ModeAnimator::STEP`].
pub fn animate(
    frame: &MolecularFrame,
    mode: usize,
    half_width: usize,
) -> Result<AnimatedTrajectory<'_>> {
    ModeAnimator::new().animate(frame, mode, half_width)
}
