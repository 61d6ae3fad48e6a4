//! Animate the vibrational normal modes found in a MOLDEN-format frequency file.
//!
//! A file is read once into a [`MolecularFrame`]. Each mode can then be turned into an
//! [`AnimatedTrajectory`] by the [`ModeAnimator`], and written out as a multi-frame xyz file by
//! the [`TrajectoryWriter`].
//!
//! ```no_run
//! # fn main() -> wiggle::Result<()> {
//! let frame = wiggle::parse("water.mol", None)?;
//! for mode in 0..frame.nmodes() {
//!     let trajectory = wiggle::animate(&frame, mode, 10)?;
//!     wiggle::write(format!("water{mode}.xyz"), &trajectory, wiggle::DEFAULT_SCALE)?;
//! }
//! # Ok(())
//! # }
//! ```
use std::path::Path;

use glam::DVec3;

pub use crate::animate::{animate, ModeAnimator};
pub use crate::error::{Error, Result};
pub use crate::reader::{discover_dimensions, parse, Dimensions, ModeFileParser, Section};
pub use crate::selection::{ModeSelection, Range};
pub use crate::writer::{write, TrajectoryWriter, DEFAULT_SCALE};

pub mod animate;
mod error;
pub mod reader;
pub mod selection;
pub mod writer;

/// The positions of every atom in a molecule, in file order.
pub type Geometry = Vec<DVec3>;

/// Everything read from a single vibrations file.
///
/// Built once per file and only readable afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct MolecularFrame {
    title: String,
    atom_labels: Vec<String>,
    equilibrium: Geometry,
    intensities: Vec<f64>,
    ir_intensities: Vec<f64>,
    displacements: Vec<Geometry>,
}

impl MolecularFrame {
    pub const DEFAULT_TITLE: &'static str = "NModes";

    /// Assemble a [`MolecularFrame`], checking that the labels, the equilibrium geometry and every
    /// displacement field describe the same number of atoms.
    pub fn new(
        atom_labels: Vec<String>,
        equilibrium: Geometry,
        intensities: Vec<f64>,
        displacements: Vec<Geometry>,
    ) -> Result<Self> {
        let natoms = equilibrium.len();
        if natoms == 0 {
            return Err(invalid(Section::Coord, "a frame must contain at least one atom"));
        }
        if atom_labels.len() != natoms {
            return Err(invalid(
                Section::Coord,
                format!("{} labels for {natoms} atoms", atom_labels.len()),
            ));
        }
        if let Some((mode, field)) = displacements
            .iter()
            .enumerate()
            .find(|(_, field)| field.len() != natoms)
        {
            return Err(invalid(
                Section::NormCoord,
                format!(
                    "displacement field {mode} has {} vectors for {natoms} atoms",
                    field.len()
                ),
            ));
        }

        Ok(Self {
            title: Self::DEFAULT_TITLE.to_string(),
            atom_labels,
            equilibrium,
            intensities,
            ir_intensities: Vec::new(),
            displacements,
        })
    }

    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    pub fn with_ir_intensities(self, ir_intensities: Vec<f64>) -> Self {
        Self {
            ir_intensities,
            ..self
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Number of atoms in the molecule.
    pub fn natoms(&self) -> usize {
        self.equilibrium.len()
    }

    /// Number of modes that can be animated, i.e., the number of displacement fields.
    pub fn nmodes(&self) -> usize {
        self.displacements.len()
    }

    pub fn atom_labels(&self) -> &[String] {
        &self.atom_labels
    }

    /// Atomic positions of the optimized geometry, in the units of the source file.
    pub fn equilibrium(&self) -> &[DVec3] {
        &self.equilibrium
    }

    /// The per-mode values of the `[FREQ]` section, in file order.
    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    /// The per-mode values of the `[INT]` section. Empty if the file has none.
    pub fn ir_intensities(&self) -> &[f64] {
        &self.ir_intensities
    }

    pub fn displacements(&self) -> &[Geometry] {
        &self.displacements
    }

    /// Returns the displacement field of a mode.
    pub fn displacement(&self, mode: usize) -> Result<&[DVec3]> {
        self.displacements
            .get(mode)
            .map(Vec::as_slice)
            .ok_or(Error::IndexOutOfRange {
                index: mode,
                nmodes: self.nmodes(),
            })
    }
}

fn invalid(section: Section, message: impl Into<String>) -> Error {
    Error::Malformed {
        origin: reader::MEMORY_ORIGIN.to_string(),
        section,
        line: 0,
        message: message.into(),
    }
}

/// A sequence of geometries that animates one normal mode.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedTrajectory<'f> {
    pub title: String,
    /// Geometries in increasing order of their interpolation coefficient.
    pub frames: Vec<Geometry>,
    /// The coefficient each frame was displaced by, matching `frames` index for index.
    pub coefficients: Vec<f64>,
    /// Labels of the [`MolecularFrame`] this trajectory was derived from.
    pub atom_labels: &'f [String],
}

impl AnimatedTrajectory<'_> {
    pub fn nframes(&self) -> usize {
        self.frames.len()
    }

    /// Write this trajectory to `path` as a multi-frame xyz file.
    pub fn save<P: AsRef<Path>>(&self, path: P, scale: f64) -> Result<()> {
        write(path, self, scale)
    }
}
