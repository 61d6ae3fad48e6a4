use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use glam::DVec3;
use log::{debug, info, warn};

use crate::{Error, Geometry, MolecularFrame, Result};

/// The origin reported in errors for data that did not come from a file.
pub(crate) const MEMORY_ORIGIN: &str = "<memory>";

/// The token that opens a block of displacements in the `[FR-NORM-COORD]` section.
const VIBRATION_HEADER: &str = "vibration";

/// A section of a vibrations file, and the state the parser is in while reading it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// Outside of any section we are interested in.
    Seek,
    /// One frequency per line.
    Freq,
    /// One atom per line: a label followed by its equilibrium position.
    Coord,
    /// Blocks of displacement vectors, each opened by a `vibration <n>` header.
    NormCoord,
    /// One infrared intensity per line.
    Int,
}

impl Section {
    /// The marker that opens this section.
    pub const fn marker(self) -> &'static str {
        match self {
            Section::Seek => "",
            Section::Freq => "[FREQ]",
            Section::Coord => "[FR-COORD]",
            Section::NormCoord => "[FR-NORM-COORD]",
            Section::Int => "[INT]",
        }
    }

    fn from_marker(token: &str) -> Option<Self> {
        [
            Section::Freq,
            Section::Coord,
            Section::NormCoord,
            Section::Int,
        ]
        .into_iter()
        .find(|section| section.marker() == token)
    }

    /// Determine whether `line` moves the parser into another section.
    ///
    /// Known markers are recognized anywhere on the line. Any other bracketed line, such as
    /// `[Molden Format]` or `[Atoms]`, starts a section we skip.
    fn transition(line: &str) -> Option<Self> {
        if let Some(section) = line.split_whitespace().find_map(Self::from_marker) {
            return Some(section);
        }
        let line = line.trim();
        if line.starts_with('[') && line.ends_with(']') {
            return Some(Section::Seek);
        }
        None
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Section::Seek => write!(f, "unmarked"),
            section => write!(f, "{}", section.marker()),
        }
    }
}

/// The size of a vibrations file, as found by [`discover_dimensions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub natoms: usize,
    /// The number of frequencies reported in the file.
    ///
    /// This is one more than the number of modes a parsed [`MolecularFrame`] can animate.
    pub nfreqs: usize,
}

/// A single-pass reader for the normal-mode sections of a MOLDEN file.
///
/// The parser is a small state machine. It starts out seeking, and every marker line moves it
/// into the matching [`Section`]. Lines are interpreted according to the section the parser is
/// in at that moment. Blank lines are skipped everywhere.
///
/// # Note
///
/// The first block of the `[FR-NORM-COORD]` section is dropped, so a well-formed file yields one
/// displacement field fewer than it has frequencies. Files written by CP2K are laid out this way,
/// and the numbering of written trajectories depends on it.
#[derive(Debug)]
pub struct ModeFileParser<R> {
    reader: R,
    origin: String,
    title: String,
    /// The number of atoms the caller expects, if any.
    expected_natoms: Option<usize>,

    section: Section,
    visited: Vec<Section>,
    /// Number of the line that was read last (1-based).
    line: usize,

    intensities: Vec<f64>,
    ir_intensities: Vec<f64>,
    labels: Vec<String>,
    equilibrium: Geometry,
    /// Number of atom lines seen in the `[FR-COORD]` section, including discarded ones.
    coord_lines: usize,
    /// Number of `vibration` headers seen so far.
    blocks: usize,
    block: Option<Geometry>,
    displacements: Vec<Geometry>,
}

impl ModeFileParser<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| Error::FileNotFound {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)).with_origin(path.display().to_string()))
    }
}

impl<R: BufRead> ModeFileParser<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            origin: MEMORY_ORIGIN.to_string(),
            title: MolecularFrame::DEFAULT_TITLE.to_string(),
            expected_natoms: None,
            section: Section::Seek,
            visited: Vec::new(),
            line: 0,
            intensities: Vec::new(),
            ir_intensities: Vec::new(),
            labels: Vec::new(),
            equilibrium: Vec::new(),
            coord_lines: 0,
            blocks: 0,
            block: None,
            displacements: Vec::new(),
        }
    }

    /// Set the name that errors refer to this input by.
    pub fn with_origin(self, origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            ..self
        }
    }

    /// Set the title of the [`MolecularFrame`] that will be produced.
    pub fn with_title(self, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..self
        }
    }

    /// Require the `[FR-COORD]` section to list exactly `natoms` atoms.
    ///
    /// Atom lines past `natoms` are still read, but their values are not stored. Once the section
    /// ends, a line count that differs from `natoms` is reported as [`Error::Malformed`].
    pub fn expect_atoms(self, natoms: usize) -> Self {
        Self {
            expected_natoms: Some(natoms),
            ..self
        }
    }

    /// Read the whole input and return the [`MolecularFrame`] it describes.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::MissingSection`] if one of `[FREQ]`, `[FR-COORD]` or `[FR-NORM-COORD]`
    /// never appears, and with [`Error::Malformed`] if a value cannot be parsed or the atom counts
    /// disagree. Nothing is returned for a partially read file.
    pub fn parse(mut self) -> Result<MolecularFrame> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                break;
            }
            self.line += 1;

            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            match Section::transition(line) {
                Some(next) => self.enter(next)?,
                None => self.consume(line)?,
            }
        }
        // Close whatever section was still open at the end of the file.
        self.enter(Section::Seek)?;

        self.finish()
    }

    /// Count the frequencies and atoms in the input without storing any values.
    pub fn dimensions(mut self) -> Result<Dimensions> {
        let mut dimensions = Dimensions {
            natoms: 0,
            nfreqs: 0,
        };
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.reader.read_line(&mut buf)? == 0 {
                break;
            }
            self.line += 1;

            let line = buf.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(next) = Section::transition(line) {
                self.section = next;
                self.visited.push(next);
                continue;
            }
            match self.section {
                Section::Freq => dimensions.nfreqs += 1,
                Section::Coord => dimensions.natoms += 1,
                _ => {}
            }
        }

        for section in [Section::Freq, Section::Coord] {
            self.require(section)?;
        }
        if dimensions.natoms == 0 {
            self.section = Section::Coord;
            return Err(self.malformed("the section lists no atoms"));
        }
        debug!(
            "{}: found {} atoms and {} frequencies",
            self.origin, dimensions.natoms, dimensions.nfreqs
        );
        Ok(dimensions)
    }

    /// Close the current section and move into `next`.
    fn enter(&mut self, next: Section) -> Result<()> {
        self.close()?;

        match next {
            Section::Seek => {}
            Section::Freq | Section::Coord | Section::NormCoord | Section::Int
                if self.visited.contains(&next) =>
            {
                self.section = next;
                return Err(self.malformed(format!("{next} appears more than once")));
            }
            Section::NormCoord if !self.visited.contains(&Section::Coord) => {
                return Err(self.malformed(format!(
                    "{next} appears before {}, so the number of atoms is unknown",
                    Section::Coord
                )));
            }
            _ => debug!("{}:{}: entering {next}", self.origin, self.line),
        }

        self.section = next;
        self.visited.push(next);
        Ok(())
    }

    /// Validate the section that is currently open, now that it ends.
    fn close(&mut self) -> Result<()> {
        match self.section {
            Section::Coord => {
                if self.coord_lines == 0 {
                    return Err(self.malformed("the section lists no atoms"));
                }
                if let Some(expected) = self.expected_natoms {
                    if self.coord_lines != expected {
                        return Err(self.malformed(format!(
                            "expected {expected} atoms, but the section lists {}",
                            self.coord_lines
                        )));
                    }
                }
            }
            Section::NormCoord => self.finish_block()?,
            Section::Seek | Section::Freq | Section::Int => {}
        }
        Ok(())
    }

    /// Interpret a non-marker line according to the current section.
    fn consume(&mut self, line: &str) -> Result<()> {
        let mut tokens = line.split_whitespace();
        match self.section {
            Section::Seek => {}
            Section::Freq => {
                let value = self.number(tokens.next())?;
                self.intensities.push(value);
            }
            Section::Int => {
                let value = self.number(tokens.next())?;
                self.ir_intensities.push(value);
            }
            Section::Coord => {
                self.coord_lines += 1;
                if self.coord_lines > self.expected_natoms.unwrap_or(usize::MAX) {
                    debug!("{}:{}: ignoring surplus atom line", self.origin, self.line);
                    return Ok(());
                }
                let label = tokens.next().unwrap_or_default().to_string();
                let position = self.vector(tokens)?;
                self.labels.push(label);
                self.equilibrium.push(position);
            }
            Section::NormCoord => {
                if line.split_whitespace().any(|token| token == VIBRATION_HEADER) {
                    self.finish_block()?;
                    self.blocks += 1;
                    self.block = Some(Vec::with_capacity(self.equilibrium.len()));
                    return Ok(());
                }

                let filled = match &self.block {
                    Some(block) => block.len(),
                    None => {
                        return Err(self.malformed(format!(
                            "displacements appear before the first '{VIBRATION_HEADER}' header"
                        )))
                    }
                };
                if filled >= self.equilibrium.len() {
                    debug!(
                        "{}:{}: ignoring surplus displacement line",
                        self.origin, self.line
                    );
                    return Ok(());
                }
                let displacement = self.vector(tokens)?;
                if let Some(block) = self.block.as_mut() {
                    block.push(displacement);
                }
            }
        }
        Ok(())
    }

    /// Store the block of displacements that is being read, if there is one.
    fn finish_block(&mut self) -> Result<()> {
        let Some(block) = self.block.take() else {
            return Ok(());
        };

        let natoms = self.equilibrium.len();
        if block.len() < natoms {
            return Err(self.malformed(format!(
                "vibration block {} has {} displacements for {natoms} atoms",
                self.blocks,
                block.len()
            )));
        }

        if self.blocks == 1 {
            debug!("{}: dropping the first vibration block", self.origin);
        } else {
            self.displacements.push(block);
        }
        Ok(())
    }

    fn finish(self) -> Result<MolecularFrame> {
        for section in [Section::Freq, Section::Coord, Section::NormCoord] {
            self.require(section)?;
        }

        let nfreqs = self.intensities.len();
        let nmodes = self.displacements.len();
        if nmodes + 1 != nfreqs {
            warn!(
                "{}: found {nfreqs} frequencies, but {nmodes} animatable modes",
                self.origin
            );
        }
        if !self.ir_intensities.is_empty() && self.ir_intensities.len() != nfreqs {
            warn!(
                "{}: found {nfreqs} frequencies, but {} intensities",
                self.origin,
                self.ir_intensities.len()
            );
        }
        info!(
            "{}: read {} atoms and {nmodes} modes",
            self.origin,
            self.equilibrium.len()
        );

        let frame = MolecularFrame::new(
            self.labels,
            self.equilibrium,
            self.intensities,
            self.displacements,
        )?;
        Ok(frame
            .with_title(self.title)
            .with_ir_intensities(self.ir_intensities))
    }

    fn require(&self, section: Section) -> Result<()> {
        if self.visited.contains(&section) {
            Ok(())
        } else {
            Err(Error::MissingSection {
                origin: self.origin.clone(),
                section,
            })
        }
    }

    fn number(&self, token: Option<&str>) -> Result<f64> {
        let token = token.ok_or_else(|| self.malformed("expected a number"))?;
        token
            .parse()
            .map_err(|_| self.malformed(format!("could not parse '{token}' as a number")))
    }

    fn vector<'l>(&self, tokens: impl Iterator<Item = &'l str>) -> Result<DVec3> {
        let mut components = [0.0; 3];
        let mut n = 0;
        for token in tokens.take(3) {
            components[n] = self.number(Some(token))?;
            n += 1;
        }
        if n < 3 {
            return Err(self.malformed(format!("expected 3 vector components, found {n}")));
        }
        Ok(DVec3::from_array(components))
    }

    fn malformed(&self, message: impl Into<String>) -> Error {
        Error::Malformed {
            origin: self.origin.clone(),
            section: self.section,
            line: self.line,
            message: message.into(),
        }
    }
}

/// Read the vibrations file at `path`.
///
/// If `natoms` is given, the file must list exactly that many atoms.
pub fn parse<P: AsRef<Path>>(path: P, natoms: Option<usize>) -> Result<MolecularFrame> {
    let mut parser = ModeFileParser::open(path)?;
    if let Some(natoms) = natoms {
        parser = parser.expect_atoms(natoms);
    }
    parser.parse()
}

/// Count the atoms and frequencies in the vibrations file at `path`, without reading any of the
/// displacement data.
pub fn discover_dimensions<P: AsRef<Path>>(path: P) -> Result<Dimensions> {
    ModeFileParser::open(path)?.dimensions()
}
