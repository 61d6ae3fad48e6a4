use std::num::{NonZeroUsize, ParseIntError};
use std::str::FromStr;

/// A selection of modes to animate, by their index in [`MolecularFrame::displacements`].
///
/// [`MolecularFrame::displacements`]: crate::MolecularFrame::displacements
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub enum ModeSelection {
    /// Include every mode.
    #[default]
    All,
    /// Include modes that lie within a certain [`Range`].
    Range(Range),
    /// Include the modes at these indices.
    ///
    /// Invariant: The indices are sorted and unique.
    List(Vec<usize>),
}

impl ModeSelection {
    /// Create a selection from a list of indices, in any order and possibly repeated.
    pub fn from_indices(indices: &[usize]) -> Self {
        let mut indices = indices.to_vec();
        indices.sort_unstable();
        indices.dedup();
        Self::List(indices)
    }

    /// Determine whether some index `idx` is included in this [`ModeSelection`].
    ///
    /// Will return [`None`] once the index is beyond the scope of this `ModeSelection`.
    pub fn is_included(&self, idx: usize) -> Option<bool> {
        match self {
            ModeSelection::All => Some(true),
            ModeSelection::Range(range) => range.is_included(idx),
            ModeSelection::List(indices) => {
                if *indices.last()? < idx {
                    None
                } else {
                    Some(indices.binary_search(&idx).is_ok())
                }
            }
        }
    }

    /// The selected indices among `nmodes` modes, in ascending order.
    pub fn indices(&self, nmodes: usize) -> impl Iterator<Item = usize> + '_ {
        (0..nmodes)
            .map(|idx| (idx, self.is_included(idx)))
            .take_while(|(_, included)| included.is_some())
            .filter_map(|(idx, included)| included.unwrap_or_default().then_some(idx))
    }

    /// Indices that were asked for explicitly, but lie beyond the `nmodes` available modes.
    ///
    /// Only a [`ModeSelection::List`] names indices explicitly. Ranges simply stop at the last
    /// mode.
    pub fn out_of_range(&self, nmodes: usize) -> impl Iterator<Item = usize> + '_ {
        let indices: &[usize] = match self {
            ModeSelection::List(indices) => indices.as_slice(),
            ModeSelection::All | ModeSelection::Range(_) => &[],
        };
        indices.iter().copied().filter(move |&idx| idx >= nmodes)
    }
}

impl FromStr for ModeSelection {
    type Err = ParseIntError;

    /// Parse either a comma-separated list of indices (`2,5,7`) or a range in the format
    /// `start:stop:step`, where each of these values is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !s.contains(':') {
            let indices = s
                .split(',')
                .map(|index| index.trim().parse())
                .collect::<Result<Vec<usize>, _>>()?;
            return Ok(Self::from_indices(&indices));
        }

        let mut components = s.split(':').map(str::trim);
        let mut next = || components.next().filter(|c| !c.is_empty());
        let start = next().map(str::parse).transpose()?;
        let end = next().map(str::parse).transpose()?;
        let step = next().map(NonZeroUsize::from_str).transpose()?;
        Ok(Self::Range(Range::new(start, end, step)))
    }
}

/// A range of mode indices.
///
/// The `start` is always bounded, and is zero by default. The `end` is exclusive, and is unbounded
/// when it is [`None`]. Of every `step` modes from `start` onwards, only the first is included.
///
/// # Note
///
/// A `Range` where `start` > `end` is valid, but selects nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: Option<usize>,
    pub step: NonZeroUsize,
}

impl Range {
    pub fn new(start: Option<usize>, end: Option<usize>, step: Option<NonZeroUsize>) -> Self {
        let mut range = Self {
            end,
            ..Self::default()
        };
        if let Some(start) = start {
            range.start = start;
        }
        if let Some(step) = step {
            range.step = step;
        }
        range
    }

    fn is_included(&self, idx: usize) -> Option<bool> {
        if let Some(end) = self.end {
            // Determine whether `idx` is already beyond the defined range.
            if end <= idx {
                return None;
            }
        }
        if idx < self.start {
            return Some(false);
        }
        Some((idx - self.start) % self.step == 0)
    }
}

impl Default for Range {
    fn default() -> Self {
        Self {
            start: 0,
            end: None,
            step: NonZeroUsize::MIN,
        }
    }
}
