//! Write an xyz animation for every normal mode in a MOLDEN vibrations file.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use wiggle::{
    discover_dimensions, write, ModeAnimator, ModeFileParser, ModeSelection, MolecularFrame,
    DEFAULT_SCALE,
};

/// Animate the normal modes of a vibrations file as multi-frame xyz trajectories.
///
/// One file, named `<OUTPUT><index>.xyz`, is written for every selected mode.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Input path (MOLDEN vibrations file).
    #[arg(short, long)]
    input: PathBuf,

    /// Base name of the output files.
    #[arg(short, long)]
    output: String,

    /// Number of frames on either side of the equilibrium geometry.
    ///
    /// Each trajectory holds twice this many frames.
    #[arg(short = 'f', long, value_parser = clap::value_parser!(u32).range(1..))]
    nframes: u32,

    /// The number of atoms the input is expected to describe.
    ///
    /// By default, this is discovered from the input itself.
    #[arg(short, long)]
    natoms: Option<usize>,

    /// Mode selection, either as a list of indices like `0,3,4` or in the format
    /// `start:stop:step`, where each of these values is optional.
    ///
    /// - `:10` will select the first 10 modes.
    ///
    /// - `2:8:3` will select the modes at indices 2 and 5.
    #[arg(short, long)]
    modes: Option<ModeSelection>,

    /// Factor applied to every coordinate on output.
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f64,

    /// Increment of the displacement coefficient between consecutive frames.
    #[arg(long, default_value_t = ModeAnimator::STEP)]
    step: f64,

    /// Title of the parsed record, as reported in the log.
    #[arg(long, default_value = MolecularFrame::DEFAULT_TITLE)]
    title: String,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let frame = match read_frame(&args.input, args.natoms, &args.title) {
        Ok(frame) => frame,
        Err(err) => {
            error!("{err}");
            return ExitCode::FAILURE;
        }
    };

    let selection = args.modes.clone().unwrap_or_default();
    let failures = animate_modes(&frame, &selection, &args);
    if failures > 0 {
        error!("{failures} modes could not be written");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn read_frame(input: &Path, natoms: Option<usize>, title: &str) -> wiggle::Result<MolecularFrame> {
    let dimensions = discover_dimensions(input)?;
    info!(
        "{}: {} atoms, {} frequencies",
        input.display(),
        dimensions.natoms,
        dimensions.nfreqs
    );

    let natoms = natoms.unwrap_or(dimensions.natoms);
    let frame = ModeFileParser::open(input)?
        .with_title(title)
        .expect_atoms(natoms)
        .parse()?;
    info!(
        "{}: read '{}' with {} animatable modes",
        input.display(),
        frame.title(),
        frame.nmodes()
    );
    Ok(frame)
}

/// Animate and write every selected mode, returning the number of modes that failed.
///
/// A failing mode is reported and skipped, so that it does not hold back the others.
fn animate_modes(frame: &MolecularFrame, selection: &ModeSelection, args: &Args) -> usize {
    let animator = ModeAnimator::with_step(args.step);
    let half_width = args.nframes as usize;

    let nmodes = frame.nmodes();
    let mut failures = 0;
    // Requested modes that do not exist are handed to the animator as well, so they are reported.
    for mode in selection.indices(nmodes).chain(selection.out_of_range(nmodes)) {
        let path = PathBuf::from(format!("{}{mode}.xyz", args.output));
        let written = animator
            .animate(frame, mode, half_width)
            .and_then(|trajectory| write(&path, &trajectory, args.scale));
        match written {
            Ok(()) => info!("mode {mode}: wrote {}", path.display()),
            Err(err) => {
                error!("mode {mode}: {err}");
                failures += 1;
            }
        }
    }
    failures
}
