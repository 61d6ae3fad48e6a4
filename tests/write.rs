use glam::DVec3;
use wiggle::{AnimatedTrajectory, Error, TrajectoryWriter, DEFAULT_SCALE};

mod common;
use common::fixtures;

#[test]
fn idempotent() -> wiggle::Result<()> {
    let dir = tempfile::tempdir()?;
    let frame = wiggle::parse(fixtures::WATER, None)?;
    let trajectory = wiggle::animate(&frame, 1, 10)?;

    let first = dir.path().join("first.xyz");
    let second = dir.path().join("second.xyz");
    wiggle::write(&first, &trajectory, DEFAULT_SCALE)?;
    trajectory.save(&second, DEFAULT_SCALE)?;

    assert_eq!(std::fs::read(&first)?, std::fs::read(&second)?);
    Ok(())
}

#[test]
fn layout() -> wiggle::Result<()> {
    let dir = tempfile::tempdir()?;
    let frame = wiggle::parse(fixtures::WATER, None)?;
    let trajectory = wiggle::animate(&frame, 0, 3)?;
    let path = dir.path().join("water0.xyz");
    wiggle::write(&path, &trajectory, DEFAULT_SCALE)?;

    let contents = std::fs::read_to_string(&path)?;
    let lines: Vec<&str> = contents.lines().collect();
    let natoms = frame.natoms();
    assert_eq!(lines.len(), trajectory.nframes() * (natoms + 2));
    for record in lines.chunks(natoms + 2) {
        assert_eq!(record[0], "3");
        assert_eq!(record[1], "Vibration 1");
        let labels: Vec<&str> = record[2..]
            .iter()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        assert_eq!(labels, ["O", "H", "H"]);
    }

    // The fourth frame has a coefficient of zero, so it holds the scaled equilibrium geometry.
    assert_eq!(trajectory.coefficients[3], 0.0);
    let oxygen: Vec<f64> = lines[3 * (natoms + 2) + 2]
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse().unwrap())
        .collect();
    let expected = frame.equilibrium()[0] * DEFAULT_SCALE;
    assert!(DVec3::from_slice(&oxygen).abs_diff_eq(expected, 1e-11));
    Ok(())
}

#[test]
fn cycling_labels() -> wiggle::Result<()> {
    let labels = ["Ar".to_string()];
    let trajectory = AnimatedTrajectory {
        title: "argon".to_string(),
        frames: vec![vec![DVec3::ZERO, DVec3::X, DVec3::Y]; 2],
        coefficients: vec![-0.1, 0.0],
        atom_labels: &labels,
    };
    let mut writer = TrajectoryWriter::new(Vec::new()).with_scale(1.0);
    writer.write_trajectory(&trajectory)?;
    let written = String::from_utf8(writer.into_inner()).unwrap();
    assert_eq!(
        written,
        "3\nargon\nAr 0 0 0\nAr 1 0 0\nAr 0 1 0\n3\nargon\nAr 0 0 0\nAr 1 0 0\nAr 0 1 0\n"
    );
    Ok(())
}

#[test]
fn unwritable() -> wiggle::Result<()> {
    let dir = tempfile::tempdir()?;
    let frame = wiggle::parse(fixtures::WATER, None)?;
    let trajectory = wiggle::animate(&frame, 0, 1)?;
    let path = dir.path().join("no/such/directory/out.xyz");
    assert!(matches!(
        wiggle::write(&path, &trajectory, DEFAULT_SCALE),
        Err(Error::Write { .. })
    ));
    Ok(())
}
