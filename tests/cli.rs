use std::path::Path;
use std::process::Command;

mod common;
use common::fixtures;

fn wiggle(input: &str, output: &Path, extra: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_wiggle"))
        .args(["-i", input, "-o"])
        .arg(output)
        .args(["-f", "5"])
        .args(extra)
        .env("RUST_LOG", "info")
        .output()
        .expect("could not run wiggle")
}

#[test]
fn all_modes() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("water");
    let output = wiggle(fixtures::WATER, &base, &[]);
    assert!(output.status.success(), "{output:?}");

    for mode in 0..3 {
        let path = dir.path().join(format!("water{mode}.xyz"));
        let contents = std::fs::read_to_string(&path)?;
        assert_eq!(contents.lines().count(), 10 * 5);
        assert_eq!(contents.lines().nth(1), Some(format!("Vibration {}", mode + 1).as_str()));
    }
    assert!(!dir.path().join("water3.xyz").exists());
    Ok(())
}

#[test]
fn selected_modes() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("water");
    let output = wiggle(fixtures::WATER, &base, &["--modes", "0,2"]);
    assert!(output.status.success(), "{output:?}");

    assert!(dir.path().join("water0.xyz").exists());
    assert!(!dir.path().join("water1.xyz").exists());
    assert!(dir.path().join("water2.xyz").exists());
    Ok(())
}

#[test]
fn missing_modes_are_reported() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("water");
    let output = wiggle(fixtures::WATER, &base, &["--modes", "1,7"]);
    assert!(!output.status.success(), "{output:?}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("mode 7"), "{stderr}");
    assert!(stderr.contains("out of range"), "{stderr}");
    // The mode that does exist is still written.
    assert!(dir.path().join("water1.xyz").exists());
    assert!(!dir.path().join("water7.xyz").exists());
    Ok(())
}

#[test]
fn failing_mode_is_isolated() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    // A directory in the way of the second mode's output file.
    std::fs::create_dir(dir.path().join("water1.xyz"))?;
    let base = dir.path().join("water");
    let output = wiggle(fixtures::WATER, &base, &[]);
    assert!(!output.status.success(), "{output:?}");

    assert!(dir.path().join("water0.xyz").is_file());
    assert!(dir.path().join("water1.xyz").is_dir());
    assert!(dir.path().join("water2.xyz").is_file());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 modes could not be written"), "{stderr}");
    Ok(())
}

#[test]
fn title_is_logged() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("water");
    let output = wiggle(fixtures::WATER, &base, &["--title", "WaterModes"]);
    assert!(output.status.success(), "{output:?}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("read 'WaterModes' with 3 animatable modes"), "{stderr}");
    Ok(())
}

#[test]
fn failures() -> std::io::Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("out");
    for (input, extra) in [
        (fixtures::BROKEN, &[][..]),
        (fixtures::TRUNCATED, &[][..]),
        (fixtures::MISSING, &[][..]),
        (fixtures::WATER, &["--natoms", "4"][..]),
    ] {
        let output = wiggle(input, &base, extra);
        assert!(!output.status.success(), "{input} should fail: {output:?}");
    }
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn unwritable_output() {
    let output = wiggle(
        fixtures::WATER,
        Path::new("/nonexistent/directory/water"),
        &[],
    );
    assert!(!output.status.success());
}
