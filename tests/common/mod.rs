#![allow(dead_code)]

pub mod fixtures {
    pub const WATER: &str = "tests/fixtures/water.mol";
    pub const PADDED: &str = "tests/fixtures/padded.mol";
    pub const BROKEN: &str = "tests/fixtures/broken.mol";
    pub const TRUNCATED: &str = "tests/fixtures/truncated.mol";
    pub const MISSING: &str = "tests/fixtures/does_not_exist.mol";
}
