pub mod build;
pub mod init;
pub mod validate;

use chrono::Datelike;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "site.toml";

pub fn descriptor_path(dir: &Path) -> PathBuf {
    dir.join(DESCRIPTOR_FILE)
}

/// Copyright year for this build
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}
