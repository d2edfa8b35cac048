use portal_kit_generator::BuildContext;
use portal_kit_validator::validate_site;
use std::path::PathBuf;

use super::{current_year, descriptor_path};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating portal at: {}", path.display());

    let report = validate_site(&descriptor_path(&path), &BuildContext::new(current_year()));

    for line in &report.info {
        println!("  {}", line);
    }
    for warning in &report.warnings {
        println!("⚠ {}", warning);
    }
    for error in &report.errors {
        eprintln!("✗ {}", error);
    }

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }

    println!(
        "\n✓ site.toml valid ({} warning(s))",
        report.warnings.len()
    );
    Ok(())
}
