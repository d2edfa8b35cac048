use anyhow::{Context, Result};
use portal_kit_core::{ContentLoader, parse_site_toml};
use portal_kit_generator::{BuildContext, assemble};
use portal_kit_validator::{FsContentLoader, content::content_root};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use super::{current_year, descriptor_path};

/// Resolve the site model and write it, with the route manifest, to `output`
pub fn run(path: PathBuf, output: PathBuf, locale: Option<String>) -> Result<()> {
    println!("🔨 Resolving site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    if !path.exists() {
        anyhow::bail!("Portal directory does not exist: {}", path.display());
    }

    let site_toml_path = descriptor_path(&path);
    if !site_toml_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'portal-kit init {}' first",
            path.display(),
            path.display()
        );
    }

    let descriptor = parse_site_toml(&site_toml_path).context("Failed to parse site.toml")?;
    println!("✓ Loaded: {}", descriptor.metadata.title);

    let root = content_root(&site_toml_path, &descriptor.docs.path);
    debug!(root = %root.display(), "loading content");
    let documents = FsContentLoader
        .load(&root)
        .with_context(|| format!("Failed to load content from {}", root.display()))?;
    println!("  Documents: {}", documents.len());

    let mut ctx = BuildContext::new(current_year());
    if let Some(locale) = locale {
        ctx = ctx.with_locale(locale);
    }
    let assembly = assemble(&descriptor, &documents, &ctx)?;

    let navbar = &assembly.model.navbar.items;
    println!(
        "  Navbar: {} item(s), {} internal",
        navbar.len(),
        navbar.iter().filter(|i| i.is_internal()).count()
    );
    println!("  Footer groups: {}", assembly.model.footer.groups.len());
    println!();

    fs::create_dir_all(&output).context("Failed to create output directory")?;
    debug!(output = %output.display(), "writing build outputs");

    let model_json =
        serde_json::to_string_pretty(&assembly.model).context("Failed to serialize site model")?;
    fs::write(output.join("site-model.json"), model_json)
        .context("Failed to write site-model.json")?;
    println!("   ✓ Wrote site-model.json");

    let routes_json = assembly
        .manifest
        .to_json()
        .context("Failed to serialize route manifest")?;
    fs::write(output.join("routes.json"), routes_json).context("Failed to write routes.json")?;
    println!("   ✓ Wrote routes.json ({} routes)", assembly.manifest.len());

    for warning in &assembly.warnings {
        println!("   ⚠ {}", warning);
    }

    println!();
    println!(
        "✅ Build complete! (locale {}, {} warning(s))",
        assembly.model.locale,
        assembly.warning_count()
    );

    Ok(())
}
