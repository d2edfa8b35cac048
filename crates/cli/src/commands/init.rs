use anyhow::{Context, Result};
use portal_kit_core::parse_site_toml_str;
use std::fs;
use std::path::{Path, PathBuf};

use super::{DESCRIPTOR_FILE, descriptor_path};

const INTRO_DOC: &str = "---\ntitle: Introduction\nslug: /\n---\n\n# Introduction\n\nStart writing your documentation here.\n";

/// Escape a string for safe inclusion in a TOML basic string
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Project name derived from the directory name
fn project_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("my-portal")
        .to_string()
}

/// Initialize a new portal directory with a starter site.toml and one doc.
///
/// # Errors
///
/// Returns an error if:
/// - site.toml already exists in the directory
/// - File operations fail (permissions, disk space, etc.)
pub fn run(path: PathBuf) -> Result<()> {
    println!("Initializing portal directory: {}", path.display());

    let site_toml_path = descriptor_path(&path);
    if site_toml_path.exists() {
        anyhow::bail!(
            "{} already exists at {}\nHint: Delete it first or use a different directory",
            DESCRIPTOR_FILE,
            site_toml_path.display()
        );
    }

    fs::create_dir_all(path.join("docs")).context("Failed to create docs directory")?;

    let toml = generate_site_toml(&project_name(&path));
    // The template must always load; catch regressions before writing it
    parse_site_toml_str(&toml).context("Generated site.toml is invalid")?;
    fs::write(&site_toml_path, toml).context("Failed to write site.toml")?;

    let intro = path.join("docs").join("intro.md");
    if !intro.exists() {
        fs::write(&intro, INTRO_DOC).context("Failed to write docs/intro.md")?;
    }

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml            ← Edit this to set title, url, navbar");
    println!("  └── docs/");
    println!("      └── intro.md");

    println!("\nNext steps:");
    println!("  1. Edit site.toml (set url, organizationName, footer links)");
    println!("  2. Add documents under docs/");
    println!("  3. Validate: portal-kit validate {}", path.display());

    Ok(())
}

fn generate_site_toml(project: &str) -> String {
    let project = toml_escape_string(project);
    format!(
        "# Generated by portal-kit init\n\
# Edit this file to customize your portal\n\
\n\
title = \"{project}\"\n\
tagline = \"Documentation for {project}\"  # TODO: Set tagline\n\
favicon = \"img/favicon.ico\"\n\
url = \"https://example.com\"  # TODO: Set site URL\n\
baseUrl = \"/\"\n\
organizationName = \"my-org\"  # TODO: Set organization\n\
projectName = \"{project}\"\n\
onBrokenLinks = \"throw\"\n\
onBrokenMarkdownLinks = \"warn\"\n\
\n\
[i18n]\n\
defaultLocale = \"en\"\n\
locales = [\"en\"]\n\
\n\
[preset]\n\
blog = false\n\
\n\
[preset.docs]\n\
path = \"docs\"\n\
routeBasePath = \"/\"\n\
\n\
[themeConfig.navbar]\n\
title = \"{project}\"\n\
\n\
[[themeConfig.navbar.items]]\n\
to = \"/\"\n\
label = \"Docs\"\n\
position = \"left\"\n\
\n\
[themeConfig.footer]\n\
style = \"dark\"\n\
copyright = \"Copyright © {{year}} {project}\"\n\
\n\
[themeConfig.prism]\n\
theme = \"github\"\n\
darkTheme = \"dracula\"\n"
    )
}
