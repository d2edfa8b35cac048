// Site validation: descriptor, content and links, without writing output

pub mod content;

use portal_kit_core::{ContentLoader, parse_site_toml};
use portal_kit_generator::{BuildContext, assemble};
use std::path::Path;

pub use content::FsContentLoader;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run the whole pipeline against `descriptor_path` and collect the outcome.
///
/// Failures never panic or bubble up; they land in `errors`, one line per
/// failed stage (the pipeline stops at the first one).
pub fn validate_site(descriptor_path: &Path, ctx: &BuildContext) -> ValidationReport {
    validate_with(descriptor_path, ctx, &FsContentLoader)
}

pub fn validate_with(
    descriptor_path: &Path,
    ctx: &BuildContext,
    loader: &dyn ContentLoader,
) -> ValidationReport {
    let mut report = ValidationReport::default();

    let descriptor = match parse_site_toml(descriptor_path) {
        Ok(d) => d,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };
    report.info.push(format!(
        "Site: {} ({}{})",
        descriptor.metadata.title, descriptor.url.origin().ascii_serialization(), descriptor.base_url
    ));

    let root = content::content_root(descriptor_path, &descriptor.docs.path);
    let documents = match loader.load(&root) {
        Ok(docs) => docs,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };
    report.info.push(format!("Documents: {}", documents.len()));

    match assemble(&descriptor, &documents, ctx) {
        Ok(assembly) => {
            report.info.push(format!("Routes: {}", assembly.manifest.len()));
            report
                .warnings
                .extend(assembly.warnings.iter().map(ToString::to_string));
        }
        Err(e) => report.errors.push(e.to_string()),
    }

    report
}
