//! Broken-link detection and policy handling.

use portal_kit_core::routes::{join_route, normalize_relative, split_suffix};
use portal_kit_core::{
    DocumentDescriptor, Error, LinkClass, LinkPolicies, LinkPolicy, PathResolver, Result,
};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tracing::{debug, warn};

/// A broken link that was let through under the `warn` policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkWarning {
    pub class: LinkClass,
    /// Where the link was declared (nav field path or document id)
    pub source_id: String,
    pub target: String,
}

impl fmt::Display for LinkWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Broken {} link in '{}': '{}'",
            self.class, self.source_id, self.target
        )
    }
}

/// Absolute routes that exist in the build
#[derive(Debug, Clone, Default)]
pub struct KnownRoutes(BTreeSet<String>);

impl KnownRoutes {
    pub fn insert(&mut self, route: String) -> bool {
        self.0.insert(route)
    }

    /// Query strings and fragments are ignored
    pub fn contains(&self, route: &str) -> bool {
        self.0.contains(split_suffix(route).0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Applies the per-class broken-link policy and keeps the warnings
#[derive(Debug)]
pub struct LinkChecker {
    policies: LinkPolicies,
    warnings: Vec<LinkWarning>,
}

impl LinkChecker {
    pub fn new(policies: LinkPolicies) -> Self {
        Self {
            policies,
            warnings: Vec::new(),
        }
    }

    /// Record a broken link; fails only under `throw`
    pub fn broken(&mut self, class: LinkClass, source_id: &str, target: &str) -> Result<()> {
        match self.policies.for_class(class) {
            LinkPolicy::Throw => Err(Error::BrokenLink {
                class,
                source_id: source_id.to_string(),
                target: target.to_string(),
            }),
            LinkPolicy::Warn => {
                warn!(%class, source = source_id, link = target, "broken link");
                self.warnings.push(LinkWarning {
                    class,
                    source_id: source_id.to_string(),
                    target: target.to_string(),
                });
                Ok(())
            }
            LinkPolicy::Ignore => {
                debug!(%class, source = source_id, link = target, "broken link ignored");
                Ok(())
            }
        }
    }

    pub fn warnings(&self) -> &[LinkWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<LinkWarning> {
        self.warnings
    }
}

/// Check the links found inside one document.
///
/// `.md`/`.mdx` targets are resolved against the document's source
/// directory and must name another document's source file (markdown
/// class). Extensionless targets are site routes (internal class):
/// absolute ones resolve from the base path, relative ones from the
/// document's own route. Anything else is an asset and is left to the
/// asset pipeline.
pub fn check_document_links(
    doc: &DocumentDescriptor,
    sources: &HashSet<String>,
    resolver: &PathResolver,
    docs_route_base: &str,
    known: &KnownRoutes,
    checker: &mut LinkChecker,
) -> Result<()> {
    let stem = doc.source_stem();
    let doc_dir = stem.rsplit_once('/').map_or("", |(dir, _)| dir);

    for link in &doc.links {
        let (path, _) = split_suffix(link);
        if path.is_empty() {
            continue;
        }

        match link_extension(path) {
            Some("md" | "mdx") => {
                let target = normalize_relative(&join_route(&[doc_dir, path]))
                    .map(|p| strip_extension(&p).to_string());
                let found = target.is_some_and(|t| sources.contains(&t));
                if !found {
                    checker.broken(LinkClass::Markdown, &doc.id, link)?;
                }
            }
            Some(_) => {}
            None => {
                let relative = if path.starts_with('/') {
                    path.to_string()
                } else {
                    let route = doc.route_path();
                    let parent = route.rsplit_once('/').map_or("", |(dir, _)| dir);
                    join_route(&[docs_route_base, parent, path])
                };
                let found = resolver
                    .route(&relative)
                    .is_ok_and(|route| known.contains(&route));
                if !found {
                    checker.broken(LinkClass::Internal, &doc.id, link)?;
                }
            }
        }
    }
    Ok(())
}

/// Extensionless source paths of every loaded document
pub fn document_sources(documents: &[DocumentDescriptor]) -> HashSet<String> {
    documents.iter().map(DocumentDescriptor::source_stem).collect()
}

fn link_extension(path: &str) -> Option<&str> {
    let last = path.rsplit('/').next()?;
    let (stem, ext) = last.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

fn strip_extension(path: &str) -> &str {
    path.rsplit_once('.').map_or(path, |(stem, _)| stem)
}
