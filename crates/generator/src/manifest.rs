//! Resolved-route manifest handed to the rendering pipeline.

use portal_kit_core::routes::join_route;
use portal_kit_core::{DocsPreset, DocumentDescriptor, Error, PathResolver, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::links::KnownRoutes;

/// Content id of the blog index when the blog is enabled
pub const BLOG_ID: &str = "blog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub route: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<String>,
}

/// Logical content id → absolute route, ordered by id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RouteManifest {
    entries: BTreeMap<String, ManifestEntry>,
}

impl RouteManifest {
    /// Resolve every document route; two documents claiming the same route
    /// is a schema error on the later one
    pub fn build(
        documents: &[DocumentDescriptor],
        docs: &DocsPreset,
        resolver: &PathResolver,
    ) -> Result<Self> {
        let mut manifest = RouteManifest::default();
        let mut claimed: BTreeMap<String, &str> = BTreeMap::new();

        for doc in documents {
            let route = resolver.route(&join_route(&[&docs.route_base_path, &doc.route_path()]))?;
            if let Some(owner) = claimed.insert(route.clone(), &doc.id) {
                return Err(Error::schema(
                    doc.id.clone(),
                    format!("route {} is already used by '{}'", route, owner),
                ));
            }
            if manifest.entries.contains_key(&doc.id) {
                return Err(Error::schema(doc.id.clone(), "duplicate document id"));
            }
            manifest.entries.insert(
                doc.id.clone(),
                ManifestEntry {
                    route,
                    title: Some(doc.title.clone()),
                    source_path: Some(doc.source_path.clone()),
                    edit_url: docs.edit_url_for(&doc.source_path),
                },
            );
        }

        if docs.blog {
            let route = resolver.route(BLOG_ID)?;
            if let Some(owner) = claimed.get(&route) {
                return Err(Error::schema(
                    "preset.blog",
                    format!("route {} is already used by '{}'", route, owner),
                ));
            }
            manifest.entries.insert(
                BLOG_ID.to_string(),
                ManifestEntry {
                    route,
                    title: None,
                    source_path: None,
                    edit_url: None,
                },
            );
        }

        Ok(manifest)
    }

    pub fn get(&self, id: &str) -> Option<&ManifestEntry> {
        self.entries.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(|e| e.route.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ManifestEntry)> {
        self.entries.iter().map(|(id, e)| (id.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn known_routes(&self) -> KnownRoutes {
        let mut known = KnownRoutes::default();
        for entry in self.entries.values() {
            known.insert(entry.route.clone());
        }
        known
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
