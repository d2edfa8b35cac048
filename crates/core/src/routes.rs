//! Route resolution against the site's base URL and base path.
//!
//! Every internal target (navbar `to`, footer `to`, document routes) goes
//! through [`PathResolver::route`], which is the only place that joins the
//! origin, base path and content-relative path together:
//!
//! ```text
//! https://terramaid.dev  +  /  +  docs//Getting_Started/  →  https://terramaid.dev/docs/Getting_Started
//! ```

use serde::Serialize;
use std::path::PathBuf;
use url::Url;

use crate::error::{Error, Result};
use crate::types::Descriptor;

/// Resolved routing settings carried into the site model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteConfig {
    /// Origin of the site, no trailing slash
    pub base_url: String,
    pub base_path: String,
    pub content_root: PathBuf,
    pub docs_route_base: String,
}

/// Builds canonical absolute URLs for site-relative paths
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResolver {
    origin: String,
    base_path: String,
}

impl PathResolver {
    pub fn new(base_url: &Url, base_path: &str) -> Result<Self> {
        Ok(Self {
            origin: base_url.origin().ascii_serialization(),
            base_path: normalize_base_path(base_path)?,
        })
    }

    pub fn for_descriptor(descriptor: &Descriptor) -> Result<Self> {
        Self::new(&descriptor.url, &descriptor.base_url)
    }

    /// Resolver for a non-default locale build, which lives under
    /// `<base path><locale>/`
    pub fn with_locale(&self, locale: &str) -> Self {
        Self {
            origin: self.origin.clone(),
            base_path: format!("{}{}/", self.base_path, locale),
        }
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn root(&self) -> String {
        format!("{}{}", self.origin, self.base_path)
    }

    pub fn route_config(&self, descriptor: &Descriptor) -> RouteConfig {
        RouteConfig {
            base_url: self.origin.clone(),
            base_path: self.base_path.clone(),
            content_root: descriptor.docs.path.clone(),
            docs_route_base: descriptor.docs.route_base_path.clone(),
        }
    }

    /// Absolute URL for a site-relative path.
    ///
    /// Accepts `docs/start`, `/docs/start`, paths already carrying the base
    /// path, and absolute URLs on this site's origin; all of them map to the
    /// same canonical form, so resolving a resolved route is a no-op.
    pub fn route(&self, relative: &str) -> Result<String> {
        Ok(format!("{}{}", self.origin, self.route_path(relative)?))
    }

    /// Like [`route`](Self::route) but without the origin
    pub fn route_path(&self, relative: &str) -> Result<String> {
        let (path, suffix) = split_suffix(relative);

        let path = match path.strip_prefix(self.origin.as_str()) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => {
                self.strip_base_path(rest).ok_or_else(|| Error::PathEscape {
                    path: relative.to_string(),
                })?
            }
            _ if path.contains("://") => {
                return Err(Error::PathEscape {
                    path: relative.to_string(),
                });
            }
            _ => self.strip_base_path(path).unwrap_or(path),
        };

        let segments = normalize_segments(path).ok_or_else(|| Error::PathEscape {
            path: relative.to_string(),
        })?;

        Ok(format!("{}{}{}", self.base_path, segments.join("/"), suffix))
    }

    /// Remainder of `path` after the base path, if `path` sits under it
    fn strip_base_path<'a>(&self, path: &'a str) -> Option<&'a str> {
        if self.base_path == "/" {
            return Some(path);
        }
        let bare = self.base_path.trim_end_matches('/');
        if path == bare {
            return Some("");
        }
        path.strip_prefix(self.base_path.as_str())
    }
}

/// Normalize a base path to `/`, or `/a/b/` with exactly one slash on
/// each end
pub fn normalize_base_path(raw: &str) -> Result<String> {
    let segments = normalize_segments(raw).ok_or_else(|| Error::PathEscape {
        path: raw.to_string(),
    })?;
    if segments.is_empty() {
        Ok("/".to_string())
    } else {
        Ok(format!("/{}/", segments.join("/")))
    }
}

/// Normalize a route prefix to its bare segments (`/docs/` → `docs`, `/` → ``)
pub fn normalize_route_base(raw: &str) -> Result<String> {
    normalize_segments(raw)
        .map(|segments| segments.join("/"))
        .ok_or_else(|| Error::PathEscape {
            path: raw.to_string(),
        })
}

/// Collapse a relative path to canonical `/`-joined segments; `None` when
/// `..` climbs above its root
pub fn normalize_relative(path: &str) -> Option<String> {
    normalize_segments(path).map(|segments| segments.join("/"))
}

/// Join path pieces with single slashes, ignoring empty pieces
pub fn join_route(parts: &[&str]) -> String {
    parts
        .iter()
        .flat_map(|p| p.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Collapse empty and `.` segments and apply `..`; `None` when `..` climbs
/// above the root
fn normalize_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            s => segments.push(s),
        }
    }
    Some(segments)
}

/// Split `path?query#fragment` into the path and the untouched suffix
pub fn split_suffix(input: &str) -> (&str, &str) {
    match input.find(['?', '#']) {
        Some(idx) => input.split_at(idx),
        None => (input, ""),
    }
}
