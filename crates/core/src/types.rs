use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::error::Result;

/// Validated site descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub metadata: SiteMetadata,
    pub url: Url,
    /// Normalized base path, always `/`-delimited on both ends
    pub base_url: String,
    pub policies: LinkPolicies,
    pub docs: DocsPreset,
    pub navbar: NavbarConfig,
    pub footer: FooterConfig,
    pub prism: ThemeIds,
}

/// Site-level metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favicon: Option<String>,
    /// Social card image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub organization_name: String,
    pub project_name: String,
    pub default_locale: String,
    pub locales: Vec<String>,
}

impl SiteMetadata {
    pub fn supports_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }
}

/// What to do when a link cannot be resolved to a known route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkPolicy {
    Throw,
    Warn,
    Ignore,
}

/// Link classes that carry their own broken-link policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkClass {
    /// Navbar, footer and other site links
    Internal,
    /// Links between markdown documents
    Markdown,
}

impl fmt::Display for LinkClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkClass::Internal => write!(f, "internal"),
            LinkClass::Markdown => write!(f, "markdown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkPolicies {
    pub on_broken_links: LinkPolicy,
    pub on_broken_markdown_links: LinkPolicy,
}

impl LinkPolicies {
    pub fn for_class(&self, class: LinkClass) -> LinkPolicy {
        match class {
            LinkClass::Internal => self.on_broken_links,
            LinkClass::Markdown => self.on_broken_markdown_links,
        }
    }
}

impl Default for LinkPolicies {
    fn default() -> Self {
        Self {
            on_broken_links: LinkPolicy::Throw,
            on_broken_markdown_links: LinkPolicy::Warn,
        }
    }
}

/// Classic preset: docs plugin options plus the blog switch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocsPreset {
    /// Content root, relative to the descriptor's directory
    pub path: PathBuf,
    /// Route prefix below the base path, without surrounding slashes
    pub route_base_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_url: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_css: Option<PathBuf>,
    pub blog: bool,
}

impl DocsPreset {
    /// Edit link for a document source path relative to the content root
    pub fn edit_url_for(&self, source: &Path) -> Option<String> {
        let base = self.edit_url.as_ref()?;
        let relative = source
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        Some(format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            relative
        ))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavPosition {
    #[default]
    Left,
    Right,
}

/// Link target as declared, before classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavLink {
    To(String),
    Href(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavEntry {
    pub label: String,
    pub position: NavPosition,
    pub link: NavLink,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Logo {
    pub alt: String,
    pub src: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NavbarConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    pub items: Vec<NavEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FooterStyle {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterGroupConfig {
    pub title: String,
    pub items: Vec<NavEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FooterConfig {
    pub style: FooterStyle,
    pub links: Vec<FooterGroupConfig>,
    /// May contain a `{year}` placeholder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Highlight theme identifiers as written in the descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeIds {
    pub theme: String,
    pub dark_theme: String,
}

impl Default for ThemeIds {
    fn default() -> Self {
        Self {
            theme: "github".to_string(),
            dark_theme: "dracula".to_string(),
        }
    }
}

/// One content document as seen by the content loader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDescriptor {
    /// Content-relative path without extension, `/`-separated
    pub id: String,
    /// Source path relative to the content root
    pub source_path: PathBuf,
    pub title: String,
    /// Route override from front matter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    /// Relative link destinations found in the document body
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub links: Vec<String>,
}

impl DocumentDescriptor {
    /// Route path of this document below the docs route base, without
    /// leading slash
    pub fn route_path(&self) -> String {
        if let Some(slug) = &self.slug {
            return slug.trim_matches('/').to_string();
        }
        match self.id.rsplit_once('/') {
            Some((dir, "index" | "README")) => dir.to_string(),
            None if self.id == "index" || self.id == "README" => String::new(),
            _ => self.id.clone(),
        }
    }

    /// Source path without extension, `/`-separated; what markdown links
    /// point at, even when front matter renames the id
    pub fn source_stem(&self) -> String {
        self.source_path
            .with_extension("")
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => part.to_str(),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Produces document descriptors for a content root
pub trait ContentLoader {
    fn load(&self, root: &Path) -> Result<Vec<DocumentDescriptor>>;
}
