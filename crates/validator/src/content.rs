//! Filesystem content loader.
//!
//! Walks the docs content root and turns every markdown file into a
//! [`DocumentDescriptor`]. Titles come from front matter, then the first
//! level-1 heading, then the file stem (`Getting_Started.md` → "Getting Started").

use portal_kit_core::{ContentLoader, DocumentDescriptor, Error, Result};
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "mdx"];

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    id: Option<String>,
    title: Option<String>,
    slug: Option<String>,
}

/// Loads documents from a directory on disk
#[derive(Debug, Default, Clone, Copy)]
pub struct FsContentLoader;

impl ContentLoader for FsContentLoader {
    fn load(&self, root: &Path) -> Result<Vec<DocumentDescriptor>> {
        if !root.is_dir() {
            return Err(Error::Io {
                path: root.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "content root is not a directory",
                ),
            });
        }

        let mut documents = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|e| Error::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.to_path_buf()),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() || !is_markdown(path) {
                continue;
            }

            let content = fs::read_to_string(path).map_err(|source| Error::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
            documents.push(parse_document(&relative, &content)?);
        }

        debug!(root = %root.display(), count = documents.len(), "content loaded");
        Ok(documents)
    }
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| MARKDOWN_EXTENSIONS.contains(&e))
}

/// Build a descriptor from one file's contents; `relative` is its path
/// below the content root
pub fn parse_document(relative: &Path, content: &str) -> Result<DocumentDescriptor> {
    let (front, body) = split_front_matter(content);
    let front: FrontMatter = match front {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml).map_err(|e| {
            Error::schema(
                relative.display().to_string(),
                format!("invalid front matter: {}", e),
            )
        })?,
        _ => FrontMatter::default(),
    };

    let id = document_id(relative, front.id.as_deref());
    let (heading, links) = scan_body(body);
    let title = front
        .title
        .or(heading)
        .unwrap_or_else(|| stem_title(relative));

    Ok(DocumentDescriptor {
        id,
        source_path: relative.to_path_buf(),
        title,
        slug: front.slug,
        links,
    })
}

/// Split `---\n...\n---\n` front matter from the body
fn split_front_matter(content: &str) -> (Option<&str>, &str) {
    let Some(rest) = content
        .strip_prefix("---\n")
        .or_else(|| content.strip_prefix("---\r\n"))
    else {
        return (None, content);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, content)
}

/// Path without extension, `/`-separated; a front matter `id` replaces the
/// file stem
fn document_id(relative: &Path, front_id: Option<&str>) -> String {
    let mut parts: Vec<String> = relative
        .with_extension("")
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if let (Some(id), Some(last)) = (front_id, parts.last_mut()) {
        *last = id.to_string();
    }
    parts.join("/")
}

fn stem_title(relative: &Path) -> String {
    let stem = relative
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled");
    stem.replace('_', " ")
}

/// First H1 text plus every site-relative link destination
fn scan_body(body: &str) -> (Option<String>, Vec<String>) {
    let mut heading: Option<String> = None;
    let mut in_h1 = false;
    let mut h1_text = String::new();
    let mut links = Vec::new();

    for event in Parser::new(body) {
        match event {
            Event::Start(Tag::Heading {
                level: HeadingLevel::H1,
                ..
            }) if heading.is_none() => {
                in_h1 = true;
            }
            Event::End(TagEnd::Heading(HeadingLevel::H1)) if in_h1 => {
                in_h1 = false;
                heading = Some(h1_text.trim().to_string());
            }
            Event::Text(text) | Event::Code(text) if in_h1 => h1_text.push_str(&text),
            Event::Start(Tag::Link { dest_url, .. }) if is_site_link(&dest_url) => {
                links.push(dest_url.to_string());
            }
            _ => {}
        }
    }

    (heading.filter(|h| !h.is_empty()), links)
}

/// Links that point into the site: no scheme, not a bare fragment
fn is_site_link(dest: &str) -> bool {
    !dest.is_empty() && !dest.starts_with('#') && !has_scheme(dest)
}

fn has_scheme(dest: &str) -> bool {
    match dest.split_once(':') {
        Some((scheme, _)) => {
            !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}

/// Content root for a descriptor living at `descriptor_path`
pub fn content_root(descriptor_path: &Path, docs_path: &Path) -> PathBuf {
    descriptor_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(docs_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_title_from_front_matter() {
        let doc = parse_document(
            Path::new("cmd/terramaid_run.md"),
            "---\nhide:\n  - toc\ntitle: \"terramaid run\"\n---\n# Ignored\n",
        )
        .unwrap();
        assert_eq!(doc.id, "cmd/terramaid_run");
        assert_eq!(doc.title, "terramaid run");
    }

    #[test]
    fn test_title_from_heading_then_stem() {
        let doc = parse_document(Path::new("intro.md"), "Some text\n\n# Welcome to `terramaid`\n").unwrap();
        assert_eq!(doc.title, "Welcome to terramaid");

        let doc = parse_document(Path::new("Getting_Started.md"), "No heading here.\n").unwrap();
        assert_eq!(doc.title, "Getting Started");
    }

    #[test]
    fn test_front_matter_id_and_slug() {
        let doc = parse_document(
            Path::new("guides/old-name.md"),
            "---\nid: new-name\nslug: /start\n---\nbody\n",
        )
        .unwrap();
        assert_eq!(doc.id, "guides/new-name");
        assert_eq!(doc.slug.as_deref(), Some("/start"));
        assert_eq!(doc.route_path(), "start");
    }

    #[test]
    fn test_invalid_front_matter_is_schema_error() {
        let result = parse_document(Path::new("bad.md"), "---\ntitle: [unclosed\n---\n");
        match result {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "bad.md"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_collects_site_links_only() {
        let body = "[a](./GitHub_Actions_Integration.md) [b](https://github.com) \
                    [c](#usage) [d](mailto:x@y.dev) [e](/docs/cmd/run)";
        let doc = parse_document(Path::new("x.md"), body).unwrap();
        assert_eq!(
            doc.links,
            vec![
                "./GitHub_Actions_Integration.md".to_string(),
                "/docs/cmd/run".to_string()
            ]
        );
    }

    #[test]
    fn test_unterminated_front_matter_is_body() {
        let (front, body) = split_front_matter("---\ntitle: x\n");
        assert!(front.is_none());
        assert_eq!(body, "---\ntitle: x\n");
    }

    #[test]
    fn test_loader_walks_sorted_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("cmd")).unwrap();
        fs::write(root.join("b.md"), "# B\n").unwrap();
        fs::write(root.join("a.mdx"), "# A\n").unwrap();
        fs::write(root.join("cmd/run.md"), "# Run\n").unwrap();
        fs::write(root.join("notes.txt"), "skip").unwrap();

        let docs = FsContentLoader.load(root).unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "cmd/run"]);
        assert_eq!(docs[2].source_path, PathBuf::from("cmd/run.md"));
    }

    #[test]
    fn test_loader_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = FsContentLoader.load(&dir.path().join("missing"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_content_root_relative_to_descriptor() {
        assert_eq!(
            content_root(Path::new("website/site.toml"), Path::new("../docs")),
            PathBuf::from("website/../docs")
        );
    }
}
