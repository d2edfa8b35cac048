//! Site model assembly.
//!
//! Runs the resolver stages in order and produces the immutable
//! [`SiteModel`]:
//!
//! ```text
//! Descriptor (validated) → resolver + manifest → navbar/footer → themes → SiteModel
//! ```
//!
//! The first failure aborts the whole build and comes back wrapped in
//! [`Error::Assembly`]; no partial model is ever returned.

use portal_kit_core::{
    Descriptor, DocsPreset, DocumentDescriptor, Error, LinkPolicies, PathResolver, Result,
    RouteConfig, SiteMetadata, ThemeChoice, select_themes,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::links::{LinkChecker, LinkWarning, check_document_links, document_sources};
use crate::manifest::RouteManifest;
use crate::nav::{Footer, NavComposer, Navbar};

/// Inputs that would otherwise be ambient process state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    /// Substituted for `{year}` in the footer copyright
    pub year: i32,
    /// Locale being built; `None` means the default locale
    pub locale: Option<String>,
}

impl BuildContext {
    pub fn new(year: i32) -> Self {
        Self { year, locale: None }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteModel {
    pub metadata: SiteMetadata,
    pub locale: String,
    pub routes: RouteConfig,
    pub navbar: Navbar,
    pub footer: Footer,
    pub themes: ThemeChoice,
    pub policies: LinkPolicies,
    pub docs: DocsPreset,
}

/// Result of a successful build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assembly {
    pub model: SiteModel,
    pub manifest: RouteManifest,
    pub warnings: Vec<LinkWarning>,
}

impl Assembly {
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Build the site model for one locale
pub fn assemble(
    descriptor: &Descriptor,
    documents: &[DocumentDescriptor],
    ctx: &BuildContext,
) -> Result<Assembly> {
    build(descriptor, documents, ctx).map_err(Error::into_assembly)
}

fn build(
    descriptor: &Descriptor,
    documents: &[DocumentDescriptor],
    ctx: &BuildContext,
) -> Result<Assembly> {
    let metadata = &descriptor.metadata;
    let locale = ctx
        .locale
        .clone()
        .unwrap_or_else(|| metadata.default_locale.clone());
    if !metadata.supports_locale(&locale) {
        return Err(Error::locale(
            "locale",
            format!("'{}' is not listed in i18n.locales", locale),
        ));
    }

    let base = PathResolver::for_descriptor(descriptor)?;
    let resolver = if locale == metadata.default_locale {
        base
    } else {
        base.with_locale(&locale)
    };

    let manifest = RouteManifest::build(documents, &descriptor.docs, &resolver)?;
    debug!(locale = %locale, routes = manifest.len(), "routes resolved");

    let known = manifest.known_routes();
    let mut checker = LinkChecker::new(descriptor.policies);

    let (navbar, footer) = {
        let mut composer = NavComposer::new(&resolver, &known, &mut checker);
        let navbar = composer.compose_navbar(&descriptor.navbar)?;
        let copyright = descriptor
            .footer
            .copyright
            .as_ref()
            .map(|c| c.replace("{year}", &ctx.year.to_string()));
        let footer = composer.compose_footer(&descriptor.footer, copyright)?;
        (navbar, footer)
    };

    let sources = document_sources(documents);
    for doc in documents {
        check_document_links(
            doc,
            &sources,
            &resolver,
            &descriptor.docs.route_base_path,
            &known,
            &mut checker,
        )?;
    }
    debug!(
        navbar = navbar.items.len(),
        footer_groups = footer.groups.len(),
        "navigation composed"
    );

    let themes = select_themes(&descriptor.prism)?;

    let model = SiteModel {
        metadata: metadata.clone(),
        locale,
        routes: resolver.route_config(descriptor),
        navbar,
        footer,
        themes,
        policies: descriptor.policies,
        docs: descriptor.docs.clone(),
    };
    let warnings = checker.into_warnings();
    info!(
        title = %model.metadata.title,
        locale = %model.locale,
        warnings = warnings.len(),
        "site assembled"
    );

    Ok(Assembly {
        model,
        manifest,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_kit_core::{NavPosition, parse_site_toml_str};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    const SITE: &str = r##"
title = "T"
url = "https://x.dev"
organizationName = "org"
projectName = "proj"
onBrokenLinks = "throw"

[i18n]
defaultLocale = "en"
locales = ["en", "fr"]

[themeConfig.navbar]
title = "T"

[[themeConfig.navbar.items]]
to = "/"
label = "Docs"

[[themeConfig.navbar.items]]
href = "https://github.com/x"
label = "GitHub"
position = "right"

[themeConfig.footer]
copyright = "Copyright © {year} T"

[[themeConfig.footer.links]]
title = "Docs"

[[themeConfig.footer.links.items]]
label = "Start"
to = "/start"
"##;

    fn doc(id: &str, links: &[&str]) -> DocumentDescriptor {
        DocumentDescriptor {
            id: id.to_string(),
            source_path: PathBuf::from(format!("{id}.md")),
            title: id.to_string(),
            slug: None,
            links: links.iter().map(|l| l.to_string()).collect(),
        }
    }

    fn documents() -> Vec<DocumentDescriptor> {
        vec![doc("index", &["./start.md"]), doc("start", &[])]
    }

    #[test]
    fn test_assemble_resolves_everything() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let assembly = assemble(&descriptor, &documents(), &BuildContext::new(2025)).unwrap();

        assert_eq!(assembly.warning_count(), 0);
        assert_eq!(assembly.model.locale, "en");
        assert_eq!(assembly.model.footer.copyright.as_deref(), Some("Copyright © 2025 T"));
        assert_eq!(assembly.model.themes.light.id, "github");
        assert_eq!(assembly.manifest.route("start"), Some("https://x.dev/start"));

        let right: Vec<_> = assembly
            .model
            .navbar
            .bucket(NavPosition::Right)
            .map(|i| i.label.as_str())
            .collect();
        assert_eq!(right, vec!["GitHub"]);
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let ctx = BuildContext::new(2025);
        let a = assemble(&descriptor, &documents(), &ctx).unwrap();
        let b = assemble(&descriptor, &documents(), &ctx).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_broken_nav_link_throw_wraps_in_assembly() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let err = assemble(&descriptor, &[doc("index", &[])], &BuildContext::new(2025)).unwrap_err();
        assert!(matches!(err, Error::Assembly(_)));
        assert!(matches!(err.root(), Error::BrokenLink { .. }));
    }

    #[test]
    fn test_broken_nav_link_warn_counts_one() {
        let site = SITE.replace(r#"onBrokenLinks = "throw""#, r#"onBrokenLinks = "warn""#);
        let descriptor = parse_site_toml_str(&site).unwrap();
        let assembly = assemble(&descriptor, &[doc("index", &[])], &BuildContext::new(2025)).unwrap();
        assert_eq!(assembly.warning_count(), 1);
        assert_eq!(assembly.warnings[0].target, "/start");
    }

    #[test]
    fn test_markdown_links_follow_their_own_policy() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let docs = vec![doc("index", &["./gone.md"]), doc("start", &[])];
        let assembly = assemble(&descriptor, &docs, &BuildContext::new(2025)).unwrap();
        assert_eq!(assembly.warning_count(), 1);
        assert_eq!(
            assembly.warnings[0].class,
            portal_kit_core::LinkClass::Markdown
        );
    }

    #[test]
    fn test_locale_build_prefixes_routes() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let ctx = BuildContext::new(2025).with_locale("fr");
        let assembly = assemble(&descriptor, &documents(), &ctx).unwrap();
        assert_eq!(assembly.model.routes.base_path, "/fr/");
        assert_eq!(assembly.manifest.route("start"), Some("https://x.dev/fr/start"));
        match &assembly.model.navbar.items[0].target {
            crate::nav::NavTarget::Internal { route, .. } => assert_eq!(route, "https://x.dev/fr/"),
            other => panic!("expected internal item, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_build_locale() {
        let descriptor = parse_site_toml_str(SITE).unwrap();
        let ctx = BuildContext::new(2025).with_locale("de");
        let err = assemble(&descriptor, &documents(), &ctx).unwrap_err();
        assert!(matches!(err.root(), Error::Locale { .. }));
    }

    #[test]
    fn test_unknown_theme_aborts() {
        let site = format!("{}\n[themeConfig.prism]\ntheme = \"neon\"\n", SITE);
        let descriptor = parse_site_toml_str(&site).unwrap();
        let err = assemble(&descriptor, &documents(), &BuildContext::new(2025)).unwrap_err();
        assert!(matches!(err.root(), Error::UnknownTheme { .. }));
    }
}
