//! Navbar and footer composition.
//!
//! Turns the descriptor's declared entries into resolved [`NavItem`]s:
//!
//! ```text
//! { to = "/", label = "Docs" }                   → Internal { route = "https://x.dev/" }
//! { href = "https://github.com/x", label = ".." } → External { href = "https://github.com/x" }
//! { href = "/docs/intro", label = ".." }         → Internal (no network scheme)
//! ```
//!
//! Declaration order is kept as-is; the left/right buckets are filtered
//! views, so ordering within a bucket is the declaration order.

use portal_kit_core::{
    Error, FooterConfig, FooterStyle, LinkClass, Logo, NavEntry, NavLink, NavPosition,
    NavbarConfig, PathResolver, Result,
};
use serde::Serialize;
use url::Url;

use crate::links::{KnownRoutes, LinkChecker};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NavTarget {
    Internal { to: String, route: String },
    External { href: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub label: String,
    pub position: NavPosition,
    #[serde(flatten)]
    pub target: NavTarget,
}

impl NavItem {
    pub fn is_internal(&self) -> bool {
        matches!(self.target, NavTarget::Internal { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navbar {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<Logo>,
    pub items: Vec<NavItem>,
}

impl Navbar {
    /// Items in one position bucket, in declaration order
    pub fn bucket(&self, position: NavPosition) -> impl Iterator<Item = &NavItem> {
        self.items.iter().filter(move |i| i.position == position)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterGroup {
    pub title: String,
    pub items: Vec<NavItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Footer {
    pub style: FooterStyle,
    pub groups: Vec<FooterGroup>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
}

/// Resolves nav entries against the known routes
pub struct NavComposer<'a> {
    resolver: &'a PathResolver,
    known: &'a KnownRoutes,
    checker: &'a mut LinkChecker,
}

impl<'a> NavComposer<'a> {
    pub fn new(
        resolver: &'a PathResolver,
        known: &'a KnownRoutes,
        checker: &'a mut LinkChecker,
    ) -> Self {
        Self {
            resolver,
            known,
            checker,
        }
    }

    pub fn compose_navbar(&mut self, config: &NavbarConfig) -> Result<Navbar> {
        let items = config
            .items
            .iter()
            .enumerate()
            .map(|(i, entry)| self.compose_item(entry, &format!("themeConfig.navbar.items[{}]", i)))
            .collect::<Result<_>>()?;

        Ok(Navbar {
            title: config.title.clone(),
            logo: config.logo.clone(),
            items,
        })
    }

    /// `copyright` is the already-rendered line
    pub fn compose_footer(
        &mut self,
        config: &FooterConfig,
        copyright: Option<String>,
    ) -> Result<Footer> {
        let mut groups = Vec::with_capacity(config.links.len());
        for (g, group) in config.links.iter().enumerate() {
            let items = group
                .items
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    self.compose_item(entry, &format!("themeConfig.footer.links[{}].items[{}]", g, i))
                })
                .collect::<Result<_>>()?;
            groups.push(FooterGroup {
                title: group.title.clone(),
                items,
            });
        }

        Ok(Footer {
            style: config.style,
            groups,
            copyright,
        })
    }

    fn compose_item(&mut self, entry: &NavEntry, field: &str) -> Result<NavItem> {
        let target = match classify(&entry.link, field)? {
            Classified::External(href) => NavTarget::External { href },
            Classified::Internal(to) => {
                let route = self.resolver.route(&to)?;
                if !self.known.contains(&route) {
                    self.checker.broken(LinkClass::Internal, field, &to)?;
                }
                NavTarget::Internal { to, route }
            }
        };

        Ok(NavItem {
            label: entry.label.clone(),
            position: entry.position,
            target,
        })
    }
}

enum Classified {
    Internal(String),
    External(String),
}

/// Internal iff the target is content-relative; anything with a scheme must
/// be a well-formed absolute URL and is external
fn classify(link: &NavLink, field: &str) -> Result<Classified> {
    match link {
        NavLink::To(to) if to.contains("://") || to.starts_with("//") => Err(Error::schema(
            format!("{}.to", field),
            format!("'{}' is a full URL; use 'href' for external links", to),
        )),
        NavLink::To(to) => Ok(Classified::Internal(to.clone())),
        NavLink::Href(href) if looks_absolute(href) => {
            let url = Url::parse(href).map_err(|e| {
                Error::schema(
                    format!("{}.href", field),
                    format!("'{}' is not a valid URL: {}", href, e),
                )
            })?;
            if url.has_authority() && url.host_str().is_none_or(str::is_empty) {
                return Err(Error::schema(
                    format!("{}.href", field),
                    format!("'{}' has no host", href),
                ));
            }
            Ok(Classified::External(href.clone()))
        }
        NavLink::Href(href) if href.starts_with("//") => {
            // Scheme-relative; validated as https
            let url = Url::parse(&format!("https:{}", href)).map_err(|e| {
                Error::schema(
                    format!("{}.href", field),
                    format!("'{}' is not a valid URL: {}", href, e),
                )
            })?;
            if url.host_str().is_none_or(str::is_empty) {
                return Err(Error::schema(
                    format!("{}.href", field),
                    format!("'{}' has no host", href),
                ));
            }
            Ok(Classified::External(href.clone()))
        }
        NavLink::Href(href) => Ok(Classified::Internal(href.clone())),
    }
}

/// `scheme:` prefix per RFC 3986
fn looks_absolute(href: &str) -> bool {
    match href.split_once(':') {
        Some((scheme, _)) => {
            scheme.starts_with(|c: char| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        None => false,
    }
}
