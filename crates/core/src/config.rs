use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use url::Url;

use crate::error::{Error, Result};
use crate::routes::{normalize_base_path, normalize_route_base};
use crate::types::*;

/// Raw descriptor structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDescriptor {
    title: String,
    tagline: Option<String>,
    favicon: Option<String>,
    url: String,
    #[serde(default = "default_base_url")]
    base_url: String,
    organization_name: String,
    project_name: String,
    on_broken_links: Option<LinkPolicy>,
    on_broken_markdown_links: Option<LinkPolicy>,
    #[serde(default)]
    i18n: RawI18n,
    #[serde(default)]
    preset: RawPreset,
    #[serde(default)]
    theme_config: RawThemeConfig,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawI18n {
    default_locale: String,
    locales: Vec<String>,
}

impl Default for RawI18n {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales: vec!["en".to_string()],
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPreset {
    #[serde(default)]
    docs: RawDocs,
    #[serde(default)]
    blog: bool,
    custom_css: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocs {
    #[serde(default = "default_docs_path")]
    path: String,
    #[serde(default = "default_base_url")]
    route_base_path: String,
    edit_url: Option<String>,
}

impl Default for RawDocs {
    fn default() -> Self {
        Self {
            path: default_docs_path(),
            route_base_path: default_base_url(),
            edit_url: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawThemeConfig {
    image: Option<String>,
    #[serde(default)]
    navbar: RawNavbar,
    #[serde(default)]
    footer: RawFooter,
    #[serde(default)]
    prism: RawPrism,
}

#[derive(Debug, Default, Deserialize)]
struct RawNavbar {
    title: Option<String>,
    logo: Option<Logo>,
    #[serde(default)]
    items: Vec<RawNavItem>,
}

#[derive(Debug, Deserialize)]
struct RawNavItem {
    label: String,
    to: Option<String>,
    href: Option<String>,
    #[serde(default)]
    position: NavPosition,
}

#[derive(Debug, Default, Deserialize)]
struct RawFooter {
    #[serde(default)]
    style: FooterStyle,
    #[serde(default)]
    links: Vec<RawFooterGroup>,
    copyright: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFooterGroup {
    title: String,
    #[serde(default)]
    items: Vec<RawNavItem>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPrism {
    theme: Option<String>,
    dark_theme: Option<String>,
}

fn default_base_url() -> String {
    "/".to_string()
}

fn default_docs_path() -> String {
    "docs".to_string()
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<Descriptor> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<Descriptor> {
    let raw: RawDescriptor =
        toml::from_str(content).map_err(|err| Error::from_toml(err, content))?;
    validate(raw)
}

/// Parse a JSON descriptor using the same keys as site.toml
pub fn parse_site_json_str(content: &str) -> Result<Descriptor> {
    let raw: RawDescriptor = serde_json::from_str(content)?;
    validate(raw)
}

fn validate(raw: RawDescriptor) -> Result<Descriptor> {
    let title = require_non_empty(raw.title, "title")?;
    let organization_name = require_non_empty(raw.organization_name, "organizationName")?;
    let project_name = require_non_empty(raw.project_name, "projectName")?;
    let url = parse_site_url(&raw.url)?;
    let base_url = normalize_base_path(&raw.base_url)
        .map_err(|_| Error::schema("baseUrl", format!("'{}' escapes the root", raw.base_url)))?;

    validate_locales(&raw.i18n)?;

    let metadata = SiteMetadata {
        title,
        tagline: raw.tagline,
        favicon: raw.favicon,
        image: raw.theme_config.image,
        organization_name,
        project_name,
        default_locale: raw.i18n.default_locale,
        locales: raw.i18n.locales,
    };

    let policies = LinkPolicies {
        on_broken_links: raw
            .on_broken_links
            .unwrap_or(LinkPolicies::default().on_broken_links),
        on_broken_markdown_links: raw
            .on_broken_markdown_links
            .unwrap_or(LinkPolicies::default().on_broken_markdown_links),
    };

    let docs = DocsPreset {
        path: PathBuf::from(require_non_empty(raw.preset.docs.path, "preset.docs.path")?),
        route_base_path: normalize_route_base(&raw.preset.docs.route_base_path).map_err(|_| {
            Error::schema(
                "preset.docs.routeBasePath",
                format!("'{}' escapes the root", raw.preset.docs.route_base_path),
            )
        })?,
        edit_url: raw
            .preset
            .docs
            .edit_url
            .map(|u| parse_absolute_url(&u, "preset.docs.editUrl"))
            .transpose()?,
        custom_css: raw.preset.custom_css.map(PathBuf::from),
        blog: raw.preset.blog,
    };

    let navbar = NavbarConfig {
        title: raw.theme_config.navbar.title,
        logo: raw.theme_config.navbar.logo,
        items: raw
            .theme_config
            .navbar
            .items
            .into_iter()
            .enumerate()
            .map(|(i, item)| nav_entry(item, &format!("themeConfig.navbar.items[{}]", i)))
            .collect::<Result<_>>()?,
    };

    let footer = FooterConfig {
        style: raw.theme_config.footer.style,
        copyright: raw.theme_config.footer.copyright,
        links: raw
            .theme_config
            .footer
            .links
            .into_iter()
            .enumerate()
            .map(|(g, group)| -> Result<FooterGroupConfig> {
                let field = format!("themeConfig.footer.links[{}]", g);
                let title = require_non_empty(group.title, &format!("{}.title", field))?;
                let items = group
                    .items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| nav_entry(item, &format!("{}.items[{}]", field, i)))
                    .collect::<Result<_>>()?;
                Ok(FooterGroupConfig { title, items })
            })
            .collect::<Result<_>>()?,
    };

    let defaults = ThemeIds::default();
    let prism = ThemeIds {
        theme: raw.theme_config.prism.theme.unwrap_or(defaults.theme),
        dark_theme: raw.theme_config.prism.dark_theme.unwrap_or(defaults.dark_theme),
    };

    debug!(title = %metadata.title, url = %url, base_url = %base_url, "descriptor validated");

    Ok(Descriptor {
        metadata,
        url,
        base_url,
        policies,
        docs,
        navbar,
        footer,
        prism,
    })
}

fn require_non_empty(value: String, field: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Err(Error::schema(field, "must not be empty"));
    }
    Ok(value)
}

fn parse_absolute_url(value: &str, field: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| Error::schema(field, format!("'{}' is not an absolute URL: {}", value, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::schema(
            field,
            format!("'{}' must be an http(s) URL with a host", value),
        ));
    }
    Ok(url)
}

/// The site URL carries only the origin; paths belong in baseUrl
fn parse_site_url(value: &str) -> Result<Url> {
    let url = parse_absolute_url(value, "url")?;
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(Error::schema(
            "url",
            format!("'{}' must not contain a path; put it in baseUrl", value),
        ));
    }
    Ok(url)
}

fn nav_entry(item: RawNavItem, field: &str) -> Result<NavEntry> {
    let label = require_non_empty(item.label, &format!("{}.label", field))?;
    let link = match (item.to, item.href) {
        (Some(to), None) => NavLink::To(to),
        (None, Some(href)) => NavLink::Href(href),
        (Some(_), Some(_)) => {
            return Err(Error::schema(field, "set either 'to' or 'href', not both"));
        }
        (None, None) => return Err(Error::schema(field, "missing 'to' or 'href'")),
    };
    Ok(NavEntry {
        label,
        position: item.position,
        link,
    })
}

fn validate_locales(i18n: &RawI18n) -> Result<()> {
    if i18n.locales.is_empty() {
        return Err(Error::locale("i18n.locales", "at least one locale is required"));
    }

    let mut seen = HashSet::new();
    for (i, locale) in i18n.locales.iter().enumerate() {
        if !is_valid_locale_tag(locale) {
            return Err(Error::locale(
                format!("i18n.locales[{}]", i),
                format!("'{}' is not a valid locale tag", locale),
            ));
        }
        if !seen.insert(locale.as_str()) {
            return Err(Error::locale(
                format!("i18n.locales[{}]", i),
                format!("duplicate locale '{}'", locale),
            ));
        }
    }

    if !is_valid_locale_tag(&i18n.default_locale) {
        return Err(Error::locale(
            "i18n.defaultLocale",
            format!("'{}' is not a valid locale tag", i18n.default_locale),
        ));
    }
    if !seen.contains(i18n.default_locale.as_str()) {
        return Err(Error::locale(
            "i18n.defaultLocale",
            format!("'{}' is not listed in i18n.locales", i18n.default_locale),
        ));
    }
    Ok(())
}

/// Check the shape of a BCP 47 tag: `en`, `pt-BR`, `zh-Hans-CN`
///
/// Primary subtag is 2-3 or 5-8 letters; following subtags are 1-8
/// alphanumerics. Underscores are rejected.
pub fn is_valid_locale_tag(tag: &str) -> bool {
    let mut subtags = tag.split('-');
    let primary = match subtags.next() {
        Some(p) => p,
        None => return false,
    };
    let primary_ok = matches!(primary.len(), 2..=3 | 5..=8)
        && primary.chars().all(|c| c.is_ascii_alphabetic());
    primary_ok
        && subtags.all(|s| (1..=8).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphanumeric()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MINIMAL: &str = r##"
title = "T"
url = "https://x.dev"
organizationName = "org"
projectName = "proj"
"##;

    #[test]
    fn test_parse_minimal_config_applies_defaults() {
        let d = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(d.metadata.title, "T");
        assert_eq!(d.base_url, "/");
        assert_eq!(d.metadata.default_locale, "en");
        assert_eq!(d.metadata.locales, vec!["en".to_string()]);
        assert_eq!(d.policies, LinkPolicies::default());
        assert_eq!(d.docs.path, PathBuf::from("docs"));
        assert_eq!(d.docs.route_base_path, "");
        assert!(!d.docs.blog);
        assert_eq!(d.prism, ThemeIds::default());
        assert!(d.navbar.items.is_empty());
    }

    #[test]
    fn test_missing_required_fields() {
        for field in ["title", "url", "organizationName", "projectName"] {
            let toml: String = MINIMAL
                .lines()
                .filter(|l| !l.starts_with(field))
                .collect::<Vec<_>>()
                .join("\n");
            match parse_site_toml_str(&toml) {
                Err(Error::Schema { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected schema error for {field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_wrong_shape_is_schema_error() {
        let toml = MINIMAL.replace(r#"projectName = "proj""#, "projectName = 42");
        match parse_site_toml_str(&toml) {
            Err(Error::Schema { field, message }) => {
                assert_eq!(field, "projectName");
                assert!(message.contains("expected a string"));
            }
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_shape_in_table_names_dotted_key() {
        let toml = format!("{MINIMAL}\n[themeConfig.navbar]\ntitle = 7\n");
        match parse_site_toml_str(&toml) {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "themeConfig.navbar.title"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_title_rejected() {
        let toml = MINIMAL.replace(r#"title = "T""#, r#"title = "  ""#);
        match parse_site_toml_str(&toml) {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_url_must_be_absolute_origin() {
        for bad in ["x.dev", "ftp://x.dev", "https://x.dev/docs"] {
            let toml = MINIMAL.replace("https://x.dev", bad);
            match parse_site_toml_str(&toml) {
                Err(Error::Schema { field, .. }) => assert_eq!(field, "url"),
                other => panic!("expected url schema error for {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_base_url_normalized() {
        let toml = format!("{}baseUrl = \"site\"\n", MINIMAL);
        assert_eq!(parse_site_toml_str(&toml).unwrap().base_url, "/site/");
    }

    #[test]
    fn test_default_locale_outside_set() {
        let toml = format!(
            "{}[i18n]\ndefaultLocale = \"fr\"\nlocales = [\"en\"]\n",
            MINIMAL
        );
        match parse_site_toml_str(&toml) {
            Err(Error::Locale { field, .. }) => assert_eq!(field, "i18n.defaultLocale"),
            other => panic!("expected locale error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_locale_tag() {
        let toml = format!(
            "{}[i18n]\ndefaultLocale = \"en_US\"\nlocales = [\"en_US\"]\n",
            MINIMAL
        );
        assert!(matches!(
            parse_site_toml_str(&toml),
            Err(Error::Locale { .. })
        ));
    }

    #[test]
    fn test_locale_tags() {
        for ok in ["en", "fr", "pt-BR", "zh-Hans", "zh-Hans-CN", "ast"] {
            assert!(is_valid_locale_tag(ok), "{ok}");
        }
        for bad in ["", "e", "en_US", "en-", "1a", "en-toolongsubtag"] {
            assert!(!is_valid_locale_tag(bad), "{bad}");
        }
    }

    #[test]
    fn test_nav_item_requires_exactly_one_target() {
        let both = format!(
            "{}[[themeConfig.navbar.items]]\nlabel = \"X\"\nto = \"/\"\nhref = \"https://a.dev\"\n",
            MINIMAL
        );
        match parse_site_toml_str(&both) {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "themeConfig.navbar.items[0]"),
            other => panic!("expected schema error, got {other:?}"),
        }

        let neither = format!("{}[[themeConfig.navbar.items]]\nlabel = \"X\"\n", MINIMAL);
        assert!(matches!(
            parse_site_toml_str(&neither),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_nav_positions_and_footer_groups() {
        let toml = format!(
            r##"{}
[[themeConfig.navbar.items]]
to = "/"
label = "Docs"

[[themeConfig.navbar.items]]
href = "https://github.com/x"
label = "GitHub"
position = "right"

[themeConfig.footer]
style = "light"
copyright = "Copyright © {{year}} T"

[[themeConfig.footer.links]]
title = "Community"

[[themeConfig.footer.links.items]]
label = "Discussions"
href = "https://github.com/x/discussions"
"##,
            MINIMAL
        );
        let d = parse_site_toml_str(&toml).unwrap();
        assert_eq!(d.navbar.items[0].position, NavPosition::Left);
        assert_eq!(d.navbar.items[1].position, NavPosition::Right);
        assert_eq!(d.navbar.items[0].link, NavLink::To("/".to_string()));
        assert_eq!(d.footer.style, FooterStyle::Light);
        assert_eq!(d.footer.copyright.as_deref(), Some("Copyright © {year} T"));
        assert_eq!(d.footer.links[0].title, "Community");
        assert_eq!(d.footer.links[0].items.len(), 1);
    }

    #[test]
    fn test_unknown_policy_value_rejected() {
        let toml = format!("{}onBrokenLinks = \"explode\"\n", MINIMAL.trim_start());
        assert!(matches!(
            parse_site_toml_str(&toml),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_edit_url_must_be_absolute() {
        let toml = format!("{}[preset.docs]\neditUrl = \"edit/main\"\n", MINIMAL);
        match parse_site_toml_str(&toml) {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "preset.docs.editUrl"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_json_descriptor() {
        let json = r#"{
            "title": "T",
            "url": "https://x.dev",
            "baseUrl": "/",
            "organizationName": "org",
            "projectName": "proj",
            "themeConfig": {
                "navbar": {
                    "items": [
                        {"to": "/", "label": "Docs"},
                        {"href": "https://github.com/x", "label": "GitHub"}
                    ]
                }
            }
        }"#;
        let d = parse_site_json_str(json).unwrap();
        assert_eq!(d.navbar.items.len(), 2);
        assert_eq!(
            d.navbar.items[1].link,
            NavLink::Href("https://github.com/x".to_string())
        );
    }

    #[test]
    fn test_json_missing_title() {
        let json = r#"{"url": "https://x.dev", "organizationName": "o", "projectName": "p"}"#;
        match parse_site_json_str(json) {
            Err(Error::Schema { field, .. }) => assert_eq!(field, "title"),
            other => panic!("expected schema error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_site_toml_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = parse_site_toml(dir.path().join("site.toml"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
