//! Syntax-highlighting theme selection.

use serde::Serialize;
use std::str::FromStr;
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::ThemeIds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

/// Supported highlight themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HighlightTheme {
    Github,
    Dracula,
    DuotoneDark,
    DuotoneLight,
    GruvboxMaterialDark,
    GruvboxMaterialLight,
    JettwaveDark,
    JettwaveLight,
    NightOwl,
    NightOwlLight,
    OceanicNext,
    Okaidia,
    OneDark,
    OneLight,
    Palenight,
    ShadesOfPurple,
    Synthwave84,
    Ultramin,
    VsDark,
    VsLight,
}

impl HighlightTheme {
    pub const ALL: [HighlightTheme; 20] = [
        HighlightTheme::Github,
        HighlightTheme::Dracula,
        HighlightTheme::DuotoneDark,
        HighlightTheme::DuotoneLight,
        HighlightTheme::GruvboxMaterialDark,
        HighlightTheme::GruvboxMaterialLight,
        HighlightTheme::JettwaveDark,
        HighlightTheme::JettwaveLight,
        HighlightTheme::NightOwl,
        HighlightTheme::NightOwlLight,
        HighlightTheme::OceanicNext,
        HighlightTheme::Okaidia,
        HighlightTheme::OneDark,
        HighlightTheme::OneLight,
        HighlightTheme::Palenight,
        HighlightTheme::ShadesOfPurple,
        HighlightTheme::Synthwave84,
        HighlightTheme::Ultramin,
        HighlightTheme::VsDark,
        HighlightTheme::VsLight,
    ];

    /// Identifier as written in the descriptor
    pub fn id(self) -> &'static str {
        self.row().0
    }

    pub fn bundle(self) -> ThemeBundle {
        let (id, name, appearance, color, background) = self.row();
        ThemeBundle {
            id,
            name,
            appearance,
            color,
            background,
        }
    }

    fn row(self) -> (&'static str, &'static str, Appearance, &'static str, &'static str) {
        use Appearance::{Dark, Light};
        match self {
            HighlightTheme::Github => ("github", "GitHub", Light, "#393A34", "#f6f8fa"),
            HighlightTheme::Dracula => ("dracula", "Dracula", Dark, "#F8F8F2", "#282A36"),
            HighlightTheme::DuotoneDark => ("duotoneDark", "Duotone Dark", Dark, "#9a86fd", "#2a2734"),
            HighlightTheme::DuotoneLight => ("duotoneLight", "Duotone Light", Light, "#728fcb", "#faf8f5"),
            HighlightTheme::GruvboxMaterialDark => {
                ("gruvboxMaterialDark", "Gruvbox Material Dark", Dark, "#ebdbb2", "#292828")
            }
            HighlightTheme::GruvboxMaterialLight => {
                ("gruvboxMaterialLight", "Gruvbox Material Light", Light, "#654735", "#f9f5d7")
            }
            HighlightTheme::JettwaveDark => ("jettwaveDark", "Jettwave Dark", Dark, "#f8fafc", "#011627"),
            HighlightTheme::JettwaveLight => ("jettwaveLight", "Jettwave Light", Light, "#0f172a", "#f1f5f9"),
            HighlightTheme::NightOwl => ("nightOwl", "Night Owl", Dark, "#d6deeb", "#011627"),
            HighlightTheme::NightOwlLight => ("nightOwlLight", "Night Owl Light", Light, "#403f53", "#FBFBFB"),
            HighlightTheme::OceanicNext => ("oceanicNext", "Oceanic Next", Dark, "#ffffff", "#1B2B34"),
            HighlightTheme::Okaidia => ("okaidia", "Okaidia", Dark, "#f8f8f2", "#272822"),
            HighlightTheme::OneDark => ("oneDark", "One Dark", Dark, "#abb2bf", "#282c34"),
            HighlightTheme::OneLight => ("oneLight", "One Light", Light, "#383a42", "#fafafa"),
            HighlightTheme::Palenight => ("palenight", "Palenight", Dark, "#bfc7d5", "#292d3e"),
            HighlightTheme::ShadesOfPurple => ("shadesOfPurple", "Shades of Purple", Dark, "#9EFEFF", "#2D2A55"),
            HighlightTheme::Synthwave84 => ("synthwave84", "Synthwave '84", Dark, "#f92aad", "#2a2139"),
            HighlightTheme::Ultramin => ("ultramin", "Ultramin", Light, "#282a2e", "#ffffff"),
            HighlightTheme::VsDark => ("vsDark", "VS Dark", Dark, "#9CDCFE", "#1E1E1E"),
            HighlightTheme::VsLight => ("vsLight", "VS Light", Light, "#000000", "#ffffff"),
        }
    }
}

impl FromStr for HighlightTheme {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        HighlightTheme::ALL
            .into_iter()
            .find(|t| t.id() == s)
            .ok_or(())
    }
}

/// Concrete style values for one highlight theme
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeBundle {
    pub id: &'static str,
    pub name: &'static str,
    pub appearance: Appearance,
    pub color: &'static str,
    pub background: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeChoice {
    pub light: ThemeBundle,
    pub dark: ThemeBundle,
}

/// Map the descriptor's theme ids to concrete bundles
pub fn select_themes(ids: &ThemeIds) -> Result<ThemeChoice> {
    let light = lookup("prism.theme", &ids.theme)?;
    let dark = lookup("prism.darkTheme", &ids.dark_theme)?;

    if light.appearance != Appearance::Light {
        warn!(theme = light.id, "dark highlight theme used for light mode");
    }
    if dark.appearance != Appearance::Dark {
        warn!(theme = dark.id, "light highlight theme used for dark mode");
    }

    Ok(ThemeChoice { light, dark })
}

fn lookup(field: &str, id: &str) -> Result<ThemeBundle> {
    id.parse::<HighlightTheme>()
        .map(HighlightTheme::bundle)
        .map_err(|_| Error::UnknownTheme {
            field: field.to_string(),
            id: id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    fn ids(theme: &str, dark: &str) -> ThemeIds {
        ThemeIds {
            theme: theme.to_string(),
            dark_theme: dark.to_string(),
        }
    }

    #[test]
    fn test_select_default_pair() {
        let choice = select_themes(&ThemeIds::default()).unwrap();
        assert_eq!(choice.light.id, "github");
        assert_eq!(choice.light.appearance, Appearance::Light);
        assert_eq!(choice.dark.id, "dracula");
        assert_eq!(choice.dark.background, "#282A36");
    }

    #[test]
    fn test_unknown_theme_names_field() {
        let err = select_themes(&ids("github", "monokai")).unwrap_err();
        match err {
            Error::UnknownTheme { field, id } => {
                assert_eq!(field, "prism.darkTheme");
                assert_eq!(id, "monokai");
            }
            other => panic!("expected unknown theme, got {other:?}"),
        }
    }

    #[test]
    fn test_ids_are_case_sensitive() {
        assert!(select_themes(&ids("GitHub", "dracula")).is_err());
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn select_capturing(theme_ids: &ThemeIds) -> (ThemeChoice, String) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let choice = tracing::subscriber::with_default(subscriber, || {
            select_themes(theme_ids).unwrap()
        });
        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        (choice, output)
    }

    #[test]
    fn test_mismatched_appearance_is_accepted_with_warnings() {
        let (choice, logs) = select_capturing(&ids("dracula", "github"));
        assert_eq!(choice.light.id, "dracula");
        assert_eq!(choice.dark.id, "github");
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("dark highlight theme used for light mode"));
        assert!(logs.contains("light highlight theme used for dark mode"));
    }

    #[test]
    fn test_matching_appearance_logs_nothing() {
        let (_, logs) = select_capturing(&ThemeIds::default());
        assert!(logs.is_empty(), "{logs}");
    }

    #[test]
    fn test_every_theme_parses_from_its_id() {
        for theme in HighlightTheme::ALL {
            assert_eq!(theme.id().parse::<HighlightTheme>(), Ok(theme));
        }
    }
}
