pub mod config;
pub mod error;
pub mod routes;
pub mod theme;
pub mod types;

pub use config::{parse_site_json_str, parse_site_toml, parse_site_toml_str};
pub use error::{Error, Result};
pub use routes::{PathResolver, RouteConfig};
pub use theme::{ThemeBundle, ThemeChoice, select_themes};
pub use types::*;
