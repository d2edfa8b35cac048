// Site composition: navigation, link checking, route manifest and the
// assembled site model consumed by the renderer

pub mod assemble;
pub mod links;
pub mod manifest;
pub mod nav;

pub use assemble::{Assembly, BuildContext, SiteModel, assemble};
pub use links::{KnownRoutes, LinkChecker, LinkWarning};
pub use manifest::{ManifestEntry, RouteManifest};
pub use nav::{Footer, FooterGroup, NavItem, NavTarget, Navbar};
