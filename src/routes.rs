//! Navigation table and navigator.
//!
//! DESIGN
//! ======
//! Routes are a static table matched in order, segment by segment. A route
//! has at most one `:param` segment; static routes that would collide with a
//! parametric one (`/project/create` vs `/project/:projectId`) are listed first.
//! Unmatched paths resolve to `View::NotFound` rather than failing.
//!
//! Every navigation resets the scroll position through a `ScrollTarget`
//! before the new location is published.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::BTreeMap;
use std::fmt;

use tokio::sync::watch;
use tracing::debug;

// =============================================================================
// TABLE
// =============================================================================

/// Named routes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RouteName {
    Home,
    Browse,
    CreateOrganization,
    CreateProject,
    Project,
    Volunteer,
    Profile,
}

impl fmt::Display for RouteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Home => "home",
            Self::Browse => "browse",
            Self::CreateOrganization => "createOrganization",
            Self::CreateProject => "createProject",
            Self::Project => "project",
            Self::Volunteer => "volunteer",
            Self::Profile => "profile",
        };
        f.write_str(name)
    }
}

/// Page rendered for a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    Home,
    OrganizationForm,
    ProjectForm,
    Project,
    Volunteer,
    Profile,
    NotFound,
}

/// One row of the navigation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RouteEntry {
    pub name: RouteName,
    pub path: &'static str,
    pub view: View,
}

/// The application's routes in match order.
pub const ROUTES: &[RouteEntry] = &[
    RouteEntry { name: RouteName::Home, path: "/", view: View::Home },
    RouteEntry { name: RouteName::Browse, path: "/browse", view: View::Home },
    RouteEntry { name: RouteName::CreateOrganization, path: "/organization/create", view: View::OrganizationForm },
    RouteEntry { name: RouteName::CreateProject, path: "/project/create", view: View::ProjectForm },
    RouteEntry { name: RouteName::Project, path: "/project/:projectId", view: View::Project },
    RouteEntry { name: RouteName::Volunteer, path: "/volunteer/:userId", view: View::Volunteer },
    RouteEntry { name: RouteName::Profile, path: "/profile", view: View::Profile },
];

/// Errors produced when building a path from a named route.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route {route} is not in the table")]
    UnknownRoute { route: RouteName },
    #[error("route {route} requires parameter `{param}`")]
    MissingParam { route: RouteName, param: &'static str },
}

/// A resolved navigation target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    /// Normalized path that was resolved.
    pub path: String,
    /// Matched route, or `None` for the not-found view.
    pub name: Option<RouteName>,
    pub view: View,
    pub params: BTreeMap<String, String>,
}

impl Location {
    /// Value of a dynamic path segment.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// Route lookup over a static table.
#[derive(Clone, Copy, Debug)]
pub struct RouteTable {
    entries: &'static [RouteEntry],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(ROUTES)
    }
}

impl RouteTable {
    #[must_use]
    pub const fn new(entries: &'static [RouteEntry]) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn entries(&self) -> &'static [RouteEntry] {
        self.entries
    }

    /// Resolve `raw` to a location. Never fails; unmatched paths yield
    /// `View::NotFound`.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Location {
        let path = normalize_path(raw);
        let segments = split_segments(&path);

        for entry in self.entries {
            if let Some(params) = match_segments(entry.path, &segments) {
                return Location { path, name: Some(entry.name), view: entry.view, params };
            }
        }

        Location { path, name: None, view: View::NotFound, params: BTreeMap::new() }
    }

    /// Build the path for a named route, substituting `param` into its
    /// dynamic segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the route is not in the table or a required
    /// parameter is missing or empty.
    pub fn href(&self, name: RouteName, param: Option<&str>) -> Result<String, RouteError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name == name)
            .ok_or(RouteError::UnknownRoute { route: name })?;

        let mut out = String::new();
        for segment in split_segments(entry.path) {
            out.push('/');
            match segment.strip_prefix(':') {
                Some(key) => match param.filter(|p| !p.is_empty()) {
                    Some(value) => out.push_str(value),
                    None => return Err(RouteError::MissingParam { route: name, param: key }),
                },
                None => out.push_str(segment),
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Ok(out)
    }
}

/// Add a leading `/`, drop query/fragment and a trailing `/`.
fn normalize_path(raw: &str) -> String {
    let end = raw.find(['?', '#']).unwrap_or(raw.len());
    let trimmed = raw[..end].trim();
    let inner = trimmed.trim_matches('/');
    format!("/{inner}")
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn match_segments(pattern: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let expected = split_segments(pattern);
    if expected.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (want, got) in expected.iter().zip(segments) {
        match want.strip_prefix(':') {
            Some(key) => {
                params.insert(key.to_owned(), (*got).to_owned());
            }
            None if want == got => {}
            None => return None,
        }
    }
    Some(params)
}

// =============================================================================
// NAVIGATOR
// =============================================================================

/// Something with a scrollable viewport.
pub trait ScrollTarget: Send + Sync {
    fn scroll_to(&self, x: f64, y: f64);
}

/// Scroll target for headless runs.
pub struct NoScroll;

impl ScrollTarget for NoScroll {
    fn scroll_to(&self, _x: f64, _y: f64) {}
}

/// Resolves paths and publishes the current location.
pub struct Navigator {
    table: RouteTable,
    scroll: Box<dyn ScrollTarget>,
    current: watch::Sender<Option<Location>>,
}

impl Navigator {
    #[must_use]
    pub fn new(table: RouteTable, scroll: Box<dyn ScrollTarget>) -> Self {
        let (current, _) = watch::channel(None);
        Self { table, scroll, current }
    }

    #[must_use]
    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// Navigate to `path`. The scroll reset runs before the location is
    /// published, for matched and unmatched paths alike.
    pub fn navigate(&self, path: &str) -> Location {
        let location = self.table.resolve(path);
        self.scroll.scroll_to(0.0, 0.0);
        debug!(path = %location.path, view = ?location.view, "navigated");
        self.current.send_replace(Some(location.clone()));
        location
    }

    /// Navigate to a named route.
    ///
    /// # Errors
    ///
    /// Returns an error if the path for `name` cannot be built.
    pub fn navigate_to(&self, name: RouteName, param: Option<&str>) -> Result<Location, RouteError> {
        let path = self.table.href(name, param)?;
        Ok(self.navigate(&path))
    }

    #[must_use]
    pub fn current(&self) -> Option<Location> {
        self.current.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Location>> {
        self.current.subscribe()
    }
}
