use std::sync::{Arc, Mutex};

use super::*;

fn table() -> RouteTable {
    RouteTable::default()
}

// =============================================================
// resolve
// =============================================================

#[test]
fn resolve_root_is_home() {
    let loc = table().resolve("/");
    assert_eq!(loc.name, Some(RouteName::Home));
    assert_eq!(loc.view, View::Home);
    assert!(loc.params.is_empty());
}

#[test]
fn resolve_browse_shares_home_view() {
    let loc = table().resolve("/browse");
    assert_eq!(loc.name, Some(RouteName::Browse));
    assert_eq!(loc.view, View::Home);
}

#[test]
fn resolve_project_extracts_project_id() {
    let loc = table().resolve("project/42");
    assert_eq!(loc.name, Some(RouteName::Project));
    assert_eq!(loc.view, View::Project);
    assert_eq!(loc.param("projectId"), Some("42"));
    assert_eq!(loc.path, "/project/42");
}

#[test]
fn resolve_volunteer_extracts_user_id() {
    let loc = table().resolve("/volunteer/abc123");
    assert_eq!(loc.view, View::Volunteer);
    assert_eq!(loc.param("userId"), Some("abc123"));
}

#[test]
fn resolve_static_create_wins_over_param() {
    let loc = table().resolve("/project/create");
    assert_eq!(loc.name, Some(RouteName::CreateProject));
    assert_eq!(loc.view, View::ProjectForm);
    assert!(loc.param("projectId").is_none());
}

#[test]
fn resolve_organization_form() {
    assert_eq!(table().resolve("/organization/create").view, View::OrganizationForm);
}

#[test]
fn resolve_profile() {
    assert_eq!(table().resolve("/profile").view, View::Profile);
}

#[test]
fn resolve_unmatched_is_not_found() {
    let loc = table().resolve("/nowhere/at/all");
    assert_eq!(loc.view, View::NotFound);
    assert!(loc.name.is_none());
    assert_eq!(loc.path, "/nowhere/at/all");
}

#[test]
fn resolve_missing_param_is_not_found() {
    assert_eq!(table().resolve("/project/").view, View::NotFound);
    assert_eq!(table().resolve("/volunteer").view, View::NotFound);
}

#[test]
fn resolve_extra_segment_is_not_found() {
    assert_eq!(table().resolve("/project/42/edit").view, View::NotFound);
}

#[test]
fn resolve_strips_query_fragment_and_trailing_slash() {
    let loc = table().resolve("/project/7/?tab=volunteers#top");
    assert_eq!(loc.view, View::Project);
    assert_eq!(loc.param("projectId"), Some("7"));
    assert_eq!(loc.path, "/project/7");
}

#[test]
fn resolve_empty_input_is_home() {
    assert_eq!(table().resolve("").view, View::Home);
}

// =============================================================
// href
// =============================================================

#[test]
fn href_static_route() {
    assert_eq!(table().href(RouteName::Profile, None).unwrap(), "/profile");
    assert_eq!(table().href(RouteName::Home, None).unwrap(), "/");
}

#[test]
fn href_param_route() {
    assert_eq!(table().href(RouteName::Project, Some("42")).unwrap(), "/project/42");
    assert_eq!(table().href(RouteName::Volunteer, Some("u1")).unwrap(), "/volunteer/u1");
}

#[test]
fn href_missing_param_errors() {
    let err = table().href(RouteName::Project, None).unwrap_err();
    assert_eq!(err, RouteError::MissingParam { route: RouteName::Project, param: "projectId" });
    assert!(table().href(RouteName::Volunteer, Some("")).is_err());
}

#[test]
fn href_unknown_route_errors() {
    static ONLY_HOME: &[RouteEntry] = &[RouteEntry { name: RouteName::Home, path: "/", view: View::Home }];
    let err = RouteTable::new(ONLY_HOME).href(RouteName::Profile, None).unwrap_err();
    assert_eq!(err.to_string(), "route profile is not in the table");
}

#[test]
fn href_round_trips_through_resolve() {
    for entry in ROUTES {
        let path = table().href(entry.name, Some("x1")).unwrap();
        assert_eq!(table().resolve(&path).name, Some(entry.name), "{path}");
    }
}

// =============================================================
// Navigator
// =============================================================

/// Records every scroll call together with the location that was current
/// at the moment of the call.
#[derive(Clone, Default)]
struct RecordingScroll {
    calls: Arc<Mutex<Vec<((f64, f64), Option<String>)>>>,
    watcher: Arc<Mutex<Option<watch::Receiver<Option<Location>>>>>,
}

impl ScrollTarget for RecordingScroll {
    fn scroll_to(&self, x: f64, y: f64) {
        let seen = self
            .watcher
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|rx| rx.borrow().as_ref().map(|loc| loc.path.clone()));
        self.calls.lock().unwrap().push(((x, y), seen));
    }
}

fn recording_navigator() -> (Navigator, RecordingScroll) {
    let scroll = RecordingScroll::default();
    let nav = Navigator::new(table(), Box::new(scroll.clone()));
    *scroll.watcher.lock().unwrap() = Some(nav.subscribe());
    (nav, scroll)
}

#[test]
fn navigate_resets_scroll_to_origin() {
    let (nav, scroll) = recording_navigator();
    nav.navigate("/browse");
    let calls = scroll.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, (0.0, 0.0));
}

#[test]
fn navigate_scrolls_before_publishing_location() {
    let (nav, scroll) = recording_navigator();
    nav.navigate("/browse");
    nav.navigate("/profile");
    let calls = scroll.calls.lock().unwrap();
    assert_eq!(calls[0].1, None);
    assert_eq!(calls[1].1.as_deref(), Some("/browse"));
    assert_eq!(nav.current().unwrap().path, "/profile");
}

#[test]
fn navigate_unmatched_still_scrolls_and_publishes_not_found() {
    let (nav, scroll) = recording_navigator();
    let loc = nav.navigate("/missing");
    assert_eq!(loc.view, View::NotFound);
    assert_eq!(scroll.calls.lock().unwrap().len(), 1);
    assert_eq!(nav.current().unwrap().view, View::NotFound);
}

#[test]
fn navigate_to_named_route() {
    let (nav, _scroll) = recording_navigator();
    let loc = nav.navigate_to(RouteName::Volunteer, Some("u7")).unwrap();
    assert_eq!(loc.param("userId"), Some("u7"));
    assert_eq!(nav.current(), Some(loc));
}

#[test]
fn navigate_to_missing_param_does_not_navigate() {
    let (nav, scroll) = recording_navigator();
    assert!(nav.navigate_to(RouteName::Project, None).is_err());
    assert!(nav.current().is_none());
    assert!(scroll.calls.lock().unwrap().is_empty());
}

#[test]
fn subscribers_observe_navigation() {
    let nav = Navigator::new(table(), Box::new(NoScroll));
    let mut rx = nav.subscribe();
    nav.navigate("/project/9");
    assert!(rx.has_changed().unwrap());
    let seen = rx.borrow_and_update().clone().unwrap();
    assert_eq!(seen.param("projectId"), Some("9"));
}
