//! Static route table mapping client-side paths to views.

/// Path of the login page
pub const LOGIN_PATH: &str = "/login";

/// Path of the registration page
pub const REGISTER_PATH: &str = "/register";

/// Landing page for authenticated users
pub const HOME_PATH: &str = "/";

/// Views the client can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    Register,
    Dashboard,
    Clients,
    Inventory,
    Issues,
    Payments,
    Deliveries,
    Users,
}

impl View {
    /// Get the display title for this view.
    pub fn title(&self) -> &'static str {
        match self {
            View::Login => "Login",
            View::Register => "Register",
            View::Dashboard => "Dashboard",
            View::Clients => "Clients",
            View::Inventory => "Inventory",
            View::Issues => "Issues",
            View::Payments => "Payments",
            View::Deliveries => "Deliveries",
            View::Users => "Users",
        }
    }

    /// API collection backing this view, relative to the API base URL.
    pub fn resource(&self) -> Option<&'static str> {
        match self {
            View::Clients => Some("/clients"),
            View::Inventory => Some("/inventory"),
            View::Issues => Some("/issues"),
            View::Payments => Some("/payments"),
            View::Deliveries => Some("/deliveries"),
            View::Users => Some("/users"),
            View::Login | View::Register | View::Dashboard => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub requires_auth: bool,
}

pub static ROUTES: &[RouteEntry] = &[
    RouteEntry { path: LOGIN_PATH, name: "Login", view: View::Login, requires_auth: false },
    RouteEntry { path: REGISTER_PATH, name: "Register", view: View::Register, requires_auth: false },
    RouteEntry { path: HOME_PATH, name: "Dashboard", view: View::Dashboard, requires_auth: true },
    RouteEntry { path: "/clients", name: "Clients", view: View::Clients, requires_auth: true },
    RouteEntry { path: "/inventory", name: "Inventory", view: View::Inventory, requires_auth: true },
    RouteEntry { path: "/issues", name: "Issues", view: View::Issues, requires_auth: true },
    RouteEntry { path: "/payments", name: "Payments", view: View::Payments, requires_auth: true },
    RouteEntry { path: "/deliveries", name: "Deliveries", view: View::Deliveries, requires_auth: true },
    RouteEntry { path: "/users", name: "Users", view: View::Users, requires_auth: true },
];

/// Reduce a location to the bare path used for matching.
///
/// Drops any query string or fragment and a trailing slash (except on the
/// root path), and adds a leading slash if one is missing.
pub fn normalize(path: &str) -> String {
    let end = path.find(|c: char| c == '?' || c == '#').unwrap_or(path.len());
    let bare = path[..end].trim_end_matches('/');
    if bare.starts_with('/') {
        bare.to_string()
    } else {
        format!("/{}", bare)
    }
}

/// Find the route for a location
pub fn find(path: &str) -> Option<&'static RouteEntry> {
    let path = normalize(path);
    ROUTES.iter().find(|r| r.path == path)
}

/// Find a route by its name (case-sensitive)
pub fn find_by_name(name: &str) -> Option<&'static RouteEntry> {
    ROUTES.iter().find(|r| r.name == name)
}

/// True for the login and registration pages
pub fn is_auth_page(path: &str) -> bool {
    let path = normalize(path);
    path == LOGIN_PATH || path == REGISTER_PATH
}
