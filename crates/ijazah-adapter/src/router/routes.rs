/*
[INPUT]:  Route declarations and navigation paths
[OUTPUT]: Matched routes with extracted path parameters
[POS]:    Router layer - route table and path matching
[UPDATE]: When pages are added or their access rules change
*/

use std::collections::HashMap;

use crate::types::Role;

pub const HOME_PATH: &str = "/";
pub const LOGIN_PATH: &str = "/login";

/// A navigable page and its access rules
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub name: String,
    pub path: String,
    pub requires_auth: bool,
    pub required_role: Option<Role>,
}

impl Route {
    /// Open to everyone
    pub fn public(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            requires_auth: false,
            required_role: None,
        }
    }

    pub fn requires_auth(mut self) -> Self {
        self.requires_auth = true;
        self
    }

    /// A role requirement implies authentication
    pub fn requires_role(mut self, role: Role) -> Self {
        self.requires_auth = true;
        self.required_role = Some(role);
        self
    }

    /// Match a concrete path, `:name` segments capture anything non-empty
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let pattern = segments(&self.path);
        let actual = segments(path);
        if pattern.len() != actual.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (expected, got) in pattern.iter().zip(actual.iter()) {
            if let Some(param) = expected.strip_prefix(':') {
                params.insert(param.to_string(), (*got).to_string());
            } else if expected != got {
                return None;
            }
        }
        Some(params)
    }
}

/// A resolved navigation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

impl RouteMatch<'_> {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Ordered route list; the first match wins
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    pub fn new(routes: Vec<Route>) -> Self {
        Self { routes }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn by_name(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Query string and fragment are ignored
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        self.routes.iter().find_map(|route| {
            route
                .matches(path)
                .map(|params| RouteMatch { route, params })
        })
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(vec![
            Route::public("home", HOME_PATH),
            Route::public("login", LOGIN_PATH),
            Route::public("admin-issue", "/admin/issue").requires_role(Role::Admin),
            Route::public("admin-revoke", "/admin/revoke").requires_role(Role::Admin),
            Route::public("verify", "/verify"),
            Route::public("explorer", "/explorer"),
            Route::public("certificate-detail", "/certificate/:id"),
        ])
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|segment| !segment.is_empty()).collect()
}
