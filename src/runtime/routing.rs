//! Route table mapping inbound requests onto the invocation pipeline.

use crate::http::Method;

/// HTTP method accepted by a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl RouteMethod {
    /// Methods the function endpoint accepts.
    pub const FUNCTION: [RouteMethod; 5] = [
        RouteMethod::Get,
        RouteMethod::Put,
        RouteMethod::Post,
        RouteMethod::Patch,
        RouteMethod::Delete,
    ];

    /// Check if this method matches the given request method.
    pub fn matches(&self, method: &Method) -> bool {
        matches!(
            (self, method),
            (RouteMethod::Get, Method::Get)
                | (RouteMethod::Post, Method::Post)
                | (RouteMethod::Put, Method::Put)
                | (RouteMethod::Delete, Method::Delete)
                | (RouteMethod::Patch, Method::Patch)
        )
    }
}

/// A path pattern plus the methods it accepts.
///
/// Patterns are exact (`/health`) or end in `/**`, which matches the
/// prefix itself and anything below it. `/**` matches every path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub methods: Vec<RouteMethod>,
}

impl Route {
    /// Create a new route.
    pub fn new(methods: impl IntoIterator<Item = RouteMethod>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: methods.into_iter().collect(),
        }
    }

    /// Check if the path pattern matches.
    pub fn matches_path(&self, path: &str) -> bool {
        match self.path.strip_suffix("/**") {
            Some(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix)
                        .is_some_and(|rest| rest.starts_with('/'))
            }
            None => self.path == path,
        }
    }

    /// Check if this route matches the given path and method.
    pub fn matches(&self, path: &str, method: &Method) -> bool {
        self.matches_path(path) && self.methods.iter().any(|m| m.matches(method))
    }
}

/// Outcome of a route lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    Found(&'a Route),
    MethodNotAllowed,
    NotFound,
}

/// Routes checked in insertion order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
}

impl RouteTable {
    /// Create an empty route table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The single catch-all route serving the handler:
    /// `GET, PUT, POST, PATCH, DELETE /**`.
    pub fn function() -> Self {
        Self::new().route(Route::new(RouteMethod::FUNCTION, "/**"))
    }

    /// Add a route to the table.
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Find the route for a request.
    pub fn find(&self, path: &str, method: &Method) -> RouteMatch<'_> {
        if let Some(route) = self.routes.iter().find(|r| r.matches(path, method)) {
            return RouteMatch::Found(route);
        }
        if self.routes.iter().any(|r| r.matches_path(path)) {
            RouteMatch::MethodNotAllowed
        } else {
            RouteMatch::NotFound
        }
    }

    /// List all routes.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_method_matches() {
        assert!(RouteMethod::Get.matches(&Method::Get));
        assert!(!RouteMethod::Get.matches(&Method::Post));
        assert!(!RouteMethod::FUNCTION
            .iter()
            .any(|m| m.matches(&Method::Other("PURGE".to_string()))));
    }

    #[test]
    fn test_route_exact_match() {
        let route = Route::new([RouteMethod::Get], "/api/users");

        assert!(route.matches("/api/users", &Method::Get));
        assert!(!route.matches("/api/users", &Method::Post));
        assert!(!route.matches("/api/users/1", &Method::Get));
    }

    #[test]
    fn test_route_wildcard_match() {
        let route = Route::new([RouteMethod::Get], "/api/**");

        assert!(route.matches("/api", &Method::Get));
        assert!(route.matches("/api/users", &Method::Get));
        assert!(route.matches("/api/users/1", &Method::Get));
        assert!(!route.matches("/apiary", &Method::Get));
        assert!(!route.matches("/other", &Method::Get));
    }

    #[test]
    fn test_function_table_catch_all() {
        let table = RouteTable::function();

        for method in [Method::Get, Method::Put, Method::Post, Method::Patch, Method::Delete] {
            assert!(matches!(table.find("/", &method), RouteMatch::Found(_)));
            assert!(matches!(table.find("/foo/bar", &method), RouteMatch::Found(_)));
        }
        assert_eq!(table.find("/foo", &Method::Head), RouteMatch::MethodNotAllowed);
        assert_eq!(table.find("/", &Method::Options), RouteMatch::MethodNotAllowed);
    }

    #[test]
    fn test_route_table_not_found() {
        let table = RouteTable::new().route(Route::new(RouteMethod::FUNCTION, "/only"));
        assert_eq!(table.find("/elsewhere", &Method::Get), RouteMatch::NotFound);
        assert_eq!(table.routes().len(), 1);
    }
}
