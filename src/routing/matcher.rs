//! Route matching module
//!
//! Matches a request path against templates such as
//! `/person/detail/{person_id}` and picks the route for the method.

use hyper::Method;
use percent_encoding::percent_decode_str;

/// Path parameters captured by a template, in template order
pub type PathParams = Vec<(String, String)>;

/// Match `path` against `template`, capturing `{name}` segments.
///
/// Captured segments are percent-decoded; invalid UTF-8 is replaced, not rejected.
pub fn match_template(template: &str, path: &str) -> Option<PathParams> {
    let mut params = Vec::new();
    let mut wanted = template.split('/');
    let mut given = path.split('/');

    loop {
        match (wanted.next(), given.next()) {
            (None, None) => return Some(params),
            (Some(w), Some(g)) => {
                if let Some(name) = w.strip_prefix('{').and_then(|n| n.strip_suffix('}')) {
                    if g.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(g).decode_utf8_lossy();
                    params.push((name.to_string(), value.into_owned()));
                } else if w != g {
                    return None;
                }
            }
            _ => return None,
        }
    }
}

struct Route<T> {
    method: Method,
    template: &'static str,
    target: T,
}

/// Outcome of a route lookup
#[derive(Debug, PartialEq, Eq)]
pub enum RouteMatch<'a, T> {
    Found { target: &'a T, params: PathParams },
    /// The path exists, but not for this method
    MethodNotAllowed { allow: Vec<Method> },
    NotFound,
}

/// Ordered list of routes; the first template matching path and method wins
pub struct RouteTable<T> {
    routes: Vec<Route<T>>,
}

impl<T> RouteTable<T> {
    pub const fn new() -> Self {
        Self { routes: Vec::new() }
    }

    #[must_use]
    pub fn route(mut self, method: Method, template: &'static str, target: T) -> Self {
        self.routes.push(Route {
            method,
            template,
            target,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn lookup(&self, method: &Method, path: &str) -> RouteMatch<'_, T> {
        let mut allow = Vec::new();
        for route in &self.routes {
            let Some(params) = match_template(route.template, path) else {
                continue;
            };
            if route.method == *method {
                return RouteMatch::Found {
                    target: &route.target,
                    params,
                };
            }
            if !allow.contains(&route.method) {
                allow.push(route.method.clone());
            }
        }

        if allow.is_empty() {
            RouteMatch::NotFound
        } else {
            RouteMatch::MethodNotAllowed { allow }
        }
    }
}

impl<T> Default for RouteTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
