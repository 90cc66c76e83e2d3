//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Collect routes per method in registration order
//! - Compose the middleware chain around every handler
//! - Look up the first matching route for a request and invoke it
//! - Send unmatched requests to the fallback handler, inside the same chain
//!
//! # Design Decisions
//! - Built once by `RouterBuilder`, immutable afterwards (thread-safe without locks)
//! - First registered middleware is the outermost wrapper
//! - First registered matching pattern wins, regardless of specificity
//! - Path parameters are passed to the handler as an argument

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;

use crate::routing::matcher::PathPattern;
use crate::routing::params::PathParams;

/// Future returned by a handler invocation.
pub type HandlerFuture = BoxFuture<'static, Response>;

/// Something that turns a request and its path parameters into a response.
///
/// Implemented for any `Fn(Request<Body>, PathParams) -> impl Future<Output = Response>`.
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: Request<Body>, params: PathParams) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request<Body>, PathParams) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, request: Request<Body>, params: PathParams) -> HandlerFuture {
        Box::pin(self(request, params))
    }
}

/// Shared, type-erased handler.
pub type BoxHandler = Arc<dyn Handler>;

/// Wraps a handler in another handler.
///
/// Implemented for any `Fn(BoxHandler) -> BoxHandler`.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxHandler) -> BoxHandler;
}

impl<F> Middleware for F
where
    F: Fn(BoxHandler) -> BoxHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxHandler) -> BoxHandler {
        self(next)
    }
}

struct Route {
    pattern: PathPattern,
    handler: BoxHandler,
}

/// Result of a successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    /// The registered pattern that matched.
    pub pattern: &'a str,
    pub params: PathParams,
}

/// Collects routes and middleware before freezing them into a [`Router`].
pub struct RouterBuilder {
    routes: HashMap<Method, Vec<Route>>,
    middleware: Vec<Arc<dyn Middleware>>,
    fallback: BoxHandler,
}

impl RouterBuilder {
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
            middleware: Vec::new(),
            fallback: Arc::new(|_req: Request<Body>, _params: PathParams| async {
                StatusCode::NOT_FOUND.into_response()
            }),
        }
    }

    /// Append a middleware; the first one added runs first on the way in.
    pub fn middleware(mut self, middleware: impl Middleware) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Register `handler` for `method` and `pattern`.
    ///
    /// Patterns are `/`-separated; a `{name}` segment captures one path segment.
    pub fn route(mut self, method: Method, pattern: &str, handler: impl Handler) -> Self {
        self.routes.entry(method).or_default().push(Route {
            pattern: PathPattern::new(pattern),
            handler: Arc::new(handler),
        });
        self
    }

    pub fn get(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::GET, pattern, handler)
    }

    pub fn post(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::POST, pattern, handler)
    }

    pub fn patch(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::PATCH, pattern, handler)
    }

    pub fn delete(self, pattern: &str, handler: impl Handler) -> Self {
        self.route(Method::DELETE, pattern, handler)
    }

    /// Handler for requests no route matches. Defaults to a bare 404.
    pub fn fallback(mut self, handler: impl Handler) -> Self {
        self.fallback = Arc::new(handler);
        self
    }

    /// Wrap every handler in the middleware chain and freeze the table.
    pub fn build(self) -> Router {
        let middleware = self.middleware;
        let wrap = |handler: BoxHandler| {
            middleware
                .iter()
                .rev()
                .fold(handler, |next, mw| mw.wrap(next))
        };

        let routes = self
            .routes
            .into_iter()
            .map(|(method, routes)| {
                let compiled = routes
                    .into_iter()
                    .map(|route| Route {
                        pattern: route.pattern,
                        handler: wrap(route.handler),
                    })
                    .collect();
                (method, compiled)
            })
            .collect();

        Router {
            routes,
            fallback: wrap(self.fallback),
        }
    }
}

impl Default for RouterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable method + path router.
pub struct Router {
    routes: HashMap<Method, Vec<Route>>,
    fallback: BoxHandler,
}

impl Router {
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    fn find(&self, method: &Method, path: &str) -> Option<(&Route, PathParams)> {
        self.routes
            .get(method)?
            .iter()
            .find_map(|route| route.pattern.matches(path).map(|params| (route, params)))
    }

    /// Find the route a request would be dispatched to, without running it.
    pub fn lookup(&self, method: &Method, path: &str) -> Option<RouteMatch<'_>> {
        self.find(method, path).map(|(route, params)| RouteMatch {
            pattern: route.pattern.as_str(),
            params,
        })
    }

    /// Run the request through the middleware chain and the matched handler,
    /// or the fallback when nothing matches.
    pub fn dispatch(&self, request: Request<Body>) -> HandlerFuture {
        match self.find(request.method(), request.uri().path()) {
            Some((route, params)) => route.handler.call(request, params),
            None => self.fallback.call(request, PathParams::new()),
        }
    }

    /// Number of registered routes across all methods.
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }
}
