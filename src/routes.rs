//! # Route Registration
//!
//! Route groups are registered last-discovered-first so that later components take precedence
//! over earlier ones, with one exception: catch-all components (order `9000..=9999`) are always
//! registered after every ordinary component, again in reverse discovery order.
//!
//! Given discovery order `O1, O2, C1, C2` (ordinary `O`, catch-all `C`) the registration order is
//! `O2, O1, C2, C1`.
//!
//! The [`RouteTable`] keeps groups in registration order. A request is offered to each group whose
//! prefix covers its path, in that order, and the first group with a route for it answers. A group
//! that has no such route passes the request on, so a catch-all group still receives whatever the
//! groups before it do not serve. Root groups answer only the routes they declare; a nested group
//! with its own fallback keeps every request under its prefix.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use tower::ServiceExt;

use crate::registry::ComponentDescriptor;

/// Prefix of every route group name.
pub const ROUTE_GROUP_PREFIX: &str = "bp_";

/// Largest request body replayed when several groups are tried for one request.
pub const MAX_REPLAYED_BODY: usize = 2 * 1024 * 1024;

/// Marks the response of a group that has no route for the request.
#[derive(Debug, Clone, Copy)]
struct Unmatched;

async fn unmatched() -> Response {
    let mut response = StatusCode::NOT_FOUND.into_response();
    response.extensions_mut().insert(Unmatched);
    response
}

/// Indices into `components` in registration order.
pub fn registration_order(components: &[ComponentDescriptor]) -> Vec<usize> {
    let (catch_all, ordinary): (Vec<usize>, Vec<usize>) =
        (0..components.len()).partition(|&idx| components[idx].dir_name.is_catch_all());
    ordinary
        .into_iter()
        .rev()
        .chain(catch_all.into_iter().rev())
        .collect()
}

/// Name of the route group a component directory registers.
pub fn route_group_name(dir_name: &str) -> String {
    format!("{}{}", ROUTE_GROUP_PREFIX, dir_name.replace(['.', '-'], "_"))
}

/// A mounted route group.
#[derive(Clone)]
pub struct RouteGroup {
    name: String,
    prefix: String,
    uuid: String,
    router: Router,
}

impl RouteGroup {
    /// A group serving `router` under `prefix` for the component `uuid`.
    ///
    /// Fails when `prefix` cannot be a mount point: wildcards are rejected.
    pub fn new(name: String, prefix: &str, uuid: &str, router: Router) -> Result<Self, String> {
        let prefix = normalize_prefix(prefix);
        if prefix.contains('*') {
            return Err(format!("route prefix '{}' contains a wildcard", prefix));
        }
        Ok(Self {
            name,
            prefix,
            uuid: uuid.to_string(),
            router,
        })
    }

    /// The group name, `bp_<dirname>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The mount prefix without trailing slash; empty for the root.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Uuid of the owning component.
    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    /// True when `path` is the prefix itself or lies below it.
    pub fn matches(&self, path: &str) -> bool {
        if self.prefix.is_empty() {
            return true;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    fn into_service(self) -> Router {
        if self.prefix.is_empty() {
            self.router.fallback(unmatched)
        } else {
            Router::new()
                .nest(&self.prefix, self.router)
                .fallback(unmatched)
        }
    }
}

impl fmt::Debug for RouteGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteGroup")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("uuid", &self.uuid)
            .finish()
    }
}

fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{}", trimmed)
    }
}

/// Route groups in registration order.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    groups: Vec<RouteGroup>,
}

impl RouteTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a group; groups mounted earlier win.
    pub fn mount(&mut self, group: RouteGroup) {
        tracing::debug!(name = group.name(), prefix = group.prefix(), "route group mounted");
        self.groups.push(group);
    }

    /// Groups whose prefix covers `path`, in the order they are tried.
    pub fn candidates<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a RouteGroup> + 'a {
        self.groups.iter().filter(move |group| group.matches(path))
    }

    /// Mounted groups in registration order.
    pub fn groups(&self) -> &[RouteGroup] {
        &self.groups
    }

    /// Group names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(RouteGroup::name).collect()
    }

    /// Number of mounted groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// True when nothing is mounted.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// An axum router offering every request to the matching groups in registration order.
    ///
    /// Requests no group serves get `404 Not Found`.
    pub fn into_router(self) -> Router {
        let dispatch: Arc<Vec<RouteGroup>> = Arc::new(self.groups);
        let services: Arc<Vec<Router>> =
            Arc::new(dispatch.iter().cloned().map(RouteGroup::into_service).collect());
        Router::new().fallback(move |request: Request<Body>| {
            let dispatch = Arc::clone(&dispatch);
            let services = Arc::clone(&services);
            async move {
                let path = request.uri().path().to_string();
                let candidates: Vec<usize> = (0..dispatch.len())
                    .filter(|&idx| dispatch[idx].matches(&path))
                    .collect();
                match candidates.as_slice() {
                    [] => StatusCode::NOT_FOUND.into_response(),
                    [only] => finish(call(&services[*only], request).await),
                    _ => dispatch_in_order(&services, &candidates, request).await,
                }
            }
        })
    }
}

async fn call(service: &Router, request: Request<Body>) -> Response {
    let result: Result<Response, Infallible> = service.clone().oneshot(request).await;
    match result {
        Ok(response) => response,
        Err(never) => match never {},
    }
}

fn finish(mut response: Response) -> Response {
    response.extensions_mut().remove::<Unmatched>();
    response
}

fn rebuild(parts: &Parts, body: &axum::body::Bytes) -> Request<Body> {
    Request::from_parts(parts.clone(), Body::from(body.clone()))
}

async fn dispatch_in_order(
    services: &[Router],
    candidates: &[usize],
    request: Request<Body>,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_REPLAYED_BODY).await {
        Ok(body) => body,
        Err(e) => {
            tracing::debug!(error = %e, "request body not replayable");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    for &idx in candidates {
        let response = call(&services[idx], rebuild(&parts, &body)).await;
        if response.extensions().get::<Unmatched>().is_none() {
            return response;
        }
    }
    StatusCode::NOT_FOUND.into_response()
}
