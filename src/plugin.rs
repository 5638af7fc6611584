//! # Component Plugins
//!
//! Components contribute behavior through two optional hooks, registered in code and looked up
//! by component uuid:
//!
//! - an **init hook** runs once per component in discovery order. It receives the component's
//!   schema fragment mutably and the global tree read-only; whatever it leaves in the fragment is
//!   merged back into the tree.
//! - a **route hook** is asked for the component's route group. Returning `Ok(None)` registers
//!   nothing.
//!
//! Hooks are plain closures or any type implementing [`InitHook`] / [`RouteHook`]:
//!
//! ```rust
//! use assemblage::{ComponentPlugin, PluginTable};
//! use axum::{Router, routing::get};
//! use serde_json::Value;
//!
//! let plugin = ComponentPlugin::new()
//!     .with_init(|_component, fragment, _schema| {
//!         fragment.insert("ready".to_string(), Value::Bool(true));
//!         Ok(())
//!     })
//!     .with_routes(|_component, _fragment, _schema| {
//!         Ok(Some(Router::new().route("/hello", get(|| async { "hello" }))))
//!     });
//!
//! let mut plugins = PluginTable::new();
//! plugins.register("hellocomp_0yt2sa", plugin);
//! assert!(plugins.get("hellocomp_0yt2sa").is_some());
//! ```

use std::collections::BTreeMap;
use std::fmt;

use axum::Router;
use serde_json::{Map, Value};

use crate::errors::HookError;
use crate::registry::ComponentDescriptor;
use crate::schema::GlobalSchema;

/// Per-component initialization.
pub trait InitHook: Send + Sync {
    /// Mutates the component's schema fragment.
    fn init(
        &self,
        component: &ComponentDescriptor,
        fragment: &mut Map<String, Value>,
        schema: &GlobalSchema,
    ) -> Result<(), HookError>;
}

impl<F> InitHook for F
where
    F: Fn(&ComponentDescriptor, &mut Map<String, Value>, &GlobalSchema) -> Result<(), HookError>
        + Send
        + Sync,
{
    fn init(
        &self,
        component: &ComponentDescriptor,
        fragment: &mut Map<String, Value>,
        schema: &GlobalSchema,
    ) -> Result<(), HookError> {
        self(component, fragment, schema)
    }
}

/// Per-component route group construction.
pub trait RouteHook: Send + Sync {
    /// Builds the component's routes, relative to its manifest `route` prefix.
    fn routes(
        &self,
        component: &ComponentDescriptor,
        fragment: &Map<String, Value>,
        schema: &GlobalSchema,
    ) -> Result<Option<Router>, HookError>;
}

impl<F> RouteHook for F
where
    F: Fn(&ComponentDescriptor, &Map<String, Value>, &GlobalSchema) -> Result<Option<Router>, HookError>
        + Send
        + Sync,
{
    fn routes(
        &self,
        component: &ComponentDescriptor,
        fragment: &Map<String, Value>,
        schema: &GlobalSchema,
    ) -> Result<Option<Router>, HookError> {
        self(component, fragment, schema)
    }
}

/// The hooks of one component. Both are optional.
#[derive(Default)]
pub struct ComponentPlugin {
    init: Option<Box<dyn InitHook>>,
    routes: Option<Box<dyn RouteHook>>,
}

impl ComponentPlugin {
    /// A plugin without hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the init hook from a closure.
    pub fn with_init<F>(self, hook: F) -> Self
    where
        F: Fn(&ComponentDescriptor, &mut Map<String, Value>, &GlobalSchema) -> Result<(), HookError>
            + Send
            + Sync
            + 'static,
    {
        self.with_init_hook(hook)
    }

    /// Sets the init hook.
    pub fn with_init_hook(mut self, hook: impl InitHook + 'static) -> Self {
        self.init = Some(Box::new(hook));
        self
    }

    /// Sets the route hook from a closure.
    pub fn with_routes<F>(self, hook: F) -> Self
    where
        F: Fn(
                &ComponentDescriptor,
                &Map<String, Value>,
                &GlobalSchema,
            ) -> Result<Option<Router>, HookError>
            + Send
            + Sync
            + 'static,
    {
        self.with_route_hook(hook)
    }

    /// Sets the route hook.
    pub fn with_route_hook(mut self, hook: impl RouteHook + 'static) -> Self {
        self.routes = Some(Box::new(hook));
        self
    }

    /// The init hook, if any.
    pub fn init_hook(&self) -> Option<&dyn InitHook> {
        self.init.as_deref()
    }

    /// The route hook, if any.
    pub fn route_hook(&self) -> Option<&dyn RouteHook> {
        self.routes.as_deref()
    }
}

impl fmt::Debug for ComponentPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentPlugin")
            .field("init", &self.init.is_some())
            .field("routes", &self.routes.is_some())
            .finish()
    }
}

/// Plugins keyed by component uuid.
#[derive(Debug, Default)]
pub struct PluginTable {
    plugins: BTreeMap<String, ComponentPlugin>,
}

impl PluginTable {
    /// An empty table; every component runs without hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the plugin for `uuid`, returning the one it replaces.
    pub fn register(&mut self, uuid: &str, plugin: ComponentPlugin) -> Option<ComponentPlugin> {
        self.plugins.insert(uuid.to_string(), plugin)
    }

    /// The plugin for `uuid`.
    pub fn get(&self, uuid: &str) -> Option<&ComponentPlugin> {
        self.plugins.get(uuid)
    }

    /// The init hook for `uuid`.
    pub fn init_hook(&self, uuid: &str) -> Option<&dyn InitHook> {
        self.get(uuid).and_then(ComponentPlugin::init_hook)
    }

    /// The route hook for `uuid`.
    pub fn route_hook(&self, uuid: &str) -> Option<&dyn RouteHook> {
        self.get(uuid).and_then(ComponentPlugin::route_hook)
    }

    /// Registered uuids in ascending order.
    pub fn uuids(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// True when no plugin is registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
