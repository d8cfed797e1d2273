//! API descriptor registry
//!
//! A descriptor is the static declaration of one backend operation:
//! URI template, verb, and any fixed parameters the operation always
//! carries. Descriptors are grouped into named modules and loaded into
//! a registry once at startup; nothing mutates them afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ApiError, Result};
use crate::model::{HeaderMap, JsonObject, ParamMap, ParamValue, RequestMethod};

/// Static declaration of one API operation
#[derive(Clone, Debug)]
pub struct ApiDescriptor {
    /// URI template with `{name}` path placeholders
    pub uri: String,
    pub method: RequestMethod,
    /// Query parameters merged under every call's own parameters
    pub fixed_params: ParamMap,
    /// Body fields merged under every call's own body (POST/PUT only)
    pub fixed_data: Option<JsonObject>,
    /// Headers merged under every call's own headers
    pub fixed_headers: HeaderMap,
    /// Marker for operations whose payload is transported encrypted
    pub is_encrypt: bool,
}

impl ApiDescriptor {
    pub fn new(method: RequestMethod, uri: &str) -> Self {
        Self {
            uri: uri.to_string(),
            method,
            fixed_params: ParamMap::new(),
            fixed_data: None,
            fixed_headers: HeaderMap::new(),
            is_encrypt: false,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(RequestMethod::Get, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(RequestMethod::Post, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(RequestMethod::Put, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(RequestMethod::Delete, uri)
    }

    pub fn with_fixed_param(mut self, key: &str, value: impl Into<ParamValue>) -> Self {
        self.fixed_params.insert(key.to_string(), value.into());
        self
    }

    pub fn with_fixed_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.fixed_data
            .get_or_insert_with(JsonObject::new)
            .insert(key.to_string(), value);
        self
    }

    pub fn with_fixed_header(mut self, key: &str, value: &str) -> Self {
        self.fixed_headers
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn encrypted(mut self) -> Self {
        self.is_encrypt = true;
        self
    }
}

/// Named group of operations
#[derive(Clone, Debug)]
pub struct ApiModule {
    name: String,
    operations: HashMap<String, Arc<ApiDescriptor>>,
}

impl ApiModule {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            operations: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(mut self, name: &str, descriptor: ApiDescriptor) -> Self {
        self.operations
            .insert(name.to_string(), Arc::new(descriptor));
        self
    }
}

/// Process-wide descriptor table, queried by `module.operation` key
#[derive(Default)]
pub struct ApiRegistry {
    modules: HashMap<String, ApiModule>,
}

impl ApiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a module; a module installed twice replaces the first
    pub fn register(mut self, module: ApiModule) -> Self {
        self.modules.insert(module.name().to_string(), module);
        self
    }

    /// Look up a descriptor by its `module.operation` namespace key
    pub fn lookup(&self, namespace: &str) -> Result<Arc<ApiDescriptor>> {
        let (module, operation) = namespace
            .split_once('.')
            .ok_or_else(|| ApiError::UnknownOperation(namespace.to_string()))?;

        self.modules
            .get(module)
            .and_then(|m| m.operations.get(operation))
            .cloned()
            .ok_or_else(|| ApiError::UnknownOperation(namespace.to_string()))
    }
}
