//! Simulated resources and the identity attached to their metrics

use std::fmt;
use std::sync::Arc;

use crate::config::IdentityConfig;

/// Attribute key carrying the resource name
pub const DEPLOYMENT_ENVIRONMENT: &str = "deployment.environment";
pub const SERVICE_NAME: &str = "service.name";
pub const SERVICE_VERSION: &str = "service.version";

/// A simulated service or environment, immutable once configured
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    name: Arc<str>,
}

impl Resource {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Identity attributes attached to every instrument created for a resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceIdentity {
    pub resource: Resource,
    pub service_name: String,
    pub service_version: String,
}

impl ResourceIdentity {
    pub fn new(resource: Resource, config: &IdentityConfig) -> Self {
        Self {
            resource,
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
        }
    }

    /// Attribute set as key/value pairs
    pub fn attributes(&self) -> Vec<(&'static str, String)> {
        vec![
            (SERVICE_NAME, self.service_name.clone()),
            (SERVICE_VERSION, self.service_version.clone()),
            (DEPLOYMENT_ENVIRONMENT, self.resource.name().to_string()),
        ]
    }

    /// Instrumentation scope name for the resource's meter
    pub fn meter_name(&self) -> String {
        format!("meter-{}", self.resource.name().to_lowercase())
    }
}
