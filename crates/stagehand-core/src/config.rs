//! Loading the service definition from `stagehand.toml`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::service::ServiceDefinition;

/// Config file name looked up under the project root.
pub const CONFIG_FILE: &str = "stagehand.toml";

/// Load the service definition for a project root.
///
/// A missing config file yields the default (empty) definition; a file
/// that exists but does not parse is an error.
pub fn load_service_definition(project_root: &Path) -> Result<ServiceDefinition> {
    let path = project_root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(ServiceDefinition::default());
    }
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_service_definition(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

pub fn parse_service_definition(content: &str) -> Result<ServiceDefinition> {
    let service: ServiceDefinition = toml::from_str(content)?;
    Ok(service)
}
