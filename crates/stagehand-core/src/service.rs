//! Service definition: deployable units and their packaging rules.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Path of this plugin's own module inside the dependency tree.
///
/// Injected into every unit's exclude list by [`ServiceDefinition::prepare`]
/// so the plugin never packages itself.
pub const SELF_MODULE_EXCLUDE: &str = "vendor/stagehand/**";

/// Include/exclude globs controlling what the packager picks up for a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRules {
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// One independently packageable build target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployableUnit {
    pub name: String,
    /// Entry source file, relative to the project root.
    pub entry: String,
    #[serde(default)]
    pub rules: PackageRules,
    /// Populated by relocation after the external packager has run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
}

impl DeployableUnit {
    pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            rules: PackageRules::default(),
            artifact_path: None,
        }
    }
}

fn default_unit_kind() -> String {
    "function".to_string()
}

/// The whole service as declared by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    #[serde(default)]
    pub units: Vec<DeployableUnit>,
    /// When set, every unit is packaged into its own artifact.
    #[serde(default)]
    pub package_individually: bool,
    /// Service-wide include globs, staged alongside per-unit includes.
    #[serde(default)]
    pub include: Vec<String>,
    /// Tag passed to the compiler when extracting entry files.
    #[serde(default = "default_unit_kind")]
    pub unit_kind: String,
    /// Service-level artifact, populated by relocation under monolithic
    /// packaging.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact_path: Option<PathBuf>,
}

impl Default for ServiceDefinition {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            package_individually: false,
            include: Vec::new(),
            unit_kind: default_unit_kind(),
            artifact_path: None,
        }
    }
}

impl ServiceDefinition {
    /// Inject this plugin's own module path into every unit's exclude list.
    ///
    /// Idempotent: an exclude already present is not duplicated.
    pub fn prepare(&mut self) {
        for unit in &mut self.units {
            if !unit.rules.exclude.iter().any(|e| e == SELF_MODULE_EXCLUDE) {
                unit.rules.exclude.push(SELF_MODULE_EXCLUDE.to_string());
            }
        }
    }

    pub fn unit(&self, name: &str) -> Option<&DeployableUnit> {
        self.units.iter().find(|u| u.name == name)
    }

    pub fn unit_mut(&mut self, name: &str) -> Option<&mut DeployableUnit> {
        self.units.iter_mut().find(|u| u.name == name)
    }

    /// Include globs relevant for staging: service-wide ones plus the
    /// per-unit ones, limited to the selected unit when one is set.
    pub fn include_globs(&self, selected_unit: Option<&str>) -> Vec<String> {
        let mut globs: Vec<String> = self.include.clone();
        let units: Box<dyn Iterator<Item = &DeployableUnit> + '_> = match selected_unit {
            Some(name) => Box::new(self.units.iter().filter(move |u| u.name == name)),
            None => Box::new(self.units.iter()),
        };
        for unit in units {
            for pattern in &unit.rules.include {
                if !globs.iter().any(|g| g == pattern) {
                    globs.push(pattern.clone());
                }
            }
        }
        globs
    }
}
