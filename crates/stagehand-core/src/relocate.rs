//! Relocation of packaged artifacts back to the original root.

use std::path::Path;

use tracing::debug;

use crate::fs::copy_tree;
use crate::service::ServiceDefinition;
use crate::session::BuildSession;

/// Which artifact-path rewrite strategy applies to a relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagingTopology {
    /// One unit explicitly selected for this session.
    SingleUnit(String),
    /// Every declared unit packaged separately.
    Individual,
    /// One shared artifact for the whole service.
    Monolithic,
}

/// Determine the packaging topology for a session.
///
/// Precedence: SingleUnit > Individual > Monolithic. A selected unit
/// wins even when the service is also configured for individual
/// packaging.
pub fn determine_topology(
    session: &BuildSession,
    service: &ServiceDefinition,
) -> PackagingTopology {
    if let Some(name) = session.selected_unit() {
        PackagingTopology::SingleUnit(name.to_string())
    } else if service.package_individually {
        PackagingTopology::Individual
    } else {
        PackagingTopology::Monolithic
    }
}

/// Copy packaged output out of staging and rewrite artifact paths.
///
/// The packaged-output subfolder is mirrored from staging to the
/// original root; an absent subfolder is tolerated (nothing was
/// packaged). Each rewrite keeps the artifact's file basename and only
/// swaps the directory prefix for the relocated output directory.
pub fn relocate(session: &BuildSession, service: &mut ServiceDefinition) -> anyhow::Result<()> {
    let staged_output = session.staging_output_dir();
    let relocated_output = session.original_output_dir();

    if staged_output.exists() {
        copy_tree(&staged_output, &relocated_output)?;
    } else {
        debug!(path = %staged_output.display(), "no packaged output to relocate");
    }

    match determine_topology(session, service) {
        PackagingTopology::SingleUnit(name) => {
            let unit = service.unit_mut(&name).ok_or_else(|| {
                anyhow::anyhow!("Selected unit is not declared by the service: {name}")
            })?;
            rewrite_artifact_path(&mut unit.artifact_path, &relocated_output);
        }
        PackagingTopology::Individual => {
            for unit in &mut service.units {
                rewrite_artifact_path(&mut unit.artifact_path, &relocated_output);
            }
        }
        PackagingTopology::Monolithic => {
            rewrite_artifact_path(&mut service.artifact_path, &relocated_output);
        }
    }

    Ok(())
}

fn rewrite_artifact_path(slot: &mut Option<std::path::PathBuf>, output_dir: &Path) {
    let basename = slot
        .as_ref()
        .and_then(|previous| previous.file_name())
        .map(|name| name.to_os_string());
    if let Some(basename) = basename {
        *slot = Some(output_dir.join(basename));
    }
}
