use std::fs;
use std::path::{Path, PathBuf};

use stagehand_core::compiler::{Compiler, CompilerConfig};
use stagehand_core::invoke::Invoker;
use stagehand_core::pipeline::StagePipeline;
use stagehand_core::service::{DeployableUnit, SELF_MODULE_EXCLUDE, ServiceDefinition};
use stagehand_core::session::{BuildSession, DEPS_DIR, MANIFEST_FILE, OUTPUT_DIR};

fn write_file(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create_dir_all should succeed in test temp dirs");
    }
    fs::write(path, content).expect("write should succeed in test temp dirs");
}

/// Compiles each entry file into `<out_dir>/<stem>.out`.
struct FakeCompiler;

impl Compiler for FakeCompiler {
    fn load_config(&self, root: &Path) -> anyhow::Result<CompilerConfig> {
        Ok(CompilerConfig::new(root.join("out")))
    }

    fn extract_entry_files(
        &self,
        root: &Path,
        _unit_kind: &str,
        units: &[DeployableUnit],
    ) -> anyhow::Result<Vec<PathBuf>> {
        Ok(units.iter().map(|u| root.join(&u.entry)).collect())
    }

    fn run(
        &self,
        entry_files: &[PathBuf],
        config: &CompilerConfig,
    ) -> anyhow::Result<Vec<PathBuf>> {
        fs::create_dir_all(&config.out_dir)?;
        let mut emitted = Vec::new();
        for entry in entry_files {
            let stem = entry
                .file_stem()
                .ok_or_else(|| anyhow::anyhow!("entry without stem: {}", entry.display()))?;
            let out = config.out_dir.join(format!("{}.out", stem.to_string_lossy()));
            fs::write(&out, "compiled")?;
            emitted.push(out);
        }
        Ok(emitted)
    }
}

struct NoopInvoker;

impl Invoker for NoopInvoker {
    fn unload(&mut self, _compiled: &Path) -> anyhow::Result<()> {
        Ok(())
    }

    fn invoke(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

fn project(root: &Path) {
    write_file(&root.join("src").join("alpha.src"), "entry");
    write_file(&root.join(DEPS_DIR).join("lib").join("lib.src"), "dep");
    write_file(&root.join(MANIFEST_FILE), "[deps]\n");
    write_file(&root.join("assets").join("logo.png"), "png");
}

fn pipeline_for(root: &Path) -> StagePipeline<FakeCompiler, NoopInvoker> {
    let mut unit = DeployableUnit::new("alpha", "src/alpha.src");
    unit.rules.include.push("assets/**/*".to_string());
    let service = ServiceDefinition {
        units: vec![unit],
        ..Default::default()
    };
    StagePipeline::new(FakeCompiler, NoopInvoker, service, BuildSession::new(root))
}

#[test]
fn compile_and_stage_populates_staging() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    project(tmp.path());
    let mut pipeline = pipeline_for(tmp.path());
    pipeline.prepare();

    let emitted = pipeline.compile_and_stage().expect("staging should succeed");

    let staging = tmp.path().join(".build");
    assert_eq!(emitted, vec![staging.join("alpha.out")]);
    assert!(staging.join("alpha.out").is_file());
    assert!(staging.join("assets").join("logo.png").is_file());
    assert!(staging.join(DEPS_DIR).join("lib").join("lib.src").is_file());
    assert!(staging.join(MANIFEST_FILE).is_file());

    // Redirection is active and idempotent under repetition.
    assert_eq!(pipeline.session().active_root(), staging.as_path());
    pipeline
        .compile_and_stage()
        .expect("repeat staging should succeed");
    assert_eq!(pipeline.session().active_root(), staging.as_path());
    assert_eq!(pipeline.session().source_root(), tmp.path());
}

#[test]
fn prepare_injects_self_exclude() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    let mut pipeline = pipeline_for(tmp.path());
    pipeline.prepare();
    pipeline.prepare();

    let excludes = &pipeline.service().units[0].rules.exclude;
    assert_eq!(
        excludes.iter().filter(|e| *e == SELF_MODULE_EXCLUDE).count(),
        1
    );
}

#[test]
fn relocate_and_cleanup_restores_root_and_deletes_staging() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    project(tmp.path());
    let mut pipeline = pipeline_for(tmp.path());
    pipeline.compile_and_stage().expect("staging should succeed");

    // External packager output inside staging.
    let staged_artifact = tmp
        .path()
        .join(".build")
        .join(OUTPUT_DIR)
        .join("alpha.zip");
    write_file(&staged_artifact, "zip");
    pipeline.service_mut().units[0].artifact_path = Some(staged_artifact);

    pipeline
        .relocate_and_cleanup()
        .expect("cleanup should succeed");

    assert_eq!(pipeline.session().active_root(), tmp.path());
    assert!(!tmp.path().join(".build").exists());
    assert!(tmp.path().join(OUTPUT_DIR).join("alpha.zip").is_file());
    // Deleting staging must never reach through links into the source tree.
    assert!(tmp.path().join(DEPS_DIR).join("lib").join("lib.src").is_file());
    // Monolithic topology: the unit keeps its rewritten path only if it
    // was the rewrite target; with no selection and no individual flag
    // the service-level slot is the target, which was empty here.
    assert_eq!(
        pipeline.service().units[0].artifact_path,
        Some(
            tmp.path()
                .join(".build")
                .join(OUTPUT_DIR)
                .join("alpha.zip")
        )
    );
}

#[test]
fn failed_relocation_leaves_staging_and_redirect_intact() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    project(tmp.path());
    let mut pipeline = pipeline_for(tmp.path());
    pipeline.compile_and_stage().expect("staging should succeed");

    write_file(
        &tmp.path().join(".build").join(OUTPUT_DIR).join("alpha.zip"),
        "zip",
    );
    // A plain file squatting on the relocation target makes the output
    // copy fail.
    write_file(&tmp.path().join(OUTPUT_DIR), "squatter");

    let err = pipeline
        .relocate_and_cleanup()
        .expect_err("relocation should fail");
    assert!(err.to_string().contains("Failed to create directory"));

    // Staging untouched, redirect still active.
    assert!(tmp.path().join(".build").join("alpha.out").is_file());
    assert_eq!(
        pipeline.session().active_root(),
        tmp.path().join(".build").as_path()
    );
}

#[test]
fn packaging_mode_copies_dependency_tree() {
    let tmp = tempfile::tempdir().expect("tempdir should succeed");
    project(tmp.path());
    let mut pipeline = pipeline_for(tmp.path());

    pipeline
        .compile_and_stage_for_packaging()
        .expect("packaging staging should succeed");

    let staged_deps = tmp.path().join(".build").join(DEPS_DIR);
    let meta = fs::symlink_metadata(&staged_deps).expect("staged deps should exist");
    assert!(meta.is_dir());
    assert!(!meta.file_type().is_symlink());
}
