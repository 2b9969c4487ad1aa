//! Job descriptor builder
//!
//! Produces the batch job submitted by the workflow: a single docker task that
//! copies `input.txt` from the mounted inputs directory into its published
//! outputs. Everything except the inputs path is static.

use skiff_core::domain::job::{
    InputSource, JOB_TYPE_BATCH, Job, ResourcesConfig, ResultPath, SpecConfig, Task,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Result, WorkflowError};

pub const JOB_NAME: &str = "copy-file-contents";
pub const JOB_NAMESPACE: &str = "default";
pub const JOB_PRIORITY: i32 = 50;

pub const ENGINE_DOCKER: &str = "docker";
pub const CONTAINER_IMAGE: &str = "ubuntu:latest";
pub const ENTRYPOINT: [&str; 3] = ["/bin/sh", "-c", "cat /tmp/input.txt > /outputs/output.txt"];

pub const SOURCE_LOCAL_DIRECTORY: &str = "localDirectory";
/// Where the inputs directory appears inside the container
pub const INPUT_TARGET: &str = "/tmp";

pub const PUBLISHER_LOCAL: &str = "local";
pub const OUTPUT_NAME: &str = "outputs";
/// Container directory whose contents are published as the job result
pub const OUTPUT_PATH: &str = "/outputs";

/// Resolves `inputs_dir` to an absolute path
///
/// Relative paths are joined onto the current working directory. Failing to
/// read the working directory is a [`WorkflowError::LocalEnvironment`] error.
pub fn resolve_inputs_path(inputs_dir: &Path) -> Result<PathBuf> {
    let path = if inputs_dir.is_absolute() {
        inputs_dir.to_path_buf()
    } else {
        let cwd =
            std::env::current_dir().map_err(|source| WorkflowError::LocalEnvironment {
                context: "failed to get current working directory".to_string(),
                source,
            })?;
        cwd.join(inputs_dir)
    };

    if !path.is_dir() {
        warn!(
            "Inputs path {} is not a directory on this machine",
            path.display()
        );
    }

    Ok(path)
}

/// Builds the job descriptor mounting `inputs_dir` read-write at [`INPUT_TARGET`]
pub fn build_job(inputs_dir: &Path) -> Result<Job> {
    let inputs_path = resolve_inputs_path(inputs_dir)?;
    debug!("Building job with inputs from {}", inputs_path.display());

    let engine = SpecConfig::new(ENGINE_DOCKER)
        .with_param("Image", CONTAINER_IMAGE)
        .with_param("Entrypoint", ENTRYPOINT.to_vec());

    let input = InputSource {
        source: SpecConfig::new(SOURCE_LOCAL_DIRECTORY)
            .with_param("SourcePath", inputs_path.to_string_lossy().into_owned())
            .with_param("ReadWrite", true),
        alias: String::new(),
        target: INPUT_TARGET.to_string(),
    };

    let task = Task {
        name: JOB_NAME.to_string(),
        engine,
        input_sources: vec![input],
        publisher: Some(SpecConfig::new(PUBLISHER_LOCAL)),
        result_paths: vec![ResultPath {
            name: OUTPUT_NAME.to_string(),
            path: OUTPUT_PATH.to_string(),
        }],
        resources: Some(ResourcesConfig {
            cpu: "0.5".to_string(),
            memory: "100m".to_string(),
            disk: String::new(),
            gpu: "0".to_string(),
        }),
    };

    Ok(Job {
        id: None,
        name: JOB_NAME.to_string(),
        namespace: JOB_NAMESPACE.to_string(),
        job_type: JOB_TYPE_BATCH.to_string(),
        count: 1,
        priority: JOB_PRIORITY,
        meta: HashMap::new(),
        labels: HashMap::new(),
        tasks: vec![task],
        state: None,
        version: 0,
        revision: 0,
        create_time: 0,
        modify_time: 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_path(job: &Job) -> PathBuf {
        let source = &job.tasks[0].input_sources[0].source;
        PathBuf::from(source.param_str("SourcePath").unwrap())
    }

    #[test]
    fn test_relative_inputs_become_absolute() {
        let job = build_job(Path::new("inputs")).unwrap();
        let path = source_path(&job);

        assert!(path.is_absolute());
        assert!(path.ends_with("inputs"));
        assert_eq!(path, std::env::current_dir().unwrap().join("inputs"));
    }

    #[test]
    fn test_absolute_inputs_kept() {
        let dir = tempfile::tempdir().unwrap();
        let job = build_job(dir.path()).unwrap();
        assert_eq!(source_path(&job), dir.path());
    }

    #[test]
    fn test_nested_relative_inputs_are_absolute() {
        for rel in ["a/b", "./data", "../sibling"] {
            let job = build_job(Path::new(rel)).unwrap();
            assert!(source_path(&job).is_absolute(), "{} was not made absolute", rel);
        }
    }

    #[test]
    fn test_static_task_configuration() {
        let job = build_job(Path::new("inputs")).unwrap();

        assert_eq!(job.name, JOB_NAME);
        assert_eq!(job.job_type, "batch");
        assert_eq!(job.count, 1);
        assert_eq!(job.priority, 50);
        assert_eq!(job.tasks.len(), 1);

        let task = &job.tasks[0];
        assert_eq!(task.engine.kind, "docker");
        assert_eq!(task.engine.param_str("Image"), Some("ubuntu:latest"));
        assert_eq!(
            task.engine.params["Entrypoint"],
            serde_json::json!(["/bin/sh", "-c", "cat /tmp/input.txt > /outputs/output.txt"])
        );

        let input = &task.input_sources[0];
        assert_eq!(input.source.kind, "localDirectory");
        assert_eq!(input.source.params["ReadWrite"], serde_json::json!(true));
        assert_eq!(input.target, "/tmp");

        assert_eq!(task.publisher.as_ref().unwrap().kind, "local");
        assert_eq!(task.result_paths[0].path, "/outputs");

        let resources = task.resources.as_ref().unwrap();
        assert_eq!(resources.cpu, "0.5");
        assert_eq!(resources.memory, "100m");
        assert_eq!(resources.gpu, "0");
    }
}
