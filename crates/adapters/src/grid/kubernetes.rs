// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes executor: renders a batch/v1 Job manifest per task and drives
//! it with `kubectl`.

use crate::error::ExecutorError;
use crate::executor::{ExecHandle, ExecStatus, Executor, TaskPaths};
use async_trait::async_trait;
use regex::Regex;
use rflow_core::TaskRun;
use serde::Serialize;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;

const DEFAULT_IMAGE: &str = "ubuntu:22.04";

/// Regex matching any run of characters not valid in a Kubernetes job name.
#[allow(clippy::expect_used)]
static INVALID_JOB_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9-]+").expect("constant regex pattern is valid"));

#[derive(Serialize)]
struct JobManifest {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    metadata: Metadata,
    spec: JobSpec,
}

#[derive(Serialize)]
struct Metadata {
    name: String,
}

#[derive(Serialize)]
struct JobSpec {
    #[serde(rename = "backoffLimit")]
    backoff_limit: u32,
    template: PodTemplate,
}

#[derive(Serialize)]
struct PodTemplate {
    spec: PodSpec,
}

#[derive(Serialize)]
struct PodSpec {
    containers: Vec<Container>,
    volumes: Vec<Volume>,
    #[serde(rename = "restartPolicy")]
    restart_policy: &'static str,
}

#[derive(Serialize)]
struct Container {
    name: &'static str,
    image: String,
    command: Vec<String>,
    resources: Resources,
    #[serde(rename = "volumeMounts")]
    volume_mounts: Vec<VolumeMount>,
}

#[derive(Serialize)]
struct Resources {
    limits: ResourceQuantities,
    requests: ResourceQuantities,
}

#[derive(Serialize, Default)]
struct ResourceQuantities {
    #[serde(skip_serializing_if = "Option::is_none")]
    cpu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    memory: Option<String>,
}

#[derive(Serialize)]
struct Volume {
    name: &'static str,
    #[serde(rename = "hostPath")]
    host_path: HostPath,
}

#[derive(Serialize)]
struct HostPath {
    path: String,
}

#[derive(Serialize)]
struct VolumeMount {
    name: &'static str,
    #[serde(rename = "mountPath")]
    mount_path: String,
}

/// Converts a directive memory string (`"4GB"`, `"512 MB"`, `"2Gi"`, ...)
/// into the Kubernetes `Mi` quantity form used in scenario fixtures.
fn memory_to_mi(spec: &str) -> Option<String> {
    let trimmed = spec.trim();
    let split_at = trimmed.find(|c: char| !c.is_ascii_digit() && c != '.')?;
    let (number, unit) = trimmed.split_at(split_at);
    let value: f64 = number.parse().ok()?;
    let unit = unit.trim().to_ascii_lowercase();
    let mi = match unit.as_str() {
        "g" | "gb" | "gi" => value * 1024.0,
        "m" | "mb" | "mi" => value,
        "k" | "kb" | "ki" => value / 1024.0,
        _ => return None,
    };
    Some(format!("{}Mi", mi.round() as i64))
}

/// Kubernetes-safe job name: lowercase alphanumerics and `-` only.
fn sanitize_job_name(raw: &str) -> String {
    let lowered = raw.to_ascii_lowercase();
    let cleaned = INVALID_JOB_NAME_CHARS.replace_all(&lowered, "-").trim_matches('-').to_string();
    if cleaned.is_empty() {
        "task".to_string()
    } else {
        cleaned
    }
}

fn render_manifest(task: &TaskRun, paths: &TaskPaths) -> JobManifest {
    let job_name = format!("{}-{}", sanitize_job_name(&task.processor_name), task.index);
    let image = task
        .config
        .directives
        .container_image
        .clone()
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

    let mut limits = ResourceQuantities::default();
    let mut requests = ResourceQuantities::default();
    if let Some(cpus) = task.config.directives.cpus {
        limits.cpu = Some(cpus.to_string());
        requests.cpu = Some(cpus.to_string());
    }
    if let Some(mem) = &task.config.directives.memory {
        if let Some(mi) = memory_to_mi(mem) {
            limits.memory = Some(mi.clone());
            requests.memory = Some(mi);
        }
    }

    let work_dir = paths.work_dir.to_string_lossy().into_owned();
    JobManifest {
        api_version: "batch/v1",
        kind: "Job",
        metadata: Metadata { name: job_name },
        spec: JobSpec {
            backoff_limit: 0,
            template: PodTemplate {
                spec: PodSpec {
                    containers: vec![Container {
                        name: "task",
                        image,
                        command: vec!["/bin/bash".to_string(), paths.run_script.to_string_lossy().into_owned()],
                        resources: Resources { limits, requests },
                        volume_mounts: vec![VolumeMount {
                            name: "workdir",
                            mount_path: work_dir.clone(),
                        }],
                    }],
                    volumes: vec![Volume {
                        name: "workdir",
                        host_path: HostPath { path: work_dir },
                    }],
                    restart_policy: "Never",
                },
            },
        },
    }
}

/// Map a pod's `.status.phase` onto the common status enum.
fn map_phase(phase: &str) -> ExecStatus {
    match phase {
        "Pending" => ExecStatus::Pending,
        "Running" => ExecStatus::Running,
        "Succeeded" => ExecStatus::Done,
        "Failed" | "Unknown" => ExecStatus::Error,
        _ => ExecStatus::Error,
    }
}

/// Drives tasks as Kubernetes Jobs, one pod per task.
#[derive(Default)]
pub struct KubernetesExecutor;

impl KubernetesExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for KubernetesExecutor {
    async fn submit(&self, task: &TaskRun, paths: &TaskPaths) -> Result<ExecHandle, ExecutorError> {
        let manifest = render_manifest(task, paths);
        let yaml = serde_yaml::to_string(&manifest)?;
        let manifest_path = paths.work_dir.join(".command.yaml");
        tokio::fs::write(&manifest_path, yaml).await?;

        let mut cmd = Command::new("kubectl");
        cmd.args(["create", "-f"])
            .arg(&manifest_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(ExecutorError::SubmitFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(ExecHandle::JobId(manifest.metadata.name))
    }

    async fn poll(&self, handle: &ExecHandle) -> Result<ExecStatus, ExecutorError> {
        let ExecHandle::JobId(job_name) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };
        let mut cmd = Command::new("kubectl");
        cmd.args(["get", "pods", "-a", "-l", &format!("job-name={job_name}"), "-o", "jsonpath={.items[0].status.phase}"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let output = cmd.output().await?;
        let phase = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if phase.is_empty() {
            return Ok(ExecStatus::Pending);
        }
        Ok(map_phase(&phase))
    }

    async fn kill(&self, handle: &ExecHandle) -> Result<(), ExecutorError> {
        let ExecHandle::JobId(job_name) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };
        let mut cmd = Command::new("kubectl");
        cmd.args(["delete", "job", job_name, "--ignore-not-found"])
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let status = cmd.status().await?;
        if !status.success() {
            return Err(ExecutorError::KillFailed(format!("kubectl delete job {job_name} exited with {status}")));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod tests;
