// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Batch-scheduler executors: directive rendering, submit/status/kill
//! command construction, and native status-code mapping, shared across
//! Slurm, SGE, LSF, and PBS.

pub mod kubernetes;

use crate::error::ExecutorError;
use crate::executor::{ExecHandle, ExecStatus, Executor, TaskPaths};
use async_trait::async_trait;
use regex::Regex;
use rflow_core::{Directives, TaskRun};
use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::LazyLock;
use tokio::process::Command;

/// Regex matching whitespace runs, collapsed to `_` in a sanitized job name.
#[allow(clippy::expect_used)]
static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("constant regex pattern is valid"));

/// Regex matching a `qstat -xml` job number element.
#[allow(clippy::expect_used)]
static SGE_JOB_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<JB_job_number>(\d+)</JB_job_number>").expect("constant regex pattern is valid")
});

/// Regex matching a `qstat -xml` job state element.
#[allow(clippy::expect_used)]
static SGE_STATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<state>([^<]+)</state>").expect("constant regex pattern is valid"));

/// Replace whitespace runs in a task/process name with underscores so it is
/// safe to embed as a scheduler job name.
fn sanitize_job_name_component(name: &str) -> String {
    WHITESPACE_RUN.replace_all(name.trim(), "_").into_owned()
}

/// Strip a trailing unit suffix from a memory directive, keeping the
/// leading numeric value only (schedulers that want the value in a fixed
/// unit are given the bare number, e.g. `"200M"` -> `"200"`).
fn strip_memory_unit(spec: &str) -> String {
    spec.trim()
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect()
}

/// Parse a duration string built from `<number><unit>` pairs (`d`, `h`,
/// `m`, `s`), e.g. `"2h"`, `"1d 2h"`, `"90s"`, into total seconds.
fn parse_duration_seconds(spec: &str) -> Option<u64> {
    let re = Regex::new(r"(?i)(\d+)\s*(d|h|m|s)").ok()?;
    let mut total = 0u64;
    let mut matched = false;
    for cap in re.captures_iter(spec) {
        matched = true;
        let value: u64 = cap.get(1)?.as_str().parse().ok()?;
        let unit = cap.get(2)?.as_str().to_ascii_lowercase();
        total += match unit.as_str() {
            "d" => value * 86_400,
            "h" => value * 3_600,
            "m" => value * 60,
            "s" => value,
            _ => return None,
        };
    }
    matched.then_some(total)
}

/// Render a duration string as scheduler-native `HH:MM:SS`.
fn format_duration_hms(spec: &str) -> Option<String> {
    let total = parse_duration_seconds(spec)?;
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    Some(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Which batch scheduler a [`GridExecutor`] targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridFlavor {
    Slurm,
    Sge,
    Lsf,
    Pbs,
}

impl GridFlavor {
    /// The comment-embedded directive token, e.g. `#SBATCH`.
    pub fn directive_token(&self) -> &'static str {
        match self {
            GridFlavor::Slurm => "#SBATCH",
            GridFlavor::Sge => "#$",
            GridFlavor::Lsf => "#BSUB",
            GridFlavor::Pbs => "#PBS",
        }
    }

    /// Render this task's resource directives as comment lines to be
    /// embedded at the top of `.command.run`. `task_name` and `work_dir`
    /// feed the job-name/working-directory/log-path flags every flavor
    /// emits alongside the resource flags proper.
    pub fn render_directives(&self, task_name: &str, work_dir: &Path, directives: &Directives) -> Vec<String> {
        let token = self.directive_token();
        let job_name = format!("nf-{}", sanitize_job_name_component(task_name));
        let work_dir = work_dir.display();
        let log_path = format!("{work_dir}/.command.log");
        let mut lines = Vec::new();
        match self {
            GridFlavor::Slurm => {
                lines.push(format!("{token} -D {work_dir}"));
                lines.push(format!("{token} -J {job_name}"));
                lines.push(format!("{token} -o {log_path}"));
                if let Some(cpus) = directives.cpus {
                    lines.push(format!("{token} -c {cpus}"));
                }
                if let Some(time) = &directives.time {
                    if let Some(hms) = format_duration_hms(time) {
                        lines.push(format!("{token} -t {hms}"));
                    }
                }
                if let Some(mem) = &directives.memory {
                    lines.push(format!("{token} --mem {}", strip_memory_unit(mem)));
                }
                if let Some(queue) = &directives.queue {
                    lines.push(format!("{token} -p {queue}"));
                }
            }
            GridFlavor::Sge => {
                lines.push(format!("{token} -wd {work_dir}"));
                lines.push(format!("{token} -N {job_name}"));
                lines.push(format!("{token} -o {log_path}"));
                if let Some(cpus) = directives.cpus {
                    lines.push(format!("{token} -pe smp {cpus}"));
                }
                if let Some(time) = &directives.time {
                    if let Some(hms) = format_duration_hms(time) {
                        lines.push(format!("{token} -l h_rt={hms}"));
                    }
                }
                if let Some(mem) = &directives.memory {
                    lines.push(format!("{token} -l h_vmem={}", strip_memory_unit(mem)));
                }
                if let Some(queue) = &directives.queue {
                    lines.push(format!("{token} -q {queue}"));
                }
            }
            GridFlavor::Lsf => {
                lines.push(format!("{token} -cwd {work_dir}"));
                lines.push(format!("{token} -J {job_name}"));
                lines.push(format!("{token} -o {log_path}"));
                if let Some(cpus) = directives.cpus {
                    lines.push(format!("{token} -n {cpus}"));
                }
                if let Some(time) = &directives.time {
                    if let Some(hms) = format_duration_hms(time) {
                        lines.push(format!("{token} -W {hms}"));
                    }
                }
                if let Some(mem) = &directives.memory {
                    lines.push(format!("{token} -M {}", strip_memory_unit(mem)));
                }
                if let Some(queue) = &directives.queue {
                    lines.push(format!("{token} -q {queue}"));
                }
            }
            GridFlavor::Pbs => {
                lines.push(format!("{token} -d {work_dir}"));
                lines.push(format!("{token} -N {job_name}"));
                lines.push(format!("{token} -o {log_path}"));
                if let Some(cpus) = directives.cpus {
                    lines.push(format!("{token} -l select=1:ncpus={cpus}"));
                }
                if let Some(time) = &directives.time {
                    if let Some(hms) = format_duration_hms(time) {
                        lines.push(format!("{token} -l walltime={hms}"));
                    }
                }
                if let Some(mem) = &directives.memory {
                    lines.push(format!("{token} -l mem={}mb", strip_memory_unit(mem)));
                }
                if let Some(queue) = &directives.queue {
                    lines.push(format!("{token} -q {queue}"));
                }
            }
        }
        if let Some(extra) = &directives.cluster_options {
            lines.push(format!("{token} {extra}"));
        }
        lines
    }

    pub fn submit_command(&self, run_script: &std::path::Path) -> Command {
        let mut cmd = match self {
            GridFlavor::Slurm => Command::new("sbatch"),
            GridFlavor::Sge => Command::new("qsub"),
            GridFlavor::Lsf => Command::new("bsub"),
            GridFlavor::Pbs => Command::new("qsub"),
        };
        cmd.arg(run_script);
        cmd
    }

    /// Extract the scheduler-assigned job id from the submit command's stdout.
    pub fn parse_job_id(&self, stdout: &str) -> Option<String> {
        let pattern = match self {
            GridFlavor::Slurm => r"Submitted batch job (\d+)",
            GridFlavor::Sge => r"Your job (\d+)",
            GridFlavor::Lsf => r"Job <(\d+)> is submitted",
            GridFlavor::Pbs => r"^(\S+)",
        };
        let re = Regex::new(pattern).ok()?;
        re.captures(stdout.trim())
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
    }

    pub fn status_command(&self) -> Command {
        match self {
            GridFlavor::Slurm => {
                let mut c = Command::new("squeue");
                c.args(["-h", "-o", "%i %t", "-t", "all"]);
                if let Ok(user) = std::env::var("USER") {
                    c.args(["-u", &user]);
                }
                c
            }
            GridFlavor::Sge => {
                let mut c = Command::new("qstat");
                c.arg("-xml");
                c
            }
            GridFlavor::Lsf => {
                let mut c = Command::new("bjobs");
                c.args(["-a", "-noheader", "-o", "jobid stat"]);
                c
            }
            GridFlavor::Pbs => {
                let mut c = Command::new("qstat");
                c
            }
        }
    }

    /// Map each scheduler's native one/two-letter status code onto the
    /// common [`ExecStatus`] enum.
    pub fn map_status_code(&self, code: &str) -> ExecStatus {
        match self {
            GridFlavor::Slurm => match code {
                "PD" => ExecStatus::Pending,
                "R" | "CG" => ExecStatus::Running,
                "CD" => ExecStatus::Done,
                "F" | "TO" | "NF" | "CA" => ExecStatus::Error,
                "S" | "ST" => ExecStatus::Hold,
                _ => ExecStatus::Error,
            },
            GridFlavor::Sge => match code {
                "qw" | "hqw" => ExecStatus::Pending,
                "r" | "t" => ExecStatus::Running,
                "hr" | "hold" => ExecStatus::Hold,
                "Eqw" | "Er" => ExecStatus::Error,
                _ => ExecStatus::Done,
            },
            GridFlavor::Lsf => match code {
                "PEND" => ExecStatus::Pending,
                "RUN" => ExecStatus::Running,
                "DONE" => ExecStatus::Done,
                "EXIT" => ExecStatus::Error,
                "PSUSP" | "USUSP" | "SSUSP" => ExecStatus::Hold,
                _ => ExecStatus::Error,
            },
            GridFlavor::Pbs => match code {
                "Q" => ExecStatus::Pending,
                "R" | "E" => ExecStatus::Running,
                "F" | "C" => ExecStatus::Done,
                "H" | "W" | "S" => ExecStatus::Hold,
                _ => ExecStatus::Error,
            },
        }
    }

    /// Parse a batch status listing into `job_id -> status`.
    pub fn parse_status_listing(&self, stdout: &str) -> HashMap<String, ExecStatus> {
        let mut map = HashMap::new();
        match self {
            GridFlavor::Sge => {
                // Minimal XML scrape: <job_list ...><JB_job_number>N</JB_job_number><state>r</state>...
                let ids: Vec<&str> = SGE_JOB_NUMBER
                    .captures_iter(stdout)
                    .filter_map(|c| c.get(1).map(|m| m.as_str()))
                    .collect();
                let states: Vec<&str> = SGE_STATE
                    .captures_iter(stdout)
                    .filter_map(|c| c.get(1).map(|m| m.as_str()))
                    .collect();
                for (id, state) in ids.into_iter().zip(states) {
                    map.insert(id.to_string(), self.map_status_code(state));
                }
            }
            _ => {
                for line in stdout.lines() {
                    let fields: Vec<&str> = line.split_whitespace().collect();
                    if fields.len() >= 2 {
                        map.insert(fields[0].to_string(), self.map_status_code(fields[1]));
                    }
                }
            }
        }
        map
    }

    pub fn kill_command(&self, job_id: &str) -> Command {
        let mut cmd = match self {
            GridFlavor::Slurm => Command::new("scancel"),
            GridFlavor::Sge => Command::new("qdel"),
            GridFlavor::Lsf => Command::new("bkill"),
            GridFlavor::Pbs => Command::new("qdel"),
        };
        cmd.arg(job_id);
        cmd
    }
}

/// Executor backend driving one of the directive-based batch schedulers.
pub struct GridExecutor {
    flavor: GridFlavor,
}

impl GridExecutor {
    pub fn new(flavor: GridFlavor) -> Self {
        Self { flavor }
    }

    pub fn flavor(&self) -> GridFlavor {
        self.flavor
    }
}

#[async_trait]
impl Executor for GridExecutor {
    async fn submit(&self, _task: &TaskRun, paths: &TaskPaths) -> Result<ExecHandle, ExecutorError> {
        let mut cmd = self.flavor.submit_command(&paths.run_script);
        cmd.current_dir(&paths.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().await?;
        if !output.status.success() {
            return Err(ExecutorError::SubmitFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let job_id = self
            .flavor
            .parse_job_id(&stdout)
            .ok_or(ExecutorError::UnparseableJobId(stdout))?;
        Ok(ExecHandle::JobId(job_id))
    }

    async fn poll(&self, handle: &ExecHandle) -> Result<ExecStatus, ExecutorError> {
        let ExecHandle::JobId(job_id) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };
        let mut cmd = self.flavor.status_command();
        cmd.stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        let output = cmd.output().await?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let statuses = self.flavor.parse_status_listing(&stdout);
        Ok(statuses.get(job_id).copied().unwrap_or(ExecStatus::Done))
    }

    async fn kill(&self, handle: &ExecHandle) -> Result<(), ExecutorError> {
        let ExecHandle::JobId(job_id) = handle else {
            return Err(ExecutorError::UnknownHandle(handle.to_string()));
        };
        let mut cmd = self.flavor.kill_command(job_id);
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null());
        let status = cmd.status().await?;
        if !status.success() {
            return Err(ExecutorError::KillFailed(format!(
                "{:?} exited with {status}",
                self.flavor
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "grid_tests.rs"]
mod tests;
