//! Load executor
//!
//! Runs a load descriptor in two phases. The launch phase walks the items in
//! order, waits out each item's pre-delay and starts its workload, leaving
//! earlier workloads running. The collection phase then waits for every
//! workload in launch order and gathers its exit code and output.
//!
//! Each child's stdout and stderr are drained by their own pump tasks from the
//! moment it is spawned, so a chatty workload can never block on a full pipe
//! while an earlier one is still being waited on.

use std::io;
use std::path::Path;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::descriptor::{LoadDescriptor, LoadItem};
use super::workload::Workload;
use crate::common::{Error, Result};

/// Options for [`execute_load`]
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Per-process wait limit in the collection phase; `None` waits forever
    pub collect_timeout: Option<Duration>,
}

/// Outcome of one workload process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    pub pid: u32,
    pub return_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub exe_name: String,
    pub expected_count: u32,
    /// Tag the workload was launched with
    pub tag: String,
}

/// A launched workload awaiting collection
struct ProcessRecord {
    exe_name: String,
    pid: u32,
    expected_count: u32,
    tag: String,
    child: Child,
    stdout: JoinHandle<io::Result<Vec<u8>>>,
    stderr: JoinHandle<io::Result<Vec<u8>>>,
}

/// Execute the load and return one result per item, in launch order
///
/// Returns only after every launched process has exited. A launch failure
/// or a collection timeout kills every process still running and aborts
/// the run.
pub async fn execute_load(
    workload: &Workload,
    descriptor: &LoadDescriptor,
    options: &ExecuteOptions,
) -> Result<Vec<RunResult>> {
    descriptor.validate()?;

    let start = Instant::now();
    let deadlines = descriptor
        .schedule()?
        .into_iter()
        .map(|offset| {
            start.checked_add(offset).ok_or_else(|| {
                Error::InvalidDescriptor(format!(
                    "launch offset of {}s is out of range",
                    offset.as_secs()
                ))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let program = workload.resolve()?;

    tracing::info!(
        count = descriptor.len(),
        program = %program.display(),
        "Launching workload processes"
    );

    let mut records = Vec::with_capacity(descriptor.len());
    for (item, deadline) in descriptor.items.iter().zip(deadlines) {
        tokio::time::sleep_until(deadline).await;
        match launch(workload, &program, item) {
            Ok(record) => records.push(record),
            Err(e) => {
                terminate(&mut records).await;
                return Err(e);
            }
        }
    }

    tracing::info!(count = records.len(), "All processes launched, collecting");

    let mut results = Vec::with_capacity(records.len());
    for i in 0..records.len() {
        match collect(&mut records[i], options.collect_timeout).await {
            Ok(result) => results.push(result),
            Err(e) => {
                terminate(&mut records[i..]).await;
                return Err(e);
            }
        }
    }

    tracing::info!(count = results.len(), "All processes collected");
    Ok(results)
}

/// Start one workload process and hand its pipes to pump tasks
fn launch(workload: &Workload, program: &Path, item: &LoadItem) -> Result<ProcessRecord> {
    let mut child = workload
        .command(program, item.duration, &item.tag)
        .spawn()
        .map_err(|source| Error::SpawnFailed {
            program: program.display().to_string(),
            tag: item.tag.clone(),
            source,
        })?;

    let pid = child.id().ok_or_else(|| {
        Error::Internal(format!("Process for tag '{}' has no pid", item.tag))
    })?;

    tracing::debug!(pid, tag = %item.tag, duration = item.duration, "Launched workload");

    let stdout = pump(child.stdout.take());
    let stderr = pump(child.stderr.take());

    Ok(ProcessRecord {
        exe_name: workload.name.clone(),
        pid,
        expected_count: item.expected_count,
        tag: item.tag.clone(),
        child,
        stdout,
        stderr,
    })
}

/// Read a child stream to end-of-stream in its own task
fn pump<R>(stream: Option<R>) -> JoinHandle<io::Result<Vec<u8>>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut rd) = stream {
            rd.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

/// Wait for a launched process and build its result
async fn collect(record: &mut ProcessRecord, timeout: Option<Duration>) -> Result<RunResult> {
    let pid = record.pid;
    let waited = match timeout {
        Some(limit) => tokio::time::timeout(limit, record.child.wait())
            .await
            .map_err(|_| Error::CollectTimeout {
                pid,
                tag: record.tag.clone(),
                secs: limit.as_secs(),
            })?,
        None => record.child.wait().await,
    };
    let status = waited.map_err(|source| Error::CollectFailed { pid, source })?;

    let stdout = drain(&mut record.stdout, pid).await?;
    let stderr = drain(&mut record.stderr, pid).await?;

    let return_code = exit_code(status);
    if return_code != 0 {
        tracing::warn!(pid, tag = %record.tag, return_code, "Workload exited abnormally");
    } else {
        tracing::debug!(pid, tag = %record.tag, "Workload finished");
    }

    Ok(RunResult {
        pid,
        return_code,
        stdout: join_output(&stdout),
        stderr: join_output(&stderr),
        exe_name: record.exe_name.clone(),
        expected_count: record.expected_count,
        tag: record.tag.clone(),
    })
}

/// Bytes gathered by a pump task
async fn drain(pump: &mut JoinHandle<io::Result<Vec<u8>>>, pid: u32) -> Result<Vec<u8>> {
    pump.await
        .map_err(|e| Error::Internal(format!("Output pump for {} failed: {}", pid, e)))?
        .map_err(|source| Error::CollectFailed { pid, source })
}

/// Kill and reap every process in `records`
async fn terminate(records: &mut [ProcessRecord]) {
    for record in records {
        match record.child.kill().await {
            Ok(()) => tracing::warn!(pid = record.pid, tag = %record.tag, "Killed workload"),
            Err(e) => tracing::debug!(pid = record.pid, error = %e, "Workload already gone"),
        }
        record.stdout.abort();
        record.stderr.abort();
    }
}

/// Flatten captured output: lines joined with ", ", trailing whitespace trimmed
pub fn join_output(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .lines()
        .collect::<Vec<_>>()
        .join(", ")
        .trim_end()
        .to_string()
}

/// Exit code, or the negated signal number for a signalled process on Unix
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}
