//! Task polling for asynchronous vSphere operations
//!
//! Methods ending in `_Task` return a `Task` reference right away and do the
//! work server-side. This module polls `Task.info` until the task reaches
//! `success` or `error`, bounded by a timeout, with an optional progress
//! callback for UI updates.

use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{CoreError, Result};
use crate::vim::{ManagedObjectReference, TaskInfo, TaskState, VimApi};

/// Default upper bound on a task wait
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Default time between two `Task.info` reads
pub const DEFAULT_WAIT_INTERVAL: Duration = Duration::from_secs(2);

/// Bounds for a task wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Maximum time to wait for a terminal state
    pub timeout: Duration,
    /// Time between polling attempts
    pub interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            interval: DEFAULT_WAIT_INTERVAL,
        }
    }
}

impl WaitConfig {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

/// Progress events emitted while waiting on a task
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Waiting has begun
    Started { task: String },
    /// Polling iteration with current state
    Polling {
        task: String,
        state: TaskState,
        elapsed: Duration,
    },
    /// Task reached `success`
    Completed { task: String },
    /// Task reached `error`
    Failed { task: String, error: String },
}

/// Callback type for progress updates
///
/// The CLI uses this to drive its spinner.
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Wait for a task to reach a terminal state
///
/// # Returns
///
/// `Ok(true)` when the task succeeds. A task that ends in `error` with a
/// fault payload yields [`CoreError::TaskFailed`] carrying the fault's
/// localized message; one that ends in `error` without a payload yields
/// `Ok(false)`. Exceeding `config.timeout` yields [`CoreError::TaskTimeout`].
///
/// # Example
///
/// ```rust,ignore
/// use vimctl_core::{wait_for_task, ProgressEvent, WaitConfig};
///
/// let task = client.add_standalone_host_task(&parent, &request).await?;
/// let succeeded = wait_for_task(
///     &client,
///     &task,
///     WaitConfig::default(),
///     Some(Box::new(|event| {
///         if let ProgressEvent::Polling { state, elapsed, .. } = event {
///             println!("{} ({:.0}s)", state, elapsed.as_secs());
///         }
///     })),
/// )
/// .await?;
/// ```
pub async fn wait_for_task<A>(
    api: &A,
    task: &ManagedObjectReference,
    config: WaitConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<bool>
where
    A: VimApi + ?Sized,
{
    let info = wait_for_task_info(api, task, config, on_progress).await?;
    Ok(info.state == TaskState::Success)
}

/// Like [`wait_for_task`], but hands back the terminal `Task.info`
///
/// The returned info is in state `success`, or in state `error` without a
/// fault payload. The total wait never exceeds `config.timeout`; the last
/// poll happens at the deadline.
pub async fn wait_for_task_info<A>(
    api: &A,
    task: &ManagedObjectReference,
    config: WaitConfig,
    on_progress: Option<ProgressCallback>,
) -> Result<TaskInfo>
where
    A: VimApi + ?Sized,
{
    let start = Instant::now();
    let deadline = start + config.timeout;
    let task_id = task.value.clone();

    emit(
        &on_progress,
        ProgressEvent::Started {
            task: task_id.clone(),
        },
    );

    loop {
        let elapsed = start.elapsed();
        let info = api.task_info(task).await?;
        trace!("Task {} is {}", task_id, info.state);

        emit(
            &on_progress,
            ProgressEvent::Polling {
                task: task_id.clone(),
                state: info.state,
                elapsed,
            },
        );

        match info.state {
            TaskState::Success => {
                emit(
                    &on_progress,
                    ProgressEvent::Completed {
                        task: task_id.clone(),
                    },
                );
                return Ok(info);
            }
            TaskState::Error => {
                let Some(fault) = &info.error else {
                    emit(
                        &on_progress,
                        ProgressEvent::Failed {
                            task: task_id.clone(),
                            error: "no fault reported".to_string(),
                        },
                    );
                    return Ok(info);
                };
                let message = fault.message();
                emit(
                    &on_progress,
                    ProgressEvent::Failed {
                        task: task_id.clone(),
                        error: message.clone(),
                    },
                );
                return Err(CoreError::TaskFailed(message));
            }
            TaskState::Queued | TaskState::Running => {}
        }

        let now = Instant::now();
        if now >= deadline {
            debug!("Gave up on task {} after {:?}", task_id, now - start);
            return Err(CoreError::TaskTimeout(config.timeout));
        }
        tokio::time::sleep(config.interval.min(deadline - now)).await;
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vim::{LocalizedMethodFault, MockVimApi};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn info(state: TaskState, fault: Option<&str>) -> TaskInfo {
        TaskInfo {
            key: Some("task-42".to_string()),
            state,
            error: fault.map(|m| LocalizedMethodFault {
                localized_message: Some(m.to_string()),
                fault: None,
            }),
            result: None,
            progress: None,
        }
    }

    fn scripted(states: Vec<TaskInfo>) -> MockVimApi {
        let queue = Mutex::new(VecDeque::from(states));
        let mut api = MockVimApi::new();
        api.expect_task_info().returning(move |_| {
            let next = queue
                .lock()
                .unwrap()
                .pop_front()
                .expect("polled past the scripted states");
            Ok(next)
        });
        api
    }

    fn task() -> ManagedObjectReference {
        ManagedObjectReference::new("Task", "task-42")
    }

    fn fast() -> WaitConfig {
        WaitConfig::new(Duration::from_secs(60), Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_queued_running_success_returns_true() {
        let api = scripted(vec![
            info(TaskState::Queued, None),
            info(TaskState::Running, None),
            info(TaskState::Success, None),
        ]);

        let result = wait_for_task(&api, &task(), fast(), None).await;
        assert!(matches!(result, Ok(true)));
    }

    #[tokio::test]
    async fn test_running_error_raises_fault_message() {
        let api = scripted(vec![
            info(TaskState::Running, None),
            info(TaskState::Error, Some("connection refused")),
        ]);

        let err = wait_for_task(&api, &task(), fast(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::TaskFailed(ref m) if m == "connection refused"));
    }

    #[tokio::test]
    async fn test_error_without_fault_returns_false() {
        let api = scripted(vec![info(TaskState::Error, None)]);

        let result = wait_for_task(&api, &task(), fast(), None).await;
        assert!(matches!(result, Ok(false)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_task_never_finishes() {
        let mut api = MockVimApi::new();
        api.expect_task_info()
            .returning(|_| Ok(info(TaskState::Running, None)));

        let config = WaitConfig::new(Duration::from_secs(10), Duration::from_secs(3));
        let err = wait_for_task(&api, &task(), config, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::TaskTimeout(d) if d == Duration::from_secs(10)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_not_stretched_by_a_long_interval() {
        let mut api = MockVimApi::new();
        api.expect_task_info()
            .times(2)
            .returning(|_| Ok(info(TaskState::Running, None)));

        let start = Instant::now();
        let config = WaitConfig::new(Duration::from_secs(10), Duration::from_secs(300));
        let err = wait_for_task(&api, &task(), config, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::TaskTimeout(_)));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_at_the_deadline_is_not_a_timeout() {
        let api = scripted(vec![
            info(TaskState::Running, None),
            info(TaskState::Success, None),
        ]);

        let start = Instant::now();
        let config = WaitConfig::new(Duration::from_secs(10), Duration::from_secs(12));
        let result = wait_for_task(&api, &task(), config, None).await;

        assert!(matches!(result, Ok(true)));
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test]
    async fn test_terminal_info_is_returned() {
        let mut done = info(TaskState::Success, None);
        done.result = Some(serde_json::json!({"type": "ComputeResource", "value": "domain-s12"}));
        let api = scripted(vec![info(TaskState::Running, None), done]);

        let info = wait_for_task_info(&api, &task(), fast(), None).await.unwrap();
        assert_eq!(
            info.result_reference(),
            Some(ManagedObjectReference::new("ComputeResource", "domain-s12"))
        );
    }

    #[tokio::test]
    async fn test_remote_error_while_polling_propagates() {
        let mut api = MockVimApi::new();
        api.expect_task_info().returning(|_| {
            Err(crate::vim::VimError::Fault {
                kind: crate::vim::FaultKind::NotAuthenticated,
                message: "session expired".to_string(),
            })
        });

        let err = wait_for_task(&api, &task(), fast(), None)
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());
    }

    #[tokio::test]
    async fn test_progress_events_in_order() {
        let api = scripted(vec![
            info(TaskState::Running, None),
            info(TaskState::Success, None),
        ]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let callback: ProgressCallback = Box::new(move |event| {
            let label = match event {
                ProgressEvent::Started { .. } => "started".to_string(),
                ProgressEvent::Polling { state, .. } => format!("polling:{}", state),
                ProgressEvent::Completed { .. } => "completed".to_string(),
                ProgressEvent::Failed { .. } => "failed".to_string(),
            };
            sink.lock().unwrap().push(label);
        });

        wait_for_task(&api, &task(), fast(), Some(callback))
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "started",
                "polling:running",
                "polling:success",
                "completed"
            ]
        );
    }
}
