//! `vimctl create`

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, warn};
use vimctl_core::{
    CreationOutcome, CreationRequest, HostWait, ItemType, ProgressEvent, WaitConfig,
    create_entity,
};

use crate::cli::{CreateArgs, OutputFormat};
use crate::connection::{ConnectionManager, ConnectionOverrides, Session};
use crate::error::{Result as CliResult, VimCtlError};
use crate::output::{self, print_output};

pub async fn handle_create(
    args: &CreateArgs,
    overrides: &ConnectionOverrides,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> CliResult<()> {
    let Ok(item_type) = args.item_type.parse::<ItemType>();
    let request = CreationRequest::new(&args.parent_name, item_type, &args.item_name)
        .with_license_key(args.license_key.clone());
    debug!("Creation request: {:?}", request);

    let mut session = conn_mgr.open_session(overrides).await?;
    let wait_config = wait_config(args, session.wait);

    let spinner = (request.item_type == ItemType::HostStandalone).then(|| task_spinner(&request));
    let wait = match &spinner {
        Some(pb) => HostWait::new(wait_config).with_progress(spinner_callback(pb.clone())),
        None => HostWait::new(wait_config),
    };

    let result = create_in_session(&mut session, &request, wait, ctrl_c()).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    let outcome = result?;
    print_outcome(&outcome, output_format)
}

/// Run the creation, abandoning it when `cancel` resolves, then log out
///
/// Logout runs on every path so an interrupted command does not leave the
/// server-side session open.
async fn create_in_session<C>(
    session: &mut Session,
    request: &CreationRequest,
    wait: HostWait,
    cancel: C,
) -> CliResult<CreationOutcome>
where
    C: Future<Output = ()>,
{
    let result = tokio::select! {
        result = create_entity(&session.client, request, &session.credentials, wait) => {
            result.map_err(VimCtlError::from)
        }
        _ = cancel => {
            debug!("Creation interrupted");
            Err(VimCtlError::Interrupted)
        }
    };

    if let Err(e) = session.client.logout().await {
        warn!("Logout failed: {}", e);
    }
    result
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

fn wait_config(args: &CreateArgs, profile: WaitConfig) -> WaitConfig {
    WaitConfig::new(
        args.wait_timeout
            .map(Duration::from_secs)
            .unwrap_or(profile.timeout),
        args.wait_interval
            .map(Duration::from_secs)
            .unwrap_or(profile.interval),
    )
}

fn print_outcome(outcome: &CreationOutcome, output_format: OutputFormat) -> CliResult<()> {
    match output::OutputFormat::from_cli(output_format) {
        Some(fmt) => print_output(outcome, fmt),
        None => {
            println!("Successfully created::{}", outcome.item_name);
            Ok(())
        }
    }
}

fn task_spinner(request: &CreationRequest) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) =
        ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
    {
        pb.set_style(style);
    }
    pb.set_message(format!("Adding host {}", request.item_name));
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

fn spinner_callback(pb: ProgressBar) -> vimctl_core::ProgressCallback {
    Box::new(move |event: ProgressEvent| match &event {
        ProgressEvent::Started { task } => {
            pb.set_message(format!("Task {} started", task));
        }
        ProgressEvent::Polling { task, state, .. } => {
            pb.set_message(format!("Task {}: {}", task, state));
        }
        ProgressEvent::Completed { task } => {
            pb.set_message(format!("Task {} completed", task));
        }
        ProgressEvent::Failed { task, error } => {
            pb.set_message(format!("Task {} failed: {}", task, error));
        }
    })
}
