//! Output submitter
//!
//! Watches the L1 output oracle for the next L2 height it expects, fetches the
//! matching output from the executor and proposes it on L1.

mod args;
mod errors;
mod helpers;

use std::time::Duration;

use args::Args;
use helpers::{create_executor_client, create_gateway, get_config};
use opinit_common::{env::parse_env_or, logging};
use opinit_executor_client::ExecutorClient;
use opinit_l1client::ChainGateway;
use opinit_submitter::{OutputSubmitter, SubmitterError, SubmitterState};
use opinit_tasks::{set_panic_hook, TaskExecutor, TaskManager};
use tokio::{runtime::Handle, sync::oneshot};
use tracing::*;

const SHUTDOWN_TIMEOUT_MS: u64 = 5000;
const SHUTDOWN_TIMEOUT_ENVVAR: &str = "OPINIT_SHUTDOWN_TIMEOUT_MS";

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();
    if let Err(e) = main_inner(args) {
        eprintln!("FATAL ERROR: {e}");

        return Err(e);
    }

    Ok(())
}

fn main_inner(args: Args) -> anyhow::Result<()> {
    // Start runtime for async IO tasks.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("opinit-rt")
        .build()
        .expect("init: build rt");
    let handle = runtime.handle();

    // Init the logging before we do anything else.
    init_logging(handle);
    set_panic_hook();

    let config = get_config(&args)?;

    let gateway = create_gateway(&config)?;
    let executor_client = create_executor_client(&config)?;
    let submitter = OutputSubmitter::new(gateway, executor_client, config.submitter.clone());

    let task_manager = TaskManager::new(handle.clone());
    let executor = task_manager.executor();

    info!(
        rollup = %config.l1.rollup_type_tag,
        submitter = %config.l1.submitter_address,
        "init finished, starting output submitter"
    );
    let mut exit_rx = spawn_output_submitter(&executor, submitter);

    task_manager.start_signal_listeners();
    let shutdown_timeout = parse_env_or(SHUTDOWN_TIMEOUT_ENVVAR, SHUTDOWN_TIMEOUT_MS);
    let res = task_manager.monitor(Some(Duration::from_millis(shutdown_timeout)));

    logging::finalize();
    res?;

    check_submitter_exit(exit_rx.try_recv().ok())
}

/// Turns how the submitter ended into the process result, so a fatal stop
/// exits non-zero.
fn check_submitter_exit(
    outcome: Option<Result<SubmitterState, SubmitterError>>,
) -> anyhow::Result<()> {
    match outcome {
        Some(Ok(_)) => Ok(()),
        Some(Err(err)) => anyhow::bail!("output submitter stopped: {err}"),
        // still winding down when the shutdown timeout hit
        None => anyhow::bail!("output submitter did not exit in time"),
    }
}

/// Runs the submitter as a critical task. Shutdown stops it between
/// iterations, and the loop ending on its own takes the process down. The
/// returned channel yields how the loop ended.
fn spawn_output_submitter<G: ChainGateway, E: ExecutorClient>(
    executor: &TaskExecutor,
    submitter: OutputSubmitter<G, E>,
) -> oneshot::Receiver<Result<SubmitterState, SubmitterError>> {
    let (exit_tx, exit_rx) = oneshot::channel();
    let name = submitter.name();
    let submitter_handle = submitter.handle();
    let shutdown_signal = executor.shutdown_signal();

    executor.spawn_critical_async_with_shutdown(name, move |shutdown| async move {
        let run = submitter.run();
        tokio::pin!(run);

        let res = tokio::select! {
            res = &mut run => res,
            _ = shutdown.wait_for_shutdown() => {
                info!("shutdown requested, stopping output submitter");
                submitter_handle.stop();
                run.await
            }
        };

        match &res {
            Ok(state) => info!(synced_height = %state.synced_height(), "output submitter exited"),
            Err(err) => error!(%err, "output submitter exited with error"),
        }
        let _ = exit_tx.send(res);
        shutdown_signal.send();
    });

    exit_rx
}

/// Sets up the logging system given a handle to a runtime context to possibly
/// start the OTLP output on.
fn init_logging(rt: &Handle) {
    let lconfig = logging::LoggerConfig::from_env("opinit-output-submitter");
    let otlp_url = lconfig.otlp_url().map(str::to_owned);

    {
        // The OTLP batch exporter spawns onto the ambient runtime.
        let _g = rt.enter();
        logging::init(lconfig);
    }

    if let Some(url) = otlp_url {
        info!(%url, "using OpenTelemetry tracing output");
    }
}
