//! Runs the lifecycle monitor against a real server and chat channel.
//!
//! Usage:
//!
//! ```text
//! warden [OPTIONS] --discord-token <TOKEN> --channel-id <ID>
//! ```
//!
//! Settings may also come from the environment or a `.env` file in the
//! working directory. Channel users request a server start with the `/start`
//! slash command. On Unix, sending `SIGUSR1` to the process requests one as
//! well; `SIGINT` or `SIGTERM` shut the monitor down.

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use warden::command::adapters::{DiscordGateway, DiscordInteractions};
use warden::command::ports::InteractionError;
use warden::command::services::CommandDispatcher;
use warden::config::{Cli, ConfigError};
use warden::lifecycle::adapters::{GamedigOracle, MonotonicClock, ShellSupervisor};
use warden::lifecycle::services::{LifecycleMonitor, MonitorError, MonitorHandle};
use warden::notification::adapters::{DiscordChannel, JsonFileHandleStore};
use warden::notification::ports::NotificationChannelError;
use warden::notification::services::{NotificationSink, PersistedHandles};
use warden::observability::init_logging;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Channel(#[from] NotificationChannelError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error(transparent)]
    Monitor(#[from] MonitorError),
    #[error("signal handling failed: {0}")]
    Signal(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.verbose);
    if let Err(err) = dotenv
        && !err.not_found()
    {
        warn!(error = %err, "could not load .env file");
    }

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "warden exited with an error");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let settings = cli.monitor_settings()?;
    let (token, channel_id) = cli.channel_credentials()?;

    let channel = Arc::new(DiscordChannel::new(token, channel_id)?);
    let store = Arc::new(JsonFileHandleStore::new(&cli.handles_file));
    let sink = NotificationSink::new(channel, PersistedHandles::new(store));
    let supervisor = Arc::new(ShellSupervisor::new(cli.supervisor.clone()));
    let oracle = Arc::new(GamedigOracle::new(
        cli.query_command.clone(),
        cli.query_type.as_str(),
    ));

    let handle = LifecycleMonitor::spawn(
        settings,
        supervisor,
        oracle,
        sink,
        Arc::new(MonotonicClock::new()),
    )?;
    let commands = if cli.disable_slash_commands {
        info!("slash commands disabled");
        None
    } else {
        Some(CommandListener::start(token, &handle).await?)
    };

    let signals = wait_for_signals(&handle).await;
    if let Some(commands) = commands {
        commands.stop().await;
    }
    handle.shutdown().await?;
    signals?;
    Ok(())
}

/// Gateway listener and dispatcher serving `/start`.
struct CommandListener {
    cancel: CancellationToken,
    gateway: JoinHandle<()>,
    dispatcher: JoinHandle<()>,
}

impl CommandListener {
    async fn start(token: &str, handle: &MonitorHandle) -> Result<Self, AppError> {
        let responder = Arc::new(DiscordInteractions::new(token)?);
        let dispatcher = CommandDispatcher::new(responder, Arc::new(handle.requester()));
        if let Err(err) = dispatcher.register().await {
            warn!(error = %err, "could not register slash commands");
        }

        let (invocations, inbox) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let gateway = tokio::spawn(DiscordGateway::new(token).listen(invocations, cancel.clone()));
        let dispatcher = tokio::spawn(async move { dispatcher.serve(inbox).await });
        Ok(Self {
            cancel,
            gateway,
            dispatcher,
        })
    }

    async fn stop(self) {
        self.cancel.cancel();
        for task in [self.gateway, self.dispatcher] {
            if let Err(err) = task.await {
                warn!(error = %err, "command task failed");
            }
        }
    }
}

#[cfg(unix)]
async fn wait_for_signals(handle: &MonitorHandle) -> Result<(), std::io::Error> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut start = signal(SignalKind::user_defined1())?;
    let mut terminate = signal(SignalKind::terminate())?;
    loop {
        tokio::select! {
            _ = start.recv() => {
                info!("start requested by signal");
                if let Err(err) = handle.request_start() {
                    warn!(error = %err, "could not queue start request");
                    return Ok(());
                }
            }
            _ = terminate.recv() => break,
            interrupted = tokio::signal::ctrl_c() => {
                interrupted?;
                break;
            }
        }
    }
    info!("shutting down");
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_signals(_handle: &MonitorHandle) -> Result<(), std::io::Error> {
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    Ok(())
}
