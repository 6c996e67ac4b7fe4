//! # yqfk — daily epidemic self-report
//!
//! Logs into the DGUT SSO portal, files today's epidemic report if it is
//! missing and pushes the result through ServerChan.
//!
//! Usage:
//!   yqfk -u <username> -p <password> -k <sckey>   # run now, then daily at 06:10
//!   yqfk -c ~/.yqfk/config.toml                   # credentials from a config file
//!   yqfk -u .. -p .. -k .. --once                 # single run, exit code reflects outcome

mod logger;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tokio::sync::watch;
use yqfk_core::{Credentials, RunOutcome, YqfkConfig};
use yqfk_portal::{Endpoints, run_report};
use yqfk_scheduler::{CronSchedule, Notification, Scheduler, ServerChan, Trigger, run_daily};

#[derive(Parser)]
#[command(
    name = "yqfk",
    version,
    about = "📝 Daily epidemic self-report for the DGUT portal"
)]
struct Cli {
    /// Portal username
    #[arg(short = 'u', long, env = "YQFK_USERNAME")]
    username: Option<String>,

    /// Portal password
    #[arg(short = 'p', long, env = "YQFK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// ServerChan key
    #[arg(short = 'k', long = "key", env = "YQFK_SCKEY", hide_env_values = true)]
    key: Option<String>,

    /// Config file (default: ~/.yqfk/config.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Run once and exit instead of scheduling
    #[arg(long)]
    once: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Flags win over the config file.
    fn apply(&self, config: &mut YqfkConfig) {
        if let Some(username) = &self.username {
            config.account.username = username.clone();
        }
        if let Some(password) = &self.password {
            config.account.password = password.clone();
        }
        if let Some(key) = &self.key {
            config.notify.key = key.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let (mut config, config_err) = match &cli.config {
        Some(path) => (YqfkConfig::load_from(path)?, None),
        None => YqfkConfig::load_or_default(&YqfkConfig::default_path()),
    };
    cli.apply(&mut config);

    let tz = config.schedule.tz();
    logger::init(
        tz.as_ref().copied().unwrap_or(chrono_tz::Asia::Shanghai),
        cli.verbose,
    );
    if let Some(e) = config_err {
        tracing::error!("{e}, continuing with defaults and command-line flags");
    }

    let credentials = config.credentials();
    let endpoints = Endpoints::default();
    let relay = ServerChan::new(&config.notify.key);
    let scheduler = Arc::new(Scheduler::new(move |trigger: Trigger| {
        let credentials = credentials.clone();
        let endpoints = endpoints.clone();
        let relay = relay.clone();
        async move {
            let outcome = run_and_notify(&credentials, &endpoints, &relay).await;
            tracing::debug!("{trigger} run finished");
            outcome
        }
    }));

    if cli.once {
        return match scheduler.fire(Trigger::Startup).await {
            Some(outcome) if outcome.success => Ok(()),
            Some(outcome) => Err(anyhow::anyhow!(outcome.message)),
            None => Ok(()),
        };
    }

    let mut signals = Signals::install()?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let daily = match (CronSchedule::parse(&config.schedule.cron), tz) {
        (Ok(schedule), Ok(tz)) => Some(tokio::spawn(run_daily(
            scheduler.clone(),
            schedule,
            tz,
            shutdown_rx,
        ))),
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("Failed to register daily run: {e}");
            None
        }
    };

    let startup = {
        let scheduler = scheduler.clone();
        tokio::spawn(async move {
            scheduler.fire(Trigger::Startup).await;
        })
    };

    let signal = signals.recv().await;
    println!("\nreceived signal {signal}, exit.");

    shutdown_tx.send(true).ok();
    scheduler.wait_idle().await;
    if let Some(daily) = daily {
        daily.await.ok();
    }
    startup.await.ok();

    Ok(())
}

/// One scheduled job: report, then push the outcome.
async fn run_and_notify(
    credentials: &Credentials,
    endpoints: &Endpoints,
    relay: &ServerChan,
) -> RunOutcome {
    let outcome = run_report(credentials, endpoints).await;
    relay.dispatch(&Notification::from(&outcome)).await;
    outcome
}

/// SIGINT/SIGTERM listener, installed before the first run starts.
#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "interrupt",
            _ = self.terminate.recv() => "terminated",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn install() -> std::io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        tokio::signal::ctrl_c().await.ok();
        "interrupt"
    }
}
