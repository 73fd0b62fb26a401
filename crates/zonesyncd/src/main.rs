// # zonesyncd
//
// Daemon and one-shot CLI for the zonesync system.
//
// This is a thin integration layer: it loads configuration, wires the
// Technitium client and the Redis store into the core Reconciler, and
// picks a driver. All reconciliation logic lives in zonesync-core.
//
// ## Configuration
//
// Connection settings come from environment variables:
//
// - `ZONESYNC_API_URL`: Technitium API base URL (required)
// - `ZONESYNC_API_TOKEN`: API token (required)
// - `ZONESYNC_REDIS_HOST`: store host (default 127.0.0.1)
// - `ZONESYNC_REDIS_PORT`: store port (default 6379)
// - `ZONESYNC_REDIS_DB`: database index (default 4)
// - `ZONESYNC_PENDING_KEY`: pending change set key (default dns_update)
// - `ZONESYNC_VALIDATION_KEY`: validation flag key
//   (default dns_validation_complete)
// - `ZONESYNC_TTL`: TTL for created records (default 60)
// - `ZONESYNC_POLL_INTERVAL`: daemon cycle interval in seconds
//   (default 300)
//
// ## Example
//
// ```bash
// export ZONESYNC_API_URL=https://dns.internal/api
// export ZONESYNC_API_TOKEN=your_token
//
// zonesyncd --zone example.com daemon
// zonesyncd --zone example.com once --list-zone
// zonesyncd --zone example.com once --name host1 --record-type A --value 10.0.0.5
// ```

use std::env;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use zonesync_core::{ApiConfig, Reconciler, RecordType, StoreConfig, ZoneSyncConfig};
use zonesync_provider_technitium::TechnitiumClient;
use zonesync_store_redis::RedisQueueStore;

/// Exit codes for different termination scenarios
///
/// - 0: clean shutdown
/// - 1: configuration or input error, nothing was attempted
/// - 2: runtime error
#[derive(Debug, Clone, Copy)]
enum ZoneSyncExitCode {
    CleanShutdown = 0,
    ConfigError = 1,
    RuntimeError = 2,
}

impl From<ZoneSyncExitCode> for ExitCode {
    fn from(code: ZoneSyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// A utility for reconciling DNS records against queued change requests
#[derive(Parser, Debug)]
#[command(name = "zonesyncd", version, about)]
struct Cli {
    /// The zone to operate on (e.g. example.com)
    #[arg(short = 'd', long)]
    zone: String,

    /// Turn on debug logging
    #[arg(short = 'v', long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the pending queue and reconcile forever
    Daemon,

    /// Perform one pass and exit
    Once {
        /// List all records in the zone
        #[arg(short = 'l', long)]
        list_zone: bool,

        /// Apply every entry currently in the queue (create/update only;
        /// no validation wait, no cleanup)
        #[arg(short = 'q', long)]
        from_queue: bool,

        /// Name for a manually specified record
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Type for a manually specified record (A, AAAA, CNAME, MX, TXT)
        #[arg(short = 't', long)]
        record_type: Option<String>,

        /// Value for a manually specified record
        #[arg(long)]
        value: Option<String>,
    },
}

/// Load connection settings from the environment
///
/// A missing API URL or token is fatal here, before any work starts.
fn config_from_env(zone: String) -> Result<ZoneSyncConfig> {
    let base_url = env::var("ZONESYNC_API_URL")
        .map_err(|_| anyhow::anyhow!("ZONESYNC_API_URL is required"))?;
    let token = env::var("ZONESYNC_API_TOKEN")
        .map_err(|_| anyhow::anyhow!("ZONESYNC_API_TOKEN is required"))?;

    let store = StoreConfig {
        host: env::var("ZONESYNC_REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
        port: env::var("ZONESYNC_REDIS_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6379),
        db: env::var("ZONESYNC_REDIS_DB")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(4),
        pending_key: env::var("ZONESYNC_PENDING_KEY")
            .unwrap_or_else(|_| "dns_update".to_string()),
        validation_key: env::var("ZONESYNC_VALIDATION_KEY")
            .unwrap_or_else(|_| "dns_validation_complete".to_string()),
    };

    let config = ZoneSyncConfig {
        api: ApiConfig { base_url, token },
        store,
        zone,
        ttl: env::var("ZONESYNC_TTL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(60),
        poll_interval_secs: env::var("ZONESYNC_POLL_INTERVAL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(300),
    };

    config.validate()?;
    Ok(config)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing before anything that might log
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ZoneSyncExitCode::ConfigError.into();
    }

    // Load and validate configuration; exits before any work on failure
    let config = match config_from_env(cli.zone.clone()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ZoneSyncExitCode::ConfigError.into();
        }
    };

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ZoneSyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        match run(cli, config).await {
            Ok(code) => code,
            Err(e) => {
                error!("Runtime error: {}", e);
                ZoneSyncExitCode::RuntimeError
            }
        }
    })
    .into()
}

/// Wire the clients together and dispatch on the selected driver
async fn run(cli: Cli, config: ZoneSyncConfig) -> Result<ZoneSyncExitCode> {
    let api = TechnitiumClient::new(&config.api.base_url, &config.api.token)?;
    let store = RedisQueueStore::connect(&config.store).await?;

    // The Redis store serves both seams; clones share one connection
    let reconciler = Reconciler::new(
        Box::new(api),
        Box::new(store.clone()),
        Box::new(store),
        &config,
    )?;

    match cli.command {
        Command::Daemon => {
            reconciler.run().await?;
            Ok(ZoneSyncExitCode::CleanShutdown)
        }
        Command::Once {
            list_zone,
            from_queue,
            name,
            record_type,
            value,
        } => run_once(&reconciler, list_zone, from_queue, name, record_type, value).await,
    }
}

/// One-shot pass: list and/or apply, no validation wait, no cleanup
async fn run_once(
    reconciler: &Reconciler,
    list_zone: bool,
    from_queue: bool,
    name: Option<String>,
    record_type: Option<String>,
    value: Option<String>,
) -> Result<ZoneSyncExitCode> {
    if list_zone {
        reconciler.list_zone().await?;
    }

    if from_queue {
        let applied = reconciler.apply_pending_once().await?;
        info!(applied, "queue entries applied");
    }

    if let Some(name) = name {
        // Validate the manual record before any network call
        let Some(record_type) = record_type else {
            error!("a record type is required when adding a record manually (-t)");
            return Ok(ZoneSyncExitCode::ConfigError);
        };
        let record_type: RecordType = match record_type.parse() {
            Ok(rt) => rt,
            Err(e) => {
                error!("{}", e);
                return Ok(ZoneSyncExitCode::ConfigError);
            }
        };
        let Some(value) = value else {
            error!("a value is required when adding a record manually (--value)");
            return Ok(ZoneSyncExitCode::ConfigError);
        };

        let added = reconciler.apply_record(&name, record_type, &value).await?;
        info!(record = %name, response = %added, "record added");
    }

    Ok(ZoneSyncExitCode::CleanShutdown)
}
