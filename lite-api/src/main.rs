//! lite-api service binary.
//!
//! # Configuration
//! Settings come from built-in defaults, an optional `lite-api.{toml,yaml,json}`
//! file, environment variables (a `.env` file is honoured) and finally the
//! flags of the `start` subcommand.
//!
//! | Env var              | Flag             | Default                          |
//! |----------------------|------------------|----------------------------------|
//! | `APP_PORT`           | `-p, --port`     | `:8080`                          |
//! | `MODE`               | `-m, --mode`     | `dev`                            |
//! | `HOTELBEDS_HOST`     | `-o, --host`     | `https://api.test.hotelbeds.com` |
//! | `HOTELBEDS_API_KEY`  | `-k, --apikey`   | required                         |
//! | `HOTELBEDS_SECRET`   | `-s, --secret`   | required                         |
//! | `LOG_LEVEL`          |                  | `DEBUG` in dev, else `INFO`      |

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use lite_api::{
    app,
    client::HotelbedsClient,
    clock::SystemClock,
    config::{Overrides, Settings},
    service::HotelService,
    telemetry, AppState,
};

#[derive(Debug, Parser)]
#[command(name = "lite-api")]
#[command(about = "Hotel availability gateway in front of Hotelbeds")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the HTTP server.
    Start(StartArgs),
}

#[derive(Debug, clap::Args)]
struct StartArgs {
    /// Listen address, e.g. `:8080` or `127.0.0.1:8080`.
    #[arg(short = 'p', long = "port")]
    port: Option<String>,
    /// Application mode; `dev` enables debug logging.
    #[arg(short = 'm', long = "mode")]
    mode: Option<String>,
    /// Hotelbeds API base URL.
    #[arg(short = 'o', long = "host")]
    host: Option<String>,
    #[arg(short = 'k', long = "apikey")]
    apikey: Option<String>,
    #[arg(short = 's', long = "secret")]
    secret: Option<String>,
}

impl From<StartArgs> for Overrides {
    fn from(args: StartArgs) -> Self {
        Overrides {
            app_port: args.port,
            mode: args.mode,
            hotelbeds_host: args.host,
            hotelbeds_api_key: args.apikey,
            hotelbeds_secret: args.secret,
        }
    }
}

// ------------------------------------------------------------------ //
//  Entry point                                                        //
// ------------------------------------------------------------------ //

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Start(args) => start(args.into()).await,
    }
}

async fn start(overrides: Overrides) -> Result<()> {
    let settings = Settings::load(overrides)?;
    telemetry::init(&settings)?;

    let client = HotelbedsClient::new(settings.supplier(), Arc::new(SystemClock))?;
    info!(
        host = client.host(),
        mode = %settings.mode,
        "hotelbeds client configured"
    );

    let app = app(AppState {
        service: HotelService::new(Arc::new(client)),
    });

    let bind_addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = bind_addr, "lite-api listening");

    lite_api::serve(listener, app, shutdown_signal(), lite_api::SHUTDOWN_TIMEOUT).await?;

    info!("lite-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
}
