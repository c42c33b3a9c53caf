use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use framing_advisor::api::ApiServer;
use framing_advisor::client::{SubmitClient, encode_data_uri};
use framing_advisor::{Advisor, ChatCompletionOracle, Config, SessionStore};

/// Framing Advisor - session-aware camera framing advice
#[derive(Parser)]
#[command(name = "framing-advisor", version, about)]
struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, env = "FRAMING_ADVISOR_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Send a sequence of images to a running server
    Submit {
        /// Server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:8000")]
        server: String,
        /// Session id (random if omitted)
        #[arg(long)]
        session: Option<String>,
        /// Seconds to wait between frames
        #[arg(short, long, default_value = "2")]
        interval: u64,
        /// Image files, in capture order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,framing_advisor=info",
        1 => "info,framing_advisor=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        None => serve(cli.config, None, None).await,
        Some(Command::Serve { host, port }) => serve(cli.config, host, port).await,
        Some(Command::Submit {
            server,
            session,
            interval,
            images,
        }) => submit(&server, session, Duration::from_secs(interval), &images).await,
    }
}

/// Run the advisor server until interrupted
async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let mut config = Config::load(config_path.as_deref())?;
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    if config.oracle.api_key.is_none() {
        tracing::warn!(
            "{} is not set; every request will be answered with a configuration error",
            framing_advisor::config::API_KEY_ENV
        );
    }

    let store = Arc::new(SessionStore::new(config.advisor.store_config()));
    let sweeper = config
        .advisor
        .sweep_interval
        .map(|every| store.spawn_sweeper(every));

    let oracle = Arc::new(ChatCompletionOracle::new(&config.oracle)?);
    let advisor = Advisor::new(store, oracle)
        .with_system_prompt(config.oracle.system_prompt.clone())
        .with_detailed_logging(config.advisor.detailed_logging);

    tracing::info!(
        model = %config.oracle.model,
        max_queue_length = config.advisor.max_queue_length,
        session_ttl_secs = config.advisor.session_ttl.as_secs(),
        "starting framing advisor"
    );

    let server = ApiServer::new(
        Arc::new(advisor),
        config.oracle.model.clone(),
        config.server.host.clone(),
        config.server.port,
    )
    .with_max_body_bytes(config.server.max_body_bytes);
    let result = server.run().await;

    if let Some(handle) = sweeper {
        handle.abort();
    }

    result?;
    Ok(())
}

/// Send images in order until the advisor says the frame is ready
async fn submit(
    server: &str,
    session: Option<String>,
    interval: Duration,
    images: &[PathBuf],
) -> anyhow::Result<()> {
    let client = SubmitClient::new(server, Duration::from_secs(60))?;
    let session_id = session.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    println!("Starting session {session_id}\n");

    for (i, path) in images.iter().enumerate() {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("--- Frame {}: {name} ---", i + 1);

        let img = match encode_data_uri(path) {
            Ok(img) => img,
            Err(e) => {
                println!("Skipping {name}: {e}");
                continue;
            }
        };

        let advice = client.submit(&session_id, img).await?;
        println!("Suggestion: {}", advice.suggestion);

        if advice.is_ready() {
            println!("Status: ready to shoot");
            break;
        }
        println!("Status: needs adjustment");

        if i + 1 < images.len() {
            tokio::time::sleep(interval).await;
        }
    }

    println!("\nDone.");
    Ok(())
}
