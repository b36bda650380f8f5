use clap::{Parser, Subcommand};
use lib::envelope::ChatMessage;

#[derive(Parser)]
#[command(name = "askgate")]
#[command(about = "askgate — forwarding gateway for an inference endpoint", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the gateway (POST /ask, GET /test-connection). Upstream URL and token come from DATABRICKS_ENDPOINT_URL / DATABRICKS_TOKEN or the config file.
    Serve {
        /// Config file path (default: ASKGATE_CONFIG_PATH or ~/.askgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 8000)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 0.0.0.0)
        #[arg(long, short)]
        bind: Option<String>,
    },

    /// Send the canned test message to the upstream once and print the result (no server).
    Check {
        /// Config file path (default: ASKGATE_CONFIG_PATH or ~/.askgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },

    /// Chat through a running gateway (interactive). The conversation so far is sent with each turn.
    Chat {
        /// Config file path (default: ASKGATE_CONFIG_PATH or ~/.askgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Gateway base URL (default: derived from gateway bind and port in config)
        #[arg(long, value_name = "URL")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.command {
        Some(Commands::Serve { .. }) => "info",
        _ => "warn",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Err(e) = lib::config::load_env_file(None) {
        log::warn!("ignoring .env: {:#}", e);
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("askgate {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port, bind }) => {
            if let Err(e) = run_serve(config, port, bind).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Check { config }) => match run_check(config).await {
            Ok(true) => {}
            Ok(false) => std::process::exit(1),
            Err(e) => {
                log::error!("check failed: {:#}", e);
                std::process::exit(1);
            }
        },
        Some(Commands::Chat { config, url }) => {
            if let Err(e) = run_chat(config, url).await {
                log::error!("chat failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
    bind: Option<String>,
) -> anyhow::Result<()> {
    let (mut config, path) = lib::config::load_config(config_path)?;
    log::debug!("config: {}", path.display());
    if let Some(p) = port {
        config.gateway.port = p;
    }
    if let Some(b) = bind {
        config.gateway.bind = b;
    }
    log::info!(
        "starting gateway on {}:{}",
        config.gateway.bind,
        config.gateway.port
    );
    lib::gateway::run_gateway(config).await
}

/// Returns whether the upstream answered.
async fn run_check(config_path: Option<std::path::PathBuf>) -> anyhow::Result<bool> {
    let (config, _) = lib::config::load_config(config_path)?;
    let settings = lib::config::UpstreamSettings::resolve(&config)?;
    let state = lib::gateway::GatewayState::new(config, settings);
    let report = lib::gateway::check_connection(&state).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(report.is_connected())
}

async fn run_chat(
    config_path: Option<std::path::PathBuf>,
    url: Option<String>,
) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let base = match url {
        Some(u) => u.trim_end_matches('/').to_string(),
        None => {
            let (config, _) = lib::config::load_config(config_path)?;
            lib::config::local_base_url(&config.gateway)
        }
    };
    let client = reqwest::Client::new();
    let mut history: Vec<ChatMessage> = Vec::new();
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("/exit") || input.eq_ignore_ascii_case("/quit") {
            break;
        }

        history.push(ChatMessage::user(input));
        match ask_via_gateway(&client, &base, &history).await {
            Ok(reply) => {
                println!("< {}", reply.trim());
                history.push(ChatMessage::assistant(reply));
            }
            Err(e) => {
                history.pop();
                eprintln!("chat error: {}", e);
            }
        }
    }

    Ok(())
}

/// POST the conversation to /ask; returns assistant text, or the raw JSON when no text is found.
async fn ask_via_gateway(
    client: &reqwest::Client,
    base: &str,
    history: &[ChatMessage],
) -> Result<String, String> {
    let res = client
        .post(format!("{}/ask", base))
        .json(&serde_json::json!({ "input": history }))
        .send()
        .await
        .map_err(|e| e.to_string())?;
    let status = res.status();
    let body: serde_json::Value = res.json().await.map_err(|e| e.to_string())?;
    if !status.is_success() {
        let detail = body
            .get("detail")
            .and_then(|v| v.as_str())
            .unwrap_or("request failed");
        return Err(format!("{}: {}", status, detail));
    }
    Ok(lib::upstream::reply_text(&body)
        .unwrap_or_else(|| serde_json::to_string_pretty(&body).unwrap_or_default()))
}
