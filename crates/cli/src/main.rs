use clap::{Parser, Subcommand};
use messenger::facebook::{build_payload, Button, GraphClient, Question, Reply};

#[derive(Parser)]
#[command(name = "fbgate")]
#[command(about = "Facebook Messenger webhook gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the gateway (webhook verification + delivery endpoints). Inbound messages are echoed back.
    Gateway {
        /// Config file path (default: FBGATE_CONFIG_PATH or ~/.fbgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 15152)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Send a text message to a page-scoped user id through the Send API.
    Send {
        /// Config file path (default: FBGATE_CONFIG_PATH or ~/.fbgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// Recipient page-scoped id.
        #[arg(long, short, value_name = "ID")]
        recipient: String,

        /// Quick reply button; repeat for several. Turns the message into a question.
        #[arg(long = "button", value_name = "TEXT")]
        buttons: Vec<String>,

        text: String,
    },

    /// Print the Graph API profile of a page-scoped user id as JSON.
    Profile {
        /// Config file path (default: FBGATE_CONFIG_PATH or ~/.fbgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        id: String,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("fbgate {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Gateway { config, port }) => {
            if let Err(e) = run_gateway(config, port).await {
                log::error!("gateway failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send {
            config,
            recipient,
            buttons,
            text,
        }) => {
            if let Err(e) = run_send(config, recipient, buttons, text).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Profile { config, id }) => {
            if let Err(e) = run_profile(config, id).await {
                log::error!("profile failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_gateway(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, path) = messenger::config::load_config(config_path)?;
    if let Some(p) = port {
        config.gateway.port = p;
    }
    log::info!(
        "starting gateway on {}:{} (config {})",
        config.gateway.bind,
        config.gateway.port,
        path.display()
    );
    messenger::gateway::run_gateway(config).await
}

fn graph_client(config_path: Option<std::path::PathBuf>) -> anyhow::Result<(GraphClient, String)> {
    let (config, _) = messenger::config::load_config(config_path)?;
    let facebook = messenger::config::resolve_facebook_config(&config);
    if !facebook.is_configured() {
        anyhow::bail!("facebook page token not configured (set facebook.token or FACEBOOK_TOKEN)");
    }
    Ok((GraphClient::new(&facebook), facebook.token().to_string()))
}

async fn run_send(
    config_path: Option<std::path::PathBuf>,
    recipient: String,
    buttons: Vec<String>,
    text: String,
) -> anyhow::Result<()> {
    let (client, token) = graph_client(config_path)?;
    let reply = if buttons.is_empty() {
        Reply::Text(text)
    } else {
        Reply::Question(Question::new(text).add_buttons(buttons.into_iter().map(Button::new)))
    };
    let payload = build_payload(&reply, &recipient, &serde_json::Value::Null, &token)?;
    let response = client.send_payload(&payload).await?;
    println!("{}", response.body.trim());
    Ok(())
}

async fn run_profile(config_path: Option<std::path::PathBuf>, id: String) -> anyhow::Result<()> {
    let (client, _) = graph_client(config_path)?;
    let profile = client.user_profile(&id).await?;
    println!("{}", serde_json::to_string_pretty(&profile.info)?);
    Ok(())
}
