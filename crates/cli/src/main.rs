use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use zerochat::chain::{decode_payload, encode_payload, fetch_record, short_address, ChainWriter};
use zerochat::chat::{ChatGateway, ChatSession, Sender};
use zerochat::http::HttpClient;
use zerochat::wallet::{JsonRpcProvider, WalletProvider, WalletSession};

#[derive(Parser)]
#[command(name = "zerochat")]
#[command(about = "Zerochat CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Write a default config file if none exists.
    Init {
        /// Config file path (default: ZEROCHAT_CONFIG_PATH or ~/.zerochat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Chat with the assistant (interactive). `/retry` regenerates the last reply, `/clear` resets, `/exit` quits.
    Chat {
        /// Config file path (default: ZEROCHAT_CONFIG_PATH or ~/.zerochat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Write TEXT on chain as calldata of a zero-value transaction to the zero address.
    Send {
        /// Config file path (default: ZEROCHAT_CONFIG_PATH or ~/.zerochat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        text: String,
    },

    /// Show the latest zero-address transaction from the list endpoint.
    Records {
        /// Config file path (default: ZEROCHAT_CONFIG_PATH or ~/.zerochat/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print TEXT as 0x-prefixed UTF-8 hex.
    Encode { text: String },

    /// Decode 0x-prefixed (or bare) hex back to UTF-8 text.
    Decode { hex: String },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("zerochat {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Chat { config }) => {
            if let Err(e) = run_chat(config).await {
                log::error!("chat failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Send { config, text }) => {
            if let Err(e) = run_send(config, &text).await {
                log::error!("send failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Records { config, json }) => {
            if let Err(e) = run_records(config, json).await {
                log::error!("records failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Encode { text }) => {
            println!("{}", encode_payload(&text));
        }
        Some(Commands::Decode { hex }) => match decode_payload(&hex) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                log::error!("decode failed: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(zerochat::config::default_config_path);
    let written = zerochat::init::init_config_dir(&path)?;
    println!("initialized configuration at {}", written.display());
    Ok(())
}

async fn run_chat(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    use std::io::{self, Write};

    let (config, _) = zerochat::config::load_config(config_path)?;
    let http = HttpClient::from_config(&config)?;
    let session = ChatSession::new(Arc::new(ChatGateway::new(
        config.chat.endpoint.clone(),
        http,
    )));
    for message in session.messages().await {
        println!("< {}", message.content);
    }

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
        if input.eq_ignore_ascii_case("/clear") {
            session.clear().await;
            if let Some(notice) = session.messages().await.last() {
                println!("< {}", notice.content);
            }
            continue;
        }

        let reply = if input.eq_ignore_ascii_case("/retry") {
            let log = session.messages().await;
            match log.iter().rposition(|m| m.sender == Sender::Ai) {
                Some(index) => session.regenerate(index).await,
                None => continue,
            }
        } else {
            session.submit(input).await
        };
        match reply {
            Ok(message) => println!("< {}", message.content.trim()),
            Err(e) => eprintln!("chat error: {}", e),
        }
    }

    Ok(())
}

async fn run_send(config_path: Option<PathBuf>, text: &str) -> anyhow::Result<()> {
    let (config, _) = zerochat::config::load_config(config_path)?;
    let provider: Arc<dyn WalletProvider> =
        Arc::new(JsonRpcProvider::new(config.chain.rpc_url.clone()));
    let session = Arc::new(WalletSession::new(Some(provider)));

    let account = match session.check_existing().await? {
        Some(account) => account,
        None => session.connect().await?,
    };
    log::info!("sending from {}", account);

    let writer = ChainWriter::new(session, &config.chain);
    let hash = writer
        .send_payload(text)
        .await
        .into_result()
        .map_err(anyhow::Error::msg)?;
    println!("{}", hash);
    Ok(())
}

async fn run_records(config_path: Option<PathBuf>, as_json: bool) -> anyhow::Result<()> {
    let (config, _) = zerochat::config::load_config(config_path)?;
    let http = HttpClient::from_config(&config)?;
    let record = fetch_record(&http, &config.chain.list_endpoint)
        .await
        .into_result()
        .map_err(anyhow::Error::msg)?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }
    println!("hash:    {}", record.hash);
    println!("from:    {}", short_address(&record.from));
    println!("to:      {}", short_address(&record.to));
    println!("value:   {}", record.value);
    println!("payload: {}", record.decoded_payload);
    Ok(())
}
