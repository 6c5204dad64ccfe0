use std::cmp::Reverse;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use mechbot_gateway::db::{self, UserRepo};
use mechbot_gateway::knowledge::similarity;
use mechbot_gateway::{
    ApiServer, ApiState, ChatRequest, ChatService, Config, IntentClassifier, KnowledgeBase,
};

/// Mechbot - mechanical engineering Q&A gateway
#[derive(Parser)]
#[command(name = "mechbot", version, about)]
struct Cli {
    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Knowledge base JSON file (overrides config)
    #[arg(long)]
    knowledge: Option<PathBuf>,

    /// `SQLite` database file (overrides config)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Print the intent of a message
    Classify {
        /// Message to classify
        message: String,
    },
    /// Answer a single message and record it
    Ask {
        /// User ID to answer as
        #[arg(short, long, default_value = "user1")]
        user: String,
        /// Message to answer
        message: String,
    },
    /// Register a user or rename an existing one
    AddUser {
        /// User ID
        #[arg(short, long)]
        user: String,
        /// Display name
        #[arg(short, long)]
        name: String,
    },
    /// List registered users
    ListUsers,
    /// Load the knowledge base and report on it
    CheckKnowledge {
        /// Show the closest questions to this query
        #[arg(long)]
        probe: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,mechbot_gateway=info",
        1 => "info,mechbot_gateway=debug",
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
    let mut config = Config::load()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(path) = cli.knowledge {
        config.knowledge_path = path;
    }
    if let Some(path) = cli.db {
        config.database_path = path;
    }

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&config).await,
        Command::Classify { message } => {
            println!("{}", IntentClassifier::default().classify(&message));
            Ok(())
        }
        Command::Ask { user, message } => ask(&config, &user, &message),
        Command::AddUser { user, name } => add_user(&config, &user, &name),
        Command::ListUsers => list_users(&config),
        Command::CheckKnowledge { probe } => {
            check_knowledge(&config, probe.as_deref());
            Ok(())
        }
    }
}

async fn serve(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        port = config.server.port,
        database = %config.database_path.display(),
        knowledge = %config.knowledge_path.display(),
        threshold = config.matching.threshold,
        "starting mechbot gateway"
    );

    let pool = db::init(&config.database_path)?;
    let knowledge = Arc::new(KnowledgeBase::load_or_empty(&config.knowledge_path));
    let chat = ChatService::from_config(config, pool.clone(), knowledge);

    let server = ApiServer::new(ApiState::new(pool, chat), config.server.port);
    let handle = server.spawn();

    tokio::select! {
        result = handle => {
            result??;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutting down");
        }
    }

    Ok(())
}

fn ask(config: &Config, user: &str, message: &str) -> anyhow::Result<()> {
    let pool = db::init(&config.database_path)?;
    let knowledge = Arc::new(KnowledgeBase::load_or_empty(&config.knowledge_path));
    let chat = ChatService::from_config(config, pool, knowledge);

    let mut rng = StdRng::from_entropy();
    let reply = chat.respond(&ChatRequest::new(user, message), &mut rng)?;

    println!("[{}] {}", reply.intent, reply.response);
    Ok(())
}

fn add_user(config: &Config, user: &str, name: &str) -> anyhow::Result<()> {
    let pool = db::init(&config.database_path)?;
    let created = UserRepo::new(pool).upsert(user, name)?;

    println!("{} ({})", created.id, created.username);
    Ok(())
}

fn list_users(config: &Config) -> anyhow::Result<()> {
    let pool = db::init(&config.database_path)?;
    for user in UserRepo::new(pool).list()? {
        println!("{}\t{}\t{}", user.id, user.username, user.created_at.to_rfc3339());
    }
    Ok(())
}

fn check_knowledge(config: &Config, probe: Option<&str>) {
    let knowledge = KnowledgeBase::load_or_empty(&config.knowledge_path);
    println!(
        "{}: {} entries",
        config.knowledge_path.display(),
        knowledge.len()
    );

    let Some(probe) = probe else {
        return;
    };

    let mut scored: Vec<(u8, &str)> = knowledge
        .entries()
        .iter()
        .map(|e| (similarity(probe, &e.question), e.question.as_str()))
        .collect();
    scored.sort_by_key(|(score, _)| Reverse(*score));

    let threshold = config.matching.threshold;
    for (score, question) in scored.iter().take(5) {
        let marker = if *score > threshold { "*" } else { " " };
        println!("{marker} {score:>3}  {question}");
    }
}
