mod config;
mod error;

use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use repository::{Backends, SqliteStore};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "binder.toml";

#[derive(Parser)]
#[command(name = "articles")]
#[command(about = "Publish articles through capability-bound services", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to ./binder.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Publish an article, or a random uuid when none is given
    Publish {
        #[arg(short, long)]
        uuid: Option<Uuid>,
    },
    /// Publish an article credited to an author
    Credit {
        /// External id of the author
        #[arg(short, long)]
        author: i64,
        #[arg(short, long)]
        uuid: Option<Uuid>,
    },
    /// Reassign an article to an author (not granted article access)
    Reassign {
        #[arg(short, long)]
        author: i64,
        #[arg(short, long)]
        title: String,
    },
    /// Add or rename an author in the sqlite database
    AddAuthor {
        #[arg(short, long)]
        id: i64,
        #[arg(short, long)]
        name: String,
    },
    /// Add an unpublished article to the sqlite database
    AddArticle {
        #[arg(short, long)]
        title: String,
        #[arg(short, long)]
        uuid: Option<Uuid>,
    },
    /// Show when an article was published
    Status {
        #[arg(short, long)]
        uuid: Uuid,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    init_tracing(&config.log.filter);
    let backends = config.repository.backends();

    match cli.command {
        Commands::Publish { uuid } => cmd_publish(&backends, uuid),
        Commands::Credit { author, uuid } => cmd_credit(&backends, author, uuid),
        Commands::Reassign { author, title } => cmd_reassign(&backends, author, title).await,
        Commands::AddAuthor { id, name } => cmd_add_author(&backends, id, &name),
        Commands::AddArticle { title, uuid } => cmd_add_article(&backends, &title, uuid),
        Commands::Status { uuid } => cmd_status(&backends, uuid),
    }
}

fn cmd_publish(backends: &Backends, uuid: Option<Uuid>) -> Result<()> {
    let publish = service::bind_publish_article(&backends.module())?;
    let published = publish.call(uuid)?;
    println!("published: {published}");
    Ok(())
}

fn cmd_credit(backends: &Backends, author: i64, uuid: Option<Uuid>) -> Result<()> {
    let credit = service::bind_publish_credited(&backends.module())?;
    let published = credit.call((uuid, author))?;
    println!("published: {published}");
    Ok(())
}

async fn cmd_reassign(backends: &Backends, author: i64, title: String) -> Result<()> {
    let reassign = service::bind_reassign(&backends.module())?;
    let score = reassign.call((author, title)).await?;
    println!("reassigned: {score}");
    Ok(())
}

fn cmd_add_author(backends: &Backends, id: i64, name: &str) -> Result<()> {
    open_store(backends)?.add_author(id, name)?;
    println!("author {id}: {name}");
    Ok(())
}

fn cmd_add_article(backends: &Backends, title: &str, uuid: Option<Uuid>) -> Result<()> {
    let uuid = uuid.unwrap_or_else(Uuid::new_v4);
    open_store(backends)?.add_article(uuid, title)?;
    println!("{uuid}");
    Ok(())
}

fn cmd_status(backends: &Backends, uuid: Uuid) -> Result<()> {
    match open_store(backends)?.published_at(uuid)? {
        Some(published_at) => {
            let local = Local
                .from_utc_datetime(&published_at.naive_utc())
                .format("%Y-%m-%d %H:%M");
            println!("{uuid}: published {local}");
        }
        None => println!("{uuid}: not published"),
    }
    Ok(())
}

fn open_store(backends: &Backends) -> Result<SqliteStore> {
    let path = backends.sqlite_path().ok_or(Error::NoDatabase)?;
    Ok(SqliteStore::open(path)?)
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Ok(Config::load(path)?),
        None if Path::new(CONFIG_FILE).exists() => Ok(Config::load(CONFIG_FILE)?),
        None => Ok(Config::default()),
    }
}

fn init_tracing(filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
