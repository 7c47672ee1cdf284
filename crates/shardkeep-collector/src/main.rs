mod command;
mod config;

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use shardkeep_db::Database;
use shardkeep_ingest::{
    ChannelSource, Dealer, IngestSession, Scanner, SqliteStore, Store, TracingReporter, progress, recover,
};

use crate::command::{Command, USAGE};
use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shardkeep=debug,shardkeep_ingest=debug".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args).with_context(|| USAGE)?;
    let config = Config::from_env()?;

    match command {
        // Dealing needs no collector state
        Command::Deal { shares, threshold, plaintext } => deal(shares, threshold, &plaintext),
        command => {
            let db = Database::open(&config.db_path)?;
            run(command, Arc::new(SqliteStore::new(db)), &config).await
        }
    }
}

async fn run(command: Command, store: Arc<SqliteStore>, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Scan => scan(store, config).await,
        Command::List => list(store.as_ref()).await,
        Command::Recover { message_id } => {
            let recovered = recover(store.as_ref(), &message_id).await?;
            match recovered.plaintext_utf8() {
                Some(text) => println!("{}", text),
                None => println!("{}", hex::encode(&recovered.plaintext)),
            }
            Ok(())
        }
        Command::Clear => {
            store.clear().await?;
            info!("All messages and shares removed");
            Ok(())
        }
        Command::Deal { shares, threshold, plaintext } => deal(shares, threshold, &plaintext),
    }
}

fn deal(shares: u32, threshold: u32, plaintext: &str) -> anyhow::Result<()> {
    let deal = Dealer::generate().seal(plaintext.as_bytes(), shares, threshold)?;
    println!("{}", deal.message_token);
    for token in &deal.share_tokens {
        println!("{}", token);
    }
    Ok(())
}

async fn scan(store: Arc<SqliteStore>, config: &Config) -> anyhow::Result<()> {
    let (tx, source) = ChannelSource::channel(64);
    let session = Arc::new(IngestSession::new(store));
    let scanner = Arc::new(Scanner::new(
        session,
        Box::new(source),
        Arc::new(TracingReporter),
        Scanner::interval_for_fps(config.scan_fps),
    ));

    // One token per stdin line; EOF closes the source
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let token = line.trim();
                    if token.is_empty() {
                        continue;
                    }
                    if tx.send(token.to_string()).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("stdin read failed: {}", e);
                    break;
                }
            }
        }
    });

    tokio::spawn({
        let scanner = scanner.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                scanner.stop();
            }
        }
    });

    let summary = scanner.run().await.context("scanner already running")?;
    info!(
        polled = summary.polled,
        stored = summary.stored,
        duplicates = summary.duplicates,
        rejected = summary.rejected,
        "Scan finished"
    );
    Ok(())
}

async fn list(store: &dyn Store) -> anyhow::Result<()> {
    for entry in progress(store).await? {
        let message = &entry.message;
        println!(
            "{}  {}/{} shares ({}%){}  created {}  sender {}",
            message.id,
            entry.collected(),
            message.threshold,
            entry.percent(),
            if entry.ready() { "  ready" } else { "" },
            message.created_at.to_rfc3339(),
            hex::encode(message.sender_public_key),
        );
        println!("    ciphertext {}", hex::encode(&message.ciphertext));
        println!("    nonce      {}", hex::encode(&message.nonce));
        for share in &entry.shares {
            println!("    share x={}  scanned {}", share.x_hex(), share.scanned_at.to_rfc3339());
        }
    }
    Ok(())
}
