//! # huddle-app
//!
//! Terminal front-end for the Huddle chat client.
//!
//! Asks for a display name and background colour, then opens a chat session
//! against an in-process remote store. The message list is mirrored into the
//! local SQLite cache while online and served from it while offline.
//!
//! Lines typed at the prompt are sent as messages. `/offline` and `/online`
//! flip connectivity when `HUDDLE_MANUAL_CONNECTIVITY` is set; `/quit`,
//! end of input or Ctrl+C close the session.

mod command;
mod config;
mod start;
mod transcript;

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use huddle_client::{
    spawn_connectivity_bridge, spawn_session, MemoryRemote, RemoteStore, SessionConfig,
    SessionHandle,
};
use huddle_net::{spawn_probe, ConnectivityMonitor, ManualReachability};
use huddle_shared::constants::APP_NAME;
use huddle_shared::{ChatUser, Message, MessageDraft, MessageId, SessionParams, UserId};
use huddle_store::{Database, MemoryStore, MessageCache, StoreError};

use crate::command::Command;
use crate::config::AppConfig;
use crate::transcript::Transcript;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var, writes to stderr)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(
                "huddle_app=info,huddle_client=debug,huddle_store=info,huddle_net=info,warn",
            )
        }))
        .init();

    info!("Starting {} v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = AppConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Start screen
    // -----------------------------------------------------------------------
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let Some(params) = start::prompt(&mut lines).await? else {
        info!("Input closed before the chat opened");
        return Ok(());
    };
    info!(
        name = %params.name,
        color = %params.color,
        user = %params.user_id.short(),
        "Entering chat"
    );

    // -----------------------------------------------------------------------
    // 4. Remote store and connectivity
    // -----------------------------------------------------------------------
    let remote = MemoryRemote::new();
    remote.insert(&config.collection, welcome_message())?;
    let remote: Arc<dyn RemoteStore> = Arc::new(remote);

    let monitor = Arc::new(ConnectivityMonitor::new());
    let (switch, reachability) = if config.manual_connectivity {
        let (switch, reachability) = ManualReachability::new();
        switch.set(true).await;
        (Some(switch), reachability)
    } else {
        let (reachability, _probe) = spawn_probe(config.probe.clone());
        (None, reachability)
    };

    let (notice_tx, mut notice_rx) = mpsc::unbounded_channel();
    let _bridge =
        spawn_connectivity_bridge(reachability, monitor.clone(), remote.clone(), notice_tx);

    // -----------------------------------------------------------------------
    // 5. Chat session
    // -----------------------------------------------------------------------
    let color = params.color;
    let session = open_session(&config, params, remote, &monitor);

    let mut transcript = Transcript::new(session.user().clone(), color);
    println!("{}", transcript.header());

    let mut views = session.watch();
    let initial = views.borrow_and_update().clone();
    print_lines(transcript.update(&initial));

    // -----------------------------------------------------------------------
    // 6. Chat loop (runs until /quit, end of input or Ctrl+C)
    // -----------------------------------------------------------------------
    loop {
        tokio::select! {
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_lines(transcript.update(&view));
            }
            Some(notice) = notice_rx.recv() => {
                println!("! {notice}");
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, shutting down");
                    break;
                };
                match Command::parse(&line) {
                    Command::Say(text) => {
                        if let Err(e) = session.send_text(text).await {
                            println!("! {e}");
                        }
                    }
                    Command::Offline => set_connected(switch.as_ref(), false).await,
                    Command::Online => set_connected(switch.as_ref(), true).await,
                    Command::Quit => break,
                    Command::Unknown(cmd) => println!("! unknown command {cmd}"),
                    Command::Blank => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, shutting down");
                break;
            }
        }
    }

    session.close().await;
    Ok(())
}

/// Spawn the session over the SQLite cache, or an in-memory one if the
/// database cannot be opened.
fn open_session(
    config: &AppConfig,
    params: SessionParams,
    remote: Arc<dyn RemoteStore>,
    monitor: &ConnectivityMonitor,
) -> SessionHandle {
    let session_config = SessionConfig {
        collection: config.collection.clone(),
        ..SessionConfig::default()
    };

    match open_database(config) {
        Ok(db) => spawn_session(
            params,
            remote,
            MessageCache::new(db),
            monitor.subscribe(),
            session_config,
        ),
        Err(e) => {
            warn!(error = %e, "Cache database unavailable, offline history will not persist");
            spawn_session(
                params,
                remote,
                MessageCache::new(MemoryStore::new()),
                monitor.subscribe(),
                session_config,
            )
        }
    }
}

fn open_database(config: &AppConfig) -> Result<Database, StoreError> {
    match &config.db_path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            info!(path = %path.display(), "opening database");
            Database::open_at(path)
        }
        None => Database::new(),
    }
}

/// System line seeded into the in-process remote so a fresh chat is not blank.
fn welcome_message() -> Message {
    let host = ChatUser::new(UserId::from("system"), APP_NAME);
    let draft = MessageDraft {
        system: true,
        ..MessageDraft::text(host, format!("Welcome to {APP_NAME}"))
    };
    Message::from_draft(MessageId::generate(), draft)
}

async fn set_connected(switch: Option<&ManualReachability>, is_connected: bool) {
    match switch {
        Some(switch) => {
            switch.set(is_connected).await;
        }
        None => println!(
            "! connectivity is probed automatically; \
             set HUDDLE_MANUAL_CONNECTIVITY=true to switch it by hand"
        ),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
