//! `wassup`: command-line client for the Wassup server.
//!
//! # Usage
//!
//! ```text
//! wassup --user alice create-user alice "Alice Liddell"
//! wassup --user alice send-sup bob
//! wassup --user bob sups
//! wassup dump wassup_app_db.json
//! ```

mod client;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ClientConfig, WassupClient};
use serde::Serialize;
use serde_json::Value;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wassup_core::{Database, UserId, store::SupStore};
use wassup_store_file::FileStore;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "wassup", about = "Command-line client for the Wassup server")]
struct Args {
  /// Base URL of the server.
  #[arg(long, env = "WASSUP_URL", default_value = "http://localhost:8080")]
  url: String,

  /// User to act as.
  #[arg(short, long, env = "WASSUP_USER")]
  user: Option<String>,

  #[command(subcommand)]
  command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
  /// Print the contents of a store file without contacting a server.
  Dump { file: PathBuf },
  #[command(flatten)]
  Remote(RemoteCmd),
}

/// Commands sent to the server as the `--user`.
#[derive(Subcommand, Debug)]
enum RemoteCmd {
  /// Register a user (no-op if the id is taken).
  CreateUser { user_id: String, full_name: String },
  /// Check whether a user exists.
  UserExists { user_id: String },
  /// Add a friend to your list.
  AddFriend {
    user_id:   String,
    /// Only add the friend if they are a registered user.
    #[arg(long)]
    if_exists: bool,
  },
  /// Remove a friend from your list.
  RemoveFriend { user_id: String },
  /// List your friends.
  Friends,
  /// Send a sup to another user.
  SendSup {
    to:     String,
    /// Sup id; a random UUID by default.
    #[arg(long)]
    sup_id: Option<String>,
  },
  /// Remove every sup with the given id from your inbox.
  RemoveSup { sup_id: String },
  /// Empty your inbox.
  ClearSups,
  /// List the sups in your inbox.
  Sups,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let args = Args::parse();

  match args.command {
    Cmd::Dump { file } => dump(&file).await,
    Cmd::Remote(command) => {
      let Some(user) = args.user else {
        bail!("--user (or WASSUP_USER) is required to talk to the server");
      };
      let client = WassupClient::new(ClientConfig {
        base_url: args.url,
        user_id:  UserId::from(user),
      })?;
      run(&client, command).await
    }
  }
}

async fn run(client: &WassupClient, command: RemoteCmd) -> Result<()> {
  match command {
    RemoteCmd::CreateUser { user_id, full_name } => {
      print(&client.create_user(user_id.into(), full_name).await?)
    }
    RemoteCmd::UserExists { user_id } => print(&client.user_exists(user_id.into()).await?),
    RemoteCmd::AddFriend { user_id, if_exists: true } => {
      print(&client.add_friend_if_exists(user_id.into()).await?)
    }
    RemoteCmd::AddFriend { user_id, if_exists: false } => {
      print(&client.add_friend(user_id.into()).await?)
    }
    RemoteCmd::RemoveFriend { user_id } => print(&client.remove_friend(user_id.into()).await?),
    RemoteCmd::Friends => print(&client.get_friends().await?),
    RemoteCmd::SendSup { to, sup_id } => {
      let sup_id = sup_id.unwrap_or_else(|| Uuid::new_v4().to_string());
      let date = chrono::Utc::now().to_rfc3339();
      print(
        &client
          .send_sup(to.into(), Value::String(sup_id), Value::String(date))
          .await?,
      )
    }
    RemoteCmd::RemoveSup { sup_id } => print(&client.remove_sup(Value::String(sup_id)).await?),
    RemoteCmd::ClearSups => print(&client.clear_sups().await?),
    RemoteCmd::Sups => print(&client.get_sups().await?),
  }
}

/// Print a store file the way the server would load it.
async fn dump(file: &Path) -> Result<()> {
  print(&load_existing(file).await?)
}

/// Load a store file that must already exist. Unlike the server, a missing
/// file is an error rather than an empty database.
async fn load_existing(file: &Path) -> Result<Database> {
  let exists = tokio::fs::try_exists(file)
    .await
    .with_context(|| format!("checking {}", file.display()))?;
  if !exists {
    bail!("no store file at {}", file.display());
  }
  FileStore::new(file)
    .load()
    .await
    .with_context(|| format!("reading {}", file.display()))
}

fn print<T: Serialize>(value: &T) -> Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test]
  async fn missing_store_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("typo.json");
    let err = load_existing(&path).await.unwrap_err();
    assert_eq!(err.to_string(), format!("no store file at {}", path.display()));
    assert!(!path.exists());
  }

  #[tokio::test]
  async fn existing_store_file_loads() {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = FileStore::new(dir.path().join("db.json"));
    let mut db = Database::new();
    db.create_user("alice".into(), "Alice");
    store.save(&db).await.unwrap();

    let loaded = load_existing(store.path()).await.unwrap();
    assert_eq!(loaded, db);
  }
}
