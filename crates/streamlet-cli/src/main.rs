//! streamlet - a command-line client for streams/posts microblog servers.
//!
//! Every command is a thin wrapper over `streamlet-core`: sign in, list or
//! create streams, list or create posts. The session token persists between
//! invocations; anonymous users can still read the public listings.

mod commands;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Context;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn print_usage() {
    eprintln!(
        "streamlet - a command-line microblog client

Usage: streamlet <command> [args]

Commands:
  login [--save]                     Sign in (--save keeps the password in the OS keychain)
  logout [--forget]                  Sign out (--forget also deletes stored credentials)
  signup                             Register a new account
  whoami                             Show the signed-in user

  streams [list]                     List streams
  streams show <id>                  Show one stream and its posts
  streams create <name> [desc...]    Create a stream

  posts [--stream <id>] [--page N] [--size N]
                                     List posts, optionally scoped to a stream
  post <stream-id> <content...>      Create a post (140 characters max)

Environment:
  STREAMLET_API_URL                  Override the API base URL
  STREAMLET_USERNAME / STREAMLET_PASSWORD
                                     Non-interactive login credentials
  RUST_LOG                           Log filter (default: warn)"
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        print_usage();
        std::process::exit(2);
    };

    if matches!(command.as_str(), "help" | "--help" | "-h") {
        print_usage();
        return Ok(());
    }

    let mut ctx = Context::new()?;
    info!(command = %command, "streamlet starting");

    let rest = &args[1..];
    let result = match command.as_str() {
        "login" => commands::login(&mut ctx, rest).await,
        "logout" => commands::logout(&ctx, rest),
        "signup" => commands::signup(&ctx).await,
        "whoami" => commands::whoami(&ctx),
        "streams" => commands::streams(&ctx, rest).await,
        "posts" => commands::posts(&ctx, rest).await,
        "post" => commands::post(&ctx, rest).await,
        other => {
            eprintln!("Unknown command: {other}\n");
            print_usage();
            std::process::exit(2);
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    Ok(())
}
