//! Command implementations.
//!
//! Each command maps to one or two core operations, awaited sequentially:
//! a create always completes before the listing it triggers is re-fetched.
//! Failures surface as their message on stderr; an expired session gets one
//! silent re-login with stored credentials before the user is asked again.

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use tracing::{info, warn};

use streamlet_core::api::client::DEFAULT_PAGE_SIZE;
use streamlet_core::api::{ApiClient, ApiError, RequestGateway, SignInPrompt};
use streamlet_core::auth::{CredentialStore, SessionStore};
use streamlet_core::config::Config;
use streamlet_core::models::{Post, Stream};
use streamlet_core::storage::FileStore;

pub struct Context {
    pub config: Config,
    pub client: ApiClient,
}

/// Terminal prompt: a rejected or expired call just tells the user which
/// command to run next.
struct TerminalPrompt;

impl SignInPrompt for TerminalPrompt {
    fn request_sign_in(&self) {
        eprintln!("Please sign in with `streamlet login`.");
    }
}

impl Context {
    pub fn new() -> Result<Self> {
        let config = Config::load().context("Failed to load config")?;
        let store = Arc::new(FileStore::new(Config::cache_dir()?));
        let session = SessionStore::new(store);
        let gateway = RequestGateway::with_prompt(
            config.effective_api_url(),
            session,
            Arc::new(TerminalPrompt),
        )?;
        Ok(Self {
            config,
            client: ApiClient::new(gateway),
        })
    }
}

// =========================================================================
// Session recovery
// =========================================================================

/// One silent re-login with stored credentials before giving up on an
/// expired session.
async fn recover_session(ctx: &Context) -> Result<bool> {
    let Some(username) = ctx.config.last_username.clone() else {
        return Ok(false);
    };
    let Ok(password) = CredentialStore::get_password(&username) else {
        return Ok(false);
    };

    info!(username = %username, "Session expired; re-authenticating with stored credentials");
    match ctx.client.sign_in(&username, &password).await {
        Ok(_) => Ok(true),
        Err(err) => {
            warn!(error = %err, "Stored-credential re-login failed");
            Ok(false)
        }
    }
}

async fn with_recovery<T, F, Fut>(ctx: &Context, op: F) -> Result<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    match op().await {
        Ok(value) => Ok(value),
        Err(ApiError::SessionExpired) => {
            if recover_session(ctx).await? {
                Ok(op().await?)
            } else {
                Err(ApiError::SessionExpired.into())
            }
        }
        Err(err) => Err(err.into()),
    }
}

// =========================================================================
// Auth commands
// =========================================================================

pub async fn login(ctx: &mut Context, args: &[String]) -> Result<()> {
    let save = has_flag(args, "--save");

    let username = match std::env::var("STREAMLET_USERNAME") {
        Ok(name) if !name.is_empty() => name,
        _ => prompt_username(ctx.config.last_username.as_deref())?,
    };

    let password = match std::env::var("STREAMLET_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            if CredentialStore::has_credentials(&username) {
                print!("Use stored password? [Y/n]: ");
                io::stdout().flush()?;
                let mut input = String::new();
                io::stdin().read_line(&mut input)?;
                if input.trim().to_lowercase() != "n" {
                    CredentialStore::get_password(&username)?
                } else {
                    rpassword::prompt_password("Password: ")?
                }
            } else {
                rpassword::prompt_password("Password: ")?
            }
        }
    };

    println!("Authenticating...");
    let identity = ctx.client.sign_in(&username, &password).await?;

    if save {
        if let Err(err) = CredentialStore::store(&username, &password) {
            warn!(error = %err, "Failed to store credentials");
        }
    }

    ctx.config.last_username = Some(username.clone());
    if let Err(err) = ctx.config.save() {
        warn!(error = %err, "Failed to save config");
    }

    match identity {
        Some(identity) => println!("Signed in as @{}", identity.username),
        None => println!("Signed in as {username} (identity unresolved; posting is unavailable)"),
    }
    Ok(())
}

pub fn logout(ctx: &Context, args: &[String]) -> Result<()> {
    ctx.client.sign_out()?;

    if has_flag(args, "--forget") {
        if let Some(ref username) = ctx.config.last_username {
            if let Err(err) = CredentialStore::delete(username) {
                warn!(error = %err, "Failed to delete stored credentials");
            }
        }
    }

    println!("Signed out.");
    Ok(())
}

pub async fn signup(ctx: &Context) -> Result<()> {
    let username = prompt_line("Username: ")?;
    let email = prompt_line("Email: ")?;
    let password = rpassword::prompt_password("Password: ")?;

    ctx.client.sign_up(&username, &email, &password).await?;
    println!("Registration successful! Sign in with `streamlet login`.");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    match ctx.client.session().user_identity() {
        Some(identity) => println!("@{} (id {})", identity.username, identity.id),
        None if ctx.client.session().is_authenticated() => {
            println!("Signed in, but the user identity is unresolved.")
        }
        None => println!("Not signed in."),
    }
    Ok(())
}

// =========================================================================
// Stream commands
// =========================================================================

pub async fn streams(ctx: &Context, args: &[String]) -> Result<()> {
    match args.first().map(String::as_str) {
        None | Some("list") => list_streams(ctx).await,
        Some("show") => {
            let id = parse_id(args.get(1), "stream id")?;
            show_stream(ctx, id).await
        }
        Some("create") => {
            let Some(name) = args.get(1) else {
                bail!("Usage: streamlet streams create <name> [description...]");
            };
            let description = args[2..].join(" ");
            create_stream(ctx, name, &description).await
        }
        Some(other) => bail!("Unknown streams subcommand: {other}"),
    }
}

async fn list_streams(ctx: &Context) -> Result<()> {
    let streams = with_recovery(ctx, || ctx.client.list_streams()).await?;

    if streams.is_empty() {
        println!("No streams yet. Create one!");
        return Ok(());
    }

    for stream in &streams {
        print_stream(stream);
    }
    Ok(())
}

async fn show_stream(ctx: &Context, id: i64) -> Result<()> {
    let stream = with_recovery(ctx, || ctx.client.get_stream(id)).await?;

    println!("Posts in \"{}\"", stream.name);
    println!("{}", stream.description_display());
    println!();

    let posts =
        with_recovery(ctx, || ctx.client.list_posts_by_stream(id, 0, DEFAULT_PAGE_SIZE)).await?;

    if posts.is_empty() {
        println!("No posts in this stream yet.");
        return Ok(());
    }
    for post in &posts {
        print_post(post);
    }
    Ok(())
}

async fn create_stream(ctx: &Context, name: &str, description: &str) -> Result<()> {
    let created = with_recovery(ctx, || ctx.client.create_stream(name, description)).await?;
    println!("Created stream \"{}\" (id {})", created.name, created.id);
    Ok(())
}

// =========================================================================
// Post commands
// =========================================================================

pub async fn posts(ctx: &Context, args: &[String]) -> Result<()> {
    let mut stream_id: Option<i64> = None;
    let mut page: u32 = 0;
    let mut size: u32 = DEFAULT_PAGE_SIZE;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--stream" => stream_id = Some(parse_id(iter.next(), "stream id")?),
            "--page" => page = parse_number(iter.next(), "page")?,
            "--size" => size = parse_number(iter.next(), "size")?,
            other => bail!("Unknown posts option: {other}"),
        }
    }

    let posts = match stream_id {
        Some(id) => {
            with_recovery(ctx, || ctx.client.list_posts_by_stream(id, page, size)).await?
        }
        None => with_recovery(ctx, || ctx.client.list_posts(page, size)).await?,
    };

    if posts.is_empty() {
        match stream_id {
            Some(_) => println!("No posts in this stream yet."),
            None => println!("No posts yet. Be the first to post!"),
        }
        return Ok(());
    }

    for post in &posts {
        print_post(post);
    }
    Ok(())
}

pub async fn post(ctx: &Context, args: &[String]) -> Result<()> {
    let Some(first) = args.first() else {
        bail!("Usage: streamlet post <stream-id> <content...>");
    };
    let stream_id = parse_id(Some(first), "stream id")?;
    let content = args[1..].join(" ");

    let created = with_recovery(ctx, || ctx.client.create_post(stream_id, &content)).await?;
    println!(
        "Posted to \"{}\":",
        created.stream_name.as_deref().unwrap_or("stream")
    );

    // Reload after the create completes, like the form submit in a browser
    // front-end: create first, then re-fetch the listing.
    let posts = with_recovery(ctx, || {
        ctx.client.list_posts_by_stream(stream_id, 0, DEFAULT_PAGE_SIZE)
    })
    .await?;

    for post in &posts {
        print_post(post);
    }
    Ok(())
}

// =========================================================================
// Helpers
// =========================================================================

fn print_post(post: &Post) {
    let stream = match post.stream_name {
        Some(ref name) => format!("  [{name}]"),
        None => String::new(),
    };
    println!(
        "{:<16} {}  {}{}",
        post.author_display(),
        post.created_display(),
        post.content,
        stream
    );
}

fn print_stream(stream: &Stream) {
    println!(
        "{:>4}  {:<20} {}  (created {})",
        stream.id,
        stream.name,
        stream.description_display(),
        stream.created_display()
    );
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|arg| arg == flag)
}

fn parse_id(arg: Option<&String>, what: &str) -> Result<i64> {
    let Some(raw) = arg else {
        bail!("Missing {what}");
    };
    raw.parse().with_context(|| format!("Invalid {what}: {raw}"))
}

fn parse_number(arg: Option<&String>, what: &str) -> Result<u32> {
    let Some(raw) = arg else {
        bail!("Missing value for --{what}");
    };
    raw.parse().with_context(|| format!("Invalid {what}: {raw}"))
}

fn prompt_line(prompt: &str) -> Result<String> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_username(last_username: Option<&str>) -> Result<String> {
    match last_username {
        Some(last) => {
            let input = prompt_line(&format!("Username [{last}]: "))?;
            if input.is_empty() {
                Ok(last.to_string())
            } else {
                Ok(input)
            }
        }
        None => prompt_line("Username: "),
    }
}
