use anyhow::Result;
use clap::{Parser, Subcommand};
use facelink_client::{ClientConfig, CredentialStore, FaceClient, FaceService, Session};
use facelink_core::codec;
use facelink_core::Presentation;
use image::DynamicImage;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod screens;

use screens::{App, SCOPE_COMPARE, SCOPE_HOME, SCOPE_SETTINGS, SCOPE_USERS};

#[derive(Parser)]
#[command(name = "facelink", about = "Face recognition service client", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify administrator credentials with the service and save them
    Login {
        #[arg(short, long)]
        username: String,
        #[arg(short, long)]
        password: String,
    },
    /// Show saved credentials and version information
    Settings,
    /// Enroll a user's face
    Register {
        /// User ID to enroll
        #[arg(short, long)]
        user: String,
        /// Face image (JPEG or PNG)
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Verify a face against a user's enrolled face
    Verify {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Replace a user's enrolled face
    Update {
        #[arg(short, long)]
        user: String,
        #[arg(short, long)]
        image: PathBuf,
    },
    /// Compare two face images with each other
    Compare { first: PathBuf, second: PathBuf },
    /// List enrolled users
    Users,
    /// Download a user's enrolled face image
    Image {
        #[arg(short, long)]
        user: String,
        /// Output file (default: <user>.jpg)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete an enrolled user
    Delete {
        #[arg(short, long)]
        user: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Runner scope of the screen this command stands in for.
    fn scope(&self) -> &'static str {
        match self {
            Commands::Login { .. } | Commands::Settings => SCOPE_SETTINGS,
            Commands::Register { .. } | Commands::Verify { .. } | Commands::Update { .. } => {
                SCOPE_HOME
            }
            Commands::Compare { .. } => SCOPE_COMPARE,
            Commands::Users | Commands::Image { .. } | Commands::Delete { .. } => SCOPE_USERS,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::from_env();
    tracing::debug!(base_url = %config.base_url, "configuration loaded");

    let client = FaceClient::new(&config, Arc::new(Session::new()))?;
    let app = App::new(
        Arc::new(client),
        CredentialStore::new(&config.credentials_path),
    );
    let runner = app.runner.clone();
    let scope = cli.command.scope();

    tokio::select! {
        code = run(&app, cli.command) => Ok(code),
        _ = tokio::signal::ctrl_c() => {
            let cancelled = runner.cancel_scope(scope);
            tracing::info!(scope, cancelled, "interrupted");
            eprintln!("Cancelled");
            Ok(ExitCode::from(130))
        }
    }
}

async fn run<S: FaceService + 'static>(app: &App<S>, command: Commands) -> ExitCode {
    let scope = command.scope();
    match command {
        Commands::Login { username, password } => {
            return show(&app.save_credentials(&username, &password).await);
        }
        Commands::Settings => {
            for line in app.settings_lines() {
                println!("{line}");
            }
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    if let Err(p) = app.auto_login(scope).await {
        return show(&p);
    }

    match command {
        Commands::Register { user, image } => match load(&image) {
            Ok(img) => show(&app.register(Some(img), &user).await),
            Err(p) => show(&p),
        },
        Commands::Verify { user, image } => match load(&image) {
            Ok(img) => show(&app.verify(Some(img), &user).await),
            Err(p) => show(&p),
        },
        Commands::Update { user, image } => match load(&image) {
            Ok(img) => show(&app.update(Some(img), &user).await),
            Err(p) => show(&p),
        },
        Commands::Compare { first, second } => match (load(&first), load(&second)) {
            (Ok(a), Ok(b)) => show(&app.compare(Some(a), Some(b)).await),
            (Err(p), _) | (_, Err(p)) => show(&p),
        },
        Commands::Users => list_users(app).await,
        Commands::Image { user, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(format!("{}.jpg", user.trim())));
            show(&app.fetch_image(&user, &output).await)
        }
        Commands::Delete { user, yes } => {
            if !yes && !confirm("Delete User", "Are you sure you want to delete this user?") {
                println!("Cancelled");
                return ExitCode::SUCCESS;
            }
            let p = app.delete(&user).await;
            let code = show(&p);
            if p.is_error {
                return code;
            }
            list_users(app).await
        }
        Commands::Login { .. } | Commands::Settings => ExitCode::SUCCESS,
    }
}

async fn list_users<S: FaceService + 'static>(app: &App<S>) -> ExitCode {
    let (p, users) = app.list_users().await;
    if p.is_error || users.is_empty() {
        return show(&p);
    }
    for row in screens::render_users(&users) {
        println!("{row}");
    }
    ExitCode::SUCCESS
}

fn load(path: &Path) -> Result<DynamicImage, Presentation> {
    codec::load_image(path).map_err(|e| {
        Presentation::error("Failed to load image", format!("{}: {e}", path.display()))
    })
}

fn show(p: &Presentation) -> ExitCode {
    if p.is_error {
        eprintln!("{}\n{}", p.title, p.message);
        ExitCode::FAILURE
    } else {
        println!("{}", p.message);
        ExitCode::SUCCESS
    }
}

fn confirm(title: &str, question: &str) -> bool {
    print!("{title}\n{question} [y/N] ");
    if std::io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if std::io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
