//! codepost - publish a coding-problem solution to GitHub
//!
//! ## Commands
//!
//! - `publish`: render the configured templates and commit the solution
//! - `render`: preview a template against problem facts
//! - `verify`: check the configured token against the repository
//! - `placeholders`: list the template tokens

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tracing::{debug, Level};

use codepost_core::{
    render, render_body, AutoConfirm, Confirmer, ContentsConnector, FactSheet, FileSettingsStore,
    GithubConnector, MemorySettingsStore, NotificationId, Notifier, Placeholder, ProblemFacts,
    PublishError, PublishReport, Publisher, RequestDraft, SettingsStore, StaticPageFacts,
};
use editor_bridge::{BridgeConfig, ExtractionBridge, InProcessPage, PageWindow, StaticEditorRuntime};
use repo_contents::{verify_access, ContentsConfig, OutcomeNotification};

#[derive(Parser)]
#[command(name = "codepost")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Publish coding-problem solutions to a GitHub repository", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// Settings file (default: $CODEPOST_SETTINGS or ~/.config/codepost/settings.json)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// What the problem page shows.
#[derive(Args, Debug, Clone)]
struct ProblemArgs {
    /// Problem header, e.g. "1. Two Sum"
    #[arg(long)]
    title: String,

    /// Difficulty label
    #[arg(long, default_value = "")]
    difficulty: String,

    /// Editor language as displayed, e.g. Python3
    #[arg(long, default_value = "")]
    language: String,

    /// Problem page URL
    #[arg(long, default_value = "")]
    url: String,
}

impl ProblemArgs {
    fn facts(&self) -> ProblemFacts {
        ProblemFacts::from_page(&self.title, &self.difficulty, &self.language, &self.url)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Commit the solution to the configured repository
    Publish {
        #[command(flatten)]
        problem: ProblemArgs,

        /// Read the solution from this file instead of stdin
        #[arg(long)]
        code_file: Option<PathBuf>,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Override the target repository (owner/repo, or repo)
        #[arg(long)]
        repo: Option<String>,

        /// Override the rendered folder
        #[arg(long)]
        path: Option<String>,

        /// Override the rendered file name
        #[arg(long)]
        filename: Option<String>,

        /// Override the rendered commit message
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Render a template against problem facts
    Render {
        /// Template text
        #[arg(short, long)]
        template: String,

        #[command(flatten)]
        problem: ProblemArgs,

        /// Solution source, for <CODE>
        #[arg(long)]
        code_file: Option<PathBuf>,

        /// Date to render (YYYY-MM-DD, default: today UTC)
        #[arg(long)]
        date: Option<String>,

        /// Substitute <CODE> too
        #[arg(long, conflicts_with = "body")]
        with_code: bool,

        /// Render as a file body (code appended when <CODE> is absent)
        #[arg(long)]
        body: bool,
    },

    /// Check that the configured token can access the repository
    Verify {
        /// Record the successful check in the settings file
        #[arg(long)]
        save: bool,
    },

    /// List template placeholders
    Placeholders,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };
    codepost_core::init_tracing(cli.json, level);

    match cli.command {
        Commands::Publish {
            problem,
            code_file,
            yes,
            repo,
            path,
            filename,
            message,
        } => {
            let overrides = DraftOverrides {
                repository: repo,
                path,
                filename,
                commit_message: message,
            };
            let store = settings_store(cli.settings)?;
            cmd_publish(store, &problem, code_file.as_deref(), yes, overrides).await
        }
        Commands::Render {
            template,
            problem,
            code_file,
            date,
            with_code,
            body,
        } => {
            cmd_render(
                &template,
                &problem,
                code_file.as_deref(),
                date.as_deref(),
                with_code,
                body,
            )
            .await
        }
        Commands::Verify { save } => cmd_verify(&settings_store(cli.settings)?, save).await,
        Commands::Placeholders => {
            cmd_placeholders();
            Ok(())
        }
    }
}

fn settings_store(path: Option<PathBuf>) -> Result<FileSettingsStore> {
    let path = match path {
        Some(path) => path,
        None => FileSettingsStore::default_path().context("Failed to locate settings file")?,
    };
    Ok(FileSettingsStore::new(path).with_env_overlay())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date {:?}, expected YYYY-MM-DD", value))
}

async fn read_code(code_file: Option<&Path>) -> Result<String> {
    match code_file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read solution from {:?}", path)),
        None => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("Failed to read solution from stdin")?;
            Ok(code)
        }
    }
}

/// Commit the solution
/// Read the settings once. The bridge and the publisher both work from the
/// returned snapshot, so an edit to the file mid-run cannot split them.
async fn load_snapshot(store: &dyn SettingsStore) -> Result<(MemorySettingsStore, BridgeConfig)> {
    let settings = store.load().await.context("Failed to load settings")?;
    let bridge_config = settings.bridge_config();
    Ok((MemorySettingsStore::new(settings), bridge_config))
}

async fn cmd_publish(
    store: FileSettingsStore,
    problem: &ProblemArgs,
    code_file: Option<&Path>,
    yes: bool,
    overrides: DraftOverrides,
) -> Result<()> {
    if code_file.is_none() && !yes {
        bail!("Reading the solution from stdin needs --yes; use --code-file to confirm interactively");
    }

    let (snapshot, bridge_config) = load_snapshot(&store).await?;
    let code = read_code(code_file).await?;

    let page = InProcessPage::new(PageWindow::new(), Arc::new(StaticEditorRuntime::new(code)));
    let bridge = ExtractionBridge::for_page(page, bridge_config);

    let confirmer: Arc<dyn Confirmer> = if yes {
        Arc::new(AutoConfirm)
    } else {
        Arc::new(TerminalConfirmer)
    };
    let settings_file = store.path().to_path_buf();

    let publisher = Publisher::new(
        Arc::new(snapshot),
        Arc::new(StaticPageFacts::new(problem.facts())),
        Arc::new(bridge),
        Arc::new(GithubConnector::new(ContentsConfig::from_env())),
        Arc::new(OverridingConfirmer {
            overrides,
            inner: confirmer,
        }),
        Arc::new(TerminalNotifier),
    );

    match publisher.publish().await {
        Ok(PublishReport::Disabled) => {
            println!("Publishing is disabled (extensionEnabled is false in {:?})", settings_file);
            Ok(())
        }
        Ok(PublishReport::Cancelled) => {
            println!("Cancelled");
            Ok(())
        }
        Ok(PublishReport::Published { outcome, .. }) if outcome.is_success() => Ok(()),
        Ok(PublishReport::Published { outcome, .. }) => bail!("{}", outcome.title()),
        Err(e @ PublishError::ConfigurationMissing(_)) => Err(e).with_context(|| {
            format!(
                "Edit {:?} or set CODEPOST_TOKEN, CODEPOST_OWNER and CODEPOST_REPO",
                settings_file
            )
        }),
        Err(e) => Err(e.into()),
    }
}

/// Preview a template
async fn cmd_render(
    template: &str,
    problem: &ProblemArgs,
    code_file: Option<&Path>,
    date: Option<&str>,
    with_code: bool,
    body: bool,
) -> Result<()> {
    let code = match code_file {
        Some(path) => read_code(Some(path)).await?,
        None => String::new(),
    };
    let facts = match date {
        Some(date) => FactSheet::new(parse_date(date)?, &problem.facts(), code),
        None => FactSheet::capture(&problem.facts(), code),
    };

    let rendered = if body {
        render_body(template, &facts)
    } else {
        render(template, &facts, with_code)
    };
    println!("{}", rendered);
    Ok(())
}

/// Check repository access with the configured token
async fn cmd_verify(store: &FileSettingsStore, save: bool) -> Result<()> {
    let settings = store.load().await.context("Failed to load settings")?;
    let (Some(token), Some(owner), Some(repo)) = (
        settings.github_token.as_deref(),
        settings.github_username.as_deref(),
        settings.github_repo.as_deref(),
    ) else {
        bail!(
            "githubToken, githubUsername and githubRepo must be set in {:?}",
            store.path()
        );
    };

    let api = GithubConnector::new(ContentsConfig::from_env())
        .api(token)
        .context("Failed to create GitHub client")?;
    verify_access(api.as_ref(), owner, repo)
        .await
        .with_context(|| format!("Cannot access {}/{}", owner, repo))?;
    println!("Access to {}/{} verified", owner, repo);

    if save {
        let mut stored = store.read_file().await?;
        stored.is_authorized = true;
        store.save(&stored).await?;
        println!("Marked as authorized in {:?}", store.path());
    }
    Ok(())
}

fn cmd_placeholders() {
    for placeholder in Placeholder::ALL {
        println!("{:<16} {}", placeholder.token(), placeholder.description());
    }
}

// ---------------------------------------------------------------------------
// Terminal collaborators
// ---------------------------------------------------------------------------

/// Draft fields fixed on the command line.
#[derive(Debug, Default, Clone)]
struct DraftOverrides {
    repository: Option<String>,
    path: Option<String>,
    filename: Option<String>,
    commit_message: Option<String>,
}

impl DraftOverrides {
    fn apply(&self, mut draft: RequestDraft) -> RequestDraft {
        if let Some(repository) = &self.repository {
            draft.repository = repository.clone();
        }
        if let Some(path) = &self.path {
            draft.path = path.clone();
        }
        if let Some(filename) = &self.filename {
            draft.filename = filename.clone();
        }
        if let Some(message) = &self.commit_message {
            draft.commit_message = message.clone();
        }
        draft
    }
}

struct OverridingConfirmer {
    overrides: DraftOverrides,
    inner: Arc<dyn Confirmer>,
}

#[async_trait]
impl Confirmer for OverridingConfirmer {
    async fn confirm(&self, draft: RequestDraft) -> Option<RequestDraft> {
        self.inner.confirm(self.overrides.apply(draft)).await
    }
}

/// Prints the draft and asks on stdin.
struct TerminalConfirmer;

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, draft: RequestDraft) -> Option<RequestDraft> {
        println!("Repository: {}", draft.repository);
        println!("Path:       {}", draft.path);
        println!("File:       {}", draft.filename);
        println!("Message:    {}", draft.commit_message);
        println!("----");
        println!("{}", draft.content);
        println!("----");
        println!("Commit this file? [y/N]");

        let mut answer = String::new();
        let mut stdin = BufReader::new(tokio::io::stdin());
        if let Err(e) = stdin.read_line(&mut answer).await {
            debug!(error = %e, "could not read confirmation");
            return None;
        }

        match answer.trim() {
            "y" | "Y" | "yes" => Some(draft),
            _ => None,
        }
    }
}

/// Prints outcomes instead of keeping them.
struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, outcome: &OutcomeNotification) -> NotificationId {
        println!("{}", outcome.title());
        println!("{}", outcome.message());
        println!("{}", outcome.target_url);
        if let Some(diagnostic) = &outcome.diagnostic {
            eprintln!("{}", diagnostic);
        }
        NotificationId::new()
    }
}
