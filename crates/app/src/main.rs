use std::fmt;
use std::sync::Arc;

use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{
    AddressBar, AssessmentApi, AssessmentApiConfig, AssessmentClient, DraftStore,
    MemoryAddressBar, ResumeConfig, ResumeDeps,
};
use storage::repository::Storage;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use ui::{App, UiApp, build_app_context};
use url::Url;

const DEFAULT_LINK: &str = "app://assessment/";

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidLink { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLink { raw } => write!(f, "invalid --link value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

struct DesktopApp {
    deps: ResumeDeps,
    api: Arc<dyn AssessmentApi>,
}

impl UiApp for DesktopApp {
    fn resume_deps(&self) -> ResumeDeps {
        self.deps.clone()
    }

    fn assessment_api(&self) -> Arc<dyn AssessmentApi> {
        Arc::clone(&self.api)
    }
}

struct Args {
    db_url: String,
    link: Url,
    api_base_url: Option<String>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--db <sqlite_url>] [--link <url>] [--api <base_url>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:assessment.sqlite3");
    eprintln!("  --link {DEFAULT_LINK}");
    eprintln!();
    eprintln!("The link carries the session parameters, e.g.");
    eprintln!("  {DEFAULT_LINK}?version=deep&token=<token>");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  ASSESSMENT_DB_URL, ASSESSMENT_LINK, ASSESSMENT_API_BASE_URL,");
    eprintln!("  ASSESSMENT_RESUME_TIMEOUT_MS, RUST_LOG");
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("ASSESSMENT_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://assessment.sqlite3".into(), normalize_sqlite_url);
        let mut link = std::env::var("ASSESSMENT_LINK")
            .ok()
            .map_or_else(|| parse_link(DEFAULT_LINK), |raw| parse_link(&raw))?;
        let mut api_base_url = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--link" => {
                    let value = require_value(args, "--link")?;
                    link = parse_link(&value)?;
                }
                "--api" => {
                    api_base_url = Some(require_value(args, "--api")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            link,
            api_base_url,
        })
    }
}

/// Accepts a full link or just a query string such as `?version=deep&token=abc`.
fn parse_link(raw: &str) -> Result<Url, ArgsError> {
    let trimmed = raw.trim();
    let parsed = if trimmed.starts_with('?') {
        Url::parse(DEFAULT_LINK).and_then(|base| base.join(trimmed))
    } else {
        Url::parse(trimmed)
    };
    parsed.map_err(|_| ArgsError::InvalidLink {
        raw: raw.to_string(),
    })
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let storage = Storage::sqlite(&parsed.db_url).await?;

    let api_config = parsed
        .api_base_url
        .map(AssessmentApiConfig::new)
        .or_else(AssessmentApiConfig::from_env);
    let client = Arc::new(AssessmentClient::new(api_config));
    if !client.enabled() {
        tracing::warn!("assessment service not configured; saved sessions cannot be resumed");
    }

    let address: Arc<dyn AddressBar> = Arc::new(MemoryAddressBar::new(parsed.link));
    let deps = ResumeDeps {
        gateway: client.clone(),
        drafts: DraftStore::new(Arc::clone(&storage.drafts)),
        address,
        config: ResumeConfig::from_env(),
    };
    tracing::info!(
        db = %parsed.db_url,
        link = %deps.address.current(),
        resume_timeout_ms = deps.config.timeout.as_millis(),
        "launching assessment"
    );

    let app: Arc<dyn UiApp> = Arc::new(DesktopApp { deps, api: client });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    // Explicitly disable it so the app doesn't behave like a modal window.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Leadership Assessment")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    init_tracing();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_accepts_bare_query() {
        let link = parse_link("?version=deep&token=abc123").unwrap();
        assert_eq!(link.as_str(), "app://assessment/?version=deep&token=abc123");
    }

    #[test]
    fn link_rejects_garbage() {
        assert!(matches!(parse_link("not a url"), Err(ArgsError::InvalidLink { .. })));
    }

    #[test]
    fn relative_sqlite_path_becomes_absolute() {
        let url = normalize_sqlite_url("sqlite:data/a.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"), "{url}");
        assert!(url.ends_with("data/a.sqlite3"), "{url}");
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let mut argv = ["--link", "?token=t1", "--api", "http://localhost:9000"]
            .into_iter()
            .map(String::from);
        let args = Args::parse(&mut argv).unwrap();
        assert_eq!(args.link.query(), Some("token=t1"));
        assert_eq!(args.api_base_url.as_deref(), Some("http://localhost:9000"));
    }
}
