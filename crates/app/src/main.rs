use std::fmt;
use std::sync::Arc;

use api::{ApiConfig, HttpSurveyApi};
use dioxus::LaunchBuilder;
use dioxus::desktop::{Config as DesktopConfig, WindowBuilder};
use services::{Clock, ResponseLoopService};
use survey_core::model::InstanceId;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt as log_fmt};
use ui::{App, UiApp, build_app_context};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidInstanceId { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidInstanceId { raw } => {
                write!(f, "invalid --instance-id value: {raw}")
            }
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
    instance_id: Option<InstanceId>,
    responses: Arc<ResponseLoopService>,
}

impl UiApp for DesktopApp {
    fn instance_id(&self) -> Option<InstanceId> {
        self.instance_id
    }

    fn responses(&self) -> Arc<ResponseLoopService> {
        Arc::clone(&self.responses)
    }
}

#[derive(Debug)]
struct Args {
    api_url: Option<String>,
    timeout_secs: Option<String>,
    instance_id: Option<InstanceId>,
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--api-url <url>] [--instance-id <id>] [--timeout-secs <n>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --api-url {}", api::config::DEFAULT_API_URL);
    eprintln!("  --timeout-secs {}", api::config::DEFAULT_TIMEOUT_SECS);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  SURVEY_API_URL, SURVEY_INSTANCE_ID, SURVEY_API_TIMEOUT_SECS, RUST_LOG");
}

fn parse_instance_id(raw: String) -> Result<InstanceId, ArgsError> {
    raw.parse()
        .map_err(|_| ArgsError::InvalidInstanceId { raw })
}

impl Args {
    /// Flags win over the environment; the environment wins over defaults.
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Option<Self>, ArgsError> {
        let pinned = std::env::var("SURVEY_INSTANCE_ID").ok();
        Self::parse_with(args, pinned)
    }

    fn parse_with(
        args: &mut impl Iterator<Item = String>,
        pinned: Option<String>,
    ) -> Result<Option<Self>, ArgsError> {
        let mut api_url = None;
        let mut timeout_secs = None;
        let mut instance_id = pinned.map(parse_instance_id).transpose()?;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--api-url" => api_url = Some(require_value(args, "--api-url")?),
                "--timeout-secs" => timeout_secs = Some(require_value(args, "--timeout-secs")?),
                "--instance-id" => {
                    let value = require_value(args, "--instance-id")?;
                    instance_id = Some(parse_instance_id(value)?);
                }
                "--help" | "-h" => return Ok(None),
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Some(Self {
            api_url,
            timeout_secs,
            instance_id,
        }))
    }

    fn api_config(&self) -> Result<ApiConfig, api::ApiConfigError> {
        let mut config = match &self.api_url {
            Some(url) => ApiConfig::new(url)?,
            None => ApiConfig::from_env()?,
        };
        if let Some(raw) = &self.timeout_secs {
            config = config.with_timeout_secs(raw)?;
        } else if self.api_url.is_some() {
            if let Ok(raw) = std::env::var("SURVEY_API_TIMEOUT_SECS") {
                config = config.with_timeout_secs(&raw)?;
            }
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    log_fmt().with_env_filter(filter).init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let parsed = match Args::parse(&mut argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(e) => {
            eprintln!("{e}");
            print_usage();
            return Err(e.into());
        }
    };

    let config = parsed.api_config()?;
    info!(
        api = %config.base_url(),
        timeout_secs = config.timeout().as_secs(),
        instance = ?parsed.instance_id,
        "starting survey client"
    );

    let api = HttpSurveyApi::new(config)?;
    let responses = Arc::new(ResponseLoopService::new(Clock::default(), Arc::new(api)));
    let app: Arc<dyn UiApp> = Arc::new(DesktopApp {
        instance_id: parsed.instance_id,
        responses,
    });
    let context = build_app_context(&app);

    // On macOS, Dioxus/tao can default to an always-on-top window in some dev setups.
    let desktop_cfg = DesktopConfig::new().with_window(
        WindowBuilder::new()
            .with_title("Surveys")
            .with_always_on_top(false),
    );

    LaunchBuilder::desktop()
        .with_cfg(desktop_cfg)
        .with_context(context)
        .launch(App);
    Ok(())
}

fn main() {
    init_tracing();
    if let Err(err) = run() {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
