use std::path::{Path, PathBuf};
use std::sync::Arc;

use canvas::engine::{Action, EngineCore};
use canvas::error::CanvasError;
use canvas::input::{MouseEvent, MouseKind};
use canvas::photo::Frame;
use canvas::viewport::{DisplayRect, Point};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use twibbon::config::{ApiConfig, ConfigError};
use twibbon::services::campaign::{self, ApiError, HttpCampaignApi};
use twibbon::session::{SaveOutcome, Session, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("reading {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("photo could not be decoded: {0}")]
    Decode(String),
    #[error("nothing to export: no photo loaded")]
    NoPhoto,
    #[error("page path '{0}' has no campaign slug in its second segment")]
    InvalidPagePath(String),
    #[error("save failed: {0}")]
    SaveFailed(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "twibbon", about = "Compose a photo under a campaign frame")]
struct Cli {
    /// Campaign server origin; overrides `TWIBBON_BASE_URL` from the config layer.
    #[arg(long, env = "TWIBBON_BASE_URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compose and write `twibbon.png`, printing the placement.
    Render(RenderArgs),
    /// Compose and persist the result to the campaign server.
    Save(SaveArgs),
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// Frame image drawn above the photo, stretched to the surface.
    #[arg(long)]
    frame: PathBuf,

    /// Photo to place under the frame.
    #[arg(long)]
    photo: PathBuf,

    /// Zoom multiplier relative to the cover-fit scale.
    #[arg(long)]
    zoom: Option<f64>,

    /// Drag gesture in display (CSS) pixels, `X0,Y0:X1,Y1`. Repeatable.
    #[arg(long = "drag", value_parser = parse_drag)]
    drags: Vec<Drag>,

    /// Displayed side length of the surface in CSS pixels.
    #[arg(long, default_value_t = 1080.0)]
    display_size: f64,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    compose: ComposeArgs,

    /// Directory that receives `twibbon.png`.
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Page path identifying the campaign; its second segment is the slug.
    #[arg(long)]
    page_path: Option<String>,

    /// Report the download to the campaign server.
    #[arg(long, requires = "page_path")]
    track_download: bool,

    /// `Cookie` header of the page session; the CSRF token is read from it.
    #[arg(long, env = "TWIBBON_COOKIE")]
    cookie: Option<String>,
}

#[derive(Args, Debug)]
struct SaveArgs {
    #[command(flatten)]
    compose: ComposeArgs,

    /// Page path identifying the campaign; its second segment is the slug.
    #[arg(long)]
    page_path: String,

    /// `Cookie` header of the page session; the CSRF token is read from it.
    #[arg(long, env = "TWIBBON_COOKIE")]
    cookie: Option<String>,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    from: Point,
    to: Point,
}

fn parse_point(raw: &str) -> Result<Point, String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{raw}'"))?;
    let x = x.trim().parse::<f64>().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse::<f64>().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok(Point::new(x, y))
}

fn parse_drag(raw: &str) -> Result<Drag, String> {
    let (from, to) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected X0,Y0:X1,Y1 but got '{raw}'"))?;
    Ok(Drag { from: parse_point(from)?, to: parse_point(to)? })
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut config = ApiConfig::from_env()?;
    if let Some(base_url) = cli.base_url.as_deref() {
        config = config.with_base_url(base_url)?;
    }

    match cli.command {
        Command::Render(args) => run_render(&config, args).await,
        Command::Save(args) => run_save(&config, args).await,
    }
}

async fn run_render(config: &ApiConfig, args: RenderArgs) -> Result<(), CliError> {
    let slug = match (&args.page_path, args.track_download) {
        (Some(path), true) => Some(slug_of(path)?),
        _ => None,
    };
    let csrf_token = slug
        .as_ref()
        .and_then(|_| campaign::csrf_token(config, args.cookie.as_deref()));
    let api = HttpCampaignApi::new(config, csrf_token)?;
    let session = compose(&args.compose, Arc::new(api), slug).await?;

    let download = session.download(&args.out).await?.ok_or(CliError::NoPhoto)?;
    if let Some(tracking) = download.tracking {
        if let Err(e) = tracking.await {
            tracing::error!(error = %e, "download tracking task failed");
        }
    }
    println!("{}", download.path.display());
    println!("{}", serde_json::to_string_pretty(&session.core().transform())?);
    Ok(())
}

async fn run_save(config: &ApiConfig, args: SaveArgs) -> Result<(), CliError> {
    let slug = slug_of(&args.page_path)?;
    let csrf_token = campaign::csrf_token(config, args.cookie.as_deref());
    let api = HttpCampaignApi::new(config, csrf_token)?;
    let mut session = compose(&args.compose, Arc::new(api), Some(slug)).await?;

    match session.save().await {
        Some(SaveOutcome::Succeeded { redirect_url }) => {
            println!("{redirect_url}");
            Ok(())
        }
        Some(SaveOutcome::Failed { reason }) => Err(CliError::SaveFailed(reason)),
        None => Err(CliError::NoPhoto),
    }
}

fn slug_of(page_path: &str) -> Result<String, CliError> {
    campaign::slug_from_path(page_path)
        .map(str::to_owned)
        .ok_or_else(|| CliError::InvalidPagePath(page_path.to_owned()))
}

async fn read(path: &Path) -> Result<Vec<u8>, CliError> {
    tokio::fs::read(path)
        .await
        .map_err(|source| CliError::Read { path: path.to_path_buf(), source })
}

/// Build a session, upload the photo, then replay zoom and drags the way
/// the editor would receive them.
async fn compose(
    args: &ComposeArgs,
    api: Arc<HttpCampaignApi>,
    slug: Option<String>,
) -> Result<Session, CliError> {
    let frame = Frame::decode(&read(&args.frame).await?)?;
    let mut core = EngineCore::new(frame);
    core.set_display_rect(DisplayRect::new(0.0, 0.0, args.display_size, args.display_size));

    let mut session = Session::new(core, api, slug);
    let actions = session.upload(read(&args.photo).await?).await?;
    if let Some(Action::DecodeFailed { message }) = actions.iter().find(|a| matches!(a, Action::DecodeFailed { .. })) {
        return Err(CliError::Decode(message.clone()));
    }

    let core = session.core_mut();
    if let Some(multiplier) = args.zoom {
        core.on_zoom(multiplier);
    }
    for drag in &args.drags {
        core.on_mouse(&MouseEvent::new(MouseKind::Down, drag.from));
        core.on_mouse(&MouseEvent::new(MouseKind::Move, drag.to));
        core.on_mouse(&MouseEvent::new(MouseKind::Up, drag.to));
    }
    info!(
        offset_x = core.transform().offset_x,
        offset_y = core.transform().offset_y,
        scale = core.transform().scale,
        "placement composed"
    );
    Ok(session)
}
