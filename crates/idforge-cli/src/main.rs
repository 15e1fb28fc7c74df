//! idforge binary.
//!
//! Validates the identity given on the command line, renders the card and
//! writes `<Name>_id_card.pdf` into the output directory. Settings come from
//! `idforge.toml` (or `--config`) and `IDFORGE_*` environment variables;
//! flags override both.

use std::{
  path::{Path, PathBuf},
  process::ExitCode,
};

use anyhow::Context as _;
use clap::Parser;
use idforge_cli::{DirectoryDelivery, Session, Settings, SoftwareCapture, SubmitError};
use idforge_core::{IdentityDraft, Photo};
use idforge_render::rasterize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Render a student ID card and export it as a PDF")]
struct Cli {
  /// Full name as printed on the card.
  #[arg(long)]
  name: String,

  /// Student ID.
  #[arg(long)]
  id: String,

  /// Program of study.
  #[arg(long)]
  program: String,

  /// Year of study, 1 to 5.
  #[arg(long, default_value = "1")]
  year: String,

  #[arg(long)]
  email: String,

  #[arg(long)]
  phone: String,

  /// Profile picture: an image file or a `data:` URL.
  #[arg(long)]
  photo: Option<String>,

  /// Output directory for the PDF.
  #[arg(long)]
  out: Option<PathBuf>,

  /// Device pixels per card unit.
  #[arg(long)]
  scale: Option<f32>,

  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "idforge.toml")]
  config: PathBuf,

  /// Also write the rasterized card as a PNG.
  #[arg(long)]
  preview: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config).context("failed to read config file")?;
  if let Some(out) = cli.out {
    settings.output_dir = out;
  }
  if let Some(scale) = cli.scale {
    settings.scale = scale;
  }
  let renderer = settings
    .renderer()
    .context("failed to set up the card renderer")?;

  let mut draft = IdentityDraft::new();
  draft
    .set_full_name(cli.name)
    .set_identifier(cli.id)
    .set_program(cli.program)
    .set_year_of_study(cli.year)
    .set_email(cli.email)
    .set_phone(cli.phone);
  if let Some(source) = cli.photo.as_deref() {
    draft.set_photo(Some(load_photo(source)?));
  }

  let mut session = Session::new(
    renderer,
    SoftwareCapture,
    DirectoryDelivery::new(&settings.output_dir),
    settings.scale,
  );

  match session.submit(draft) {
    Ok(snapshot) => tracing::info!(%snapshot, "card rendered"),
    Err(SubmitError::Rejected(rejected)) => {
      for error in rejected.errors.iter() {
        eprintln!("{error}");
      }
      return Ok(ExitCode::from(2));
    }
    Err(e) => return Err(e).context("failed to render card"),
  }

  if let Some(path) = &cli.preview
    && let Some(card) = session.card()
  {
    let png = rasterize(card, settings.scale)
      .and_then(|bitmap| bitmap.to_png())
      .context("failed to rasterize preview")?;
    tokio::fs::write(path, png)
      .await
      .with_context(|| format!("failed to write preview to {path:?}"))?;
    tracing::info!(path = %path.display(), "preview written");
  }

  let notice = session.export().await;
  println!("{notice}");
  Ok(if notice.is_success() {
    ExitCode::SUCCESS
  } else {
    ExitCode::FAILURE
  })
}

/// Read a photo from a `data:` URL or a file path.
fn load_photo(source: &str) -> anyhow::Result<Photo> {
  if source.starts_with("data:") {
    return Photo::from_data_url(source).context("invalid photo data URL");
  }
  Photo::from_file(Path::new(source))
    .with_context(|| format!("failed to read photo {source:?}"))
}
