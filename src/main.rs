use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lazytints::cli::{Args, ColorRole, Command, ExportFormat, ThemeMode};
use lazytints::clipboard::{copy_color, SystemClipboard};
use lazytints::color::Color;
use lazytints::config::Config;
use lazytints::export::{default_file_name, exporter_for};
use lazytints::gateway::{PaletteGateway, SessionContext, StatName, SupabaseBackend};
use lazytints::generator::contrast::{contrast_text, TextTone};
use lazytints::generator::generate_palette;
use lazytints::preview;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazytints=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let credentials = Credentials {
        email: args.email,
        password: args.password,
    };

    match args.command {
        Command::Generate {
            mode,
            preview,
            format,
            output,
            download,
            save,
            no_stats,
            copy,
        } => {
            let opts = GenerateOpts {
                mode,
                preview,
                format,
                output,
                download,
                save,
                no_stats,
                copy,
            };
            run_generate(opts, &credentials).await
        }
        Command::Copy { id, role } => {
            let gateway = signed_in(&credentials).await?;
            let palettes = gateway.list_saved_palettes().await;
            sign_out(&gateway).await;
            let saved = palettes?
                .into_iter()
                .find(|p| p.id == id)
                .with_context(|| format!("no saved palette with id {id}"))?;
            let mut clipboard = SystemClipboard::open()?;
            let hex = copy_color(&mut clipboard, &saved.palette, role)?;
            println!("Copied {hex} to the clipboard.");
            Ok(())
        }
        Command::Contrast { background } => run_contrast(&background),
        Command::SignUp => {
            let gateway = connect()?;
            let (email, password) = credentials.require()?;
            let outcome = gateway.sign_up(email, password).await?;
            if outcome.confirmation_sent {
                println!(
                    "Check {email} for a verification link, then run `lazytints verify <token>`."
                );
            } else {
                println!("Account created for {email}.");
            }
            Ok(())
        }
        Command::Verify { token } => {
            let gateway = connect()?;
            gateway.verify_email(&token).await?;
            println!("Email verified. You can sign in now.");
            Ok(())
        }
        Command::List => {
            let gateway = signed_in(&credentials).await?;
            let result = run_list(&gateway).await;
            sign_out(&gateway).await;
            result
        }
        Command::Delete { id } => {
            let gateway = signed_in(&credentials).await?;
            let result = gateway.delete_saved_palette(&id).await;
            sign_out(&gateway).await;
            result?;
            println!("Deleted {id}.");
            Ok(())
        }
        Command::Stats => {
            let gateway = connect()?;
            let stats = gateway.global_stats().await?;
            println!("Palettes generated:  {}", stats.generated);
            println!("Palettes downloaded: {}", stats.downloaded);
            Ok(())
        }
        Command::InitDb => {
            let gateway = connect()?;
            if credentials.is_complete() {
                let (email, password) = credentials.require()?;
                gateway.sign_in(email, password).await?;
            }
            let created = gateway.ensure_schema().await;
            sign_out(&gateway).await;
            if created? {
                println!("Created the saved palettes table.");
            } else {
                println!("The saved palettes table already exists.");
            }
            Ok(())
        }
    }
}

struct Credentials {
    email: Option<String>,
    password: Option<String>,
}

impl Credentials {
    fn is_complete(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }

    fn require(&self) -> Result<(&str, &str)> {
        match (self.email.as_deref(), self.password.as_deref()) {
            (Some(email), Some(password)) => Ok((email, password)),
            _ => bail!(
                "--email and --password (or LAZYTINTS_EMAIL and LAZYTINTS_PASSWORD) are required"
            ),
        }
    }
}

struct GenerateOpts {
    mode: ThemeMode,
    preview: bool,
    format: ExportFormat,
    output: Option<PathBuf>,
    download: bool,
    save: bool,
    no_stats: bool,
    copy: Option<ColorRole>,
}

fn connect() -> Result<PaletteGateway> {
    let config = Config::from_env().context("store is not configured")?;
    let backend = SupabaseBackend::new(&config)?;
    Ok(PaletteGateway::new(
        Arc::new(backend),
        Arc::new(SessionContext::new()),
    ))
}

async fn signed_in(credentials: &Credentials) -> Result<PaletteGateway> {
    let (email, password) = credentials.require()?;
    let gateway = connect()?;
    gateway
        .sign_in(email, password)
        .await
        .with_context(|| format!("could not sign in as {email}"))?;
    Ok(gateway)
}

async fn sign_out(gateway: &PaletteGateway) {
    if let Err(e) = gateway.sign_out().await {
        tracing::warn!(error = %e, "sign out failed");
    }
}

/// Counters are best effort; a failure never stops the command.
async fn record(gateway: Option<&PaletteGateway>, stat: StatName) {
    let Some(gateway) = gateway else {
        return;
    };
    if let Err(e) = gateway.increment_stat(stat).await {
        tracing::warn!(stat = stat.as_str(), error = %e, "could not record stat");
    }
}

async fn run_generate(opts: GenerateOpts, credentials: &Credentials) -> Result<()> {
    let palette = generate_palette(opts.mode);
    tracing::debug!(name = %palette.name, category = %palette.category, "generated palette");

    let gateway = if opts.save || !opts.no_stats {
        match connect() {
            Ok(gateway) => Some(gateway),
            Err(e) if !opts.save => {
                tracing::debug!(error = %e, "skipping stats");
                None
            }
            Err(e) => return Err(e),
        }
    } else {
        None
    };
    let stats = gateway.as_ref().filter(|_| !opts.no_stats);

    record(stats, StatName::Generated).await;

    if opts.preview {
        let mut stdout = std::io::stdout().lock();
        preview::render(&mut stdout, &palette).context("failed to print preview")?;
    }

    let exporter = exporter_for(opts.format);
    let target = match (opts.output, opts.download) {
        (Some(path), _) => Some(path),
        (None, true) => Some(PathBuf::from(default_file_name(&palette, exporter.as_ref()))),
        (None, false) => None,
    };
    match target {
        Some(path) => {
            exporter.write_to(&palette, &path)?;
            tracing::info!(path = %path.display(), format = exporter.name(), "palette written");
            record(stats, StatName::Downloaded).await;
        }
        None if !opts.preview => print!("{}", exporter.serialize(&palette)),
        None => {}
    }

    if let Some(role) = opts.copy {
        let mut clipboard = SystemClipboard::open()?;
        let hex = copy_color(&mut clipboard, &palette, role)?;
        tracing::info!(color = %hex, "copied to clipboard");
    }

    if let Some(gateway) = gateway.as_ref().filter(|_| opts.save) {
        let (email, password) = credentials.require()?;
        gateway
            .sign_in(email, password)
            .await
            .with_context(|| format!("could not sign in as {email}"))?;
        let saved = gateway
            .with_schema_recovery(|| gateway.save_palette(&palette))
            .await;
        sign_out(gateway).await;
        saved.context("could not save palette")?;
        println!("Saved \"{}\" to your palettes.", palette.name);
    }

    Ok(())
}

fn run_contrast(background: &str) -> Result<()> {
    let color = Color::from_hex(background)?;
    let tone = contrast_text(color);
    let name = match tone {
        TextTone::Black => "black",
        TextTone::White => "white",
    };
    let ratio = Color::contrast_ratio(&color, &tone.color());
    println!("{} -> {name} text ({ratio:.2}:1)", color.to_hex_upper());
    Ok(())
}

async fn run_list(gateway: &PaletteGateway) -> Result<()> {
    if !gateway.check_table_exists().await? {
        bail!("the saved palettes table does not exist yet; run `lazytints init-db`");
    }
    let palettes = gateway.list_saved_palettes().await?;
    if palettes.is_empty() {
        println!("No saved palettes.");
        return Ok(());
    }
    for saved in palettes {
        let hexes: Vec<String> = saved
            .palette
            .swatches()
            .iter()
            .map(|(_, c)| c.to_hex_upper())
            .collect();
        println!(
            "{}  {}  {} ({})  {}",
            saved.id,
            saved.created_at.format("%Y-%m-%d %H:%M"),
            saved.palette.name,
            saved.palette.category,
            hexes.join(" "),
        );
    }
    Ok(())
}
