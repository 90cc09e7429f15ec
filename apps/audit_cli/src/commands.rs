//! Subcommand implementations.

use std::{io::Write, process::ExitCode};

use anyhow::{anyhow, bail, Context};
use client_core::{AuditSession, EncodedImage, FigmaClient, HttpAuditBackend};
use shared::domain::{builtin_personas, find_persona, AuditConfig, PersonaId};
use tokio::{
    io::BufReader,
    sync::mpsc::{unbounded_channel, UnboundedReceiver},
};
use tracing::{info, warn};

use crate::{
    cli::{AuditArgs, FramesArgs, ImageArgs},
    config::Settings,
    controller::{WizardController, WizardEvent},
    frames,
    report::AuditReport,
    ui::{drive, interactive, render},
};

type Controller = WizardController<HttpAuditBackend>;

fn build_controller(
    settings: &Settings,
) -> anyhow::Result<(Controller, UnboundedReceiver<WizardEvent>)> {
    let backend = HttpAuditBackend::new(
        &settings.functions_url,
        &settings.function_name,
        settings.api_key.clone(),
    )?;
    info!(endpoint = %backend.endpoint(), "audit backend configured");
    let (tx, rx) = unbounded_channel();
    Ok((WizardController::new(AuditSession::new(backend), tx), rx))
}

fn resolve_persona(raw: &str) -> anyhow::Result<PersonaId> {
    find_persona(raw).map(|persona| persona.id).ok_or_else(|| {
        let known: Vec<String> = builtin_personas()
            .into_iter()
            .map(|persona| persona.id.0)
            .collect();
        anyhow!("unknown persona '{raw}' (known: {})", known.join(", "))
    })
}

fn write_report(
    controller: &Controller,
    args: &AuditArgs,
    config: &AuditConfig,
) -> anyhow::Result<()> {
    let Some(path) = &args.output else {
        return Ok(());
    };
    let report = AuditReport::from_state(controller.state(), config)
        .context("no results to write")?;
    report.write_to(path)?;
    info!(path = %path.display(), "report written");
    Ok(())
}

pub fn personas() -> anyhow::Result<ExitCode> {
    print!("{}", render::render_personas(&builtin_personas()));
    Ok(ExitCode::SUCCESS)
}

pub async fn image(settings: &Settings, args: ImageArgs) -> anyhow::Result<ExitCode> {
    let persona = resolve_persona(&args.audit.persona)?;
    let config = AuditConfig::new(args.audit.fidelity, args.audit.purpose.clone());
    let image = EncodedImage::from_path(&args.path).await?;

    let (mut controller, mut events) = build_controller(settings)?;
    let mut stdout = std::io::stdout();
    controller.select_persona(persona.clone())?;
    writeln!(stdout, "{}", render::render_config(&persona, &config))?;

    let result = drive(controller.start_single(&config, &image), &mut events, &mut stdout).await?;
    if result.is_none() {
        return Ok(ExitCode::FAILURE);
    }
    write_report(&controller, &args.audit, &config)?;
    Ok(ExitCode::SUCCESS)
}

pub async fn frames(settings: &Settings, args: FramesArgs) -> anyhow::Result<ExitCode> {
    let persona = resolve_persona(&args.audit.persona)?;
    let config = AuditConfig::new(args.audit.fidelity, args.audit.purpose.clone());

    let frames = match (&args.manifest, &args.figma_file) {
        (Some(path), _) => frames::load_manifest(path)?,
        (None, Some(file_key)) => {
            let token = settings.figma_token.clone().context(
                "FIGMA_TOKEN (or figma_token in audit.toml) is required for Figma export",
            )?;
            let figma = FigmaClient::new(&settings.figma_api_url, token)?;
            let frames = figma.export_frames(file_key, &args.nodes).await?;
            frames::validate_frames(&frames)?;
            frames
        }
        (None, None) => bail!("either --manifest or --figma-file is required"),
    };

    let (mut controller, mut events) = build_controller(settings)?;
    let mut stdout = std::io::stdout();
    controller.select_persona(persona.clone())?;
    writeln!(stdout, "{}", render::render_config(&persona, &config))?;

    drive(controller.start_frames(&config, frames), &mut events, &mut stdout).await?;
    if !controller.state().all_screens_done() {
        warn!("multi-screen audit ended with screens still pending");
    }
    writeln!(stdout)?;
    write!(stdout, "{}", render::render_multi_results(controller.state()))?;
    write_report(&controller, &args.audit, &config)?;
    Ok(ExitCode::SUCCESS)
}

pub async fn interactive(settings: &Settings) -> anyhow::Result<ExitCode> {
    let (mut controller, mut events) = build_controller(settings)?;
    let mut stdout = std::io::stdout();
    interactive::run(
        &mut controller,
        &mut events,
        BufReader::new(tokio::io::stdin()),
        &mut stdout,
    )
    .await?;
    Ok(ExitCode::SUCCESS)
}
