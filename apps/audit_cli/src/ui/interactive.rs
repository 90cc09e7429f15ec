//! Line-oriented wizard: persona, config, run, results, restart.

use std::{io::Write, path::Path};

use anyhow::bail;
use client_core::{AuditBackend, EncodedImage};
use shared::domain::{builtin_personas, find_persona, AuditConfig, AuditStep, Fidelity, PersonaId};
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, Lines},
    sync::mpsc::UnboundedReceiver,
};

use super::{drive, render};
use crate::{
    controller::{WizardController, WizardEvent},
    frames,
};

async fn prompt<R, W>(
    lines: &mut Lines<R>,
    out: &mut W,
    text: &str,
) -> anyhow::Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{text}")?;
    out.flush()?;
    Ok(lines.next_line().await?.map(|line| line.trim().to_string()))
}

fn resolve_persona(choice: &str) -> Option<PersonaId> {
    let personas = builtin_personas();
    if let Ok(n) = choice.parse::<usize>() {
        return personas.get(n.checked_sub(1)?).map(|persona| persona.id.clone());
    }
    find_persona(choice).map(|persona| persona.id)
}

pub async fn run<B, R, W>(
    controller: &mut WizardController<B>,
    events: &mut UnboundedReceiver<WizardEvent>,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    B: AuditBackend,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();

    loop {
        let step = controller.state().step;
        match step {
            AuditStep::Persona => {
                write!(out, "{}", render::render_personas(&builtin_personas()))?;
                let choice =
                    prompt(&mut lines, out, "persona (number or id, q to quit)> ").await?;
                let Some(choice) = choice else {
                    return Ok(());
                };
                if choice.eq_ignore_ascii_case("q") {
                    return Ok(());
                }
                match resolve_persona(&choice) {
                    Some(persona) => controller.select_persona(persona)?,
                    None => writeln!(out, "unknown persona '{choice}'")?,
                }
            }
            AuditStep::Config => {
                let Some(fidelity) = prompt(
                    &mut lines,
                    out,
                    "fidelity [low/medium/high, default medium, 'back' to change persona]> ",
                )
                .await?
                else {
                    return Ok(());
                };
                if fidelity.eq_ignore_ascii_case("back") {
                    controller.back()?;
                    continue;
                }
                let fidelity = if fidelity.is_empty() {
                    Fidelity::default()
                } else {
                    match fidelity.parse::<Fidelity>() {
                        Ok(fidelity) => fidelity,
                        Err(err) => {
                            writeln!(out, "{err}")?;
                            continue;
                        }
                    }
                };

                let Some(purpose) = prompt(&mut lines, out, "purpose> ").await? else {
                    return Ok(());
                };
                let Some(source) =
                    prompt(&mut lines, out, "image path or frames manifest (.json)> ").await?
                else {
                    return Ok(());
                };

                let config = AuditConfig::new(fidelity, purpose);
                if let Some(persona) = &controller.state().selected_persona {
                    writeln!(out, "{}", render::render_config(persona, &config))?;
                }

                if source.to_ascii_lowercase().ends_with(".json") {
                    match frames::load_manifest(Path::new(&source)) {
                        Ok(frames) => {
                            drive(controller.start_frames(&config, frames), events, out).await?
                        }
                        Err(err) => writeln!(out, "error: {err:#}")?,
                    }
                } else {
                    match EncodedImage::from_path(Path::new(&source)).await {
                        Ok(image) => {
                            drive(controller.start_single(&config, &image), events, out).await?;
                        }
                        Err(err) => writeln!(out, "error: {err}")?,
                    }
                }
            }
            AuditStep::Running => bail!("audit still running"),
            AuditStep::Results => {
                if controller.state().is_multi_screen {
                    write!(out, "{}", render::render_multi_results(controller.state()))?;
                }
                let Some(answer) = prompt(&mut lines, out, "start over? [y/N]> ").await? else {
                    return Ok(());
                };
                if !answer.eq_ignore_ascii_case("y") {
                    return Ok(());
                }
                controller.restart();
                while events.try_recv().is_ok() {}
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/interactive_tests.rs"]
mod tests;
