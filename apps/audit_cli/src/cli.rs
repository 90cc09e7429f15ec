use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use shared::domain::Fidelity;

/// Persona-driven design audits against the audit-design function.
#[derive(Parser, Debug)]
#[command(name = "design-audit", version, about, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to ./audit.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the functions gateway, e.g. https://<project>/functions/v1
    #[arg(long, global = true)]
    pub functions_url: Option<String>,

    /// API key sent as bearer token and `apikey` header
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available personas
    Personas,
    /// Audit a single local image
    Image(ImageArgs),
    /// Audit a list of frames, one at a time
    Frames(FramesArgs),
    /// Step through persona, config and results interactively
    Interactive,
}

#[derive(Args, Debug)]
pub struct AuditArgs {
    /// Persona id (see `design-audit personas`)
    #[arg(long)]
    pub persona: String,

    /// Design fidelity: low, medium or high
    #[arg(long, default_value = "medium")]
    pub fidelity: Fidelity,

    /// What the design is for
    #[arg(long, default_value = "")]
    pub purpose: String,

    /// Write a JSON report to this path
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ImageArgs {
    #[command(flatten)]
    pub audit: AuditArgs,

    /// Image file to audit
    pub path: PathBuf,
}

#[derive(Args, Debug)]
pub struct FramesArgs {
    #[command(flatten)]
    pub audit: AuditArgs,

    /// JSON manifest: [{"name": ..., "imageUrl": ...}, ...]
    #[arg(long, conflicts_with = "figma_file", required_unless_present = "figma_file")]
    pub manifest: Option<PathBuf>,

    /// Figma file key to export frames from
    #[arg(long, requires = "nodes")]
    pub figma_file: Option<String>,

    /// Figma node id of a frame (repeatable)
    #[arg(long = "node")]
    pub nodes: Vec<String>,
}
