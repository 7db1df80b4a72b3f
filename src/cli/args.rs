//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use docpress::record::RecordShape;
use std::path::PathBuf;

/// docpress: data records + HTML templates → PDF documents
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
#[command(
    disable_version_flag = true,
    arg(clap::Arg::new("version").long("version").action(clap::ArgAction::Version).help("Print version"))
)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: docpress.toml)
    #[arg(short = 'C', long, global = true, default_value = "docpress.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render one document to PDF
    #[command(visible_alias = "r")]
    Render {
        #[command(flatten)]
        args: RenderArgs,
    },

    /// Render once, then regenerate on every template change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        args: RenderArgs,
    },
}

/// Shared arguments for Render and Watch commands
#[derive(clap::Args, Debug, Clone)]
pub struct RenderArgs {
    /// JSON file holding the data record
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub record: PathBuf,

    /// Shape of the data record
    #[arg(short, long, value_enum)]
    pub shape: RecordShape,

    /// Template identifier, relative to the template directory
    #[arg(short, long)]
    pub template: String,

    /// Output PDF path (default: record file name with a .pdf extension)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Also write the final markup handed to the converter
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub emit_html: Option<PathBuf>,
}

impl RenderArgs {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.record.with_extension("pdf"))
    }
}
