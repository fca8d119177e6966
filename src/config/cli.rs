use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "file-genai")]
#[command(about = "Send images, documents, spreadsheets and text files to a Gemini model")]
pub struct CliArgs {
    /// Files to process, one request per file
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Ask this instead of the configured prompt template
    #[arg(short, long)]
    pub question: Option<String>,

    #[arg(long, default_value = "default")]
    pub prompt_type: String,

    /// Override `output.save_results` from the config file
    #[arg(long)]
    pub save: Option<bool>,

    #[arg(long, help = "Resolve loaders and prompts without calling the model")]
    pub dry_run: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,
}
