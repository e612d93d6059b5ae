use std::path::PathBuf;
use std::process;

use clap::Parser;
use formdoc_pdf::RenderConfig;

#[derive(Parser, Debug)]
#[command(name = "formdoc-pdf", version, about = "Render a JSON form submission as a PDF document")]
struct Cli {
    /// Submission record (a JSON object)
    input: PathBuf,

    /// Output PDF path. Defaults to `<name>-<form type>.pdf` in the current directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Form type used to look up the blueprint, e.g. "motor-claims"
    #[arg(long)]
    form_type: Option<String>,

    /// Letterhead logo (PNG or JPEG)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Font family to embed instead of the built-in Helvetica
    #[arg(long)]
    font_family: Option<String>,

    /// TrueType file for regular text
    #[arg(long)]
    font_regular: Option<PathBuf>,

    /// TrueType file for bold text
    #[arg(long)]
    font_bold: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let mut config = RenderConfig::from_env();
    if cli.logo.is_some() {
        config.logo_path = cli.logo;
    }
    if cli.font_family.is_some() {
        config.font.family = cli.font_family;
    }
    if cli.font_regular.is_some() {
        config.font.regular_path = cli.font_regular;
    }
    if cli.font_bold.is_some() {
        config.font.bold_path = cli.font_bold;
    }

    match formdoc_pdf::convert_json_to_pdf(
        &cli.input,
        cli.output.as_deref(),
        cli.form_type.as_deref(),
        &config,
    ) {
        Ok(path) => println!("Wrote {}", path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
