//! Prompt command - show what would be sent to the generator.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use tracing::info;

use readprep_core::{compose_prompt, ReadprepError, Segmenter, TextExtractor};

use super::convert::apply_ocr_flags;
use super::load_config;

/// Arguments for the prompt command.
#[derive(Args)]
pub struct PromptArgs {
    /// Input PDF, or a plain-text file with already extracted text
    #[arg(required = true)]
    input: PathBuf,

    /// Print the segmentation as JSON instead of the prompt
    #[arg(long)]
    segments: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,
}

pub async fn run(args: PromptArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    apply_ocr_flags(&mut config, args.model_dir.as_deref(), args.text_only);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let is_pdf = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));

    let text = if is_pdf {
        let data = fs::read(&args.input)?;
        let extractor = TextExtractor::new(&config);
        let document = tokio::task::spawn_blocking(move || extractor.extract(&data))
            .await??
            .ok_or(ReadprepError::NoText)?;
        info!("Extracted {} chars ({:?})", document.text.len(), document.source);
        document.text
    } else {
        fs::read_to_string(&args.input)?
    };

    let segmentation = Segmenter::from_config(&config.segmentation)?.segment(text.as_str());

    if args.segments {
        println!("{}", serde_json::to_string_pretty(&segmentation)?);
    } else {
        println!("{}", compose_prompt(&segmentation));
    }

    Ok(())
}
