//! Convert command - turn a single reading-test PDF into a practice page.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use readprep_core::{PracticeConverter, ReadprepConfig, TextSource};

use super::load_config;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input PDF
    #[arg(required = true)]
    input: PathBuf,

    /// Output HTML file (default: `<uuid>.html` in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,

    /// Also write the composed prompt to this file
    #[arg(long)]
    save_prompt: Option<PathBuf>,
}

/// Apply the OCR-related flags shared by `convert` and `batch`.
pub fn apply_ocr_flags(config: &mut ReadprepConfig, model_dir: Option<&Path>, text_only: bool) {
    if let Some(dir) = model_dir {
        config.models.model_dir = dir.to_path_buf();
    }
    if text_only {
        config.ocr.enabled = false;
    }
}

pub async fn run(args: ConvertArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_ocr_flags(&mut config, args.model_dir.as_deref(), args.text_only);

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let converter = PracticeConverter::from_config(&config)?;
    info!("Converting file: {}", args.input.display());

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")?
            .progress_chars("##-"),
    );
    pb.enable_steady_tick(Duration::from_millis(120));

    pb.set_message("Extracting text...");
    let data = fs::read(&args.input)?;
    let prepared = match converter.prepare(data).await {
        Ok(prepared) => prepared,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.inc(2);

    if prepared.document.source == TextSource::Ocr {
        debug!("Text recovered with OCR");
    }
    if let Some(path) = &args.save_prompt {
        fs::write(path, &prepared.prompt)?;
        debug!("Prompt written to {}", path.display());
    }

    pb.set_message("Generating page...");
    let artifact = match converter.generate(&prepared).await {
        Ok(artifact) => artifact,
        Err(e) => {
            pb.abandon_with_message("Failed");
            return Err(e.into());
        }
    };
    pb.inc(2);
    pb.finish_with_message("Done");

    let output_path = args
        .output
        .unwrap_or_else(|| PathBuf::from(&artifact.file_name));
    fs::write(&output_path, &artifact.html)?;

    println!(
        "{} Practice page written to {}",
        style("✓").green(),
        output_path.display()
    );
    println!(
        "{} {} questions, {} answers ({:?} text)",
        style("ℹ").blue(),
        prepared.segmentation.questions.len(),
        prepared.segmentation.answers.len(),
        prepared.document.source
    );

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_only_disables_ocr() {
        let mut config = ReadprepConfig::default();
        apply_ocr_flags(&mut config, Some(Path::new("/opt/models")), true);
        assert!(!config.ocr.enabled);
        assert_eq!(config.models.model_dir, PathBuf::from("/opt/models"));
    }
}
