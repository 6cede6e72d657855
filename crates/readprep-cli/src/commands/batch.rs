//! Batch command - convert many PDFs concurrently.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use readprep_core::PracticeConverter;

use super::convert::apply_ocr_flags;
use super::load_config;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern for input PDFs
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Number of files converted at the same time
    #[arg(short = 'j', long, default_value = "4")]
    jobs: usize,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Skip OCR and use only the PDF text layer
    #[arg(long)]
    text_only: bool,
}

/// Outcome for one input file.
struct FileResult {
    path: PathBuf,
    output: Option<PathBuf>,
    error: Option<String>,
    processing_time_ms: u64,
}

/// Output path for an input PDF: same stem, `.html` extension.
fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("practice");
    output_dir.join(format!("{}.html", stem))
}

/// Output paths for all inputs, numbering repeated stems (`a.html`,
/// `a-2.html`) so no two inputs write the same file.
fn plan_outputs(output_dir: &Path, files: &[PathBuf]) -> Vec<PathBuf> {
    let mut taken = HashSet::new();
    files
        .iter()
        .map(|input| {
            let mut output = output_path(output_dir, input);
            let stem = output
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("practice")
                .to_string();
            let mut n = 2;
            while !taken.insert(output.clone()) {
                output = output_dir.join(format!("{}-{}.html", stem, n));
                n += 1;
            }
            output
        })
        .collect()
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    apply_ocr_flags(&mut config, args.model_dir.as_deref(), args.text_only);

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| is_pdf(p))
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching PDF files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to convert",
        style("ℹ").blue(),
        files.len()
    );

    fs::create_dir_all(&args.output_dir)?;
    let converter = PracticeConverter::from_config(&config)?;

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let outputs = plan_outputs(&args.output_dir, &files);
    let mut pending = stream::iter(files.into_iter().zip(outputs))
        .map(|(path, output)| {
            let converter = converter.clone();
            async move { convert_file(&converter, path, output).await }
        })
        .buffer_unordered(args.jobs.max(1));

    let mut results = Vec::new();
    while let Some(result) = pending.next().await {
        overall_pb.inc(1);

        if let Some(message) = &result.error {
            if args.continue_on_error {
                warn!("Failed to convert {}: {}", result.path.display(), message);
            } else {
                error!("Failed to convert {}: {}", result.path.display(), message);
                overall_pb.abandon();
                anyhow::bail!("Conversion failed for {}: {}", result.path.display(), message);
            }
        }
        results.push(result);
    }

    overall_pb.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.output.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    println!();
    println!(
        "{} Converted {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!("  {} {}", style("Successful:").green(), successful.len());
    for result in &successful {
        if let Some(output) = &result.output {
            println!(
                "    {} -> {} ({}ms)",
                result.path.display(),
                output.display(),
                result.processing_time_ms
            );
        }
    }

    if !failed.is_empty() {
        println!("  {} {}", style("Failed:").red(), failed.len());
        for result in &failed {
            println!(
                "    {} - {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn convert_file(converter: &PracticeConverter, path: PathBuf, output: PathBuf) -> FileResult {
    let start = Instant::now();

    let outcome = async {
        let data = tokio::fs::read(&path).await?;
        let artifact = converter.convert(data).await?;
        tokio::fs::write(&output, &artifact.html).await?;
        debug!("Wrote output to {}", output.display());
        anyhow::Ok(output)
    }
    .await;

    let processing_time_ms = start.elapsed().as_millis() as u64;
    match outcome {
        Ok(output) => FileResult {
            path,
            output: Some(output),
            error: None,
            processing_time_ms,
        },
        Err(e) => FileResult {
            path,
            output: None,
            error: Some(e.to_string()),
            processing_time_ms,
        },
    }
}
