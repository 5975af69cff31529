// src/main.rs
use anyhow::{Context, Result};
use clap::Parser;
use colorful::Colorful;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use wavelens::cli::{format_report, Args, OutputFormat};
use wavelens::core::analysis::parse_filterbank_csv;
use wavelens::core::decoder::decode_audio;
use wavelens::core::{Analyzer, FeatureSelection};
use wavelens::export::{build_metrics_csv, build_metrics_json, ExportSelection};

const AUDIO_EXTENSIONS: [&str; 9] = [
    "wav", "flac", "mp3", "ogg", "opus", "m4a", "aac", "aiff", "aif",
];

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let files = collect_audio_files(&args.input)?;
    if files.is_empty() {
        println!("{}", "No audio files found!".red());
        return Ok(());
    }

    let custom_bank = match &args.filterbank {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read filterbank: {}", path.display()))?;
            let rows = parse_filterbank_csv(&text)
                .with_context(|| format!("No numeric filter rows in {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "filterbank.csv".to_string());
            Some((name, rows))
        }
        None => None,
    };

    if files.len() == 1 {
        let rendered = analyze_file(&files[0], &args, &custom_bank)?;
        emit(&rendered, args.output.as_deref(), &files[0], &args)?;
        return Ok(());
    }

    println!("Found {} audio file(s)\n", files.len());
    if let Some(output) = &args.output {
        fs::create_dir_all(output)
            .with_context(|| format!("Failed to create output dir: {}", output.display()))?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("[{bar:40}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    // Each file gets its own analyzer (and cache); the engine itself
    // stays single-threaded per file.
    let failures: Vec<String> = files
        .par_iter()
        .filter_map(|file| {
            let outcome = analyze_file(file, &args, &custom_bank)
                .and_then(|rendered| emit(&rendered, args.output.as_deref(), file, &args));
            progress.inc(1);
            outcome.err().map(|e| format!("{}: {:#}", file.display(), e))
        })
        .collect();
    progress.finish_and_clear();

    if !failures.is_empty() {
        for failure in &failures {
            eprintln!("{} {}", "error:".red(), failure);
        }
        anyhow::bail!("{} file(s) failed", failures.len());
    }
    Ok(())
}

fn analyze_file(
    path: &Path,
    args: &Args,
    custom_bank: &Option<(String, Vec<Vec<f32>>)>,
) -> Result<String> {
    let audio = decode_audio(path)?;
    let signal = audio.into_signal();

    let mut builder = Analyzer::builder().config(args.analysis_config());
    if let Some((name, rows)) = custom_bank {
        builder = builder.custom_filterbank(name.clone(), rows.clone());
    }
    let mut analyzer = builder.build();

    let selection = if args.features {
        FeatureSelection::all()
    } else {
        FeatureSelection::default()
    };
    let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned());
    let report = analyzer.analyze(&signal, file_name.as_deref(), &selection)?;

    Ok(match args.format {
        OutputFormat::Text => format_report(&report, args.verbose),
        OutputFormat::Json => build_metrics_json(&report, &ExportSelection::default()),
        OutputFormat::Csv => build_metrics_csv(&report, &ExportSelection::default()),
    })
}

fn emit(rendered: &str, output: Option<&Path>, source: &Path, args: &Args) -> Result<()> {
    match output {
        None => {
            println!("{}", rendered);
            Ok(())
        }
        Some(target) => {
            let path = if target.is_dir() {
                let extension = match args.format {
                    OutputFormat::Text => "txt",
                    OutputFormat::Json => "json",
                    OutputFormat::Csv => "csv",
                };
                let stem = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "report".to_string());
                target.join(format!("{}.{}", stem, extension))
            } else {
                target.to_path_buf()
            };
            fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))
        }
    }
}

fn collect_audio_files(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        anyhow::bail!("Input path does not exist: {}", input.display());
    }

    let mut files: Vec<PathBuf> = WalkDir::new(input)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}
