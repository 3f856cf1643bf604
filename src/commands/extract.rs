//! Extract command handler

use std::time::Instant;

use anyhow::{bail, Context, Result};

use wikiextract::{ExtractionConfig, ExtractionStats, Extractor, InputFormat, JsonlSink};

use super::config;
use crate::cli::ExtractArgs;

/// Layer command-line overrides on top of file configuration.
pub fn apply_overrides(config: &mut ExtractionConfig, args: &ExtractArgs) {
    if let Some(preset) = args.preset {
        preset.apply(config);
    }
    if let Some(n) = args.max_articles {
        config.max_articles = n;
    }
    if let Some(n) = args.min_length {
        config.min_content_length = n;
    }
    if let Some(n) = args.max_length {
        config.content_length_cap = n;
    }
    if !args.exclude_prefixes.is_empty() {
        config.excluded_title_prefixes = args.exclude_prefixes.clone();
    }
    if let Some(ns) = args.namespace {
        config.main_namespace_id = ns;
    }
}

/// Run an extraction and print a summary.
#[cfg(not(tarpaulin_include))]
pub fn handle(args: &ExtractArgs) -> Result<()> {
    let mut settings = config::load(args.config.as_deref())?;
    apply_overrides(&mut settings, args);
    let extractor = Extractor::new(settings)?;

    if !args.archive.is_file() {
        bail!("Dump not found: {}", args.archive.display());
    }
    let format = if args.plain {
        InputFormat::PlainXml
    } else {
        InputFormat::from_path(&args.archive)
    };

    let mut sink = JsonlSink::create(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let started = Instant::now();
    let stats = extractor
        .extract_file(&args.archive, format, &mut sink)
        .with_context(|| {
            format!(
                "Extraction of {} stopped; {} articles were written to {}",
                args.archive.display(),
                sink.records(),
                args.output.display()
            )
        })?;

    if args.stats_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_summary(args, &stats, sink.bytes_written(), started.elapsed().as_secs_f64());
    }
    Ok(())
}

fn print_summary(args: &ExtractArgs, stats: &ExtractionStats, bytes_written: u64, secs: f64) {
    println!(
        "Saved {} articles to {} ({})",
        stats.accepted,
        args.output.display(),
        humansize::format_size(bytes_written, humansize::BINARY)
    );
    println!(
        "Read {} pages ({} of XML) in {:.1}s{}",
        stats.pages_seen,
        humansize::format_size(stats.bytes_read, humansize::BINARY),
        secs,
        if stats.stopped_early {
            ", stopped at the article limit"
        } else {
            ""
        }
    );
    for (reason, count) in stats.rejected.iter() {
        println!("  {:<24} {}", reason, count);
    }
}
