use std::{env, fs, fs::File, path::Path};

use anyhow::{Context, Result};
use log::{error, info};
use simplelog::{LevelFilter, WriteLogger};

use fipimark::NormalizerConfig;
use fipimark::panic_handler;
use fipimark::pipeline::normalize_fragment;
use fipimark::runner::run_files;

const USAGE: &str = "Usage: fipimark <input.jsonl> <output.jsonl> <references.json> [config.yaml]\n       \
                     fipimark --debug-fragment <fragment.html> [category] [config.yaml]";

fn main() -> Result<()> {
    // Initialize logging with html5ever DEBUG logs filtered out
    WriteLogger::init(
        LevelFilter::Debug,
        simplelog::ConfigBuilder::new()
            .set_max_level(LevelFilter::Debug)
            .add_filter_ignore_str("html5ever")
            .build(),
        File::create("fipimark.log")?,
    )?;

    panic_handler::initialize_panic_handler();

    let args: Vec<String> = env::args().skip(1).collect();
    if matches!(args.first().map(|s| s.as_str()), Some("--debug-fragment")) {
        let fragment_path = args.get(1).context(USAGE)?;
        info!("Running fragment debug mode for {fragment_path}");
        let result = run_fragment_debug(fragment_path, args.get(2), args.get(3));
        if let Err(err) = &result {
            error!("Fragment debug mode failed: {err:?}");
        }
        return result;
    }

    let (input, output, references) = match args.as_slice() {
        [input, output, references, ..] => (input, output, references),
        _ => anyhow::bail!("{USAGE}"),
    };
    let config = NormalizerConfig::load_or_default(args.get(3).map(String::as_str));

    info!("Normalizing {input} into {output}");
    let report = run_files(
        Path::new(input),
        Path::new(output),
        Path::new(references),
        &config,
    )?;

    println!(
        "Done: tasks={} failed={} attachments={} references={} conflicts={}",
        report.tasks,
        report.failures,
        report.requiring_attachment,
        report.references.len(),
        report.references.conflicts()
    );
    Ok(())
}

fn run_fragment_debug(
    fragment_path: &str,
    category: Option<&String>,
    config_path: Option<&String>,
) -> Result<()> {
    let category = category
        .map(|raw| raw.parse::<u32>())
        .transpose()
        .with_context(|| format!("Category must be a number\n{USAGE}"))?;
    let config = NormalizerConfig::load_or_default(config_path.map(String::as_str));

    let raw_html = fs::read_to_string(fragment_path)
        .with_context(|| format!("Failed to read fragment {fragment_path}"))?;
    let fragment = normalize_fragment(&raw_html, category, &config);

    println!("Fragment debug mode");
    println!("===================");
    println!("Source: {fragment_path} ({} bytes)", raw_html.len());
    println!("Requires attachment: {}", fragment.requires_attachment);
    println!("TeX scripts: {}", fragment.tex_scripts);
    for (name, count) in fragment.stats.entries() {
        if count > 0 {
            println!("  {name}: {count}");
        }
    }
    println!("\n--- cleaned html ---\n{}", fragment.cleaned_html);
    println!("\n--- markdown ---\n{}", fragment.markdown);
    Ok(())
}
