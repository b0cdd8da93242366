//! cleave - Split PDFs at bookmark boundaries

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cleave::{
    analyze_structure, classify_outline, extract_outline, plan_split, split_pdf, Error,
    OutlineStatus, Pdf,
};

#[derive(Parser)]
#[command(name = "cleave")]
#[command(version, about = "Split PDFs at bookmark boundaries", long_about = None)]
#[command(after_help = "EXAMPLES:
    cleave book.pdf --outline              List bookmarks with pattern tags
    cleave book.pdf --at 5,12,40 -o out    Split before pages 5, 12 and 40
    cleave book.pdf --at 5 --json          Machine-readable split report")]
struct Cli {
    /// Input PDF
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// List the bookmark outline without splitting
    #[arg(long, conflicts_with = "at")]
    outline: bool,

    /// Comma-separated 1-based page numbers to split at
    #[arg(long, value_name = "PAGES", required_unless_present = "outline")]
    at: Option<String>,

    /// Comma-separated labels for the output parts
    #[arg(long, value_name = "LABELS")]
    labels: Option<String>,

    /// Output directory for the split parts
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    out: PathBuf,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the summary output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = if cli.outline {
        show_outline(&cli)
    } else {
        run_split(&cli)
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn show_outline(cli: &Cli) -> Result<(), String> {
    let pdf = Pdf::open(&cli.input).map_err(|e| e.to_string())?;
    let mut outline = extract_outline(&pdf);
    let patterns = classify_outline(&mut outline.nodes);
    let structure = analyze_structure(&outline.nodes);

    if cli.json {
        let payload = serde_json::json!({
            "document": {
                "path": cli.input.display().to_string(),
                "pages": pdf.page_count(),
                "byte_size": pdf.byte_size(),
            },
            "nodes": outline.nodes,
            "stats": outline.stats,
            "patterns": patterns,
            "structure": structure,
        });
        let text = serde_json::to_string_pretty(&payload).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    match outline.stats.status {
        OutlineStatus::Missing => {
            println!("{}: no bookmarks", cli.input.display());
            return Ok(());
        }
        OutlineStatus::Damaged => {
            let diagnostic = outline
                .stats
                .diagnostic
                .as_deref()
                .unwrap_or("outline unreadable");
            println!("{}: outline damaged ({diagnostic})", cli.input.display());
            return Ok(());
        }
        OutlineStatus::Parsed => {}
    }

    println!(
        "{}: {} pages, {}, {} bookmarks ({} valid, {} errors)",
        cli.input.display(),
        pdf.page_count(),
        human_size(pdf.byte_size()),
        outline.stats.total_nodes,
        outline.stats.valid_nodes,
        outline.stats.error_count
    );
    for node in &outline.nodes {
        let tag = node.pattern.map(|p| p.as_str()).unwrap_or("-");
        let page = node
            .page
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".to_string());
        println!(
            "  [{tag:>12}] p.{page:<5} {indent}{title}",
            indent = "  ".repeat(node.level as usize),
            title = node.title
        );
    }
    println!(
        "Patterns: {}/{} matched ({:.1}%)",
        patterns.matched, patterns.processed, patterns.match_percentage
    );
    Ok(())
}

fn run_split(cli: &Cli) -> Result<(), String> {
    let raw = cli.at.as_deref().expect("clap enforces --at");
    let points = parse_points(raw).map_err(|e| e.to_string())?;
    let labels = cli.labels.as_deref().map(parse_labels);

    let pdf = Pdf::open(&cli.input).map_err(|e| e.to_string())?;
    let plan = plan_split(&points, pdf.page_count()).map_err(|e| e.to_string())?;
    let report =
        split_pdf(&pdf, &plan, labels.as_deref(), &cli.out).map_err(|e| e.to_string())?;

    if cli.json {
        let text = serde_json::to_string_pretty(&report).map_err(|e| e.to_string())?;
        println!("{text}");
        return Ok(());
    }

    if !cli.quiet {
        for part in &report.parts {
            println!(
                "  {} ({} pages, {})",
                part.filename,
                part.page_count,
                human_size(part.byte_size)
            );
        }
        println!(
            "Wrote {} parts, {} total in {:.2}s",
            report.total_parts,
            human_size(report.total_bytes),
            report.elapsed.as_secs_f64()
        );
        if !report.skipped_pages.is_empty() {
            println!("Skipped pages: {:?}", report.skipped_pages);
        }
    }
    Ok(())
}

fn parse_points(raw: &str) -> cleave::Result<Vec<u32>> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| {
            token
                .parse::<u32>()
                .map_err(|_| Error::InvalidSplitPoint(token.to_string()))
        })
        .collect()
}

fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',').map(|label| label.trim().to_string()).collect()
}

fn human_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
