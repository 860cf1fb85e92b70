use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use simexport::rendering::capture::PngFileSource;
use simexport::{
    AlgorithmResult, BoundaryPolicy, CaptureOptions, DirectorySink, ExportConfig, ExportOutcome,
    Exporter, Orientation, PageLayout, PdfRenderer,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "simexport", version, about = "Export simulation results as files, archives and documents")]
struct Cli {
    /// Directory the artifacts are written to
    #[arg(short, long, default_value = ".", global = true)]
    out_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Bundle params and results into one archive
    Archive { result: PathBuf },
    /// Export the params as JSON
    Params { result: PathBuf },
    /// Export the deterministic results as TSV
    Results { result: PathBuf },
    /// Run the params, results and archive exports concurrently
    All { result: PathBuf },
    /// Paginate a PNG screenshot into a PDF document
    Snapshot(SnapshotArgs),
}

#[derive(Args)]
struct SnapshotArgs {
    /// PNG screenshot of the visual state
    image: PathBuf,
    /// Capture bound in milliseconds
    #[arg(long, default_value_t = 30000)]
    timeout_ms: u64,
    #[arg(long, default_value_t = 210.0)]
    page_width_mm: f64,
    #[arg(long, default_value_t = 297.0)]
    page_height_mm: f64,
    #[arg(long)]
    landscape: bool,
    /// Emit a trailing page when the image is an exact multiple of the page height
    #[arg(long)]
    legacy_boundary: bool,
}

fn load_result(path: &Path) -> anyhow::Result<Option<AlgorithmResult>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// Print the outcome; returns whether it was delivered.
fn print_outcome(outcome: &ExportOutcome) -> bool {
    match outcome {
        ExportOutcome::Delivered(report) => {
            println!("{}  {} bytes  sha256:{}", report.file_name, report.size, report.sha256);
            for entry in &report.entries {
                println!("  + {}", entry);
            }
            if let Some(pages) = report.page_count {
                println!("  {} page(s)", pages);
            }
            for diagnostic in &report.diagnostics {
                println!("  ! {}", diagnostic);
            }
            true
        }
        ExportOutcome::Skipped(diagnostic) => {
            eprintln!("skipped: {}", diagnostic);
            false
        }
        ExportOutcome::Failed(err) => {
            eprintln!("failed: {}", err);
            false
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let sink = DirectorySink::new(&cli.out_dir);

    let delivered = match cli.command {
        Command::Archive { result } => {
            let result = load_result(&result)?;
            let exporter = Exporter::new(ExportConfig::default(), sink);
            print_outcome(&exporter.export_archive(result.as_ref()).await?)
        }
        Command::Params { result } => {
            let result = load_result(&result)?;
            let exporter = Exporter::new(ExportConfig::default(), sink);
            print_outcome(&exporter.export_params(result.as_ref())?)
        }
        Command::Results { result } => {
            let result = load_result(&result)?;
            let exporter = Exporter::new(ExportConfig::default(), sink);
            print_outcome(&exporter.export_results(result.as_ref())?)
        }
        Command::All { result } => {
            let result = load_result(&result)?;
            let exporter = Exporter::new(ExportConfig::default(), sink);
            let (params, results, archive) = tokio::join!(
                async { exporter.export_params(result.as_ref()) },
                async { exporter.export_results(result.as_ref()) },
                exporter.export_archive(result.as_ref()),
            );
            let outcomes = [params?, results?, archive?];
            outcomes.iter().map(print_outcome).fold(true, |all, ok| all && ok)
        }
        Command::Snapshot(args) => {
            let config = ExportConfig {
                capture: CaptureOptions {
                    timeout_ms: args.timeout_ms,
                    ..Default::default()
                },
                layout: PageLayout {
                    page_width_mm: args.page_width_mm,
                    page_height_mm: args.page_height_mm,
                    orientation: if args.landscape {
                        Orientation::Landscape
                    } else {
                        Orientation::Portrait
                    },
                    boundary: if args.legacy_boundary {
                        BoundaryPolicy::Inclusive
                    } else {
                        BoundaryPolicy::Strict
                    },
                },
            };
            let exporter = Exporter::new(config, sink);
            let source = PngFileSource::new(args.image);
            print_outcome(&exporter.export_document(PdfRenderer::shared(), &source).await)
        }
    };

    if !delivered {
        bail!("export did not complete");
    }
    Ok(())
}
