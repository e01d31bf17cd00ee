use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use pathway_report::{
    ExporterConfig, ProfileSource, RasterPaths, ReportExporter, ReportRequest, SpeciesId,
};

#[derive(Parser)]
#[command(author, version, about = "Export a pathway analysis as a PDF report", long_about = None)]
struct Cli {
    /// Directory holding the stored analyses (<token>.json)
    #[arg(long)]
    analysis: PathBuf,
    /// Analysis token
    #[arg(long)]
    token: String,
    /// Identifier resource to report on
    #[arg(long, default_value = "TOTAL")]
    resource: String,
    /// Species database id (defaults to Homo sapiens)
    #[arg(long)]
    species: Option<u64>,
    /// Built-in layout profile
    #[arg(long, default_value = "breathe")]
    profile: String,
    /// Layout profile JSON file; overrides --profile
    #[arg(long)]
    profile_file: Option<PathBuf>,
    /// Number of pathways to detail
    #[arg(long)]
    pathways: Option<usize>,
    /// Index of the first pathway to detail
    #[arg(long, default_value_t = 0)]
    offset: usize,
    /// Pre-rendered diagram PNGs
    #[arg(long)]
    diagrams: Option<PathBuf>,
    /// Pre-rendered enhanced high-level diagram PNGs
    #[arg(long)]
    ehld: Option<PathBuf>,
    /// Pre-rendered overview (fireworks) PNGs
    #[arg(long)]
    fireworks: Option<PathBuf>,
    /// Directory with the OpenSans TTF faces
    #[arg(long)]
    fonts: Option<PathBuf>,
    /// Output PDF
    #[arg(short, long)]
    output: PathBuf,
    /// Log timing and progress
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let profile = match &cli.profile_file {
        Some(path) => ProfileSource::File(path.clone()),
        None => ProfileSource::Builtin(cli.profile.clone()),
    };
    let config = ExporterConfig {
        analysis_dir: cli.analysis.clone(),
        raster: RasterPaths {
            diagrams: cli.diagrams.clone(),
            ehld: cli.ehld.clone(),
            fireworks: cli.fireworks.clone(),
        },
        font_dir: cli.fonts.clone(),
        profile,
    };

    let exporter = match ReportExporter::from_config(&config) {
        Ok(exporter) => exporter,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut request = ReportRequest::new(&cli.token, &cli.resource).offset(cli.offset);
    if let Some(species) = cli.species {
        request = request.species(SpeciesId(species));
    }
    if let Some(count) = cli.pathways {
        request = request.pathways(count);
    }

    // The exporter writes only once the report is complete; a failed render
    // leaves no file behind.
    let mut buffer = Vec::new();
    let summary = match exporter.render_token(&request, &mut buffer) {
        Ok(summary) => summary,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = std::fs::write(&cli.output, &buffer) {
        eprintln!("Error: cannot write {}: {e}", cli.output.display());
        let _ = std::fs::remove_file(&cli.output);
        return ExitCode::FAILURE;
    }

    for fallback in &summary.fallbacks {
        eprintln!("warning: {fallback}");
    }
    println!(
        "{} ({} pages, {} pathways detailed)",
        cli.output.display(),
        summary.pages,
        summary.pathways_detailed
    );
    ExitCode::SUCCESS
}
