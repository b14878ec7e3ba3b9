use std::path::PathBuf;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use hts_import::config::Config;
use hts_import::importer::DryRunStore;
use hts_import::report::TracingSink;
use hts_import::services::{CheckService, ImportService};

#[derive(Parser)]
#[command(name = "hts-import")]
#[command(about = "Check and import hydrological time-series files against a spreadsheet manifest", long_about = None)]
struct Cli {
    /// Run mode: 'check' (validate only) or 'import' (check, then import)
    #[arg(long, default_value = "check")]
    mode: String,

    /// Working directory with the manifest spreadsheet and the data files
    /// (default: DATA_DIR or the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Data-file extension (default: DATA_EXTENSION or 'hts')
    #[arg(long)]
    data_ext: Option<String>,

    /// Skip confirmation prompt
    #[arg(short = 'y', long)]
    yes: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();
    let dir = cli.dir.unwrap_or(config.data_dir);
    let data_ext = cli.data_ext.unwrap_or(config.data_extension);

    match cli.mode.as_str() {
        "check" => run_check(&dir, &data_ext)?,
        "import" => run_import(&dir, &data_ext, cli.yes)?,
        _ => {
            return Err(format!("Invalid mode '{}'. Valid modes: check, import", cli.mode).into());
        }
    }

    Ok(())
}

fn run_check(dir: &PathBuf, data_ext: &str) -> Result<(), Box<dyn std::error::Error>> {
    info!("Checking {dir:?} against its manifest spreadsheet...");

    let service = CheckService::new(dir, data_ext);
    let mut sink = TracingSink;
    let outcome = service.run(&mut sink)?;

    println!("Manifest:           {}", outcome.spreadsheet);
    println!("Declared series:    {}", outcome.spreadsheet_entries.len());
    println!("Data files:         {}", outcome.file_entries.len());
    println!("Documents:          {}", outcome.documents.len());
    println!("Check passed.");

    Ok(())
}

fn run_import(
    dir: &PathBuf,
    data_ext: &str,
    skip_confirmation: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !skip_confirmation {
        println!("\n⚠️  This will check {dir:?} and import every data file.");
        println!("\nContinue? [y/N]: ");

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Import cancelled.");
            return Ok(());
        }
    }

    let service = ImportService::new(dir, data_ext);
    let mut sink = TracingSink;

    info!("Checking {dir:?} before import...");
    let outcome = service.check(&mut sink)?;

    let pb = ProgressBar::new(outcome.file_entries.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} Importing...")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut store = DryRunStore;
    let stats = service.import_files(&outcome, &mut store, |_| pb.inc(1))?;
    pb.finish_with_message("✓ Import complete");

    println!("\n{}", "=".repeat(60));
    println!("Import Summary");
    println!("{}", "=".repeat(60));
    println!("Manifest:           {}", outcome.spreadsheet);
    println!("Files Imported:     {}", stats.files);
    println!("New Series:         {}", stats.series_created);
    println!("Records Appended:   {}", stats.records_appended);
    println!("{}", "=".repeat(60));

    Ok(())
}
