use clap::Parser;
use log::LevelFilter;
use psdate::{BatchRunner, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    let settings = cli.output_settings();

    log::info!("Starting PSD conversion process");
    log::info!("Output directory: {}", cli.output.display());
    log::info!(
        "Target format: {}",
        settings.format.to_string().to_uppercase()
    );

    let runner = BatchRunner::new(settings, &cli.output)?;
    let summary = runner.run(&cli.sources);

    let absolute_output =
        std::path::absolute(&summary.output_dir).unwrap_or_else(|_| summary.output_dir.clone());

    println!("\n--- Process Summary ---");
    println!("Total PSD files found: {}", summary.files_found);
    println!("Successfully converted: {}", summary.files_converted);
    println!("Files saved to: {}", absolute_output.display());

    Ok(())
}
