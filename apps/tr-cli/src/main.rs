use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tr_app::{AppResult, DefDocument, RunMessage, start_run};

#[derive(Parser)]
#[command(name = "tr-cli")]
#[command(about = "Tiltring CLI - tilted-ring model file tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a .def model file and report its header values
    Validate {
        /// Path to the .def file
        def_path: PathBuf,
    },
    /// List the parameter vectors in a model file
    Params {
        /// Path to the .def file
        def_path: PathBuf,
    },
    /// Round-trip the model to a new file at recorded precision
    Export {
        /// Path to the .def file
        def_path: PathBuf,
        /// Output path for the re-rendered file
        output: PathBuf,
    },
    /// Run the simulation binary on the model and print loop progress
    Run {
        /// Path to the .def file
        def_path: PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Validate { def_path } => validate(&def_path),
        Commands::Params { def_path } => params(&def_path),
        Commands::Export { def_path, output } => export(&def_path, &output),
        Commands::Run { def_path } => run(&def_path),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn validate(def_path: &PathBuf) -> AppResult<()> {
    let doc = DefDocument::open(def_path)?;
    println!("OK: {}", def_path.display());
    println!("  rings: {}", doc.set().ring_count());
    println!("  inset: {}", doc.inset());
    println!("  loops: {}", doc.loops());
    println!(
        "  parameters: {}",
        doc.set().known_names().collect::<Vec<_>>().join(", ")
    );
    Ok(())
}

fn params(def_path: &PathBuf) -> AppResult<()> {
    let doc = DefDocument::open(def_path)?;
    let radii = doc.set().radii();
    println!("RADI ({} rings): {radii:?}", radii.len());
    let names: Vec<String> = doc.set().known_names().map(str::to_string).collect();
    for name in names {
        if let Some(series) = doc.set().series(&name) {
            println!(
                "{name} [{}] (precision {}): {:?}",
                series.unit(),
                series.y_precision(),
                series.y_values()
            );
        }
    }
    Ok(())
}

fn export(def_path: &PathBuf, output: &PathBuf) -> AppResult<()> {
    let mut doc = DefDocument::open(def_path)?;
    doc.save_as(output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn run(def_path: &PathBuf) -> AppResult<()> {
    let mut doc = DefDocument::open(def_path)?;
    let run = start_run(&mut doc)?;
    for message in run.events.iter() {
        match message {
            RunMessage::Progress {
                loops_done,
                loops_total,
            } => println!("loop {loops_done}/{loops_total}"),
            RunMessage::Output(line) => tracing::debug!(line, "sim output"),
            RunMessage::Finished { message } => {
                println!("{message}");
                break;
            }
            RunMessage::Error { message } => {
                eprintln!("{message}");
                break;
            }
        }
    }
    Ok(())
}
