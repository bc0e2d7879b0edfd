//! Worldgen CLI - generate explorable 3D worlds from images

mod commands;

use clap::{Parser, Subcommand};
use commands::{generate, status};

#[derive(Parser)]
#[command(name = "worldgen")]
#[command(about = "Upload images and generate a 3D world", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a directory of images and generate a world
    Generate(generate::GenerateArgs),

    /// Check the status of a generation operation
    Status {
        /// Operation id returned at submission
        operation_id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate(args) => generate::run(args),
        Commands::Status { operation_id } => status::run(&operation_id),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}
