//! Command-line interface for solving grid-based puzzles.

use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gridlock::{render_stats_table, Loader, Puzzle};

#[derive(Parser)]
#[command(name = "gridlock", about = "Analyze grid-based puzzles.")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Solve a puzzle specified by one or more constraints files.
    Solve {
        /// Configuration files, loaded into a single puzzle in order.
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Also print pass counts and the technique table.
        #[arg(short, long)]
        verbose: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(solved) => {
            if solved {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> gridlock::Result<bool> {
    match cli.command {
        Command::Solve { files, verbose } => {
            let mut puzzle = Puzzle::new();
            let mut loader = Loader::new();
            for file in &files {
                loader.load_file(&mut puzzle, file)?;
            }

            println!("Solving...");
            let solved = puzzle.solve()?;
            println!("{puzzle}");
            if solved {
                println!("Solved in {} passes.", puzzle.stats.passes);
            } else if puzzle.is_unsolvable() {
                println!("Not solvable.");
            } else {
                println!("Not solved.");
            }

            if verbose {
                if let Some(first_passes) = puzzle.stats.first_passes {
                    println!(
                        "Search began at pass {first_passes} and explored {} plies.",
                        puzzle.stats.plies
                    );
                }
                print!("{}", render_stats_table(&puzzle.stats));
            }
            Ok(solved)
        }
    }
}
