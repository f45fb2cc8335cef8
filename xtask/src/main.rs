use clap::{Parser, Subcommand};
#[cfg(not(test))]
use xtask::*;

#[derive(Parser)]
#[command(author, version, about = "Development tasks for olafft")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Build,
    Test,
    /// Test the library under every supported feature combination
    Matrix,
    Clippy,
    Fmt,
    Analyze,
    Bench,
    /// Run one of the demos, passing the remaining arguments through
    Demo {
        name: String,
        #[arg(trailing_var_arg = true)]
        args: Vec<String>,
    },
}

#[cfg(not(test))]
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = detect_config();

    match cli.command {
        Commands::Build => run_all([build_command(&cfg)]),
        Commands::Test => run_all([test_command(&cfg)]),
        Commands::Matrix => run_all(feature_matrix_commands()),
        Commands::Clippy => run_all([clippy_command()]),
        Commands::Fmt => run_all([fmt_command()]),
        Commands::Analyze => run_all([fmt_command(), clippy_command()]),
        Commands::Bench => run_all([bench_command(&cfg)]),
        Commands::Demo { name, args } => run_all([demo_command(&cfg, &name, &args)]),
    }
}
