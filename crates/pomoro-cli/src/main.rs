use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "pomoro", version, about = "Pomoro -- a pomodoro timer for your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Begin a session for an existing task
    Begin(commands::begin::BeginArgs),
    /// Create a task and immediately begin it
    Start(commands::begin::StartArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action),
        Commands::Begin(args) => commands::begin::run(args),
        Commands::Start(args) => commands::begin::start(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
