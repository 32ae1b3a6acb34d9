use clap::{Parser, Subcommand};
use worldview::error::AppError;

use crate::commands::{run_export, run_questions, run_score, ExportArgs, QuestionsArgs, ScoreArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Worldview Survey",
    about = "Score the modernity worldview survey and serve it over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Score a set of answers and print the resulting report
    Score(ScoreArgs),
    /// Print the question catalog
    Questions(QuestionsArgs),
    /// Write stored submissions as CSV to stdout
    Export(ExportArgs),
}

#[derive(clap::Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Score(args) => run_score(args),
        Command::Questions(args) => run_questions(args),
        Command::Export(args) => run_export(args),
    }
}
