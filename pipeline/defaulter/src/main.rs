use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use defaulter::{commands, init_logging, Config};
use defaulter_model::EvaluationScope;

#[derive(Debug, Parser)]
#[command(
    name = "defaulter",
    version,
    about = "Predict which clinic patients will miss their next appointment",
    long_about = "defaulter trains a random forest on a clinic export and serves predictions.\n\n\
        Commands:\n  \
        train     Derive features, fit the model and save it\n  \
        evaluate  Score the saved model against a clinic export\n  \
        derive    Write the derived feature table as CSV\n  \
        serve     Serve the prediction form"
)]
struct Cli {
    /// Configuration file (defaults to ./defaulter.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Compute the defaulter label as of this date instead of now
    #[arg(long, global = true, value_name = "DATE")]
    label_date: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Derive features, train the forest and save the model
    Train(TrainArgs),
    /// Print a classification report for the saved model
    Evaluate(EvaluateArgs),
    /// Write the derived feature table as CSV
    Derive(DeriveArgs),
    /// Serve the prediction web form
    Serve(ServeArgs),
}

#[derive(Debug, Args)]
struct TrainArgs {
    /// Clinic export (CSV)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Where to write the model
    #[arg(long)]
    model: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SplitArg {
    Full,
    Test,
}

#[derive(Debug, Args)]
struct EvaluateArgs {
    #[arg(long)]
    input: Option<PathBuf>,

    #[arg(long)]
    model: Option<PathBuf>,

    /// Rows to score: the whole table or the held-out split
    #[arg(long, value_enum, default_value_t = SplitArg::Full)]
    split: SplitArg,
}

#[derive(Debug, Args)]
struct DeriveArgs {
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output CSV (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct ServeArgs {
    #[arg(long)]
    model: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long)]
    addr: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    if let Some(date) = cli.label_date {
        config.data.label_date = Some(date);
    }

    let rc = match cli.command {
        Command::Train(args) => run_train(config, &args),
        Command::Evaluate(args) => run_evaluate(config, &args),
        Command::Derive(args) => run_derive(config, &args),
        Command::Serve(args) => run_serve(config, &args),
    };
    std::process::exit(rc);
}

fn override_paths(config: &mut Config, input: &Option<PathBuf>, model: &Option<PathBuf>) {
    if let Some(p) = input {
        config.data.input = p.clone();
    }
    if let Some(p) = model {
        config.model.path = p.clone();
    }
}

fn run_train(mut config: Config, args: &TrainArgs) -> i32 {
    override_paths(&mut config, &args.input, &args.model);
    match commands::train(&config) {
        Ok(outcome) => {
            println!("Model Accuracy: {:.2}%", outcome.accuracy * 100.0);
            println!("Model saved to {}", config.model.path.display());
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_evaluate(mut config: Config, args: &EvaluateArgs) -> i32 {
    override_paths(&mut config, &args.input, &args.model);
    let scope = match args.split {
        SplitArg::Full => EvaluationScope::Full,
        SplitArg::Test => EvaluationScope::HeldOut,
    };
    match commands::evaluate_saved(&config, scope) {
        Ok(evaluation) => {
            println!("{}", evaluation.report);
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_derive(mut config: Config, args: &DeriveArgs) -> i32 {
    override_paths(&mut config, &args.input, &None);
    match commands::derive_to(&config, args.output.as_deref()) {
        Ok(rows) => {
            if let Some(out) = &args.output {
                println!("Wrote {rows} rows to {}", out.display());
            }
            0
        }
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}

fn run_serve(mut config: Config, args: &ServeArgs) -> i32 {
    override_paths(&mut config, &None, &args.model);
    if let Some(addr) = &args.addr {
        config.server.addr = addr.clone();
    }
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to start runtime: {e}");
            return 1;
        }
    };
    match runtime.block_on(commands::serve(&config)) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {e}");
            1
        }
    }
}
