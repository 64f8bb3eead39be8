use clap::{Parser as ClapParser, Subcommand};
use claimpath::cli::{self, CheckOptions, CheckResult, CliError};
use std::io::{self, Read};
use tracing_subscriber::EnvFilter;

#[derive(ClapParser)]
#[command(name = "claimpath")]
#[command(about = "claimpath - match JSON documents against JSONPath filter queries")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a filter query and match it against JSON input
    Check {
        /// The filter query
        query: String,

        /// JSON input (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<String>,

        /// Only validate syntax, don't match
        #[arg(long)]
        syntax_only: bool,

        /// Ignore '!' and refuse =~, anyof and noneof at match time
        #[arg(long)]
        compat: bool,
    },

    /// List documentation categories
    Docs,

    /// Show documentation for a specific category
    Doc {
        /// Category name (use 'claimpath docs' to list categories)
        category: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "claimpath=warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Check {
            query,
            input,
            syntax_only,
            compat,
        } => run_check(query, input, syntax_only, compat),
        Commands::Docs => {
            print!("{}", cli::get_docs_overview());
            Ok(())
        }
        Commands::Doc { category } => cli::get_doc_category(&category).map(|content| {
            print!("{}", content);
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run_check(
    query: String,
    input: Option<String>,
    syntax_only: bool,
    compatible: bool,
) -> Result<(), CliError> {
    let input = match input {
        Some(s) => Some(s),
        None if !syntax_only && !atty::is(atty::Stream::Stdin) => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Some(buffer)
        }
        None => None,
    };

    let options = CheckOptions {
        query,
        input,
        syntax_only,
        compatible,
    };

    match cli::execute_check(&options)? {
        CheckResult::SyntaxValid(canonical) => {
            println!("Syntax is valid");
            println!("{}", canonical);
        }
        CheckResult::Matched(matched) => println!("{}", matched),
    }
    Ok(())
}
