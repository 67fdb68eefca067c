//! Passport Disclose CLI
//!
//! This tool allows you to:
//! - Build the disclose circuit's witness from passport data and a commitment tree
//! - Verify a disclose proof against a configured policy
//! - Export a proof as Solidity verifier calldata
//!
//! Usage:
//! ```shell
//! # Build the witness (and a mock proof for local testing)
//! cargo run --bin passport-disclose -- inputs --passport passport.json --tree tree.json --register --mock-proof out/
//!
//! # Verify
//! cargo run --bin passport-disclose -- verify --init
//! cargo run --bin passport-disclose -- verify --proof out/proof.json --public out/public.json --mock
//! ```

use clap::{Parser, Subcommand};
use colored::*;
use std::process;
use tracing_subscriber::EnvFilter;

use passport_disclose_script::commands::{CalldataCommand, InputsCommand, VerifyCommand};

#[derive(Parser)]
#[command(
    name = "passport-disclose",
    about = "🛂 Selective disclosure proofs over passport data",
    long_about = "Builds witnesses for the passport disclose circuit and verifies its proofs.\n\nA proof is accepted only when its scope, registry root, attestation id, date and revealed attributes match the verifier's policy and the Groth16 proof itself checks out.",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Log level when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info")]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// 🧾 Build the disclose circuit's witness input
    Inputs(InputsCommand),
    /// 🔍 Verify a disclose proof against the configured policy
    Verify(VerifyCommand),
    /// 📦 Encode a proof as Solidity verifier calldata
    Calldata(CalldataCommand),
}

fn setup_logging(verbose: bool, level: &str) {
    let level = if verbose { "debug" } else { level };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Initialize rustls crypto provider
    use rustls::crypto::ring::default_provider;
    use rustls::crypto::CryptoProvider;
    let _ = CryptoProvider::install_default(default_provider());

    dotenv::dotenv().ok();

    let cli = Cli::parse();
    setup_logging(cli.verbose, &cli.log_level);

    let result = match cli.command {
        Commands::Inputs(cmd) => cmd.execute().await,
        Commands::Verify(cmd) => cmd.execute().await,
        Commands::Calldata(cmd) => cmd.execute().await,
    };

    if let Err(e) = result {
        eprintln!();
        eprintln!(
            "{} {}",
            "💥".bright_red(),
            "Operation failed!".bright_red().bold()
        );
        for cause in e.chain() {
            eprintln!("   {}", cause.to_string().bright_red());
        }
        eprintln!();
        eprintln!("{} {}", "💡".bright_blue(), "Tips:".bright_blue().bold());
        eprintln!("   • Run `verify --init` to write a default configuration");
        eprintln!("   • Ensure your RPC provider is accessible");
        eprintln!("   • Use --verbose to see each verification stage");
        process::exit(1);
    }
}
