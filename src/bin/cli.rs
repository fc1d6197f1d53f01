//! `shazam-cli add <file> <title> <artist>` / `shazam-cli query <file>`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shazam_core::config::Config;
use shazam_core::store::postgres::PostgresStore;
use shazam_core::{decode, pipeline, FingerprintStore};

#[derive(Parser)]
#[command(name = "shazam-cli", about = "Ingest and query acoustic fingerprints")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fingerprint a song and register it in the store.
    Add {
        file_path: PathBuf,
        title: String,
        artist: String,
    },
    /// Fingerprint a clip and find the best matching song.
    Query { file_path: PathBuf },
}

fn main() -> ExitCode {
    Config::init_logging();
    let cli = Cli::parse();
    let config = Config::from_env();

    let store = match PostgresStore::connect(&config.database_url) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!(%err, "failed to connect to the fingerprint store");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Add {
            file_path,
            title,
            artist,
        } => run_add(&store, &file_path, &title, &artist),
        Command::Query { file_path } => run_query(&store, &file_path),
    }
}

fn run_add(store: &dyn FingerprintStore, file_path: &std::path::Path, title: &str, artist: &str) -> ExitCode {
    let audio = match decode::decode_file(file_path) {
        Ok(audio) => audio,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::ingest(
        store,
        &audio.samples,
        audio.sample_rate,
        audio.duration_seconds,
        title,
        artist,
    ) {
        Ok(report) => {
            println!(
                "Added \"{title}\" by {artist} (song id {}, {} fingerprints)",
                report.song_id, report.fingerprint_count
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_query(store: &dyn FingerprintStore, file_path: &std::path::Path) -> ExitCode {
    let audio = match decode::decode_file(file_path) {
        Ok(audio) => audio,
        Err(err) => {
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match pipeline::query(store, &audio.samples, audio.sample_rate, audio.duration_seconds) {
        Ok(matches) => {
            match matches.first() {
                Some(best) => println!("Best Match: {} by {}", best.title, best.artist),
                None => println!("No match found."),
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
