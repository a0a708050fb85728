use std::path::Path;

use clap::{Parser, Subcommand};

use kana_cli::commands::{config_ops, convert_ops, data_set_ops};

#[derive(Parser)]
#[command(name = "dictool", about = "Kana dictionary data set tool")]
struct Cli {
    /// Custom settings TOML applied before running the command
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Directory for JSON trace logs (needs the `trace` feature)
    #[arg(long, global = true)]
    trace_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a data set from a TSV word list
    Build {
        /// Word list (reading, left id, right id, cost, surface)
        input: String,
        /// Output data set file
        output: String,
        /// Region alignment in bits (default from settings)
        #[arg(long)]
        alignment: Option<u32>,
    },
    /// Show the regions and dictionary size of a data set
    Info {
        /// Data set file
        file: String,
    },
    /// Check the checksum and directory of a data set
    Verify {
        /// Data set file
        file: String,
    },
    /// Look up a reading (exact match)
    Lookup {
        /// Data set file
        file: String,
        /// Reading (hiragana)
        reading: String,
    },
    /// Common-prefix search (all readings that are prefixes of the query)
    Prefix {
        /// Data set file
        file: String,
        /// Query (hiragana)
        query: String,
        /// Also match voiced, semi-voiced and small kana variants
        #[arg(long)]
        kana_insensitive: bool,
    },
    /// Ranked completions of a prefix
    Predict {
        /// Data set file
        file: String,
        /// Prefix (hiragana)
        prefix: String,
        /// Number of results
        #[arg(short, long, default_value = "10")]
        n: usize,
    },
    /// Convert kana and show the segmentation
    Convert {
        /// Data set file
        file: String,
        /// Kana input
        kana: String,
        /// Candidates shown per segment
        #[arg(short, long, default_value = "5")]
        n: usize,
        /// Enable kana-modifier-insensitive conversion for this request
        #[arg(long)]
        kana_insensitive: bool,
        /// Run prediction instead of conversion
        #[arg(long)]
        predict: bool,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(dir) = &cli.trace_dir {
        config_ops::trace_init(dir);
    }

    if let Some(path) = &cli.settings {
        if let Err(e) = kana_engine::init_settings(Path::new(path)) {
            eprintln!("Error loading settings {path}: {e}");
            std::process::exit(1);
        }
    }

    match cli.command {
        Command::Build {
            input,
            output,
            alignment,
        } => data_set_ops::build(&input, &output, alignment),
        Command::Info { file } => data_set_ops::info(&file),
        Command::Verify { file } => data_set_ops::verify(&file),
        Command::Lookup { file, reading } => data_set_ops::lookup(&file, &reading),
        Command::Prefix {
            file,
            query,
            kana_insensitive,
        } => data_set_ops::prefix(&file, &query, kana_insensitive),
        Command::Predict { file, prefix, n } => data_set_ops::predict(&file, &prefix, n),
        Command::Convert {
            file,
            kana,
            n,
            kana_insensitive,
            predict,
        } => convert_ops::convert_cmd(&file, &kana, n, kana_insensitive, predict),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
