//! Cricket Match Prediction CLI
//!
//! Trains a random forest over historical match results and predicts the
//! winner of a fixture, alongside head-to-head and venue statistics.

use clap::{Parser, Subcommand};
use cricket::{Config, Result};

#[derive(Parser)]
#[command(name = "cricket")]
#[command(about = "Cricket match winner prediction with head-to-head statistics", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the classifier and write the precomputed statistics tables
    Train {
        /// Override number of trees
        #[arg(long)]
        trees: Option<usize>,
        /// Override random seed
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Predict the winner of a match
    Predict {
        /// First team
        team1: String,
        /// Second team
        team2: String,
        /// Venue of the match
        #[arg(long)]
        venue: String,
        /// Team that won the toss
        #[arg(long)]
        toss_winner: String,
        /// Toss decision (bat or field)
        #[arg(long)]
        toss_decision: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Historical statistics
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
    /// List the values each prediction argument accepts
    Options,
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum StatsCommands {
    /// Head-to-head record between two teams
    HeadToHead {
        team_a: String,
        team_b: String,
        /// Restrict to one venue
        #[arg(long)]
        venue: Option<String>,
    },
    /// Win percentages of two teams against each other at a venue
    Venue {
        team_a: String,
        team_b: String,
        venue: String,
    },
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Train { trees, seed } => commands::train(&config, trees, seed),
        Commands::Predict {
            team1,
            team2,
            venue,
            toss_winner,
            toss_decision,
            format,
        } => {
            let query = cricket::predict::MatchQuery::new(
                &team1,
                &team2,
                &venue,
                &toss_winner,
                &toss_decision,
            );
            commands::predict(&config, &query, format)
        }
        Commands::Stats { action } => match action {
            StatsCommands::HeadToHead {
                team_a,
                team_b,
                venue,
            } => commands::stats_head_to_head(&config, &team_a, &team_b, venue.as_deref()),
            StatsCommands::Venue {
                team_a,
                team_b,
                venue,
            } => commands::stats_venue(&config, &team_a, &team_b, &venue),
        },
        Commands::Options => commands::options(&config),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use cricket::data::MatchStore;
    use cricket::predict::inference::{
        format_head_to_head, format_report, format_venue_win_rate,
    };
    use cricket::predict::{MatchQuery, Predictor, ServingBundle};
    use cricket::stats::{tables, Aggregator};
    use cricket::training::Trainer;
    use cricket::Field;

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Copy the match history CSV to {}", config.data.dataset_path);
        println!("  2. Run 'cricket train' to train the model");
        println!(
            "  3. Run 'cricket predict \"India\" \"Australia\" --venue \"Melbourne Cricket Ground\" --toss-winner India --toss-decision bat'"
        );

        Ok(())
    }

    fn load_store(config: &Config) -> Result<MatchStore> {
        let store = MatchStore::from_csv(&config.data.dataset_path, &config.teams.valid)?;
        if store.is_empty() {
            return Err(cricket::CricketError::Config(format!(
                "No usable matches in {}",
                config.data.dataset_path
            )));
        }
        Ok(store)
    }

    pub fn train(config: &Config, trees: Option<usize>, seed: Option<u64>) -> Result<()> {
        let mut training = config.training.clone();
        if let Some(n) = trees {
            training.n_estimators = n;
        }
        if let Some(s) = seed {
            training.seed = s;
        }

        println!("Loading matches from {}...", config.data.dataset_path);
        let store = load_store(config)?;
        let load = store.load_stats();
        println!(
            "  {} rows read, {} kept ({} undecided), {} dropped",
            load.total_rows,
            load.kept,
            load.undecided,
            load.dropped()
        );

        println!("Training {} trees...", training.n_estimators);
        let (bundle, report) = Trainer::new(training).train(&store)?;
        println!("\n{}", report);

        bundle.save(&config.data.artifact_path)?;
        println!("Model saved to {}", config.data.artifact_path);

        let written = tables::write_tables(&store, &config.data.stats_dir)?;
        println!("Statistics tables written:");
        println!("  {}", written.head_to_head.display());
        println!("  {}", written.head_to_head_venue.display());
        println!("  {}", written.venues.display());

        Ok(())
    }

    pub fn predict(config: &Config, query: &MatchQuery, format: OutputFormat) -> Result<()> {
        let predictor = Predictor::load(config)?;
        let report = predictor.predict_match(query)?;

        match format {
            OutputFormat::Table => print!("{}", format_report(&report)),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        }

        Ok(())
    }

    pub fn stats_head_to_head(
        config: &Config,
        team_a: &str,
        team_b: &str,
        venue: Option<&str>,
    ) -> Result<()> {
        let store = load_store(config)?;
        let stats = Aggregator::new(&store);

        match venue {
            Some(venue) => {
                let record = stats.head_to_head_at_venue(team_a, team_b, venue);
                println!("Head-to-Head at {}", venue);
                println!("───────────────────────────────");
                if record.is_empty() {
                    println!("  No head-to-head data available for this venue.");
                } else {
                    print!("{}", format_head_to_head(team_a, team_b, &record));
                }
            }
            None => {
                let record = stats.head_to_head(team_a, team_b);
                println!("Head-to-Head");
                println!("───────────────────────────────");
                print!("{}", format_head_to_head(team_a, team_b, &record));
            }
        }

        Ok(())
    }

    pub fn stats_venue(config: &Config, team_a: &str, team_b: &str, venue: &str) -> Result<()> {
        let store = load_store(config)?;
        let rate = Aggregator::new(&store).venue_win_rate(team_a, team_b, venue);

        println!("Venue Win Rate at {}", venue);
        println!("───────────────────────────────");
        print!("{}", format_venue_win_rate(team_a, team_b, venue, &rate));

        Ok(())
    }

    pub fn options(config: &Config) -> Result<()> {
        let predictor = Predictor::load(config)?;

        for (i, field) in Field::INPUTS.into_iter().enumerate() {
            if i > 0 {
                println!();
            }
            println!("{}", field);
            for value in predictor.options(field) {
                println!("  {}", value);
            }
        }

        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let bundle = ServingBundle::load(&config.data.artifact_path)?;
        let model = bundle.model();
        let meta = bundle.metadata();
        let pct = |acc: Option<f64>| match acc {
            Some(a) => format!("{:.2}%", 100.0 * a),
            None => "n/a".to_string(),
        };

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}", config.data.artifact_path);
        println!("  Trained at:     {}", meta.trained_at.format("%Y-%m-%d %H:%M:%S UTC"));
        println!("  Trees:          {}", model.n_trees());
        println!("  Winner classes: {}", model.n_classes());
        println!("  Domains:        {:?}", model.domains());
        println!(
            "  Max depth:      {}",
            model
                .config()
                .max_depth
                .map_or("unlimited".to_string(), |d| d.to_string())
        );
        println!("  Bootstrap:      {}", model.config().bootstrap);
        println!("  Seed:           {}", meta.seed);
        println!("  Train samples:  {} ({})", meta.train_samples, pct(meta.train_accuracy));
        println!("  Test samples:   {} ({})", meta.test_samples, pct(meta.test_accuracy));

        Ok(())
    }
}
