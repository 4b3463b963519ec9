use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use glycowise::assessment::Metric;
use glycowise::catalog::{Catalog, CatalogQuery};
use glycowise::cli;
use glycowise::config;
use glycowise::gateway::{Gateway, Topic};
use glycowise::web::{self, AppState};

#[derive(Debug, Parser)]
#[command(name = "glycowise")]
#[command(about = "Diabetes risk screening, diet and exercise plans, and advisory chats")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Start the web interface
    Serve {
        /// Address to bind, e.g. 127.0.0.1:3000 (overrides config)
        #[arg(long)]
        addr: Option<String>,
        /// Open the default browser once the server is up
        #[arg(long)]
        open: bool,
    },
    /// Run one diabetes risk assessment
    Assess {
        /// Metric values as name=value, e.g. glucose=150 bmi=27.4
        #[arg(value_name = "METRIC=VALUE")]
        values: Vec<String>,
        /// Gender: male, female (default) or other
        #[arg(long)]
        gender: Option<String>,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Chat with the diet or exercise advisor
    Chat {
        /// Advisor topic: diet or exercise
        topic: String,
        /// Send one message and print the reply instead of starting a session
        #[arg(long, short)]
        message: Option<String>,
    },
    /// Browse the built-in diet and exercise plans
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show gateway request statistics
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Check credential, config, catalog and request log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum CatalogAction {
    /// List diet plans
    Diets {
        /// Case-insensitive text search on title and description
        #[arg(long, short)]
        query: Option<String>,
        /// Only plans carrying any of these tags (repeatable)
        #[arg(long)]
        tag: Vec<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List exercise plans
    Exercises {
        /// Case-insensitive text search on title and description
        #[arg(long, short)]
        query: Option<String>,
        /// Beginner, Intermediate, Advanced or all
        #[arg(long)]
        level: Option<String>,
        /// Cardio, Strength, Flexibility or all
        #[arg(long)]
        category: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show one plan by id
    Show {
        id: String,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default config to ~/.glycowise/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a value, e.g. `gateway.model gpt-4o`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Serve { addr, open } => {
            let cfg = config::load();
            let catalog = Catalog::builtin()?;
            let gateway = Gateway::from_config(&cfg)?;
            let addr = addr.unwrap_or_else(|| cfg.server.addr.clone());
            let open = open || cfg.server.open_browser;
            web::serve(&addr, AppState::new(gateway, catalog, cfg), open)
        }
        Commands::Assess {
            values,
            gender,
            format,
        } => {
            let values = parse_metric_values(&values)?;
            let gateway = Gateway::from_config(&config::load())?;
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_assess(&gateway, &values, gender.as_deref(), fmt)
        }
        Commands::Chat { topic, message } => {
            let Some(topic) = Topic::parse(&topic) else {
                bail!("unknown chat topic '{topic}' (expected diet or exercise)");
            };
            let gateway = Gateway::from_config(&config::load())?;
            cli::run_chat(&gateway, topic, message.as_deref())
        }
        Commands::Catalog { action } => {
            let catalog = Catalog::builtin()?;
            match action {
                CatalogAction::Diets { query, tag, format } => {
                    let query = CatalogQuery {
                        text: query.unwrap_or_default(),
                        tags: tag,
                        ..CatalogQuery::default()
                    };
                    let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                    cli::run_catalog_diets(&catalog, &query, fmt)
                }
                CatalogAction::Exercises {
                    query,
                    level,
                    category,
                    format,
                } => {
                    let query = CatalogQuery {
                        text: query.unwrap_or_default(),
                        level,
                        category,
                        ..CatalogQuery::default()
                    };
                    let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                    cli::run_catalog_exercises(&catalog, &query, fmt)
                }
                CatalogAction::Show { id, format } => {
                    let fmt = cli::OutputFormat::from_str_opt(Some(&format));
                    cli::run_catalog_show(&catalog, &id, fmt)
                }
            }
        }
        Commands::Stats { format, days } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_stats(fmt, days)
        }
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}

/// Parse `name=value` pairs into metric overrides.
fn parse_metric_values(values: &[String]) -> Result<Vec<(Metric, f64)>> {
    values
        .iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .with_context(|| format!("expected METRIC=VALUE, got '{pair}'"))?;
            let metric = Metric::parse(name.trim())
                .with_context(|| format!("unknown metric '{}'", name.trim()))?;
            let value: f64 = value
                .trim()
                .parse()
                .with_context(|| format!("'{}' is not a number", value.trim()))?;
            Ok((metric, value))
        })
        .collect()
}
