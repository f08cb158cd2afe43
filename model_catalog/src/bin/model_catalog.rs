use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use model_catalog::Database;
use model_catalog::config::{self, CatalogConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Model catalog CLI")]
struct Cli {
    /// TOML config file; environment overrides still apply.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,
    /// SQLite database path; wins over config and environment.
    #[arg(long, global = true, value_name = "URL")]
    database: Option<String>,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations.
    Migrate,
    /// List tracked models with their market values.
    Models,
    /// List every table in the database.
    Tables,
    Model(ModelCmd),
    Market(MarketCmd),
    /// Resolve a scraped name onto a tracked model.
    Resolve { name: String },
}

#[derive(Args)]
struct ModelCmd {
    #[command(subcommand)]
    sub: ModelSub,
}

#[derive(Subcommand)]
enum ModelSub {
    Add {
        name: String,
        #[arg(long, default_value_t = 0)]
        price: i64,
    },
    Remove {
        name: String,
    },
    Show {
        #[arg(long, conflicts_with = "id")]
        name: Option<String>,
        #[arg(long)]
        id: Option<i32>,
    },
    Price {
        name: String,
        price: i64,
    },
}

#[derive(Args)]
struct MarketCmd {
    #[command(subcommand)]
    sub: MarketSub,
}

#[derive(Subcommand)]
enum MarketSub {
    Add {
        name: String,
    },
    Remove {
        name: String,
    },
    List,
    /// Record a model's last observed value on a market (omit VALUE to clear).
    Set {
        model: String,
        market: String,
        value: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<CatalogConfig> {
    let mut cfg = match &cli.config {
        Some(path) => config::load_config_path(path)?,
        None => CatalogConfig::from_env()?,
    };
    if let Some(url) = &cli.database {
        cfg.database_url = url.clone();
    }
    Ok(cfg)
}

fn print_model(model: &model_catalog::Model) {
    println!("#{} {} (price {})", model.id, model.name, model.price);
    for (market, value) in &model.markets {
        println!("    {market}: {}", value.as_deref().unwrap_or("-"));
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = load_config(&cli)?;
    let db = Database::from_config(&cfg)?;

    match cli.cmd {
        Cmd::Migrate => {
            let applied = db.migrate()?;
            println!("{applied} migration(s) applied");
        }
        Cmd::Models => {
            for model in db.get_models()? {
                print_model(&model);
            }
        }
        Cmd::Tables => {
            for table in db.list_tables()? {
                println!("{table}");
            }
        }
        Cmd::Model(ModelCmd { sub }) => match sub {
            ModelSub::Add { name, price } => print_model(&db.add_model(&name, price)?),
            ModelSub::Remove { name } => db.remove_model(&name)?,
            ModelSub::Show { name, id } => print_model(&db.get_model(name.as_deref(), id)?),
            ModelSub::Price { name, price } => db.set_price(&name, price)?,
        },
        Cmd::Market(MarketCmd { sub }) => match sub {
            MarketSub::Add { name } => db.add_market(&name)?,
            MarketSub::Remove { name } => db.remove_market(&name)?,
            MarketSub::List => {
                for market in db.markets()? {
                    println!("{market}");
                }
            }
            MarketSub::Set {
                model,
                market,
                value,
            } => db.set_market_value(&model, &market, value.as_deref())?,
        },
        Cmd::Resolve { name } => {
            let resolution = db.resolve_model_name(&name)?;
            let flag = if resolution.needs_review { "review" } else { "ok" };
            println!("{flag}\t{}", resolution.name);
        }
    }

    Ok(())
}
