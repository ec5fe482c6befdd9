use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::Path;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use sheetgraph::cache::{fingerprint_tables, CacheStore, ContentCache, Fingerprint};
use sheetgraph::common;
use sheetgraph::config::AppConfig;
use sheetgraph::data_loader;
use sheetgraph::export::{to_json, to_yaml, ExportBundle};
use sheetgraph::graph::Graph;
use sheetgraph::table::Table;
use sheetgraph::transformations::{
    filter_table, pivot_table, sort_table, Aggregation, FilterOperator, SortDirection,
};

const DEFAULT_CONFIG: &str = "sheetgraph.yaml";

#[derive(Parser)]
#[clap(author, version, about)]
struct Cli {
    #[clap(short, long, global = true)]
    log_level: Option<String>,
    /// Config file; `sheetgraph.yaml` is used when present
    #[clap(long, global = true)]
    config: Option<String>,
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ExportFormat {
    Json,
    Yaml,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the content fingerprint of one or more tables
    Fingerprint {
        #[clap(required = true)]
        files: Vec<String>,
    },
    Sort {
        file: String,
        /// Column index or header name
        #[clap(short, long)]
        column: String,
        #[clap(short, long, default_value = "asc")]
        direction: SortDirection,
    },
    Filter {
        file: String,
        #[clap(short, long)]
        column: String,
        #[clap(short, long)]
        operator: FilterOperator,
        #[clap(short, long)]
        value: String,
    },
    Pivot {
        file: String,
        #[clap(short, long)]
        group: String,
        #[clap(short, long)]
        value: String,
        #[clap(short, long, default_value = "sum")]
        aggregation: Aggregation,
    },
    /// Check a graph JSON file for dangling links and duplicate ids
    Validate { graph: String },
    Export {
        graph: String,
        tables: Vec<String>,
        #[clap(short, long, value_enum, default_value = "json")]
        format: ExportFormat,
        #[clap(short, long)]
        output: Option<String>,
    },
    /// Inspect or empty the result cache selected by the config
    Cache {
        #[clap(subcommand)]
        command: CacheCommands,
    },
    /// Write a default config file
    InitConfig {
        #[clap(default_value = DEFAULT_CONFIG)]
        path: String,
    },
}

#[derive(Subcommand)]
enum CacheCommands {
    List,
    /// Drop a single entry
    Remove { fingerprint: String },
    Clear,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    setup_logging(&args.log_level);

    match args.command {
        Commands::Fingerprint { files } => {
            let tables = load_tables(&files)?;
            let fingerprint = fingerprint_tables(&tables)?;
            println!("{}", fingerprint);
        }
        Commands::Sort {
            file,
            column,
            direction,
        } => {
            let table = load_table(&file)?;
            let column = resolve_column(&table, &column)?;
            print_table(&sort_table(&table, column, direction), &file)?;
        }
        Commands::Filter {
            file,
            column,
            operator,
            value,
        } => {
            if let FilterOperator::Unknown(op) = &operator {
                warn!("Unknown filter operator '{}', no rows will match", op);
            }
            let table = load_table(&file)?;
            let column = resolve_column(&table, &column)?;
            print_table(&filter_table(&table, column, &operator, &value), &file)?;
        }
        Commands::Pivot {
            file,
            group,
            value,
            aggregation,
        } => {
            let table = load_table(&file)?;
            let group = resolve_column(&table, &group)?;
            let value = resolve_column(&table, &value)?;
            print_table(&pivot_table(&table, group, value, aggregation), &file)?;
        }
        Commands::Validate { graph } => {
            let graph = load_graph(&graph)?;
            match graph.verify_integrity() {
                Ok(()) => println!("OK ({})", graph.stats()),
                Err(errors) => {
                    for error in &errors {
                        println!("{}", error);
                    }
                    bail!("graph has {} integrity violations", errors.len());
                }
            }
        }
        Commands::Export {
            graph,
            tables,
            format,
            output,
        } => {
            let bundle = ExportBundle::new(load_graph(&graph)?, load_tables(&tables)?);
            let rendered = match format {
                ExportFormat::Json => to_json::render(&bundle)?,
                ExportFormat::Yaml => to_yaml::render(&bundle)?,
            };
            match output {
                Some(path) => {
                    info!("Writing {:?} export to {}", format, path);
                    common::write_string_to_file(&path, &rendered)?;
                }
                None => println!("{}", rendered),
            }
        }
        Commands::Cache { command } => {
            let config = load_config(args.config.as_deref())?;
            let mut cache = ContentCache::new(config.cache_store());
            if !cache.store().is_persistent() {
                warn!("No cache_dir configured, using an empty in-memory cache");
            }
            match command {
                CacheCommands::List => {
                    for key in cache.store().keys()? {
                        println!("{}", key);
                    }
                }
                CacheCommands::Remove { fingerprint } => {
                    let fingerprint: Fingerprint = fingerprint.parse()?;
                    cache.remove(&fingerprint)?;
                }
                CacheCommands::Clear => {
                    println!("Removed {} entries", cache.clear()?);
                }
            }
        }
        Commands::InitConfig { path } => {
            info!("Initializing config: {}", path);
            let config = AppConfig::default();
            common::write_string_to_file(&path, &config.to_yaml()?)?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(Path::new(path)),
        None if Path::new(DEFAULT_CONFIG).exists() => AppConfig::load(Path::new(DEFAULT_CONFIG)),
        None => Ok(AppConfig::default().with_env_overrides()),
    }
}

fn load_table(file: &str) -> Result<Table> {
    let path = Path::new(file);
    data_loader::load_csv_table(path, data_loader::delimiter_for(path))
}

fn load_tables(files: &[String]) -> Result<Vec<Table>> {
    files.iter().map(|f| load_table(f)).collect()
}

fn load_graph(file: &str) -> Result<Graph> {
    let content =
        fs::read_to_string(file).with_context(|| format!("Failed to read graph {}", file))?;
    let payload: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse graph {}", file))?;
    Ok(Graph::from_payload(payload)?)
}

/// Column given either as a zero-based index or as header text.
fn resolve_column(table: &Table, column: &str) -> Result<usize> {
    if let Ok(index) = column.parse::<usize>() {
        return Ok(index);
    }
    table
        .header()
        .and_then(|header| header.iter().position(|cell| cell.text() == column))
        .ok_or_else(|| anyhow!("No column named '{}' in {}", column, table.name))
}

fn print_table(table: &Table, file: &str) -> Result<()> {
    let delimiter = data_loader::delimiter_for(Path::new(file));
    print!("{}", data_loader::write_table(table, delimiter)?);
    Ok(())
}

fn setup_logging(log_level: &Option<String>) {
    let log_level = match log_level
        .as_ref()
        .map(|l| l.to_lowercase())
        .as_deref()
        .unwrap_or("info")
    {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_level.as_str().to_lowercase()))
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}
