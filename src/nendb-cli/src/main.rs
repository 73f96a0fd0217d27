//! NenDB CLI: command-line interface for a NenDB server
//!
//! Uses the nendb-rs client. Results are printed as pretty JSON on stdout,
//! progress and errors go to the log on stderr.

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use nendb_core::config::{ENV_MAX_RETRIES, ENV_TIMEOUT, ENV_URL};
use nendb_core::ConnectionSettings;
use nendb_rs::{ClientConfig, Context, NenClient};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "nendb", version, about = "NenDB graph database CLI")]
struct Cli {
    /// JSON connection settings file; flags and environment take precedence
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<String>,

    /// NenDB server base URL [default: http://localhost:8080]
    #[arg(long, global = true, env = ENV_URL)]
    url: Option<String>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, global = true, env = ENV_TIMEOUT, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Maximum number of retries [default: 3]
    #[arg(long, global = true, env = ENV_MAX_RETRIES)]
    retries: Option<u32>,

    /// Skip health check on startup
    #[arg(long, global = true)]
    skip_health: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check server health
    Health,
    /// Get node by ID
    Node { id: i64 },
    /// Get edge by ID
    Edge { id: i64 },
    /// Run a graph algorithm
    Algorithm {
        #[command(subcommand)]
        algorithm: AlgorithmCommand,
    },
    /// Execute a custom query
    Query { query: String },
    /// Get database statistics
    Stats,
}

#[derive(Subcommand, Debug, PartialEq)]
enum AlgorithmCommand {
    /// Breadth-first search between two nodes
    Bfs {
        start: i64,
        target: i64,
        #[arg(default_value_t = 10)]
        max_depth: i64,
    },
    /// Weighted shortest path between two nodes
    Dijkstra { start: i64, target: i64 },
    /// PageRank over the whole graph
    Pagerank {
        #[arg(default_value_t = 100)]
        max_iterations: i64,
        #[arg(default_value_t = 0.001)]
        tolerance: f64,
    },
}

impl Cli {
    fn settings(&self) -> Result<ConnectionSettings> {
        let mut settings = match &self.config {
            Some(path) => ConnectionSettings::load(path)
                .with_context(|| format!("failed to load settings from {}", path))?,
            None => ConnectionSettings::default(),
        };

        if let Some(url) = &self.url {
            settings.base_url = url.clone();
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }
        if let Some(retries) = self.retries {
            settings.max_retries = retries;
        }
        settings.skip_validation |= self.skip_health;
        Ok(settings)
    }
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nendb_cli=info,nendb_rs=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = cli.settings()?;
    let timeout = settings.timeout();
    let client = NenClient::new(Some(ClientConfig::from(settings)))
        .await
        .context("failed to create client")?;
    let ctx = Context::with_timeout(timeout);

    match cli.command {
        Commands::Health => {
            tracing::info!("Checking NenDB server health...");
            client.health(&ctx).await.context("health check failed")?;
            print_json(&serde_json::json!({ "status": "healthy", "url": client.base_url() }))
        }
        Commands::Node { id } => {
            tracing::info!("Getting node {}...", id);
            let node = client.get_node(&ctx, id).await.context("failed to get node")?;
            print_json(&node)
        }
        Commands::Edge { id } => {
            tracing::info!("Getting edge {}...", id);
            let edge = client.get_edge(&ctx, id).await.context("failed to get edge")?;
            print_json(&edge)
        }
        Commands::Algorithm { algorithm } => run_algorithm(&client, &ctx, algorithm).await,
        Commands::Query { query } => {
            tracing::info!("Executing query: {}", query);
            let result = client
                .query(&ctx, &query, None)
                .await
                .context("query failed")?;
            print_json(&result)
        }
        Commands::Stats => {
            tracing::info!("Getting database statistics...");
            let stats = client
                .statistics(&ctx)
                .await
                .context("failed to get statistics")?;
            print_json(&stats)
        }
    }
}

async fn run_algorithm(client: &NenClient, ctx: &Context, algorithm: AlgorithmCommand) -> Result<()> {
    match algorithm {
        AlgorithmCommand::Bfs {
            start,
            target,
            max_depth,
        } => {
            tracing::info!("Running bfs algorithm...");
            let result = client
                .run_bfs(ctx, start, target, max_depth)
                .await
                .context("bfs algorithm failed")?;
            print_json(&result)
        }
        AlgorithmCommand::Dijkstra { start, target } => {
            tracing::info!("Running dijkstra algorithm...");
            let result = client
                .run_dijkstra(ctx, start, target)
                .await
                .context("dijkstra algorithm failed")?;
            print_json(&result)
        }
        AlgorithmCommand::Pagerank {
            max_iterations,
            tolerance,
        } => {
            tracing::info!("Running pagerank algorithm...");
            let result = client
                .run_pagerank(ctx, max_iterations, tolerance)
                .await
                .context("pagerank algorithm failed")?;
            print_json(&result)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from([
            "nendb",
            "--url",
            "http://db:9090/",
            "--timeout",
            "5",
            "--retries",
            "1",
            "--skip-health",
            "stats",
        ])
        .unwrap();

        let settings = cli.settings().unwrap();
        assert_eq!(settings.base_url, "http://db:9090/");
        assert_eq!(settings.timeout_secs, 5);
        assert_eq!(settings.max_retries, 1);
        assert!(settings.skip_validation);
        assert!(matches!(cli.command, Commands::Stats));
    }

    #[test]
    fn test_node_and_edge_ids() {
        let cli = Cli::try_parse_from(["nendb", "node", "7"]).unwrap();
        assert!(matches!(cli.command, Commands::Node { id: 7 }));

        let cli = Cli::try_parse_from(["nendb", "edge", "3"]).unwrap();
        assert!(matches!(cli.command, Commands::Edge { id: 3 }));

        assert!(Cli::try_parse_from(["nendb", "node", "abc"]).is_err());
        assert!(Cli::try_parse_from(["nendb", "node"]).is_err());
    }

    #[test]
    fn test_algorithm_defaults() {
        let cli = Cli::try_parse_from(["nendb", "algorithm", "bfs", "1", "2"]).unwrap();
        match cli.command {
            Commands::Algorithm { algorithm } => assert_eq!(
                algorithm,
                AlgorithmCommand::Bfs {
                    start: 1,
                    target: 2,
                    max_depth: 10
                }
            ),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::try_parse_from(["nendb", "algorithm", "pagerank"]).unwrap();
        match cli.command {
            Commands::Algorithm { algorithm } => assert_eq!(
                algorithm,
                AlgorithmCommand::Pagerank {
                    max_iterations: 100,
                    tolerance: 0.001
                }
            ),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_algorithm_overrides() {
        let cli =
            Cli::try_parse_from(["nendb", "algorithm", "pagerank", "50", "0.0001"]).unwrap();
        match cli.command {
            Commands::Algorithm { algorithm } => assert_eq!(
                algorithm,
                AlgorithmCommand::Pagerank {
                    max_iterations: 50,
                    tolerance: 0.0001
                }
            ),
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from(["nendb", "algorithm", "dijkstra", "1"]).is_err());
        assert!(Cli::try_parse_from(["nendb", "algorithm", "astar", "1", "2"]).is_err());
    }

    #[test]
    fn test_query_takes_whole_string() {
        let cli =
            Cli::try_parse_from(["nendb", "query", "MATCH (n) RETURN n LIMIT 5"]).unwrap();
        match cli.command {
            Commands::Query { query } => assert_eq!(query, "MATCH (n) RETURN n LIMIT 5"),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_config_file_with_flag_override() {
        let path = std::env::temp_dir().join(format!("nendb-cli-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"base_url":"http://graph:7000","max_retries":5,"retry_delay_ms":250}"#,
        )
        .unwrap();
        let path_arg = path.to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["nendb", "--config", &path_arg, "--retries", "1", "stats"])
            .unwrap();
        let settings = cli.settings().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.base_url, "http://graph:7000");
        assert_eq!(settings.retry_delay_ms, 250);
        assert_eq!(settings.max_retries, 1);
        assert_eq!(settings.timeout_secs, 30);
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::try_parse_from(["nendb", "--config", "/nonexistent/nendb.json", "health"])
            .unwrap();
        let err = cli.settings().unwrap_err();
        assert!(format!("{:#}", err).contains("failed to load settings from /nonexistent/nendb.json"));
    }

    #[test]
    fn test_defaults_match_client_defaults() {
        let cli = Cli::try_parse_from(["nendb", "health"]).unwrap();
        let config = ClientConfig::from(cli.settings().unwrap());
        let defaults = ClientConfig::default();
        assert_eq!(config.timeout, defaults.timeout);
        assert_eq!(config.max_retries, defaults.max_retries);
        assert_eq!(config.retry_delay, defaults.retry_delay);
    }
}
