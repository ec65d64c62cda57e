use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use dockwatch_core::{Config, LogEventKind};
use dockwatch_docker::{DockerEngine, LogStream};
use dockwatch_logs::LogBuffer;

#[derive(Parser, Debug)]
#[command(name = "dockwatch")]
#[command(author, version, about = "Authenticated real-time container log monitor")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the HTTP/WebSocket server
    Serve {
        /// Listen port (overrides $PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List monitorable containers
    List {
        /// Include stopped containers
        #[arg(short, long)]
        all: bool,
    },
    /// Follow one container's logs in the terminal
    Tail {
        /// Exact container name
        name: String,
        /// Only print lines containing this term
        #[arg(short, long)]
        search: Option<String>,
    },
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::new(filter))
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = Config::from_env()?;

    // No subcommand means serve, like the original monitor.
    match cli.command.unwrap_or(Commands::Serve { port: None }) {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            dockwatch_server::run(config).await?;
        }
        Commands::List { all } => {
            let engine = DockerEngine::connect(config.docker_socket.as_deref())?;
            engine.ping().await?;

            let containers = engine.list(all, &config.filter).await?;
            if containers.is_empty() {
                println!("No containers matched (filter: {})", config.filter.describe());
            } else {
                for container in &containers {
                    println!(
                        "{:<14.12} {:<28} {:<36} {}",
                        container.id, container.name, container.image, container.status
                    );
                }
            }
        }
        Commands::Tail { name, search } => {
            let engine = DockerEngine::connect(config.docker_socket.as_deref())?;
            engine.ping().await?;

            let container = engine.resolve(&name).await?;
            let mut stream = LogStream::start(engine.docker().clone(), &container);
            // Bound memory for long follows; the buffer also classifies levels.
            let mut buffer = LogBuffer::with_capacity(10_000);

            while let Some(event) = stream.rx.recv().await {
                match event.kind {
                    LogEventKind::Error => {
                        eprintln!("{}", event.data);
                        break;
                    }
                    LogEventKind::Log => {
                        let matches = search
                            .as_deref()
                            .is_none_or(|term| {
                                event.data.to_lowercase().contains(&term.to_lowercase())
                            });
                        if matches {
                            println!("{}", event.data);
                        }
                        buffer.push(event);
                    }
                }
            }

            tracing::debug!("{} lines buffered from {name}", buffer.len());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_parses_and_means_serve() {
        let cli = Cli::try_parse_from(["dockwatch"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or(Commands::Serve { port: None }),
            Commands::Serve { port: None }
        ));
    }

    #[test]
    fn serve_accepts_a_port_override() {
        let cli = Cli::try_parse_from(["dockwatch", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Some(Commands::Serve { port }) => assert_eq!(port, Some(8080)),
            other => panic!("expected serve, got {other:?}"),
        }
    }
}
