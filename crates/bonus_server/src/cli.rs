//! Command-line interface for bonus_games.

use bonus_tictactoe::PolicyKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Bonus Games - tic-tac-toe for promo codes
#[derive(Parser, Debug)]
#[command(name = "bonus_games")]
#[command(about = "Tic-tac-toe mini-game backend with chat rewards", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the relay server, hosted games and /start listener
    Serve {
        /// Path to a TOML config file
        #[arg(short, long, default_value = "bonus_games.toml")]
        config: PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Play against the computer in the terminal
    Play {
        /// Relay server to report the outcome to
        #[arg(long, requires = "chat_id")]
        relay_url: Option<String>,

        /// Chat that receives the outcome message
        #[arg(long)]
        chat_id: Option<i64>,

        /// Seed for the computer and reward codes
        #[arg(long)]
        seed: Option<u64>,

        /// Computer opponent
        #[arg(long, default_value_t = PolicyKind::Heuristic)]
        policy: PolicyKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::try_parse_from(["bonus_games", "serve", "--port", "8080"]).unwrap();
        match cli.command {
            Command::Serve { config, host, port } => {
                assert_eq!(config, PathBuf::from("bonus_games.toml"));
                assert_eq!(host, None);
                assert_eq!(port, Some(8080));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_play() {
        let cli = Cli::try_parse_from([
            "bonus_games",
            "play",
            "--relay-url",
            "http://localhost:3001",
            "--chat-id",
            "42",
            "--policy",
            "random",
        ])
        .unwrap();
        match cli.command {
            Command::Play {
                relay_url,
                chat_id,
                seed,
                policy,
            } => {
                assert_eq!(relay_url.as_deref(), Some("http://localhost:3001"));
                assert_eq!(chat_id, Some(42));
                assert_eq!(seed, None);
                assert_eq!(policy, PolicyKind::Random);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_relay_requires_chat_id() {
        assert!(Cli::try_parse_from(["bonus_games", "play", "--relay-url", "http://x"]).is_err());
    }
}
