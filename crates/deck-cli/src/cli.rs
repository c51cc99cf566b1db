use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "deck", version)]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Optional player config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Directory holding the persisted player snapshot (overrides config)
    #[arg(long)]
    pub store_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the restored player state as JSON
    Status,

    /// Play a JSON playlist against the simulated clock until the queue ends
    Play {
        /// Path to a JSON array of media items
        playlist: PathBuf,

        /// Queue index to start from
        #[arg(long, default_value_t = 0)]
        start: usize,

        /// Wall-clock delay between ticks, in milliseconds
        #[arg(long, default_value_t = 0)]
        tick_ms: u64,

        /// Simulated seconds advanced per tick
        #[arg(long, default_value_t = 5.0)]
        step_secs: f64,

        /// Duration used for items without `duration_secs`
        #[arg(long, default_value_t = 30.0)]
        default_duration: f64,
    },

    /// Append one media item (JSON file) to the persisted queue
    Enqueue {
        item: PathBuf,
    },

    /// Remove the queue entry at an index
    Dequeue {
        index: usize,
    },

    /// Empty the persisted queue
    Clear,

    /// Set and persist the output volume (0.0..=1.0)
    Volume {
        value: f32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_play_with_defaults() {
        let args = Args::try_parse_from(["deck", "play", "list.json"]).unwrap();
        match args.cmd {
            Command::Play {
                playlist,
                start,
                tick_ms,
                step_secs,
                default_duration,
            } => {
                assert_eq!(playlist, PathBuf::from("list.json"));
                assert_eq!(start, 0);
                assert_eq!(tick_ms, 0);
                assert_eq!(step_secs, 5.0);
                assert_eq!(default_duration, 30.0);
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(args.store_dir.is_none());
    }

    #[test]
    fn global_flags_precede_subcommand() {
        let args = Args::try_parse_from([
            "deck",
            "--store-dir",
            "/tmp/deck",
            "--config",
            "deck.toml",
            "dequeue",
            "2",
        ])
        .unwrap();
        assert_eq!(args.store_dir, Some(PathBuf::from("/tmp/deck")));
        assert_eq!(args.config, Some(PathBuf::from("deck.toml")));
        assert!(matches!(args.cmd, Command::Dequeue { index: 2 }));
    }

    #[test]
    fn rejects_non_numeric_volume() {
        assert!(Args::try_parse_from(["deck", "volume", "loud"]).is_err());
    }
}
