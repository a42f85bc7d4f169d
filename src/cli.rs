use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Portfolio tools: related-content ranking and slideshow preview
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (default: warn, -v: info, -vv: debug, -vvv+: trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Custom configuration directory (overrides default platform paths)
    #[arg(short = 'c', long = "config-dir", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rank a content pool against one item and print the related items
    Related {
        /// JSON array of content items
        #[arg(value_name = "POOL")]
        pool: PathBuf,

        /// Id of the current item
        #[arg(value_name = "ID")]
        id: String,

        /// Number of related items (default from config)
        #[arg(short = 'n', long = "limit", value_name = "N")]
        limit: Option<usize>,
    },

    /// Play images as an autoplaying carousel in the terminal
    Slideshow {
        /// Image sources, in order
        #[arg(value_name = "IMAGE", required = true)]
        images: Vec<String>,

        /// Autoplay interval in milliseconds (default from config)
        #[arg(short = 'i', long = "interval", value_name = "MS")]
        interval_ms: Option<u64>,

        /// Stop after this many seconds
        #[arg(short = 'd', long = "duration", value_name = "SECS", default_value = "12")]
        duration_secs: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_related() {
        let args = Args::parse_from(["folio", "related", "pool.json", "p1", "-n", "5", "-vv"]);
        assert_eq!(args.verbosity, 2);
        match args.command {
            Command::Related { pool, id, limit } => {
                assert_eq!(pool, PathBuf::from("pool.json"));
                assert_eq!(id, "p1");
                assert_eq!(limit, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_slideshow_defaults() {
        let args = Args::parse_from(["folio", "slideshow", "a.jpg", "b.jpg"]);
        match args.command {
            Command::Slideshow { images, interval_ms, duration_secs } => {
                assert_eq!(images, vec!["a.jpg", "b.jpg"]);
                assert_eq!(interval_ms, None);
                assert_eq!(duration_secs, 12);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_slideshow_requires_images() {
        assert!(Args::try_parse_from(["folio", "slideshow"]).is_err());
    }
}
