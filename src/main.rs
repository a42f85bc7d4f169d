use folio::cli::{Args, Command};
use folio::config::{CONFIG_FILE_NAME, FolioConfig, PathConfig};
use folio::core::carousel_events::{CurrentIndexChangedEvent, TimerFiredEvent, TransitionEndEvent};
use folio::core::relevance::{RelatedCache, RelevanceScorer};
use folio::core::scroll_lock::PageScroll;
use folio::core::timers::IntervalTimers;
use folio::main_events::handle_carousel_event;
use folio::{Carousel, ContentPool, EventBus, MediaSequence};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Update loop period for the slideshow (~60Hz)
const FRAME: Duration = Duration::from_millis(16);

fn init_logging(verbosity: u8) {
    // 0 (default) = warn, 1 (-v) = info, 2 (-vv) = debug, 3+ (-vvv) = trace
    let default_level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_millis()
        .init();
}

fn run_related(
    config: &FolioConfig,
    pool_path: &Path,
    id: &str,
    limit: Option<usize>,
) -> Result<()> {
    let pool = ContentPool::from_json(pool_path)?;
    let current = pool
        .get(id)
        .with_context(|| format!("No item with id '{}' in {}", id, pool_path.display()))?
        .clone();
    let limit = limit.unwrap_or(config.related_limit);

    let scorer = RelevanceScorer::new(config.weights);
    let mut cache = RelatedCache::new(scorer, config.related_cache_capacity);
    let related = cache.select(&current, &pool, limit);
    info!("{} related item(s) for {} out of {}", related.len(), id, pool.len());
    debug!("Related cache hit rate: {:.2}", cache.stats().hit_rate());

    println!("Related to {} ({}):", current.display_name(), current.category);
    if related.is_empty() {
        println!("  (none)");
    }
    for (rank, candidate) in related.iter().enumerate() {
        print!(
            "  {}. {:<32} score {:>3}  {}",
            rank + 1,
            candidate.item.display_name(),
            candidate.score,
            candidate.item.category
        );
        if !candidate.matched_tags.is_empty() {
            print!("  [also: {}]", candidate.matched_tags.join(", "));
        }
        println!();
    }
    Ok(())
}

fn run_slideshow(
    config: &FolioConfig,
    images: Vec<String>,
    interval_ms: Option<u64>,
    duration: Duration,
) -> Result<()> {
    let mut props = config.carousel;
    if let Some(ms) = interval_ms {
        props.interval_ms = ms;
    }
    props.autoplay = true;

    let timers = Arc::new(IntervalTimers::new());
    let bus = EventBus::new();
    let images = MediaSequence::from_sources(images);
    let scroll = Arc::new(PageScroll::default());
    let Some(mut carousel) = Carousel::new(images, props, timers.clone(), scroll) else {
        return Ok(());
    };
    carousel.set_emitter(bus.emitter());

    let sources: Vec<String> = carousel.images().iter().map(|m| m.src.clone()).collect();
    let total = sources.len();
    bus.subscribe::<CurrentIndexChangedEvent, _>(move |e| {
        println!("[{}/{}] {}", e.index + 1, total, sources[e.index]);
    });

    println!("[1/{}] {}", carousel.len(), carousel.current().src);
    if !carousel.show_controls() {
        println!("(single image, autoplay disabled)");
    }
    carousel.on_mount();

    let start = Instant::now();
    while start.elapsed() < duration {
        for id in timers.poll(Instant::now()) {
            bus.emit(TimerFiredEvent(id));
        }
        for event in bus.poll() {
            handle_carousel_event(&event, &mut carousel);
        }
        // No fade in a terminal: report the transition done on the next frame
        if let Some(t) = carousel.transition() {
            bus.emit(TransitionEndEvent(t.id));
        }
        std::thread::sleep(FRAME);
    }

    carousel.on_unmount();
    debug!("Slideshow finished at index {}", carousel.current_index());
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbosity);
    debug!("Command-line args: {:?}", args);

    let paths = PathConfig::from_env_and_cli(args.config_dir.clone());
    info!("Config path: {}", paths.config_file(CONFIG_FILE_NAME).display());
    let config = FolioConfig::load(&paths)?;

    match args.command {
        Command::Related { pool, id, limit } => run_related(&config, &pool, &id, limit),
        Command::Slideshow {
            images,
            interval_ms,
            duration_secs,
        } => run_slideshow(&config, images, interval_ms, Duration::from_secs(duration_secs)),
    }
}
