mod bot;

use std::path::PathBuf;

use anyhow::{Context, Result};
use cadence_config::{EngineConfig, JsonFileStore};
use cadence_core::{SessionLayout, Stage, StageEvent, build_session, prepare_modifiers};
use cadence_input::VirtualInput;
use cadence_recovery::{RecoveryEvent, SceneGraph};
use cadence_types::{MICROS_PER_SECOND, SessionEvent, us_to_secs};
use clap::{Parser, ValueEnum};

use bot::{LogFeedback, RecoveryBot};

/// Delay between the recovery bot's presses.
const BOT_INTERVAL_US: i64 = 150_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LayoutArg {
    TwoKey,
    SingleKey,
    Hold,
}

impl From<LayoutArg> for SessionLayout {
    fn from(arg: LayoutArg) -> Self {
        match arg {
            LayoutArg::TwoKey => SessionLayout::TwoKey,
            LayoutArg::SingleKey => SessionLayout::SingleKey,
            LayoutArg::Hold => SessionLayout::Hold,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "cadence", about = "Headless beat judgment simulator")]
struct Args {
    /// Path to engine config JSON
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the persistent modifier store
    #[arg(long, default_value = "cadence_store.json")]
    store: PathBuf,

    /// Store key prefix (overrides the config)
    #[arg(long)]
    prefix: Option<String>,

    /// Input layout (the hold-mode modifier overrides it)
    #[arg(long, value_enum, default_value_t = LayoutArg::TwoKey)]
    layout: LayoutArg,

    /// Chance that autoplay answers a beat correctly
    #[arg(long, default_value_t = 0.9)]
    autoplay_accuracy: f64,

    /// Seed for the autoplay rng (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum simulated real time
    #[arg(long, default_value_t = 60)]
    seconds: u32,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Number of ambient scene behaviors
    #[arg(long, default_value_t = 4)]
    behaviors: usize,

    /// Start a scene-wide recovery on every miss
    #[arg(long)]
    scene_recovery: bool,

    /// Print the final snapshots as JSON
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Default)]
struct RunStats {
    frames: u64,
    judgments: u32,
    recoveries: u32,
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
}

fn load_config(args: &Args) -> EngineConfig {
    let mut config = match &args.config {
        Some(path) => EngineConfig::read(path).unwrap_or_else(|e| {
            log::warn!("failed to load config from {}: {e:#}, using defaults", path.display());
            EngineConfig::default()
        }),
        None => EngineConfig::default(),
    };
    if let Some(prefix) = &args.prefix {
        config.modifier_prefix = prefix.clone();
    }
    if args.seed.is_some() {
        config.autoplay_seed = args.seed;
    }
    if args.scene_recovery {
        config.scene_recovery_on_miss = true;
    }
    config
}

fn log_event(event: &StageEvent, stats: &mut RunStats) {
    match event {
        StageEvent::Session { index, event } => match event {
            SessionEvent::Judged {
                slot,
                judgment,
                time_us,
            } => {
                stats.judgments += 1;
                log::info!(
                    "[{index}] {:.3}s {} {judgment:?}",
                    us_to_secs(*time_us),
                    slot.name()
                );
            }
            SessionEvent::BeatOpened { .. } => log::trace!("[{index}] {event:?}"),
            _ => log::info!("[{index}] {event:?}"),
        },
        StageEvent::Recovery(event) => {
            if matches!(event, RecoveryEvent::Entered { .. }) {
                stats.recoveries += 1;
            }
            log::info!("recovery: {event:?}");
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    anyhow::ensure!(args.fps > 0, "--fps must be positive");
    let config = load_config(&args);

    let mut store = JsonFileStore::open(&args.store)
        .with_context(|| format!("failed to open store {}", args.store.display()))?;
    let mut modifiers =
        prepare_modifiers(&mut store, &config.modifier_prefix, config.session);
    // Persist the prepared set now; simulator autoplay is not saved.
    store.flush().context("failed to write store")?;
    modifiers.set_autoplay(true, args.autoplay_accuracy);

    let (session, source) = build_session(
        args.layout.into(),
        modifiers,
        &config.bindings,
        config.autoplay_seed,
        LogFeedback,
    );

    let mut scene = SceneGraph::new();
    let session_behavior = scene.add_behavior("session", true);
    for i in 0..args.behaviors {
        scene.add_behavior(format!("prop-{i}"), true);
    }

    let mut stage = Stage::new(&config);
    stage.add_session(session, source);
    stage.protect(session_behavior);

    let mut stats = RunStats::default();
    for event in stage.start() {
        log_event(&event, &mut stats);
    }

    let frame_us = MICROS_PER_SECOND / i64::from(args.fps);
    let max_frames = u64::from(args.seconds) * u64::from(args.fps);
    let mut input = VirtualInput::new();
    let mut bot = RecoveryBot::new(BOT_INTERVAL_US);

    while stats.frames < max_frames && !stage.is_finished() {
        bot.drive(stage.coordinator(), &mut input, frame_us);
        for event in stage.tick(frame_us, &input, &mut scene) {
            log_event(&event, &mut stats);
        }
        input.end_tick();
        stats.frames += 1;
    }

    let snapshots = stage.snapshots();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshots)?);
    } else {
        println!(
            "frames: {}  game time: {:.3}s  judgments: {}  scene recoveries: {}",
            stats.frames,
            us_to_secs(stage.now_us()),
            stats.judgments,
            stats.recoveries
        );
        for (index, snapshot) in snapshots.iter().enumerate() {
            println!(
                "session {index}: {}  successes {}  fails {}/{}  beats {}  outcome {:?}",
                snapshot.phase.name(),
                snapshot.success_count,
                snapshot.fail_count,
                snapshot.params.fail_limit,
                snapshot.beat_index,
                snapshot.outcome
            );
        }
    }
    Ok(())
}
