use anyhow::Context;
use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use gemfall_core::*;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Plays a headless game by always taking the first hinted swap.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,

    /// Force a seed instead of random
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of gem kinds, overrides the rules file
    #[arg(short, long)]
    kinds: Option<u8>,

    /// Swaps to play before stopping
    #[arg(short, long, default_value_t = 20)]
    moves: u32,

    /// Simulated frame length in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,

    /// TOML file with the rules to play by
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Print the final board snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Logs every action instead of animating it.
#[derive(Debug, Default)]
struct LoggingSink {
    played: usize,
}

impl ActionSink for LoggingSink {
    fn play(&mut self, action: &Action) -> Playback {
        log::trace!("play {:?}", action);
        self.played += 1;
        Playback::Done
    }
}

type HeadlessLevel = Level<RandomGemSource, LoggingSink, ManualClock>;

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let mut rules = match &args.rules {
        Some(path) => load_rules(path)?,
        None => Rules::default(),
    };
    if let Some(kinds) = args.kinds {
        rules.kind_count = kinds;
    }
    log::debug!("rules: {:?}", rules);

    let source = match args.seed {
        Some(seed) => RandomGemSource::new(seed),
        None => RandomGemSource::from_os_rng(),
    };
    let clock = ManualClock::new();
    let sequencer = Sequencer::new(
        LoggingSink::default(),
        clock.clone(),
        SequencerConfig::from(&rules.timing),
    );
    let kinds = rules.kinds();
    let session = Session::new(rules, source).context("Invalid rules")?;
    let mut level = Level::new(session, sequencer);
    level.initialize(&kinds)?;

    let frame = Duration::from_millis(args.frame_ms.max(1));
    let mut moves = 0;
    while moves < args.moves {
        settle(&mut level, &clock, frame);
        report(&mut level);

        if level.session().state() == SessionState::Expired {
            break;
        }
        let Some(hint) = level.hint() else {
            log::warn!("No playable swap left");
            break;
        };
        log::info!("Move {}: swap {:?} <-> {:?}", moves + 1, hint.a, hint.b);
        if level.swap(hint.a, hint.b)?.is_none() {
            log::warn!("Hinted swap {:?} <-> {:?} was rejected", hint.a, hint.b);
            break;
        }
        moves += 1;
    }
    settle(&mut level, &clock, frame);
    report(&mut level);

    let session = level.session();
    println!("{}", session.grid());
    println!(
        "score: {}, moves: {}, actions played: {}",
        session.score(),
        moves,
        level.sequencer().sink().played
    );
    if args.json {
        println!("{}", serde_json::to_string_pretty(&session.snapshot())?);
    }
    Ok(())
}

fn load_rules(path: &Path) -> anyhow::Result<Rules> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read rules from {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("Could not parse rules in {}", path.display()))
}

/// Steps frames until every queued action has played.
fn settle(level: &mut HeadlessLevel, clock: &ManualClock, frame: Duration) {
    level.update();
    while level.is_busy() {
        clock.advance(frame);
        level.update();
    }
}

fn report(level: &mut HeadlessLevel) {
    for event in level.drain_events() {
        match event {
            SessionEvent::ScoreChanged { score, delta } => {
                log::info!("Score {} (+{})", score, delta)
            }
            SessionEvent::ComboReached { depth } => log::info!("Combo x{}", depth + 1),
            SessionEvent::TimerChanged { seconds_left } => {
                log::debug!("{}s left", seconds_left)
            }
            SessionEvent::TimeUp => log::info!("Time up"),
            SessionEvent::BoardRegenerated => log::info!("Board regenerated"),
        }
    }
}
