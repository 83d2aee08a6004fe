//! Merge Drop headless runner
//!
//! Plays a scripted run against the bundled physics provider and logs what
//! happens. Usage: `merge-drop [tuning.json] [seed]`
//!
//! Set `RUST_LOG=debug` to see every drop and merge.

use merge_drop::leaderboard::{LeaderboardClient, LocalBoard, MAX_LOCAL_ENTRIES};
use merge_drop::persistence::JsonFileStore;
use merge_drop::platform::FrameClock;
use merge_drop::settings::Settings;
use merge_drop::sim::{BoxPhysics, FrameInput, GameEvent, GameSession, TierPool, tick};
use merge_drop::tuning::GameTuning;

/// Preferences file written next to the working directory
const PREFS_PATH: &str = "merge-drop-prefs.json";
/// Local leaderboard file
const BOARD_PATH: &str = "merge-drop-board.json";
/// Simulated frame rate of the scripted host
const FRAME_DT: f32 = 1.0 / 60.0;
/// Longest run the script plays (seconds)
const MAX_RUN_SECONDS: f32 = 600.0;

fn main() {
    env_logger::init();
    log::info!("Merge Drop (headless) starting...");

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => GameTuning::load_or_default(path),
        None => GameTuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5eed_u64);

    let store = JsonFileStore::open_or_fresh(PREFS_PATH);
    let settings = Settings::load(&store);
    log::info!(
        "Volumes sfx {:.2} voice {:.2} bgm {:.2}",
        settings.sfx_volume,
        settings.voice_volume,
        settings.bgm_volume
    );

    let physics = BoxPhysics::from_tuning(&tuning);
    let mut client = LeaderboardClient::from_tuning(
        Some(Box::new(LocalBoard::load(Box::new(JsonFileStore::open_or_fresh(BOARD_PATH)), MAX_LOCAL_ENTRIES))),
        &tuning,
    );
    let mut session = GameSession::new(tuning, TierPool::builtin(), physics, Box::new(store), seed);
    let mut clock = FrameClock::default();

    let names: Vec<&str> = session
        .catalog()
        .tiers()
        .iter()
        .map(|t| t.definition.name.as_str())
        .collect();
    log::info!("Ladder: {}", names.join(" > "));

    let mut input = FrameInput::default();
    let mut elapsed = 0.0_f32;
    let mut drops = 0u32;
    while elapsed < MAX_RUN_SECONDS && !session.is_game_over() {
        // Sweep the lane back and forth, releasing whenever a body is held
        let sweep = (elapsed * 0.7).sin();
        input.pointer_x = Some(sweep * session.tuning().drop_max_x);
        if session.aiming_body().is_some() {
            input.pointer_pressed = true;
            input.pointer_released = true;
            drops += 1;
        }

        tick(&mut session, &mut clock, &input, FRAME_DT);
        input.clear_one_shots();
        client.update(FRAME_DT);
        elapsed += FRAME_DT;

        for event in session.drain_events() {
            log_event(&event);
        }
    }

    log::info!(
        "Run finished after {:.1}s: {} drops, {} merges, {} max merges, score {} (best {})",
        elapsed,
        drops,
        session.resolver().merge_count(),
        session.resolver().max_merge_count(),
        session.score(),
        session.high_score()
    );

    if session.is_game_over() {
        let nickname = session.last_nickname();
        session.submit_final_score(&mut client, &nickname, |ok| {
            log::info!("Score submitted: {}", ok);
        });
        client.fetch_top(|entries| {
            for (rank, entry) in entries.iter().enumerate() {
                log::info!("#{:<2} {:<16} {}", rank + 1, entry.player_name, entry.score);
            }
        });
    }
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::ScoreChanged { score } => log::debug!("Score: {}", score),
        GameEvent::HighScoreChanged { score } => log::info!("New high score: {}", score),
        GameEvent::NextTierChanged { tier } => log::debug!("Next tier: {}", tier),
        GameEvent::GameOver { score } => log::info!("GAME OVER - score {}", score),
        GameEvent::MaxMerge { position } => log::info!("Max merge at ({:.2}, {:.2})!", position.x, position.y),
        GameEvent::TiersSelected => log::info!("Tiers selected"),
        GameEvent::Dropped { tier } => log::debug!("Dropped tier {}", tier),
        GameEvent::Merged { tier, position, .. } => {
            log::debug!("Merged into tier {} at ({:.2}, {:.2})", tier, position.x, position.y)
        }
    }
}
