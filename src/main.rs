mod api;
mod config;
mod error;
mod fetch;
mod leaderboard;
mod logging;
mod plays;
mod roster;
mod util;

use std::time::Duration;

use tracing::info;

use crate::api::bgg_api::BggApi;
use crate::fetch::ThrottledQueue;

pub type Error = Box<dyn std::error::Error + Send + Sync + 'static>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    if std::env::var("RUST_BACKTRACE").is_err() {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    let cfg = config::load_config().expect("Could not load config");

    logging::init(&cfg)?;
    info!(
        guild_id = cfg.guild_id,
        start = %cfg.window.start,
        end = %cfg.window.end,
        "Logging initialised. Starting guild plays run"
    );

    let api = BggApi::new();
    let queue = ThrottledQueue::new(Duration::from_millis(cfg.throttle_ms));

    let cached = roster::cache::load(&cfg.members_file)?;
    let roster = roster::sync::synchronize(&api, &queue, &cfg, &cached).await?;
    info!(members = roster.members.len(), "Roster ready");

    let collected =
        plays::collector::collect_plays(&api, &queue, &roster.members, cfg.window).await?;

    let (games, tally) = leaderboard::stats_calculator::aggregate(&collected);
    info!(
        games = games.len(),
        members_with_plays = tally.members_with_plays,
        "Aggregated play records"
    );

    let entries = leaderboard::report::rank_games(&games, cfg.games_to_list);
    for line in leaderboard::report::render(&entries, tally, cfg.window) {
        println!("{line}");
    }

    Ok(())
}
