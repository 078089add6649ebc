use indexmap::IndexMap;

use crate::leaderboard::stats_calculator::{GameStats, PlayTally};
use crate::util::dates::Window;
use crate::{fmt, str};

/// Read-only view of one ranked game, used only for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub game_name: String,
    pub member_count: usize,
    pub total_quantity: u32,
}

/// Order games by member count, then total quantity, both descending. The
/// sort is stable, so full ties keep the first-encountered game ahead.
pub fn rank_games(games: &IndexMap<String, GameStats>, limit: usize) -> Vec<LeaderboardEntry> {
    let mut ordered: Vec<(&String, &GameStats)> = games.iter().collect();
    ordered.sort_by(|(_, a), (_, b)| {
        b.members
            .len()
            .cmp(&a.members.len())
            .then_with(|| b.total_quantity.cmp(&a.total_quantity))
    });

    ordered
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(index, (game_name, stats))| LeaderboardEntry {
            rank: index + 1,
            game_name: game_name.clone(),
            member_count: stats.members.len(),
            total_quantity: stats.total_quantity,
        })
        .collect()
}

/// Render the report lines: a header, one aligned line per listed game and
/// the played / no-plays member tallies. Column widths are computed over
/// the listed entries only.
pub fn render(entries: &[LeaderboardEntry], tally: PlayTally, window: Window) -> Vec<String> {
    let mut lines = vec![
        fmt!("For the period {} to {}:", window.start, window.end),
        String::new(),
    ];

    if entries.is_empty() {
        lines.push(str!("No plays recorded this period."));
    } else {
        let widths = ColumnWidths::measure(entries);
        for entry in entries {
            lines.push(fmt!(
                "{rank:>rank_width$}. {game:<game_width$} played by {members:>member_width$} members {plays:>play_width$} times",
                rank = entry.rank,
                rank_width = widths.rank,
                game = entry.game_name,
                game_width = widths.game,
                members = entry.member_count,
                member_width = widths.members,
                plays = entry.total_quantity,
                play_width = widths.plays,
            ));
        }
    }

    lines.push(String::new());
    lines.push(fmt!(
        "{} members with recorded plays",
        tally.members_with_plays
    ));
    lines.push(fmt!(
        "{} members with no plays this period",
        tally.members_without_plays
    ));

    lines
}

struct ColumnWidths {
    rank: usize,
    game: usize,
    members: usize,
    plays: usize,
}

impl ColumnWidths {
    fn measure(entries: &[LeaderboardEntry]) -> Self {
        let mut widths = Self {
            rank: 0,
            game: 0,
            members: 0,
            plays: 0,
        };

        for entry in entries {
            widths.rank = widths.rank.max(entry.rank.to_string().len());
            widths.game = widths.game.max(entry.game_name.len());
            widths.members = widths.members.max(entry.member_count.to_string().len());
            widths.plays = widths.plays.max(entry.total_quantity.to_string().len());
        }

        widths
    }
}
