use std::collections::HashSet;

use indexmap::IndexMap;

use crate::plays::collector::MemberPlays;

/// Per-game aggregate over the whole run. `members` is de-duplicated: a
/// member playing the same game any number of times counts once here,
/// while every session's quantity accumulates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameStats {
    pub members: HashSet<String>,
    pub total_quantity: u32,
}

/// How many members logged at least one play in the window, and how many
/// logged none. A zero-play member is valid data, not an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayTally {
    pub members_with_plays: usize,
    pub members_without_plays: usize,
}

/// Pure fold of the collected (member, plays) pairs into per-game stats.
/// The map keeps first-encounter order so the report's tie-break is
/// deterministic.
pub fn aggregate(collected: &[MemberPlays]) -> (IndexMap<String, GameStats>, PlayTally) {
    let mut games: IndexMap<String, GameStats> = IndexMap::new();
    let mut tally = PlayTally::default();

    for member_plays in collected {
        if member_plays.plays.is_empty() {
            tally.members_without_plays += 1;
            continue;
        }
        tally.members_with_plays += 1;

        for play in &member_plays.plays {
            let stats = games.entry(play.game_name.clone()).or_default();
            stats.total_quantity += play.quantity;
            stats.members.insert(member_plays.member.clone());
        }
    }

    (games, tally)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::plays::collector::PlayRecord;
    use crate::str;

    fn member_plays(member: &str, plays: &[(&str, u32)]) -> MemberPlays {
        MemberPlays {
            member: str!(member),
            plays: plays
                .iter()
                .map(|(game_name, quantity)| PlayRecord {
                    game_name: str!(*game_name),
                    quantity: *quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn repeated_sessions_accumulate_quantity_but_count_the_member_once() {
        let collected = vec![member_plays(
            "alice",
            &[("Azul", 2), ("Azul", 3), ("Azul", 1)],
        )];

        let (games, tally) = aggregate(&collected);

        let azul = &games["Azul"];
        assert_eq!(azul.total_quantity, 6);
        assert_eq!(azul.members.len(), 1);
        assert!(azul.members.contains("alice"));
        assert_eq!(tally.members_with_plays, 1);
    }

    #[test]
    fn distinct_members_of_one_game_are_all_counted() {
        let collected = vec![
            member_plays("alice", &[("Codenames", 1)]),
            member_plays("bob", &[("Codenames", 4)]),
            member_plays("carol", &[("Codenames", 2)]),
        ];

        let (games, _) = aggregate(&collected);

        let codenames = &games["Codenames"];
        assert_eq!(codenames.members.len(), 3);
        assert_eq!(codenames.total_quantity, 7);
    }

    #[test]
    fn zero_play_members_are_tallied_and_excluded_from_stats() {
        let collected = vec![
            member_plays("alice", &[("Azul", 1)]),
            member_plays("bob", &[]),
            member_plays("carol", &[]),
        ];

        let (games, tally) = aggregate(&collected);

        assert_eq!(tally.members_with_plays, 1);
        assert_eq!(tally.members_without_plays, 2);
        assert_eq!(games.len(), 1);
        assert!(!games["Azul"].members.contains("bob"));
    }

    #[test]
    fn aggregation_is_order_independent() {
        let mut collected = vec![
            member_plays("alice", &[("Azul", 2), ("Codenames", 1)]),
            member_plays("bob", &[("Codenames", 4)]),
            member_plays("carol", &[("Azul", 1), ("Terraforming Mars", 3)]),
        ];

        let (forward, forward_tally) = aggregate(&collected);
        collected.reverse();
        let (reversed, reversed_tally) = aggregate(&collected);

        // Same stats per game regardless of fold order; only encounter
        // order of the map differs.
        let forward: HashMap<_, _> = forward.into_iter().collect();
        let reversed: HashMap<_, _> = reversed.into_iter().collect();
        assert_eq!(forward, reversed);
        assert_eq!(forward_tally, reversed_tally);
    }

    #[test]
    fn games_keep_first_encounter_order() {
        let collected = vec![
            member_plays("alice", &[("Second", 1)]),
            member_plays("bob", &[("First", 1), ("Second", 1)]),
        ];

        let (games, _) = aggregate(&collected);

        let order: Vec<&str> = games.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["Second", "First"]);
    }
}
