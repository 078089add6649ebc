use tracing::info;

use crate::api::models::{PlaysResponse, RawPlay};
use crate::api::GameTracker;
use crate::error::FetchError;
use crate::fetch::{page_count, FetchTask, ThrottledQueue};
use crate::fmt;
use crate::util::dates::Window;

/// Service contract: a plays page holds at most this many records.
/// TODO confirm against the live service; the value is assumed, not documented.
pub const PLAYS_PAGE_SIZE: u32 = 100;

/// One logged play session of a game, already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayRecord {
    pub game_name: String,
    pub quantity: u32,
}

/// Everything one member played inside the window. An empty `plays` is
/// valid data (the member logged nothing), never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPlays {
    pub member: String,
    pub plays: Vec<PlayRecord>,
}

/// Fetch every member's play log for the window, strictly in roster order.
/// All page-1 fetches and overflow-page fetches go through the same queue,
/// so the inter-request delay holds across the whole run. Any fetch or
/// parse failure aborts the run.
#[tracing::instrument(level = "trace", skip_all)]
pub async fn collect_plays<T: GameTracker>(
    api: &T,
    queue: &ThrottledQueue,
    members: &[String],
    window: Window,
) -> Result<Vec<MemberPlays>, FetchError> {
    let member_count = members.len();
    let mut collected = Vec::with_capacity(member_count);

    for (index, member) in members.iter().enumerate() {
        info!(
            member,
            number = index + 1,
            of = member_count,
            "Fetching plays for member"
        );

        let first = queue
            .run(Box::new(move || api.plays_page(member, window, 1)))
            .await?;
        let total = parse_total(&first, member)?;

        let mut raw_plays = first.plays;

        if total > PLAYS_PAGE_SIZE {
            let pages = page_count(total, PLAYS_PAGE_SIZE);
            let tasks: Vec<FetchTask<'_, PlaysResponse>> = (2..=pages)
                .map(|page| {
                    let task: FetchTask<'_, PlaysResponse> = Box::new(move || {
                        info!(member, page, pages, "Fetching overflow plays page");
                        api.plays_page(member, window, page)
                    });
                    task
                })
                .collect();

            for response in queue.run_all(tasks).await? {
                raw_plays.extend(response.plays);
            }
        }

        let plays = map_plays(raw_plays, member)?;
        collected.push(MemberPlays {
            member: member.clone(),
            plays,
        });
    }

    Ok(collected)
}

fn parse_total(response: &PlaysResponse, member: &str) -> Result<u32, FetchError> {
    let raw = response
        .total
        .as_deref()
        .ok_or_else(|| FetchError::data(fmt!("plays for {member}"), "missing total attribute"))?;

    raw.parse::<u32>().map_err(|_| {
        FetchError::data(
            fmt!("plays for {member}"),
            fmt!("malformed total attribute {raw:?}"),
        )
    })
}

fn map_plays(raw_plays: Vec<RawPlay>, member: &str) -> Result<Vec<PlayRecord>, FetchError> {
    raw_plays
        .into_iter()
        .map(|play| map_play(play, member))
        .collect()
}

fn map_play(play: RawPlay, member: &str) -> Result<PlayRecord, FetchError> {
    let context = fmt!("plays for {member}");

    let game_name = play
        .item
        .and_then(|item| item.name)
        .ok_or_else(|| FetchError::data(context.clone(), "play has no item name"))?;

    let raw_quantity = play.quantity.ok_or_else(|| {
        FetchError::data(context.clone(), fmt!("play of {game_name:?} has no quantity"))
    })?;
    let quantity = raw_quantity.parse::<u32>().map_err(|_| {
        FetchError::data(
            context,
            fmt!("play of {game_name:?} has malformed quantity {raw_quantity:?}"),
        )
    })?;

    Ok(PlayRecord {
        game_name,
        quantity,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use futures::future::BoxFuture;

    use super::*;
    use crate::api::models::{GuildResponse, PlayItem};
    use crate::str;

    struct ScriptedTracker {
        // Keyed by (username, page).
        pages: HashMap<(String, u32), PlaysResponse>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedTracker {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_page(mut self, member: &str, page: u32, response: PlaysResponse) -> Self {
            self.pages.insert((str!(member), page), response);
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GameTracker for ScriptedTracker {
        fn guild_page(
            &self,
            _guild_id: u32,
            _page: u32,
        ) -> BoxFuture<'_, Result<GuildResponse, FetchError>> {
            Box::pin(async { panic!("play collection must not fetch the roster") })
        }

        fn plays_page<'a>(
            &'a self,
            username: &'a str,
            _window: Window,
            page: u32,
        ) -> BoxFuture<'a, Result<PlaysResponse, FetchError>> {
            self.calls.lock().unwrap().push(fmt!("{username}:{page}"));
            let result = self
                .pages
                .get(&(str!(username), page))
                .cloned()
                .ok_or_else(|| FetchError::data(fmt!("plays for {username}"), "no scripted page"));
            Box::pin(async move { result })
        }
    }

    fn play(game_name: &str, quantity: &str) -> RawPlay {
        RawPlay {
            quantity: Some(str!(quantity)),
            item: Some(PlayItem {
                name: Some(str!(game_name)),
            }),
        }
    }

    fn response(total: &str, plays: Vec<RawPlay>) -> PlaysResponse {
        PlaysResponse {
            total: Some(str!(total)),
            plays,
        }
    }

    fn window() -> Window {
        Window::parse("2017-12-01", "2017-12-31").unwrap()
    }

    fn queue() -> ThrottledQueue {
        ThrottledQueue::new(Duration::from_millis(10))
    }

    #[tokio::test(start_paused = true)]
    async fn single_page_member_needs_one_fetch() {
        let tracker = ScriptedTracker::new().with_page(
            "alice",
            1,
            response("2", vec![play("Codenames", "2"), play("Azul", "1")]),
        );

        let collected = collect_plays(&tracker, &queue(), &[str!("alice")], window())
            .await
            .unwrap();

        assert_eq!(tracker.calls(), vec![str!("alice:1")]);
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].member, "alice");
        assert_eq!(
            collected[0].plays,
            vec![
                PlayRecord {
                    game_name: str!("Codenames"),
                    quantity: 2,
                },
                PlayRecord {
                    game_name: str!("Azul"),
                    quantity: 1,
                },
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn overflow_pages_are_fetched_and_concatenated_in_order() {
        // total 250 at 100 per page: pages 2 and 3 on top of page 1.
        let tracker = ScriptedTracker::new()
            .with_page("bob", 1, response("250", vec![play("Page One Game", "1")]))
            .with_page("bob", 2, response("250", vec![play("Page Two Game", "1")]))
            .with_page("bob", 3, response("250", vec![play("Page Three Game", "1")]));

        let collected = collect_plays(&tracker, &queue(), &[str!("bob")], window())
            .await
            .unwrap();

        assert_eq!(
            tracker.calls(),
            vec![str!("bob:1"), str!("bob:2"), str!("bob:3")]
        );
        let names: Vec<&str> = collected[0]
            .plays
            .iter()
            .map(|p| p.game_name.as_str())
            .collect();
        assert_eq!(names, vec!["Page One Game", "Page Two Game", "Page Three Game"]);
    }

    #[tokio::test(start_paused = true)]
    async fn members_are_processed_in_roster_order() {
        let tracker = ScriptedTracker::new()
            .with_page("alice", 1, response("1", vec![play("Azul", "1")]))
            .with_page("bob", 1, response("0", Vec::new()))
            .with_page("carol", 1, response("1", vec![play("Codenames", "1")]));

        let members = [str!("alice"), str!("bob"), str!("carol")];
        let collected = collect_plays(&tracker, &queue(), &members, window())
            .await
            .unwrap();

        assert_eq!(
            tracker.calls(),
            vec![str!("alice:1"), str!("bob:1"), str!("carol:1")]
        );
        let order: Vec<&str> = collected.iter().map(|m| m.member.as_str()).collect();
        assert_eq!(order, vec!["alice", "bob", "carol"]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_play_member_yields_an_empty_pair() {
        let tracker =
            ScriptedTracker::new().with_page("carol", 1, response("0", Vec::new()));

        let collected = collect_plays(&tracker, &queue(), &[str!("carol")], window())
            .await
            .unwrap();

        assert_eq!(collected.len(), 1);
        assert!(collected[0].plays.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn total_at_page_size_stays_on_one_page() {
        let plays: Vec<RawPlay> = (0..100).map(|i| play(&fmt!("Game {i}"), "1")).collect();
        let tracker = ScriptedTracker::new().with_page("dave", 1, response("100", plays));

        let collected = collect_plays(&tracker, &queue(), &[str!("dave")], window())
            .await
            .unwrap();

        assert_eq!(tracker.calls(), vec![str!("dave:1")]);
        assert_eq!(collected[0].plays.len(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn malformed_quantity_aborts_the_run() {
        let tracker = ScriptedTracker::new().with_page(
            "eve",
            1,
            response("1", vec![play("Codenames", "two")]),
        );

        let err = collect_plays(&tracker, &queue(), &[str!("eve")], window())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Data { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_total_aborts_the_run() {
        let tracker = ScriptedTracker::new().with_page(
            "frank",
            1,
            PlaysResponse {
                total: None,
                plays: Vec::new(),
            },
        );

        let err = collect_plays(&tracker, &queue(), &[str!("frank")], window())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Data { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn failing_member_aborts_before_later_members() {
        let tracker = ScriptedTracker::new()
            .with_page("alice", 1, response("1", vec![play("Azul", "1")]))
            // bob has no scripted page, so his fetch fails
            .with_page("carol", 1, response("1", vec![play("Codenames", "1")]));

        let members = [str!("alice"), str!("bob"), str!("carol")];
        let err = collect_plays(&tracker, &queue(), &members, window())
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Data { .. }));
        assert_eq!(tracker.calls(), vec![str!("alice:1"), str!("bob:1")]);
    }
}
