use tracing::info;

use crate::api::models::{GuildMembers, GuildResponse};
use crate::api::GameTracker;
use crate::config::AppConfig;
use crate::error::FetchError;
use crate::fetch::{page_count, FetchTask, ThrottledQueue};
use crate::fmt;
use crate::roster::cache::{self, RosterSnapshot};

/// Bring the member roster up to date. Fetches roster page 1 through the
/// queue, short-circuits to the cached list when the reported count and
/// latest-join marker are unchanged, and otherwise pulls the remaining pages
/// and rewrites the cache wholesale. The cache is only written after every
/// page arrived intact.
#[tracing::instrument(level = "trace", skip_all)]
pub async fn synchronize<T: GameTracker>(
    api: &T,
    queue: &ThrottledQueue,
    cfg: &AppConfig,
    cached: &RosterSnapshot,
) -> Result<RosterSnapshot, FetchError> {
    let guild_id = cfg.guild_id;

    let first = queue
        .run(Box::new(move || api.guild_page(guild_id, 1)))
        .await?;
    let block = require_members(first)?;

    let total_count = parse_count(&block)?;
    let latest_join = block
        .members
        .first()
        .map(|member| member.join_date.clone())
        .unwrap_or_default();

    if total_count == cached.total_count && latest_join == cached.latest_join {
        info!("No changes in member list detected");
        return Ok(cached.clone());
    }

    info!(total_count, "Member list changed, updating");

    let mut members: Vec<String> = block.members.into_iter().map(|member| member.name).collect();

    let pages = page_count(total_count, cfg.members_per_page);
    if pages > 1 {
        let tasks: Vec<FetchTask<'_, GuildResponse>> = (2..=pages)
            .map(|page| {
                let task: FetchTask<'_, GuildResponse> = Box::new(move || {
                    info!(page, pages, "Fetching roster page");
                    api.guild_page(guild_id, page)
                });
                task
            })
            .collect();

        for response in queue.run_all(tasks).await? {
            let block = require_members(response)?;
            members.extend(block.members.into_iter().map(|member| member.name));
        }
    }

    if members.len() as u32 != total_count {
        return Err(FetchError::data(
            "guild roster",
            fmt!("reported {total_count} members but pages held {}", members.len()),
        ));
    }

    let snapshot = RosterSnapshot {
        total_count,
        latest_join,
        members,
    };
    cache::save(&cfg.members_file, &snapshot)?;
    info!(
        members = snapshot.members.len(),
        path = %cfg.members_file.display(),
        "Roster cache updated"
    );

    Ok(snapshot)
}

fn require_members(response: GuildResponse) -> Result<GuildMembers, FetchError> {
    response.members.ok_or_else(|| {
        FetchError::data("guild roster", "response has no members block")
    })
}

fn parse_count(block: &GuildMembers) -> Result<u32, FetchError> {
    let raw = block
        .count
        .as_deref()
        .ok_or_else(|| FetchError::data("guild roster", "missing count attribute"))?;

    raw.parse::<u32>().map_err(|_| {
        FetchError::data("guild roster", fmt!("malformed count attribute {raw:?}"))
    })
}
