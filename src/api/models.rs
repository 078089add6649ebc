use serde::Deserialize;

// Raw deserialized shapes of the XML API responses. Numeric attributes stay
// strings here; the roster sync and play collector convert them and attach
// context to anything missing or malformed.

#[derive(Debug, Clone, Deserialize)]
pub struct GuildResponse {
    pub members: Option<GuildMembers>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMembers {
    #[serde(rename = "@count")]
    pub count: Option<String>,
    #[serde(rename = "member", default)]
    pub members: Vec<GuildMember>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GuildMember {
    #[serde(rename = "@name")]
    pub name: String,
    /// The roster is requested sorted by join date, so page 1's first
    /// member carries the latest-join marker.
    #[serde(rename = "@date")]
    pub join_date: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaysResponse {
    #[serde(rename = "@total")]
    pub total: Option<String>,
    #[serde(rename = "play", default)]
    pub plays: Vec<RawPlay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPlay {
    #[serde(rename = "@quantity")]
    pub quantity: Option<String>,
    pub item: Option<PlayItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlayItem {
    #[serde(rename = "@name")]
    pub name: Option<String>,
}
