//! Wire types served by the player backend.
//!
//! The backend speaks camelCase JSON and omits most optional fields when they
//! are unset, so everything that may be absent is an `Option` or defaults to
//! an empty collection.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::notes::NoteCategory;

/// The key a lookup is resolved by. Exactly one kind per request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlayerKey {
    Ckey(String),
    DiscordId(u64),
}

impl PlayerKey {
    pub fn ckey(key: impl Into<String>) -> Self {
        PlayerKey::Ckey(key.into())
    }

    /// Query parameter name and value for `GET /User`.
    pub fn query_pair(&self) -> (&'static str, String) {
        match self {
            PlayerKey::Ckey(ckey) => ("ckey", ckey.clone()),
            PlayerKey::DiscordId(id) => ("discordId", id.to_string()),
        }
    }
}

impl fmt::Display for PlayerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerKey::Ckey(ckey) => write!(f, "{ckey}"),
            PlayerKey::DiscordId(id) => write!(f, "discord:{id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerRecord {
    pub id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub ckey: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_login: String,

    pub is_permabanned: bool,
    pub permaban_reason: Option<String>,
    pub permaban_date: Option<String>,
    pub permaban_admin_id: Option<i64>,
    pub permaban_admin_ckey: Option<String>,

    pub is_time_banned: bool,
    pub time_ban_reason: Option<String>,
    pub time_ban_date: Option<String>,
    pub time_ban_admin_id: Option<i64>,
    pub time_ban_admin_ckey: Option<String>,
    /// Minutes since the ban epoch (see [`crate::ban_state::ban_epoch`]).
    pub time_ban_expiration: Option<i64>,

    #[serde(deserialize_with = "null_as_default")]
    pub last_known_ip: String,
    #[serde(deserialize_with = "null_as_default")]
    pub last_known_cid: String,

    pub migrated_notes: bool,
    pub migrated_bans: bool,
    pub stickyban_whitelisted: Option<bool>,

    pub discord_link_id: Option<i64>,
    pub discord_id: Option<u64>,
    /// Pipe-delimited list of role whitelists.
    pub whitelist_status: Option<String>,
    pub byond_account_age: Option<String>,
    pub first_join_date: Option<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub notes: Vec<Note>,
    #[serde(deserialize_with = "null_as_default")]
    pub job_bans: Vec<JobBan>,
}

impl PlayerRecord {
    pub fn whitelist_entries(&self) -> Vec<&str> {
        self.whitelist_status
            .as_deref()
            .map(|status| {
                status
                    .split('|')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn key(&self) -> PlayerKey {
        PlayerKey::Ckey(self.ckey.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Note {
    pub id: i64,
    pub player_id: i64,
    pub admin_id: i64,
    pub text: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    pub is_ban: bool,
    pub ban_time: Option<i64>,
    pub is_confidential: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub admin_rank: String,
    pub note_category: Option<NoteCategory>,
    pub round_id: Option<i64>,
    pub noted_player_ckey: Option<String>,
    pub noting_admin_ckey: Option<String>,
}

impl Note {
    /// Notes without text are kept by the backend but never displayed.
    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobBan {
    pub id: i64,
    pub player_id: i64,
    pub admin_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub date: String,
    pub ban_time: Option<i64>,
    pub expiration: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub role: String,
    pub banning_admin_ckey: Option<String>,
}

/// Result of a connection-history query. Which fields are populated depends
/// on the query mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionView {
    pub all_ckeys: Option<Vec<String>>,
    pub all_cids: Option<Vec<String>>,
    pub all_ips: Option<Vec<String>>,
    pub triplets: Option<Vec<LoginTriplet>>,
}

/// One observed ckey + computer id + address association.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoginTriplet {
    #[serde(deserialize_with = "null_as_default")]
    pub ckey: String,
    #[serde(alias = "cid", deserialize_with = "null_as_default")]
    pub last_known_cid: String,
    #[serde(alias = "ip", deserialize_with = "null_as_default")]
    pub last_known_ip: String,
    #[serde(alias = "date", alias = "timestamp")]
    pub login_date: Option<String>,
}

/// The backend sends `null` for values it has never recorded; treat that
/// like an omitted field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
