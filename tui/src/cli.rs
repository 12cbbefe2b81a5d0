use clap::Parser;
use std::path::PathBuf;
use warden_core::PlayerKey;
use warden_core::config::ConfigOverrides;

#[derive(Parser, Debug, Default)]
#[command(version, about = "Moderation console for player lookup")]
pub struct Cli {
    /// Look up this ckey on startup.
    #[arg(long, value_name = "KEY", conflicts_with = "discord_id")]
    pub ckey: Option<String>,

    /// Look up the player linked to this Discord account on startup.
    #[arg(long = "discord-id", value_name = "ID")]
    pub discord_id: Option<u64>,

    /// Base URL of the player backend.
    #[arg(long = "base-url", value_name = "URL")]
    pub base_url: Option<String>,

    /// Show the ban action buttons on records.
    #[arg(long = "actions", default_value_t = false)]
    pub actions: bool,

    /// Read configuration from this file instead of `$WARDEN_HOME/config.toml`.
    #[arg(long = "config", value_name = "PATH")]
    pub config_path: Option<PathBuf>,
}

impl Cli {
    /// Key the main lookup starts resolving, if any.
    pub fn initial_key(&self) -> Option<PlayerKey> {
        match (&self.ckey, self.discord_id) {
            (Some(ckey), _) => Some(PlayerKey::ckey(ckey.trim())),
            (None, Some(id)) => Some(PlayerKey::DiscordId(id)),
            (None, None) => None,
        }
    }

    pub fn config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            actions_enabled: self.actions.then_some(true),
            config_path: self.config_path.clone(),
        }
    }
}
