use {
    smart_default::SmartDefault,
    crate::{
        league::Submission,
        prelude::*,
    },
};
#[cfg(unix)] use xdg::BaseDirectories;

#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error(transparent)] Wheel(#[from] wheel::Error),
    #[cfg(unix)]
    #[error("missing config file")]
    Missing,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Config {
    /// Public URL of the site, used to build the OAuth redirect URI.
    pub(crate) base_uri: String,
    pub(crate) secret_key: String,
    #[serde(rename = "googleOAuth")]
    pub(crate) google_oauth: ConfigOAuth,
    #[serde(default)]
    pub(crate) database: Option<ConfigDatabase>,
    /// Emails of accounts that are made admins on startup.
    #[serde(default)]
    pub(crate) admins: Vec<String>,
    #[serde(default)]
    pub(crate) tournament: ConfigTournament,
}

impl Config {
    pub(crate) async fn load() -> Result<Self, Error> {
        #[cfg(unix)] {
            if let Some(config_path) = BaseDirectories::new().find_config_file(if Environment::default().is_dev() { "league-table-dev.json" } else { "league-table.json" }) {
                Ok(wheel::fs::read_json(config_path).await?)
            } else {
                Err(Error::Missing)
            }
        }
        #[cfg(windows)] {
            Ok(wheel::fs::read_json("cfg/league-table.json").await?)
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigOAuth {
    #[serde(rename = "clientID")]
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
}

#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigDatabase {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) username: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) database: Option<String>,
}

#[derive(Debug, Clone, Copy, SmartDefault, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub(crate) struct ConfigTournament {
    #[default(6)]
    pub(crate) group_size: usize,
    /// Number of teams per group highlighted as qualified on the standings page.
    #[default(4)]
    pub(crate) qualifying_places: usize,
    pub(crate) require_complete_schedule: bool,
}

impl ConfigTournament {
    pub(crate) fn submission(&self) -> Submission {
        Submission {
            group_size: self.group_size,
            require_complete_schedule: self.require_complete_schedule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tournament_defaults() {
        let tournament = serde_json::from_str::<ConfigTournament>("{}").unwrap();
        assert_eq!(tournament.group_size, 6);
        assert_eq!(tournament.qualifying_places, 4);
        assert!(!tournament.require_complete_schedule);
        let tournament = serde_json::from_str::<ConfigTournament>(r#"{"groupSize": 4, "requireCompleteSchedule": true}"#).unwrap();
        assert_eq!(tournament.group_size, 4);
        assert!(tournament.submission().require_complete_schedule);
    }
}
