use std::env;

use crate::api::ApiCredentials;
use crate::error::SyncError;

// API maximum, per the organizations endpoints.
const DEFAULT_PAGE_SIZE: u32 = 20;

/// Everything the pipeline needs from the environment, read once at startup
/// and passed down explicitly.
#[derive(Clone, Debug)]
pub struct SyncConfig {
    pub database_url: String,
    pub credentials: ApiCredentials,
    pub account_name: String,
    pub account_id: String,
    pub page_size: u32,
}

impl SyncConfig {
    pub fn from_env() -> Result<Self, SyncError> {
        Ok(Self {
            database_url: require("DATABASE_URL")?,
            credentials: ApiCredentials {
                client_key: require("CLIENT_KEY")?,
                client_secret: require("CLIENT_SECRET")?,
            },
            account_name: require("ACCOUNT_NAME")?,
            account_id: require("ACCOUNT_ID")?,
            page_size: match env::var("PAGE_SIZE") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|_| SyncError::Config(format!("PAGE_SIZE is not a number: {raw}")))?,
                Err(_) => DEFAULT_PAGE_SIZE,
            },
        })
    }

    /// Seed cursor for the course catalog; subsequent cursors come from the
    /// response's `next` field.
    pub fn course_list_url(&self) -> String {
        format!(
            "https://{}.udemy.com/api-2.0/organizations/{}/courses/list/?page_size={}&page=1",
            self.account_name, self.account_id, self.page_size
        )
    }

    /// Seed cursor for per-user course activity.
    pub fn activity_url(&self) -> String {
        format!(
            "https://{}.udemy.com/api-2.0/organizations/{}/analytics/user-course-activity/",
            self.account_name, self.account_id
        )
    }
}

fn require(name: &str) -> Result<String, SyncError> {
    env::var(name).map_err(|_| SyncError::Config(format!("{name} is not set")))
}
