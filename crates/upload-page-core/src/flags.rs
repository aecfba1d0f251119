use serde::Serialize;

use crate::storage::StoredState;

/// Static page metadata the App shows in its chrome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInfo {
    pub name: String,
    pub company: String,
    pub title: String,
    pub sub_title: String,
}

/// Startup data handed to the App's `init`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppFlags {
    pub token: String,
    pub storage: StoredState,
    pub project: ProjectInfo,
}
