use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_STORAGE_KEY: &str = "app";
pub const DEFAULT_IDENTITY_REALM: &str = "getto";
pub const DEFAULT_IDENTITY_CLIENT_ID: &str = "upload";
pub const DEFAULT_APP_NAMESPACE: &str = "Elm.GettoUpload.App";
pub const APP_ENTRY_POINT: &str = "EntryPoint";
pub const IDENTITY_SCRIPT_SUFFIX: &str = "/js/keycloak.js";
pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 2 * 60 * 1000;
/// Browser timers take a delay in `u32` milliseconds.
pub const MAX_REFRESH_INTERVAL_MS: u64 = 4_294_967_295;
pub const DEFAULT_MIN_VALIDITY_SECONDS: u32 = 2 * 60 + 30;
pub const STICKY_HEADER_DELAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("route path must not be empty")]
    EmptyRoutePath,
    #[error("page identifier must not be empty")]
    EmptyPageIdentifier,
    #[error("page identifier '{0}' contains an empty segment")]
    InvalidPageIdentifier(String),
    #[error("identity provider url is unavailable")]
    MissingIdentityUrl,
    #[error("identity provider url must use http:// or https:// and include a host")]
    InvalidIdentityUrl,
    #[error("{field} must be greater than zero")]
    ZeroValue { field: &'static str },
    #[error("{field} must not exceed {max}")]
    TooLarge { field: &'static str, max: u64 },
}

/// Raw configuration handed to the shell by the hosting page.
///
/// Only `path` and `page` are required; everything else falls back to the constants above.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BootConfig {
    pub path: String,
    pub page: String,
    #[serde(default)]
    pub identity_url: Option<String>,
    #[serde(default)]
    pub realm: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub storage_key: Option<String>,
    #[serde(default)]
    pub app_namespace: Option<String>,
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub refresh_interval_ms: Option<u64>,
    #[serde(default)]
    pub min_validity_seconds: Option<u32>,
}

impl BootConfig {
    pub fn page_config(&self) -> Result<PageConfig, ConfigError> {
        PageConfig::new(&self.path, &self.page)
    }

    /// Resolves the identity provider settings. An explicit `identityUrl` wins over the
    /// url derived from the provider's script tag.
    pub fn identity_config(&self, script_src: Option<&str>) -> Result<IdentityConfig, ConfigError> {
        let url = match non_empty(self.identity_url.as_deref()) {
            Some(url) => normalize_identity_url(url)?,
            None => {
                let src = non_empty(script_src).ok_or(ConfigError::MissingIdentityUrl)?;
                identity_url_from_script_src(src)?
            }
        };

        Ok(IdentityConfig {
            url,
            realm: non_empty(self.realm.as_deref())
                .unwrap_or(DEFAULT_IDENTITY_REALM)
                .to_string(),
            client_id: non_empty(self.client_id.as_deref())
                .unwrap_or(DEFAULT_IDENTITY_CLIENT_ID)
                .to_string(),
        })
    }

    pub fn refresh_policy(&self) -> Result<RefreshPolicy, ConfigError> {
        let interval_ms = self
            .refresh_interval_ms
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(ConfigError::ZeroValue {
                field: "refreshIntervalMs",
            });
        }
        if interval_ms > MAX_REFRESH_INTERVAL_MS {
            return Err(ConfigError::TooLarge {
                field: "refreshIntervalMs",
                max: MAX_REFRESH_INTERVAL_MS,
            });
        }
        let min_validity_seconds = self
            .min_validity_seconds
            .unwrap_or(DEFAULT_MIN_VALIDITY_SECONDS);
        if min_validity_seconds == 0 {
            return Err(ConfigError::ZeroValue {
                field: "minValiditySeconds",
            });
        }
        Ok(RefreshPolicy {
            interval: Duration::from_millis(interval_ms),
            min_validity_seconds,
        })
    }

    pub fn storage_key(&self) -> &str {
        non_empty(self.storage_key.as_deref()).unwrap_or(DEFAULT_STORAGE_KEY)
    }

    pub fn app_namespace(&self) -> &str {
        non_empty(self.app_namespace.as_deref()).unwrap_or(DEFAULT_APP_NAMESPACE)
    }

    pub fn current_version(&self) -> Option<&str> {
        non_empty(self.current_version.as_deref())
    }
}

/// Immutable per-page settings: which App entry point to start and which storage
/// partition belongs to this page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageConfig {
    route_path: String,
    page_identifier: String,
}

impl PageConfig {
    pub fn new(route_path: &str, page_identifier: &str) -> Result<Self, ConfigError> {
        if route_path.trim().trim_matches('/').is_empty() {
            return Err(ConfigError::EmptyRoutePath);
        }
        let page_identifier = page_identifier.trim();
        if page_identifier.is_empty() {
            return Err(ConfigError::EmptyPageIdentifier);
        }
        if page_identifier
            .split('.')
            .any(|segment| segment.trim().is_empty())
        {
            return Err(ConfigError::InvalidPageIdentifier(
                page_identifier.to_string(),
            ));
        }

        Ok(Self {
            route_path: route_path.to_string(),
            page_identifier: page_identifier.to_string(),
        })
    }

    /// The route path exactly as configured. Also the key of this page's local storage
    /// partition.
    pub fn route_path(&self) -> &str {
        &self.route_path
    }

    pub fn page_identifier(&self) -> &str {
        &self.page_identifier
    }

    /// Property path from the global object to the App module that exposes `init`,
    /// e.g. `Elm.GettoUpload.App` + `Upload.Search` -> `[Elm, GettoUpload, App, Upload,
    /// Search, EntryPoint]`.
    pub fn entry_point_path(&self, namespace: &str) -> Vec<String> {
        namespace
            .split('.')
            .chain(self.page_identifier.split('.'))
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .chain(std::iter::once(APP_ENTRY_POINT))
            .map(ToString::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityConfig {
    pub url: String,
    pub realm: String,
    pub client_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    pub interval: Duration,
    pub min_validity_seconds: u32,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_REFRESH_INTERVAL_MS),
            min_validity_seconds: DEFAULT_MIN_VALIDITY_SECONDS,
        }
    }
}

/// The identity provider serves its adapter script from `<url>/js/keycloak.js`; the base
/// url is whatever precedes that suffix.
pub fn identity_url_from_script_src(src: &str) -> Result<String, ConfigError> {
    let trimmed = src.trim();
    let base = match trimmed.find(IDENTITY_SCRIPT_SUFFIX) {
        Some(index) => format!(
            "{}{}",
            &trimmed[..index],
            &trimmed[index + IDENTITY_SCRIPT_SUFFIX.len()..]
        ),
        None => trimmed.to_string(),
    };
    normalize_identity_url(&base)
}

fn normalize_identity_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ConfigError::MissingIdentityUrl);
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidIdentityUrl);
    };
    if !(scheme == "http" || scheme == "https") {
        return Err(ConfigError::InvalidIdentityUrl);
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidIdentityUrl);
    }
    Ok(trimmed.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
