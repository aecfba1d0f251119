use std::cell::RefCell;
use std::collections::HashMap;

use crate::config::PageConfig;

/// Something that can send the browser to another url.
pub trait Navigator {
    fn navigate(&self, href: &str);
}

/// `/<version>/<route path><query>`. `query` is `location.search`, so either empty or
/// starting with `?`.
pub fn versioned_path(version: &str, route_path: &str, query: &str) -> String {
    format!(
        "/{}/{}{query}",
        version.trim_matches('/'),
        route_path.trim_start_matches('/')
    )
}

/// Redirects to the copy of this page published under the latest version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionGate {
    route_path: String,
    current_version: String,
}

impl VersionGate {
    pub fn new(page: &PageConfig, current_version: impl Into<String>) -> Self {
        Self {
            route_path: page.route_path().to_string(),
            current_version: current_version.into(),
        }
    }

    pub fn current_version(&self) -> &str {
        &self.current_version
    }

    pub fn versioned_path(&self, version: &str, query: &str) -> String {
        versioned_path(version, &self.route_path, query)
    }

    /// `None` when `latest_version` is the version already loaded.
    pub fn redirect_target(&self, latest_version: &str, query: &str) -> Option<String> {
        let latest_version = latest_version.trim();
        if latest_version.is_empty() || latest_version == self.current_version.trim() {
            return None;
        }
        Some(self.versioned_path(latest_version, query))
    }

    /// Navigates when a newer version exists. Returns whether navigation happened.
    pub fn redirect(&self, latest_version: &str, query: &str, navigator: &impl Navigator) -> bool {
        let Some(target) = self.redirect_target(latest_version, query) else {
            tracing::debug!(version = %self.current_version, "already on latest version");
            return false;
        };
        tracing::info!(
            from = %self.current_version,
            to = %latest_version,
            %target,
            "redirecting to latest version"
        );
        navigator.navigate(&target);
        true
    }
}

/// Paths handed to the version detector, each mapped back to the version it was built
/// for. The detector may format several candidates before it reports the one to load.
#[derive(Debug)]
pub struct VersionLookup {
    gate: VersionGate,
    query: String,
    candidates: RefCell<HashMap<String, String>>,
}

impl VersionLookup {
    pub fn new(gate: VersionGate, query: impl Into<String>) -> Self {
        Self {
            gate,
            query: query.into(),
            candidates: RefCell::new(HashMap::new()),
        }
    }

    pub fn path_for(&self, version: &str) -> String {
        let path = self.gate.versioned_path(version, &self.query);
        self.candidates
            .borrow_mut()
            .insert(path.clone(), version.to_string());
        path
    }

    pub fn version_for(&self, path: &str) -> Option<String> {
        self.candidates.borrow().get(path).cloned()
    }

    /// Follows the path the detector reported. Returns whether navigation happened.
    pub fn redirect_to(&self, path: &str, navigator: &impl Navigator) -> bool {
        let Some(version) = self.version_for(path) else {
            tracing::warn!(path, "version detector reported a path it was never given");
            return false;
        };
        self.gate.redirect(&version, &self.query, navigator)
    }
}
