use serde::Serialize;

use crate::session::SessionStats;

pub const PHASE_IDLE: &str = "idle";
pub const PHASE_BOOTING: &str = "booting";
pub const PHASE_AUTHENTICATING: &str = "authenticating";
pub const PHASE_READY: &str = "ready";
pub const PHASE_ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BootDiagnostics {
    pub phase: String,
    pub detail: String,
    pub route_path: Option<String>,
    pub session: SessionStats,
    pub storage_notifications: u64,
    pub dropped_storage_notifications: u64,
    pub last_error: Option<String>,
}

impl Default for BootDiagnostics {
    fn default() -> Self {
        Self {
            phase: PHASE_IDLE.to_string(),
            detail: "page shell not started".to_string(),
            route_path: None,
            session: SessionStats::default(),
            storage_notifications: 0,
            dropped_storage_notifications: 0,
            last_error: None,
        }
    }
}

impl BootDiagnostics {
    pub fn set_phase(&mut self, phase: &str, detail: &str) {
        self.phase = phase.to_string();
        self.detail = detail.to_string();
        if phase != PHASE_ERROR {
            self.last_error = None;
        }
    }

    pub fn set_error(&mut self, message: &str) {
        self.phase = PHASE_ERROR.to_string();
        self.detail = "startup failed".to_string();
        self.last_error = Some(message.to_string());
    }

    pub fn record_storage_notification(&mut self, delivered: bool) {
        if delivered {
            self.storage_notifications = self.storage_notifications.saturating_add(1);
        } else {
            self.dropped_storage_notifications =
                self.dropped_storage_notifications.saturating_add(1);
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            "{\"phase\":\"error\",\"detail\":\"diagnostics serialization failed\"}".to_string()
        })
    }
}
