use serde_json::{Map, Value};

use crate::storage::StoredState;

pub const PORT_DETECT_NEW_VERSION: &str = "detectNewVersion";
pub const PORT_LOGOUT: &str = "logout";
pub const PORT_STORE: &str = "store";
pub const PORT_FIXED_MIDASHI: &str = "fixedMidashi";
pub const PORT_ON_TOKEN_CHANGED: &str = "onTokenChanged";
pub const PORT_ON_STORAGE_CHANGED: &str = "onStorageChanged";

#[derive(Debug, thiserror::Error)]
pub enum EventDecodeError {
    #[error("unknown app port '{0}'")]
    UnknownPort(String),
    #[error("invalid payload on port '{port}': {source}")]
    InvalidPayload {
        port: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Ports the App emits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEventKind {
    DetectNewVersion,
    Logout,
    Store,
    FixedMidashi,
}

impl AppEventKind {
    pub const ALL: [Self; 4] = [
        Self::DetectNewVersion,
        Self::Logout,
        Self::Store,
        Self::FixedMidashi,
    ];

    #[must_use]
    pub fn port_name(self) -> &'static str {
        match self {
            Self::DetectNewVersion => PORT_DETECT_NEW_VERSION,
            Self::Logout => PORT_LOGOUT,
            Self::Store => PORT_STORE,
            Self::FixedMidashi => PORT_FIXED_MIDASHI,
        }
    }

    #[must_use]
    pub fn from_port_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.port_name() == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    DetectNewVersion,
    Logout,
    /// `None` asks for the whole slot to be cleared.
    Store(Option<StoredState>),
    FixedMidashi,
}

impl AppEvent {
    #[must_use]
    pub fn kind(&self) -> AppEventKind {
        match self {
            Self::DetectNewVersion => AppEventKind::DetectNewVersion,
            Self::Logout => AppEventKind::Logout,
            Self::Store(_) => AppEventKind::Store,
            Self::FixedMidashi => AppEventKind::FixedMidashi,
        }
    }

    /// Decodes a raw port message. Payloads of the unit ports are ignored.
    pub fn decode(port: &str, payload: Value) -> Result<Self, EventDecodeError> {
        let kind = AppEventKind::from_port_name(port)
            .ok_or_else(|| EventDecodeError::UnknownPort(port.to_string()))?;
        Ok(match kind {
            AppEventKind::DetectNewVersion => Self::DetectNewVersion,
            AppEventKind::Logout => Self::Logout,
            AppEventKind::FixedMidashi => Self::FixedMidashi,
            AppEventKind::Store => {
                let state = serde_json::from_value::<Option<StoredState>>(payload).map_err(
                    |source| EventDecodeError::InvalidPayload {
                        port: PORT_STORE,
                        source,
                    },
                )?;
                Self::Store(state)
            }
        })
    }
}

/// Messages the host sends into the App.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    TokenChanged(String),
    StorageChanged(StoredState),
}

impl HostEvent {
    #[must_use]
    pub fn port_name(&self) -> &'static str {
        match self {
            Self::TokenChanged(_) => PORT_ON_TOKEN_CHANGED,
            Self::StorageChanged(_) => PORT_ON_STORAGE_CHANGED,
        }
    }

    #[must_use]
    pub fn encode(&self) -> Value {
        match self {
            Self::TokenChanged(token) => Value::String(token.clone()),
            Self::StorageChanged(state) => {
                let mut object = Map::new();
                object.insert(
                    "global".to_string(),
                    state.global.clone().unwrap_or(Value::Null),
                );
                object.insert(
                    "local".to_string(),
                    state.local.clone().unwrap_or(Value::Null),
                );
                Value::Object(object)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn port_names_round_trip_through_kind() {
        for kind in AppEventKind::ALL {
            assert_eq!(AppEventKind::from_port_name(kind.port_name()), Some(kind));
        }
        assert_eq!(AppEventKind::from_port_name("onTokenChanged"), None);
    }

    #[test]
    fn unit_ports_ignore_payload() {
        let event = AppEvent::decode("logout", json!({"ignored": true})).expect("logout");
        assert_eq!(event, AppEvent::Logout);
        let event = AppEvent::decode("fixedMidashi", Value::Null).expect("fixedMidashi");
        assert_eq!(event.kind(), AppEventKind::FixedMidashi);
    }

    #[test]
    fn store_decodes_partitions() {
        let event = AppEvent::decode(
            "store",
            json!({"global": {"theme": "dark"}, "local": {"page": 3}}),
        )
        .expect("store event");
        assert_eq!(
            event,
            AppEvent::Store(Some(StoredState::new(
                Some(json!({"theme": "dark"})),
                Some(json!({"page": 3}))
            )))
        );
    }

    #[test]
    fn store_with_null_payload_requests_clear() {
        let event = AppEvent::decode("store", Value::Null).expect("store event");
        assert_eq!(event, AppEvent::Store(None));
    }

    #[test]
    fn store_with_partial_payload_defaults_missing_partition() {
        let event = AppEvent::decode("store", json!({"local": 5})).expect("store event");
        assert_eq!(
            event,
            AppEvent::Store(Some(StoredState::new(None, Some(json!(5)))))
        );
    }

    #[test]
    fn store_rejects_non_object_payload() {
        let error = AppEvent::decode("store", json!(42)).expect_err("invalid payload");
        assert!(matches!(
            error,
            EventDecodeError::InvalidPayload { port: "store", .. }
        ));
    }

    #[test]
    fn unknown_port_is_reported() {
        let error = AppEvent::decode("openDialog", Value::Null).expect_err("unknown port");
        assert!(matches!(error, EventDecodeError::UnknownPort(name) if name == "openDialog"));
    }

    #[test]
    fn host_events_encode_for_their_ports() {
        let token = HostEvent::TokenChanged("abc".to_string());
        assert_eq!(token.port_name(), "onTokenChanged");
        assert_eq!(token.encode(), json!("abc"));

        let storage = HostEvent::StorageChanged(StoredState::new(None, Some(json!({"page": 2}))));
        assert_eq!(storage.port_name(), "onStorageChanged");
        assert_eq!(storage.encode(), json!({"global": null, "local": {"page": 2}}));
    }
}
