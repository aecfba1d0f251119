use serde_json::Value;

use crate::events::{AppEvent, AppEventKind, HostEvent};

/// Raw access to the ports a constructed App exposes.
///
/// Both methods return `false` when the App build has no port of that name.
pub trait AppPorts {
    fn subscribe_port(&self, name: &str, handler: Box<dyn FnMut(Value)>) -> bool;
    fn send_port(&self, name: &str, payload: Value) -> bool;
}

/// Typed adapter over [`AppPorts`]. Missing ports are tolerated here and nowhere else.
pub struct MessageBridge<P> {
    ports: P,
}

impl<P: AppPorts> MessageBridge<P> {
    pub fn new(ports: P) -> Self {
        Self { ports }
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }

    /// Registers `handler` for events the App emits on `kind`'s port. Messages that do
    /// not decode are logged and dropped.
    pub fn subscribe<F>(&self, kind: AppEventKind, mut handler: F)
    where
        F: FnMut(AppEvent) + 'static,
    {
        let port = kind.port_name();
        let attached = self.ports.subscribe_port(
            port,
            Box::new(move |payload| match AppEvent::decode(port, payload) {
                Ok(event) => handler(event),
                Err(error) => {
                    tracing::warn!(port, error = %error, "dropping undecodable app message");
                }
            }),
        );
        if !attached {
            tracing::debug!(port, "app does not expose port; subscription skipped");
        }
    }

    pub fn publish(&self, event: &HostEvent) {
        let port = event.port_name();
        if !self.ports.send_port(port, event.encode()) {
            tracing::debug!(port, "app does not expose port; message dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use serde_json::json;

    use super::*;
    use crate::storage::StoredState;

    type Handlers = Vec<Box<dyn FnMut(Value)>>;

    /// In-memory App exposing a fixed set of ports.
    #[derive(Default)]
    struct FakePorts {
        exposed: Vec<&'static str>,
        handlers: RefCell<HashMap<String, Handlers>>,
        sent: RefCell<Vec<(String, Value)>>,
    }

    impl FakePorts {
        fn exposing(exposed: &[&'static str]) -> Self {
            Self {
                exposed: exposed.to_vec(),
                ..Self::default()
            }
        }

        fn exposes(&self, name: &str) -> bool {
            self.exposed.iter().any(|exposed| *exposed == name)
        }

        fn emit(&self, name: &str, payload: Value) {
            let mut handlers = self.handlers.borrow_mut();
            if let Some(handlers) = handlers.get_mut(name) {
                for handler in handlers.iter_mut() {
                    handler(payload.clone());
                }
            }
        }
    }

    impl AppPorts for FakePorts {
        fn subscribe_port(&self, name: &str, handler: Box<dyn FnMut(Value)>) -> bool {
            if !self.exposes(name) {
                return false;
            }
            self.handlers
                .borrow_mut()
                .entry(name.to_string())
                .or_default()
                .push(handler);
            true
        }

        fn send_port(&self, name: &str, payload: Value) -> bool {
            if !self.exposes(name) {
                return false;
            }
            self.sent.borrow_mut().push((name.to_string(), payload));
            true
        }
    }

    #[test]
    fn subscribe_delivers_decoded_events() {
        let bridge = MessageBridge::new(FakePorts::exposing(&["store"]));
        let received = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&received);
        bridge.subscribe(AppEventKind::Store, move |event| sink.borrow_mut().push(event));

        bridge
            .ports()
            .emit("store", json!({"global": 1, "local": null}));

        assert_eq!(
            *received.borrow(),
            vec![AppEvent::Store(Some(StoredState::new(Some(json!(1)), None)))]
        );
    }

    #[test]
    fn handlers_fire_in_registration_order() {
        let bridge = MessageBridge::new(FakePorts::exposing(&["logout"]));
        let order = Rc::new(RefCell::new(Vec::new()));
        for label in ["first", "second"] {
            let order = Rc::clone(&order);
            bridge.subscribe(AppEventKind::Logout, move |_| order.borrow_mut().push(label));
        }

        bridge.ports().emit("logout", Value::Null);

        assert_eq!(*order.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn undecodable_messages_are_dropped() {
        let bridge = MessageBridge::new(FakePorts::exposing(&["store"]));
        let received = Rc::new(RefCell::new(0_usize));
        let sink = Rc::clone(&received);
        bridge.subscribe(AppEventKind::Store, move |_| *sink.borrow_mut() += 1);

        bridge.ports().emit("store", json!("not a state"));

        assert_eq!(*received.borrow(), 0);
    }

    #[test]
    fn missing_ports_are_silent_no_ops() {
        let bridge = MessageBridge::new(FakePorts::exposing(&[]));
        bridge.subscribe(AppEventKind::FixedMidashi, |_| {});
        bridge.publish(&HostEvent::TokenChanged("token".to_string()));

        assert!(bridge.ports().handlers.borrow().is_empty());
        assert!(bridge.ports().sent.borrow().is_empty());
    }

    #[test]
    fn publish_sends_encoded_payload() {
        let bridge = MessageBridge::new(FakePorts::exposing(&["onTokenChanged", "onStorageChanged"]));
        bridge.publish(&HostEvent::TokenChanged("t-1".to_string()));
        bridge.publish(&HostEvent::StorageChanged(StoredState::empty()));

        assert_eq!(
            *bridge.ports().sent.borrow(),
            vec![
                ("onTokenChanged".to_string(), json!("t-1")),
                (
                    "onStorageChanged".to_string(),
                    json!({"global": null, "local": null})
                ),
            ]
        );
    }
}
