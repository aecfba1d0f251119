use super::*;

    use upload_page_core::storage::KeyValueStore;

    /// The origin's `window.localStorage`.
    pub(super) struct LocalStorage {
        storage: web_sys::Storage,
    }

    impl LocalStorage {
        pub(super) fn from_window(window: &web_sys::Window) -> Result<Self, BootError> {
            let storage = window
                .local_storage()
                .map_err(|error| BootError::js("local storage is not accessible", &error))?
                .ok_or(BootError::Unavailable("local storage"))?;
            Ok(Self { storage })
        }

        fn is_area(&self, area: &web_sys::Storage) -> bool {
            let area: &JsValue = area.as_ref();
            let own: &JsValue = self.storage.as_ref();
            area == own
        }
    }

    impl KeyValueStore for LocalStorage {
        type Error = String;

        fn get_item(&self, key: &str) -> Result<Option<String>, Self::Error> {
            self.storage
                .get_item(key)
                .map_err(|error| js_error_message(&error))
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), Self::Error> {
            self.storage
                .set_item(key, value)
                .map_err(|error| js_error_message(&error))
        }

        fn remove_item(&self, key: &str) -> Result<(), Self::Error> {
            self.storage
                .remove_item(key)
                .map_err(|error| js_error_message(&error))
        }
    }

    /// Forwards `storage` events raised by other tabs to the App.
    pub(super) fn install_change_listener(
        window: &web_sys::Window,
        host: &Rc<PageHost>,
    ) -> Result<(), BootError> {
        let host = Rc::clone(host);
        let listener = Closure::<dyn FnMut(web_sys::StorageEvent)>::new(
            move |event: web_sys::StorageEvent| {
                let key = event.key();
                let new_value = event.new_value();
                let same_area = event
                    .storage_area()
                    .is_some_and(|area| host.storage.backend().is_area(&area));
                let change = StorageChange {
                    same_area,
                    key: key.as_deref(),
                    new_value: new_value.as_deref(),
                };

                match host.storage.project_change(&change) {
                    Ok(Some(state)) => {
                        record_storage_notification(true);
                        host.bridge.publish(&HostEvent::StorageChanged(state));
                    }
                    Ok(None) => {}
                    Err(error) => {
                        record_storage_notification(false);
                        tracing::warn!(error = %error, "ignoring unreadable storage change");
                    }
                }
            },
        )
        .into_js_value();

        window
            .add_event_listener_with_callback(STORAGE_EVENT, listener.unchecked_ref())
            .map_err(|error| BootError::js("failed to observe storage changes", &error))
    }
