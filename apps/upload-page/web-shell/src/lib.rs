#![allow(clippy::needless_pass_by_value)]

#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;

    use gloo_timers::future::sleep;
    use serde::Serialize;
    use upload_page_core::bridge::MessageBridge;
    use upload_page_core::config::BootConfig;
    use upload_page_core::diagnostics::{
        BootDiagnostics, PHASE_AUTHENTICATING, PHASE_BOOTING, PHASE_IDLE, PHASE_READY,
    };
    use upload_page_core::dispatch::{DeferredOutbox, HostCommand, route_app_event};
    use upload_page_core::events::{AppEvent, AppEventKind, HostEvent};
    use upload_page_core::flags::{AppFlags, ProjectInfo};
    use upload_page_core::session::{SessionManager, SessionStats};
    use upload_page_core::storage::{PersistentStore, StorageChange};
    use upload_page_core::version::{Navigator, VersionGate, VersionLookup};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;

    use crate::wasm_constants::*;

    mod app;
    mod dom;
    mod error;
    mod identity;
    mod lifecycle;
    mod ports;
    mod storage;
    mod version;

    use app::construct_app;
    use dom::{ErrorPresenter, create_fixed_midashi, identity_script_src, read_project_info};
    use error::BootError;
    use identity::KeycloakProvider;
    use lifecycle::*;
    use ports::ElmPorts;
    use storage::{LocalStorage, install_change_listener};
    use version::{loaded_version_from_window, redirect_to_latest};

    thread_local! {
        static DIAGNOSTICS: RefCell<BootDiagnostics> = RefCell::new(BootDiagnostics::default());
    }

    /// Everything the page keeps alive after boot. Port and storage listeners hold an
    /// `Rc` to it.
    struct PageHost {
        session: SessionManager<KeycloakProvider>,
        storage: PersistentStore<LocalStorage>,
        version_gate: Option<VersionGate>,
        bridge: MessageBridge<ElmPorts>,
        outbox: DeferredOutbox,
    }

    #[wasm_bindgen]
    pub struct PageHandle {
        app: JsValue,
        host: Rc<PageHost>,
    }

    #[wasm_bindgen]
    impl PageHandle {
        /// The constructed App instance.
        #[wasm_bindgen(getter)]
        pub fn app(&self) -> JsValue {
            self.app.clone()
        }

        pub fn access_token(&self) -> Option<String> {
            self.host.session.access_token()
        }
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
        set_boot_phase(PHASE_IDLE, "page shell loaded; waiting for boot");
    }

    /// Boots the page described by `config` (`{ path, page, ... }`).
    #[wasm_bindgen]
    pub async fn boot(config: JsValue) -> Result<PageHandle, JsValue> {
        // The fragment must be cloned before the App takes over the body.
        let presenter = ErrorPresenter::capture();
        let result = match serde_wasm_bindgen::from_value::<BootConfig>(config) {
            Ok(config) => boot_page(config).await,
            Err(error) => Err(BootError::InvalidConfig(error.to_string())),
        };
        result.map_err(|error| fail_boot(&presenter, &error))
    }

    /// Boots from the page-global `config` object.
    #[wasm_bindgen]
    pub async fn boot_from_window() -> Result<PageHandle, JsValue> {
        let config = web_sys::window()
            .and_then(|window| {
                js_sys::Reflect::get(&window, &JsValue::from_str(LEGACY_CONFIG_GLOBAL)).ok()
            })
            .unwrap_or(JsValue::UNDEFINED);
        boot(config).await
    }

    #[wasm_bindgen]
    pub fn boot_diagnostics_json() -> String {
        DIAGNOSTICS.with(|state| state.borrow().to_json())
    }

    async fn boot_page(config: BootConfig) -> Result<PageHandle, BootError> {
        set_boot_phase(PHASE_BOOTING, "resolving page config");
        let page = config.page_config()?;
        let policy = config.refresh_policy()?;
        record_route_path(page.route_path());

        let window = web_sys::window().ok_or(BootError::Unavailable("window"))?;
        let document = window
            .document()
            .ok_or(BootError::Unavailable("document"))?;

        let identity = config.identity_config(identity_script_src(&document).as_deref())?;
        let session = SessionManager::new(KeycloakProvider::new(&identity)?, policy);

        set_boot_phase(PHASE_AUTHENTICATING, "waiting for identity provider login");
        let token = session.init().await?;

        set_boot_phase(PHASE_BOOTING, "constructing app");
        let storage = PersistentStore::new(
            LocalStorage::from_window(&window)?,
            config.storage_key(),
            &page,
        );
        let flags = AppFlags {
            token: token.clone(),
            storage: storage.load()?,
            project: read_project_info(&document)?,
        };
        let app = construct_app(&window, &page.entry_point_path(config.app_namespace()), &flags)?;

        let version_gate = config
            .current_version()
            .map(ToString::to_string)
            .or_else(loaded_version_from_window)
            .map(|current| VersionGate::new(&page, current));
        if version_gate.is_none() {
            tracing::warn!("loaded version is unknown; version checks are disabled");
        }

        let host = Rc::new(PageHost {
            session,
            storage,
            version_gate,
            bridge: MessageBridge::new(ElmPorts::new(app.clone())),
            outbox: DeferredOutbox::default(),
        });

        wire_app_events(&host);
        install_change_listener(&window, &host)?;
        host.bridge.publish(&HostEvent::TokenChanged(token));
        start_token_refresh(&host);

        set_boot_phase(PHASE_READY, "app constructed and ports wired");
        Ok(PageHandle { app, host })
    }

    fn fail_boot(presenter: &ErrorPresenter, error: &BootError) -> JsValue {
        let message = error.to_string();
        tracing::error!(error = %message, "page boot failed");
        set_boot_error(&message);
        presenter.show();
        js_sys::Error::new(&message).into()
    }

    fn wire_app_events(host: &Rc<PageHost>) {
        for kind in AppEventKind::ALL {
            let handler_host = Rc::clone(host);
            host.bridge
                .subscribe(kind, move |event| handle_app_event(&handler_host, event));
        }
    }

    fn handle_app_event(host: &Rc<PageHost>, event: AppEvent) {
        let port = event.kind().port_name();
        match route_app_event(event, &host.storage) {
            Ok(command) => execute_command(host, command),
            Err(error) => {
                tracing::warn!(port, error = %error, "app event rejected");
                record_last_error(&error.to_string());
            }
        }
    }

    fn execute_command(host: &Rc<PageHost>, command: HostCommand) {
        match command {
            HostCommand::RedirectToLatestVersion => match &host.version_gate {
                Some(gate) => redirect_to_latest(gate),
                None => tracing::debug!("skipping version check without a loaded version"),
            },
            HostCommand::Logout => host.session.logout(),
            HostCommand::NotifyAfterCurrentTurn(event) => notify_after_current_turn(host, event),
            HostCommand::ScheduleStickyHeaderLayout { delay } => spawn_local(async move {
                sleep(delay).await;
                if let Err(error) = create_fixed_midashi() {
                    tracing::warn!(error = %js_error_message(&error), "sticky header layout failed");
                }
            }),
        }
    }

    fn notify_after_current_turn(host: &Rc<PageHost>, event: HostEvent) {
        if !host.outbox.push(event) {
            return;
        }
        let host = Rc::clone(host);
        spawn_local(async move {
            for event in host.outbox.drain() {
                host.bridge.publish(&event);
            }
        });
    }

    fn start_token_refresh(host: &Rc<PageHost>) {
        let host = Rc::clone(host);
        spawn_local(async move {
            let publisher = Rc::clone(&host);
            host.session
                .keep_fresh(
                    |interval| {
                        record_session_stats(host.session.stats());
                        sleep(interval)
                    },
                    move |token| publisher.bridge.publish(&HostEvent::TokenChanged(token)),
                )
                .await;
        });
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{PageHandle, boot, boot_diagnostics_json, boot_from_window};

#[cfg(not(target_arch = "wasm32"))]
pub fn boot_diagnostics_json() -> String {
    "{\"phase\":\"native\",\"detail\":\"page shell diagnostics only available on wasm\"}"
        .to_string()
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;

    #[test]
    fn native_diagnostics_report_native_phase() {
        let value: serde_json::Value =
            serde_json::from_str(&boot_diagnostics_json()).expect("diagnostics json");
        assert_eq!(value["phase"], "native");
    }
}
