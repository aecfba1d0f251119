use super::*;

    pub(super) fn set_boot_phase(phase: &str, detail: &str) {
        DIAGNOSTICS.with(|state| state.borrow_mut().set_phase(phase, detail));
        tracing::info!(phase, detail, "boot phase");
    }

    pub(super) fn set_boot_error(message: &str) {
        DIAGNOSTICS.with(|state| state.borrow_mut().set_error(message));
    }

    pub(super) fn record_last_error(message: &str) {
        DIAGNOSTICS.with(|state| state.borrow_mut().last_error = Some(message.to_string()));
    }

    pub(super) fn record_route_path(route_path: &str) {
        DIAGNOSTICS.with(|state| state.borrow_mut().route_path = Some(route_path.to_string()));
    }

    pub(super) fn record_session_stats(stats: SessionStats) {
        DIAGNOSTICS.with(|state| state.borrow_mut().session = stats);
    }

    pub(super) fn record_storage_notification(delivered: bool) {
        DIAGNOSTICS.with(|state| state.borrow_mut().record_storage_notification(delivered));
    }

    /// `location.search` of the current page, empty when unavailable.
    pub(super) fn current_query() -> String {
        web_sys::window()
            .and_then(|window| window.location().search().ok())
            .unwrap_or_default()
    }

    pub(super) fn js_error_message(error: &JsValue) -> String {
        if let Some(error) = error.dyn_ref::<js_sys::Error>() {
            return String::from(error.message());
        }
        if let Some(message) = error.as_string() {
            return message;
        }
        if error.is_undefined() || error.is_null() {
            return "unknown error".to_string();
        }
        format!("{error:?}")
    }

    /// Plain-object conversion: maps become objects and `None` becomes `null`.
    pub(super) fn to_js_value<T: Serialize + ?Sized>(
        value: &T,
    ) -> Result<JsValue, serde_wasm_bindgen::Error> {
        value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
    }
