use super::*;

    use upload_page_core::bridge::AppPorts;

    /// `app.ports.<name>.subscribe/send` on a constructed App.
    pub(super) struct ElmPorts {
        app: JsValue,
    }

    impl ElmPorts {
        pub(super) fn new(app: JsValue) -> Self {
            Self { app }
        }

        /// The port object and the named function on it, when the App declares both.
        fn port_function(&self, name: &str, function: &str) -> Option<(JsValue, js_sys::Function)> {
            let ports = present(js_sys::Reflect::get(&self.app, &JsValue::from_str(APP_PORTS_PROPERTY)).ok()?)?;
            let port = present(js_sys::Reflect::get(&ports, &JsValue::from_str(name)).ok()?)?;
            let function = js_sys::Reflect::get(&port, &JsValue::from_str(function))
                .ok()?
                .dyn_into::<js_sys::Function>()
                .ok()?;
            Some((port, function))
        }
    }

    fn present(value: JsValue) -> Option<JsValue> {
        (!value.is_undefined() && !value.is_null()).then_some(value)
    }

    impl AppPorts for ElmPorts {
        fn subscribe_port(&self, name: &str, mut handler: Box<dyn FnMut(serde_json::Value)>) -> bool {
            let Some((port, subscribe)) = self.port_function(name, "subscribe") else {
                return false;
            };

            let port_name = name.to_string();
            let callback = Closure::<dyn FnMut(JsValue)>::new(move |payload: JsValue| {
                match serde_wasm_bindgen::from_value::<serde_json::Value>(payload) {
                    Ok(payload) => handler(payload),
                    Err(error) => {
                        tracing::warn!(port = %port_name, error = %error, "dropping non-json app message");
                    }
                }
            })
            .into_js_value();

            if let Err(error) = subscribe.call1(&port, &callback) {
                tracing::warn!(port = name, error = %js_error_message(&error), "port subscription failed");
            }
            true
        }

        fn send_port(&self, name: &str, payload: serde_json::Value) -> bool {
            let Some((port, send)) = self.port_function(name, "send") else {
                return false;
            };

            match to_js_value(&payload) {
                Ok(payload) => {
                    if let Err(error) = send.call1(&port, &payload) {
                        tracing::warn!(port = name, error = %js_error_message(&error), "port send failed");
                    }
                }
                Err(error) => {
                    tracing::warn!(port = name, error = %error, "failed to encode port payload");
                }
            }
            true
        }
    }
