use super::*;

    /// Walks `window.<entry point path>` and calls its `init({ flags })`.
    pub(super) fn construct_app(
        window: &web_sys::Window,
        entry_point: &[String],
        flags: &AppFlags,
    ) -> Result<JsValue, BootError> {
        let path = entry_point.join(".");
        let mut module: JsValue = window.clone().into();
        for segment in entry_point {
            module = js_sys::Reflect::get(&module, &JsValue::from_str(segment))
                .map_err(|error| BootError::js("failed to resolve app entry point", &error))?;
            if module.is_undefined() || module.is_null() {
                return Err(BootError::MissingEntryPoint(path));
            }
        }

        let init = js_sys::Reflect::get(&module, &JsValue::from_str(APP_INIT_FUNCTION))
            .ok()
            .and_then(|init| init.dyn_into::<js_sys::Function>().ok())
            .ok_or_else(|| BootError::MissingEntryPoint(format!("{path}.{APP_INIT_FUNCTION}")))?;

        let flags = to_js_value(flags).map_err(|error| BootError::Js {
            context: "failed to encode app flags",
            message: error.to_string(),
        })?;
        let options = js_sys::Object::new();
        js_sys::Reflect::set(&options, &JsValue::from_str(APP_FLAGS_PROPERTY), &flags)
            .map_err(|error| BootError::js("failed to build app options", &error))?;

        tracing::debug!(entry_point = %path, "constructing app");
        init.call1(&module, &options)
            .map_err(|error| BootError::js("app init failed", &error))
    }
