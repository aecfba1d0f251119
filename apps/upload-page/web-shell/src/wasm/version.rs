use super::*;

    #[wasm_bindgen]
    extern "C" {
        type VersionDetector;

        #[wasm_bindgen(js_name = GettoDetect, catch)]
        fn create_version_detector(options: &JsValue) -> Result<VersionDetector, JsValue>;

        #[wasm_bindgen(method, catch)]
        fn from_current_version(
            this: &VersionDetector,
            version: &str,
            on_path: &js_sys::Function,
        ) -> Result<(), JsValue>;
    }

    pub(super) struct BrowserNavigator;

    impl Navigator for BrowserNavigator {
        fn navigate(&self, href: &str) {
            let Some(window) = web_sys::window() else {
                return;
            };
            if let Err(error) = window.location().set_href(href) {
                tracing::warn!(href, error = %js_error_message(&error), "navigation failed");
            }
        }
    }

    /// The page-global `version` the deployment stamps into each published copy.
    pub(super) fn loaded_version_from_window() -> Option<String> {
        let window = web_sys::window()?;
        js_sys::Reflect::get(&window, &JsValue::from_str(LOADED_VERSION_GLOBAL))
            .ok()?
            .as_string()
            .filter(|version| !version.trim().is_empty())
    }

    /// Asks the version detector for the latest published version and navigates to the
    /// path it reports when that differs from the loaded version.
    pub(super) fn redirect_to_latest(gate: &VersionGate) {
        let lookup = Rc::new(VersionLookup::new(gate.clone(), current_query()));

        let version_to_path = {
            let lookup = Rc::clone(&lookup);
            Closure::<dyn FnMut(String) -> String>::new(move |version: String| {
                lookup.path_for(&version)
            })
            .into_js_value()
        };

        let options = js_sys::Object::new();
        if let Err(error) = js_sys::Reflect::set(
            &options,
            &JsValue::from_str(VERSION_TO_PATH_PROPERTY),
            &version_to_path,
        ) {
            tracing::warn!(error = %js_error_message(&error), "failed to build version detector options");
            return;
        }
        let detector = match create_version_detector(&options) {
            Ok(detector) => detector,
            Err(error) => {
                tracing::warn!(error = %js_error_message(&error), "version detector is unavailable");
                return;
            }
        };

        let on_path = Closure::<dyn FnMut(JsValue)>::new(move |path: JsValue| {
            let Some(path) = path.as_string() else {
                tracing::debug!("version detector found no newer version");
                return;
            };
            lookup.redirect_to(&path, &BrowserNavigator);
        })
        .into_js_value();

        if let Err(error) =
            detector.from_current_version(gate.current_version(), on_path.unchecked_ref())
        {
            tracing::warn!(error = %js_error_message(&error), "version check failed");
        }
    }
