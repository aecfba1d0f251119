use super::*;

    #[wasm_bindgen]
    extern "C" {
        #[wasm_bindgen(js_namespace = FixedMidashi, js_name = create, catch)]
        fn fixed_midashi_create() -> Result<(), JsValue>;
    }

    /// Lays out sticky table headers for whatever the App has rendered.
    pub(super) fn create_fixed_midashi() -> Result<(), JsValue> {
        fixed_midashi_create()
    }

    /// Holds a detached, already-unhidden copy of the page's `#error` fragment.
    pub(super) struct ErrorPresenter {
        fragment: Option<web_sys::Element>,
    }

    impl ErrorPresenter {
        pub(super) fn capture() -> Self {
            let fragment = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.get_element_by_id(ERROR_FRAGMENT_ID))
                .and_then(|element| element.clone_node_with_deep(true).ok())
                .and_then(|node| node.dyn_into::<web_sys::Element>().ok());

            match &fragment {
                Some(fragment) => {
                    if fragment.class_list().remove_1(HIDDEN_CLASS).is_err() {
                        tracing::warn!("failed to unhide error fragment");
                    }
                }
                None => tracing::warn!("error fragment is missing; boot failures will not be shown"),
            }
            Self { fragment }
        }

        /// Replaces the document body with the error fragment.
        pub(super) fn show(&self) {
            let Some(fragment) = &self.fragment else {
                return;
            };
            let Some(body) = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.body())
            else {
                return;
            };
            if let Err(error) = body.replace_with_with_node_1(fragment) {
                tracing::warn!(error = %js_error_message(&error), "failed to show error fragment");
            }
        }
    }

    pub(super) fn identity_script_src(document: &web_sys::Document) -> Option<String> {
        document
            .get_element_by_id(IDENTITY_SCRIPT_ID)?
            .dyn_into::<web_sys::HtmlScriptElement>()
            .ok()
            .map(|script| script.src())
            .filter(|src| !src.is_empty())
    }

    pub(super) fn read_project_info(document: &web_sys::Document) -> Result<ProjectInfo, BootError> {
        Ok(ProjectInfo {
            name: element_text(document, PROJECT_NAME_ID)?,
            company: element_text(document, PROJECT_COMPANY_ID)?,
            title: element_text(document, PROJECT_TITLE_ID)?,
            sub_title: element_text(document, PROJECT_SUB_TITLE_ID)?,
        })
    }

    fn element_text(document: &web_sys::Document, id: &'static str) -> Result<String, BootError> {
        let element = document
            .get_element_by_id(id)
            .ok_or(BootError::MissingElement(id))?;
        match element.dyn_ref::<web_sys::HtmlElement>() {
            Some(element) => Ok(element.inner_text()),
            None => Ok(element.text_content().unwrap_or_default()),
        }
    }
