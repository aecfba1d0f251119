use super::*;

    use upload_page_core::config::ConfigError;
    use upload_page_core::session::SessionError;
    use upload_page_core::storage::StorageError;

    #[derive(Debug, thiserror::Error)]
    pub(super) enum BootError {
        #[error("invalid boot config: {0}")]
        InvalidConfig(String),
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error(transparent)]
        Session(#[from] SessionError),
        #[error(transparent)]
        Storage(#[from] StorageError),
        #[error("{0} is unavailable")]
        Unavailable(&'static str),
        #[error("element #{0} is missing")]
        MissingElement(&'static str),
        #[error("app entry point {0} is missing")]
        MissingEntryPoint(String),
        #[error("{context}: {message}")]
        Js {
            context: &'static str,
            message: String,
        },
    }

    impl BootError {
        pub(super) fn js(context: &'static str, error: &JsValue) -> Self {
            Self::Js {
                context,
                message: js_error_message(error),
            }
        }
    }
