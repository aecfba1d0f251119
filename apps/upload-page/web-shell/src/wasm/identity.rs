use super::*;

    use async_trait::async_trait;
    use futures::channel::oneshot;
    use upload_page_core::config::IdentityConfig;
    use upload_page_core::session::{IdentityProvider, TokenRefresh};

    #[wasm_bindgen]
    extern "C" {
        type KeycloakClient;

        #[wasm_bindgen(js_name = Keycloak, catch)]
        fn create_keycloak(options: &JsValue) -> Result<KeycloakClient, JsValue>;

        #[wasm_bindgen(method)]
        fn init(this: &KeycloakClient, options: &JsValue) -> KeycloakPromise;

        #[wasm_bindgen(method, js_name = updateToken)]
        fn update_token(this: &KeycloakClient, min_validity: u32) -> KeycloakPromise;

        #[wasm_bindgen(method, js_name = clearToken)]
        fn clear_token(this: &KeycloakClient);

        #[wasm_bindgen(method)]
        fn logout(this: &KeycloakClient);

        #[wasm_bindgen(method, getter)]
        fn token(this: &KeycloakClient) -> Option<String>;

        type KeycloakPromise;

        #[wasm_bindgen(method)]
        fn success(this: &KeycloakPromise, callback: &js_sys::Function) -> KeycloakPromise;

        #[wasm_bindgen(method)]
        fn error(this: &KeycloakPromise, callback: &js_sys::Function) -> KeycloakPromise;
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct KeycloakOptions<'a> {
        url: &'a str,
        realm: &'a str,
        client_id: &'a str,
    }

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct KeycloakInitOptions {
        on_load: &'static str,
        check_login_iframe: bool,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    pub(super) struct IdentityError(String);

    /// Keycloak adapter loaded by the page's `#keycloak` script.
    pub(super) struct KeycloakProvider {
        client: KeycloakClient,
    }

    impl KeycloakProvider {
        pub(super) fn new(config: &IdentityConfig) -> Result<Self, BootError> {
            let options = to_js_value(&KeycloakOptions {
                url: &config.url,
                realm: &config.realm,
                client_id: &config.client_id,
            })
            .map_err(|error| BootError::Js {
                context: "failed to encode identity options",
                message: error.to_string(),
            })?;
            let client = create_keycloak(&options)
                .map_err(|error| BootError::js("identity provider is unavailable", &error))?;
            Ok(Self { client })
        }

        fn current_token(&self) -> Result<String, IdentityError> {
            self.client
                .token()
                .filter(|token| !token.is_empty())
                .ok_or_else(|| IdentityError("identity provider returned no token".to_string()))
        }
    }

    #[async_trait(?Send)]
    impl IdentityProvider for KeycloakProvider {
        type Error = IdentityError;

        async fn login(&self) -> Result<String, Self::Error> {
            let options = to_js_value(&KeycloakInitOptions {
                on_load: IDENTITY_ON_LOAD,
                check_login_iframe: false,
            })
            .map_err(|error| IdentityError(error.to_string()))?;
            let authenticated = settle(self.client.init(&options)).await?;
            if authenticated.as_bool() == Some(false) {
                return Err(IdentityError(
                    "identity provider did not authenticate".to_string(),
                ));
            }
            self.current_token()
        }

        async fn update_token(&self, min_validity_seconds: u32) -> Result<TokenRefresh, Self::Error> {
            let refreshed = settle(self.client.update_token(min_validity_seconds)).await?;
            Ok(TokenRefresh {
                refreshed: refreshed.as_bool().unwrap_or(false),
                token: self.current_token()?,
            })
        }

        fn clear_token(&self) {
            self.client.clear_token();
        }

        fn logout(&self) {
            self.client.logout();
        }
    }

    /// Waits for whichever of the adapter's `success`/`error` callbacks fires first.
    async fn settle(promise: KeycloakPromise) -> Result<JsValue, IdentityError> {
        let (sender, receiver) = oneshot::channel::<Result<JsValue, JsValue>>();
        let sender = Rc::new(RefCell::new(Some(sender)));

        let on_success = {
            let sender = Rc::clone(&sender);
            Closure::once_into_js(move |value: JsValue| {
                if let Some(sender) = sender.borrow_mut().take() {
                    let _ = sender.send(Ok(value));
                }
            })
        };
        let on_error = Closure::once_into_js(move |error: JsValue| {
            if let Some(sender) = sender.borrow_mut().take() {
                let _ = sender.send(Err(error));
            }
        });

        promise
            .success(on_success.unchecked_ref())
            .error(on_error.unchecked_ref());

        match receiver.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(error)) => Err(IdentityError(js_error_message(&error))),
            Err(_) => Err(IdentityError(
                "identity provider dropped its callbacks".to_string(),
            )),
        }
    }
