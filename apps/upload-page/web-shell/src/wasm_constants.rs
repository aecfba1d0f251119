pub(crate) const ERROR_FRAGMENT_ID: &str = "error";
pub(crate) const HIDDEN_CLASS: &str = "display-none";
pub(crate) const IDENTITY_SCRIPT_ID: &str = "keycloak";
pub(crate) const PROJECT_NAME_ID: &str = "project";
pub(crate) const PROJECT_COMPANY_ID: &str = "company";
pub(crate) const PROJECT_TITLE_ID: &str = "title";
pub(crate) const PROJECT_SUB_TITLE_ID: &str = "sub-title";
pub(crate) const LEGACY_CONFIG_GLOBAL: &str = "config";
pub(crate) const LOADED_VERSION_GLOBAL: &str = "version";
pub(crate) const APP_PORTS_PROPERTY: &str = "ports";
pub(crate) const APP_INIT_FUNCTION: &str = "init";
pub(crate) const APP_FLAGS_PROPERTY: &str = "flags";
pub(crate) const VERSION_TO_PATH_PROPERTY: &str = "version_to_path";
pub(crate) const STORAGE_EVENT: &str = "storage";
pub(crate) const IDENTITY_ON_LOAD: &str = "login-required";
