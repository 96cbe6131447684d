//! The visyn global settings model.
//!
//! Every struct here pairs a serde model with its [`Model`] schema. The
//! schema is the single source of defaults; the struct is the typed view
//! of the resolved tree.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use visyn_settings_core::{Field, Model, ModelSchema, ScalarType, SchemaError, SettingsResult};

use crate::{EnvSnapshot, Resolved, SettingsLoader};

/// Lists of plugins and extensions to leave out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct DisableSettings {
    /// Plugin ids to disable.
    pub plugins: Vec<String>,

    /// Extension ids to disable.
    pub extensions: Vec<String>,
}

impl Model for DisableSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("DisableSettings")
            .field(Field::list("plugins", ScalarType::String, Vec::<String>::new()))
            .field(Field::list("extensions", ScalarType::String, Vec::<String>::new()))
            .build()
    }
}

/// Security store backed by AWS application load balancer headers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AlbSecurityStoreSettings {
    /// Enable the store.
    pub enable: bool,

    /// Cookie holding the ALB session, if any.
    pub cookie_name: Option<String>,

    /// URL to redirect to on sign out.
    pub signout_url: Option<String>,

    /// Token claims tried in order to find the user email.
    pub email_token_field: Vec<String>,

    /// Expected token audience.
    pub audience: Option<String>,

    /// Expected token issuer.
    pub issuer: Option<String>,

    /// Algorithms accepted when decoding the token.
    pub decode_algorithms: Vec<String>,
}

impl Model for AlbSecurityStoreSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("AlbSecurityStoreSettings")
            .field(Field::bool("enable", false))
            .field(Field::optional("cookie_name", ScalarType::String))
            .field(Field::optional("signout_url", ScalarType::String))
            .field(Field::list("email_token_field", ScalarType::String, ["email"]))
            .field(Field::optional("audience", ScalarType::String))
            .field(Field::optional("issuer", ScalarType::String))
            .field(Field::list("decode_algorithms", ScalarType::String, ["ES256"]))
            .build()
    }
}

/// Security store that logs everyone in as a fixed user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct NoSecurityStoreSettings {
    /// Enable the store.
    pub enable: bool,

    /// Name of the user everyone is logged in as.
    pub user: String,

    /// Roles of that user.
    pub roles: Vec<String>,
}

impl Model for NoSecurityStoreSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("NoSecurityStoreSettings")
            .field(Field::bool("enable", false))
            .field(Field::string("user", "admin"))
            .field(Field::list("roles", ScalarType::String, Vec::<String>::new()))
            .build()
    }
}

/// Available security stores.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SecurityStoreSettings {
    /// ALB header store.
    pub alb_security_store: AlbSecurityStoreSettings,

    /// Fixed-user store.
    pub no_security_store: NoSecurityStoreSettings,
}

impl Model for SecurityStoreSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("SecurityStoreSettings")
            .field(Field::model(
                "alb_security_store",
                AlbSecurityStoreSettings::schema()?,
            ))
            .field(Field::model(
                "no_security_store",
                NoSecurityStoreSettings::schema()?,
            ))
            .build()
    }
}

/// Security settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SecuritySettings {
    /// Security stores.
    pub store: SecurityStoreSettings,
}

impl Model for SecuritySettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("SecuritySettings")
            .field(Field::model("store", SecurityStoreSettings::schema()?))
            .build()
    }
}

/// Settings of the `visyn_core` package.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct VisynCoreSettings {
    /// Allow anonymous access to everything.
    pub total_anonymous: bool,

    /// Plugins to load. Empty means all.
    pub enabled_plugins: Vec<String>,

    /// Plugins and extensions to leave out.
    pub disable: DisableSettings,

    /// Security settings.
    pub security: SecuritySettings,

    /// Logging configuration in `dictConfig` layout. Open map: values set
    /// through the environment stay strings.
    pub logging: Map<String, Value>,

    /// Running under Cypress end-to-end tests.
    pub cypress: bool,
}

impl Model for VisynCoreSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("VisynCoreSettings")
            .field(Field::bool("total_anonymous", false))
            .field(Field::list("enabled_plugins", ScalarType::String, Vec::<String>::new()))
            .field(Field::model("disable", DisableSettings::schema()?))
            .field(Field::model("security", SecuritySettings::schema()?))
            .field(Field::map("logging", default_logging()))
            .field(Field::bool("cypress", false))
            .build()
    }
}

fn default_logging() -> Value {
    json!({
        "version": 1,
        "formatters": {
            "simple": {
                "format": "%(asctime)s %(levelname)s %(name)s: %(message)s",
                "datefmt": "%H:%M:%S",
            },
            "line": {
                "format": "%(asctime)s %(levelname)s %(name)s(%(pathname)s:%(lineno)s): %(message)s",
            },
        },
        "handlers": {
            "console": {
                "class": "logging.StreamHandler",
                "formatter": "line",
                "stream": "ext://sys.stdout",
            },
        },
        "root": {
            "level": "INFO",
            "handlers": ["console"],
        },
    })
}

/// Root settings of a visyn application.
///
/// # Example
///
/// ```
/// use visyn_settings::{EnvSnapshot, GlobalSettings};
///
/// # fn main() -> Result<(), visyn_settings::SettingsError> {
/// let env: EnvSnapshot = [("ENV", "development")].into_iter().collect();
/// let settings = GlobalSettings::from_env(env)?;
///
/// assert!(settings.is_development_mode());
/// assert_eq!(settings.visyn_core.logging["root"]["level"], "INFO");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GlobalSettings {
    /// Deployment environment, `production` or `development`.
    pub env: String,

    /// Key used to sign tokens and sessions.
    pub secret_key: String,

    /// Where JWTs are looked for.
    pub jwt_token_location: Vec<String>,

    /// Lifetime of an access token.
    pub jwt_expire_in_seconds: i64,

    /// Refresh tokens expiring within this window.
    pub jwt_refresh_if_expiring_in_seconds: i64,

    /// Signing algorithm.
    pub jwt_algorithm: String,

    /// Name of the access token cookie.
    pub jwt_access_cookie_name: String,

    /// Header carrying the token.
    pub jwt_header_name: String,

    /// Scheme prefix of the header value.
    pub jwt_header_type: String,

    /// Only send the cookie over HTTPS.
    pub jwt_cookie_secure: bool,

    /// `SameSite` attribute of the cookie.
    pub jwt_cookie_samesite: Option<String>,

    /// Path attribute of the cookie.
    pub jwt_access_cookie_path: String,

    /// Settings of the `visyn_core` package.
    pub visyn_core: VisynCoreSettings,
}

impl Model for GlobalSettings {
    fn schema() -> Result<ModelSchema, SchemaError> {
        ModelSchema::builder("GlobalSettings")
            .field(Field::string("env", "production"))
            .field(Field::string("secret_key", "VERY_SECRET_STUFF_T0IB84wlQrdMH8RVT28w"))
            .field(Field::list(
                "jwt_token_location",
                ScalarType::String,
                ["headers", "cookies"],
            ))
            .field(Field::int("jwt_expire_in_seconds", 24 * 60 * 60))
            .field(Field::int("jwt_refresh_if_expiring_in_seconds", 30 * 60))
            .field(Field::string("jwt_algorithm", "HS256"))
            .field(Field::string("jwt_access_cookie_name", "visyn_access_token"))
            .field(Field::string("jwt_header_name", "Authorization"))
            .field(Field::string("jwt_header_type", "Bearer"))
            .field(Field::bool("jwt_cookie_secure", false))
            .field(Field::optional("jwt_cookie_samesite", ScalarType::String).default_value("Strict"))
            .field(Field::string("jwt_access_cookie_path", "/"))
            .field(Field::model("visyn_core", VisynCoreSettings::schema()?))
            .build()
    }
}

impl GlobalSettings {
    /// Resolve from the current process environment.
    ///
    /// # Errors
    ///
    /// See [`SettingsLoader::load`].
    pub fn load() -> SettingsResult<Resolved<Self>> {
        SettingsLoader::<Self>::new().with_process_env().load()
    }

    /// Resolve from an explicit environment snapshot.
    ///
    /// # Errors
    ///
    /// See [`SettingsLoader::load`].
    pub fn from_env(env: EnvSnapshot) -> SettingsResult<Resolved<Self>> {
        SettingsLoader::<Self>::new().with_env(env).load()
    }

    /// Returns `true` when running in a development environment.
    pub fn is_development_mode(&self) -> bool {
        self.env.starts_with("dev")
    }
}
