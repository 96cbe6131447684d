//! Property tests for settings resolution.

use proptest::prelude::*;
use serde_json::json;
use visyn_settings::{EnvSnapshot, GlobalSettings};

const VARS: [(&str, &str); 6] = [
    ("SECRET_KEY", "Custom_Secret_Key"),
    ("visyn_core__SECURITY__STORE__ALB_SECURITY_STORE__ENABLE", "True"),
    ("visyn_core__LOGGING__VERSION", "2"),
    ("visyn_core__LOGGING__ROOT__LEVEL", "DEBUG"),
    ("JWT_EXPIRE_IN_SECONDS", "60"),
    ("PATH", "/usr/bin"),
];

proptest! {
    #[test]
    fn resolution_ignores_provider_order(vars in Just(VARS.to_vec()).prop_shuffle()) {
        let shuffled: EnvSnapshot = vars.into_iter().collect();
        let ordered: EnvSnapshot = VARS.into_iter().collect();

        prop_assert_eq!(
            GlobalSettings::from_env(shuffled).unwrap(),
            GlobalSettings::from_env(ordered).unwrap()
        );
    }

    #[test]
    fn typed_int_override_is_coerced(value in any::<i64>()) {
        let env: EnvSnapshot = [("JWT_EXPIRE_IN_SECONDS", value.to_string())].into_iter().collect();
        let settings = GlobalSettings::from_env(env).unwrap();

        prop_assert_eq!(settings.jwt_expire_in_seconds, value);
        prop_assert_eq!(settings.get_nested("jwt_expire_in_seconds").unwrap(), &json!(value));
    }

    #[test]
    fn map_override_stays_raw(value in "[ -~]{0,16}") {
        let env: EnvSnapshot = [("VISYN_CORE__LOGGING__VERSION", value.clone())].into_iter().collect();
        let settings = GlobalSettings::from_env(env).unwrap();

        prop_assert_eq!(&settings.visyn_core.logging["version"], &json!(value));
        prop_assert_eq!(settings.get_nested("visyn_core.logging.version").unwrap(), &json!(value));
    }

    #[test]
    fn string_override_is_verbatim(value in "\\PC*") {
        let env: EnvSnapshot = [("SECRET_KEY", value.clone())].into_iter().collect();
        let settings = GlobalSettings::from_env(env).unwrap();

        prop_assert_eq!(&settings.secret_key, &value);
    }
}
