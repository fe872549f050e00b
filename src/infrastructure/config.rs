use crate::domain::glucose::GlucoseUnit;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    pub store: StoreSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub host: String,
    pub token: String,
    pub record_type: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultsConfig {
    pub defaults: RunDefaults,
}

/// Prefills for run and sample requests that leave fields out.
#[derive(Debug, Deserialize, Clone)]
pub struct RunDefaults {
    pub min_value: f64,
    pub max_value: f64,
    pub step: f64,
    pub interval_seconds: f64,
    pub unit: GlucoseUnit,
    /// Window length used when a run request carries no explicit times;
    /// the window then ends at the current instant.
    pub window_minutes: i64,
}

pub fn load_store_config() -> anyhow::Result<StoreConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/store"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

pub fn load_run_defaults() -> anyhow::Result<DefaultsConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/defaults"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize_from_toml() {
        let raw = r#"
[defaults]
min_value = 72.0
max_value = 140.0
step = 1.0
interval_seconds = 300.0
unit = "mg/dL"
window_minutes = 5
"#;
        let parsed: DefaultsConfig = toml::from_str(raw).unwrap();

        assert_eq!(parsed.defaults.unit, GlucoseUnit::MgDl);
        assert_eq!(parsed.defaults.min_value, 72.0);
        assert_eq!(parsed.defaults.window_minutes, 5);
    }

    #[test]
    fn test_store_settings_deserialize_from_toml() {
        let raw = r#"
[store]
host = "http://localhost:8087/"
token = "dev-token"
record_type = "blood_glucose"
"#;
        let parsed: StoreConfig = toml::from_str(raw).unwrap();

        assert_eq!(parsed.store.record_type, "blood_glucose");
    }
}
