use config::{Config as Cfg, ConfigError, Environment, File};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const ENV_PREFIX: &str = "APP";

/// Load layered settings: `base.yaml` from `directory` (optional), then
/// `APP_`-prefixed environment variables using `__` as the nesting separator.
pub fn load_settings<T: DeserializeOwned>(directory: &Path) -> Result<T, ConfigError> {
    dotenvy::dotenv().ok();

    let settings = Cfg::builder()
        .add_source(File::from(directory.join("base.yaml")).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<T>()
}
