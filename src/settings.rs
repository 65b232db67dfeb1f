use clap::ValueEnum;
use config::Config;
use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Tsv,
    Table,
}

/// Defaults read from `ASIGNACION_*` environment variables. Command-line
/// flags win over these.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub periodo: Option<String>,
    pub format: Option<OutputFormat>,
}

impl Settings {
    pub fn load() -> Settings {
        Self::from_config(
            Config::builder()
                .add_source(config::Environment::with_prefix("ASIGNACION"))
                .build()
                .unwrap_or_default(),
        )
    }

    fn from_config(config: Config) -> Settings {
        let settings = match config.try_deserialize::<Settings>() {
            Ok(settings) => settings,
            Err(err) => {
                warn!(error = %err, "ignoring malformed ASIGNACION_* settings");
                Settings::default()
            }
        };
        info!(settings_loaded = ?settings, msg = "settings");
        settings
    }
}
