pub mod config {
    use serde::Deserialize;

    #[derive(Deserialize, Debug, Clone)]
    pub struct Config {
        pub db_url: String,
        #[serde(default = "default_port")]
        pub port: u16,
        pub jwt_secret: String,
    }

    impl Config {
        /// Loads configuration from environment variables.
        pub fn from_env() -> anyhow::Result<Self> {
            let settings = config::Config::builder()
                .add_source(config::Environment::default())
                .build()?;

            let config: Config = settings.try_deserialize()?;
            Ok(config)
        }
    }

    fn default_port() -> u16 {
        8080
    }
}

pub mod analytics;
pub mod auth;
pub mod entities;
pub mod task;
pub mod user;
pub mod web;

/// Current local wall-clock time, truncated to whole seconds.
///
/// Due dates are entered and stored as naive local times, so "now" has to be
/// expressed the same way for comparisons against them to be meaningful.
pub fn local_now() -> chrono::NaiveDateTime {
    use chrono::SubsecRound;
    chrono::Local::now().naive_local().trunc_subsecs(0)
}
