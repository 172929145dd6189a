use crate::common::Result;

#[derive(Clone, serde::Deserialize)]
pub struct Config {
    pub digitalocean: crate::digitalocean::Config,

    #[serde(default)]
    pub sync: crate::service::Config,
}

impl Config {
    /// Loads `DIGITALOCEAN_*` and `DOZONE_*` environment variables, e.g.
    /// `DIGITALOCEAN_ACCESS_TOKEN` and `DOZONE_REPLACE_CNAMES`.
    #[cfg(feature = "cli")]
    pub fn from_env() -> Result<Self> {
        use crate::common::ConfigSnafu;

        fn load<T: serde::de::DeserializeOwned>(prefix: &str) -> Result<T> {
            ::config::Config::builder()
                .add_source(::config::Environment::with_prefix(prefix).try_parsing(true))
                .build()
                .and_then(|c| c.try_deserialize())
                .map_err(|err| {
                    ConfigSnafu {
                        message: err.to_string(),
                        prefix,
                    }
                    .build()
                })
        }

        Ok(Self {
            digitalocean: load("DIGITALOCEAN")?,
            sync: load("DOZONE")?,
        })
    }

    pub fn get_service(self) -> Result<crate::service::ZoneSync> {
        let store = crate::digitalocean::DigitalOcean::try_from(self.digitalocean)?;
        Ok(crate::service::ZoneSync::new(self.sync, Box::new(store)))
    }
}
