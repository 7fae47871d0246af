use std::{env, fs, path::Path, path::PathBuf};

use url::Url;

use crate::{error::Error, provider::DatabasePool, store::SampleStore};

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Which configured database an administrative command targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseSelector {
    Primary,
    Secondary,
}

impl TryFrom<u8> for DatabaseSelector {
    type Error = Error;

    fn try_from(ordinal: u8) -> Result<Self, Self::Error> {
        match ordinal {
            1 => Ok(DatabaseSelector::Primary),
            2 => Ok(DatabaseSelector::Secondary),
            other => Err(Error::ConfigurationError(format!(
                "database ordinal must be 1 or 2, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug)]
pub struct State {
    pub config: Config,
    pub primary: DatabasePool,
    pub secondary: Option<DatabasePool>,
}

impl State {
    /// Connects the databases in `required` up front. Every other
    /// configured database is opened lazily and only fails when used.
    pub async fn new(
        config: Config,
        required: &[DatabaseSelector],
    ) -> Result<State, Error> {
        let primary = open_database(
            "primary",
            &config.database_url,
            config.database_max_connections,
            required.contains(&DatabaseSelector::Primary),
        )
        .await?;

        let secondary = match &config.database_url_secondary {
            Some(url) => Some(
                open_database(
                    "secondary",
                    url,
                    config.database_max_connections,
                    required.contains(&DatabaseSelector::Secondary),
                )
                .await?,
            ),
            None if required.contains(&DatabaseSelector::Secondary) => {
                return Err(Error::ConfigurationError(String::from(
                    "secondary database is not configured",
                )));
            },
            None => None,
        };

        Ok(State {
            config,
            primary,
            secondary,
        })
    }

    pub fn database(
        &self,
        selector: DatabaseSelector,
    ) -> Result<&DatabasePool, Error> {
        match selector {
            DatabaseSelector::Primary => Ok(&self.primary),
            DatabaseSelector::Secondary => {
                self.secondary.as_ref().ok_or_else(|| {
                    Error::ConfigurationError(String::from(
                        "secondary database is not configured",
                    ))
                })
            },
        }
    }

    /// Every configured store, primary first.
    pub fn stores(&self) -> Vec<&dyn SampleStore> {
        let mut stores: Vec<&dyn SampleStore> = vec![&self.primary];
        if let Some(secondary) = &self.secondary {
            stores.push(secondary);
        }
        stores
    }
}

async fn open_database(
    name: &str,
    url: &str,
    max_connections: u32,
    connect: bool,
) -> Result<DatabasePool, Error> {
    if connect {
        DatabasePool::new(name, url, max_connections).await
    } else {
        DatabasePool::new_lazy(name, url, max_connections)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub rpc_host: String,
    pub rpc_port: u16,
    pub data_dir: PathBuf,
    pub staking_wallet: String,
    pub zmq_endpoint: String,
    pub database_url: String,
    pub database_url_secondary: Option<String>,
    pub database_max_connections: u32,
    pub log_file: Option<PathBuf>,
}

impl Config {
    pub fn rpc_url(&self) -> Result<Url, Error> {
        let url = Url::parse(&format!(
            "http://{}:{}/",
            self.rpc_host, self.rpc_port
        ))?;
        Ok(url)
    }

    pub fn cookie_path(&self) -> PathBuf {
        self.data_dir.join(".cookie")
    }
}

pub fn get_configuration() -> Result<Config, Error> {
    let rpc_host = required_var("PARTICLD_RPC_HOST")?;
    let rpc_port: u16 = required_var("PARTICLD_RPC_PORT")?.parse()?;
    let data_dir = PathBuf::from(required_var("PARTICLD_DATA_DIR")?);
    let staking_wallet = required_var("PARTICLD_STAKING_WALLET")?;
    let zmq_endpoint = required_var("ZMQ_ENDPOINT")?;
    let database_url = required_var("DATABASE_URL")?;
    let database_url_secondary = optional_var("DATABASE_URL_SECONDARY");

    let database_max_connections =
        match optional_var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse()?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

    let log_file = optional_var("LOG_FILE").map(PathBuf::from);

    let config = Config {
        rpc_host,
        rpc_port,
        data_dir,
        staking_wallet,
        zmq_endpoint,
        database_url,
        database_url_secondary,
        database_max_connections,
        log_file,
    };

    Ok(config)
}

/// Exports every `KEY=VALUE` pair of the config file into the environment.
pub fn set_configuration(path: &Path) -> Result<(), Error> {
    let config_string = fs::read_to_string(path).map_err(|e| {
        Error::ConfigurationError(format!(
            "failed to open config file {}: {}",
            path.display(),
            e
        ))
    })?;

    for (key, value) in parse_config_string(&config_string) {
        env::set_var(key, value);
    }

    Ok(())
}

fn parse_config_string(config: &str) -> Vec<(&str, &str)> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

fn required_var(key: &str) -> Result<String, Error> {
    env::var(key).map_err(|e| {
        Error::ConfigurationError(format!("{}: {}", key, e))
    })
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config_string() {
        let config = "\
# node
PARTICLD_RPC_HOST=127.0.0.1
PARTICLD_RPC_PORT = 51735

DATABASE_URL=postgres://user:pw@localhost/stats?sslmode=disable
broken line
=nokey
";
        let params = parse_config_string(config);
        assert_eq!(
            params,
            vec![
                ("PARTICLD_RPC_HOST", "127.0.0.1"),
                ("PARTICLD_RPC_PORT", "51735"),
                (
                    "DATABASE_URL",
                    "postgres://user:pw@localhost/stats?sslmode=disable"
                ),
            ]
        );
    }

    #[test]
    fn test_database_selector_from_ordinal() {
        assert_eq!(
            DatabaseSelector::try_from(1u8).unwrap(),
            DatabaseSelector::Primary
        );
        assert_eq!(
            DatabaseSelector::try_from(2u8).unwrap(),
            DatabaseSelector::Secondary
        );
        assert!(matches!(
            DatabaseSelector::try_from(3u8),
            Err(Error::ConfigurationError(_))
        ));
    }

    fn config(database_url_secondary: Option<&str>) -> Config {
        Config {
            rpc_host: String::from("localhost"),
            rpc_port: 51735,
            data_dir: PathBuf::from("/var/lib/particl"),
            staking_wallet: String::from("stake"),
            zmq_endpoint: String::from("tcp://127.0.0.1:29332"),
            database_url: String::from("postgres://stats@127.0.0.1:1/primary"),
            database_url_secondary: database_url_secondary.map(String::from),
            database_max_connections: 5,
            log_file: None,
        }
    }

    #[test]
    fn test_rpc_url_and_cookie_path() {
        let config = config(None);

        assert_eq!(
            config.rpc_url().unwrap().as_str(),
            "http://localhost:51735/"
        );
        assert_eq!(
            config.cookie_path(),
            PathBuf::from("/var/lib/particl/.cookie")
        );
    }

    #[tokio::test]
    async fn test_databases_not_required_are_not_connected() {
        // Nothing listens on port 1, so any eager connect would fail.
        let config = config(Some("postgres://stats@127.0.0.1:1/secondary"));

        let state = State::new(config, &[]).await.unwrap();

        assert_eq!(state.stores().len(), 2);
        assert_eq!(
            state.database(DatabaseSelector::Secondary).unwrap().name,
            "secondary"
        );
    }

    #[tokio::test]
    async fn test_required_secondary_must_be_configured() {
        let result = State::new(config(None), &[DatabaseSelector::Secondary]).await;
        assert!(matches!(result, Err(Error::ConfigurationError(_))));

        let state = State::new(config(None), &[]).await.unwrap();
        assert_eq!(state.stores().len(), 1);
        assert!(matches!(
            state.database(DatabaseSelector::Secondary),
            Err(Error::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_malformed_database_url_is_rejected() {
        let result = State::new(config(Some("not a url")), &[]).await;
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }
}
