use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgSslMode};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    pub sslmode: String,
    pub max_connections: u32,
    /// Full URL; when set it overrides the discrete fields
    pub connection_string: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            dbname: "blog".to_string(),
            sslmode: "disable".to_string(),
            max_connections: 20,
            connection_string: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, config files and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = config::Config::builder();

        // Add default configuration
        config = config.add_source(config::Config::try_from(&AppConfig::default())?);

        // Add config files if they exist
        config = config.add_source(config::File::with_name("config").required(false));
        config = config.add_source(config::File::with_name("devops/local/config").required(false));

        // Add environment variables with prefix "BLOG_", e.g. BLOG_DATABASE__HOST
        config = config.add_source(
            config::Environment::with_prefix("BLOG")
                .separator("__")
                .prefix_separator("_"),
        );

        let config = config.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        Ok(app_config)
    }

    /// Connect options built from the discrete database fields.
    ///
    /// With `with_database == false` no database is named, which is what the
    /// server-level connection used to provision the database needs. A
    /// `connection_string` is used as given, including the database it names.
    pub fn connect_options(&self, with_database: bool) -> anyhow::Result<PgConnectOptions> {
        let db = &self.database;

        if let Some(url) = &db.connection_string {
            return Ok(url.parse::<PgConnectOptions>()?);
        }

        let options = PgConnectOptions::new()
            .host(&db.host)
            .port(db.port)
            .username(&db.user)
            .password(&db.password)
            .ssl_mode(db.sslmode.parse::<PgSslMode>()?);

        Ok(if with_database {
            options.database(&db.dbname)
        } else {
            options
        })
    }

    /// Get the server bind address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
