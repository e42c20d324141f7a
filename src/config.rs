use log::warn;

/// Runtime configuration, read once from the environment at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub database: DatabaseConfig,
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub openai_model: String,
    pub jwt_secret: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub dbname: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    pub fn url(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.dbname
        )
    }
}

impl Config {
    pub fn from_env() -> Self {
        let database = DatabaseConfig {
            host: std::env::var("DB_HOST").unwrap_or_else(|_| "localhost".to_string()),
            port: std::env::var("DB_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .unwrap_or(5432),
            dbname: std::env::var("DB_NAME").unwrap_or_else(|_| "brandpulse_db".to_string()),
            user: std::env::var("DB_USER").unwrap_or_else(|_| "brandpulse_user".to_string()),
            password: std::env::var("DB_PASSWORD").unwrap_or_else(|_| "".to_string()),
        };

        let openai_api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        if openai_api_key.is_empty() {
            warn!("OPENAI_API_KEY not set - scoring and chat will fail upstream");
        }

        Config {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            database,
            openai_api_key,
            openai_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            openai_model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-4".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret".to_string()),
        }
    }
}
