use std::env;

pub const MIN_JWT_SECRET_BYTES: usize = 32;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub jwt_expiration_minutes: i64,
    pub admin_username: String,
    pub admin_email: String,
    pub admin_password: String,
    pub otel_exporter_endpoint: Option<String>,
    pub service_name: String,
    pub metrics_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = var("DATABASE_URL", "sqlite://polyclinic.db?mode=rwc");
        let server_host = var("SERVER_HOST", "127.0.0.1");
        let server_port = var("SERVER_PORT", "3000")
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::MissingJwtSecret)?;
        if jwt_secret.len() < MIN_JWT_SECRET_BYTES {
            return Err(ConfigError::WeakJwtSecret(MIN_JWT_SECRET_BYTES));
        }
        let jwt_issuer = var("JWT_ISSUER", "polyclinic");
        let jwt_audience = var("JWT_AUDIENCE", "polyclinic-api");
        let jwt_expiration_minutes = var("JWT_EXPIRATION_MINUTES", "60")
            .parse::<i64>()
            .ok()
            .filter(|minutes| *minutes > 0)
            .ok_or(ConfigError::InvalidJwtExpiration)?;

        let admin_username = var("ADMIN_USERNAME", "admin");
        let admin_email = lookup("ADMIN_EMAIL").ok_or(ConfigError::MissingAdminEmail)?;
        let admin_password = lookup("ADMIN_PASSWORD").ok_or(ConfigError::MissingAdminPassword)?;

        let otel_exporter_endpoint = lookup("OTEL_EXPORTER_OTLP_ENDPOINT");
        let service_name = var("SERVICE_NAME", "polyclinic");
        let metrics_port = var("METRICS_PORT", "9000")
            .parse()
            .map_err(|_| ConfigError::InvalidPort)?;

        Ok(Config {
            database_url,
            server_host,
            server_port,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            jwt_expiration_minutes,
            admin_username,
            admin_email,
            admin_password,
            otel_exporter_endpoint,
            service_name,
            metrics_port,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable not set")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {0} bytes long")]
    WeakJwtSecret(usize),

    #[error("JWT_EXPIRATION_MINUTES must be a positive number")]
    InvalidJwtExpiration,

    #[error("ADMIN_EMAIL environment variable not set")]
    MissingAdminEmail,

    #[error("ADMIN_PASSWORD environment variable not set")]
    MissingAdminPassword,

    #[error("Invalid port number")]
    InvalidPort,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("ADMIN_EMAIL", "admin@clinic.org"),
            ("ADMIN_PASSWORD", "Str0ng!Passw0rd"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, "sqlite://polyclinic.db?mode=rwc");
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.jwt_expiration_minutes, 60);
        assert_eq!(config.admin_username, "admin");
        assert_eq!(config.metrics_port, 9000);
        assert_eq!(config.server_address(), "127.0.0.1:3000");
        assert!(config.otel_exporter_endpoint.is_none());
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", "too-short"),
            ("ADMIN_EMAIL", "admin@clinic.org"),
            ("ADMIN_PASSWORD", "Str0ng!Passw0rd"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::WeakJwtSecret(32)));
    }

    #[test]
    fn test_missing_secret_and_bad_port() {
        let err = Config::from_lookup(lookup_from(&[("ADMIN_EMAIL", "a@b.org")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingJwtSecret));

        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("SERVER_PORT", "not-a-port"),
            ("ADMIN_EMAIL", "admin@clinic.org"),
            ("ADMIN_PASSWORD", "Str0ng!Passw0rd"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort));
    }

    #[test]
    fn test_bad_metrics_port_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("METRICS_PORT", "90000"),
            ("ADMIN_EMAIL", "admin@clinic.org"),
            ("ADMIN_PASSWORD", "Str0ng!Passw0rd"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort));

        let config = Config::from_lookup(lookup_from(&[
            ("JWT_SECRET", SECRET),
            ("METRICS_PORT", "9464"),
            ("ADMIN_EMAIL", "admin@clinic.org"),
            ("ADMIN_PASSWORD", "Str0ng!Passw0rd"),
        ]))
        .unwrap();
        assert_eq!(config.metrics_port, 9464);
    }
}
