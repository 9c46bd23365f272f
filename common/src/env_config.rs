use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// Built once at startup from the environment, validated, and then shared
/// behind an `Arc` with every handler, the storage client and the payment
/// gateway. Nothing else in the workspace reads environment variables.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Configuration for JWT (JSON Web Token) authentication.
    pub jwt_config: JwtConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS (Cross-Origin Resource Sharing).
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Minimum level written by the logger.
    pub log_level: log::LevelFilter,
    /// File the logger appends to, next to stdout.
    pub log_file: String,
    /// Requests per second accepted by the global limiter.
    pub rate_limit_per_second: u32,
    /// Period of the background expiration sweep. Zero disables it.
    pub sweep_interval_secs: u64,
    /// Stripe Checkout settings.
    pub stripe: StripeConfig,
    /// S3-compatible object storage settings.
    pub storage: StorageConfig,

    pub uploads: UploadLimits,
}

#[derive(Clone, Debug)]
/// Configuration for JSON Web Token (JWT) authentication.
pub struct JwtConfig {
    /// The secret key used to sign and verify JWTs.
    pub secret: String,
    /// The expiration time for JWTs in hours.
    pub expiration_hours: i64,
}

#[derive(Clone, Debug)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: String,
    /// ISO currency code used for checkout sessions, lowercase.
    pub currency: String,
    /// Where the gateway sends the browser after a successful payment.
    pub success_url: String,
    /// Where the gateway sends the browser when the payment is abandoned.
    pub cancel_url: String,
}

#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (B2, R2, MinIO).
    pub endpoint: Option<String>,
    /// Base URL objects are publicly reachable under.
    pub public_base_url: String,
    /// Prefix prepended to every object key.
    pub key_prefix: String,
}

/// Bounds on a single listing form submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UploadLimits {
    /// Largest accepted image, in bytes.
    pub max_file_bytes: usize,
    /// Most image parts (main photo plus gallery) in one submission.
    pub max_files: usize,
}

impl Default for UploadLimits {
    fn default() -> Self {
        UploadLimits {
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 40,
        }
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Creates a new `Config` instance from environment variables.
    ///
    /// Loads `.env` first when present.
    ///
    /// # Environment Variables
    ///
    /// Required:
    /// - `ENVIRONMENT`: `development` or `production`
    /// - `DATABASE_URL`: Connection string for the database
    /// - `JWT_SECRET`: Secret key for JWT signing
    /// - `STORAGE_BUCKET`: Bucket that holds listing images
    ///
    /// Required in production only:
    /// - `STRIPE_SECRET_KEY`, `STRIPE_WEBHOOK_SECRET`
    ///
    /// Optional (with defaults):
    /// - `IP` ("127.0.0.1"), `PORT` (8080), `WORKERS` (4)
    /// - `CORS_ALLOWED_ORIGIN` ("http://localhost:3000")
    /// - `ENABLE_CONSOLE_LOGGING` (true), `LOG_LEVEL` ("debug"), `LOG_FILE` ("listings.log")
    /// - `JWT_EXPIRATION_HOURS` (24)
    /// - `RATE_LIMIT_PER_SECOND` (20)
    /// - `SWEEP_INTERVAL_SECS` (300, 0 disables the background sweep)
    /// - `STRIPE_CURRENCY` ("brl"), `STRIPE_SUCCESS_URL`, `STRIPE_CANCEL_URL`
    /// - `STORAGE_REGION` ("us-east-1"), `STORAGE_ENDPOINT`,
    ///   `STORAGE_PUBLIC_BASE_URL`, `STORAGE_KEY_PREFIX` ("media")
    /// - `UPLOAD_MAX_FILE_BYTES` (10 MiB), `UPLOAD_MAX_FILES` (40)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds and validates the configuration from any key lookup.
    pub fn from_lookup<F>(get: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            get(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };
        let or_default = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let environment = required("ENVIRONMENT")?;
        if environment != "development" && environment != "production" {
            return Err(ConfigError::Invalid {
                key: "ENVIRONMENT",
                value: environment,
            });
        }
        let is_production = environment == "production";

        let num_workers: usize = parse(&get, "WORKERS", 4)?;
        if num_workers == 0 {
            return Err(ConfigError::Invalid {
                key: "WORKERS",
                value: "0".to_string(),
            });
        }
        let rate_limit_per_second: u32 = parse(&get, "RATE_LIMIT_PER_SECOND", 20)?;
        if rate_limit_per_second == 0 {
            return Err(ConfigError::Invalid {
                key: "RATE_LIMIT_PER_SECOND",
                value: "0".to_string(),
            });
        }

        let stripe = StripeConfig {
            secret_key: if is_production {
                required("STRIPE_SECRET_KEY")?
            } else {
                or_default("STRIPE_SECRET_KEY", "")
            },
            webhook_secret: if is_production {
                required("STRIPE_WEBHOOK_SECRET")?
            } else {
                or_default("STRIPE_WEBHOOK_SECRET", "")
            },
            currency: or_default("STRIPE_CURRENCY", "brl").to_lowercase(),
            success_url: or_default(
                "STRIPE_SUCCESS_URL",
                "http://localhost:3000/subscription/success",
            ),
            cancel_url: or_default(
                "STRIPE_CANCEL_URL",
                "http://localhost:3000/subscription/canceled",
            ),
        };

        let bucket = required("STORAGE_BUCKET")?;
        let storage = StorageConfig {
            region: or_default("STORAGE_REGION", "us-east-1"),
            endpoint: get("STORAGE_ENDPOINT").filter(|v| !v.trim().is_empty()),
            public_base_url: get("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", bucket)),
            key_prefix: or_default("STORAGE_KEY_PREFIX", "media")
                .trim_matches('/')
                .to_string(),
            bucket,
        };

        let defaults = UploadLimits::default();
        let uploads = UploadLimits {
            max_file_bytes: parse(&get, "UPLOAD_MAX_FILE_BYTES", defaults.max_file_bytes)?,
            max_files: parse(&get, "UPLOAD_MAX_FILES", defaults.max_files)?,
        };
        if uploads.max_file_bytes == 0 {
            return Err(ConfigError::Invalid {
                key: "UPLOAD_MAX_FILE_BYTES",
                value: "0".to_string(),
            });
        }

        Ok(Config {
            database_url: required("DATABASE_URL")?,
            jwt_config: JwtConfig {
                secret: required("JWT_SECRET")?,
                expiration_hours: parse(&get, "JWT_EXPIRATION_HOURS", 24)?,
            },
            server_host: or_default("IP", "127.0.0.1"),
            server_port: parse(&get, "PORT", 8080)?,
            num_workers,
            cors_allowed_origin: or_default("CORS_ALLOWED_ORIGIN", "http://localhost:3000"),
            console_logging_enabled: parse_bool(&get, "ENABLE_CONSOLE_LOGGING", true)?,
            log_level: parse(&get, "LOG_LEVEL", log::LevelFilter::Debug)?,
            log_file: or_default("LOG_FILE", "listings.log"),
            rate_limit_per_second,
            sweep_interval_secs: parse(&get, "SWEEP_INTERVAL_SECS", 300)?,
            stripe,
            storage,
            uploads,
            environment,
        })
    }
}

fn parse<F, T>(get: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            key,
            value: raw,
        }),
    }
}

fn parse_bool<F>(get: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_lowercase()) {
        None => Ok(default),
        Some(v) if v == "true" || v == "1" => Ok(true),
        Some(v) if v == "false" || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::Invalid { key, value: v }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn base() -> HashMap<&'static str, String> {
        HashMap::from([
            ("ENVIRONMENT", "development".to_string()),
            ("DATABASE_URL", "postgres://u:p@localhost/listings".to_string()),
            ("JWT_SECRET", "secret".to_string()),
            ("STORAGE_BUCKET", "photos".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn defaults_fill_optional_values() {
        let config = load(&base()).unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.sweep_interval_secs, 300);
        assert_eq!(config.stripe.currency, "brl");
        assert_eq!(config.storage.key_prefix, "media");
        assert_eq!(
            config.storage.public_base_url,
            "https://photos.s3.amazonaws.com"
        );
        assert!(config.storage.endpoint.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn missing_required_value_is_reported() {
        let mut vars = base();
        vars.remove("DATABASE_URL");
        assert_eq!(load(&vars).unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn unparsable_port_is_rejected() {
        let mut vars = base();
        vars.insert("PORT", "eighty".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
    }

    #[test]
    fn production_requires_stripe_secrets() {
        let mut vars = base();
        vars.insert("ENVIRONMENT", "production".to_string());
        assert_eq!(
            load(&vars).unwrap_err(),
            ConfigError::Missing("STRIPE_SECRET_KEY")
        );

        vars.insert("STRIPE_SECRET_KEY", "sk_live".to_string());
        vars.insert("STRIPE_WEBHOOK_SECRET", "whsec".to_string());
        assert!(load(&vars).unwrap().is_production());
    }

    #[test]
    fn zero_workers_is_invalid() {
        let mut vars = base();
        vars.insert("WORKERS", "0".to_string());
        assert!(load(&vars).is_err());
    }

    #[test]
    fn storage_prefix_is_trimmed() {
        let mut vars = base();
        vars.insert("STORAGE_KEY_PREFIX", "/uploads/".to_string());
        vars.insert("STORAGE_ENDPOINT", "https://s3.us-east-005.backblazeb2.com".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(config.storage.key_prefix, "uploads");
        assert!(config.storage.endpoint.is_some());
    }

    #[test]
    fn upload_limits_default_and_override() {
        let config = load(&base()).unwrap();
        assert_eq!(config.uploads, UploadLimits::default());

        let mut vars = base();
        vars.insert("UPLOAD_MAX_FILE_BYTES", "1048576".to_string());
        vars.insert("UPLOAD_MAX_FILES", "12".to_string());
        let config = load(&vars).unwrap();
        assert_eq!(config.uploads.max_file_bytes, 1_048_576);
        assert_eq!(config.uploads.max_files, 12);

        vars.insert("UPLOAD_MAX_FILE_BYTES", "0".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "UPLOAD_MAX_FILE_BYTES", .. })
        ));
    }
}
