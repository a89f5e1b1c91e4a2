/*
 * Responsibility
 * - 環境変数や設定の読み込み (Core API endpoints, signing key, empty mail, cache)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV")
            .unwrap_or_else(|_| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Key material used to sign the COR-901 `request` parameter.
#[derive(Clone)]
pub enum SigningKeyConfig {
    /// HS256 with a shared secret.
    Hmac(String),
    /// EdDSA with an Ed25519 private key in PKCS#8 PEM format.
    EdPem(String),
}

impl fmt::Debug for SigningKeyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Do not print key material
        match self {
            SigningKeyConfig::Hmac(_) => f.write_str("Hmac(..)"),
            SigningKeyConfig::EdPem(_) => f.write_str("EdPem(..)"),
        }
    }
}

/// COR-901 (authorize) parameters.
#[derive(Debug, Clone)]
pub struct AuthorizeConfig {
    pub path: String,
    pub redirect_url: String,
    pub client_id: String,
    pub nonce: String,
    pub response_type: String,
    pub scope: String,
}

#[derive(Debug, Clone)]
pub struct CoreApiConfig {
    pub base_url: String,
    pub port: Option<u16>,
    pub timeout: Duration,
    pub authorize: AuthorizeConfig,
    pub did_lookup_path: String,
    pub member_register_path: String,
    pub signing_key: SigningKeyConfig,
}

#[derive(Debug, Clone)]
pub struct EmptyMailConfig {
    pub domain: String,
    pub account_prefix: String,
    pub coop_key_ttl: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Valkey,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub maintenance_mode: bool,

    pub request_body_limit_bytes: usize,
    pub request_timeout: Duration,

    pub cache_backend: CacheBackend,
    pub valkey_url: String,

    pub core_api: CoreApiConfig,
    pub empty_mail: EmptyMailConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let port: u16 = std::env::var("PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(8080);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::from_env();

        let maintenance_mode = std::env::var("MAINTENANCE_MODE")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "on"))
            .unwrap_or(false);

        let request_body_limit_bytes = std::env::var("REQUEST_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(64 * 1024);

        let request_timeout = Duration::from_secs(
            std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        );

        let cache_backend = match std::env::var("CACHE_BACKEND")
            .unwrap_or_else(|_| "valkey".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "valkey" | "redis" => CacheBackend::Valkey,
            "memory" => CacheBackend::Memory,
            _ => return Err(ConfigError::Invalid("CACHE_BACKEND")),
        };

        let valkey_url = std::env::var("VALKEY_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let core_api = core_api_from_env()?;
        let empty_mail = empty_mail_from_env()?;

        Ok(Self {
            addr,
            app_env,
            maintenance_mode,
            request_body_limit_bytes,
            request_timeout,
            cache_backend,
            valkey_url,
            core_api,
            empty_mail,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn core_api_from_env() -> Result<CoreApiConfig, ConfigError> {
    let base_url = required("CORE_API_BASE_URL")?;
    url::Url::parse(&base_url).map_err(|_| ConfigError::Invalid("CORE_API_BASE_URL"))?;

    let port = match std::env::var("CORE_API_PORT") {
        Ok(v) if !v.trim().is_empty() => Some(
            v.trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("CORE_API_PORT"))?,
        ),
        _ => None,
    };

    let timeout = Duration::from_secs(
        std::env::var("CORE_API_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(10),
    );

    let authorize = AuthorizeConfig {
        path: required("COR901_PATH")?,
        redirect_url: required("COR901_REDIRECT_URL")?,
        client_id: required("COR901_CLIENT_ID")?,
        nonce: required("COR901_NONCE")?,
        response_type: std::env::var("COR901_RESPONSE_TYPE")
            .unwrap_or_else(|_| "code".to_string()),
        scope: std::env::var("COR901_SCOPE").unwrap_or_else(|_| "openid".to_string()),
    };

    // The PEM wins when both are configured.
    let signing_key = match (
        std::env::var("CORE_REQUEST_SIGNING_KEY_PEM").ok(),
        std::env::var("CORE_REQUEST_SIGNING_SECRET").ok(),
    ) {
        (Some(pem), _) if !pem.trim().is_empty() => {
            SigningKeyConfig::EdPem(pem.replace("\\n", "\n"))
        }
        (_, Some(secret)) if !secret.is_empty() => SigningKeyConfig::Hmac(secret),
        _ => return Err(ConfigError::Missing("CORE_REQUEST_SIGNING_SECRET")),
    };

    Ok(CoreApiConfig {
        base_url,
        port,
        timeout,
        authorize,
        did_lookup_path: required("COR112_PATH")?,
        member_register_path: required("COR001_PATH")?,
        signing_key,
    })
}

fn empty_mail_from_env() -> Result<EmptyMailConfig, ConfigError> {
    let domain = required("EMPTY_MAIL_DOMAIN")?;
    let account_prefix = required("EMPTY_MAIL_ACCOUNT_PREFIX")?;

    let expire = std::env::var("EMPTY_MAIL_COOP_KEY_EXPIRE")
        .ok()
        .map(|v| v.parse::<u64>())
        .transpose()
        .map_err(|_| ConfigError::Invalid("EMPTY_MAIL_COOP_KEY_EXPIRE"))?
        .unwrap_or(600);

    let unit = std::env::var("EMPTY_MAIL_COOP_KEY_EXPIRE_UNIT")
        .unwrap_or_else(|_| "SECONDS".to_string());

    let coop_key_ttl = ttl_from_unit(expire, &unit)
        .ok_or(ConfigError::Invalid("EMPTY_MAIL_COOP_KEY_EXPIRE_UNIT"))?;

    Ok(EmptyMailConfig {
        domain,
        account_prefix,
        coop_key_ttl,
    })
}

/// Convert `(amount, unit)` into a `Duration`. Unit names follow the
/// `SECONDS / MINUTES / HOURS / DAYS` spelling used by ops configs.
pub fn ttl_from_unit(amount: u64, unit: &str) -> Option<Duration> {
    let secs = match unit.trim().to_ascii_uppercase().as_str() {
        "SECONDS" => amount,
        "MINUTES" => amount.checked_mul(60)?,
        "HOURS" => amount.checked_mul(60 * 60)?,
        "DAYS" => amount.checked_mul(60 * 60 * 24)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ttl_units_are_case_insensitive() {
        assert_eq!(ttl_from_unit(10, "minutes"), Some(Duration::from_secs(600)));
        assert_eq!(ttl_from_unit(2, "HOURS"), Some(Duration::from_secs(7200)));
        assert_eq!(ttl_from_unit(1, "Days"), Some(Duration::from_secs(86_400)));
        assert_eq!(ttl_from_unit(600, "SECONDS"), Some(Duration::from_secs(600)));
    }

    #[test]
    fn unknown_ttl_unit_is_rejected() {
        assert_eq!(ttl_from_unit(1, "FORTNIGHTS"), None);
        assert_eq!(ttl_from_unit(1, "MILLISECONDS"), None);
    }

    #[test]
    fn signing_key_debug_hides_material() {
        let key = SigningKeyConfig::Hmac("super-secret".to_string());
        assert_eq!(format!("{key:?}"), "Hmac(..)");
    }
}
