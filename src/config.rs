use std::env;
use std::fmt;
use std::ops::RangeInclusive;

use chrono::Duration;

/// Runtime settings read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string. When absent the server runs on the in-memory store.
    pub database_url: Option<String>,
    pub server_port: u16,
    pub server_host: String,
    pub auth: AuthSettings,
    pub mail: MailSettings,
}

/// Knobs for the credential, session and recovery flows.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Lifetime of a session token issued at register/login.
    pub session_ttl: Duration,
    /// Lifetime of a one-time recovery code.
    pub otp_ttl: Duration,
    /// Lifetime of the reset token handed out after the code is verified.
    pub reset_token_ttl: Duration,
    /// bcrypt cost factor.
    pub bcrypt_cost: u32,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(168),
            otp_ttl: Duration::minutes(5),
            reset_token_ttl: Duration::minutes(15),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MailSettings {
    /// HTTP endpoint that accepts outgoing mail as JSON. Mail is only logged when unset.
    pub webhook_url: Option<String>,
    pub from: String,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            webhook_url: None,
            from: "no-reply@taskhub.local".to_string(),
        }
    }
}

/// Ten years. Longer session lifetimes overflow timestamp arithmetic.
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365 * 10;
const MAX_RECOVERY_TTL_MINUTES: i64 = 24 * 60;

/// A variable was present but could not be parsed or was out of range.
#[derive(Debug)]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub expected: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} must be {}, got {:?}",
            self.key, self.expected, self.value
        )
    }
}

impl std::error::Error for ConfigError {}

fn parse_var<T: std::str::FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError {
            key,
            value,
            expected: "a number".to_string(),
        }),
        Err(_) => Ok(default),
    }
}

fn parse_in_range<T>(
    key: &'static str,
    default: T,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + fmt::Display,
{
    let parsed = parse_var(key, default)?;
    if range.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError {
            key,
            value: parsed.to_string(),
            expected: format!("between {} and {}", range.start(), range.end()),
        })
    }
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = AuthSettings::default();
        Ok(Self {
            database_url: optional_var("DATABASE_URL"),
            server_port: parse_var("SERVER_PORT", 8080)?,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            auth: AuthSettings {
                session_ttl: Duration::hours(parse_in_range(
                    "SESSION_TTL_HOURS",
                    168,
                    1..=MAX_SESSION_TTL_HOURS,
                )?),
                otp_ttl: Duration::minutes(parse_in_range(
                    "OTP_TTL_MINUTES",
                    5,
                    1..=MAX_RECOVERY_TTL_MINUTES,
                )?),
                reset_token_ttl: Duration::minutes(parse_in_range(
                    "RESET_TOKEN_TTL_MINUTES",
                    15,
                    1..=MAX_RECOVERY_TTL_MINUTES,
                )?),
                bcrypt_cost: parse_in_range("BCRYPT_COST", defaults.bcrypt_cost, 4..=31)?,
            },
            mail: MailSettings {
                webhook_url: optional_var("MAIL_WEBHOOK_URL"),
                from: env::var("MAIL_FROM").unwrap_or_else(|_| MailSettings::default().from),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
