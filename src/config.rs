use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailTransport {
    /// JSON mail API reached over HTTP.
    Http { url: String, token: String },
    Smtp { host: String, username: String, password: String },
    /// Render and log only. Default for local development.
    Log,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub frontend_url: String,
    pub public_base_url: String,
    pub admin_email: Option<String>,
    pub mail_transport: MailTransport,
    pub mail_from: String,
    pub support_email: String,
    pub support_url: String,
    pub login_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                reason: format!("'{}' is not a port number", raw),
            })?,
            Err(_) => 3000,
        };

        let jwt_expires_in = match env::var("JWT_EXPIRES_IN") {
            Ok(raw) => parse_expiry(&raw).ok_or_else(|| ConfigError::Invalid {
                name: "JWT_EXPIRES_IN",
                reason: format!("'{}' is not like \"1d\", \"2h\" or \"3600\"", raw),
            })?,
            Err(_) => Duration::from_secs(90 * 24 * 60 * 60),
        };

        let mail_transport = match env::var("MAIL_TRANSPORT").unwrap_or_else(|_| "log".to_string()).as_str() {
            "http" => MailTransport::Http {
                url: required("MAIL_SERVICE_URL")?,
                token: required("MAIL_SERVICE_TOKEN")?,
            },
            "smtp" => MailTransport::Smtp {
                host: required("SMTP_HOST")?,
                username: required("SMTP_USERNAME")?,
                password: required("SMTP_PASSWORD")?,
            },
            "log" => MailTransport::Log,
            other => {
                return Err(ConfigError::Invalid {
                    name: "MAIL_TRANSPORT",
                    reason: format!("unknown transport '{}'", other),
                })
            }
        };

        let public_base_url = env::var("PUBLIC_BASE_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));
        let frontend_url = env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:5173".to_string());

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            port,
            jwt_secret: required("JWT_SECRET")?,
            jwt_expires_in,
            login_url: env::var("LOGIN_URL").unwrap_or_else(|_| format!("{}/login", frontend_url)),
            frontend_url,
            public_base_url,
            admin_email: env::var("ADMIN_EMAIL").ok().filter(|s| !s.is_empty()),
            mail_transport,
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "TradTech <noreply@tradtech.com>".to_string()),
            support_email: env::var("SUPPORT_EMAIL").unwrap_or_else(|_| "support@tradtech.com".to_string()),
            support_url: env::var("SUPPORT_URL").unwrap_or_else(|_| "https://tradtech.com/contact".to_string()),
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Parses `90d`, `12h`, `30m`, `45s` or a bare number of seconds.
pub fn parse_expiry(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, c) if c.is_ascii_alphabetic() => (&raw[..i], Some(c)),
        _ => (raw, None),
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: u64 = digits.parse().ok()?;
    let secs = match unit {
        None | Some('s') => n,
        Some('m') => n.checked_mul(60)?,
        Some('h') => n.checked_mul(60 * 60)?,
        Some('d') => n.checked_mul(24 * 60 * 60)?,
        Some(_) => return None,
    };
    Some(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_formats() {
        assert_eq!(parse_expiry("90d"), Some(Duration::from_secs(90 * 86_400)));
        assert_eq!(parse_expiry("2h"), Some(Duration::from_secs(7_200)));
        assert_eq!(parse_expiry("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_expiry("3600"), Some(Duration::from_secs(3_600)));
        assert_eq!(parse_expiry("10s"), Some(Duration::from_secs(10)));
    }

    #[test]
    fn expiry_rejects_garbage() {
        assert_eq!(parse_expiry(""), None);
        assert_eq!(parse_expiry("d"), None);
        assert_eq!(parse_expiry("5w"), None);
        assert_eq!(parse_expiry("1.5h"), None);
        assert_eq!(parse_expiry("-3h"), None);
    }
}
