use std::{env, fmt};

const DEV_JWT_SECRET: &str = "change-me-dev-secret";

#[derive(Clone)]
pub struct Settings {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub jwt_cookie_name: String,
    pub cookie_secure: bool,
    pub session_days: i64,

    // Shared secret presented by devices in `X-API-Key`.
    // `None` means the hardware endpoint rejects everything.
    pub hardware_api_key: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("database_url", &self.database_url)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"[redacted]")
            .field("jwt_cookie_name", &self.jwt_cookie_name)
            .field("cookie_secure", &self.cookie_secure)
            .field("session_days", &self.session_days)
            .field(
                "hardware_api_key",
                &self.hardware_api_key.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

impl Settings {
    pub fn uses_dev_jwt_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

fn flag(name: &str) -> bool {
    env::var(name)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let database_url = env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://wastewizard.db".to_string());

    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

    let port = env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| DEV_JWT_SECRET.to_string());
    let jwt_cookie_name = env::var("JWT_COOKIE_NAME").unwrap_or_else(|_| "auth".to_string());
    let cookie_secure = flag("COOKIE_SECURE");

    let session_days = env::var("SESSION_DAYS")
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|d| *d > 0)
        .unwrap_or(7);

    let hardware_api_key = env::var("HARDWARE_API_KEY")
        .ok()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty());

    Settings {
        database_url,
        host,
        port,
        jwt_secret,
        jwt_cookie_name,
        cookie_secure,
        session_days,
        hardware_api_key,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Settings {
        Settings {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: "super-secret-jwt".to_string(),
            jwt_cookie_name: "auth".to_string(),
            cookie_secure: false,
            session_days: 7,
            hardware_api_key: Some("device-secret".to_string()),
        }
    }

    #[test]
    fn debug_redacts_secrets() {
        let out = format!("{:?}", sample());
        assert!(!out.contains("super-secret-jwt"));
        assert!(!out.contains("device-secret"));
        assert!(out.contains("[redacted]"));
    }

    #[test]
    fn dev_secret_is_detected() {
        let mut s = sample();
        assert!(!s.uses_dev_jwt_secret());
        s.jwt_secret = DEV_JWT_SECRET.to_string();
        assert!(s.uses_dev_jwt_secret());
    }
}
