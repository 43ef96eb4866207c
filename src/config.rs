use anyhow::Context;

const TEN_YEARS_SECS: i64 = 60 * 60 * 24 * 365 * 10;
/// Upper bound keeps `now + ttl` well inside the representable date range.
const MAX_TTL_SECS: i64 = TEN_YEARS_SECS * 10;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub cookie_name: String,
    pub ttl_seconds: i64,
    pub secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "qid".into(),
            ttl_seconds: TEN_YEARS_SECS,
            secure: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(4000);
        let cors_origin =
            std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "http://localhost:3000".into());

        let defaults = SessionConfig::default();
        let session = SessionConfig {
            cookie_name: std::env::var("SESSION_COOKIE_NAME").unwrap_or(defaults.cookie_name),
            ttl_seconds: parse_ttl(std::env::var("SESSION_TTL_SECONDS").ok().as_deref())?,
            secure: is_production(std::env::var("APP_ENV").ok().as_deref()),
        };

        Ok(Self {
            database_url,
            host,
            port,
            cors_origin,
            session,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_ttl(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(TEN_YEARS_SECS);
    };
    let ttl = raw
        .trim()
        .parse::<i64>()
        .with_context(|| format!("SESSION_TTL_SECONDS is not an integer: {raw:?}"))?;
    if !(1..=MAX_TTL_SECS).contains(&ttl) {
        anyhow::bail!("SESSION_TTL_SECONDS must be between 1 and {MAX_TTL_SECS}, got {ttl}");
    }
    Ok(ttl)
}

fn is_production(app_env: Option<&str>) -> bool {
    matches!(app_env, Some(env) if env.eq_ignore_ascii_case("production"))
}
