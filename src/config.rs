use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Server
    pub host: String,
    pub port: u16,

    // Scheduler
    pub scheduler_interval_secs: u64,

    // Environment (dev / test)
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Self {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string());

        let mut database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./db.sqlite".to_string());
        if environment == "test" && env::var("DATABASE_URL").is_err() {
            database_url = "sqlite::memory:".to_string();
        }

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .expect("PORT must be a valid number");

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let scheduler_interval_secs: u64 = env::var("SCHEDULER_TIME_INTERVAL")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .expect("SCHEDULER_TIME_INTERVAL must be a valid number");

        Self {
            database_url,
            host,
            port,
            scheduler_interval_secs,
            environment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        // SAFETY: test runs single-threaded w.r.t. this env var set; no other
        // test in this binary reads SCHEDULER_TIME_INTERVAL concurrently.
        unsafe {
            env::remove_var("SCHEDULER_TIME_INTERVAL");
            env::remove_var("DATABASE_URL");
            env::remove_var("ENVIRONMENT");
        }
        let config = Config::from_env();
        assert_eq!(config.scheduler_interval_secs, 3000);
        assert_eq!(config.environment, "dev");
        assert_eq!(config.database_url, "sqlite://./db.sqlite");
    }
}
