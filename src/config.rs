use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub enable_file_logs: bool,
    pub log_dir: String,
    pub sled_path: String,
    pub cors_origin: String,
    pub worker: WorkerConfig,
    pub session: SessionConfig,
    pub srs: SrsEnvConfig,
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub is_leader: bool,
    pub enable_due_digest: bool,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Idle review sessions older than this are swept from memory.
    pub idle_ttl_secs: u64,
}

/// Scheduler knobs exposed through the environment; the full parameter set
/// lives in `srs::config::SrsConfig`.
#[derive(Debug, Clone)]
pub struct SrsEnvConfig {
    pub initial_interval_days: f64,
    pub min_ease_factor: f64,
    pub max_ease_factor: f64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            host: env_or_parse("HOST", IpAddr::V4(Ipv4Addr::new(127, 0, 0, 1))),
            port: env_or_parse("PORT", 3000_u16),
            log_level: env_or("RUST_LOG", "info"),
            enable_file_logs: env_or_bool("ENABLE_FILE_LOGS", false),
            log_dir: env_or("LOG_DIR", "./logs"),
            sled_path: env_or("SLED_PATH", "./data/flashcards.sled"),
            cors_origin: env_or("CORS_ORIGIN", "http://localhost:5173"),
            worker: WorkerConfig {
                is_leader: env_or_bool("WORKER_LEADER", true),
                enable_due_digest: env_or_bool("ENABLE_DUE_DIGEST_WORKER", true),
            },
            session: SessionConfig {
                idle_ttl_secs: env_or_parse("SESSION_IDLE_TTL_SECS", 7200_u64),
            },
            srs: SrsEnvConfig {
                initial_interval_days: env_or_parse("SRS_INITIAL_INTERVAL_DAYS", 1.0_f64),
                min_ease_factor: env_or_parse("SRS_MIN_EASE_FACTOR", 1.3_f64),
                max_ease_factor: env_or_parse("SRS_MAX_EASE_FACTOR", 3.0_f64),
            },
        }
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(
                    key,
                    value = %raw,
                    "Failed to parse env var, using default"
                );
                default
            }
        },
        Err(_) => default,
    }
}

pub fn env_or_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => default,
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Mutex, OnceLock};

    use super::*;

    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn managed_keys() -> &'static [&'static str] {
        &[
            "HOST",
            "PORT",
            "RUST_LOG",
            "SESSION_IDLE_TTL_SECS",
            "SRS_INITIAL_INTERVAL_DAYS",
            "SRS_MIN_EASE_FACTOR",
            "WORKER_LEADER",
        ]
    }

    fn clear_keys(keys: &[&str]) {
        for key in keys {
            env::remove_var(key);
        }
    }

    #[test]
    fn loads_defaults_when_missing() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.session.idle_ttl_secs, 7200);
        assert!((cfg.srs.min_ease_factor - 1.3).abs() < f64::EPSILON);
        assert!(cfg.worker.is_leader);
    }

    #[test]
    fn parses_numeric_values() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "4000");
        env::set_var("SESSION_IDLE_TTL_SECS", "600");
        env::set_var("SRS_INITIAL_INTERVAL_DAYS", "2.5");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 4000);
        assert_eq!(cfg.session.idle_ttl_secs, 600);
        assert!((cfg.srs.initial_interval_days - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_values_fall_back() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("PORT", "bad");
        env::set_var("SRS_MIN_EASE_FACTOR", "x");

        let cfg = Config::from_env();
        assert_eq!(cfg.port, 3000);
        assert!((cfg.srs.min_ease_factor - 1.3).abs() < f64::EPSILON);
    }

    #[test]
    fn worker_flags_parse_as_bools() {
        let _guard = env_lock().lock().expect("env lock");
        clear_keys(managed_keys());

        env::set_var("WORKER_LEADER", "off");
        let cfg = Config::from_env();
        assert!(!cfg.worker.is_leader);
    }
}
