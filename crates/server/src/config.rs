/// Runtime configuration sourced from the environment.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound applied to client-supplied page sizes
    pub max_page_size: i64,
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_PAGE_SIZE: i64 = 100;

impl ServerConfig {
    pub fn from_env() -> Self {
        let host = std::env::var("RUNLOG_HOST")
            .or_else(|_| std::env::var("HOST"))
            .unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = std::env::var("RUNLOG_PORT")
            .or_else(|_| std::env::var("PORT"))
            .ok()
            .and_then(|s| s.trim().parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_page_size = std::env::var("RUNLOG_MAX_PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse::<i64>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_PAGE_SIZE);
        ServerConfig {
            host,
            port,
            max_page_size,
        }
    }
}
