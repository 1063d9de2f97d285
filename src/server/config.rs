use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    /// Path to the frontend directory to be statically served.
    pub frontend_dir_path: Option<String>,
    /// How many posts the home feed returns at most.
    pub feed_page_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 3001,
            frontend_dir_path: None,
            feed_page_size: 50,
        }
    }
}
