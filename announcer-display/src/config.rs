use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub arena_host: String,
    pub arena_port: u16,
    pub websocket_path: String,
    /// The rendered page is rewritten here after every change
    pub output_path: PathBuf,
    /// Templates found here replace the built in ones of the same name
    pub template_dir: Option<PathBuf>,
    pub blink_interval_ms: u64,
    pub reconnect_delay_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            arena_host: "127.0.0.1".to_string(),
            arena_port: 8080,
            websocket_path: "/displays/announcer/websocket".to_string(),
            output_path: PathBuf::from("announcer.html"),
            template_dir: None,
            blink_interval_ms: 500,
            reconnect_delay_ms: 1000,
        }
    }
}

impl AppConfig {
    pub fn websocket_url(&self) -> String {
        format!(
            "ws://{}:{}{}",
            self.arena_host, self.arena_port, self.websocket_path
        )
    }
}
