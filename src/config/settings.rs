use std::net::{IpAddr, SocketAddr};

use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};

pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGIN: &str = "VENTURA_ALLOWED_ORIGIN";
pub const ENV_MODEL: &str = "VENTURA_MODEL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,

    /// The single origin allowed by CORS.
    pub allowed_origin: String,

    pub model: String,
    pub provider_base_url: String,

    /// Read from the file or environment, never written back.
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    pub temperature: f32,
    pub scene_max_tokens: u32,
    pub goal_max_tokens: u32,

    pub max_turns: u32,
    pub history_window: usize,
    pub request_timeout_secs: u64,

    /// Ask the model for a hidden goal per session; otherwise use `fallback_mission`.
    pub generate_goals: bool,
    pub fallback_mission: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3001,
            allowed_origin: "https://ventura-webapp.vercel.app".into(),
            model: "gemini-pro".into(),
            provider_base_url: "https://generativelanguage.googleapis.com".into(),
            api_key: None,
            temperature: 0.7,
            scene_max_tokens: 500,
            goal_max_tokens: 50,
            max_turns: 12,
            history_window: 8,
            request_timeout_secs: 60,
            generate_goals: true,
            fallback_mission: "Find the lost husband of the old lady".into(),
        }
    }
}

impl ServerSettings {
    /// Overlay environment values. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(ENV_API_KEY).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key.trim().to_string());
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", ENV_PORT, port))?;
        }

        if let Some(origin) = lookup(ENV_ALLOWED_ORIGIN) {
            self.allowed_origin = origin.trim().to_string();
        }

        if let Some(model) = lookup(ENV_MODEL) {
            self.model = model.trim().to_string();
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_turns == 0 {
            bail!("max_turns must be at least 1");
        }
        if self.scene_max_tokens == 0 || self.goal_max_tokens == 0 {
            bail!("token limits must be greater than zero");
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            bail!("temperature must be between 0 and 2, got {}", self.temperature);
        }
        if self.history_window == 0 {
            bail!("history_window must be at least 1");
        }
        if self.model.trim().is_empty() {
            bail!("model must not be empty");
        }
        if self.allowed_origin.trim().is_empty() {
            bail!("allowed_origin must not be empty");
        }
        if self.fallback_mission.trim().is_empty() {
            bail!("fallback_mission must not be empty");
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|e| anyhow!("invalid host '{}': {}", self.host, e))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
