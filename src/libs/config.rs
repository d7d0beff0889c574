//! Application configuration.
//!
//! Settings are stored as pretty-printed JSON in `config.json` inside the
//! data directory. Every section is optional in the file; missing sections
//! fall back to defaults, and environment variables (including those loaded
//! from `.env`) override whatever the file says:
//!
//! | Variable                          | Field               |
//! |-----------------------------------|---------------------|
//! | `TASKPAD_HOST`                    | `server.host`       |
//! | `TASKPAD_PORT`                    | `server.port`       |
//! | `TASKPAD_DATABASE`                | `server.database`   |
//! | `TASKPAD_API_URL`                 | `client.api_url`    |
//! | `GEMMA_API_BASE_URL`              | `llm.base_url`      |
//! | `GEMMA_MODEL_NAME`                | `llm.model`         |
//! | `GROQ_API_KEY`, `TASKPAD_LLM_API_KEY` | `llm.api_key`   |

use super::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::msg_print;
use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLM_MODEL: &str = "gemma2-9b-it";
pub const DEFAULT_STALE_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default = "enabled")]
    pub cors: bool,
    /// Database file; the data directory's `taskpad.db` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

fn enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            cors: true,
            database: None,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        LlmConfig {
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            model: DEFAULT_LLM_MODEL.to_string(),
            api_key: None,
            timeout_secs: None,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub api_url: String,
    pub stale_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: format!("http://{}:{}", DEFAULT_HOST, DEFAULT_PORT),
            stale_secs: DEFAULT_STALE_SECS,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm: Option<LlmConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client: Option<ClientConfig>,
}

impl Config {
    /// Reads the config file from the data directory. A missing file yields defaults.
    pub fn read() -> Result<Config> {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        Self::read_from(&path)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str).context(Message::ConfigParseError.to_string())?;

        Ok(config)
    }

    /// The file contents with environment overrides applied.
    pub fn load() -> Result<Config> {
        let mut config = Self::read()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path).context(Message::ConfigSaveError.to_string())?;
        serde_json::to_writer_pretty(&config_file, &self)?;

        Ok(())
    }

    /// Removes the config file if there is one.
    pub fn delete() -> Result<bool> {
        let path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if path.exists() {
            fs::remove_file(path)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Overrides fields from `lookup`, which maps a variable name to its value.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("TASKPAD_HOST") {
            self.server.get_or_insert_with(ServerConfig::default).host = host;
        }
        if let Some(port) = get("TASKPAD_PORT").and_then(|p| p.parse().ok()) {
            self.server.get_or_insert_with(ServerConfig::default).port = port;
        }
        if let Some(database) = get("TASKPAD_DATABASE") {
            self.server.get_or_insert_with(ServerConfig::default).database = Some(database);
        }
        if let Some(api_url) = get("TASKPAD_API_URL") {
            self.client.get_or_insert_with(ClientConfig::default).api_url = api_url;
        }
        if let Some(base_url) = get("GEMMA_API_BASE_URL") {
            self.llm.get_or_insert_with(LlmConfig::default).base_url = base_url;
        }
        if let Some(model) = get("GEMMA_MODEL_NAME") {
            self.llm.get_or_insert_with(LlmConfig::default).model = model;
        }
        if let Some(api_key) = get("GROQ_API_KEY").or_else(|| get("TASKPAD_LLM_API_KEY")) {
            self.llm.get_or_insert_with(LlmConfig::default).api_key = Some(api_key);
        }
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn llm(&self) -> LlmConfig {
        self.llm.clone().unwrap_or_default()
    }

    pub fn client(&self) -> ClientConfig {
        self.client.clone().unwrap_or_default()
    }

    /// Interactive wizard over the selected sections, starting from the saved values.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "server".to_string(),
                name: Message::ConfigModuleServer.to_string(),
            },
            ConfigModule {
                key: "llm".to_string(),
                name: Message::ConfigModuleLlm.to_string(),
            },
            ConfigModule {
                key: "client".to_string(),
                name: Message::ConfigModuleClient.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "server" => {
                    let default = config.server();
                    msg_print!(Message::ConfigModuleServer);
                    let database: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptServerDatabase.to_string())
                        .default(default.database.clone().unwrap_or_default())
                        .allow_empty(true)
                        .interact_text()?;
                    config.server = Some(ServerConfig {
                        host: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptServerHost.to_string())
                            .default(default.host)
                            .interact_text()?,
                        port: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptServerPort.to_string())
                            .default(default.port)
                            .interact_text()?,
                        cors: Confirm::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptServerCors.to_string())
                            .default(default.cors)
                            .interact()?,
                        database: Some(database).filter(|d| !d.is_empty()),
                    });
                }
                "llm" => {
                    let default = config.llm();
                    msg_print!(Message::ConfigModuleLlm);
                    let api_key: String = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptLlmApiKey.to_string())
                        .default(default.api_key.clone().unwrap_or_default())
                        .allow_empty(true)
                        .interact_text()?;
                    let timeout: u64 = Input::with_theme(&ColorfulTheme::default())
                        .with_prompt(Message::PromptLlmTimeout.to_string())
                        .default(default.timeout_secs.unwrap_or(0))
                        .interact_text()?;
                    config.llm = Some(LlmConfig {
                        base_url: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptLlmBaseUrl.to_string())
                            .default(default.base_url)
                            .interact_text()?,
                        model: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptLlmModel.to_string())
                            .default(default.model)
                            .interact_text()?,
                        api_key: Some(api_key).filter(|k| !k.is_empty()),
                        timeout_secs: Some(timeout).filter(|t| *t > 0),
                    });
                }
                "client" => {
                    let default = config.client();
                    msg_print!(Message::ConfigModuleClient);
                    config.client = Some(ClientConfig {
                        api_url: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptClientApiUrl.to_string())
                            .default(default.api_url)
                            .interact_text()?,
                        stale_secs: Input::with_theme(&ColorfulTheme::default())
                            .with_prompt(Message::PromptClientStaleSecs.to_string())
                            .default(default.stale_secs)
                            .interact_text()?,
                    });
                }
                _ => {}
            }
        }

        Ok(config)
    }
}
