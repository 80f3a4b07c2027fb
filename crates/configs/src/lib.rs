use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self { data_file: default_data_file() }
    }
}

fn default_data_file() -> String {
    "data/beers.json".to_string()
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.store.normalize_from_env();
        self.store.validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl StoreConfig {
    pub fn normalize_from_env(&mut self) {
        // Env var wins over the TOML default when the file path was left empty.
        if self.data_file.trim().is_empty() {
            if let Ok(path) = std::env::var("BEERSTOCK_DATA_FILE") {
                self.data_file = path;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.data_file.trim().is_empty() {
            return Err(anyhow!(
                "store.data_file is empty; set it in config.toml or via BEERSTOCK_DATA_FILE"
            ));
        }
        if !self.data_file.ends_with(".json") {
            return Err(anyhow!("store.data_file must point to a .json file"));
        }
        Ok(())
    }
}
