use super::ConfigError;
use serde::{de::DeserializeOwned, Serialize};
use std::path::Path;
use tokio::io::AsyncReadExt;

#[async_trait::async_trait]
pub trait Persist: Serialize + DeserializeOwned + Send + Sync {
    async fn load<P: AsRef<Path> + Send + Sync>(config_file: P) -> Result<Self, ConfigError> {
        let mut file = tokio::fs::File::open(config_file).await?;
        let mut buf = String::new();
        file.read_to_string(&mut buf).await?;
        let deser = serde_json::from_str::<Self>(&buf)?;
        Ok(deser)
    }

    async fn save<P: AsRef<Path> + Send + Sync>(&self, config_file: P) -> Result<(), ConfigError> {
        let json = serde_json::to_vec_pretty(&self)?;
        tokio::fs::write(config_file, json).await?;
        Ok(())
    }
}
