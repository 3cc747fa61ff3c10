use clap::Args;

use brainshare_daemon::state::{AppConfig, AppState, StateError};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// API server port to write into config.toml
    #[arg(long)]
    pub api_port: Option<u16>,

    /// Credential lifetime in seconds (credentials never expire if unset)
    #[arg(long)]
    pub token_ttl_secs: Option<u64>,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = StateError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let defaults = AppConfig::default();
        let config = AppConfig {
            api_port: self.api_port.unwrap_or(defaults.api_port),
            token_ttl_secs: self.token_ttl_secs,
            ..defaults
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;
        Ok(format!(
            "initialized brainshare in {}\n  config: {}\n  database: {}\n  media: {}",
            state.app_dir.display(),
            state.config_path.display(),
            state.db_path.display(),
            state.media_path.display(),
        ))
    }
}
