use clap::Args;

use brainshare_daemon::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

async fn probe(client: &reqwest::Client, base: &url::Url, path: &str) -> String {
    let url = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => "OK".to_string(),
        Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
        Err(_) => "NOT REACHABLE".to_string(),
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = vec!["Config:".to_string()];
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:  {}", state.app_dir.display()));
                lines.push("  config.toml: OK".to_string());
                lines.push("  db.sqlite:   OK".to_string());
                lines.push("  jwt.secret:  OK".to_string());
                lines.push(format!("  api_port:   {}", state.config.api_port));
                lines.push(format!("  media:      {:?}", state.media_config()));
            }
            Err(e) => lines.push(format!("  error: {}", e)),
        }

        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));
        lines.push(format!("  livez:  {}", probe(client, base, "/_status/livez").await));
        lines.push(format!("  readyz: {}", probe(client, base, "/_status/readyz").await));

        Ok(lines.join("\n"))
    }
}
