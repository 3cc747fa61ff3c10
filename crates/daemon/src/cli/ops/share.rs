use clap::Args;

use brainshare_daemon::http_server::api::client::ApiError;
use brainshare_daemon::http_server::api::v1::brain::ShareRequest;

/// Publish or withdraw your collection's share link. Needs `--token`.
#[derive(Args, Debug, Clone)]
pub struct Share {
    #[command(flatten)]
    pub request: ShareRequest,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.request.clone()).await?;
        Ok(match response.link {
            Some(link) => format!(
                "{}\n  {}",
                response.message,
                ctx.client.base_url().join(&format!("/api/v1/brain/{}", link))?
            ),
            None => response.message,
        })
    }
}
