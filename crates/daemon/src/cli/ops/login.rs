use clap::Args;

use brainshare_daemon::http_server::api::client::ApiError;
use brainshare_daemon::http_server::api::v1::auth::LoginRequest;

/// Log in and print a credential to pass back with `--token`.
#[derive(Args, Debug, Clone)]
pub struct Login {
    #[command(flatten)]
    pub request: LoginRequest,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Login {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.request.clone()).await?;
        Ok(response.token)
    }
}
