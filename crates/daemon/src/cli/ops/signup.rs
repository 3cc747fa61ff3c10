use clap::Args;

use brainshare_daemon::http_server::api::client::ApiError;
use brainshare_daemon::http_server::api::v1::auth::SignupRequest;

#[derive(Args, Debug, Clone)]
pub struct Signup {
    #[command(flatten)]
    pub request: SignupRequest,
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Signup {
    type Error = ApiError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let response = ctx.client.call(self.request.clone()).await?;
        Ok(response.message)
    }
}
