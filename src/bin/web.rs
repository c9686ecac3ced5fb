use std::sync::Arc;

use coursenotes::client::ApiClient;
use coursenotes::config::WebConfig;
use coursenotes::{logging, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init_tracing();
    let config = WebConfig::from_env()?;

    tracing::info!(api = %config.api_base_url, "viewer reading from remote API");
    let client = ApiClient::new(config.api_base_url.clone());
    server::serve(server::viewer_app(Arc::new(client)), config.listen_addr()).await
}
