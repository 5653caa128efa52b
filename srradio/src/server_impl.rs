//! Implementation of [`SverigesRadioExt`](crate::SverigesRadioExt) for `srserver::Server`

use crate::api_rest::{create_router, ApiDoc};
use crate::server_ext::{SverigesRadioExt, SverigesRadioState};
use anyhow::Result;
use srconfig::Config;
use srserver::Server;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;

/// Name under which the API is mounted (`/api/v1`, `/swagger-ui/v1`)
pub const API_NAME: &str = "v1";

impl SverigesRadioExt for Server {
    async fn init_sverigesradio(&mut self, config: &Config) -> Result<Arc<SverigesRadioState>> {
        info!("Initializing Sveriges Radio API...");

        let state = SverigesRadioState::from_config(config)
            .map_err(|e| anyhow::anyhow!("Failed to create Sveriges Radio client: {}", e))?;

        self.init_sverigesradio_with_state(state).await
    }

    async fn init_sverigesradio_with_state(
        &mut self,
        state: SverigesRadioState,
    ) -> Result<Arc<SverigesRadioState>> {
        let router = create_router(state.clone());
        self.add_openapi(router, ApiDoc::openapi(), API_NAME).await;

        info!(
            base_url = state.aggregator.source().base_url(),
            "Sveriges Radio API initialized"
        );
        info!("API endpoints available at /api/{}/*", API_NAME);

        Ok(Arc::new(state))
    }
}
