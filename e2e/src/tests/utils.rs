use std::sync::Once;

use httpmock::MockServer;
use me3_server::{AppContext, ConfigToml, Me3Server};
use url::Url;

static TRACING_INIT: Once = Once::new();

/// Initializes the tracing subscriber for tests.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(std::env::var("TRACING").unwrap_or_else(|_| "info".to_string()))
            // Use with_test_writer to ensure logs are captured correctly by the test runner.
            .with_test_writer()
            .init();
    });
}

/// A running server wired to a mocked content store and a mocked Kubo node.
pub struct Testbed {
    pub server: Me3Server,
    pub store: MockServer,
    pub kubo: MockServer,
    pub client: reqwest::Client,
    _data_dir: tempfile::TempDir,
}

impl Testbed {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    pub async fn start_with(configure: impl FnOnce(&mut ConfigToml)) -> Self {
        init_tracing();
        let store = MockServer::start_async().await;
        let kubo = MockServer::start_async().await;
        let data_dir = tempfile::tempdir().unwrap();

        let mut config = ConfigToml::test();
        config.content_store.endpoint = store.base_url().parse().unwrap();
        config.content_store.api_token = Some("store-token".to_string());
        config.name_service.endpoint = kubo.base_url().parse().unwrap();
        configure(&mut config);

        let context = AppContext::from_config(config, data_dir.path().to_path_buf()).unwrap();
        let server = Me3Server::start(context).await.unwrap();

        Self {
            server,
            store,
            kubo,
            client: reqwest::Client::new(),
            _data_dir: data_dir,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.server.url().join(path).unwrap()
    }
}
