//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use chefito::admin::setup_admin_router;
use chefito::admission::ManualClock;
use chefito::config::ChefitoConfig;
use chefito::recipes::{Ingredient, InMemoryCatalog, Recipe};
use chefito::speech::{SpeechError, SpeechRequest, SpeechSynthesizer, UnavailableSynthesizer};
use chefito::{HttpServer, Shutdown};
use futures_util::future::BoxFuture;
use tokio::net::TcpListener;

/// Synthesizer returning a fixed payload.
pub struct FakeSynthesizer;

impl SpeechSynthesizer for FakeSynthesizer {
    fn synthesize<'a>(&'a self, _request: &'a SpeechRequest) -> BoxFuture<'a, Result<Bytes, SpeechError>> {
        Box::pin(async { Ok(Bytes::from_static(b"ID3-fake-audio")) })
    }
}

pub fn sample_catalog() -> InMemoryCatalog {
    let catalog = InMemoryCatalog::new();
    catalog.insert(Recipe {
        id: "gazpacho".into(),
        title: "Gazpacho".into(),
        summary: "Cold tomato soup".into(),
        premium: false,
        ingredients: vec![Ingredient {
            name: "tomatoes".into(),
            quantity: Some("1 kg".into()),
        }],
        instructions: vec!["Blend everything".into()],
    });
    catalog.insert(Recipe {
        id: "paella".into(),
        title: "Paella valenciana".into(),
        summary: "Rice with chicken and rabbit".into(),
        premium: true,
        ingredients: vec![Ingredient {
            name: "bomba rice".into(),
            quantity: Some("400 g".into()),
        }],
        instructions: vec!["Brown the meat".into(), "Add rice and stock".into()],
    });
    catalog
}

/// A running server on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub admin_addr: SocketAddr,
    pub shutdown: Shutdown,
    /// Clock behind every admission guard; advance it instead of sleeping.
    pub clock: Arc<ManualClock>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn admin_url(&self, path: &str) -> String {
        format!("http://{}{}", self.admin_addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

pub const ADMIN_KEY: &str = "test-admin-key";

/// Start the service with the sample catalog and the admin API on its own port.
pub async fn start_server(config: ChefitoConfig, speech_works: bool) -> TestServer {
    let speech: Arc<dyn SpeechSynthesizer> = if speech_works {
        Arc::new(FakeSynthesizer)
    } else {
        Arc::new(UnavailableSynthesizer)
    };
    let clock = Arc::new(ManualClock::new());
    let server =
        HttpServer::with_collaborators(config, Arc::new(sample_catalog()), speech, clock.clone()).unwrap();

    let shutdown = Shutdown::new();

    let admin_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let admin_addr = admin_listener.local_addr().unwrap();
    let admin_router = setup_admin_router(server.state().clone(), ADMIN_KEY);
    let mut admin_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = axum::serve(admin_listener, admin_router)
            .with_graceful_shutdown(async move {
                let _ = admin_shutdown.recv().await;
            })
            .await;
    });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;

    TestServer {
        addr,
        admin_addr,
        shutdown,
        clock,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
