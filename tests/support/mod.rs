// Shared status server bootstrapped once per integration test binary.
#![allow(dead_code)]

use dis_engine::interface_adapters::state::AppState;
use dis_engine::use_cases::{PduCounters, RunMode};
use std::{
    sync::{Arc, OnceLock},
    time::Duration,
};

pub struct StatusServer {
    pub base_url: String,
    // Same counters the server reports from.
    pub counters: Arc<PduCounters>,
}

static SERVER: OnceLock<StatusServer> = OnceLock::new();

// Start the status API on an ephemeral port and return it.
pub fn ensure_status_server() -> &'static StatusServer {
    SERVER.get_or_init(|| {
        let counters = Arc::new(PduCounters::default());
        let published_url = Arc::new(OnceLock::<String>::new());
        let published_url_thread = Arc::clone(&published_url);
        let state = AppState {
            counters: counters.clone(),
            mode: RunMode::Listen,
        };

        // Own thread and runtime so the server outlives each `#[tokio::test]` runtime.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                dis_engine::serve_status(listener, state)
                    .await
                    .expect("status server failed");
            });
        });

        let base_url = wait_for_readiness(published_url);
        StatusServer { base_url, counters }
    })
}

fn wait_for_readiness(published_url: Arc<OnceLock<String>>) -> String {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        std::thread::sleep(Duration::from_millis(10));
    };

    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return base_url;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("status server did not become ready in time");
}
