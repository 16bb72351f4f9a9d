//! Browser bindings for the cluster API client

use std::rc::Rc;

use async_trait::async_trait;
use gloo_net::http::Request;
use gloo_storage::{LocalStorage, Storage};
use shiftdeck_common::config::CONFIG_ELEMENT_ID;
use shiftdeck_common::sandbox::SandboxCluster;
use shiftdeck_common::view::Toast;
use shiftdeck_common::{
    ApiRequest, ApiResponse, ClusterClient, ConsoleConfig, Error, Method, Result, TokenStore,
    Transport,
};
use tracing::{info, warn};
use yew::Callback;

/// HTTP transport over the browser's fetch API
pub struct GlooTransport;

fn transport_error(e: gloo_net::Error) -> Error {
    Error::Transport(e.to_string())
}

#[async_trait(?Send)]
impl Transport for GlooTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let mut builder = match request.method {
            Method::Get => Request::get(&request.url),
            Method::Post => Request::post(&request.url),
            Method::Put => Request::put(&request.url),
            Method::Delete => Request::delete(&request.url),
        };

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let prepared = match request.body {
            Some(body) => builder.body(body),
            None => builder.build(),
        }
        .map_err(transport_error)?;

        let response = prepared.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        Ok(ApiResponse { status, body })
    }
}

/// Either a real cluster or the in-page sandbox
pub enum ConsoleTransport {
    Http(GlooTransport),
    Sandbox(SandboxCluster),
}

#[async_trait(?Send)]
impl Transport for ConsoleTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        match self {
            ConsoleTransport::Http(http) => http.send(request).await,
            ConsoleTransport::Sandbox(sandbox) => sandbox.send(request).await,
        }
    }
}

/// Raw string values in `window.localStorage`
pub struct BrowserStorage;

impl TokenStore for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        LocalStorage::raw().get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if LocalStorage::raw().set_item(key, value).is_err() {
            warn!(key, "Failed to persist value to local storage");
        }
    }

    fn remove(&self, key: &str) {
        LocalStorage::delete(key);
    }
}

pub type Api = Rc<ClusterClient<ConsoleTransport, BrowserStorage>>;

/// Build the client for `config`. Session notices go to `notify`.
pub fn connect(config: &ConsoleConfig, notify: Callback<Toast>) -> Api {
    let transport = if config.is_sandbox() {
        ConsoleTransport::Sandbox(SandboxCluster::seeded())
    } else {
        ConsoleTransport::Http(GlooTransport)
    };

    let client = ClusterClient::new(config, transport, BrowserStorage)
        .with_notifier(move |toast| notify.emit(toast));

    if config.is_sandbox() && !client.is_authenticated() {
        info!("Sandbox mode, installing sandbox token");
        client.set_token(SandboxCluster::TOKEN);
    }

    Rc::new(client)
}

/// Configuration from the host page, falling back to build-time values
pub fn load_config() -> ConsoleConfig {
    let embedded = web_sys::window()
        .and_then(|window| window.document())
        .and_then(|document| document.get_element_by_id(CONFIG_ELEMENT_ID))
        .and_then(|element| element.text_content())
        .filter(|raw| !raw.trim().is_empty());

    let Some(raw) = embedded else {
        return ConsoleConfig::from_build_env();
    };

    match ConsoleConfig::from_json(&raw) {
        Ok(config) => config,
        Err(e) => {
            // Logging is not up yet
            web_sys::console::warn_1(&format!("Ignoring embedded config: {}", e).into());
            ConsoleConfig::from_build_env()
        }
    }
}
