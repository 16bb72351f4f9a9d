//! Shiftdeck console UI
//!
//! Browser front end built with Yew. Provides the admin console for
//! namespaces, users, roles, network policies and egress IPs on top of the
//! platform-independent `shiftdeck-common` crate.

mod api;
mod components;
mod console;
mod logging;
mod pages;

pub use console::{Console, ConsoleProps};
pub use logging::LoggingConfig;

/// Entry point for WASM
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run_app() {
    console_error_panic_hook::set_once();

    let config = api::load_config();
    if let Err(e) = LoggingConfig::new(&config.log_level).init() {
        web_sys::console::warn_1(&format!("Logging setup failed: {}", e).into());
    }

    tracing::info!(sandbox = config.is_sandbox(), "Starting console");
    yew::Renderer::<Console>::with_props(ConsoleProps { config }).render();
}
