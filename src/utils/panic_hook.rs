use std::panic;

use tracing::{error, info};

/// Chains a reporting hook after whatever hook is already installed, so the
/// default printer (or the browser console hook) keeps running first.
pub fn set_reporting_panic_hook() {
    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        original_hook(panic_info);

        let message = if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else {
            "Unknown panic".to_string()
        };

        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown location".to_string());

        error!(%message, %location, "panic reported");
    }));
}

/// Call once during client start-up.
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();

    set_reporting_panic_hook();
    info!("panic hook installed");
}
