pub mod activation;
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod logging;
#[cfg(windows)]
pub mod shellext;
pub mod toast;

#[cfg(test)]
mod test_support;

pub use app::{AppContext, ExitDecision, WindowCommand};
pub use config::{AppConfig, ConfigManager};
pub use error::{PlatformError, RegistrationError, ToastError};
pub use logging::{LogConfig, LogGuard};
pub use toast::ToastManager;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en");

/// Resolves the UI language from the configuration or the system locale.
pub fn effective_locale(configured: Option<String>) -> String {
    configured.unwrap_or_else(|| sys_locale::get_locale().unwrap_or_else(|| String::from("en-US")))
}

/// Selects the language used by every `t!` lookup.
pub fn init_locale(configured: Option<String>) {
    let locale = effective_locale(configured);
    rust_i18n::set_locale(&locale);
}
