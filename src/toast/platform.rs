use std::sync::Weak;

use uuid::Uuid;

use crate::activation::Activation;
use crate::error::PlatformError;
use crate::toast::content::ToastContent;

/// Identity under which this process sends toasts and receives their activations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppIdentity {
    /// Application User Model ID
    pub app_id: String,
    pub display_name: String,
    pub icon_path: Option<String>,
    /// CLSID of the COM class the platform launches on activation
    pub activator_clsid: Uuid,
}

impl AppIdentity {
    /// `{XXXXXXXX-XXXX-XXXX-XXXX-XXXXXXXXXXXX}` form used in the registry.
    pub fn braced_clsid(&self) -> String {
        format!(
            "{{{}}}",
            self.activator_clsid.hyphenated().to_string().to_uppercase()
        )
    }
}

/// Tag and group of a toast still present in the action center.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub tag: String,
    pub group: String,
}

/// Receives activations delivered by the platform, on whatever thread it chooses.
pub trait ActivationSink: Send + Sync {
    fn activate(&self, activation: Activation);
}

/// The operating system's notification service.
///
/// `app_id` is `None` for packaged processes, whose identity is implicit.
pub trait NotificationPlatform: Send + Sync {
    /// Whether the process runs with package identity.
    fn is_packaged(&self) -> bool;

    fn register_identity(&self, identity: &AppIdentity) -> Result<(), PlatformError>;

    /// Exposes the activation endpoint so the platform can call back into `sink`.
    fn register_activation_endpoint(
        &self,
        identity: &AppIdentity,
        sink: Weak<dyn ActivationSink>,
    ) -> Result<(), PlatformError>;

    fn show(&self, app_id: Option<&str>, content: &ToastContent) -> Result<(), PlatformError>;

    fn history_entries(&self, app_id: Option<&str>) -> Result<Vec<HistoryEntry>, PlatformError>;

    fn clear_history(&self, app_id: Option<&str>) -> Result<(), PlatformError>;

    /// Removes toasts by tag, optionally scoped to a group.
    fn remove_from_history(
        &self,
        app_id: Option<&str>,
        tag: &str,
        group: Option<&str>,
    ) -> Result<(), PlatformError>;

    fn remove_group_from_history(&self, app_id: Option<&str>, group: &str)
    -> Result<(), PlatformError>;

    /// Deletes everything `register_identity` and `register_activation_endpoint` persisted.
    fn unregister(&self, identity: &AppIdentity) -> Result<(), PlatformError>;
}
