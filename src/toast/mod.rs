pub mod content;
pub mod platform;
pub mod samples;

use std::sync::{Arc, RwLock, Weak};

use crate::error::{RegistrationError, ToastError};
use content::ToastContent;
use platform::{ActivationSink, AppIdentity, HistoryEntry, NotificationPlatform};

/// Which process-lifetime registration steps have completed. Never reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationState {
    pub aumid_registered: bool,
    pub activator_registered: bool,
}

#[derive(Default)]
struct Registration {
    state: RegistrationState,
    identity: Option<AppIdentity>,
    /// Explicit AUMID, or `None` when the platform supplies identity (packaged)
    app_id: Option<String>,
}

/// Entry point for every notification operation.
///
/// Owns the [`RegistrationState`] and refuses to show toasts or touch the history
/// until both the identity and the activation endpoint are registered.
pub struct ToastManager {
    platform: Arc<dyn NotificationPlatform>,
    registration: RwLock<Registration>,
}

impl ToastManager {
    pub fn new(platform: Arc<dyn NotificationPlatform>) -> Self {
        Self {
            platform,
            registration: RwLock::new(Registration::default()),
        }
    }

    /// Registers the AUMID and the COM server that hosts the activation endpoint.
    ///
    /// Packaged processes get their identity from the package manifest, so this only
    /// records that registration happened.
    pub fn register_identity(&self, identity: &AppIdentity) -> Result<(), RegistrationError> {
        if identity.app_id.trim().is_empty() {
            return Err(RegistrationError::InvalidIdentity(
                "an application id is required".into(),
            ));
        }
        if identity.display_name.trim().is_empty() {
            return Err(RegistrationError::InvalidIdentity(
                "a display name is required".into(),
            ));
        }

        let app_id = if self.platform.is_packaged() {
            tracing::info!(target: "toast", "Running with package identity, skipping AUMID registration");
            None
        } else {
            self.platform.register_identity(identity)?;
            Some(identity.app_id.clone())
        };

        let mut registration = self.registration.write().unwrap();
        registration.state.aumid_registered = true;
        registration.identity = Some(identity.clone());
        registration.app_id = app_id;

        tracing::info!(target: "toast", app_id = %identity.app_id, "Application identity registered");
        Ok(())
    }

    /// Exposes the activation endpoint. Requires [`ToastManager::register_identity`].
    pub fn register_activator(
        &self,
        sink: Weak<dyn ActivationSink>,
    ) -> Result<(), RegistrationError> {
        let identity = self
            .registration
            .read()
            .unwrap()
            .identity
            .clone()
            .ok_or(RegistrationError::IdentityNotRegistered)?;

        self.platform.register_activation_endpoint(&identity, sink)?;
        self.registration.write().unwrap().state.activator_registered = true;

        tracing::info!(target: "toast", clsid = %identity.braced_clsid(), "Activation endpoint registered");
        Ok(())
    }

    pub fn registration_state(&self) -> RegistrationState {
        self.registration.read().unwrap().state
    }

    fn ensure_registered(&self) -> Result<Option<String>, RegistrationError> {
        let registration = self.registration.read().unwrap();
        if !registration.state.aumid_registered {
            return Err(RegistrationError::IdentityNotRegistered);
        }
        if !registration.state.activator_registered {
            return Err(RegistrationError::ActivatorNotRegistered);
        }
        Ok(registration.app_id.clone())
    }

    pub fn show(&self, content: &ToastContent) -> Result<(), ToastError> {
        let app_id = self.ensure_registered()?;
        self.platform.show(app_id.as_deref(), content)?;
        tracing::debug!(target: "toast", tag = ?content.tag, "Toast shown");
        Ok(())
    }

    pub fn history(&self) -> Result<History<'_>, RegistrationError> {
        let app_id = self.ensure_registered()?;
        Ok(History {
            platform: self.platform.as_ref(),
            app_id,
        })
    }

    /// Remote (http) images only render for packaged processes.
    pub fn can_use_http_images(&self) -> bool {
        self.platform.is_packaged()
    }

    /// Clears this application's toasts and removes its registrations.
    ///
    /// Only the identity has to be registered, the activation endpoint is not needed.
    pub fn uninstall(&self) -> Result<(), ToastError> {
        let (identity, app_id) = {
            let registration = self.registration.read().unwrap();
            if !registration.state.aumid_registered {
                return Err(RegistrationError::IdentityNotRegistered.into());
            }
            (registration.identity.clone(), registration.app_id.clone())
        };

        self.platform.clear_history(app_id.as_deref())?;

        if let Some(identity) = identity {
            if !self.platform.is_packaged() {
                self.platform.unregister(&identity)?;
            }
            tracing::info!(target: "toast", app_id = %identity.app_id, "Application registration removed");
        }
        Ok(())
    }
}

/// This application's toasts in the action center.
pub struct History<'a> {
    platform: &'a dyn NotificationPlatform,
    app_id: Option<String>,
}

impl History<'_> {
    pub fn entries(&self) -> Result<Vec<HistoryEntry>, ToastError> {
        Ok(self.platform.history_entries(self.app_id.as_deref())?)
    }

    pub fn clear(&self) -> Result<(), ToastError> {
        self.platform.clear_history(self.app_id.as_deref())?;
        tracing::debug!(target: "toast", "Notification history cleared");
        Ok(())
    }

    pub fn remove(&self, tag: &str) -> Result<(), ToastError> {
        Ok(self
            .platform
            .remove_from_history(self.app_id.as_deref(), tag, None)?)
    }

    pub fn remove_grouped(&self, tag: &str, group: &str) -> Result<(), ToastError> {
        Ok(self
            .platform
            .remove_from_history(self.app_id.as_deref(), tag, Some(group))?)
    }

    pub fn remove_group(&self, group: &str) -> Result<(), ToastError> {
        Ok(self
            .platform
            .remove_group_from_history(self.app_id.as_deref(), group)?)
    }
}
