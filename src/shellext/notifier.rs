use std::sync::Weak;

use windows::{
    ApplicationModel::Package,
    Data::Xml::Dom::XmlDocument,
    UI::Notifications::{ToastNotification, ToastNotificationHistory, ToastNotificationManager},
    core::*,
};

use crate::error::PlatformError;
use crate::shellext::registry;
use crate::shellext::shell_service::ShellServices;
use crate::toast::content::ToastContent;
use crate::toast::platform::{ActivationSink, AppIdentity, HistoryEntry, NotificationPlatform};

/// Notification platform backed by the WinRT toast APIs.
pub struct WinRtPlatform {
    services: ShellServices,
    packaged: bool,
}

impl WinRtPlatform {
    /// Initializes COM on the calling thread, which must be the UI thread.
    pub fn new() -> std::result::Result<Self, PlatformError> {
        let services = ShellServices::init()?;
        let packaged = Package::Current().is_ok();
        tracing::info!(target: "shellext::notifier", packaged, "Notification platform ready");
        Ok(Self { services, packaged })
    }

    fn history(&self) -> Result<ToastNotificationHistory> {
        ToastNotificationManager::History()
    }
}

fn clsid(identity: &AppIdentity) -> GUID {
    GUID::from_u128(identity.activator_clsid.as_u128())
}

impl NotificationPlatform for WinRtPlatform {
    fn is_packaged(&self) -> bool {
        self.packaged
    }

    fn register_identity(&self, identity: &AppIdentity) -> std::result::Result<(), PlatformError> {
        let exe = std::env::current_exe().map_err(|e| PlatformError::os(-1, e.to_string()))?;
        registry::register(identity, &exe)?;
        Ok(())
    }

    fn register_activation_endpoint(
        &self,
        identity: &AppIdentity,
        sink: Weak<dyn ActivationSink>,
    ) -> std::result::Result<(), PlatformError> {
        self.services
            .register_toast_activator(&clsid(identity), sink)?;
        Ok(())
    }

    fn show(
        &self,
        app_id: Option<&str>,
        content: &ToastContent,
    ) -> std::result::Result<(), PlatformError> {
        let xml = content.to_xml();
        tracing::trace!(target: "shellext::notifier", %xml, "Showing toast");

        let document = XmlDocument::new()?;
        document.LoadXml(&HSTRING::from(xml))?;

        let toast = ToastNotification::CreateToastNotification(&document)?;
        if let Some(tag) = &content.tag {
            toast.SetTag(&HSTRING::from(tag.as_str()))?;
        }
        if let Some(group) = &content.group {
            toast.SetGroup(&HSTRING::from(group.as_str()))?;
        }

        let notifier = match app_id {
            Some(id) => ToastNotificationManager::CreateToastNotifierWithId(&HSTRING::from(id))?,
            None => ToastNotificationManager::CreateToastNotifier()?,
        };
        notifier.Show(&toast)?;
        Ok(())
    }

    fn history_entries(
        &self,
        app_id: Option<&str>,
    ) -> std::result::Result<Vec<HistoryEntry>, PlatformError> {
        let history = self.history()?;
        let toasts = match app_id {
            Some(id) => history.GetHistoryWithId(&HSTRING::from(id))?,
            None => history.GetHistory()?,
        };

        let mut entries = Vec::new();
        for toast in toasts {
            entries.push(HistoryEntry {
                tag: toast.Tag()?.to_string(),
                group: toast.Group()?.to_string(),
            });
        }
        Ok(entries)
    }

    fn clear_history(&self, app_id: Option<&str>) -> std::result::Result<(), PlatformError> {
        let history = self.history()?;
        match app_id {
            Some(id) => history.ClearWithId(&HSTRING::from(id))?,
            None => history.Clear()?,
        }
        Ok(())
    }

    fn remove_from_history(
        &self,
        app_id: Option<&str>,
        tag: &str,
        group: Option<&str>,
    ) -> std::result::Result<(), PlatformError> {
        let history = self.history()?;
        let tag = HSTRING::from(tag);
        match (app_id, group) {
            (Some(id), group) => history.RemoveGroupedTagWithId(
                &tag,
                &HSTRING::from(group.unwrap_or_default()),
                &HSTRING::from(id),
            )?,
            (None, Some(group)) => history.RemoveGroupedTag(&tag, &HSTRING::from(group))?,
            (None, None) => history.Remove(&tag)?,
        }
        Ok(())
    }

    fn remove_group_from_history(
        &self,
        app_id: Option<&str>,
        group: &str,
    ) -> std::result::Result<(), PlatformError> {
        let history = self.history()?;
        let group = HSTRING::from(group);
        match app_id {
            Some(id) => history.RemoveGroupWithId(&group, &HSTRING::from(id))?,
            None => history.RemoveGroup(&group)?,
        }
        Ok(())
    }

    fn unregister(&self, identity: &AppIdentity) -> std::result::Result<(), PlatformError> {
        registry::unregister(identity)?;
        Ok(())
    }
}
