//! Test doubles shared by the unit tests.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, Weak};
use std::thread::{self, ThreadId};
use std::time::Duration;

use uuid::Uuid;

use crate::activation::Activation;
use crate::activation::rendezvous::{UiWaker, WindowSurface};
use crate::activation::role::{LaunchOptions, RoleTracker};
use crate::error::PlatformError;
use crate::toast::ToastManager;
use crate::toast::content::ToastContent;
use crate::toast::platform::{ActivationSink, AppIdentity, HistoryEntry, NotificationPlatform};

pub fn sample_identity() -> AppIdentity {
    AppIdentity {
        app_id: "Sample.DesktopToasts".into(),
        display_name: "Desktop Toasts".into(),
        icon_path: None,
        activator_clsid: Uuid::parse_str("23a5b06e-20bb-4e7e-a0ac-6982ed6a6041").unwrap(),
    }
}

pub fn headless_roles() -> Arc<RoleTracker> {
    let roles = Arc::new(RoleTracker::new());
    roles.determine_initial_role(&LaunchOptions {
        toast_activated: true,
        uninstall: false,
    });
    roles
}

/// A manager with both registration steps done against `platform`.
pub fn registered_manager(platform: Arc<RecordingPlatform>) -> Arc<ToastManager> {
    let manager = ToastManager::new(platform);
    manager.register_identity(&sample_identity()).unwrap();
    let sink: Arc<dyn ActivationSink> = Arc::new(NullSink);
    manager.register_activator(Arc::downgrade(&sink)).unwrap();
    Arc::new(manager)
}

pub struct NullSink;

impl ActivationSink for NullSink {
    fn activate(&self, _activation: Activation) {}
}

pub struct NoopWaker;

impl UiWaker for NoopWaker {
    fn wake(&self) -> Result<(), PlatformError> {
        Ok(())
    }
}

/// Signals a channel on every wake, so a test can tell when a request is queued.
pub struct ChannelWaker {
    woken: Mutex<Sender<()>>,
}

impl ChannelWaker {
    pub fn new() -> (Self, Receiver<()>) {
        let (tx, rx) = mpsc::channel();
        (
            Self {
                woken: Mutex::new(tx),
            },
            rx,
        )
    }
}

impl UiWaker for ChannelWaker {
    fn wake(&self) -> Result<(), PlatformError> {
        let _ = self.woken.lock().unwrap().send(());
        Ok(())
    }
}

#[derive(Default)]
struct PlatformLog {
    shown: Vec<(Option<String>, ToastContent)>,
    identities: usize,
    endpoints: usize,
    unregistered: usize,
    history_calls: Vec<String>,
    registration_failure: Option<PlatformError>,
    show_failure: Option<PlatformError>,
}

/// In-memory notification platform that records every call.
#[derive(Default)]
pub struct RecordingPlatform {
    packaged: bool,
    log: Mutex<PlatformLog>,
}

impl RecordingPlatform {
    pub fn packaged() -> Self {
        Self {
            packaged: true,
            ..Default::default()
        }
    }

    pub fn fail_registration(&self, error: PlatformError) {
        self.log.lock().unwrap().registration_failure = Some(error);
    }

    pub fn fail_show(&self, error: PlatformError) {
        self.log.lock().unwrap().show_failure = Some(error);
    }

    pub fn shown(&self) -> Vec<(Option<String>, ToastContent)> {
        self.log.lock().unwrap().shown.clone()
    }

    pub fn registered_identities(&self) -> usize {
        self.log.lock().unwrap().identities
    }

    pub fn registered_endpoints(&self) -> usize {
        self.log.lock().unwrap().endpoints
    }

    pub fn unregistered(&self) -> usize {
        self.log.lock().unwrap().unregistered
    }

    pub fn history_calls(&self) -> Vec<String> {
        self.log.lock().unwrap().history_calls.clone()
    }

    fn record_history(&self, call: String) {
        self.log.lock().unwrap().history_calls.push(call);
    }
}

fn app_label(app_id: Option<&str>) -> &str {
    app_id.unwrap_or("<package>")
}

impl NotificationPlatform for RecordingPlatform {
    fn is_packaged(&self) -> bool {
        self.packaged
    }

    fn register_identity(&self, _identity: &AppIdentity) -> Result<(), PlatformError> {
        let mut log = self.log.lock().unwrap();
        if let Some(e) = log.registration_failure.clone() {
            return Err(e);
        }
        log.identities += 1;
        Ok(())
    }

    fn register_activation_endpoint(
        &self,
        _identity: &AppIdentity,
        _sink: Weak<dyn ActivationSink>,
    ) -> Result<(), PlatformError> {
        let mut log = self.log.lock().unwrap();
        if let Some(e) = log.registration_failure.clone() {
            return Err(e);
        }
        log.endpoints += 1;
        Ok(())
    }

    fn show(&self, app_id: Option<&str>, content: &ToastContent) -> Result<(), PlatformError> {
        let mut log = self.log.lock().unwrap();
        if let Some(e) = log.show_failure.clone() {
            return Err(e);
        }
        log.shown.push((app_id.map(str::to_string), content.clone()));
        Ok(())
    }

    fn history_entries(&self, _app_id: Option<&str>) -> Result<Vec<HistoryEntry>, PlatformError> {
        let log = self.log.lock().unwrap();
        Ok(log
            .shown
            .iter()
            .filter_map(|(_, content)| {
                content.tag.as_ref().map(|tag| HistoryEntry {
                    tag: tag.clone(),
                    group: content.group.clone().unwrap_or_default(),
                })
            })
            .collect())
    }

    fn clear_history(&self, app_id: Option<&str>) -> Result<(), PlatformError> {
        self.record_history(format!("clear {}", app_label(app_id)));
        Ok(())
    }

    fn remove_from_history(
        &self,
        app_id: Option<&str>,
        tag: &str,
        group: Option<&str>,
    ) -> Result<(), PlatformError> {
        self.record_history(format!(
            "remove {} {} {}",
            app_label(app_id),
            tag,
            group.unwrap_or("-")
        ));
        Ok(())
    }

    fn remove_group_from_history(
        &self,
        app_id: Option<&str>,
        group: &str,
    ) -> Result<(), PlatformError> {
        self.record_history(format!("remove-group {} {}", app_label(app_id), group));
        Ok(())
    }

    fn unregister(&self, _identity: &AppIdentity) -> Result<(), PlatformError> {
        self.log.lock().unwrap().unregistered += 1;
        Ok(())
    }
}

#[derive(Default)]
struct WindowLog {
    created: usize,
    restored: usize,
    created_on: Option<ThreadId>,
    texts: Vec<String>,
}

/// Window surface that records what was done to it.
#[derive(Default)]
pub struct FakeWindow {
    create_delay: Option<Duration>,
    fail_create: bool,
    log: Mutex<WindowLog>,
}

impl FakeWindow {
    pub fn failing() -> Self {
        Self {
            fail_create: true,
            ..Default::default()
        }
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = Some(delay);
        self
    }

    pub fn created(&self) -> usize {
        self.log.lock().unwrap().created
    }

    pub fn restored(&self) -> usize {
        self.log.lock().unwrap().restored
    }

    pub fn created_on(&self) -> Option<ThreadId> {
        self.log.lock().unwrap().created_on
    }

    pub fn texts(&self) -> Vec<String> {
        self.log.lock().unwrap().texts.clone()
    }
}

impl WindowSurface for FakeWindow {
    fn create(&self) -> Result<(), PlatformError> {
        if self.fail_create {
            return Err(PlatformError::os(0x80004005u32 as i32, "Unspecified error"));
        }
        if let Some(delay) = self.create_delay {
            thread::sleep(delay);
        }
        let mut log = self.log.lock().unwrap();
        log.created += 1;
        log.created_on = Some(thread::current().id());
        Ok(())
    }

    fn restore_and_foreground(&self) -> Result<(), PlatformError> {
        self.log.lock().unwrap().restored += 1;
        Ok(())
    }

    fn set_display_text(&self, text: &str) -> Result<(), PlatformError> {
        self.log.lock().unwrap().texts.push(text.to_string());
        Ok(())
    }
}
