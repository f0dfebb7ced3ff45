pub mod notifier;
pub mod registry;
pub mod shell_service;
pub mod toast;
pub mod window;

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;

use crate::activation::rendezvous::Rendezvous;
use crate::activation::role::{LaunchOptions, ProcessRole, RoleTracker};
use crate::app::AppContext;
use crate::config::AppConfig;
use crate::toast::ToastManager;
use crate::toast::platform::ActivationSink;
use notifier::WinRtPlatform;
use window::{MainWindow, ThreadMessageWaker};

/// How long shutdown waits for running activation callbacks before releasing COM.
const ACTIVATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs the application on the calling thread until it exits. Returns the exit code.
pub fn run(config: &AppConfig, options: LaunchOptions) -> Result<i32> {
    // COM lives as long as the platform, which is dropped last
    let platform = Arc::new(WinRtPlatform::new().context("Failed to initialize COM")?);
    let toasts = Arc::new(ToastManager::new(platform.clone()));

    toasts
        .register_identity(&config.identity())
        .context("Failed to register application identity")?;

    if options.uninstall {
        toasts
            .uninstall()
            .context("Failed to remove application registration")?;
        tracing::info!(target: "main", "Uninstalled");
        return Ok(0);
    }

    let waker = Arc::new(ThreadMessageWaker::current());
    let roles = Arc::new(RoleTracker::new());
    let role = roles.determine_initial_role(&options);

    let main_window = Arc::new(MainWindow::new());
    let (rendezvous, queue) = Rendezvous::new(
        main_window.clone(),
        roles.clone(),
        waker,
        config.rendezvous_timeout(),
    );
    let context = Arc::new(AppContext::new(
        toasts.clone(),
        roles,
        rendezvous.clone(),
        config.conversation_id,
    ));
    main_window.bind(&context);

    if role == ProcessRole::Interactive {
        rendezvous
            .ensure_window()
            .context("Failed to create main window")?;
    }

    let sink: Arc<dyn ActivationSink> = context.clone();
    toasts
        .register_activator(Arc::downgrade(&sink))
        .context("Failed to register toast activator")?;

    let exit_code = window::run_message_loop(&queue);
    main_window.close();

    // The activation that requested the exit may still be returning from Activate
    if !context.wait_for_idle(ACTIVATION_DRAIN_TIMEOUT) {
        tracing::warn!(target: "main", "Releasing COM with activations still running");
    }

    Ok(exit_code)
}
