use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::activation::Activation;
use crate::activation::rendezvous::Rendezvous;
use crate::activation::role::RoleTracker;
use crate::activation::router::{ActivationOutcome, ActivationRouter};
use crate::error::ToastError;
use crate::toast::ToastManager;
use crate::toast::platform::ActivationSink;
use crate::toast::samples::conversation_toast;

/// What the host should do once an activation has been handled.
///
/// `Terminate` means an exit was requested. The UI thread drops the request if a
/// window has been opened by the time it gets to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitDecision {
    KeepRunning,
    Terminate,
}

/// Commands issued by the window's own controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowCommand {
    SendToast,
    ClearToasts,
}

/// Process-wide state shared by the activation callback, the router and the window.
pub struct AppContext {
    toasts: Arc<ToastManager>,
    roles: Arc<RoleTracker>,
    rendezvous: Rendezvous,
    router: ActivationRouter,
    conversation_id: u32,
    in_flight: Mutex<usize>,
    idle: Condvar,
}

/// Counts one activation as in flight until dropped.
struct InFlight<'a> {
    context: &'a AppContext,
}

impl<'a> InFlight<'a> {
    fn enter(context: &'a AppContext) -> Self {
        *context.in_flight.lock().unwrap() += 1;
        Self { context }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut count = self.context.in_flight.lock().unwrap();
        *count -= 1;
        if *count == 0 {
            self.context.idle.notify_all();
        }
    }
}

impl AppContext {
    pub fn new(
        toasts: Arc<ToastManager>,
        roles: Arc<RoleTracker>,
        rendezvous: Rendezvous,
        conversation_id: u32,
    ) -> Self {
        let router = ActivationRouter::new(toasts.clone(), rendezvous.clone());
        Self {
            toasts,
            roles,
            rendezvous,
            router,
            conversation_id,
            in_flight: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    pub fn toasts(&self) -> &ToastManager {
        &self.toasts
    }

    pub fn roles(&self) -> &RoleTracker {
        &self.roles
    }

    pub fn rendezvous(&self) -> &Rendezvous {
        &self.rendezvous
    }

    /// Routes one activation, then runs the post-activation exit check.
    pub fn handle_activation(&self, activation: &Activation) -> (ActivationOutcome, ExitDecision) {
        let outcome = self.router.route(activation);
        let decision = self.exit_decision();

        if decision == ExitDecision::Terminate {
            tracing::info!(target: "app", ?outcome, "Activation handled by headless process, requesting exit");
            if let Err(e) = self.rendezvous.request_exit_if_headless(0) {
                tracing::error!(target: "app", error = %e, "Failed to request shutdown");
            }
        }

        (outcome, decision)
    }

    /// A process that never got a window exits after each handled activation.
    pub fn exit_decision(&self) -> ExitDecision {
        if self.roles.should_exit_after_activation() {
            ExitDecision::Terminate
        } else {
            ExitDecision::KeepRunning
        }
    }

    /// Blocks until no activation callback is running, or until `timeout` passes.
    ///
    /// Returns false on timeout. Call before tearing down the activation endpoint.
    pub fn wait_for_idle(&self, timeout: Duration) -> bool {
        let count = self.in_flight.lock().unwrap();
        let (count, result) = self
            .idle
            .wait_timeout_while(count, timeout, |count| *count > 0)
            .unwrap();
        if result.timed_out() {
            tracing::warn!(target: "app", in_flight = *count, "Activations still running");
            return false;
        }
        true
    }

    /// Runs a window button. Failures are shown in the window.
    pub fn run_command(&self, command: WindowCommand) {
        let result = match command {
            WindowCommand::SendToast => self
                .toasts
                .show(&conversation_toast(
                    self.conversation_id,
                    self.toasts.can_use_http_images(),
                ))
                .map_err(|e| t!("toastFailed", error = e.to_string()).to_string()),
            WindowCommand::ClearToasts => self
                .toasts
                .history()
                .map_err(ToastError::from)
                .and_then(|history| history.clear())
                .map_err(|e| t!("clearFailed", error = e.to_string()).to_string()),
        };

        if let Err(message) = result {
            tracing::error!(target: "app", ?command, error = %message, "Window command failed");
            if let Err(e) = self.rendezvous.window().set_display_text(&message) {
                tracing::warn!(target: "app", error = %e, "Failed to update window text");
            }
        }
    }
}

impl ActivationSink for AppContext {
    fn activate(&self, activation: Activation) {
        let _in_flight = InFlight::enter(self);
        self.handle_activation(&activation);
    }
}
