use std::sync::RwLock;

/// Flag appended to the COM server command line so a process knows it was started to
/// answer a toast activation.
pub const TOAST_ACTIVATED_LAUNCH_ARG: &str = "-ToastActivated";

/// Flag that removes the application's registrations and exits.
pub const UNINSTALL_LAUNCH_ARG: &str = "-Uninstall";

/// Flags recognised on the process command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    pub toast_activated: bool,
    pub uninstall: bool,
}

impl LaunchOptions {
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut options = Self::default();
        for arg in args {
            match arg.as_ref() {
                TOAST_ACTIVATED_LAUNCH_ARG => options.toast_activated = true,
                UNINSTALL_LAUNCH_ARG => options.uninstall = true,
                _ => {}
            }
        }
        options
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessRole {
    #[default]
    NotYetDetermined,
    /// Has, or is about to create, a window
    Interactive,
    /// Started only to answer one activation; has no window
    HeadlessResponder,
}

#[derive(Debug, Default)]
struct RoleState {
    role: ProcessRole,
    has_window: bool,
}

/// Tracks this process's role and whether it has ever created its window.
///
/// Once a window exists the process is interactive for good and must stay alive
/// until the user exits it.
#[derive(Debug, Default)]
pub struct RoleTracker {
    state: RwLock<RoleState>,
}

impl RoleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the role from the launch flags. Only the first call has an effect.
    pub fn determine_initial_role(&self, options: &LaunchOptions) -> ProcessRole {
        let mut state = self.state.write().unwrap();
        if state.role != ProcessRole::NotYetDetermined {
            tracing::warn!(target: "activation::role", role = ?state.role, "Process role already determined");
            return state.role;
        }

        state.role = if options.toast_activated {
            ProcessRole::HeadlessResponder
        } else {
            ProcessRole::Interactive
        };

        tracing::info!(target: "activation::role", role = ?state.role, "Process role determined");
        state.role
    }

    pub fn role(&self) -> ProcessRole {
        self.state.read().unwrap().role
    }

    pub fn has_window(&self) -> bool {
        self.state.read().unwrap().has_window
    }

    pub fn mark_window_created(&self) {
        let mut state = self.state.write().unwrap();
        state.has_window = true;
        if state.role != ProcessRole::Interactive {
            tracing::info!(target: "activation::role", from = ?state.role, "Window created, process is now interactive");
            state.role = ProcessRole::Interactive;
        }
    }

    /// Whether the process should end now that an activation has been handled.
    pub fn should_exit_after_activation(&self) -> bool {
        let state = self.state.read().unwrap();
        !state.has_window && state.role != ProcessRole::Interactive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_options() {
        let options = LaunchOptions::parse(["app.exe", "-ToastActivated"]);
        assert!(options.toast_activated);
        assert!(!options.uninstall);

        let options = LaunchOptions::parse(["app.exe"]);
        assert_eq!(options, LaunchOptions::default());

        assert!(LaunchOptions::parse(["app.exe", "-Uninstall"]).uninstall);
    }

    #[test]
    fn test_toast_launch_is_headless() {
        let tracker = RoleTracker::new();
        assert_eq!(tracker.role(), ProcessRole::NotYetDetermined);

        let role = tracker.determine_initial_role(&LaunchOptions {
            toast_activated: true,
            uninstall: false,
        });
        assert_eq!(role, ProcessRole::HeadlessResponder);
        assert!(tracker.should_exit_after_activation());
    }

    #[test]
    fn test_normal_launch_is_interactive() {
        let tracker = RoleTracker::new();
        let role = tracker.determine_initial_role(&LaunchOptions::default());
        assert_eq!(role, ProcessRole::Interactive);
        assert!(!tracker.should_exit_after_activation());
    }

    #[test]
    fn test_role_is_determined_once() {
        let tracker = RoleTracker::new();
        tracker.determine_initial_role(&LaunchOptions::default());
        let role = tracker.determine_initial_role(&LaunchOptions {
            toast_activated: true,
            uninstall: false,
        });
        assert_eq!(role, ProcessRole::Interactive);
    }

    #[test]
    fn test_window_makes_headless_interactive() {
        let tracker = RoleTracker::new();
        tracker.determine_initial_role(&LaunchOptions {
            toast_activated: true,
            uninstall: false,
        });
        assert!(!tracker.has_window());

        tracker.mark_window_created();

        assert!(tracker.has_window());
        assert_eq!(tracker.role(), ProcessRole::Interactive);
        assert!(!tracker.should_exit_after_activation());
    }
}
