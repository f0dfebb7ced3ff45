//! Single-instance rendezvous between activation threads and the UI thread.
//!
//! Window creation must happen on the thread that pumps the window's messages. Any
//! other thread that needs a window sends an [`UiRequest`] carrying a one-shot reply
//! channel, wakes the UI thread, and blocks until the UI thread answers.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, ThreadId};
use std::time::Duration;

use crate::activation::role::RoleTracker;
use crate::error::PlatformError;

/// The application's single window, as seen by the activation logic.
pub trait WindowSurface: Send + Sync {
    /// Creates, shows and foregrounds the window. Only called on the UI thread.
    fn create(&self) -> Result<(), PlatformError>;

    /// Un-minimizes the window and brings it to the foreground.
    fn restore_and_foreground(&self) -> Result<(), PlatformError>;

    fn set_display_text(&self, text: &str) -> Result<(), PlatformError>;
}

/// Nudges the UI thread so it drains pending requests.
pub trait UiWaker: Send + Sync {
    fn wake(&self) -> Result<(), PlatformError>;
}

/// What `ensure_window` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowTransition {
    Created,
    Restored,
}

type WindowReply = SyncSender<Result<WindowTransition, PlatformError>>;

pub enum UiRequest {
    OpenWindow(WindowReply),
    Shutdown(i32),
    /// Shut down with the code unless a window exists by the time the UI thread
    /// handles the request.
    ExitIfHeadless(i32),
}

/// Result of draining the request queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pumped {
    Continue,
    Shutdown(i32),
}

struct Shared {
    ui_thread: ThreadId,
    window: Arc<dyn WindowSurface>,
    roles: Arc<RoleTracker>,
}

impl Shared {
    /// Runs on the UI thread only, so creation is serialized.
    fn open_window(&self) -> Result<WindowTransition, PlatformError> {
        if self.roles.has_window() {
            self.window.restore_and_foreground()?;
            return Ok(WindowTransition::Restored);
        }

        self.window.create()?;
        self.roles.mark_window_created();
        tracing::info!(target: "activation::rendezvous", "Window created");
        Ok(WindowTransition::Created)
    }
}

/// Cloneable handle used from any thread.
#[derive(Clone)]
pub struct Rendezvous {
    shared: Arc<Shared>,
    requests: Sender<UiRequest>,
    waker: Arc<dyn UiWaker>,
    timeout: Option<Duration>,
}

/// UI-thread end of the rendezvous.
pub struct UiQueue {
    shared: Arc<Shared>,
    requests: Receiver<UiRequest>,
}

impl Rendezvous {
    /// Binds the rendezvous to the calling thread, which becomes the UI thread.
    pub fn new(
        window: Arc<dyn WindowSurface>,
        roles: Arc<RoleTracker>,
        waker: Arc<dyn UiWaker>,
        timeout: Option<Duration>,
    ) -> (Self, UiQueue) {
        let shared = Arc::new(Shared {
            ui_thread: thread::current().id(),
            window,
            roles,
        });
        let (tx, rx) = mpsc::channel();

        (
            Self {
                shared: shared.clone(),
                requests: tx,
                waker,
                timeout,
            },
            UiQueue {
                shared,
                requests: rx,
            },
        )
    }

    pub fn window(&self) -> &dyn WindowSurface {
        self.shared.window.as_ref()
    }

    pub fn roles(&self) -> &RoleTracker {
        &self.shared.roles
    }

    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.shared.ui_thread
    }

    /// Makes sure the window exists and is in the foreground, from any thread.
    ///
    /// Off the UI thread this blocks until the UI thread has handled the request.
    pub fn ensure_window(&self) -> Result<WindowTransition, PlatformError> {
        if self.shared.roles.has_window() {
            self.shared.window.restore_and_foreground()?;
            return Ok(WindowTransition::Restored);
        }

        if self.is_ui_thread() {
            return self.shared.open_window();
        }

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        self.requests
            .send(UiRequest::OpenWindow(reply_tx))
            .map_err(|_| PlatformError::UiThreadUnavailable)?;
        self.waker.wake()?;

        tracing::debug!(target: "activation::rendezvous", "Waiting for UI thread to open the window");

        match self.timeout {
            Some(timeout) => match reply_rx.recv_timeout(timeout) {
                Ok(result) => result,
                Err(RecvTimeoutError::Timeout) => Err(PlatformError::UiThreadTimeout(timeout)),
                Err(RecvTimeoutError::Disconnected) => Err(PlatformError::UiThreadUnavailable),
            },
            None => reply_rx
                .recv()
                .map_err(|_| PlatformError::UiThreadUnavailable)?,
        }
    }

    /// Asks the UI loop to stop and return `exit_code`.
    pub fn request_shutdown(&self, exit_code: i32) -> Result<(), PlatformError> {
        self.requests
            .send(UiRequest::Shutdown(exit_code))
            .map_err(|_| PlatformError::UiThreadUnavailable)?;
        self.waker.wake()
    }

    /// Asks the UI loop to stop with `exit_code` if the process is still headless
    /// when the request is handled.
    ///
    /// Window requests queued earlier are handled first, so a window opened by a
    /// concurrent activation cancels the exit.
    pub fn request_exit_if_headless(&self, exit_code: i32) -> Result<(), PlatformError> {
        self.requests
            .send(UiRequest::ExitIfHeadless(exit_code))
            .map_err(|_| PlatformError::UiThreadUnavailable)?;
        self.waker.wake()
    }
}

impl UiQueue {
    fn handle(&self, request: UiRequest) -> Pumped {
        match request {
            UiRequest::OpenWindow(reply) => {
                let result = self.shared.open_window();
                if let Err(e) = &result {
                    tracing::error!(target: "activation::rendezvous", error = %e, "Failed to open window");
                }
                // The requester may have timed out and gone away
                let _ = reply.send(result);
                Pumped::Continue
            }
            UiRequest::Shutdown(code) => {
                tracing::info!(target: "activation::rendezvous", exit_code = code, "Shutdown requested");
                Pumped::Shutdown(code)
            }
            UiRequest::ExitIfHeadless(code) => {
                if self.shared.roles.should_exit_after_activation() {
                    tracing::info!(target: "activation::rendezvous", exit_code = code, "Headless process shutting down");
                    Pumped::Shutdown(code)
                } else {
                    tracing::info!(target: "activation::rendezvous", "Window opened since activation, staying alive");
                    Pumped::Continue
                }
            }
        }
    }

    /// Handles every pending request without blocking. Call from the UI thread's
    /// message loop whenever it is woken.
    pub fn drain(&self) -> Pumped {
        while let Ok(request) = self.requests.try_recv() {
            if let Pumped::Shutdown(code) = self.handle(request) {
                return Pumped::Shutdown(code);
            }
        }
        Pumped::Continue
    }

    /// Blocking request loop for hosts without a native message pump.
    ///
    /// Returns the exit code of the first shutdown request, or 0 once every
    /// [`Rendezvous`] handle is gone.
    pub fn run(&self) -> i32 {
        while let Ok(request) = self.requests.recv() {
            if let Pumped::Shutdown(code) = self.handle(request) {
                return code;
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activation::role::{LaunchOptions, ProcessRole};
    use crate::test_support::{FakeWindow, NoopWaker, headless_roles};
    use std::sync::Barrier;

    fn spawn_ui_thread(
        window: Arc<FakeWindow>,
        roles: Arc<RoleTracker>,
        timeout: Option<Duration>,
    ) -> (Rendezvous, thread::JoinHandle<i32>) {
        let (handle_tx, handle_rx) = mpsc::channel();
        let join = thread::spawn(move || {
            let (rendezvous, queue) = Rendezvous::new(window, roles, Arc::new(NoopWaker), timeout);
            handle_tx.send(rendezvous).unwrap();
            queue.run()
        });
        (handle_rx.recv().unwrap(), join)
    }

    #[test]
    fn test_ui_thread_creates_directly() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, _queue) =
            Rendezvous::new(window.clone(), roles.clone(), Arc::new(NoopWaker), None);

        assert_eq!(rendezvous.ensure_window(), Ok(WindowTransition::Created));
        assert_eq!(window.created(), 1);
        assert_eq!(roles.role(), ProcessRole::Interactive);
    }

    #[test]
    fn test_second_call_only_restores() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, _queue) =
            Rendezvous::new(window.clone(), roles, Arc::new(NoopWaker), None);

        rendezvous.ensure_window().unwrap();
        assert_eq!(rendezvous.ensure_window(), Ok(WindowTransition::Restored));
        assert_eq!(window.created(), 1);
        assert_eq!(window.restored(), 1);
    }

    #[test]
    fn test_cross_thread_waits_for_creation() {
        let window = Arc::new(FakeWindow::default().with_create_delay(Duration::from_millis(50)));
        let roles = headless_roles();
        let (rendezvous, ui) = spawn_ui_thread(window.clone(), roles.clone(), None);

        assert!(!rendezvous.is_ui_thread());
        assert_eq!(rendezvous.ensure_window(), Ok(WindowTransition::Created));

        // Creation finished before the caller was released
        assert!(roles.has_window());
        assert_eq!(window.created(), 1);
        assert_eq!(window.created_on(), Some(ui.thread().id()));

        rendezvous.request_shutdown(0).unwrap();
        assert_eq!(ui.join().unwrap(), 0);
    }

    #[test]
    fn test_concurrent_requests_create_one_window() {
        let window = Arc::new(FakeWindow::default().with_create_delay(Duration::from_millis(20)));
        let roles = headless_roles();
        let (rendezvous, ui) = spawn_ui_thread(window.clone(), roles, None);

        let callers = 8;
        let barrier = Arc::new(Barrier::new(callers));
        let handles: Vec<_> = (0..callers)
            .map(|_| {
                let rendezvous = rendezvous.clone();
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    rendezvous.ensure_window()
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let created = results
            .iter()
            .filter(|r| **r == Ok(WindowTransition::Created))
            .count();
        let restored = results
            .iter()
            .filter(|r| **r == Ok(WindowTransition::Restored))
            .count();

        assert_eq!(created, 1);
        assert_eq!(restored, callers - 1);
        assert_eq!(window.created(), 1);

        rendezvous.request_shutdown(3).unwrap();
        assert_eq!(ui.join().unwrap(), 3);
    }

    #[test]
    fn test_creation_failure_is_returned_to_caller() {
        let window = Arc::new(FakeWindow::failing());
        let roles = headless_roles();
        let (rendezvous, ui) = spawn_ui_thread(window, roles.clone(), None);

        assert!(matches!(
            rendezvous.ensure_window(),
            Err(PlatformError::Os { .. })
        ));
        assert!(!roles.has_window());

        rendezvous.request_shutdown(0).unwrap();
        ui.join().unwrap();
    }

    #[test]
    fn test_closed_ui_thread_is_reported() {
        let window = Arc::new(FakeWindow::default());
        let roles = Arc::new(RoleTracker::new());
        roles.determine_initial_role(&LaunchOptions::default());
        let (rendezvous, ui) = spawn_ui_thread(window, roles, None);

        rendezvous.request_shutdown(0).unwrap();
        ui.join().unwrap();

        assert_eq!(
            rendezvous.ensure_window(),
            Err(PlatformError::UiThreadUnavailable)
        );
    }

    #[test]
    fn test_optional_timeout() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        // Queue is never drained
        let (rendezvous, _queue) = Rendezvous::new(
            window.clone(),
            roles,
            Arc::new(NoopWaker),
            Some(Duration::from_millis(20)),
        );

        let result = thread::spawn(move || rendezvous.ensure_window())
            .join()
            .unwrap();
        assert_eq!(
            result,
            Err(PlatformError::UiThreadTimeout(Duration::from_millis(20)))
        );
        assert_eq!(window.created(), 0);
    }

    #[test]
    fn test_drain_processes_pending_requests() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, queue) = Rendezvous::new(window, roles, Arc::new(NoopWaker), None);

        assert_eq!(queue.drain(), Pumped::Continue);
        rendezvous.request_shutdown(7).unwrap();
        assert_eq!(queue.drain(), Pumped::Shutdown(7));
    }

    #[test]
    fn test_exit_if_headless_without_window() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, queue) = Rendezvous::new(window, roles, Arc::new(NoopWaker), None);

        rendezvous.request_exit_if_headless(0).unwrap();
        assert_eq!(queue.drain(), Pumped::Shutdown(0));
    }

    #[test]
    fn test_exit_if_headless_cancelled_by_window() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, queue) =
            Rendezvous::new(window.clone(), roles.clone(), Arc::new(NoopWaker), None);

        rendezvous.request_exit_if_headless(0).unwrap();
        rendezvous.ensure_window().unwrap();

        assert_eq!(queue.drain(), Pumped::Continue);
        assert!(roles.has_window());
        assert_eq!(window.created(), 1);
    }

    #[test]
    fn test_exit_if_headless_after_queued_window_request() {
        let window = Arc::new(FakeWindow::default());
        let roles = headless_roles();
        let (rendezvous, queue) =
            Rendezvous::new(window.clone(), roles.clone(), Arc::new(NoopWaker), None);

        let (reply_tx, reply_rx) = mpsc::sync_channel(1);
        rendezvous
            .requests
            .send(UiRequest::OpenWindow(reply_tx))
            .unwrap();
        rendezvous.request_exit_if_headless(0).unwrap();

        assert_eq!(queue.drain(), Pumped::Continue);
        assert_eq!(reply_rx.recv().unwrap(), Ok(WindowTransition::Created));
        assert_eq!(window.created(), 1);
    }
}
