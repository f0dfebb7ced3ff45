use std::sync::atomic::{AtomicIsize, Ordering::SeqCst};
use std::sync::{Arc, OnceLock, Weak};

use windows::{
    Win32::{
        Foundation::*, Graphics::Gdi::*, System::LibraryLoader::GetModuleHandleW,
        System::Threading::GetCurrentThreadId, UI::WindowsAndMessaging::*,
    },
    core::*,
};

use crate::activation::rendezvous::{Pumped, UiQueue, UiWaker, WindowSurface};
use crate::app::{AppContext, WindowCommand};
use crate::error::PlatformError;

/// Posted to the UI thread to make it drain rendezvous requests.
const WM_APP_DRAIN: u32 = WM_APP + 1;

const ID_SEND_TOAST: usize = 1001;
const ID_CLEAR_TOASTS: usize = 1002;

const WIDTH: i32 = 520;
const HEIGHT: i32 = 360;

/// Wakes the UI thread by posting a thread message to its queue.
pub struct ThreadMessageWaker {
    thread_id: u32,
}

impl ThreadMessageWaker {
    /// Targets the calling thread, forcing its message queue into existence first.
    pub fn current() -> Self {
        unsafe {
            let mut msg = MSG::default();
            let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
            Self {
                thread_id: GetCurrentThreadId(),
            }
        }
    }
}

impl UiWaker for ThreadMessageWaker {
    fn wake(&self) -> std::result::Result<(), PlatformError> {
        unsafe { PostThreadMessageW(self.thread_id, WM_APP_DRAIN, WPARAM(0), LPARAM(0))? };
        Ok(())
    }
}

/// The sample's only window: two buttons above a read-only text area.
pub struct MainWindow {
    hwnd: AtomicIsize,
    output: AtomicIsize,
    context: OnceLock<Weak<AppContext>>,
}

impl MainWindow {
    pub fn new() -> Self {
        Self {
            hwnd: AtomicIsize::new(0),
            output: AtomicIsize::new(0),
            context: OnceLock::new(),
        }
    }

    /// Connects the buttons to the application. Later calls are ignored.
    pub fn bind(&self, context: &Arc<AppContext>) {
        let _ = self.context.set(Arc::downgrade(context));
    }

    fn hwnd(&self) -> Option<HWND> {
        match self.hwnd.load(SeqCst) {
            0 => None,
            raw => Some(HWND(raw as *mut _)),
        }
    }

    fn output(&self) -> Option<HWND> {
        match self.output.load(SeqCst) {
            0 => None,
            raw => Some(HWND(raw as *mut _)),
        }
    }

    fn on_command(&self, id: usize) {
        let command = match id {
            ID_SEND_TOAST => WindowCommand::SendToast,
            ID_CLEAR_TOASTS => WindowCommand::ClearToasts,
            _ => return,
        };

        match self.context.get().and_then(Weak::upgrade) {
            Some(context) => context.run_command(command),
            None => tracing::warn!(target: "shellext::window", ?command, "Window is not bound"),
        }
    }

    /// Destroys the window if it exists. UI thread only.
    pub fn close(&self) {
        if let Some(hwnd) = self.hwnd() {
            unsafe {
                SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
                let _ = DestroyWindow(hwnd);
            }
            self.hwnd.store(0, SeqCst);
            self.output.store(0, SeqCst);
        }
    }

    unsafe fn create_child(
        parent: HWND,
        instance: HINSTANCE,
        class: PCWSTR,
        text: &str,
        style: WINDOW_STYLE,
        rect: (i32, i32, i32, i32),
        id: usize,
    ) -> Result<HWND> {
        let text = HSTRING::from(text);
        let (x, y, w, h) = rect;
        unsafe {
            let child = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class,
                PCWSTR(text.as_ptr()),
                WS_CHILD | WS_VISIBLE | style,
                x,
                y,
                w,
                h,
                parent,
                HMENU(id as *mut _),
                instance,
                None,
            )?;
            let font = GetStockObject(DEFAULT_GUI_FONT);
            SendMessageW(child, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
            Ok(child)
        }
    }
}

impl Default for MainWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSurface for MainWindow {
    fn create(&self) -> std::result::Result<(), PlatformError> {
        unsafe {
            let instance: HINSTANCE = GetModuleHandleW(None)?.into();
            let class = w!("DesktopToastsWindow");

            let wc = WNDCLASSEXW {
                cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
                style: CS_HREDRAW | CS_VREDRAW,
                lpfnWndProc: Some(wndproc),
                hInstance: instance,
                hCursor: LoadCursorW(None, IDC_ARROW)?,
                hbrBackground: HBRUSH((COLOR_WINDOW.0 + 1) as isize as *mut _),
                lpszClassName: class,
                ..Default::default()
            };
            RegisterClassExW(&wc);

            let title = HSTRING::from(&*t!("windowTitle"));
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                class,
                PCWSTR(title.as_ptr()),
                WS_OVERLAPPEDWINDOW,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                WIDTH,
                HEIGHT,
                HWND::default(),
                HMENU::default(),
                instance,
                None,
            )?;
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, self as *const Self as isize);

            let button = WINDOW_STYLE(BS_PUSHBUTTON as u32);
            Self::create_child(
                hwnd,
                instance,
                w!("BUTTON"),
                &t!("sendToastButton"),
                button,
                (12, 12, 150, 30),
                ID_SEND_TOAST,
            )?;
            Self::create_child(
                hwnd,
                instance,
                w!("BUTTON"),
                &t!("clearToastsButton"),
                button,
                (172, 12, 150, 30),
                ID_CLEAR_TOASTS,
            )?;
            let output = Self::create_child(
                hwnd,
                instance,
                w!("EDIT"),
                &t!("windowPlaceholder"),
                WS_BORDER
                    | WS_VSCROLL
                    | WINDOW_STYLE((ES_MULTILINE | ES_READONLY | ES_AUTOVSCROLL) as u32),
                (12, 54, WIDTH - 40, HEIGHT - 110),
                0,
            )?;

            self.output.store(output.0 as isize, SeqCst);
            self.hwnd.store(hwnd.0 as isize, SeqCst);

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = UpdateWindow(hwnd);
            let _ = SetForegroundWindow(hwnd);
        }

        tracing::info!(target: "shellext::window", "Main window created");
        Ok(())
    }

    fn restore_and_foreground(&self) -> std::result::Result<(), PlatformError> {
        let Some(hwnd) = self.hwnd() else {
            return Err(PlatformError::os(
                ERROR_INVALID_WINDOW_HANDLE.to_hresult().0,
                "window has not been created",
            ));
        };

        unsafe {
            if IsIconic(hwnd).as_bool() {
                let _ = ShowWindow(hwnd, SW_RESTORE);
            }
            let _ = SetForegroundWindow(hwnd);
        }
        Ok(())
    }

    fn set_display_text(&self, text: &str) -> std::result::Result<(), PlatformError> {
        let Some(output) = self.output() else {
            tracing::debug!(target: "shellext::window", text, "No window to display text in");
            return Ok(());
        };

        // Edit controls want CRLF line breaks
        let text = HSTRING::from(text.replace("\r\n", "\n").replace('\n', "\r\n"));
        unsafe { SetWindowTextW(output, PCWSTR(text.as_ptr()))? };
        Ok(())
    }
}

unsafe extern "system" fn wndproc(hwnd: HWND, msg: u32, wp: WPARAM, lp: LPARAM) -> LRESULT {
    unsafe {
        match msg {
            WM_COMMAND => {
                let window = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const MainWindow;
                if let Some(window) = window.as_ref() {
                    window.on_command(wp.0 & 0xFFFF);
                }
                LRESULT(0)
            }

            WM_DESTROY => {
                tracing::info!(target: "shellext::window", "Main window closed");
                PostQuitMessage(0);
                LRESULT(0)
            }

            _ => DefWindowProcW(hwnd, msg, wp, lp),
        }
    }
}

/// Pumps messages until the window is closed or a shutdown is requested.
///
/// Returns the process exit code.
pub fn run_message_loop(queue: &UiQueue) -> i32 {
    tracing::info!(target: "shellext::window", "Entering message loop");

    unsafe {
        let mut msg = MSG::default();
        loop {
            let status = GetMessageW(&mut msg, None, 0, 0);
            if status.0 == 0 {
                return msg.wParam.0 as i32;
            }
            if status.0 == -1 {
                let error = Error::from_win32();
                tracing::error!(target: "shellext::window", ?error, "GetMessageW failed");
                return 1;
            }

            if msg.hwnd.0.is_null() && msg.message == WM_APP_DRAIN {
                if let Pumped::Shutdown(code) = queue.drain() {
                    return code;
                }
                continue;
            }

            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }
}
