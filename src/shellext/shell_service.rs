use std::sync::{Mutex, Weak};

use windows::{Win32::System::Com::*, core::*};

use crate::shellext::toast::ToastActivatorFactory;
use crate::toast::platform::ActivationSink;

/// COM apartment and class objects registered by this process.
///
/// Created on the UI thread and dropped on it: revokes every class object and
/// uninitializes COM.
pub struct ShellServices {
    cookies: Mutex<Vec<u32>>,
}

impl ShellServices {
    pub fn init() -> Result<Self> {
        unsafe {
            CoInitializeEx(None, COINIT_MULTITHREADED).ok()?;
        }
        tracing::debug!(target: "shellext::shell_service", "COM initialized");

        Ok(Self {
            cookies: Mutex::new(Vec::new()),
        })
    }

    /// Registers the toast activator class factory so the platform can reach it,
    /// either in this process or in one it launches with `-ToastActivated`.
    pub fn register_toast_activator(
        &self,
        clsid: &GUID,
        sink: Weak<dyn ActivationSink>,
    ) -> Result<()> {
        tracing::info!(target: "shellext::shell_service", ?clsid, "Registering toast activator...");

        unsafe {
            let factory: IClassFactory = ToastActivatorFactory::new(sink).into();
            let cookie =
                CoRegisterClassObject(clsid, &factory, CLSCTX_LOCAL_SERVER, REGCLS_MULTIPLEUSE)?;

            self.cookies.lock().unwrap().push(cookie);
            tracing::info!(target: "shellext::shell_service", "Toast activator registered with cookie: {}", cookie);
        }

        Ok(())
    }
}

impl Drop for ShellServices {
    fn drop(&mut self) {
        tracing::info!(target: "shellext::shell_service", "Revoking class objects...");
        let cookies = std::mem::take(&mut *self.cookies.lock().unwrap());
        unsafe {
            for cookie in cookies {
                let _ = CoRevokeClassObject(cookie);
            }
            CoUninitialize();
        }
    }
}
