use std::sync::Weak;

use windows::{
    Win32::{Foundation::*, System::Com::*, UI::Notifications::*},
    core::*,
};

use crate::activation::{Activation, UserInputSet};
use crate::toast::platform::ActivationSink;

/// COM object the platform calls when the user interacts with one of our toasts.
#[implement(INotificationActivationCallback)]
pub struct ToastActivator {
    sink: Weak<dyn ActivationSink>,
}

impl ToastActivator {
    pub fn new(sink: Weak<dyn ActivationSink>) -> Self {
        Self { sink }
    }

    /// Parse the NOTIFICATION_USER_INPUT_DATA array into a UserInputSet
    fn parse_input_data(data: *const NOTIFICATION_USER_INPUT_DATA, count: u32) -> UserInputSet {
        let mut inputs = UserInputSet::new();

        if data.is_null() || count == 0 {
            return inputs;
        }

        unsafe {
            let slice = std::slice::from_raw_parts(data, count as usize);
            for input in slice {
                let key = input.Key.to_string().unwrap_or_default();
                let value = input.Value.to_string().unwrap_or_default();
                inputs.insert(key, value);
            }
        }

        inputs
    }
}

impl INotificationActivationCallback_Impl for ToastActivator_Impl {
    fn Activate(
        &self,
        appusermodelid: &windows_core::PCWSTR,
        invokedargs: &windows_core::PCWSTR,
        data: *const NOTIFICATION_USER_INPUT_DATA,
        count: u32,
    ) -> windows_core::Result<()> {
        let app_id = unsafe {
            if appusermodelid.is_null() {
                String::new()
            } else {
                appusermodelid.to_string().unwrap_or_default()
            }
        };

        // A click on the toast body may carry no arguments at all
        let arguments = unsafe {
            if invokedargs.is_null() {
                String::new()
            } else {
                match invokedargs.to_string() {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!(target: "shellext::toast", ?e, "Failed to read invoked arguments");
                        String::new()
                    }
                }
            }
        };

        let user_input = ToastActivator::parse_input_data(data, count);
        tracing::debug!(
            target: "shellext::toast",
            %app_id,
            %arguments,
            inputs = user_input.len(),
            "Toast activated"
        );

        let Some(sink) = self.sink.upgrade() else {
            tracing::warn!(target: "shellext::toast", "Activation arrived after shutdown, ignoring");
            return Ok(());
        };

        sink.activate(Activation {
            app_id,
            arguments,
            user_input,
        });

        Ok(())
    }
}

// Class factory for creating instances of our toast activator
#[implement(IClassFactory)]
pub struct ToastActivatorFactory {
    sink: Weak<dyn ActivationSink>,
}

impl ToastActivatorFactory {
    pub fn new(sink: Weak<dyn ActivationSink>) -> Self {
        Self { sink }
    }
}

impl IClassFactory_Impl for ToastActivatorFactory_Impl {
    fn CreateInstance(
        &self,
        outer: Option<&IUnknown>,
        iid: *const GUID,
        result: *mut *mut core::ffi::c_void,
    ) -> Result<()> {
        if outer.is_some() {
            return Err(Error::from(CLASS_E_NOAGGREGATION));
        }

        let handler = ToastActivator::new(self.sink.clone());
        let handler: IUnknown = handler.into();

        unsafe { handler.query(iid, result).ok() }
    }

    fn LockServer(&self, _lock: BOOL) -> Result<()> {
        Ok(())
    }
}
