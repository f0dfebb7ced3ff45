//! Per-user registry entries that tie the AUMID to our COM activation server.

use std::path::Path;

use windows::{
    Win32::{Foundation::*, System::Registry::*, UI::Shell::SetCurrentProcessExplicitAppUserModelID},
    core::*,
};

use crate::activation::role::TOAST_ACTIVATED_LAUNCH_ARG;
use crate::toast::platform::AppIdentity;

const ICON_BACKGROUND_COLOR: &str = "FFDDDDDD";

fn aumid_key(identity: &AppIdentity) -> String {
    format!(r"Software\Classes\AppUserModelId\{}", identity.app_id)
}

fn clsid_key(identity: &AppIdentity) -> String {
    format!(r"Software\Classes\CLSID\{}", identity.braced_clsid())
}

/// Command line the platform runs to start a process for an activation.
pub fn local_server_command(exe: &Path) -> String {
    format!("\"{}\" {}", exe.display(), TOAST_ACTIVATED_LAUNCH_ARG)
}

fn set_string(key: &str, name: Option<&str>, value: &str) -> Result<()> {
    let data: Vec<u16> = value.encode_utf16().chain(std::iter::once(0)).collect();
    let key = HSTRING::from(key);
    let name = name.map(HSTRING::from).unwrap_or_default();

    unsafe {
        RegSetKeyValueW(
            HKEY_CURRENT_USER,
            PCWSTR(key.as_ptr()),
            PCWSTR(name.as_ptr()),
            REG_SZ.0,
            Some(data.as_ptr().cast()),
            (data.len() * std::mem::size_of::<u16>()) as u32,
        )
        .ok()
    }
}

fn delete_tree(key: &str) -> Result<()> {
    let key = HSTRING::from(key);
    let status = unsafe { RegDeleteTreeW(HKEY_CURRENT_USER, PCWSTR(key.as_ptr())) };
    if status == ERROR_FILE_NOT_FOUND {
        return Ok(());
    }
    status.ok()
}

/// Writes the AUMID and LocalServer32 keys and tags this process with the AUMID.
pub fn register(identity: &AppIdentity, exe: &Path) -> Result<()> {
    let aumid = aumid_key(identity);
    set_string(&aumid, Some("DisplayName"), &identity.display_name)?;
    if let Some(icon) = &identity.icon_path {
        set_string(&aumid, Some("IconUri"), icon)?;
    }
    set_string(&aumid, Some("IconBackgroundColor"), ICON_BACKGROUND_COLOR)?;
    set_string(&aumid, Some("CustomActivator"), &identity.braced_clsid())?;

    let server = format!(r"{}\LocalServer32", clsid_key(identity));
    set_string(&server, None, &local_server_command(exe))?;

    let app_id = HSTRING::from(identity.app_id.as_str());
    unsafe {
        SetCurrentProcessExplicitAppUserModelID(PCWSTR(app_id.as_ptr()))?;
    }

    tracing::info!(
        target: "shellext::registry",
        app_id = %identity.app_id,
        clsid = %identity.braced_clsid(),
        exe = %exe.display(),
        "Registry entries written"
    );
    Ok(())
}

/// Deletes both keys. Missing keys are not an error.
pub fn unregister(identity: &AppIdentity) -> Result<()> {
    delete_tree(&aumid_key(identity))?;
    delete_tree(&clsid_key(identity))?;
    tracing::info!(target: "shellext::registry", app_id = %identity.app_id, "Registry entries removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_identity;

    #[test]
    fn test_key_paths() {
        let identity = sample_identity();
        assert_eq!(
            aumid_key(&identity),
            r"Software\Classes\AppUserModelId\Sample.DesktopToasts"
        );
        assert_eq!(
            clsid_key(&identity),
            r"Software\Classes\CLSID\{23A5B06E-20BB-4E7E-A0AC-6982ED6A6041}"
        );
    }

    #[test]
    fn test_local_server_command() {
        let command = local_server_command(Path::new(r"C:\Apps\desktop-toasts.exe"));
        assert_eq!(command, r#""C:\Apps\desktop-toasts.exe" -ToastActivated"#);
    }
}
