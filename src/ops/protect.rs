//! Password-protect a document via Ghostscript's pdfwrite encryption.

use std::path::Path;
use std::process::Command;

use crate::error::{Result, ToolboxError};
use crate::repair::find_ghostscript;

/// Permission bits passed to `-dPermissions`: printing and high
/// resolution printing allowed, content extraction denied. The value is
/// the standard-security-handler bit mask from the PDF spec (bit 3 and
/// bit 12 set); viewers that do not honor the handler may still ignore
/// it.
pub const PERMISSIONS_PRINT_ONLY: u32 = 2052;

/// Encrypt `src` into `dst` with a user password.
///
/// Opening the file then requires `user_password`; `owner_password`
/// (the one that lifts restrictions) defaults to the user password when
/// not given. Uses 128-bit RC4 via Ghostscript, which must be
/// installed.
///
/// # Errors
///
/// Returns [`ToolboxError::ToolNotFound`] when Ghostscript is missing,
/// [`ToolboxError::InvalidConfig`] for an empty password, and
/// [`ToolboxError::ToolFailed`] when Ghostscript exits nonzero or
/// writes nothing.
pub fn protect_pdf(
    src: &Path,
    dst: &Path,
    user_password: &str,
    owner_password: Option<&str>,
) -> Result<u64> {
    if user_password.is_empty() {
        return Err(ToolboxError::invalid_config("password must not be empty"));
    }
    if !src.exists() {
        return Err(ToolboxError::file_not_found(src.to_path_buf()));
    }

    let gs = find_ghostscript().ok_or_else(|| {
        ToolboxError::tool_not_found(
            "ghostscript",
            "install Ghostscript to password-protect PDFs (e.g. apt install ghostscript)",
        )
    })?;

    let owner = owner_password.unwrap_or(user_password);
    let output = Command::new(&gs)
        .arg("-sDEVICE=pdfwrite")
        .arg("-dNOPAUSE")
        .arg("-dQUIET")
        .arg("-dBATCH")
        .arg(format!("-sOwnerPassword={owner}"))
        .arg(format!("-sUserPassword={user_password}"))
        .arg("-dEncryptionR=3")
        .arg("-dKeyLength=128")
        .arg(format!("-dPermissions={PERMISSIONS_PRINT_ONLY}"))
        .arg(format!("-sOutputFile={}", dst.display()))
        .arg(src)
        .output()
        .map_err(|e| ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let size = std::fs::metadata(dst).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: "produced an empty output file".to_string(),
        });
    }
    Ok(size)
}
