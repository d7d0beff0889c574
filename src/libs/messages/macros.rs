//! Output macros for the CLI.
//!
//! In normal use the macros print straight to the terminal. When
//! `TASKPAD_DEBUG` or `RUST_LOG` is set they emit `tracing` events instead,
//! so CLI output and server logs end up in the same stream.
//!
//! ```rust,ignore
//! msg_success!(Message::TaskCreated(task.title.clone()));
//! msg_warning!(Message::DeleteCancelled);
//! return Err(msg_error_anyhow!(Message::TaskNotFound));
//! ```
//!
//! Every macro also accepts a trailing `true`, which surrounds the line with
//! blank lines.

use std::sync::OnceLock;

static DEBUG_MODE: OnceLock<bool> = OnceLock::new();

/// Whether output should go to `tracing`. Read once per process.
#[doc(hidden)]
pub fn is_debug_mode() -> bool {
    *DEBUG_MODE.get_or_init(|| std::env::var("TASKPAD_DEBUG").is_ok() || std::env::var("RUST_LOG").is_ok())
}

/// Shared body of the printing macros: `$level` is the tracing macro used in
/// debug mode, `$print` the std macro used otherwise.
#[doc(hidden)]
#[macro_export]
macro_rules! __msg_emit {
    ($level:ident, $print:ident, $prefix:expr, $msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::$level!("{}{}", $prefix, $msg);
        } else {
            $print!("{}{}", $prefix, $msg);
        }
    };
    ($level:ident, $print:ident, $prefix:expr, $msg:expr, spaced) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::$level!("\n{}{}\n", $prefix, $msg);
        } else {
            $print!("\n{}{}\n", $prefix, $msg);
        }
    };
}

/// Plain line, no prefix.
#[macro_export]
macro_rules! msg_print {
    ($msg:expr) => {
        $crate::__msg_emit!(info, println, "", $msg)
    };
    ($msg:expr, true) => {
        $crate::__msg_emit!(info, println, "", $msg, spaced)
    };
}

#[macro_export]
macro_rules! msg_success {
    ($msg:expr) => {
        $crate::__msg_emit!(info, println, "✅ ", $msg)
    };
    ($msg:expr, true) => {
        $crate::__msg_emit!(info, println, "✅ ", $msg, spaced)
    };
}

/// Goes to stderr outside debug mode.
#[macro_export]
macro_rules! msg_error {
    ($msg:expr) => {
        $crate::__msg_emit!(error, eprintln, "❌ ", $msg)
    };
    ($msg:expr, true) => {
        $crate::__msg_emit!(error, eprintln, "❌ ", $msg, spaced)
    };
}

#[macro_export]
macro_rules! msg_warning {
    ($msg:expr) => {
        $crate::__msg_emit!(warn, println, "⚠️ ", $msg)
    };
    ($msg:expr, true) => {
        $crate::__msg_emit!(warn, println, "⚠️ ", $msg, spaced)
    };
}

#[macro_export]
macro_rules! msg_info {
    ($msg:expr) => {
        $crate::__msg_emit!(info, println, "ℹ️ ", $msg)
    };
    ($msg:expr, true) => {
        $crate::__msg_emit!(info, println, "ℹ️ ", $msg, spaced)
    };
}

/// Only emitted in debug mode.
#[macro_export]
macro_rules! msg_debug {
    ($msg:expr) => {
        if $crate::libs::messages::macros::is_debug_mode() {
            tracing::debug!("🔍 {}", $msg);
        }
    };
}

/// Builds an `anyhow::Error` carrying the message text.
#[macro_export]
macro_rules! msg_error_anyhow {
    ($msg:expr) => {
        anyhow::anyhow!("❌ {}", $msg)
    };
}

/// Returns early with an `anyhow::Error` carrying the message text.
#[macro_export]
macro_rules! msg_bail_anyhow {
    ($msg:expr) => {
        anyhow::bail!("❌ {}", $msg)
    };
}
