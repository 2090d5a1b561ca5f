use anyhow::Result;

use crate::error::AppError;

const MAX_NOTIFICATION_LEN: usize = 256;
const TOAST_TIMEOUT_MS: u32 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

fn sanitize_notification_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n')
        .take(MAX_NOTIFICATION_LEN)
        .collect()
}

pub fn show_notification(kind: ToastKind, title: &str, body: &str) -> Result<()> {
    let safe_title = sanitize_notification_text(title);
    let safe_body = sanitize_notification_text(body);

    match kind {
        ToastKind::Success => tracing::info!(title = %safe_title, "{}", safe_body),
        ToastKind::Error => tracing::warn!(title = %safe_title, "{}", safe_body),
    }

    #[cfg(not(target_os = "macos"))]
    {
        notify_rust::Notification::new()
            .summary(&safe_title)
            .body(&safe_body)
            .timeout(notify_rust::Timeout::Milliseconds(TOAST_TIMEOUT_MS))
            .show()?;
    }

    #[cfg(target_os = "macos")]
    {
        notify_rust::Notification::new()
            .summary(&safe_title)
            .body(&safe_body)
            .show()?;
    }

    Ok(())
}

/// Delivers toasts when enabled; delivery failures are logged, never raised.
#[derive(Debug, Clone, Copy)]
pub struct Notifier {
    enabled: bool,
}

impl Notifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn success(&self, title: &str, body: &str) {
        self.send(ToastKind::Success, title, body);
    }

    pub fn error(&self, err: &AppError) {
        self.send(ToastKind::Error, err.title(), &err.to_string());
    }

    fn send(&self, kind: ToastKind, title: &str, body: &str) {
        if !self.enabled {
            tracing::debug!(?kind, title, "Notifications disabled");
            return;
        }
        if let Err(e) = show_notification(kind, title, body) {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }
}
