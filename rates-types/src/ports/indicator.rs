//! Host status indicator port.

/// The host-provided surface the presentation adapter pushes text to.
///
/// A tray icon, a terminal line or a test recorder all fit behind this trait.
pub trait StatusIndicator: Send + Sync + 'static {
    /// Replaces the status line and its tooltip.
    fn set_status(&self, status: &str, tooltip: &str);

    /// Replaces the indicator icon with raw image bytes.
    fn set_icon(&self, icon: &[u8]);
}
