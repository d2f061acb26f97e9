//! # Sharing Console Output (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Renders the share URL as a terminal QR code and prints the instructions the
//! user sees once the server is listening. Pure formatting; no state.
//!
//! Two QR styles are available:
//! - **small** (default): half-block characters, two modules per character row.
//! - **full**: one full block per module, two characters wide. Used with
//!   `--on-windows-native-terminal`, where half blocks do not render.
//!
//! Colors are inverted (dark modules are drawn as spaces) so the code scans
//! correctly on the usual dark terminal background.
//!
use crate::core::error::{Result, SharingError};
use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;

/// What is being shared, used to pick the headline message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareKind {
    Directory(String),
    File(String),
    Clipboard,
    Receive(String),
}

impl ShareKind {
    /// Headline printed above the QR code.
    pub fn usage_message(&self) -> String {
        match self {
            ShareKind::Directory(path) => {
                format!("Scan the QR-Code to access '{}' directory on your phone", path)
            }
            ShareKind::File(name) => {
                format!("Scan the QR-Code to access '{}' file on your phone", name)
            }
            ShareKind::Clipboard => "Scan the QR-Code to access your Clipboard".to_string(),
            ShareKind::Receive(path) => format!(
                "Scan the QR-Code to upload files to '{}' from your phone",
                path
            ),
        }
    }
}

/// # Render QR Code (`render_qr`)
///
/// Encodes `data` and draws it with terminal characters.
///
/// ## Arguments
///
/// * `data`: The text to encode, normally the share URL.
/// * `small`: `true` packs two module rows into one line with half blocks;
///   `false` draws each module as two full-block characters.
///
/// ## Returns
///
/// * `Result<String>`: The multi-line drawing including the quiet zone, or
///   `SharingError::Qr` if `data` is too long for any QR version.
pub fn render_qr(data: &str, small: bool) -> Result<String> {
    let code = QrCode::new(data.as_bytes()).map_err(SharingError::from)?;
    // Dark modules are drawn as blank cells, light modules as ink.
    let rendered = if small {
        code.render::<Dense1x2>()
            .dark_color(Dense1x2::Light)
            .light_color(Dense1x2::Dark)
            .quiet_zone(true)
            .build()
    } else {
        code.render::<char>()
            .dark_color(' ')
            .light_color('█')
            .quiet_zone(true)
            .module_dimensions(2, 1)
            .build()
    };
    Ok(rendered)
}

/// # Format Share Report (`format_report`)
///
/// Builds the full console block: headline, QR code, the literal URL (omitted
/// for clipboard shares) and how to stop.
pub fn format_report(kind: &ShareKind, share_url: &str, small_qr: bool) -> Result<String> {
    let mut report = String::new();
    report.push_str(&kind.usage_message());
    report.push('\n');
    report.push_str(&render_qr(share_url, small_qr)?);
    report.push('\n');
    if *kind != ShareKind::Clipboard {
        report.push_str(&format!(
            "Or enter the following address in a browser tab in your phone: {}\n",
            share_url
        ));
    }
    report.push_str("Press ctrl+c to stop sharing\n");
    Ok(report)
}

/// Prints the report to stdout.
pub fn print_report(kind: &ShareKind, share_url: &str, small_qr: bool) -> Result<()> {
    print!("{}", format_report(kind, share_url, small_qr)?);
    Ok(())
}
