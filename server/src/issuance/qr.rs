use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use qrcode::render::svg;
use qrcode::QrCode;

use super::IssueError;

const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";

pub trait QrRenderer: Send + Sync {
    /// Renders `content` as a QR image and returns a reference to it.
    fn render(&self, content: &str) -> Result<String, IssueError>;
}

/// Renders QR codes as inline SVG data URLs.
#[derive(Debug, Clone)]
pub struct SvgQrRenderer {
    min_size: u32,
}

impl SvgQrRenderer {
    pub fn new(min_size: u32) -> Self {
        Self { min_size }
    }
}

impl QrRenderer for SvgQrRenderer {
    fn render(&self, content: &str) -> Result<String, IssueError> {
        let code =
            QrCode::new(content.as_bytes()).map_err(|e| IssueError::Render(e.to_string()))?;

        let image = code
            .render::<svg::Color>()
            .min_dimensions(self.min_size, self.min_size)
            .build();

        Ok(format!("{DATA_URL_PREFIX}{}", STANDARD.encode(image)))
    }
}
