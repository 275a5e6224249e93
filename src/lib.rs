//! RFox PDF Generator
//!
//! An HTML to PDF generation and composition API for Rust. A [`Generator`]
//! accumulates HTML content (literal markup or a template file), drives a
//! headless Chrome session to paginate it into PDF bytes, and can merge
//! several rendered documents into one.
//!
//! # Features
//!
//! - **Buffer or stream output**: rendered PDFs come back as `Vec<u8>` or as
//!   an async byte stream over a delete-on-close temp file
//! - **Multi-page jobs**: ordered page specs with per-page options and
//!   render-time parameters, combined into a single document
//! - **Composition**: append pages from any number of rendered PDFs onto a
//!   base document, preserving page order
//!
//! # Example
//!
//! ```no_run
//! use rfpdf::{Generator, RenderOptions, PageFormat};
//!
//! # async fn run() -> rfpdf::Result<()> {
//! let mut generator = Generator::new();
//! generator
//!     .set_render_options(RenderOptions {
//!         format: PageFormat::Letter,
//!         ..Default::default()
//!     })
//!     .from_content("<h1>Invoice #2024-001</h1>");
//!
//! let pdf = generator.generate_pdf(None).await?;
//! assert!(pdf.starts_with(b"%PDF-"));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod cdp;
pub mod generator;
pub mod merge;
pub mod stream;

pub use generator::Generator;
pub use stream::PdfStream;

/// Paper format presets understood by the rendering engine
///
/// Dimensions follow the CDP `printToPDF` convention (inches). `A4` is the
/// default everywhere an explicit format is not supplied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PageFormat {
    A3,
    A4,
    A5,
    Letter,
    Legal,
    Tabloid,
    /// Custom paper size in inches
    Custom { width: f64, height: f64 },
}

impl PageFormat {
    /// Paper dimensions in inches as `(width, height)`
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageFormat::A3 => (11.69, 16.54),
            PageFormat::A4 => (8.27, 11.69),
            PageFormat::A5 => (5.83, 8.27),
            PageFormat::Letter => (8.5, 11.0),
            PageFormat::Legal => (8.5, 14.0),
            PageFormat::Tabloid => (11.0, 17.0),
            PageFormat::Custom { width, height } => (*width, *height),
        }
    }
}

impl Default for PageFormat {
    fn default() -> Self {
        PageFormat::A4
    }
}

/// Page margins in inches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margins {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Margins {
    /// The same margin on all four sides
    pub fn uniform(inches: f64) -> Self {
        Self {
            top: inches,
            bottom: inches,
            left: inches,
            right: inches,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Margins::uniform(0.4)
    }
}

/// Rendering knobs applied when producing PDF bytes
///
/// Options are replaced wholesale by [`Generator::set_render_options`] and by
/// per-page specs in multi-page jobs; there is no merging with previous
/// values. The defaults produce an A4 portrait page with backgrounds printed.
///
/// # Examples
///
/// ```
/// let options = rfpdf::RenderOptions::default();
/// assert_eq!(options.format, rfpdf::PageFormat::A4);
/// assert!(!options.landscape);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Paper format
    pub format: PageFormat,
    /// Rotate the paper to landscape orientation
    pub landscape: bool,
    /// Page margins
    pub margins: Margins,
    /// Print CSS backgrounds
    pub print_background: bool,
    /// Scale of the webpage rendering (1.0 = 100%)
    pub scale: f64,
    /// Show the header and footer templates on every page
    pub display_header_footer: bool,
    /// HTML template for the print header
    pub header_template: Option<String>,
    /// HTML template for the print footer
    pub footer_template: Option<String>,
    /// Give any CSS `@page` size precedence over `format`
    pub prefer_css_page_size: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            format: PageFormat::A4,
            landscape: false,
            margins: Margins::default(),
            print_background: true,
            scale: 1.0,
            display_header_footer: false,
            header_template: None,
            footer_template: None,
            prefer_css_page_size: false,
        }
    }
}

/// Arbitrary key-value parameters exposed to render-time page scripts
///
/// Injected into the page's global scope as `window.renderParams` before the
/// document loads, so inline scripts can read them while the page renders.
pub type RenderParams = serde_json::Map<String, serde_json::Value>;

/// One page's render instructions in a multi-page job
///
/// Exactly one of `content`/`template_path` must be supplied; when both are
/// given the template file wins. A spec with neither fails validation rather
/// than silently reusing whatever the generator rendered last.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PageSpec {
    /// Literal HTML for this page
    pub content: Option<String>,
    /// Path of an HTML template file for this page
    pub template_path: Option<PathBuf>,
    /// Render options for this page; `RenderOptions::default()` when absent
    pub render_options: Option<RenderOptions>,
    /// Extra render-time parameters; keys here override the injected
    /// `pageNumber`
    pub params: Option<RenderParams>,
}

impl PageSpec {
    /// A spec rendering a literal HTML string
    pub fn from_content(html: impl Into<String>) -> Self {
        Self {
            content: Some(html.into()),
            ..Default::default()
        }
    }

    /// A spec rendering an HTML template file
    pub fn from_template(path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Attach render options to this spec
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.render_options = Some(options);
        self
    }

    /// Attach render-time parameters to this spec
    pub fn with_params(mut self, params: RenderParams) -> Self {
        self.params = Some(params);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = RenderOptions::default();
        assert_eq!(options.format, PageFormat::A4);
        assert!(!options.landscape);
        assert!(options.print_background);
        assert_eq!(options.scale, 1.0);
        assert!(options.header_template.is_none());
    }

    #[test]
    fn test_page_format_dimensions() {
        let (w, h) = PageFormat::A4.dimensions();
        assert_eq!(w, 8.27);
        assert_eq!(h, 11.69);

        let (w, h) = PageFormat::Custom {
            width: 4.0,
            height: 6.0,
        }
        .dimensions();
        assert_eq!(w, 4.0);
        assert_eq!(h, 6.0);
    }

    #[test]
    fn test_uniform_margins() {
        let margins = Margins::uniform(1.0);
        assert_eq!(margins.top, 1.0);
        assert_eq!(margins.bottom, 1.0);
        assert_eq!(margins.left, 1.0);
        assert_eq!(margins.right, 1.0);
    }

    #[test]
    fn test_page_spec_deserializes_with_defaults() {
        let spec: PageSpec =
            serde_json::from_str(r#"{"content": "<p>hi</p>"}"#).expect("valid spec");
        assert_eq!(spec.content.as_deref(), Some("<p>hi</p>"));
        assert!(spec.template_path.is_none());
        assert!(spec.render_options.is_none());
        assert!(spec.params.is_none());
    }

    #[test]
    fn test_render_options_roundtrip() {
        let options = RenderOptions {
            format: PageFormat::Legal,
            landscape: true,
            margins: Margins::uniform(0.75),
            footer_template: Some("<span class=\"pageNumber\"></span>".to_string()),
            display_header_footer: true,
            ..Default::default()
        };
        let json = serde_json::to_string(&options).expect("serialize");
        let back: RenderOptions = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, options);
    }
}
