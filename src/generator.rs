//! The PDF generator: content intake, rendering, and composition
//!
//! The render core is a stateless function of `(content, options, params)`;
//! the `Generator` holds the current pair that intake calls write through
//! and snapshots it before the first suspension point of every render, so a
//! render always acts on exactly the content that was current when it
//! started.

use crate::cdp::RenderSession;
use crate::merge;
use crate::stream::{self, PdfStream};
use crate::{Error, PageSpec, RenderOptions, RenderParams, Result};
use serde_json::Value;
use std::path::Path;

/// Stateful HTML to PDF generator
///
/// Holds the HTML that will be rendered next together with the render
/// options. Intake calls overwrite both wholesale. The generator itself is
/// cheap; every render call launches and releases its own browser session,
/// so instances are typically created per request.
///
/// # Example
///
/// ```no_run
/// use rfpdf::{Generator, PageSpec};
///
/// # async fn run() -> rfpdf::Result<()> {
/// let mut generator = Generator::new();
/// let report = generator
///     .generate_multi_page_pdf(&[
///         PageSpec::from_content("<h1>Cover</h1>"),
///         PageSpec::from_template("templates/summary.html"),
///     ])
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Generator {
    content: String,
    options: RenderOptions,
}

impl Generator {
    /// Create a generator with empty content and default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator with non-default render options
    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            content: String::new(),
            options,
        }
    }

    /// Replace the render options wholesale
    pub fn set_render_options(&mut self, options: RenderOptions) -> &mut Self {
        self.options = options;
        self
    }

    /// Use a literal HTML string as the content to render next
    pub fn from_content(&mut self, html: impl Into<String>) -> &mut Self {
        self.content = html.into();
        self
    }

    /// Read a template file as UTF-8 and use its contents for the next
    /// render
    pub async fn from_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self> {
        let path = path.as_ref();
        let html = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| Error::FileRead {
                path: path.to_path_buf(),
                source,
            })?;
        self.content = html;
        Ok(self)
    }

    /// Render the current content into PDF bytes
    ///
    /// `params` is exposed to page scripts as `window.renderParams` before
    /// the document loads; when omitted it defaults to `{"pageNumber": 1}`.
    pub async fn generate_pdf(&self, params: Option<RenderParams>) -> Result<Vec<u8>> {
        let content = self.content.clone();
        let options = self.options.clone();
        let params = params.unwrap_or_else(default_params);

        tokio::task::spawn_blocking(move || render(&content, &options, &params))
            .await
            .map_err(|e| Error::Render(format!("Render task failed: {}", e)))?
    }

    /// Render the current content to a temp file and return a byte stream
    /// over it
    ///
    /// The backing file lives under a shared scratch directory and is
    /// deleted when the returned stream is dropped. The stream is only
    /// handed back once the PDF is fully written.
    pub async fn generate_pdf_stream(&self, params: Option<RenderParams>) -> Result<PdfStream> {
        let content = self.content.clone();
        let options = self.options.clone();
        let params = params.unwrap_or_else(default_params);

        let temp = tokio::task::spawn_blocking(move || {
            let bytes = render(&content, &options, &params)?;
            stream::write_scratch_file(&stream::scratch_dir(), &bytes)
        })
        .await
        .map_err(|e| Error::Render(format!("Render task failed: {}", e)))??;

        PdfStream::open(temp).await
    }

    /// Render an ordered list of page specs into one combined document
    ///
    /// Pages render strictly sequentially, each against the intake state the
    /// spec establishes. The 1-based page index is injected as `pageNumber`
    /// unless the spec's own params override it. The first failing page
    /// aborts the job; no partial document is returned.
    pub async fn generate_multi_page_pdf(&mut self, pages: &[PageSpec]) -> Result<Vec<u8>> {
        let mut buffers = Vec::with_capacity(pages.len());

        for (index, spec) in pages.iter().enumerate() {
            let page = index + 1;
            let buffer = self
                .render_page(page, spec)
                .await
                .map_err(|source| Error::MultiPageRender {
                    page,
                    source: Box::new(source),
                })?;
            buffers.push(buffer);
        }

        Self::merge_pdfs(buffers).await
    }

    /// Merge rendered PDF buffers into one document
    ///
    /// The first buffer is the base; every other buffer's pages are appended
    /// in list order. Fails on an empty list or any undecodable buffer.
    pub async fn merge_pdfs(buffers: Vec<Vec<u8>>) -> Result<Vec<u8>> {
        tokio::task::spawn_blocking(move || merge::merge_documents(&buffers))
            .await
            .map_err(|e| Error::Merge(format!("Merge task failed: {}", e)))?
    }

    async fn render_page(&mut self, page: usize, spec: &PageSpec) -> Result<Vec<u8>> {
        if let Some(path) = &spec.template_path {
            self.from_file(path).await?;
        } else if let Some(content) = &spec.content {
            self.content = content.clone();
        } else {
            return Err(Error::Render(format!(
                "Page spec {} supplies neither content nor a template path",
                page
            )));
        }
        self.options = spec.render_options.clone().unwrap_or_default();

        self.generate_pdf(Some(page_params(page, spec.params.as_ref())))
            .await
    }
}

/// The parameter set injected when the caller supplies none
fn default_params() -> RenderParams {
    let mut params = RenderParams::new();
    params.insert("pageNumber".to_string(), Value::from(1));
    params
}

/// Page params for one multi-page spec: the 1-based index as `pageNumber`,
/// overridden by any colliding key in the spec's own params
fn page_params(page: usize, extra: Option<&RenderParams>) -> RenderParams {
    let mut params = RenderParams::new();
    params.insert("pageNumber".to_string(), Value::from(page as u64));
    if let Some(extra) = extra {
        for (key, value) in extra {
            params.insert(key.clone(), value.clone());
        }
    }
    params
}

/// Stateless render core: one scoped browser session per call, released on
/// every exit path before the result propagates
fn render(content: &str, options: &RenderOptions, params: &RenderParams) -> Result<Vec<u8>> {
    let session = RenderSession::launch()?;
    let result = render_with(&session, content, options, params);
    session.close();
    result
}

fn render_with(
    session: &RenderSession,
    content: &str,
    options: &RenderOptions,
    params: &RenderParams,
) -> Result<Vec<u8>> {
    session.inject_params(params)?;
    session.load_content(content)?;
    session.print_to_pdf(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PageFormat;

    #[test]
    fn test_intake_overwrites_state() {
        let mut generator = Generator::new();
        assert_eq!(generator.content, "");

        generator.from_content("<p>first</p>");
        assert_eq!(generator.content, "<p>first</p>");

        generator.from_content("<p>second</p>");
        assert_eq!(generator.content, "<p>second</p>");

        generator.set_render_options(RenderOptions {
            format: PageFormat::Legal,
            ..Default::default()
        });
        assert_eq!(generator.options.format, PageFormat::Legal);
    }

    #[test]
    fn test_intake_calls_chain() {
        let mut generator = Generator::new();
        generator
            .set_render_options(RenderOptions::default())
            .from_content("<p>chained</p>");
        assert_eq!(generator.content, "<p>chained</p>");
    }

    #[tokio::test]
    async fn test_from_file_reads_template() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("template.html");
        tokio::fs::write(&path, "<h1>from disk</h1>")
            .await
            .expect("write template");

        let mut generator = Generator::new();
        generator.from_file(&path).await.expect("read template");
        assert_eq!(generator.content, "<h1>from disk</h1>");
    }

    #[tokio::test]
    async fn test_from_file_error_names_the_path() {
        let mut generator = Generator::new();
        let err = generator
            .from_file("/nonexistent/path.html")
            .await
            .expect_err("missing file must fail");

        assert!(matches!(err, Error::FileRead { .. }));
        assert!(err.to_string().contains("/nonexistent/path.html"));
    }

    #[test]
    fn test_default_params_inject_page_number() {
        let params = default_params();
        assert_eq!(params.get("pageNumber"), Some(&Value::from(1)));
    }

    #[test]
    fn test_page_params_merge_precedence() {
        let mut extra = RenderParams::new();
        extra.insert("pageNumber".to_string(), Value::from(7));
        extra.insert("title".to_string(), Value::from("Appendix"));

        let params = page_params(2, Some(&extra));
        // Spec params win on collision
        assert_eq!(params.get("pageNumber"), Some(&Value::from(7)));
        assert_eq!(params.get("title"), Some(&Value::from("Appendix")));

        let params = page_params(2, None);
        assert_eq!(params.get("pageNumber"), Some(&Value::from(2)));
    }

    #[tokio::test]
    async fn test_empty_page_spec_is_a_validation_error() {
        let mut generator = Generator::new();
        let err = generator
            .generate_multi_page_pdf(&[PageSpec::default()])
            .await
            .expect_err("empty spec must fail");

        match err {
            Error::MultiPageRender { page, source } => {
                assert_eq!(page, 1);
                assert!(matches!(*source, Error::Render(_)));
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multi_page_template_error_carries_page_index() {
        let mut generator = Generator::new();
        let specs = vec![PageSpec::from_template("/nonexistent/page.html")];
        let err = generator
            .generate_multi_page_pdf(&specs)
            .await
            .expect_err("missing template must fail");

        match err {
            Error::MultiPageRender { page, source } => {
                assert_eq!(page, 1);
                assert!(source.to_string().contains("/nonexistent/page.html"));
            }
            other => panic!("unexpected error variant: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_merge_pdfs_rejects_empty_list() {
        let err = Generator::merge_pdfs(Vec::new())
            .await
            .expect_err("empty merge must fail");
        assert!(matches!(err, Error::Merge(_)));
    }
}
