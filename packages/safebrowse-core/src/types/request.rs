//! Immutable analysis requests built at submit time.

use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

use crate::error::{Result, WorkflowError};

/// Pasted text must be longer than this many characters.
///
/// Counted in Unicode scalar values, so a character outside the Basic
/// Multilingual Plane (most emoji) counts once, not twice as it would in
/// UTF-16.
pub const MIN_TEXT_CHARS: usize = 50;

/// Input that must pass validation before a run starts.
pub trait Validate {
    fn validate(&self) -> Result<()>;
}

/// Everything a workflow can be asked to analyze.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnalysisRequest {
    Website(WebsiteRequest),
    Document(DocumentRequest),
}

impl From<WebsiteRequest> for AnalysisRequest {
    fn from(request: WebsiteRequest) -> Self {
        Self::Website(request)
    }
}

impl From<DocumentRequest> for AnalysisRequest {
    fn from(request: DocumentRequest) -> Self {
        Self::Document(request)
    }
}

impl Validate for AnalysisRequest {
    fn validate(&self) -> Result<()> {
        match self {
            Self::Website(request) => request.validate(),
            Self::Document(request) => request.validate(),
        }
    }
}

/// A website to check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteRequest {
    pub url: Url,
}

impl WebsiteRequest {
    /// Parse user input into a request.
    ///
    /// Surrounding whitespace is ignored. Input without a scheme
    /// (`example.com`, `localhost:8080`) is read as `https://`. Only http(s)
    /// URLs with a host are accepted.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(WorkflowError::invalid_input("URL is empty"));
        }

        let candidate = if has_scheme(trimmed) {
            trimmed.to_string()
        } else {
            format!("https://{trimmed}")
        };
        let url = Url::parse(&candidate)
            .map_err(|e| WorkflowError::invalid_input(format!("not a URL: {trimmed} ({e})")))?;

        let request = Self { url };
        request.validate()?;
        Ok(request)
    }

    pub fn host(&self) -> Option<&str> {
        self.url.host_str()
    }
}

impl Validate for WebsiteRequest {
    fn validate(&self) -> Result<()> {
        match self.url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(WorkflowError::invalid_input(format!(
                    "unsupported URL scheme: {other}"
                )))
            }
        }
        if self.url.host_str().map_or(true, str::is_empty) {
            return Err(WorkflowError::invalid_input("URL has no host"));
        }
        Ok(())
    }
}

/// True if `input` starts with `scheme:`. A leading `host:port` does not count.
fn has_scheme(input: &str) -> bool {
    let Some((scheme, rest)) = input.split_once(':') else {
        return false;
    };
    let is_scheme = scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !is_scheme {
        return false;
    }
    if rest.starts_with("//") {
        return true;
    }
    let port = rest.split(['/', '?', '#']).next().unwrap_or_default();
    port.is_empty() || !port.chars().all(|c| c.is_ascii_digit())
}

/// A document to summarize.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRequest {
    pub source: DocumentSource,
}

impl DocumentRequest {
    pub fn file(file: FileHandle) -> Self {
        Self {
            source: DocumentSource::File(file),
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            source: DocumentSource::Text(text.into()),
        }
    }
}

impl Validate for DocumentRequest {
    fn validate(&self) -> Result<()> {
        match &self.source {
            DocumentSource::File(file) if file.name.is_empty() => {
                Err(WorkflowError::invalid_input("selected file has no name"))
            }
            DocumentSource::File(_) => Ok(()),
            DocumentSource::Text(text) => validate_text(text),
        }
    }
}

/// Reject pasted text of `MIN_TEXT_CHARS` characters or fewer.
pub fn validate_text(text: &str) -> Result<()> {
    let chars = text.chars().count();
    if chars > MIN_TEXT_CHARS {
        Ok(())
    } else {
        Err(WorkflowError::invalid_input(format!(
            "pasted text must be longer than {MIN_TEXT_CHARS} characters (got {chars})"
        )))
    }
}

/// Where the document comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DocumentSource {
    File(FileHandle),
    Text(String),
}

/// A selected file: its display name and raw bytes.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct FileHandle {
    pub name: String,
    #[serde(skip)]
    pub contents: Bytes,
}

impl FileHandle {
    pub fn new(name: impl Into<String>, contents: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk.
    pub async fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, contents))
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// True if the name ends in `.pdf` (any case).
    pub fn is_pdf(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
    }
}

impl fmt::Debug for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileHandle")
            .field("name", &self.name)
            .field("len", &self.contents.len())
            .finish()
    }
}
