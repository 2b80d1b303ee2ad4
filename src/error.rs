use thiserror::Error;

/// Errors raised while talking to the browser or reading the page
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Failed to parse DOM: {0}")]
    DomParseFailed(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Result alias for page and browser operations
pub type Result<T> = std::result::Result<T, BrowserError>;

/// Reasons a compose cycle ends without writing a comment
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("no Gemini API key configured")]
    MissingCredential,

    #[error("API request failed: {status}")]
    RequestFailed { status: u16 },

    #[error("No content generated from API")]
    EmptyGeneration,

    #[error("no post content found near the comment input")]
    NoContentFound,

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("failed to decode API response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error(transparent)]
    Page(#[from] BrowserError),
}

/// Errors from loading, validating or saving settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Please enter an API key")]
    MissingApiKey,

    #[error("Invalid API key format")]
    InvalidKeyFormat,

    #[error("Invalid API key. Please check and try again.")]
    KeyRejected,

    #[error("Error testing API key: {0}")]
    KeyCheckFailed(#[source] ComposeError),

    #[error("could not determine a configuration directory")]
    NoConfigDir,
}
