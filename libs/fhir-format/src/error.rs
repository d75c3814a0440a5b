use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON write error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("XML write error: {0}")]
    XmlWrite(#[from] quick_xml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
