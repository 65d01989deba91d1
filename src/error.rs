use thiserror::Error;

#[derive(Error, Debug)]
pub enum FillError {
    #[error("PDF parsing error (lopdf): {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("template not found: {0}")]
    TemplateNotFound(String),
}
