pub type FigResult<T> = Result<T, FigError>;

#[derive(thiserror::Error, Debug)]
pub enum FigError {
    #[error("not an archive: {0}")]
    NotArchive(String),

    #[error("missing archive entry: {0}")]
    MissingEntry(String),

    #[error("bad canvas magic (expected \"fig-kiwi\")")]
    BadMagic,

    #[error("unsupported compression method {0}")]
    UnsupportedCompression(u16),

    #[error("corrupt data at offset {offset}: {reason}")]
    Corrupt { offset: usize, reason: String },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid render option: {0}")]
    Options(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FigError {
    pub fn not_archive(msg: impl Into<String>) -> Self {
        Self::NotArchive(msg.into())
    }

    pub fn corrupt(offset: usize, reason: impl Into<String>) -> Self {
        Self::Corrupt {
            offset,
            reason: reason.into(),
        }
    }

    pub fn schema_mismatch(msg: impl Into<String>) -> Self {
        Self::SchemaMismatch(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    pub fn options(msg: impl Into<String>) -> Self {
        Self::Options(msg.into())
    }
}
