use thiserror::Error;

/// Boxed underlying cause attached to parse and export failures.
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can go wrong while sweeping a single file.
///
/// None of these are fatal to the application: the shell reports them next
/// to the file that produced them and carries on with the next one.
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("Could not parse {format} content: {source}")]
    Parse {
        format: &'static str,
        #[source]
        source: Cause,
    },

    #[error("The file contains no data rows")]
    EmptyFile,

    #[error("Could not export to {format}: {source}")]
    Export {
        format: &'static str,
        #[source]
        source: Cause,
    },

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("File is {size} bytes, larger than the {limit} byte upload limit")]
    FileTooLarge { size: u64, limit: u64 },
}

impl SweepError {
    pub(crate) fn parse(format: &'static str, source: impl Into<Cause>) -> Self {
        SweepError::Parse {
            format,
            source: source.into(),
        }
    }

    pub(crate) fn export(format: &'static str, source: impl Into<Cause>) -> Self {
        SweepError::Export {
            format,
            source: source.into(),
        }
    }
}
