use std::fmt;

#[derive(Debug)]
pub enum ReportError {
    MissingPageTemplate,
    UnplaceableFlowable(String),
    InvalidConfiguration(String),
    /// The input record could not be read from its source.
    Input {
        origin: String,
        source: std::io::Error,
    },
    /// The input was read but is not a JSON document.
    Parse {
        origin: String,
        source: serde_json::Error,
    },
    /// The rendered document could not be written to its destination.
    Output {
        destination: String,
        source: std::io::Error,
    },
}

impl fmt::Display for ReportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportError::MissingPageTemplate => write!(f, "no page template available"),
            ReportError::UnplaceableFlowable(message) => {
                write!(f, "flowable cannot fit on any page: {}", message)
            }
            ReportError::InvalidConfiguration(message) => {
                write!(f, "invalid configuration: {}", message)
            }
            ReportError::Input { origin, source } => {
                write!(f, "failed to read input from {}: {}", origin, source)
            }
            ReportError::Parse { origin, source } => {
                write!(f, "input from {} is not valid JSON: {}", origin, source)
            }
            ReportError::Output {
                destination,
                source,
            } => write!(f, "failed to write report to {}: {}", destination, source),
        }
    }
}

impl std::error::Error for ReportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReportError::Input { source, .. } | ReportError::Output { source, .. } => {
                Some(source)
            }
            ReportError::Parse { source, .. } => Some(source),
            _ => None,
        }
    }
}
