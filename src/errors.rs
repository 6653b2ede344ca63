/// Application code the backend returns for a submission it has already seen.
pub const DUPLICATE_SUBMISSION: i64 = 50001;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Transport(String),
    Rejected { code: i64, message: Option<String> },
    MalformedResult(String),
    Request(String),
    Precondition(String),
    Configuration(String),
}

pub use Error::*;

impl Error {
    pub fn is_duplicate_submission(&self) -> bool {
        matches!(self, Rejected { code, .. } if *code == DUPLICATE_SUBMISSION)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Transport(reason) => write!(f, "push channel failed: {reason}"),
            Rejected { code, .. } if *code == DUPLICATE_SUBMISSION => {
                write!(f, "duplicate submission, please do not resubmit")
            }
            Rejected {
                code,
                message: Some(message),
            } => write!(f, "request rejected with code {code}: {message}"),
            Rejected {
                code,
                message: None,
            } => write!(f, "request rejected with code {code}"),
            MalformedResult(reason) => write!(f, "malformed result: {reason}"),
            Request(reason) => write!(f, "{reason}"),
            Precondition(reason) => write!(f, "{reason}"),
            Configuration(reason) => write!(f, "configuration error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
