use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

///////////////////////////////
/// Coarse classification of errors, for callers that only care about the family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Validation,
    Capacity,
    Io,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("File at {:?} not found.", path)]
    FileNotFound { path: std::path::PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Bad graph file signature {:?}, expected {:?}", found, expected)]
    BadSignature { found: String, expected: String },

    #[error("Graph input ended in the middle of record {}{}", record, Error::format_msg_as_detail(msg))]
    TruncatedRecord { record: u64, msg: Option<String> },

    #[error("Graph header declares {} nodes but {} records were found", declared, found)]
    NodeCountMismatch { declared: u64, found: u64 },

    #[error("Corrupt data{}", Error::format_msg_as_detail(msg))]
    CorruptData { msg: Option<String> },

    #[error("Input ended after {} of {} expected {}", read, expected, what)]
    TruncatedInput {
        what: String,
        read: usize,
        expected: usize,
    },

    #[error("Failed parsing {}{}", context, Error::format_msg_as_detail(msg))]
    ParseError {
        context: String,
        msg: Option<String>,
    },

    #[error("Tag {} lists neighbor {} which is itself or a duplicate", tag_id, neighbor_id)]
    DuplicateOrSelfNeighbor { tag_id: usize, neighbor_id: usize },

    #[error("Invalid probability {} for neighbor {} of tag {}; must be in [0,0.5)", prob, neighbor_id, tag_id)]
    InvalidProbability {
        tag_id: usize,
        neighbor_id: usize,
        prob: f64,
    },

    #[error("Neighbor probabilities of tag {} sum to {} which exceeds 1", tag_id, sum)]
    ProbabilityOverflow { tag_id: usize, sum: f64 },

    #[error("Tags not sorted or not unique; element {} is not less than the following element", index)]
    UnsortedInput { index: usize },

    #[error("No id for tag \"{}\"", tag)]
    UnknownTag { tag: String },

    #[error("Invalid symbol {:?} at position {}", symbol, position)]
    InvalidSymbol { symbol: String, position: usize },

    #[error("Tag of length {} exceeds the maximum of {}", len, max)]
    TagTooLong { len: usize, max: usize },

    #[error("Expected equal sizes but got {}: {} and {}: {}", left_name, left, right_name, right)]
    SizeMismatch {
        left_name: &'static str,
        left: usize,
        right_name: &'static str,
        right: usize,
    },

    #[error("Invalid cost {} for item {}; costs must be non-negative", cost, id)]
    InvalidCost { id: usize, cost: f64 },

    #[error("Index {} out of range for {} of size {}", index, what, len)]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileNotFound { .. } | Error::Io(_) => ErrorKind::Io,
            Error::BadSignature { .. }
            | Error::TruncatedRecord { .. }
            | Error::NodeCountMismatch { .. }
            | Error::CorruptData { .. }
            | Error::TruncatedInput { .. }
            | Error::ParseError { .. } => ErrorKind::Format,
            Error::DuplicateOrSelfNeighbor { .. }
            | Error::InvalidProbability { .. }
            | Error::ProbabilityOverflow { .. }
            | Error::UnsortedInput { .. }
            | Error::UnknownTag { .. }
            | Error::InvalidSymbol { .. }
            | Error::TagTooLong { .. }
            | Error::SizeMismatch { .. } => ErrorKind::Validation,
            Error::InvalidCost { .. } | Error::IndexOutOfRange { .. } => ErrorKind::Capacity,
        }
    }

    #[cold]
    pub fn file_not_found<P: AsRef<std::path::Path>>(path: P) -> Self {
        Error::FileNotFound {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[cold]
    pub fn corrupt_data<M: Into<String>>(msg: Option<M>) -> Self {
        Error::CorruptData {
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn truncated_record<M: Into<String>>(record: u64, msg: Option<M>) -> Self {
        Error::TruncatedRecord {
            record,
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn parse_error<C: Into<String>, M: Into<String>>(context: C, msg: Option<M>) -> Self {
        Error::ParseError {
            context: context.into(),
            msg: msg.map(|m| m.into()),
        }
    }

    #[cold]
    pub fn index_out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Error::IndexOutOfRange { what, index, len }
    }

    #[cold]
    pub fn unknown_tag<T: Into<String>>(tag: T) -> Self {
        Error::UnknownTag { tag: tag.into() }
    }

    pub fn format_msg_as_detail(msg: &Option<String>) -> String {
        match msg {
            Some(m) => format!(" ({})", m),
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            Error::BadSignature {
                found: "x".into(),
                expected: "y".into()
            }
            .kind(),
            ErrorKind::Format
        );
        assert_eq!(Error::unknown_tag("0123").kind(), ErrorKind::Validation);
        assert_eq!(
            Error::InvalidCost { id: 0, cost: -1.0 }.kind(),
            ErrorKind::Capacity
        );
        assert_eq!(
            Error::index_out_of_range("tag", 4, 4).kind(),
            ErrorKind::Capacity
        );
    }

    #[test]
    fn detail_is_optional() {
        let e = Error::parse_error("count line", None::<String>);
        assert_eq!(e.to_string(), "Failed parsing count line");

        let e = Error::parse_error("count line", Some("not a number"));
        assert_eq!(e.to_string(), "Failed parsing count line (not a number)");
    }
}
