use std::fmt::Display;

use crate::resource::ResourceId;

pub type Result<T> = std::result::Result<T, MydbsError>;

/// Errors raised by the mydbs crates.
///
/// `FaultyStateError` and `TimeoutError` are the two failure modes of a
/// lifecycle wait and callers are expected to branch on them: a timeout
/// may be worth retrying with a larger budget, a faulty state is
/// terminal. Use [`MydbsError::is_timeout`] to tell them apart.
#[derive(Debug, PartialEq)]
pub enum MydbsError {
    IllegalArgument(String),
    DeserializeError(String),
    IOError(String),
    /// The control plane does not know the resource.
    NotFoundError(ResourceId),
    /// A single remote call failed; the operation may be retried.
    TransientError(String),
    /// A batch create failed part-way; the partial batch has been rolled back.
    CreationError(String),
    /// A polled resource entered a terminal failure state.
    FaultyStateError {
        states: Vec<String>,
        target: String,
        ids: Vec<ResourceId>,
    },
    /// The wait deadline elapsed with resources still not converged.
    TimeoutError {
        target: String,
        pending: Vec<ResourceId>,
    },
    /// The process was interrupted and shutdown cleanup has run.
    Interrupted,
    Other(String),
}

impl MydbsError {
    /// Whether this error is the deadline-elapsed kind of wait failure.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimeoutError { .. })
    }
}

fn fmt_ids(ids: &[ResourceId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for MydbsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalArgument(msg) => write!(f, "Illegal Argument error: {}", msg),
            Self::DeserializeError(msg) => write!(f, "Deserialize error: {}", msg),
            Self::IOError(msg) => write!(f, "IO error: {}", msg),
            Self::NotFoundError(id) => {
                write!(f, "Not found error: resource {} not found.", id)
            }
            Self::TransientError(msg) => write!(f, "Transient remote error: {}", msg),
            Self::CreationError(msg) => write!(f, "Creation error: {}", msg),
            Self::FaultyStateError {
                states,
                target,
                ids,
            } => write!(
                f,
                "Faulty state {:?} found while waiting for state {}, ID(s) {}",
                states,
                target,
                fmt_ids(ids)
            ),
            Self::TimeoutError { target, pending } => write!(
                f,
                "Timed-out waiting for state {}, ID(s) {}",
                target,
                fmt_ids(pending)
            ),
            Self::Interrupted => write!(f, "Interrupted: shutdown cleanup has been attempted"),
            Self::Other(msg) => write!(f, "Other error: {}", msg),
        }
    }
}

impl std::error::Error for MydbsError {}

impl<T> From<MydbsError> for Result<T> {
    fn from(val: MydbsError) -> Self {
        Result::Err(val)
    }
}

macro_rules! convert_to_mydbs_error {
    ($err_ty: ty, $constructor: expr) => {
        impl From<$err_ty> for MydbsError {
            fn from(value: $err_ty) -> Self {
                $constructor(value.to_string())
            }
        }
    };
}

convert_to_mydbs_error!(std::io::Error, MydbsError::IOError);
convert_to_mydbs_error!(anyhow::Error, MydbsError::Other);
convert_to_mydbs_error!(String, MydbsError::Other);
convert_to_mydbs_error!(serde_json::Error, MydbsError::DeserializeError);
