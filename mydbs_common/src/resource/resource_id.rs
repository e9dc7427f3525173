use ::core::fmt::Display;
use ::std::borrow::Cow;

use ::serde::{Deserialize, Serialize};

use crate::error::{MydbsError, Result};

/// Opaque identifier assigned by the control plane at creation,
/// immutable once set.
#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourceId {
    id: Cow<'static, str>,
}

impl ResourceId {
    pub fn new(id: Cow<'static, str>) -> Result<Self> {
        if id.is_empty() {
            Err(MydbsError::IllegalArgument(
                "resource id cannot be empty".to_owned(),
            ))
        } else {
            Ok(Self { id })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl From<ResourceId> for String {
    fn from(id: ResourceId) -> Self {
        id.id.into_owned()
    }
}

impl TryFrom<String> for ResourceId {
    type Error = MydbsError;
    fn try_from(id: String) -> Result<Self> {
        Self::new(Cow::Owned(id))
    }
}

impl TryFrom<&'static str> for ResourceId {
    type Error = MydbsError;
    fn try_from(id: &'static str) -> Result<Self> {
        Self::new(Cow::Borrowed(id))
    }
}
