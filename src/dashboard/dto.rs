use serde::{Deserialize, Serialize};

use crate::bucketing::{parse_offset, BucketError};

pub const FALLBACK_SUGGESTION: &str = "Stay consistent, you're doing great!";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TzQuery {
    pub tz_offset: Option<String>,
}

impl TzQuery {
    pub fn offset(&self) -> Result<i32, BucketError> {
        parse_offset(self.tz_offset.as_deref())
    }
}

/// `null` when coaching is unavailable for this user.
#[derive(Debug, Serialize, PartialEq)]
pub struct SuggestionResponse {
    pub suggestion: Option<String>,
}
