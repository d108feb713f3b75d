//! Review Records

use jiff::Timestamp;
use uuid::Uuid;

use crate::uuids::TypedUuid;

/// Review UUID
pub type ReviewUuid = TypedUuid<ReviewRecord>;

/// Review Record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub uuid: ReviewUuid,
    pub product_uuid: Uuid,
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
    pub helpful_count: u64,
    pub created_at: Timestamp,
}
