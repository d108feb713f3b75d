//! Review Handlers

pub(crate) mod create;
pub(crate) mod helpful;
pub(crate) mod index;

use salvo::oapi::ToSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use chisel_app::domain::reviews::records::ReviewRecord;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub(crate) struct ReviewResponse {
    pub uuid: Uuid,
    pub product_uuid: Uuid,
    pub author_name: String,
    /// One to five stars
    pub rating: u8,
    pub comment: String,
    pub helpful_count: u64,
    pub created_at: String,
}

impl From<ReviewRecord> for ReviewResponse {
    fn from(record: ReviewRecord) -> Self {
        Self {
            uuid: record.uuid.into(),
            product_uuid: record.product_uuid,
            author_name: record.author_name,
            rating: record.rating,
            comment: record.comment,
            helpful_count: record.helpful_count,
            created_at: record.created_at.to_string(),
        }
    }
}
