//! Reviews Repository

use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, Row, Transaction, postgres::PgRow, query, query_as, query_scalar};
use uuid::Uuid;

use crate::domain::reviews::{
    data::NewReview,
    records::{ReviewRecord, ReviewUuid},
};

const CREATE_REVIEW_SQL: &str = include_str!("sql/create_review.sql");
const LIST_REVIEWS_SQL: &str = include_str!("sql/list_reviews.sql");
const LOCK_REVIEW_SQL: &str = include_str!("sql/lock_review.sql");
const LIST_HELPFUL_VOTERS_SQL: &str = include_str!("sql/list_helpful_voters.sql");
const CREATE_HELPFUL_VOTE_SQL: &str = include_str!("sql/create_helpful_vote.sql");
const DELETE_HELPFUL_VOTE_SQL: &str = include_str!("sql/delete_helpful_vote.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgReviewsRepository;

impl PgReviewsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn create_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: NewReview,
    ) -> Result<ReviewRecord, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(CREATE_REVIEW_SQL)
            .bind(review.uuid.into_uuid())
            .bind(review.product_uuid)
            .bind(review.author_name)
            .bind(i16::from(review.rating))
            .bind(review.comment)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn list_reviews(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        product: Uuid,
    ) -> Result<Vec<ReviewRecord>, sqlx::Error> {
        query_as::<Postgres, ReviewRecord>(LIST_REVIEWS_SQL)
            .bind(product)
            .fetch_all(&mut **tx)
            .await
    }

    /// Lock the review row so concurrent toggles by the same user serialise.
    pub(crate) async fn lock_review(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
    ) -> Result<(), sqlx::Error> {
        query_scalar::<Postgres, Uuid>(LOCK_REVIEW_SQL)
            .bind(review.into_uuid())
            .fetch_one(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn list_helpful_voters(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
    ) -> Result<Vec<Uuid>, sqlx::Error> {
        query_scalar::<Postgres, Uuid>(LIST_HELPFUL_VOTERS_SQL)
            .bind(review.into_uuid())
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn create_helpful_vote(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
        user: Uuid,
    ) -> Result<(), sqlx::Error> {
        query(CREATE_HELPFUL_VOTE_SQL)
            .bind(review.into_uuid())
            .bind(user)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    pub(crate) async fn delete_helpful_vote(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        review: ReviewUuid,
        user: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_HELPFUL_VOTE_SQL)
            .bind(review.into_uuid())
            .bind(user)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }
}

impl<'r> FromRow<'r, PgRow> for ReviewRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let rating: i16 = row.try_get("rating")?;
        let helpful_count: i64 = row.try_get("helpful_count")?;

        Ok(Self {
            uuid: ReviewUuid::from_uuid(row.try_get("uuid")?),
            product_uuid: row.try_get("product_uuid")?,
            author_name: row.try_get("author_name")?,
            rating: u8::try_from(rating).map_err(|e| sqlx::Error::ColumnDecode {
                index: "rating".to_string(),
                source: Box::new(e),
            })?,
            comment: row.try_get("comment")?,
            helpful_count: u64::try_from(helpful_count).map_err(|e| sqlx::Error::ColumnDecode {
                index: "helpful_count".to_string(),
                source: Box::new(e),
            })?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
        })
    }
}
