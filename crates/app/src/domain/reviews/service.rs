//! Reviews Service

use async_trait::async_trait;
use chisel::votes::HelpfulVotes;
use mockall::automock;
use tracing::info;
use uuid::Uuid;

use crate::{
    database::Db,
    domain::reviews::{
        ReviewsServiceError,
        data::{HelpfulToggle, NewReview},
        records::{ReviewRecord, ReviewUuid},
        repository::PgReviewsRepository,
    },
};

#[derive(Debug, Clone)]
pub struct PgReviewsService {
    db: Db,
    repository: PgReviewsRepository,
}

impl PgReviewsService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgReviewsRepository::new(),
        }
    }
}

#[async_trait]
impl ReviewsService for PgReviewsService {
    #[tracing::instrument(
        name = "reviews.service.create_review",
        skip(self, review),
        fields(review_uuid = %review.uuid, product_uuid = %review.product_uuid),
        err
    )]
    async fn create_review(&self, review: NewReview) -> Result<ReviewRecord, ReviewsServiceError> {
        let review = review.normalized()?;

        let mut tx = self.db.begin().await?;

        let record = self.repository.create_review(&mut tx, review).await?;

        tx.commit().await?;

        info!(review_uuid = %record.uuid, rating = record.rating, "created review");

        Ok(record)
    }

    #[tracing::instrument(name = "reviews.service.list_reviews", skip(self), err)]
    async fn list_reviews(&self, product: Uuid) -> Result<Vec<ReviewRecord>, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        let reviews = self.repository.list_reviews(&mut tx, product).await?;

        tx.commit().await?;

        Ok(reviews)
    }

    #[tracing::instrument(
        name = "reviews.service.toggle_helpful",
        skip(self, review),
        fields(review_uuid = %review),
        err
    )]
    async fn toggle_helpful(
        &self,
        review: ReviewUuid,
        user: Uuid,
    ) -> Result<HelpfulToggle, ReviewsServiceError> {
        let mut tx = self.db.begin().await?;

        self.repository.lock_review(&mut tx, review).await?;

        let mut votes: HelpfulVotes = self
            .repository
            .list_helpful_voters(&mut tx, review)
            .await?
            .into_iter()
            .collect();

        let toggled = votes.toggle(user);

        if toggled.voted {
            self.repository
                .create_helpful_vote(&mut tx, review, user)
                .await?;
        } else {
            self.repository
                .delete_helpful_vote(&mut tx, review, user)
                .await?;
        }

        let toggle = HelpfulToggle::new(review, toggled)?;

        tx.commit().await?;

        Ok(toggle)
    }
}

#[automock]
#[async_trait]
pub trait ReviewsService: Send + Sync {
    /// Store a review for a product.
    async fn create_review(&self, review: NewReview) -> Result<ReviewRecord, ReviewsServiceError>;

    /// Reviews for a product, newest first, with helpful counts.
    async fn list_reviews(&self, product: Uuid) -> Result<Vec<ReviewRecord>, ReviewsServiceError>;

    /// Add `user`'s helpful vote if absent, remove it if present.
    async fn toggle_helpful(
        &self,
        review: ReviewUuid,
        user: Uuid,
    ) -> Result<HelpfulToggle, ReviewsServiceError>;
}
