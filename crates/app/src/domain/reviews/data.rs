//! Reviews Data

use chisel::votes::Toggled;
use uuid::Uuid;

use crate::domain::reviews::{ReviewsServiceError, records::ReviewUuid};

/// Lowest and highest star rating.
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// New Review Data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub uuid: ReviewUuid,
    pub product_uuid: Uuid,
    pub author_name: String,
    pub rating: u8,
    pub comment: String,
}

impl NewReview {
    /// Trim text fields and check the rating.
    ///
    /// # Errors
    ///
    /// - [`ReviewsServiceError::InvalidRating`]: rating outside one to five stars.
    /// - [`ReviewsServiceError::MissingRequiredData`]: blank author name.
    pub fn normalized(self) -> Result<Self, ReviewsServiceError> {
        if !RATING_RANGE.contains(&self.rating) {
            return Err(ReviewsServiceError::InvalidRating(self.rating));
        }

        let author_name = self.author_name.trim().to_string();

        if author_name.is_empty() {
            return Err(ReviewsServiceError::MissingRequiredData);
        }

        Ok(Self {
            author_name,
            comment: self.comment.trim().to_string(),
            ..self
        })
    }
}

/// State of a user's helpful vote after toggling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HelpfulToggle {
    pub review_uuid: ReviewUuid,
    pub helpful: bool,
    pub helpful_count: u64,
}

impl HelpfulToggle {
    /// Vote state for `review_uuid` after `toggled` was applied.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewsServiceError::CountOutOfRange`] when the voter count
    /// does not fit the stored counter.
    pub fn new(review_uuid: ReviewUuid, toggled: Toggled) -> Result<Self, ReviewsServiceError> {
        Ok(Self {
            review_uuid,
            helpful: toggled.voted,
            helpful_count: u64::try_from(toggled.count)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn review(rating: u8, author_name: &str) -> NewReview {
        NewReview {
            uuid: ReviewUuid::new(),
            product_uuid: Uuid::now_v7(),
            author_name: author_name.to_string(),
            rating,
            comment: "  Lovely veining.  ".to_string(),
        }
    }

    #[test]
    fn normalized_trims_text() -> TestResult {
        let review = review(5, "  Asha ").normalized()?;

        assert_eq!(review.author_name, "Asha");
        assert_eq!(review.comment, "Lovely veining.");

        Ok(())
    }

    #[test]
    fn rating_outside_range_is_rejected() {
        for rating in [0, 6, u8::MAX] {
            let result = review(rating, "Asha").normalized();

            assert!(
                matches!(result, Err(ReviewsServiceError::InvalidRating(r)) if r == rating),
                "expected InvalidRating for {rating}, got {result:?}"
            );
        }
    }

    #[test]
    fn helpful_toggle_carries_vote_state() -> TestResult {
        let review = ReviewUuid::new();

        let toggle = HelpfulToggle::new(
            review,
            Toggled {
                voted: false,
                count: 3,
            },
        )?;

        assert_eq!(toggle.review_uuid, review);
        assert!(!toggle.helpful);
        assert_eq!(toggle.helpful_count, 3);

        Ok(())
    }

    #[test]
    fn blank_author_is_rejected() {
        let result = review(4, "   ").normalized();

        assert!(
            matches!(result, Err(ReviewsServiceError::MissingRequiredData)),
            "expected MissingRequiredData, got {result:?}"
        );
    }
}
