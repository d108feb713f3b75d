//! Promo Codes Service

use async_trait::async_trait;
use chisel::{
    codes::PromoCodeName,
    discounts::calculate_discount,
    redemptions::RedemptionLog,
    validation::{InvalidReason, PromoValidation, validate_at},
};
use jiff::Timestamp;
use mockall::automock;
use rusty_money::{Money, iso::Currency};
use sqlx::{Postgres, Transaction};
use tracing::{Span, info};
use uuid::Uuid;

use crate::{
    database::Db,
    domain::promo_codes::{
        PromoCodesServiceError,
        data::{
            AppliedPromo, NewPromoCode, NewRedemption, PromoCodeUpdate, PromoEvaluation,
            RedemptionOutcome,
        },
        records::{PromoCodeRecord, PromoCodeUuid, RedemptionUuid},
        repository::{NewRedemptionRow, PgPromoCodesRepository},
    },
};

#[derive(Debug, Clone)]
pub struct PgPromoCodesService {
    db: Db,
    currency: &'static Currency,
    repository: PgPromoCodesRepository,
}

impl PgPromoCodesService {
    /// Service pricing every order in `currency`.
    #[must_use]
    pub fn new(db: Db, currency: &'static Currency) -> Self {
        Self {
            db,
            currency,
            repository: PgPromoCodesRepository::new(),
        }
    }

    /// Redemption history needed to check `user`'s per-user limit.
    async fn redemptions_for(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        record: &PromoCodeRecord,
        user: Option<Uuid>,
    ) -> Result<RedemptionLog, PromoCodesServiceError> {
        let Some(user) = user else {
            return Ok(RedemptionLog::new());
        };

        if record.per_user_limit.is_none() {
            return Ok(RedemptionLog::new());
        }

        let count = self
            .repository
            .count_user_redemptions(tx, record.uuid, user)
            .await?;

        Ok(RedemptionLog::from_counts([(user, count)]))
    }

    fn evaluate_record(
        &self,
        record: PromoCodeRecord,
        user: Option<Uuid>,
        order_total: i64,
        redeemed_by: RedemptionLog,
        now: Timestamp,
    ) -> Result<PromoEvaluation, PromoCodesServiceError> {
        let total = Money::from_minor(order_total, self.currency);
        let promo = record.to_promo_code(self.currency, redeemed_by)?;

        if let PromoValidation::Invalid(reason) = validate_at(&promo, user, &total, now)? {
            return Ok(PromoEvaluation::Rejected(reason));
        }

        let discount = calculate_discount(&promo, &total)?;

        Ok(PromoEvaluation::Applied(AppliedPromo {
            promo_code: record,
            order_total: u64::try_from(order_total)?,
            discount: u64::try_from(discount.to_minor_units())?,
        }))
    }
}

#[async_trait]
impl PromoCodesService for PgPromoCodesService {
    #[tracing::instrument(name = "promo_codes.service.list_promo_codes", skip(self), err)]
    async fn list_promo_codes(&self) -> Result<Vec<PromoCodeRecord>, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let promo_codes = self.repository.list_promo_codes(&mut tx).await?;

        tx.commit().await?;

        Ok(promo_codes)
    }

    #[tracing::instrument(
        name = "promo_codes.service.get_promo_code",
        skip(self, promo_code),
        fields(promo_code_uuid = %promo_code),
        err
    )]
    async fn get_promo_code(
        &self,
        promo_code: PromoCodeUuid,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.get_promo_code(&mut tx, promo_code).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.find_promo_code",
        skip(self, code),
        fields(code = %code),
        err
    )]
    async fn find_promo_code(
        &self,
        code: PromoCodeName,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_promo_code(&mut tx, &code).await?;

        tx.commit().await?;

        Ok(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.create_promo_code",
        skip(self, promo_code),
        fields(
            promo_code_uuid = %promo_code.uuid,
            code = %promo_code.details.code,
            discount_type = %promo_code.details.discount.kind()
        ),
        err
    )]
    async fn create_promo_code(
        &self,
        promo_code: NewPromoCode,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError> {
        promo_code.details.check(self.currency)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .create_promo_code(&mut tx, promo_code)
            .await?;

        tx.commit().await?;

        info!(promo_code_uuid = %record.uuid, code = %record.code, "created promo code");

        Ok(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.update_promo_code",
        skip(self, promo_code, update),
        fields(promo_code_uuid = %promo_code, code = %update.code),
        err
    )]
    async fn update_promo_code(
        &self,
        promo_code: PromoCodeUuid,
        update: PromoCodeUpdate,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError> {
        update.check(self.currency)?;

        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .update_promo_code(&mut tx, promo_code, &update)
            .await?;

        tx.commit().await?;

        info!(promo_code_uuid = %record.uuid, "updated promo code");

        Ok(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.set_promo_code_active",
        skip(self, code),
        fields(code = %code),
        err
    )]
    async fn set_promo_code_active(
        &self,
        code: PromoCodeName,
        active: bool,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .set_promo_code_active(&mut tx, &code, active)
            .await?;

        tx.commit().await?;

        info!(promo_code_uuid = %record.uuid, active, "toggled promo code");

        Ok(record)
    }

    #[tracing::instrument(
        name = "promo_codes.service.delete_promo_code",
        skip(self, promo_code),
        fields(promo_code_uuid = %promo_code),
        err
    )]
    async fn delete_promo_code(
        &self,
        promo_code: PromoCodeUuid,
    ) -> Result<(), PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let rows_affected = self
            .repository
            .delete_promo_code(&mut tx, promo_code)
            .await?;

        if rows_affected == 0 {
            return Err(PromoCodesServiceError::NotFound);
        }

        tx.commit().await?;

        info!(promo_code_uuid = %promo_code, "deleted promo code");

        Ok(())
    }

    #[tracing::instrument(
        name = "promo_codes.service.evaluate_promo_code",
        skip(self, code),
        fields(code = %code, outcome = tracing::field::Empty),
        err
    )]
    async fn evaluate_promo_code(
        &self,
        code: PromoCodeName,
        user: Option<Uuid>,
        order_total: i64,
    ) -> Result<PromoEvaluation, PromoCodesServiceError> {
        let mut tx = self.db.begin().await?;

        let record = self.repository.find_promo_code(&mut tx, &code).await?;
        let redeemed_by = self.redemptions_for(&mut tx, &record, user).await?;

        tx.commit().await?;

        let evaluation =
            self.evaluate_record(record, user, order_total, redeemed_by, Timestamp::now())?;

        Span::current().record("outcome", outcome_of(&evaluation));

        Ok(evaluation)
    }

    #[tracing::instrument(
        name = "promo_codes.service.redeem_promo_code",
        skip(self, redemption),
        fields(
            code = %redemption.code,
            order_reference = %redemption.order_reference,
            outcome = tracing::field::Empty
        ),
        err
    )]
    async fn redeem_promo_code(
        &self,
        redemption: NewRedemption,
    ) -> Result<RedemptionOutcome, PromoCodesServiceError> {
        let span = Span::current();
        let mut tx = self.db.begin().await?;

        let record = self
            .repository
            .lock_promo_code(&mut tx, &redemption.code)
            .await?;

        let redeemed_by = self
            .redemptions_for(&mut tx, &record, redemption.user_uuid)
            .await?;

        let applied = match self.evaluate_record(
            record,
            redemption.user_uuid,
            redemption.order_total,
            redeemed_by,
            Timestamp::now(),
        )? {
            PromoEvaluation::Applied(applied) => applied,
            PromoEvaluation::Rejected(reason) => {
                tx.rollback().await?;
                span.record("outcome", reason.as_str());

                return Ok(RedemptionOutcome::Rejected(reason));
            }
        };

        let Some(usage_count) = self
            .repository
            .increment_usage(&mut tx, applied.promo_code.uuid)
            .await?
        else {
            tx.rollback().await?;
            span.record("outcome", InvalidReason::UsageLimitReached.as_str());

            return Ok(RedemptionOutcome::Rejected(InvalidReason::UsageLimitReached));
        };

        let redemption = self
            .repository
            .create_redemption(
                &mut tx,
                NewRedemptionRow {
                    uuid: RedemptionUuid::new(),
                    promo_code_uuid: applied.promo_code.uuid,
                    user_uuid: redemption.user_uuid,
                    order_reference: redemption.order_reference,
                    order_total: applied.order_total,
                    discount: applied.discount,
                },
            )
            .await?;

        tx.commit().await?;

        span.record("outcome", "redeemed");

        info!(
            promo_code_uuid = %redemption.promo_code_uuid,
            redemption_uuid = %redemption.uuid,
            discount = redemption.discount,
            usage_count,
            "redeemed promo code"
        );

        let mut promo_code = applied.promo_code;

        promo_code.usage_count = usage_count;

        Ok(RedemptionOutcome::Redeemed {
            redemption,
            promo_code,
        })
    }
}

fn outcome_of(evaluation: &PromoEvaluation) -> &'static str {
    match evaluation {
        PromoEvaluation::Applied(_) => "applied",
        PromoEvaluation::Rejected(reason) => reason.as_str(),
    }
}

#[automock]
#[async_trait]
pub trait PromoCodesService: Send + Sync {
    /// Every live promo code, ordered by code.
    async fn list_promo_codes(&self) -> Result<Vec<PromoCodeRecord>, PromoCodesServiceError>;

    /// A single live promo code.
    async fn get_promo_code(
        &self,
        promo_code: PromoCodeUuid,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError>;

    /// Look a code up by its canonical name.
    async fn find_promo_code(
        &self,
        code: PromoCodeName,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError>;

    /// Store a new promo code.
    async fn create_promo_code(
        &self,
        promo_code: NewPromoCode,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError>;

    /// Replace a code's editable fields.
    async fn update_promo_code(
        &self,
        promo_code: PromoCodeUuid,
        update: PromoCodeUpdate,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError>;

    /// Flip a code's kill switch.
    async fn set_promo_code_active(
        &self,
        code: PromoCodeName,
        active: bool,
    ) -> Result<PromoCodeRecord, PromoCodesServiceError>;

    /// Soft-delete a code.
    async fn delete_promo_code(
        &self,
        promo_code: PromoCodeUuid,
    ) -> Result<(), PromoCodesServiceError>;

    /// Validate and price a code for an order without changing anything.
    async fn evaluate_promo_code(
        &self,
        code: PromoCodeName,
        user: Option<Uuid>,
        order_total: i64,
    ) -> Result<PromoEvaluation, PromoCodesServiceError>;

    /// Commit a redemption for a checked-out order.
    async fn redeem_promo_code(
        &self,
        redemption: NewRedemption,
    ) -> Result<RedemptionOutcome, PromoCodesServiceError>;
}
