//! Promo Codes Repository

use chisel::{codes::PromoCodeName, promo_codes::DiscountKind};
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{
    FromRow, Postgres, Row, Transaction,
    postgres::{PgArguments, PgRow},
    query::QueryAs,
    query, query_as, query_scalar,
};
use uuid::Uuid;

use crate::domain::promo_codes::{
    data::{NewPromoCode, PromoCodeDetails},
    records::{PromoCodeRecord, PromoCodeUuid, RedemptionRecord, RedemptionUuid},
};

const LIST_PROMO_CODES_SQL: &str = include_str!("sql/list_promo_codes.sql");
const GET_PROMO_CODE_SQL: &str = include_str!("sql/get_promo_code.sql");
const FIND_PROMO_CODE_SQL: &str = include_str!("sql/find_promo_code.sql");
const LOCK_PROMO_CODE_SQL: &str = include_str!("sql/lock_promo_code.sql");
const CREATE_PROMO_CODE_SQL: &str = include_str!("sql/create_promo_code.sql");
const UPDATE_PROMO_CODE_SQL: &str = include_str!("sql/update_promo_code.sql");
const SET_PROMO_CODE_ACTIVE_SQL: &str = include_str!("sql/set_promo_code_active.sql");
const DELETE_PROMO_CODE_SQL: &str = include_str!("sql/delete_promo_code.sql");
const COUNT_USER_REDEMPTIONS_SQL: &str = include_str!("sql/count_user_redemptions.sql");
const INCREMENT_USAGE_SQL: &str = include_str!("sql/increment_usage.sql");
const CREATE_REDEMPTION_SQL: &str = include_str!("sql/create_redemption.sql");

#[derive(Debug, Clone, Default)]
pub(crate) struct PgPromoCodesRepository;

impl PgPromoCodesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn list_promo_codes(
        &self,
        tx: &mut Transaction<'_, Postgres>,
    ) -> Result<Vec<PromoCodeRecord>, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(LIST_PROMO_CODES_SQL)
            .fetch_all(&mut **tx)
            .await
    }

    pub(crate) async fn get_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: PromoCodeUuid,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(GET_PROMO_CODE_SQL)
            .bind(promo_code.into_uuid())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn find_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &PromoCodeName,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(FIND_PROMO_CODE_SQL)
            .bind(code.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    /// Same as [`Self::find_promo_code`], holding the row until the
    /// transaction ends.
    pub(crate) async fn lock_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &PromoCodeName,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(LOCK_PROMO_CODE_SQL)
            .bind(code.as_str())
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn create_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: NewPromoCode,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        let columns = DetailColumns::try_from(&promo_code.details)?;

        columns
            .bind_to(
                query_as::<Postgres, PromoCodeRecord>(CREATE_PROMO_CODE_SQL)
                    .bind(promo_code.uuid.into_uuid()),
            )
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn update_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: PromoCodeUuid,
        details: &PromoCodeDetails,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        let columns = DetailColumns::try_from(details)?;

        columns
            .bind_to(
                query_as::<Postgres, PromoCodeRecord>(UPDATE_PROMO_CODE_SQL)
                    .bind(promo_code.into_uuid()),
            )
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn set_promo_code_active(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        code: &PromoCodeName,
        active: bool,
    ) -> Result<PromoCodeRecord, sqlx::Error> {
        query_as::<Postgres, PromoCodeRecord>(SET_PROMO_CODE_ACTIVE_SQL)
            .bind(code.as_str())
            .bind(active)
            .fetch_one(&mut **tx)
            .await
    }

    pub(crate) async fn delete_promo_code(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: PromoCodeUuid,
    ) -> Result<u64, sqlx::Error> {
        let rows_affected = query(DELETE_PROMO_CODE_SQL)
            .bind(promo_code.into_uuid())
            .execute(&mut **tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    pub(crate) async fn count_user_redemptions(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: PromoCodeUuid,
        user: Uuid,
    ) -> Result<u32, sqlx::Error> {
        let count: i64 = query_scalar(COUNT_USER_REDEMPTIONS_SQL)
            .bind(promo_code.into_uuid())
            .bind(user)
            .fetch_one(&mut **tx)
            .await?;

        decode_u32(count, "count")
    }

    /// Take one usage slot. `None` when the global cap is already reached.
    pub(crate) async fn increment_usage(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        promo_code: PromoCodeUuid,
    ) -> Result<Option<u32>, sqlx::Error> {
        let usage_count: Option<i32> = query_scalar(INCREMENT_USAGE_SQL)
            .bind(promo_code.into_uuid())
            .fetch_optional(&mut **tx)
            .await?;

        usage_count
            .map(|count| decode_u32(i64::from(count), "usage_count"))
            .transpose()
    }

    pub(crate) async fn create_redemption(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        redemption: NewRedemptionRow,
    ) -> Result<RedemptionRecord, sqlx::Error> {
        let created_at: SqlxTimestamp = query_scalar(CREATE_REDEMPTION_SQL)
            .bind(redemption.uuid.into_uuid())
            .bind(redemption.promo_code_uuid.into_uuid())
            .bind(redemption.user_uuid)
            .bind(&redemption.order_reference)
            .bind(encode_i64(redemption.order_total, "order_total")?)
            .bind(encode_i64(redemption.discount, "discount")?)
            .fetch_one(&mut **tx)
            .await?;

        Ok(RedemptionRecord {
            uuid: redemption.uuid,
            promo_code_uuid: redemption.promo_code_uuid,
            user_uuid: redemption.user_uuid,
            order_reference: redemption.order_reference,
            order_total: redemption.order_total,
            discount: redemption.discount,
            created_at: created_at.to_jiff(),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NewRedemptionRow {
    pub(crate) uuid: RedemptionUuid,
    pub(crate) promo_code_uuid: PromoCodeUuid,
    pub(crate) user_uuid: Option<Uuid>,
    pub(crate) order_reference: String,
    pub(crate) order_total: u64,
    pub(crate) discount: u64,
}

/// Editable columns in storage form, bound as `$2..=$12`.
struct DetailColumns {
    code: String,
    discount_type: &'static str,
    discount_value: i64,
    max_discount: Option<i64>,
    min_order_value: Option<i64>,
    valid_from: Option<SqlxTimestamp>,
    valid_until: Option<SqlxTimestamp>,
    usage_limit: Option<i32>,
    per_user_limit: Option<i32>,
    description: String,
    active: bool,
}

impl TryFrom<&PromoCodeDetails> for DetailColumns {
    type Error = sqlx::Error;

    fn try_from(details: &PromoCodeDetails) -> Result<Self, Self::Error> {
        Ok(Self {
            code: details.code.as_str().to_string(),
            discount_type: details.discount.kind().as_str(),
            discount_value: encode_i64(details.discount.value(), "discount_value")?,
            max_discount: details
                .discount
                .max_discount()
                .map(|cap| encode_i64(cap, "max_discount"))
                .transpose()?,
            min_order_value: details
                .min_order_value
                .map(|minimum| encode_i64(minimum, "min_order_value"))
                .transpose()?,
            valid_from: details.valid_from.map(SqlxTimestamp::from),
            valid_until: details.valid_until.map(SqlxTimestamp::from),
            usage_limit: details
                .usage_limit
                .map(|limit| encode_i32(limit, "usage_limit"))
                .transpose()?,
            per_user_limit: details
                .per_user_limit
                .map(|limit| encode_i32(limit, "per_user_limit"))
                .transpose()?,
            description: details.description.clone(),
            active: details.active,
        })
    }
}

impl DetailColumns {
    fn bind_to(
        self,
        statement: QueryAs<'_, Postgres, PromoCodeRecord, PgArguments>,
    ) -> QueryAs<'_, Postgres, PromoCodeRecord, PgArguments> {
        statement
            .bind(self.code)
            .bind(self.discount_type)
            .bind(self.discount_value)
            .bind(self.max_discount)
            .bind(self.min_order_value)
            .bind(self.valid_from)
            .bind(self.valid_until)
            .bind(self.usage_limit)
            .bind(self.per_user_limit)
            .bind(self.description)
            .bind(self.active)
    }
}

impl<'r> FromRow<'r, PgRow> for PromoCodeRecord {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        let discount_type: String = row.try_get("discount_type")?;

        let discount_type =
            discount_type
                .parse::<DiscountKind>()
                .map_err(|e| sqlx::Error::ColumnDecode {
                    index: "discount_type".to_string(),
                    source: Box::new(e),
                })?;

        Ok(Self {
            uuid: PromoCodeUuid::from_uuid(row.try_get("uuid")?),
            code: row.try_get("code")?,
            discount_type,
            discount_value: decode_u64(row.try_get("discount_value")?, "discount_value")?,
            max_discount: row
                .try_get::<Option<i64>, _>("max_discount")?
                .map(|cap| decode_u64(cap, "max_discount"))
                .transpose()?,
            min_order_value: row
                .try_get::<Option<i64>, _>("min_order_value")?
                .map(|minimum| decode_u64(minimum, "min_order_value"))
                .transpose()?,
            valid_from: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_from")?
                .map(SqlxTimestamp::to_jiff),
            valid_until: row
                .try_get::<Option<SqlxTimestamp>, _>("valid_until")?
                .map(SqlxTimestamp::to_jiff),
            usage_limit: row
                .try_get::<Option<i32>, _>("usage_limit")?
                .map(|limit| decode_u32(i64::from(limit), "usage_limit"))
                .transpose()?,
            usage_count: decode_u32(
                i64::from(row.try_get::<i32, _>("usage_count")?),
                "usage_count",
            )?,
            per_user_limit: row
                .try_get::<Option<i32>, _>("per_user_limit")?
                .map(|limit| decode_u32(i64::from(limit), "per_user_limit"))
                .transpose()?,
            description: row.try_get("description")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
            deleted_at: row
                .try_get::<Option<SqlxTimestamp>, _>("deleted_at")?
                .map(SqlxTimestamp::to_jiff),
        })
    }
}

fn decode_u64(value: i64, column: &'static str) -> Result<u64, sqlx::Error> {
    u64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn decode_u32(value: i64, column: &'static str) -> Result<u32, sqlx::Error> {
    u32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn encode_i64(value: u64, column: &'static str) -> Result<i64, sqlx::Error> {
    i64::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}

fn encode_i32(value: u32, column: &'static str) -> Result<i32, sqlx::Error> {
    i32::try_from(value).map_err(|e| sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::new(e),
    })
}
