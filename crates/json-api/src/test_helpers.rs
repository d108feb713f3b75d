//! Test helpers.

use std::sync::Arc;

use rusty_money::iso::INR;
use salvo::{affix_state::inject, prelude::*};

use chisel_app::{
    context::AppContext,
    domain::{promo_codes::MockPromoCodesService, reviews::MockReviewsService},
};

use crate::{admin::AdminCredentials, state::State};

pub(crate) const TEST_ADMIN_PASSWORD: &str = "veined-white-makrana";

pub(crate) fn strict_promo_codes_mock() -> MockPromoCodesService {
    let mut promo_codes = MockPromoCodesService::new();

    promo_codes.expect_list_promo_codes().never();
    promo_codes.expect_get_promo_code().never();
    promo_codes.expect_find_promo_code().never();
    promo_codes.expect_create_promo_code().never();
    promo_codes.expect_update_promo_code().never();
    promo_codes.expect_set_promo_code_active().never();
    promo_codes.expect_delete_promo_code().never();
    promo_codes.expect_evaluate_promo_code().never();
    promo_codes.expect_redeem_promo_code().never();

    promo_codes
}

pub(crate) fn strict_reviews_mock() -> MockReviewsService {
    let mut reviews = MockReviewsService::new();

    reviews.expect_create_review().never();
    reviews.expect_list_reviews().never();
    reviews.expect_toggle_helpful().never();

    reviews
}

pub(crate) fn state_with_mocks(
    promo_codes: MockPromoCodesService,
    reviews: MockReviewsService,
) -> Arc<State> {
    let app = AppContext {
        promo_codes: Arc::new(promo_codes),
        reviews: Arc::new(reviews),
        currency: INR,
    };

    State::shared(app, AdminCredentials::new(TEST_ADMIN_PASSWORD, true))
}

/// State whose services fail the test if they are called at all.
pub(crate) fn strict_state() -> Arc<State> {
    state_with_mocks(strict_promo_codes_mock(), strict_reviews_mock())
}

pub(crate) fn promo_codes_service(promo_codes: MockPromoCodesService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_mocks(promo_codes, strict_reviews_mock())))
            .push(route),
    )
}

pub(crate) fn reviews_service(reviews: MockReviewsService, route: Router) -> Service {
    Service::new(
        Router::new()
            .hoop(inject(state_with_mocks(strict_promo_codes_mock(), reviews)))
            .push(route),
    )
}
