//! Application router configuration with protected and unprotected route definitions.

use axum::{
    Router,
    http::StatusCode,
    middleware,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{delete, get, post, put},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    auth_middleware::{auth_guard, auth_guard_hx},
    budget::{create_budget_endpoint, delete_budget_endpoint, get_budgets_page},
    category::{
        create_category_endpoint, delete_category_endpoint, get_categories_page,
        get_new_category_page,
    },
    dashboard::get_dashboard_page,
    endpoints,
    forgot_password::get_forgot_password_page,
    goal::{
        contribute_goal_endpoint, create_goal_endpoint, delete_goal_endpoint, get_goals_page,
    },
    internal_server_error::get_internal_server_error_page,
    loan::{create_loan_endpoint, delete_loan_endpoint, get_loans_page, pay_loan_endpoint},
    log_in::{get_log_in_page, post_log_in},
    log_out::get_log_out,
    not_found::get_404_not_found,
    profile::{get_profile_page, update_profile_endpoint},
    recurring::{
        create_recurring_endpoint, delete_recurring_endpoint, get_recurring_page,
        toggle_recurring_endpoint,
    },
    register_user::{get_register_page, register_user},
    report::{export_transactions_csv, get_reports_page},
    transaction::{
        create_transaction_endpoint, delete_transaction_endpoint, get_new_transaction_page,
        get_transactions_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    let unprotected_routes = Router::new()
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::LOG_IN_VIEW, get(get_log_in_page))
        .route(endpoints::LOG_IN_API, post(post_log_in))
        .route(endpoints::LOG_OUT, get(get_log_out))
        .route(endpoints::REGISTER_VIEW, get(get_register_page))
        .route(
            endpoints::FORGOT_PASSWORD_VIEW,
            get(get_forgot_password_page),
        )
        .route(endpoints::USERS, post(register_user))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        );

    let protected_routes = Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::TRANSACTIONS_VIEW, get(get_transactions_page))
        .route(
            endpoints::NEW_TRANSACTION_VIEW,
            get(get_new_transaction_page),
        )
        .route(endpoints::CATEGORIES_VIEW, get(get_categories_page))
        .route(endpoints::NEW_CATEGORY_VIEW, get(get_new_category_page))
        .route(endpoints::BUDGETS_VIEW, get(get_budgets_page))
        .route(endpoints::GOALS_VIEW, get(get_goals_page))
        .route(endpoints::LOANS_VIEW, get(get_loans_page))
        .route(endpoints::RECURRING_VIEW, get(get_recurring_page))
        .route(endpoints::PROFILE_VIEW, get(get_profile_page))
        .route(endpoints::REPORTS_VIEW, get(get_reports_page))
        .route(endpoints::EXPORT_CSV, get(export_transactions_csv))
        .layer(middleware::from_fn_with_state(state.clone(), auth_guard));

    // These POST/PUT/DELETE routes need to use the HX-REDIRECT header for
    // auth redirects to work properly for HTMX requests.
    let protected_routes = protected_routes.merge(
        Router::new()
            .route(
                endpoints::POST_TRANSACTION,
                post(create_transaction_endpoint),
            )
            .route(
                endpoints::DELETE_TRANSACTION,
                delete(delete_transaction_endpoint),
            )
            .route(endpoints::POST_CATEGORY, post(create_category_endpoint))
            .route(endpoints::DELETE_CATEGORY, delete(delete_category_endpoint))
            .route(endpoints::POST_BUDGET, post(create_budget_endpoint))
            .route(endpoints::DELETE_BUDGET, delete(delete_budget_endpoint))
            .route(endpoints::POST_GOAL, post(create_goal_endpoint))
            .route(endpoints::CONTRIBUTE_GOAL, post(contribute_goal_endpoint))
            .route(endpoints::DELETE_GOAL, delete(delete_goal_endpoint))
            .route(endpoints::POST_LOAN, post(create_loan_endpoint))
            .route(endpoints::PAY_LOAN, post(pay_loan_endpoint))
            .route(endpoints::DELETE_LOAN, delete(delete_loan_endpoint))
            .route(endpoints::POST_RECURRING, post(create_recurring_endpoint))
            .route(endpoints::TOGGLE_RECURRING, post(toggle_recurring_endpoint))
            .route(
                endpoints::DELETE_RECURRING,
                delete(delete_recurring_endpoint),
            )
            .route(endpoints::PUT_PROFILE, put(update_profile_endpoint))
            .layer(middleware::from_fn_with_state(state.clone(), auth_guard_hx)),
    );

    protected_routes
        .merge(unprotected_routes)
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

#[cfg(test)]
mod root_route_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use crate::{endpoints, routing::get_index_page};

    #[tokio::test]
    async fn root_redirects_to_dashboard() {
        let response = get_index_page().await.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let location = response.headers().get("location").unwrap();
        assert_eq!(location, endpoints::DASHBOARD_VIEW);
    }
}
