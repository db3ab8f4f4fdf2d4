//! The API endpoint URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/goals/{goal_id}', use
//! [format_endpoint].

/// The root route which redirects to the dashboard or log in page.
pub const ROOT: &str = "/";
/// The landing page for logged in users.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for displaying a user's transactions.
pub const TRANSACTIONS_VIEW: &str = "/transactions";
/// The page for creating a new transaction.
pub const NEW_TRANSACTION_VIEW: &str = "/transactions/new";
/// The page for listing all categories.
pub const CATEGORIES_VIEW: &str = "/categories";
/// The page for creating a new category.
pub const NEW_CATEGORY_VIEW: &str = "/categories/new";
/// The page for the current month's budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for savings goals.
pub const GOALS_VIEW: &str = "/goals";
/// The page for loans and debt.
pub const LOANS_VIEW: &str = "/loans";
/// The page for recurring transactions.
pub const RECURRING_VIEW: &str = "/recurring";
/// The page for the user's profile and preferences.
pub const PROFILE_VIEW: &str = "/profile";
/// The page for reports and analytics.
pub const REPORTS_VIEW: &str = "/reports";
/// The route for getting the registration page.
pub const REGISTER_VIEW: &str = "/register";
/// The route for getting the log in page.
pub const LOG_IN_VIEW: &str = "/log_in";
/// The route for instructions for resetting the user's password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route for logging in a user.
pub const LOG_IN_API: &str = "/api/log_in";
/// The route for the client to log out the current user.
pub const LOG_OUT: &str = "/api/log_out";
/// The route to register a user.
pub const USERS: &str = "/api/users";
/// The route to create a transaction.
pub const POST_TRANSACTION: &str = "/api/transactions";
/// The route to delete a transaction.
pub const DELETE_TRANSACTION: &str = "/api/transactions/{transaction_id}";
/// The route to create a category.
pub const POST_CATEGORY: &str = "/api/categories";
/// The route to delete a category.
pub const DELETE_CATEGORY: &str = "/api/categories/{category_id}";
/// The route to create a budget.
pub const POST_BUDGET: &str = "/api/budgets";
/// The route to delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to create a goal.
pub const POST_GOAL: &str = "/api/goals";
/// The route to add a contribution to a goal.
pub const CONTRIBUTE_GOAL: &str = "/api/goals/{goal_id}/contribute";
/// The route to delete a goal.
pub const DELETE_GOAL: &str = "/api/goals/{goal_id}";
/// The route to create a loan.
pub const POST_LOAN: &str = "/api/loans";
/// The route to record a payment against a loan.
pub const PAY_LOAN: &str = "/api/loans/{loan_id}/payment";
/// The route to delete a loan.
pub const DELETE_LOAN: &str = "/api/loans/{loan_id}";
/// The route to create a recurring transaction.
pub const POST_RECURRING: &str = "/api/recurring";
/// The route to toggle a recurring transaction between active and paused.
pub const TOGGLE_RECURRING: &str = "/api/recurring/{recurring_transaction_id}/toggle";
/// The route to delete a recurring transaction.
pub const DELETE_RECURRING: &str = "/api/recurring/{recurring_transaction_id}";
/// The route to update the user's profile.
pub const PUT_PROFILE: &str = "/api/profile";
/// The route to download the transactions CSV export.
pub const EXPORT_CSV: &str = "/api/reports/export";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string delimited by braces, for example '{goal_id}' in
/// the endpoint path '/api/goals/{goal_id}'. This function assumes that an
/// endpoint path only contains ASCII characters and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the original path is
/// returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_string();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
