//! This file defines the `Budget` type, the types needed to create a budget
//! and the API routes for the budget type.
//!
//! A budget caps spending for one calendar month, either overall or for a
//! single category. Consumption is derived from the month's expense
//! transactions at render time; nothing is stored.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
// Must use axum_extra's Form since that parses an empty string as None instead
// of crashing like axum::Form.
use axum_extra::extract::Form;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::{Connection, Row};
use serde::Deserialize;
use time::{Date, Month, OffsetDateTime};

use crate::{
    AppState, Error,
    aggregation::{BudgetConsumption, budget_consumption, month_label},
    category::{Category, get_categories, resolve_category},
    database_id::{BudgetId, CategoryId},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::{Transaction, TransactionKind, get_transactions},
    user::UserId,
    validation,
};

/// A monthly spending cap, either overall or for a single category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The ID of the budget.
    pub id: BudgetId,
    /// The owner of the budget.
    pub user_id: UserId,
    /// The category the budget caps, or `None` for an overall budget.
    pub category_id: Option<CategoryId>,
    /// The maximum amount to spend in the month.
    pub amount: f64,
    /// The calendar month the budget applies to (1-12).
    pub month: u8,
    /// The calendar year the budget applies to.
    pub year: i32,
}

/// A budget that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    user_id: UserId,
    category_id: Option<CategoryId>,
    amount: f64,
    month: u8,
    year: i32,
}

impl NewBudget {
    /// Validate the fields for a new budget.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        category_id: Option<CategoryId>,
        amount: f64,
        month: i64,
        year: i64,
    ) -> Result<Self, Error> {
        let amount = validation::positive_amount(amount, "Amount")?;
        let month = validation::int_in_range(month, "Month", 1, 12)? as u8;
        let year = validation::int_in_range(year, "Year", 2000, 2100)? as i32;

        Ok(Self {
            user_id,
            category_id,
            amount,
            month,
            year,
        })
    }
}

fn budget_card_view(
    budget: &Budget,
    consumption: &BudgetConsumption,
    categories: &[Category],
) -> Markup {
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id);
    let title = match budget.category_id {
        Some(_) => resolve_category(budget.category_id, categories).name,
        None => "Overall".to_owned(),
    };
    let month_name = Date::from_calendar_date(
        budget.year,
        Month::January.nth_next(budget.month - 1),
        1,
    )
    .map(month_label)
    .unwrap_or("???");
    let bar_color = if consumption.over_budget {
        "background-color: #ef4444;"
    } else {
        "background-color: #3b82f6;"
    };

    html! {
        div class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            div class="flex items-center justify-between mb-2"
            {
                div
                {
                    span class="font-medium" { (title) }
                    span class="ml-2 text-sm text-gray-500 dark:text-gray-400"
                    {
                        (month_name) " " (budget.year)
                    }
                }

                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this budget?"
                {
                    "Delete"
                }
            }

            div class="flex justify-between text-sm mb-1"
            {
                span
                {
                    (format_currency(consumption.spent)) " of " (format_currency(budget.amount))
                }

                @if consumption.over_budget
                {
                    span class="font-semibold text-red-600 dark:text-red-400" { "Over budget" }
                }
                @else
                {
                    span { (format!("{:.0}%", consumption.percentage)) }
                }
            }

            div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700"
            {
                div
                    class="h-2 rounded-full"
                    style=(format!("width: {:.0}%; {bar_color}", consumption.percentage))
                {}
            }
        }
    }
}

fn new_budget_form_view(categories: &[Category], today: Date) -> Markup {
    let expense_categories: Vec<&Category> = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Expense)
        .collect();

    html! {
        form
            hx-post=(endpoints::POST_BUDGET)
            hx-target-error="#alert-container"
            class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Overall" }

                    @for category in &expense_categories
                    {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                input
                    id="amount"
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="month" class=(FORM_LABEL_STYLE) { "Month" }

                select id="month" name="month" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for month in 1..=12u8
                    {
                        option value=(month) selected[month == today.month() as u8]
                        {
                            (month_label(Date::from_calendar_date(2000, Month::January.nth_next(month - 1), 1).expect("month is always in range")))
                        }
                    }
                }
            }

            div
            {
                label for="year" class=(FORM_LABEL_STYLE) { "Year" }

                input
                    id="year"
                    type="number"
                    name="year"
                    min="2000"
                    max="2100"
                    value=(today.year())
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="sm:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Budget" }
            }
        }
    }
}

fn budgets_view(
    budgets: &[Budget],
    transactions: &[Transaction],
    categories: &[Category],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Budgets" }

                (new_budget_form_view(categories, today))

                @if budgets.is_empty()
                {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No budgets yet. Add one above to start tracking your spending."
                    }
                }
                @else
                {
                    @for budget in budgets
                    {
                        (budget_card_view(budget, &budget_consumption(budget, transactions), categories))
                    }
                }
            }
        }
    };

    base("Budgets", &[], &content)
}

/// The state needed for the budgets page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for deleting a budget.
#[derive(Debug, Clone)]
pub struct DeleteBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the budgets page.
///
/// Each budget is rendered with its spending consumption derived from the
/// user's expense transactions for the budget's month.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)?;
    let transactions = get_transactions(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let today = OffsetDateTime::now_utc().date();

    Ok(budgets_view(&budgets, &transactions, &categories, today).into_response())
}

/// The form data for creating a budget.
#[derive(Debug, Deserialize)]
pub struct BudgetFormData {
    /// The category to cap, or none for an overall budget.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// The maximum amount to spend in the month.
    pub amount: f64,
    /// The calendar month the budget applies to.
    pub month: i64,
    /// The calendar year the budget applies to.
    pub year: i64,
}

/// A route handler for creating a new budget, redirects to the budgets view
/// on success.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    let new_budget = match NewBudget::validate(
        user_id,
        form_data.category_id,
        form_data.amount,
        form_data.month,
        form_data.year,
    ) {
        Ok(new_budget) => new_budget,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(new_budget, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a budget.
pub async fn delete_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<DeleteBudgetEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_budget(budget_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingBudget) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create a budget in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_budget(new_budget: NewBudget, connection: &Connection) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, category_id, amount, month, year)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            new_budget.user_id.as_i64(),
            new_budget.category_id,
            new_budget.amount,
            new_budget.month,
            new_budget.year,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id: new_budget.user_id,
        category_id: new_budget.category_id,
        amount: new_budget.amount,
        month: new_budget.month,
        year: new_budget.year,
    })
}

/// Retrieve `user_id`'s budgets, most recent month first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_budgets(user_id: UserId, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, category_id, amount, month, year FROM budget
            WHERE user_id = :user_id
            ORDER BY year DESC, month DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Delete one of `user_id`'s budgets from the database.
///
/// # Errors
/// Returns:
/// - [Error::DeleteMissingBudget] if the budget does not exist or belongs to
///   another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER,
            amount REAL NOT NULL,
            month INTEGER NOT NULL,
            year INTEGER NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let category_id = row.get(2)?;
    let amount = row.get(3)?;
    let month = row.get(4)?;
    let year = row.get(5)?;

    Ok(Budget {
        id,
        user_id: UserId::new(raw_user_id),
        category_id,
        amount,
        month,
        year,
    })
}

#[cfg(test)]
mod new_budget_tests {
    use crate::{Error, user::UserId};

    use super::NewBudget;

    #[test]
    fn validate_accepts_overall_budget() {
        let new_budget = NewBudget::validate(UserId::new(1), None, 500.0, 6, 2024).unwrap();

        assert_eq!(new_budget.category_id, None);
        assert_eq!(new_budget.month, 6);
        assert_eq!(new_budget.year, 2024);
    }

    #[test]
    fn validate_rejects_month_out_of_range() {
        for month in [0, 13] {
            let result = NewBudget::validate(UserId::new(1), None, 500.0, month, 2024);

            assert_eq!(
                result,
                Err(Error::Validation("Month must be between 1 and 12".to_owned())),
                "expected month {month} to be rejected"
            );
        }
    }

    #[test]
    fn validate_rejects_year_out_of_range() {
        for year in [1999, 2101] {
            assert!(
                NewBudget::validate(UserId::new(1), None, 500.0, 1, year).is_err(),
                "expected year {year} to be rejected"
            );
        }
    }

    #[test]
    fn validate_checks_amount_before_month() {
        let result = NewBudget::validate(UserId::new(1), None, -1.0, 0, 2024);

        assert_eq!(
            result,
            Err(Error::Validation("Amount must be positive".to_owned()))
        );
    }
}

#[cfg(test)]
mod budget_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, initialize_db,
        user::{UserId, create_user},
    };

    use super::{Budget, NewBudget, create_budget, delete_budget, get_budgets};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_user(connection: &Connection) -> UserId {
        create_user(
            "foo@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    fn create_test_budget(
        user_id: UserId,
        month: i64,
        year: i64,
        connection: &Connection,
    ) -> Budget {
        let new_budget = NewBudget::validate(user_id, None, 500.0, month, year).unwrap();

        create_budget(new_budget, connection).expect("Could not create test budget")
    }

    #[test]
    fn create_budget_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let budget = create_test_budget(user_id, 6, 2024, &connection);

        assert!(budget.id > 0);
        assert_eq!(budget.amount, 500.0);
    }

    #[test]
    fn get_budgets_orders_most_recent_month_first() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        create_test_budget(user_id, 1, 2024, &connection);
        create_test_budget(user_id, 12, 2023, &connection);
        create_test_budget(user_id, 6, 2024, &connection);

        let budgets = get_budgets(user_id, &connection).unwrap();

        let months: Vec<_> = budgets
            .iter()
            .map(|budget| (budget.year, budget.month))
            .collect();
        assert_eq!(months, vec![(2024, 6), (2024, 1), (2023, 12)]);
    }

    #[test]
    fn delete_budget_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let budget = create_test_budget(user_id, 6, 2024, &connection);

        let result = delete_budget(budget.id, user_id, &connection);

        assert_eq!(result, Ok(()));
        assert!(get_budgets(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_budget_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = delete_budget(999999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingBudget));
    }
}
