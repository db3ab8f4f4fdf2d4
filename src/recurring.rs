//! This file defines the `RecurringTransaction` type, the types needed to
//! create a recurring transaction and the API routes for the type.
//!
//! A recurring transaction is a template the user maintains by hand: it
//! records what repeats and when it is next due, but no transactions are
//! generated automatically.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

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
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    category::{Category, get_categories, resolve_category},
    database_id::{CategoryId, RecurringTransactionId},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE,
        FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    transaction::TransactionKind,
    user::UserId,
    validation,
};

/// How often a recurring transaction repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    /// Repeats every day.
    Daily,
    /// Repeats every week.
    Weekly,
    /// Repeats every month.
    Monthly,
    /// Repeats every year.
    Yearly,
}

impl Frequency {
    /// The string stored in the database for this frequency.
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
            Frequency::Yearly => "yearly",
        }
    }
}

impl FromStr for Frequency {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            _ => Err(Error::Validation(format!("'{s}' is not a valid frequency"))),
        }
    }
}

impl Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A transaction template that repeats on a schedule.
#[derive(Debug, Clone, PartialEq)]
pub struct RecurringTransaction {
    /// The ID of the recurring transaction.
    pub id: RecurringTransactionId,
    /// The owner of the recurring transaction.
    pub user_id: UserId,
    /// What the recurring transaction is for, e.g., 'Rent'.
    pub description: String,
    /// The amount of each occurrence. Always positive; the kind carries the
    /// sign.
    pub amount: f64,
    /// Whether each occurrence is income or an expense.
    pub kind: TransactionKind,
    /// How often the transaction repeats.
    pub frequency: Frequency,
    /// When the next occurrence is due.
    pub next_date: Date,
    /// Whether the schedule is currently active. Inactive schedules are
    /// kept but shown dimmed.
    pub is_active: bool,
    /// The category occurrences belong to, if any.
    pub category_id: Option<CategoryId>,
}

/// A recurring transaction that passed validation but has not been stored
/// yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecurringTransaction {
    user_id: UserId,
    description: String,
    amount: f64,
    kind: TransactionKind,
    frequency: Frequency,
    next_date: Date,
    category_id: Option<CategoryId>,
}

impl NewRecurringTransaction {
    /// Validate the fields for a new recurring transaction.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        description: &str,
        amount: f64,
        kind: TransactionKind,
        frequency: Frequency,
        next_date: Date,
        category_id: Option<CategoryId>,
    ) -> Result<Self, Error> {
        let description = validation::required_text(description, "Description", 500)?;
        let amount = validation::positive_amount(amount, "Amount")?;

        Ok(Self {
            user_id,
            description,
            amount,
            kind,
            frequency,
            next_date,
            category_id,
        })
    }
}

fn recurring_card_view(recurring: &RecurringTransaction, categories: &[Category]) -> Markup {
    let category = resolve_category(recurring.category_id, categories);
    let toggle_endpoint =
        endpoints::format_endpoint(endpoints::TOGGLE_RECURRING, recurring.id);
    let delete_endpoint =
        endpoints::format_endpoint(endpoints::DELETE_RECURRING, recurring.id);
    let card_style = if recurring.is_active {
        "w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
    } else {
        "w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 opacity-50"
    };
    let (amount_text, amount_style) = match recurring.kind {
        TransactionKind::Income => (
            format!("+{}", format_currency(recurring.amount)),
            "text-green-600 dark:text-green-400",
        ),
        TransactionKind::Expense => (
            format!("-{}", format_currency(recurring.amount)),
            "text-red-600 dark:text-red-400",
        ),
    };

    html! {
        div class=(card_style)
        {
            div class="flex items-center justify-between"
            {
                div
                {
                    div class="flex items-center gap-2"
                    {
                        span class="font-medium" { (recurring.description) }

                        span
                            class=(CATEGORY_BADGE_STYLE)
                            style=(format!("background-color: {}", category.color))
                        {
                            (category.name)
                        }
                    }

                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        (recurring.frequency) ", next on " (recurring.next_date)
                    }
                }

                div class="flex items-center gap-3"
                {
                    span class=(format!("font-semibold {amount_style}")) { (amount_text) }

                    button
                        class=(BUTTON_SECONDARY_STYLE)
                        style="width: auto;"
                        hx-post=(toggle_endpoint)
                        hx-target-error="#alert-container"
                    {
                        @if recurring.is_active { "Pause" } @else { "Resume" }
                    }

                    button
                        class=(BUTTON_DELETE_STYLE)
                        hx-delete=(delete_endpoint)
                        hx-target-error="#alert-container"
                        hx-confirm="Delete this recurring transaction?"
                    {
                        "Delete"
                    }
                }
            }
        }
    }
}

fn new_recurring_form_view(categories: &[Category], today: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_RECURRING)
            hx-target-error="#alert-container"
            class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="e.g., Rent"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
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
                label for="kind" class=(FORM_LABEL_STYLE) { "Type" }

                select id="kind" name="kind" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="expense" selected { "Expense" }
                    option value="income" { "Income" }
                }
            }

            div
            {
                label for="frequency" class=(FORM_LABEL_STYLE) { "Frequency" }

                select id="frequency" name="frequency" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="daily" { "Daily" }
                    option value="weekly" { "Weekly" }
                    option value="monthly" selected { "Monthly" }
                    option value="yearly" { "Yearly" }
                }
            }

            div
            {
                label for="next_date" class=(FORM_LABEL_STYLE) { "Next Date" }

                input
                    id="next_date"
                    type="date"
                    name="next_date"
                    value=(today)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="category_id" class=(FORM_LABEL_STYLE) { "Category" }

                select id="category_id" name="category_id" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" { "Uncategorized" }

                    @for category in categories
                    {
                        option value=(category.id) { (category.name) }
                    }
                }
            }

            div class="sm:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Recurring Transaction" }
            }
        }
    }
}

fn recurring_view(
    recurring_transactions: &[RecurringTransaction],
    categories: &[Category],
    today: Date,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::RECURRING_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Recurring Transactions" }

                (new_recurring_form_view(categories, today))

                @if recurring_transactions.is_empty()
                {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No recurring transactions yet. Add your regular bills and income above."
                    }
                }
                @else
                {
                    @for recurring in recurring_transactions
                    {
                        (recurring_card_view(recurring, categories))
                    }
                }
            }
        }
    };

    base("Recurring Transactions", &[], &content)
}

/// The state needed for the recurring transactions page.
#[derive(Debug, Clone)]
pub struct RecurringPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating, toggling or deleting a recurring
/// transaction.
#[derive(Debug, Clone)]
pub struct RecurringEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RecurringEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the recurring transactions page.
pub async fn get_recurring_page(
    State(state): State<RecurringPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let recurring_transactions = get_recurring_transactions(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let today = OffsetDateTime::now_utc().date();

    Ok(recurring_view(&recurring_transactions, &categories, today).into_response())
}

/// The form data for creating a recurring transaction.
#[derive(Debug, Deserialize)]
pub struct RecurringFormData {
    /// What the recurring transaction is for.
    pub description: String,
    /// The amount of each occurrence.
    pub amount: f64,
    /// Whether each occurrence is income or an expense.
    pub kind: TransactionKind,
    /// How often the transaction repeats.
    pub frequency: Frequency,
    /// When the next occurrence is due.
    pub next_date: Date,
    /// The category occurrences belong to.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
}

/// A route handler for creating a new recurring transaction, redirects to
/// the recurring view on success.
pub async fn create_recurring_endpoint(
    State(state): State<RecurringEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<RecurringFormData>,
) -> Response {
    let new_recurring = match NewRecurringTransaction::validate(
        user_id,
        &form_data.description,
        form_data.amount,
        form_data.kind,
        form_data.frequency,
        form_data.next_date,
        form_data.category_id,
    ) {
        Ok(new_recurring) => new_recurring,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_recurring_transaction(new_recurring, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::RECURRING_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while creating a recurring transaction: {error}"
            );

            error.into_alert_response()
        }
    }
}

/// A route handler for pausing or resuming a recurring transaction.
pub async fn toggle_recurring_endpoint(
    Path(recurring_transaction_id): Path<RecurringTransactionId>,
    State(state): State<RecurringEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match toggle_recurring_transaction(recurring_transaction_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::RECURRING_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::UpdateMissingRecurringTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while toggling recurring transaction {recurring_transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a recurring transaction.
pub async fn delete_recurring_endpoint(
    Path(recurring_transaction_id): Path<RecurringTransactionId>,
    State(state): State<RecurringEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_recurring_transaction(recurring_transaction_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::RECURRING_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingRecurringTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting recurring transaction {recurring_transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create an active recurring transaction in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_recurring_transaction(
    new_recurring: NewRecurringTransaction,
    connection: &Connection,
) -> Result<RecurringTransaction, Error> {
    connection.execute(
        "INSERT INTO recurring_transaction
            (user_id, description, amount, kind, frequency, next_date, is_active, category_id)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7)",
        (
            new_recurring.user_id.as_i64(),
            &new_recurring.description,
            new_recurring.amount,
            new_recurring.kind.as_str(),
            new_recurring.frequency.as_str(),
            new_recurring.next_date,
            new_recurring.category_id,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(RecurringTransaction {
        id,
        user_id: new_recurring.user_id,
        description: new_recurring.description,
        amount: new_recurring.amount,
        kind: new_recurring.kind,
        frequency: new_recurring.frequency,
        next_date: new_recurring.next_date,
        is_active: true,
        category_id: new_recurring.category_id,
    })
}

/// Retrieve `user_id`'s recurring transactions ordered by next due date,
/// soonest first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_recurring_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<RecurringTransaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, description, amount, kind, frequency, next_date, is_active, category_id
            FROM recurring_transaction
            WHERE user_id = :user_id
            ORDER BY next_date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_recurring_row)?
        .map(|maybe_recurring| maybe_recurring.map_err(|error| error.into()))
        .collect()
}

/// Flip the active flag of one of `user_id`'s recurring transactions.
///
/// # Errors
/// Returns:
/// - [Error::UpdateMissingRecurringTransaction] if the recurring transaction
///   does not exist or belongs to another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn toggle_recurring_transaction(
    recurring_transaction_id: RecurringTransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE recurring_transaction SET is_active = 1 - is_active
        WHERE id = ?1 AND user_id = ?2",
        (recurring_transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingRecurringTransaction);
    }

    Ok(())
}

/// Delete one of `user_id`'s recurring transactions from the database.
///
/// # Errors
/// Returns:
/// - [Error::DeleteMissingRecurringTransaction] if the recurring transaction
///   does not exist or belongs to another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_recurring_transaction(
    recurring_transaction_id: RecurringTransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM recurring_transaction WHERE id = ?1 AND user_id = ?2",
        (recurring_transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingRecurringTransaction);
    }

    Ok(())
}

pub fn create_recurring_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS recurring_transaction (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            description TEXT NOT NULL,
            amount REAL NOT NULL,
            kind TEXT NOT NULL,
            frequency TEXT NOT NULL,
            next_date TEXT NOT NULL,
            is_active INTEGER NOT NULL DEFAULT 1,
            category_id INTEGER,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        )",
        (),
    )?;

    Ok(())
}

fn map_recurring_row(row: &Row) -> Result<RecurringTransaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let description = row.get(2)?;
    let amount = row.get(3)?;
    let raw_kind: String = row.get(4)?;
    let raw_frequency: String = row.get(5)?;
    let next_date = row.get(6)?;
    let is_active = row.get(7)?;
    let category_id = row.get(8)?;

    let kind = raw_kind.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("invalid transaction kind {raw_kind:?}").into(),
        )
    })?;

    let frequency = raw_frequency.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("invalid frequency {raw_frequency:?}").into(),
        )
    })?;

    Ok(RecurringTransaction {
        id,
        user_id: UserId::new(raw_user_id),
        description,
        amount,
        kind,
        frequency,
        next_date,
        is_active,
        category_id,
    })
}

#[cfg(test)]
mod frequency_tests {
    use super::Frequency;

    #[test]
    fn parses_known_frequencies() {
        assert_eq!("daily".parse(), Ok(Frequency::Daily));
        assert_eq!("weekly".parse(), Ok(Frequency::Weekly));
        assert_eq!("monthly".parse(), Ok(Frequency::Monthly));
        assert_eq!("yearly".parse(), Ok(Frequency::Yearly));
    }

    #[test]
    fn rejects_unknown_frequency() {
        let result: Result<Frequency, _> = "fortnightly".parse();

        assert!(result.is_err());
    }
}

#[cfg(test)]
mod recurring_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, initialize_db,
        transaction::TransactionKind,
        user::{UserId, create_user},
    };

    use super::{
        Frequency, NewRecurringTransaction, RecurringTransaction, create_recurring_transaction,
        delete_recurring_transaction, get_recurring_transactions, toggle_recurring_transaction,
    };

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

    fn create_test_recurring(
        user_id: UserId,
        description: &str,
        next_date: time::Date,
        connection: &Connection,
    ) -> RecurringTransaction {
        let new_recurring = NewRecurringTransaction::validate(
            user_id,
            description,
            100.0,
            TransactionKind::Expense,
            Frequency::Monthly,
            next_date,
            None,
        )
        .unwrap();

        create_recurring_transaction(new_recurring, connection)
            .expect("Could not create test recurring transaction")
    }

    #[test]
    fn create_recurring_transaction_starts_active() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let recurring =
            create_test_recurring(user_id, "Rent", date!(2024 - 07 - 01), &connection);

        assert!(recurring.id > 0);
        assert!(recurring.is_active);
    }

    #[test]
    fn get_recurring_transactions_orders_by_next_date() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        create_test_recurring(user_id, "Rent", date!(2024 - 07 - 15), &connection);
        create_test_recurring(user_id, "Gym", date!(2024 - 07 - 01), &connection);

        let recurring_transactions = get_recurring_transactions(user_id, &connection).unwrap();

        let descriptions: Vec<_> = recurring_transactions
            .iter()
            .map(|recurring| recurring.description.as_str())
            .collect();
        assert_eq!(descriptions, vec!["Gym", "Rent"]);
    }

    #[test]
    fn toggle_flips_active_flag_both_ways() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let recurring =
            create_test_recurring(user_id, "Rent", date!(2024 - 07 - 01), &connection);

        toggle_recurring_transaction(recurring.id, user_id, &connection).unwrap();
        let recurring_transactions = get_recurring_transactions(user_id, &connection).unwrap();
        assert!(!recurring_transactions[0].is_active);

        toggle_recurring_transaction(recurring.id, user_id, &connection).unwrap();
        let recurring_transactions = get_recurring_transactions(user_id, &connection).unwrap();
        assert!(recurring_transactions[0].is_active);
    }

    #[test]
    fn toggle_missing_recurring_transaction_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = toggle_recurring_transaction(999999, user_id, &connection);

        assert_eq!(result, Err(Error::UpdateMissingRecurringTransaction));
    }

    #[test]
    fn delete_recurring_transaction_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let recurring =
            create_test_recurring(user_id, "Rent", date!(2024 - 07 - 01), &connection);

        let result = delete_recurring_transaction(recurring.id, user_id, &connection);

        assert_eq!(result, Ok(()));
        assert!(
            get_recurring_transactions(user_id, &connection)
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn delete_missing_recurring_transaction_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = delete_recurring_transaction(999999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingRecurringTransaction));
    }
}
