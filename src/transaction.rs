//! This file defines the `Transaction` type, the types needed to create a
//! transaction and the API routes for the transaction type.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Path, Query, State},
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
    database_id::{CategoryId, TransactionId},
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, CATEGORY_BADGE_STYLE,
        FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE,
        FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    user::UserId,
    validation,
};

/// Whether a transaction adds to or subtracts from the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, e.g., wages.
    Income,
    /// Money going out, e.g., rent.
    Expense,
}

impl TransactionKind {
    /// The string stored in the database for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Income => "income",
            TransactionKind::Expense => "expense",
        }
    }
}

impl FromStr for TransactionKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(TransactionKind::Income),
            "expense" => Ok(TransactionKind::Expense),
            _ => Err(Error::Validation(format!(
                "'{s}' is not a valid transaction type"
            ))),
        }
    }
}

impl Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An amount of money that a user spent or received on a given date.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user that recorded the transaction.
    pub user_id: UserId,
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The amount of money spent or received. Always positive; the kind
    /// carries the sign.
    pub amount: f64,
    /// When the transaction occurred.
    pub date: Date,
    /// The category the transaction belongs to, if any.
    pub category_id: Option<CategoryId>,
    /// A short description of the transaction.
    pub description: Option<String>,
    /// How the transaction was paid, e.g., 'Credit Card'.
    pub payment_method: Option<String>,
    /// Free-form notes.
    pub notes: Option<String>,
}

/// A transaction that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    user_id: UserId,
    kind: TransactionKind,
    amount: f64,
    date: Date,
    category_id: Option<CategoryId>,
    description: Option<String>,
    payment_method: Option<String>,
    notes: Option<String>,
}

impl NewTransaction {
    /// Validate the fields for a new transaction.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        user_id: UserId,
        kind: TransactionKind,
        amount: f64,
        date: Date,
        category_id: Option<CategoryId>,
        description: Option<&str>,
        payment_method: Option<&str>,
        notes: Option<&str>,
    ) -> Result<Self, Error> {
        let amount = validation::positive_amount(amount, "Amount")?;
        let description = validation::optional_text(description, "Description", 500)?;
        let payment_method = validation::optional_text(payment_method, "Payment method", 50)?;
        let notes = validation::optional_text(notes, "Notes", 1000)?;

        Ok(Self {
            user_id,
            kind,
            amount,
            date,
            category_id,
            description,
            payment_method,
            notes,
        })
    }
}

fn transaction_row_view(transaction: &Transaction, categories: &[Category]) -> Markup {
    let category = resolve_category(transaction.category_id, categories);
    let delete_endpoint =
        endpoints::format_endpoint(endpoints::DELETE_TRANSACTION, transaction.id);
    let (amount_text, amount_style) = match transaction.kind {
        TransactionKind::Income => (
            format!("+{}", format_currency(transaction.amount)),
            "text-green-600 dark:text-green-400",
        ),
        TransactionKind::Expense => (
            format!("-{}", format_currency(transaction.amount)),
            "text-red-600 dark:text-red-400",
        ),
    };

    html! {
        tr class=(TABLE_ROW_STYLE)
        {
            td class=(TABLE_CELL_STYLE) { (transaction.date) }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.description.as_deref().unwrap_or("—"))
            }

            td class=(TABLE_CELL_STYLE)
            {
                span
                    class=(CATEGORY_BADGE_STYLE)
                    style=(format!("background-color: {}", category.color))
                {
                    (category.name)
                }
            }

            td class=(TABLE_CELL_STYLE)
            {
                (transaction.payment_method.as_deref().unwrap_or("—"))
            }

            td class=(format!("{TABLE_CELL_STYLE} font-semibold {amount_style} text-right"))
            {
                (amount_text)
            }

            td class=(TABLE_CELL_STYLE)
            {
                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target="closest tr"
                    hx-swap="delete"
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this transaction?"
                {
                    "Delete"
                }
            }
        }
    }
}

/// Restrict `transactions` to those matching the search text and kind filter.
///
/// The search text matches case-insensitively against the description and
/// the resolved category name, mirroring what the table displays. `None` for
/// either filter means "keep everything".
fn filter_transactions<'a>(
    transactions: &'a [Transaction],
    categories: &[Category],
    search: Option<&str>,
    kind: Option<TransactionKind>,
) -> Vec<&'a Transaction> {
    let search = search.map(str::to_lowercase);

    transactions
        .iter()
        .filter(|transaction| kind.is_none_or(|kind| transaction.kind == kind))
        .filter(|transaction| {
            let Some(search) = &search else {
                return true;
            };

            let matches_description = transaction
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(search));
            let matches_category = resolve_category(transaction.category_id, categories)
                .name
                .to_lowercase()
                .contains(search);

            matches_description || matches_category
        })
        .collect()
}

fn filter_form_view(search: Option<&str>, kind_filter: Option<TransactionKind>) -> Markup {
    html! {
        form
            method="get"
            action=(endpoints::TRANSACTIONS_VIEW)
            class="w-full max-w-screen-lg flex flex-col sm:flex-row gap-2 mb-4"
        {
            input
                type="search"
                name="search"
                value=[search]
                placeholder="Search description or category"
                class=(FORM_TEXT_INPUT_STYLE);

            select name="kind" class=(format!("{FORM_TEXT_INPUT_STYLE} sm:w-40"))
            {
                option value="" { "All types" }
                option value="income" selected[kind_filter == Some(TransactionKind::Income)]
                {
                    "Income"
                }
                option value="expense" selected[kind_filter == Some(TransactionKind::Expense)]
                {
                    "Expense"
                }
            }

            button type="submit" class=(BUTTON_SECONDARY_STYLE) style="width: auto;"
            {
                "Filter"
            }
        }
    }
}

fn transactions_view(
    transactions: &[&Transaction],
    categories: &[Category],
    search: Option<&str>,
    kind_filter: Option<TransactionKind>,
    has_any_transactions: bool,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::TRANSACTIONS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Transactions" }

                a href=(endpoints::NEW_TRANSACTION_VIEW) class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
                {
                    "Add Transaction"
                }
            }

            (filter_form_view(search, kind_filter))

            @if !has_any_transactions
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. Add your first transaction to get started."
                }
            }
            @else if transactions.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions match the current filters."
                }
            }
            @else
            {
                div class="w-full max-w-screen-lg overflow-x-auto rounded-xl border border-gray-200 dark:border-gray-700"
                {
                    table class="w-full text-left"
                    {
                        thead
                        {
                            tr
                            {
                                th class=(TABLE_HEADER_STYLE) { "Date" }
                                th class=(TABLE_HEADER_STYLE) { "Description" }
                                th class=(TABLE_HEADER_STYLE) { "Category" }
                                th class=(TABLE_HEADER_STYLE) { "Payment" }
                                th class=(format!("{TABLE_HEADER_STYLE} text-right")) { "Amount" }
                                th class=(TABLE_HEADER_STYLE) { "" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions
                            {
                                (transaction_row_view(transaction, categories))
                            }
                        }
                    }
                }
            }
        }
    };

    base("Transactions", &[], &content)
}

fn new_transaction_form_view(categories: &[Category], today: Date) -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_TRANSACTION)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label class=(FORM_LABEL_STYLE) { "Type" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for (value, label) in [("expense", "Expense"), ("income", "Income")]
                    {
                        div class="flex items-center gap-2"
                        {
                            input
                                id=(format!("kind-{value}"))
                                type="radio"
                                name="kind"
                                value=(value)
                                checked[value == "expense"]
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(format!("kind-{value}")) class=(FORM_RADIO_LABEL_STYLE) { (label) }
                        }
                    }
                }
            }

            div
            {
                label for="amount" class=(FORM_LABEL_STYLE) { "Amount" }

                div class="input-wrapper w-full"
                {
                    input
                        id="amount"
                        type="number"
                        name="amount"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        required
                        autofocus
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            div
            {
                label for="date" class=(FORM_LABEL_STYLE) { "Date" }

                input
                    id="date"
                    type="date"
                    name="date"
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

            div
            {
                label for="description" class=(FORM_LABEL_STYLE) { "Description" }

                input
                    id="description"
                    type="text"
                    name="description"
                    placeholder="e.g., Weekly grocery shop"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="payment_method" class=(FORM_LABEL_STYLE) { "Payment Method" }

                input
                    id="payment_method"
                    type="text"
                    name="payment_method"
                    placeholder="e.g., Credit Card"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="notes" class=(FORM_LABEL_STYLE) { "Notes" }

                textarea
                    id="notes"
                    name="notes"
                    rows="3"
                    class=(FORM_TEXT_INPUT_STYLE)
                {}
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Transaction" }
        }
    }
}

fn new_transaction_view(categories: &[Category], today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_TRANSACTION_VIEW).into_html();
    let form = new_transaction_form_view(categories, today);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Transaction", &[dollar_input_styles()], &content)
}

/// The state needed for the transactions listing page.
#[derive(Debug, Clone)]
pub struct TransactionsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed to get or create a transaction.
#[derive(Debug, Clone)]
pub struct CreateTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for deleting a transaction.
#[derive(Debug, Clone)]
pub struct DeleteTransactionEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteTransactionEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The query parameters for filtering the transactions listing page.
#[derive(Debug, Default, Deserialize)]
pub struct TransactionsQuery {
    /// Text to match against descriptions and category names.
    #[serde(default)]
    pub search: Option<String>,
    /// Restrict the list to "income" or "expense" transactions.
    ///
    /// An empty or unrecognised value shows both kinds.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Route handler for the transactions listing page.
///
/// Transactions are listed most recent first with their category badge
/// resolved against the user's category list. The optional `search` and
/// `kind` query parameters narrow the list without affecting the stored
/// data.
pub async fn get_transactions_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
    Query(query): Query<TransactionsQuery>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    let search = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty());
    let kind_filter = query.kind.as_deref().and_then(|kind| kind.parse().ok());
    let filtered = filter_transactions(&transactions, &categories, search, kind_filter);

    Ok(transactions_view(
        &filtered,
        &categories,
        search,
        kind_filter,
        !transactions.is_empty(),
    )
    .into_response())
}

/// Route handler for the new transaction page.
pub async fn get_new_transaction_page(
    State(state): State<TransactionsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)?;
    let today = OffsetDateTime::now_utc().date();

    Ok(new_transaction_view(&categories, today).into_response())
}

/// The form data for creating a transaction.
#[derive(Debug, Deserialize)]
pub struct TransactionFormData {
    /// Whether the transaction is income or an expense.
    pub kind: TransactionKind,
    /// The value of the transaction in dollars.
    pub amount: f64,
    /// The date when the transaction occurred.
    pub date: Date,
    /// The category to file the transaction under.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Text detailing the transaction.
    #[serde(default)]
    pub description: Option<String>,
    /// How the transaction was paid.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// A route handler for creating a new transaction, redirects to the
/// transactions view on success.
pub async fn create_transaction_endpoint(
    State(state): State<CreateTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<TransactionFormData>,
) -> Response {
    let new_transaction = match NewTransaction::validate(
        user_id,
        form_data.kind,
        form_data.amount,
        form_data.date,
        form_data.category_id,
        form_data.description.as_deref(),
        form_data.payment_method.as_deref(),
        form_data.notes.as_deref(),
    ) {
        Ok(new_transaction) => new_transaction,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_transaction(new_transaction, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::TRANSACTIONS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a transaction: {error}");

            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a transaction.
pub async fn delete_transaction_endpoint(
    Path(transaction_id): Path<TransactionId>,
    State(state): State<DeleteTransactionEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_transaction(transaction_id, user_id, &connection) {
        Ok(_) => StatusCode::OK.into_response(),
        Err(error @ Error::DeleteMissingTransaction) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting transaction {transaction_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create a transaction in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_transaction(
    new_transaction: NewTransaction,
    connection: &Connection,
) -> Result<Transaction, Error> {
    connection.execute(
        "INSERT INTO \"transaction\" (user_id, kind, amount, date, category_id, description, payment_method, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        (
            new_transaction.user_id.as_i64(),
            new_transaction.kind.as_str(),
            new_transaction.amount,
            new_transaction.date,
            new_transaction.category_id,
            &new_transaction.description,
            &new_transaction.payment_method,
            &new_transaction.notes,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Transaction {
        id,
        user_id: new_transaction.user_id,
        kind: new_transaction.kind,
        amount: new_transaction.amount,
        date: new_transaction.date,
        category_id: new_transaction.category_id,
        description: new_transaction.description,
        payment_method: new_transaction.payment_method,
        notes: new_transaction.notes,
    })
}

/// Retrieve `user_id`'s transactions ordered by date, most recent first.
///
/// Transactions sharing a date are ordered by insertion, most recent first.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_transactions(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, amount, date, category_id, description, payment_method, notes
            FROM \"transaction\"
            WHERE user_id = :user_id
            ORDER BY date DESC, id DESC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Retrieve `user_id`'s transactions in ascending date order.
///
/// The report and dashboard aggregations want chronological series, so this
/// avoids re-sorting the descending list that the transactions page uses.
pub fn get_transactions_ascending(
    user_id: UserId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, kind, amount, date, category_id, description, payment_method, notes
            FROM \"transaction\"
            WHERE user_id = :user_id
            ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Delete one of `user_id`'s transactions from the database.
///
/// # Errors
/// Returns:
/// - [Error::DeleteMissingTransaction] if the transaction does not exist or
///   belongs to another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_transaction(
    transaction_id: TransactionId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (transaction_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingTransaction);
    }

    Ok(())
}

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            kind TEXT NOT NULL,
            amount REAL NOT NULL,
            date TEXT NOT NULL,
            category_id INTEGER,
            description TEXT,
            payment_method TEXT,
            notes TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_transaction_user_id ON \"transaction\"(user_id);
        CREATE INDEX IF NOT EXISTS idx_transaction_date ON \"transaction\"(date);",
    )?;

    Ok(())
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let raw_kind: String = row.get(2)?;
    let amount = row.get(3)?;
    let date = row.get(4)?;
    let category_id = row.get(5)?;
    let description = row.get(6)?;
    let payment_method = row.get(7)?;
    let notes = row.get(8)?;

    let kind = raw_kind.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("invalid transaction kind {raw_kind:?}").into(),
        )
    })?;

    Ok(Transaction {
        id,
        user_id: UserId::new(raw_user_id),
        kind,
        amount,
        date,
        category_id,
        description,
        payment_method,
        notes,
    })
}


#[cfg(test)]
mod new_transaction_tests {
    use time::macros::date;

    use crate::{Error, user::UserId};

    use super::{NewTransaction, TransactionKind};

    #[test]
    fn validate_rejects_zero_amount() {
        let result = NewTransaction::validate(
            UserId::new(1),
            TransactionKind::Expense,
            0.0,
            date!(2024 - 01 - 01),
            None,
            None,
            None,
            None,
        );

        assert_eq!(
            result,
            Err(Error::Validation("Amount must be positive".to_owned()))
        );
    }

    #[test]
    fn validate_maps_blank_optional_fields_to_none() {
        let new_transaction = NewTransaction::validate(
            UserId::new(1),
            TransactionKind::Expense,
            12.5,
            date!(2024 - 01 - 01),
            None,
            Some("  "),
            Some(""),
            None,
        )
        .unwrap();

        assert_eq!(new_transaction.description, None);
        assert_eq!(new_transaction.payment_method, None);
        assert_eq!(new_transaction.notes, None);
    }

    #[test]
    fn validate_rejects_overlong_description() {
        let result = NewTransaction::validate(
            UserId::new(1),
            TransactionKind::Expense,
            12.5,
            date!(2024 - 01 - 01),
            None,
            Some(&"a".repeat(501)),
            None,
            None,
        );

        assert_eq!(
            result,
            Err(Error::Validation(
                "Description must be less than 500 characters".to_owned()
            ))
        );
    }
}


#[cfg(test)]
mod transactions_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Query, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        initialize_db,
        user::{UserId, create_user},
    };

    use super::{
        NewTransaction, TransactionKind, TransactionsPageState, TransactionsQuery,
        create_transaction, get_transactions_page,
    };

    fn get_test_state() -> (TransactionsPageState, UserId) {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).expect("Could not initialize database");
        let user_id = create_user(
            "foo@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .expect("Could not create test user")
        .id;

        for (kind, description) in [
            (TransactionKind::Income, "Salary"),
            (TransactionKind::Expense, "Weekly groceries"),
            (TransactionKind::Expense, "Petrol"),
        ] {
            create_transaction(
                NewTransaction::validate(
                    user_id,
                    kind,
                    10.0,
                    date!(2024 - 01 - 01),
                    None,
                    Some(description),
                    None,
                    None,
                )
                .unwrap(),
                &connection,
            )
            .unwrap();
        }

        (
            TransactionsPageState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id,
        )
    }

    async fn render_page(
        state: TransactionsPageState,
        user_id: UserId,
        query: TransactionsQuery,
    ) -> Html {
        let response = get_transactions_page(State(state), Extension(user_id), Query(query))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        Html::parse_document(&String::from_utf8_lossy(&body))
    }

    fn count_table_rows(document: &Html) -> usize {
        let selector = Selector::parse("tbody tr").unwrap();
        document.select(&selector).count()
    }

    #[tokio::test]
    async fn page_without_filters_lists_all_transactions() {
        let (state, user_id) = get_test_state();

        let document = render_page(state, user_id, TransactionsQuery::default()).await;

        assert_eq!(count_table_rows(&document), 3);
    }

    #[tokio::test]
    async fn search_narrows_the_table_to_matching_descriptions() {
        let (state, user_id) = get_test_state();
        let query = TransactionsQuery {
            search: Some("groceries".to_owned()),
            kind: None,
        };

        let document = render_page(state, user_id, query).await;

        assert_eq!(count_table_rows(&document), 1);
    }

    #[tokio::test]
    async fn kind_filter_narrows_the_table_to_one_kind() {
        let (state, user_id) = get_test_state();
        let query = TransactionsQuery {
            search: None,
            kind: Some("income".to_owned()),
        };

        let document = render_page(state, user_id, query).await;

        assert_eq!(count_table_rows(&document), 1);
    }

    #[tokio::test]
    async fn unmatched_search_shows_no_match_message() {
        let (state, user_id) = get_test_state();
        let query = TransactionsQuery {
            search: Some("does not exist".to_owned()),
            kind: None,
        };

        let document = render_page(state, user_id, query).await;

        assert_eq!(count_table_rows(&document), 0);
        let text = document.root_element().text().collect::<String>();
        assert!(text.contains("No transactions match the current filters."));
    }
}


#[cfg(test)]
mod create_transaction_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, response::IntoResponse};
    use axum_extra::extract::Form;
    use axum_htmx::HX_REDIRECT;
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{endpoints, initialize_db, user::create_user};

    use super::{
        CreateTransactionEndpointState, TransactionFormData, TransactionKind,
        create_transaction_endpoint, get_transactions,
    };

    #[tokio::test]
    async fn creates_transaction_and_redirects() {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user_id = create_user(
            "foo@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let state = CreateTransactionEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let form = TransactionFormData {
            kind: TransactionKind::Expense,
            amount: 12.3,
            date: date!(2024 - 01 - 01),
            category_id: None,
            description: Some("test transaction".to_owned()),
            payment_method: None,
            notes: None,
        };

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await
        .into_response();

        let location = response
            .headers()
            .get(HX_REDIRECT)
            .expect("expected response to have the header hx-redirect");
        assert_eq!(location, endpoints::TRANSACTIONS_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let transactions = get_transactions(user_id, &connection).unwrap();
        assert_eq!(transactions.len(), 1);
        assert_eq!(transactions[0].amount, 12.3);
    }

    #[tokio::test]
    async fn invalid_amount_returns_alert_without_writing() {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user_id = create_user(
            "foo@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let state = CreateTransactionEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let form = TransactionFormData {
            kind: TransactionKind::Expense,
            amount: -1.0,
            date: date!(2024 - 01 - 01),
            category_id: None,
            description: None,
            payment_method: None,
            notes: None,
        };

        let response = create_transaction_endpoint(
            State(state.clone()),
            Extension(user_id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);

        let connection = state.db_connection.lock().unwrap();
        assert!(get_transactions(user_id, &connection).unwrap().is_empty());
    }
}
