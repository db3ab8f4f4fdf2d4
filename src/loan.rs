//! This file defines the `Loan` type, the types needed to create a loan and
//! the API routes for the loan type.

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
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    aggregation::loan_paid_percentage,
    database_id::LoanId,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    user::UserId,
    validation,
};

/// A debt the user is paying down over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Loan {
    /// The ID of the loan.
    pub id: LoanId,
    /// The owner of the loan.
    pub user_id: UserId,
    /// The name of the loan, e.g., 'Car loan'.
    pub name: String,
    /// The amount originally borrowed.
    pub total_amount: f64,
    /// The amount still owing. Never negative; payments past zero are
    /// clamped.
    pub remaining_amount: f64,
    /// The annual interest rate as a percentage, if known.
    pub interest_rate: Option<f64>,
    /// The regular monthly payment, if any.
    pub monthly_payment: Option<f64>,
    /// The day of the month the payment is due, if any.
    pub due_day: Option<i64>,
    /// The date the loan was taken out.
    pub start_date: Date,
}

/// A loan that passed validation but has not been stored yet.
///
/// New loans start with the full amount remaining.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLoan {
    user_id: UserId,
    name: String,
    total_amount: f64,
    interest_rate: Option<f64>,
    monthly_payment: Option<f64>,
    due_day: Option<i64>,
    start_date: Date,
}

impl NewLoan {
    /// Validate the fields for a new loan.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        name: &str,
        total_amount: f64,
        interest_rate: Option<f64>,
        monthly_payment: Option<f64>,
        due_day: Option<i64>,
        start_date: Date,
    ) -> Result<Self, Error> {
        let name = validation::required_text(name, "Name", 100)?;
        let total_amount = validation::positive_amount(total_amount, "Total amount")?;
        let interest_rate = interest_rate
            .map(|rate| validation::percentage(rate, "Interest rate"))
            .transpose()?;
        let monthly_payment = monthly_payment
            .map(|payment| validation::positive_amount(payment, "Monthly payment"))
            .transpose()?;
        let due_day = due_day
            .map(|day| validation::int_in_range(day, "Due day", 1, 31))
            .transpose()?;

        Ok(Self {
            user_id,
            name,
            total_amount,
            interest_rate,
            monthly_payment,
            due_day,
            start_date,
        })
    }
}

fn loan_card_view(loan: &Loan) -> Markup {
    let paid_percentage = loan_paid_percentage(loan.total_amount, loan.remaining_amount);
    let payment_endpoint = endpoints::format_endpoint(endpoints::PAY_LOAN, loan.id);
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_LOAN, loan.id);
    let is_paid_off = loan.remaining_amount == 0.0;

    html! {
        div class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            div class="flex items-center justify-between mb-2"
            {
                div
                {
                    span class="font-medium" { (loan.name) }

                    @if let Some(rate) = loan.interest_rate
                    {
                        span class="ml-2 text-sm text-gray-500 dark:text-gray-400"
                        {
                            (format!("{rate}% p.a."))
                        }
                    }

                    span class="ml-2 text-sm text-gray-500 dark:text-gray-400"
                    {
                        "since " (loan.start_date)
                    }

                    @if is_paid_off
                    {
                        span class="ml-2 text-sm font-semibold text-green-600 dark:text-green-400"
                        {
                            "Paid off!"
                        }
                    }
                }

                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this loan?"
                {
                    "Delete"
                }
            }

            div class="flex justify-between text-sm mb-1"
            {
                span
                {
                    (format_currency(loan.remaining_amount)) " remaining of " (format_currency(loan.total_amount))
                }

                span { (format!("{:.0}% paid", paid_percentage)) }
            }

            div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700 mb-3"
            {
                div
                    class="h-2 rounded-full bg-blue-500"
                    style=(format!("width: {:.0}%;", paid_percentage))
                {}
            }

            @if let Some(monthly_payment) = loan.monthly_payment
            {
                p class="text-sm text-gray-500 dark:text-gray-400 mb-3"
                {
                    "Monthly payment " (format_currency(monthly_payment))

                    @if let Some(due_day) = loan.due_day
                    {
                        ", due on day " (due_day)
                    }
                }
            }

            form
                hx-post=(payment_endpoint)
                hx-target-error="#alert-container"
                class="flex gap-2"
            {
                input
                    type="number"
                    name="amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);

                button type="submit" class=(BUTTON_SECONDARY_STYLE) style="width: auto;"
                {
                    "Record Payment"
                }
            }
        }
    }
}

fn new_loan_form_view() -> Markup {
    let today = OffsetDateTime::now_utc().date();

    html! {
        form
            hx-post=(endpoints::POST_LOAN)
            hx-target-error="#alert-container"
            class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 grid grid-cols-1 sm:grid-cols-2 gap-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g., Car loan"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="total_amount" class=(FORM_LABEL_STYLE) { "Total Amount" }

                input
                    id="total_amount"
                    type="number"
                    name="total_amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="interest_rate" class=(FORM_LABEL_STYLE) { "Interest Rate % (optional)" }

                input
                    id="interest_rate"
                    type="number"
                    name="interest_rate"
                    step="0.01"
                    min="0"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="monthly_payment" class=(FORM_LABEL_STYLE) { "Monthly Payment (optional)" }

                input
                    id="monthly_payment"
                    type="number"
                    name="monthly_payment"
                    step="0.01"
                    min="0.01"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="due_day" class=(FORM_LABEL_STYLE) { "Due Day of Month (optional)" }

                input
                    id="due_day"
                    type="number"
                    name="due_day"
                    step="1"
                    min="1"
                    max="31"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="start_date" class=(FORM_LABEL_STYLE) { "Start Date" }

                input
                    id="start_date"
                    type="date"
                    name="start_date"
                    value=(today)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="sm:col-span-2"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Loan" }
            }
        }
    }
}

fn loans_view(loans: &[Loan]) -> Markup {
    let nav_bar = NavBar::new(endpoints::LOANS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Loans" }

                (new_loan_form_view())

                @if loans.is_empty()
                {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No loans yet. Add one above to track your debts."
                    }
                }
                @else
                {
                    @for loan in loans
                    {
                        (loan_card_view(loan))
                    }
                }
            }
        }
    };

    base("Loans", &[], &content)
}

/// The state needed for the loans page.
#[derive(Debug, Clone)]
pub struct LoansPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoansPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating, paying down or deleting a loan.
#[derive(Debug, Clone)]
pub struct LoanEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for LoanEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the loans page.
pub async fn get_loans_page(
    State(state): State<LoansPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let loans = get_loans(user_id, &connection)?;

    Ok(loans_view(&loans).into_response())
}

/// The form data for creating a loan.
#[derive(Debug, Deserialize)]
pub struct LoanFormData {
    /// The name of the loan.
    pub name: String,
    /// The amount originally borrowed.
    pub total_amount: f64,
    /// The annual interest rate as a percentage.
    #[serde(default)]
    pub interest_rate: Option<f64>,
    /// The regular monthly payment.
    #[serde(default)]
    pub monthly_payment: Option<f64>,
    /// The day of the month the payment is due.
    #[serde(default)]
    pub due_day: Option<i64>,
    /// The date the loan was taken out.
    pub start_date: Date,
}

/// A route handler for creating a new loan, redirects to the loans view on
/// success.
pub async fn create_loan_endpoint(
    State(state): State<LoanEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<LoanFormData>,
) -> Response {
    let new_loan = match NewLoan::validate(
        user_id,
        &form_data.name,
        form_data.total_amount,
        form_data.interest_rate,
        form_data.monthly_payment,
        form_data.due_day,
        form_data.start_date,
    ) {
        Ok(new_loan) => new_loan,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_loan(new_loan, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::LOANS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a loan: {error}");

            error.into_alert_response()
        }
    }
}

/// The form data for recording a loan payment.
#[derive(Debug, Deserialize)]
pub struct LoanPaymentFormData {
    /// The amount paid off the loan.
    pub amount: f64,
}

/// A route handler for recording a payment against a loan.
///
/// The remaining amount never goes below zero; a payment larger than the
/// balance pays the loan off exactly.
pub async fn pay_loan_endpoint(
    Path(loan_id): Path<LoanId>,
    State(state): State<LoanEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<LoanPaymentFormData>,
) -> Response {
    let amount = match validation::positive_amount(form_data.amount, "Payment") {
        Ok(amount) => amount,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match record_loan_payment(loan_id, user_id, amount, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::LOANS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::UpdateMissingLoan) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while recording a payment on loan {loan_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a loan.
pub async fn delete_loan_endpoint(
    Path(loan_id): Path<LoanId>,
    State(state): State<LoanEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_loan(loan_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::LOANS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingLoan) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting loan {loan_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create a loan in the database with the full amount remaining.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_loan(new_loan: NewLoan, connection: &Connection) -> Result<Loan, Error> {
    connection.execute(
        "INSERT INTO loan (user_id, name, total_amount, remaining_amount, interest_rate, monthly_payment, due_day, start_date)
        VALUES (?1, ?2, ?3, ?3, ?4, ?5, ?6, ?7)",
        (
            new_loan.user_id.as_i64(),
            &new_loan.name,
            new_loan.total_amount,
            new_loan.interest_rate,
            new_loan.monthly_payment,
            new_loan.due_day,
            new_loan.start_date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Loan {
        id,
        user_id: new_loan.user_id,
        name: new_loan.name,
        total_amount: new_loan.total_amount,
        remaining_amount: new_loan.total_amount,
        interest_rate: new_loan.interest_rate,
        monthly_payment: new_loan.monthly_payment,
        due_day: new_loan.due_day,
        start_date: new_loan.start_date,
    })
}

/// Retrieve `user_id`'s loans in creation order.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_loans(user_id: UserId, connection: &Connection) -> Result<Vec<Loan>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, total_amount, remaining_amount, interest_rate, monthly_payment, due_day, start_date
            FROM loan
            WHERE user_id = :user_id
            ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_loan_row)?
        .map(|maybe_loan| maybe_loan.map_err(|error| error.into()))
        .collect()
}

/// Subtract `amount` from the remaining balance of one of `user_id`'s loans,
/// clamping at zero.
///
/// # Errors
/// Returns:
/// - [Error::UpdateMissingLoan] if the loan does not exist or belongs to
///   another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn record_loan_payment(
    loan_id: LoanId,
    user_id: UserId,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE loan SET remaining_amount = MAX(0, remaining_amount - ?1)
        WHERE id = ?2 AND user_id = ?3",
        (amount, loan_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingLoan);
    }

    Ok(())
}

/// Delete one of `user_id`'s loans from the database.
///
/// # Errors
/// Returns:
/// - [Error::DeleteMissingLoan] if the loan does not exist or belongs to
///   another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_loan(
    loan_id: LoanId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM loan WHERE id = ?1 AND user_id = ?2",
        (loan_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingLoan);
    }

    Ok(())
}

pub fn create_loan_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS loan (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            total_amount REAL NOT NULL,
            remaining_amount REAL NOT NULL,
            interest_rate REAL,
            monthly_payment REAL,
            due_day INTEGER,
            start_date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_loan_row(row: &Row) -> Result<Loan, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let total_amount = row.get(3)?;
    let remaining_amount = row.get(4)?;
    let interest_rate = row.get(5)?;
    let monthly_payment = row.get(6)?;
    let due_day = row.get(7)?;
    let start_date = row.get(8)?;

    Ok(Loan {
        id,
        user_id: UserId::new(raw_user_id),
        name,
        total_amount,
        remaining_amount,
        interest_rate,
        monthly_payment,
        due_day,
        start_date,
    })
}

#[cfg(test)]
mod new_loan_tests {
    use time::macros::date;

    use crate::{Error, user::UserId};

    use super::NewLoan;

    #[test]
    fn validate_rejects_empty_name() {
        let result = NewLoan::validate(
            UserId::new(1),
            "",
            1000.0,
            None,
            None,
            None,
            date!(2024 - 01 - 01),
        );

        assert_eq!(result, Err(Error::Validation("Name is required".to_owned())));
    }

    #[test]
    fn validate_accepts_zero_interest_rate() {
        let new_loan = NewLoan::validate(
            UserId::new(1),
            "Car loan",
            1000.0,
            Some(0.0),
            None,
            None,
            date!(2024 - 01 - 01),
        );

        assert!(new_loan.is_ok());
    }

    #[test]
    fn validate_rejects_interest_rate_outside_percentage_range() {
        for rate in [-1.0, 100.5] {
            let result = NewLoan::validate(
                UserId::new(1),
                "Car loan",
                1000.0,
                Some(rate),
                None,
                None,
                date!(2024 - 01 - 01),
            );

            assert_eq!(
                result,
                Err(Error::Validation(
                    "Interest rate must be between 0 and 100".to_owned()
                ))
            );
        }
    }

    #[test]
    fn validate_rejects_due_day_outside_month() {
        for day in [0, 32] {
            let result = NewLoan::validate(
                UserId::new(1),
                "Car loan",
                1000.0,
                None,
                None,
                Some(day),
                date!(2024 - 01 - 01),
            );

            assert_eq!(
                result,
                Err(Error::Validation(
                    "Due day must be between 1 and 31".to_owned()
                ))
            );
        }
    }
}
