//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert,
    internal_server_error::{InternalServerErrorPageTemplate, render_internal_server_error},
    not_found::get_404_not_found_response,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A candidate record failed a validation rule.
    ///
    /// The message describes the first failing constraint and is shown to
    /// the user verbatim. No write is attempted when this error occurs.
    #[error("{0}")]
    Validation(String),

    /// The user provided an invalid email/password combination.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Either the user ID or expiry cookie is missing from the cookie jar in
    /// the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// There was an error parsing the date in the cookie or creating the new
    /// expiry date time.
    ///
    /// Callers should pass in the original error as a string and the date
    /// string that caused the error.
    #[error("could not format expiry cookie date-time string \"{1}\": {0}")]
    InvalidDateFormat(String, String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    /// When communicating with the application client this error should be
    /// replaced with a general error type indicating an internal server
    /// error.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The email used to register already belongs to another user.
    #[error("the email address is already registered")]
    DuplicateEmail,

    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the
    /// parameters (e.g., ID) are correct and that the resource has been
    /// created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// Tried to delete a category that is shared by all users.
    ///
    /// Default categories are read-only; only user-created categories can be
    /// deleted.
    #[error("default categories cannot be deleted")]
    DefaultCategoryReadOnly,

    /// Tried to delete a transaction that does not exist
    #[error("tried to delete a transaction that is not in the database")]
    DeleteMissingTransaction,

    /// Tried to delete a category that does not exist
    #[error("tried to delete a category that is not in the database")]
    DeleteMissingCategory,

    /// Tried to delete a budget that does not exist
    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    /// Tried to delete a goal that does not exist
    #[error("tried to delete a goal that is not in the database")]
    DeleteMissingGoal,

    /// Tried to delete a loan that does not exist
    #[error("tried to delete a loan that is not in the database")]
    DeleteMissingLoan,

    /// Tried to delete a recurring transaction that does not exist
    #[error("tried to delete a recurring transaction that is not in the database")]
    DeleteMissingRecurringTransaction,

    /// Tried to update a goal that does not exist
    #[error("tried to update a goal that is not in the database")]
    UpdateMissingGoal,

    /// Tried to update a loan that does not exist
    #[error("tried to update a loan that is not in the database")]
    UpdateMissingLoan,

    /// Tried to update a recurring transaction that does not exist
    #[error("tried to update a recurring transaction that is not in the database")]
    UpdateMissingRecurringTransaction,

    /// An error occurred while writing the CSV export.
    #[error("could not write the CSV export: {0}")]
    CsvError(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // Any errors that are not handled above are not intended to be
            // shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                render_internal_server_error(InternalServerErrorPageTemplate::default())
            }
        }
    }
}

impl Error {
    /// Render the error as an out-of-band alert fragment for HTMX requests.
    pub fn into_alert_response(self) -> Response {
        match self {
            Error::Validation(message) => {
                Alert::error("Invalid input", &message).into_response_with(StatusCode::BAD_REQUEST)
            }
            Error::DefaultCategoryReadOnly => Alert::error(
                "Cannot delete category",
                "This is a default category shared by all users and cannot be deleted.",
            )
            .into_response_with(StatusCode::BAD_REQUEST),
            Error::DeleteMissingTransaction => Alert::error(
                "Could not delete transaction",
                "The transaction could not be found. \
                Try refreshing the page to see if the transaction has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::DeleteMissingCategory => Alert::error(
                "Could not delete category",
                "The category could not be found. \
                Try refreshing the page to see if the category has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::DeleteMissingBudget => Alert::error(
                "Could not delete budget",
                "The budget could not be found. \
                Try refreshing the page to see if the budget has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::DeleteMissingGoal => Alert::error(
                "Could not delete goal",
                "The goal could not be found. \
                Try refreshing the page to see if the goal has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::DeleteMissingLoan => Alert::error(
                "Could not delete loan",
                "The loan could not be found. \
                Try refreshing the page to see if the loan has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::DeleteMissingRecurringTransaction => Alert::error(
                "Could not delete recurring transaction",
                "The recurring transaction could not be found. \
                Try refreshing the page to see if it has already been deleted.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            Error::UpdateMissingGoal => {
                Alert::error("Could not update goal", "The goal could not be found.")
                    .into_response_with(StatusCode::NOT_FOUND)
            }
            Error::UpdateMissingLoan => {
                Alert::error("Could not update loan", "The loan could not be found.")
                    .into_response_with(StatusCode::NOT_FOUND)
            }
            Error::UpdateMissingRecurringTransaction => Alert::error(
                "Could not update recurring transaction",
                "The recurring transaction could not be found.",
            )
            .into_response_with(StatusCode::NOT_FOUND),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);

                Alert::error(
                    "Something went wrong",
                    "An unexpected error occurred, check the server logs for more details.",
                )
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}
