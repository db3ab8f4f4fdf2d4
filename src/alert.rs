//! Alert partials for displaying success and error messages to users.
//!
//! Alerts are rendered as out-of-band swaps into the `#alert-container`
//! element that [crate::html::base] places on every page, so a form can show
//! an alert without replacing the form itself.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use maud::{Markup, html};

/// Alert message types for styling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertType {
    Success,
    Error,
}

/// An alert message with a short title and optional details.
#[derive(Debug, Clone)]
pub struct Alert<'a> {
    alert_type: AlertType,
    message: &'a str,
    details: &'a str,
}

impl<'a> Alert<'a> {
    /// Create a new success alert
    pub fn success(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Success,
            message,
            details,
        }
    }

    /// Create a new error alert
    pub fn error(message: &'a str, details: &'a str) -> Self {
        Self {
            alert_type: AlertType::Error,
            message,
            details,
        }
    }

    pub fn into_markup(self) -> Markup {
        let box_style = match self.alert_type {
            AlertType::Success => {
                "flex items-start gap-3 p-4 mb-4 rounded-lg border shadow-lg \
                text-green-800 border-green-300 bg-green-50 dark:bg-gray-800 \
                dark:text-green-400 dark:border-green-800"
            }
            AlertType::Error => {
                "flex items-start gap-3 p-4 mb-4 rounded-lg border shadow-lg \
                text-red-800 border-red-300 bg-red-50 dark:bg-gray-800 \
                dark:text-red-400 dark:border-red-800"
            }
        };

        html!(
            div
                id="alert-container"
                hx-swap-oob="true"
                class="w-full max-w-md px-4"
                style="position: fixed; bottom: 1rem; left: 50%; transform: translateX(-50%); z-index: 9999;"
            {
                div class=(box_style) role="alert"
                {
                    div class="flex-1"
                    {
                        p class="text-sm font-semibold" { (self.message) }

                        @if !self.details.is_empty()
                        {
                            p class="mt-1 text-sm" { (self.details) }
                        }
                    }

                    button
                        type="button"
                        class="ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 text-lg \
                            leading-none hover:bg-black/10 dark:hover:bg-white/10"
                        aria-label="Close"
                        onclick="this.closest('#alert-container').classList.add('hidden')"
                    {
                        "\u{00d7}"
                    }
                }
            }
        )
    }

    /// Render the alert as an HTML response with the given status code.
    pub fn into_response_with(self, status_code: StatusCode) -> Response {
        (status_code, Html(self.into_markup().into_string())).into_response()
    }
}
