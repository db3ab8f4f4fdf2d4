//! This file defines the dashboard route and its handlers.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{Totals, totals},
    category::{Category, get_categories, resolve_category},
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, base, currency_rounded_with_tooltip, format_currency,
    },
    navigation::NavBar,
    profile::get_profile,
    transaction::{Transaction, TransactionKind, get_transactions},
    user::UserId,
};

/// How many recent transactions the dashboard lists.
const RECENT_TRANSACTION_COUNT: usize = 5;

fn summary_card_view(title: &str, value: &Markup, value_style: &str) -> Markup {
    html! {
        div class="rounded-xl border border-gray-200 dark:border-gray-700 bg-white dark:bg-gray-800 p-4"
        {
            h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
            p class=(format!("mt-1 text-2xl font-bold {value_style}")) { (value) }
        }
    }
}

fn recent_transactions_view(transactions: &[Transaction], categories: &[Category]) -> Markup {
    html! {
        div class="w-full max-w-screen-lg mt-8"
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-bold" { "Recent Transactions" }

                a
                    href=(endpoints::TRANSACTIONS_VIEW)
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400 underline"
                {
                    "View all"
                }
            }

            @if transactions.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. Add your first transaction to get started."
                }
            }
            @else
            {
                div class="overflow-x-auto rounded-xl border border-gray-200 dark:border-gray-700"
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
                                th class=(format!("{TABLE_HEADER_STYLE} text-right")) { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for transaction in transactions.iter().take(RECENT_TRANSACTION_COUNT)
                            {
                                (recent_transaction_row_view(transaction, categories))
                            }
                        }
                    }
                }
            }
        }
    }
}

fn recent_transaction_row_view(transaction: &Transaction, categories: &[Category]) -> Markup {
    let category = resolve_category(transaction.category_id, categories);
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

            td class=(format!("{TABLE_CELL_STYLE} font-semibold {amount_style} text-right"))
            {
                (amount_text)
            }
        }
    }
}

fn dashboard_view(
    greeting: &str,
    summary: &Totals,
    transactions: &[Transaction],
    categories: &[Category],
) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();
    let balance_style = if summary.balance < 0.0 {
        "text-red-600 dark:text-red-400"
    } else {
        "text-gray-900 dark:text-white"
    };

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg mb-6"
            {
                h1 class="text-2xl font-bold" { (greeting) }
            }

            div class="w-full max-w-screen-lg grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4"
            {
                (summary_card_view(
                    "Total Income",
                    &currency_rounded_with_tooltip(summary.income),
                    "text-green-600 dark:text-green-400",
                ))
                (summary_card_view(
                    "Total Expenses",
                    &currency_rounded_with_tooltip(summary.expense),
                    "text-red-600 dark:text-red-400",
                ))
                (summary_card_view(
                    "Balance",
                    &currency_rounded_with_tooltip(summary.balance),
                    balance_style,
                ))
                (summary_card_view(
                    "Savings Rate",
                    &html! { (format!("{:.1}%", summary.savings_rate)) },
                    "text-gray-900 dark:text-white",
                ))
            }

            (recent_transactions_view(transactions, categories))
        }
    };

    base("Dashboard", &[], &content)
}

/// The state needed to render the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with an overview of the user's data.
///
/// Shows income, expense, balance and savings rate cards computed over every
/// transaction, and the five most recent transactions.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;
    let profile = get_profile(user_id, &connection)?;

    let summary = totals(&transactions);
    let greeting = match profile.full_name {
        Some(name) => format!("Welcome back, {name}"),
        None => "Welcome back".to_owned(),
    };

    Ok(dashboard_view(&greeting, &summary, &transactions, &categories).into_response())
}
