//! Read-side aggregation over transaction lists.
//!
//! Provides the pure functions that reduce a list of transactions into the
//! derived summaries shown on the dashboard, budgets, goals, loans and
//! reports pages: totals by type, per-category spending, per-month and
//! per-day series, and the capped percentage/raw boolean pairs used by
//! progress displays.
//!
//! None of these functions touch the database; callers fetch the full source
//! lists and pass them in. Every percentage guards against a zero
//! denominator and yields 0 rather than NaN or infinity.

use std::collections::HashMap;

use time::{Date, Month};

use crate::{
    budget::Budget,
    database_id::CategoryId,
    transaction::{Transaction, TransactionKind},
};

/// How many categories the spending breakdown keeps after sorting.
///
/// The remainder is dropped outright rather than merged into an "other"
/// bucket, matching the display behavior the breakdown was built for.
pub const TOP_CATEGORY_COUNT: usize = 6;

/// How many data points the daily trend view keeps.
pub const TREND_WINDOW: usize = 30;

/// Income and expense totals with their derived balance and savings rate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Totals {
    /// Sum of all income amounts.
    pub income: f64,
    /// Sum of all expense amounts.
    pub expense: f64,
    /// Income minus expenses. May be negative.
    pub balance: f64,
    /// Balance as a percentage of income, 0 when there is no income.
    pub savings_rate: f64,
}

/// Sum transaction amounts by type and derive the balance and savings rate.
pub fn totals(transactions: &[Transaction]) -> Totals {
    let mut income = 0.0;
    let mut expense = 0.0;

    for transaction in transactions {
        match transaction.kind {
            TransactionKind::Income => income += transaction.amount,
            TransactionKind::Expense => expense += transaction.amount,
        }
    }

    let balance = income - expense;

    Totals {
        income,
        expense,
        balance,
        savings_rate: percentage_of(balance, income),
    }
}

/// Sum expense amounts per category.
///
/// Transactions without a category are excluded; income transactions are
/// ignored.
pub fn spending_by_category(transactions: &[Transaction]) -> HashMap<CategoryId, f64> {
    let mut spending = HashMap::new();

    for transaction in transactions {
        if transaction.kind != TransactionKind::Expense {
            continue;
        }

        if let Some(category_id) = transaction.category_id {
            *spending.entry(category_id).or_insert(0.0) += transaction.amount;
        }
    }

    spending
}

/// Sort per-category spending descending by amount and keep the top `limit`
/// entries.
///
/// Categories beyond `limit` are dropped, not merged into an "other" bucket.
/// Ties are broken by category ID so the result is deterministic.
pub fn top_spending_categories(
    spending: &HashMap<CategoryId, f64>,
    limit: usize,
) -> Vec<(CategoryId, f64)> {
    let mut sorted: Vec<_> = spending.iter().map(|(&id, &sum)| (id, sum)).collect();
    sorted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    sorted.truncate(limit);

    sorted
}

/// Income and expense sums for one month or one day.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodSummary {
    /// The display label for the period: a three letter month name for
    /// monthly series, an ISO calendar date for daily series.
    pub label: String,
    /// Sum of income amounts in the period.
    pub income: f64,
    /// Sum of expense amounts in the period.
    pub expense: f64,
}

/// Group transactions by calendar month label, summing income and expenses
/// separately per month.
///
/// Months appear in order of first appearance in the input, so a list
/// fetched in date order yields a chronological series. The sums themselves
/// do not depend on input order.
pub fn monthly_series(transactions: &[Transaction]) -> Vec<PeriodSummary> {
    group_by_label(transactions, |transaction| {
        month_label(transaction.date).to_owned()
    })
}

/// Group transactions by exact calendar date and keep the last `window`
/// entries of the series.
///
/// The window is a fixed-size suffix of the series, not a time-bounded
/// filter: with fewer than `window` distinct dates, every date is returned.
pub fn daily_trend(transactions: &[Transaction], window: usize) -> Vec<PeriodSummary> {
    let mut series = group_by_label(transactions, |transaction| transaction.date.to_string());

    if series.len() > window {
        series.drain(..series.len() - window);
    }

    series
}

fn group_by_label(
    transactions: &[Transaction],
    label_of: impl Fn(&Transaction) -> String,
) -> Vec<PeriodSummary> {
    let mut series: Vec<PeriodSummary> = Vec::new();

    for transaction in transactions {
        let label = label_of(transaction);

        let summary = match series.iter_mut().find(|summary| summary.label == label) {
            Some(summary) => summary,
            None => {
                series.push(PeriodSummary {
                    label,
                    income: 0.0,
                    expense: 0.0,
                });
                series.last_mut().expect("series cannot be empty after push")
            }
        };

        match transaction.kind {
            TransactionKind::Income => summary.income += transaction.amount,
            TransactionKind::Expense => summary.expense += transaction.amount,
        }
    }

    series
}

/// How much of a budget has been consumed by expenses in its month.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetConsumption {
    /// Sum of matching expense amounts.
    pub spent: f64,
    /// Percentage of the budget consumed, capped at 100 for display.
    pub percentage: f64,
    /// Whether spending exceeds the budget amount.
    ///
    /// Computed from the raw spend, so this can be `true` while
    /// [BudgetConsumption::percentage] reads 100.
    pub over_budget: bool,
}

/// Compute spending against `budget` from the transactions of its month.
///
/// Only expense transactions dated within the budget's month and year count.
/// A budget with a category counts expenses of that category; a budget
/// without one is an overall budget and counts every expense.
pub fn budget_consumption(budget: &Budget, transactions: &[Transaction]) -> BudgetConsumption {
    let spent: f64 = transactions
        .iter()
        .filter(|transaction| {
            transaction.kind == TransactionKind::Expense
                && transaction.date.month() as u8 == budget.month
                && transaction.date.year() == budget.year
                && match budget.category_id {
                    Some(category_id) => transaction.category_id == Some(category_id),
                    None => true,
                }
        })
        .map(|transaction| transaction.amount)
        .sum();

    BudgetConsumption {
        spent,
        percentage: percentage_of(spent, budget.amount).min(100.0),
        over_budget: spent > budget.amount,
    }
}

/// The percentage of a loan that has been paid off.
pub fn loan_paid_percentage(total: f64, remaining: f64) -> f64 {
    percentage_of(total - remaining, total)
}

/// Progress towards a savings goal.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalCompletion {
    /// Percentage of the target reached, capped at 100 for display.
    pub percentage: f64,
    /// Whether the current amount has reached the target.
    ///
    /// Computed from the raw amounts, independent of the capped percentage.
    pub achieved: bool,
}

/// Compute progress of `current` towards `target`.
pub fn goal_completion(current: f64, target: f64) -> GoalCompletion {
    GoalCompletion {
        percentage: percentage_of(current, target).min(100.0),
        achieved: current >= target,
    }
}

/// `part` as a percentage of `whole`, 0 when `whole` is not positive.
fn percentage_of(part: f64, whole: f64) -> f64 {
    if whole > 0.0 { part / whole * 100.0 } else { 0.0 }
}

/// Format a date's month as a three letter abbreviation.
pub fn month_label(date: Date) -> &'static str {
    match date.month() {
        Month::January => "Jan",
        Month::February => "Feb",
        Month::March => "Mar",
        Month::April => "Apr",
        Month::May => "May",
        Month::June => "Jun",
        Month::July => "Jul",
        Month::August => "Aug",
        Month::September => "Sep",
        Month::October => "Oct",
        Month::November => "Nov",
        Month::December => "Dec",
    }
}
