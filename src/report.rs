//! Reports page with interactive charts and a CSV export of the user's
//! transactions.
//!
//! The page renders three ECharts visualizations:
//! - **Monthly Overview**: income and expense totals per calendar month
//! - **Spending by Category**: a pie of the top spending categories
//! - **Daily Trend**: income and expenses per day over the last 30 days
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization
//! code.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    aggregation::{
        TOP_CATEGORY_COUNT, TREND_WINDOW, daily_trend, monthly_series, spending_by_category,
        top_spending_categories,
    },
    category::{Category, get_categories, resolve_category},
    endpoints,
    html::{HeadElement, PAGE_CONTAINER_STYLE, base},
    navigation::NavBar,
    transaction::{Transaction, get_transactions_ascending},
    user::UserId,
};

/// A report chart with its HTML container ID and ECharts configuration.
struct ReportChart {
    /// The HTML element ID to use for the chart (kebab-case)
    id: &'static str,
    /// The ECharts configuration as a JSON string
    options: String,
}

/// Renders the HTML containers for the report charts.
fn charts_view(charts: &[ReportChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full max-w-screen-lg mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for the report charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
fn charts_script(charts: &[ReportChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

fn monthly_overview_chart(transactions: &[Transaction]) -> Chart {
    let series = monthly_series(transactions);
    let labels: Vec<String> = series.iter().map(|summary| summary.label.clone()).collect();
    let income: Vec<f64> = series.iter().map(|summary| summary.income).collect();
    let expenses: Vec<f64> = series.iter().map(|summary| summary.expense).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Overview")
                .subtext("Income and expenses per month"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Income").data(income))
        .series(Bar::new().name("Expenses").data(expenses))
}

fn category_breakdown_chart(transactions: &[Transaction], categories: &[Category]) -> Chart {
    let spending = spending_by_category(transactions);
    let top_categories = top_spending_categories(&spending, TOP_CATEGORY_COUNT);

    let entries: Vec<(f64, String)> = top_categories
        .into_iter()
        .map(|(category_id, amount)| {
            let category = resolve_category(Some(category_id), categories);
            (amount, category.name)
        })
        .collect();
    let data: Vec<(f64, &str)> = entries
        .iter()
        .map(|(amount, name)| (*amount, name.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Spending by Category")
                .subtext("Top spending categories"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Spending").radius("55%").data(data))
}

fn daily_trend_chart(transactions: &[Transaction]) -> Chart {
    let series = daily_trend(transactions, TREND_WINDOW);
    let labels: Vec<String> = series.iter().map(|summary| summary.label.clone()).collect();
    let income: Vec<f64> = series.iter().map(|summary| summary.income).collect();
    let expenses: Vec<f64> = series.iter().map(|summary| summary.expense).collect();

    Chart::new()
        .title(
            Title::new()
                .text("Daily Trend")
                .subtext("Last 30 days with activity"),
        )
        .tooltip(currency_tooltip())
        .legend(Legend::new().top("bottom"))
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("10%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Line::new().name("Income").data(income))
        .series(Line::new().name("Expenses").data(expenses))
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

fn build_report_charts(
    transactions: &[Transaction],
    categories: &[Category],
) -> [ReportChart; 3] {
    [
        ReportChart {
            id: "monthly-overview-chart",
            options: monthly_overview_chart(transactions).to_string(),
        },
        ReportChart {
            id: "category-breakdown-chart",
            options: category_breakdown_chart(transactions, categories).to_string(),
        },
        ReportChart {
            id: "daily-trend-chart",
            options: daily_trend_chart(transactions).to_string(),
        },
    ]
}

fn reports_view(transactions: &[Transaction], categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::REPORTS_VIEW).into_html();
    let charts = build_report_charts(transactions, categories);

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-lg flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Reports" }

                a
                    href=(endpoints::EXPORT_CSV)
                    download="transactions.csv"
                    class="px-4 py-2 bg-blue-500 dark:bg-blue-600 hover:bg-blue-600 hover:dark:bg-blue-700 text-white rounded"
                {
                    "Export CSV"
                }
            }

            @if transactions.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "No transactions yet. Charts will appear once you add some."
                }
            }
            @else
            {
                (charts_view(&charts))
            }
        }
    };

    let scripts = [
        HeadElement::ScriptLink(
            "https://cdn.jsdelivr.net/npm/echarts@6.0.0/dist/echarts.min.js".to_owned(),
        ),
        charts_script(&charts),
    ];

    base("Reports", &scripts, &content)
}

/// The state needed to render the reports page.
#[derive(Debug, Clone)]
pub struct ReportsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ReportsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed to export transactions as CSV.
#[derive(Debug, Clone)]
pub struct ExportCsvEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ExportCsvEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the reports page.
pub async fn get_reports_page(
    State(state): State<ReportsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_ascending(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    Ok(reports_view(&transactions, &categories).into_response())
}

/// Serialize the user's transactions as CSV, oldest first.
///
/// Transactions without a category (or whose category no longer exists)
/// get an empty category field.
fn transactions_to_csv(
    transactions: &[Transaction],
    categories: &[Category],
) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(["Date", "Type", "Amount", "Category"])
        .map_err(|error| Error::CsvError(error.to_string()))?;

    for transaction in transactions {
        let category_name = transaction
            .category_id
            .and_then(|category_id| {
                categories
                    .iter()
                    .find(|category| category.id == category_id)
            })
            .map(|category| category.name.clone())
            .unwrap_or_default();

        writer
            .write_record([
                transaction.date.to_string(),
                transaction.kind.to_string(),
                format!("{:.2}", transaction.amount),
                category_name,
            ])
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}

/// Route handler for downloading the user's transactions as a CSV file.
pub async fn export_transactions_csv(
    State(state): State<ExportCsvEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let transactions = get_transactions_ascending(user_id, &connection)?;
    let categories = get_categories(user_id, &connection)?;

    let csv_bytes = transactions_to_csv(&transactions, &categories)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        csv_bytes,
    )
        .into_response())
}

#[cfg(test)]
mod chart_tests {
    use time::macros::date;

    use crate::{
        aggregation::TOP_CATEGORY_COUNT,
        transaction::{Transaction, TransactionKind},
        user::UserId,
    };

    use super::{build_report_charts, category_breakdown_chart, monthly_overview_chart};

    fn transaction(
        kind: TransactionKind,
        amount: f64,
        date: time::Date,
        category_id: Option<i64>,
    ) -> Transaction {
        Transaction {
            id: 0,
            user_id: UserId::new(1),
            kind,
            amount,
            date,
            category_id,
            description: None,
            payment_method: None,
            notes: None,
        }
    }

    #[test]
    fn monthly_overview_chart_contains_month_labels() {
        let transactions = vec![
            transaction(TransactionKind::Income, 100.0, date!(2024 - 01 - 15), None),
            transaction(TransactionKind::Expense, 50.0, date!(2024 - 02 - 10), None),
        ];

        let options = monthly_overview_chart(&transactions).to_string();

        assert!(options.contains("Jan"), "missing Jan label: {options}");
        assert!(options.contains("Feb"), "missing Feb label: {options}");
        assert!(options.contains("Income"));
        assert!(options.contains("Expenses"));
    }

    #[test]
    fn category_breakdown_chart_keeps_top_categories_only() {
        let mut transactions = Vec::new();
        for category_id in 1..=10 {
            transactions.push(transaction(
                TransactionKind::Expense,
                category_id as f64,
                date!(2024 - 01 - 01),
                Some(category_id),
            ));
        }

        let options = category_breakdown_chart(&transactions, &[]).to_string();

        // Every unknown category resolves to the same display label, so the
        // top-N cut is visible in the number of data points.
        let data_points = options.matches("Uncategorized").count();
        assert_eq!(data_points, TOP_CATEGORY_COUNT);
    }

    #[test]
    fn builds_three_charts_with_distinct_ids() {
        let charts = build_report_charts(&[], &[]);

        assert_eq!(charts.len(), 3);
        assert_ne!(charts[0].id, charts[1].id);
        assert_ne!(charts[1].id, charts[2].id);
    }
}

#[cfg(test)]
mod csv_export_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::header};
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        db::initialize,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::{ExportCsvEndpointState, export_transactions_csv};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_user(connection: &Connection) -> UserId {
        create_user(
            "foo@bar.baz",
            crate::PasswordHash::from_raw_password("averystrongandsecurepassword", 4).unwrap(),
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    #[tokio::test]
    async fn export_produces_csv_with_header_and_rows_oldest_first() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        create_transaction(
            NewTransaction::validate(
                user_id,
                TransactionKind::Expense,
                25.5,
                date!(2024 - 03 - 01),
                None,
                None,
                None,
                None,
            )
            .unwrap(),
            &connection,
        )
        .unwrap();
        create_transaction(
            NewTransaction::validate(
                user_id,
                TransactionKind::Income,
                100.0,
                date!(2024 - 01 - 15),
                None,
                None,
                None,
                None,
            )
            .unwrap(),
            &connection,
        )
        .unwrap();
        let state = ExportCsvEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = export_transactions_csv(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/csv; charset=utf-8"
        );
        assert!(
            response
                .headers()
                .get(header::CONTENT_DISPOSITION)
                .unwrap()
                .to_str()
                .unwrap()
                .contains("transactions.csv")
        );

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "Date,Type,Amount,Category");
        assert_eq!(lines[1], "2024-01-15,income,100.00,");
        assert_eq!(lines[2], "2024-03-01,expense,25.50,");
    }

    #[tokio::test]
    async fn export_with_no_transactions_yields_header_only() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let state = ExportCsvEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = export_transactions_csv(State(state), Extension(user_id))
            .await
            .unwrap();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();

        assert_eq!(text.trim(), "Date,Type,Amount,Category");
    }
}

#[cfg(test)]
mod reports_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::{Html, Selector};
    use time::macros::date;

    use crate::{
        db::initialize,
        endpoints,
        transaction::{NewTransaction, TransactionKind, create_transaction},
        user::{UserId, create_user},
    };

    use super::{ReportsPageState, get_reports_page};

    fn get_test_db_connection() -> Connection {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        connection
    }

    fn create_test_user(connection: &Connection) -> UserId {
        create_user(
            "foo@bar.baz",
            crate::PasswordHash::from_raw_password("averystrongandsecurepassword", 4).unwrap(),
            connection,
        )
        .expect("Could not create test user")
        .id
    }

    #[tokio::test]
    async fn reports_page_renders_chart_containers_and_export_link() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        create_transaction(
            NewTransaction::validate(
                user_id,
                TransactionKind::Expense,
                10.0,
                date!(2024 - 01 - 01),
                None,
                None,
                None,
                None,
            )
            .unwrap(),
            &connection,
        )
        .unwrap();
        let state = ReportsPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_reports_page(State(state), Extension(user_id))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let document = Html::parse_document(&text);
        assert!(
            document.errors.is_empty(),
            "Got HTML parsing errors: {:?}",
            document.errors
        );

        for chart_id in [
            "#monthly-overview-chart",
            "#category-breakdown-chart",
            "#daily-trend-chart",
        ] {
            let selector = Selector::parse(chart_id).unwrap();
            assert_eq!(
                document.select(&selector).count(),
                1,
                "want 1 element matching {chart_id}"
            );
        }

        let link_selector = Selector::parse("a[href]").unwrap();
        let hrefs: Vec<_> = document
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert!(hrefs.contains(&endpoints::EXPORT_CSV));
    }
}
