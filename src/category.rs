//! This file defines the `Category` type, the types needed to create a
//! category and the API routes for the category type.
//!
//! Categories come in two flavours: a shared set of read-only defaults that
//! every user sees (rows with a NULL `user_id`), and categories that a user
//! creates for themselves. Only the latter can be deleted.

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

use crate::{
    AppState, Error,
    alert::Alert,
    database_id::CategoryId,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE,
        FORM_RADIO_GROUP_STYLE, FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, dollar_input_styles, format_currency,
    },
    navigation::NavBar,
    transaction::TransactionKind,
    user::UserId,
    validation,
};

/// A category for grouping expenses and income, e.g., 'Groceries', 'Wages'.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The ID of the category.
    pub id: CategoryId,
    /// The owner of the category, or `None` for shared default categories.
    pub user_id: Option<UserId>,
    /// The display name of the category.
    pub name: String,
    /// Whether the category groups income or expense transactions.
    pub kind: TransactionKind,
    /// The display colour as a '#RRGGBB' string.
    pub color: String,
    /// An optional spending limit shown on the categories page.
    pub budget_limit: Option<f64>,
    /// Whether this is a read-only category shared by all users.
    pub is_default: bool,
}

/// A category that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    user_id: UserId,
    name: String,
    kind: TransactionKind,
    color: String,
    budget_limit: Option<f64>,
}

impl NewCategory {
    /// Validate the fields for a new category.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        name: &str,
        kind: TransactionKind,
        color: &str,
        budget_limit: Option<f64>,
    ) -> Result<Self, Error> {
        let name = validation::required_text(name, "Name", 50)?;
        let color = validation::hex_color(color)?;
        let budget_limit = budget_limit
            .map(|limit| validation::positive_amount(limit, "Budget limit"))
            .transpose()?;

        Ok(Self {
            user_id,
            name,
            kind,
            color,
            budget_limit,
        })
    }
}

/// The name and colour shown for a transaction's category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryDisplay {
    /// The display name of the category, or the "Uncategorized" placeholder.
    pub name: String,
    /// The badge colour as a '#RRGGBB' string.
    pub color: String,
}

/// The placeholder shown for transactions without a category.
const UNCATEGORIZED_NAME: &str = "Uncategorized";
const UNCATEGORIZED_COLOR: &str = "#64748b";

/// Resolve a transaction's category reference against the fetched category
/// list.
///
/// Both a NULL reference and a reference to a category that no longer exists
/// resolve to the "Uncategorized" placeholder, so a category deletion never
/// breaks the transactions that pointed at it.
pub fn resolve_category(
    category_id: Option<CategoryId>,
    categories: &[Category],
) -> CategoryDisplay {
    category_id
        .and_then(|id| categories.iter().find(|category| category.id == id))
        .map(|category| CategoryDisplay {
            name: category.name.clone(),
            color: category.color.clone(),
        })
        .unwrap_or(CategoryDisplay {
            name: UNCATEGORIZED_NAME.to_owned(),
            color: UNCATEGORIZED_COLOR.to_owned(),
        })
}

/// The colour swatches offered on the new category and goal forms.
pub(crate) const COLOR_OPTIONS: [&str; 14] = [
    "#10b981", "#06b6d4", "#8b5cf6", "#6366f1", "#f97316", "#3b82f6", "#ec4899", "#a855f7",
    "#eab308", "#ef4444", "#14b8a6", "#0ea5e9", "#22c55e", "#64748b",
];

fn category_card_view(category: &Category) -> Markup {
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_CATEGORY, category.id);

    html! {
        div class="flex items-center justify-between p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            div class="flex items-center gap-3"
            {
                div class="w-10 h-10 rounded-lg" style=(format!("background-color: {}", category.color)) {}

                div
                {
                    span class="font-medium" { (category.name) }

                    @if let Some(budget_limit) = category.budget_limit
                    {
                        p class="text-sm text-gray-500 dark:text-gray-400"
                        {
                            "Budget " (format_currency(budget_limit))
                        }
                    }
                }
            }

            @if category.is_default
            {
                span class="text-xs uppercase text-gray-400 dark:text-gray-500" { "Default" }
            }
            @else
            {
                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this category? Transactions keep their records but show as Uncategorized."
                {
                    "Delete"
                }
            }
        }
    }
}

fn category_group_view(title: &str, categories: &[&Category]) -> Markup {
    html! {
        section class="w-full max-w-screen-md"
        {
            h2 class="text-lg font-semibold mb-2" { (title) }

            @if categories.is_empty()
            {
                p class="text-gray-500 dark:text-gray-400 mb-4" { "No categories yet." }
            }
            @else
            {
                div class="grid grid-cols-1 sm:grid-cols-2 gap-3 mb-4"
                {
                    @for category in categories
                    {
                        (category_card_view(category))
                    }
                }
            }
        }
    }
}

fn categories_view(categories: &[Category]) -> Markup {
    let nav_bar = NavBar::new(endpoints::CATEGORIES_VIEW).into_html();

    let income_categories: Vec<&Category> = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Income)
        .collect();
    let expense_categories: Vec<&Category> = categories
        .iter()
        .filter(|category| category.kind == TransactionKind::Expense)
        .collect();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex items-center justify-between mb-4"
            {
                h1 class="text-2xl font-bold" { "Categories" }

                a href=(endpoints::NEW_CATEGORY_VIEW) class=(BUTTON_PRIMARY_STYLE) style="width: auto;"
                {
                    "Add Category"
                }
            }

            (category_group_view("Income Categories", &income_categories))
            (category_group_view("Expense Categories", &expense_categories))
        }
    };

    base("Categories", &[], &content)
}

fn new_category_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_CATEGORY)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="Category name"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

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
                label class=(FORM_LABEL_STYLE) { "Color" }

                div class="flex flex-wrap gap-2"
                {
                    @for (index, color) in COLOR_OPTIONS.iter().enumerate()
                    {
                        input
                            id=(format!("color-{index}"))
                            type="radio"
                            name="color"
                            value=(color)
                            checked[index == 0]
                            class="w-8 h-8 rounded-lg appearance-none cursor-pointer checked:ring-2 checked:ring-blue-600"
                            style=(format!("background-color: {color}"));
                    }
                }
            }

            div
            {
                label for="budget_limit" class=(FORM_LABEL_STYLE) { "Budget Limit (optional)" }

                div class="input-wrapper w-full"
                {
                    input
                        id="budget_limit"
                        type="number"
                        name="budget_limit"
                        step="0.01"
                        min="0.01"
                        placeholder="0.00"
                        class=(FORM_TEXT_INPUT_STYLE);
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Category" }
        }
    }
}

fn new_category_view() -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_CATEGORY_VIEW).into_html();
    let form = new_category_form_view();

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Create Category", &[dollar_input_styles()], &content)
}

/// The state needed for the categories listing page.
#[derive(Debug, Clone)]
pub struct CategoriesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoriesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating a category.
#[derive(Debug, Clone)]
pub struct CreateCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteCategoryEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteCategoryEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the categories listing page.
pub async fn get_categories_page(
    State(state): State<CategoriesPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let categories = get_categories(user_id, &connection)?;

    Ok(categories_view(&categories).into_response())
}

/// Route handler for the new category page.
pub async fn get_new_category_page() -> Response {
    new_category_view().into_response()
}

#[derive(Debug, Deserialize)]
pub struct CategoryFormData {
    pub name: String,
    pub kind: TransactionKind,
    pub color: String,
    #[serde(default)]
    pub budget_limit: Option<f64>,
}

/// A route handler for creating a new category.
pub async fn create_category_endpoint(
    State(state): State<CreateCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<CategoryFormData>,
) -> Response {
    let new_category = match NewCategory::validate(
        user_id,
        &form_data.name,
        form_data.kind,
        &form_data.color,
        form_data.budget_limit,
    ) {
        Ok(new_category) => new_category,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_category(new_category, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::CATEGORIES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a category: {error}");

            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a category.
///
/// Deleting a shared default category is rejected. Transactions that
/// reference the deleted category keep their rows and show as
/// "Uncategorized".
pub async fn delete_category_endpoint(
    Path(category_id): Path<CategoryId>,
    State(state): State<DeleteCategoryEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_category(category_id, user_id, &connection) {
        Ok(_) => Alert::success("Category deleted", "").into_response_with(StatusCode::OK),
        Err(error @ (Error::DeleteMissingCategory | Error::DefaultCategoryReadOnly)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting category {category_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create a category in the database.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_category(
    new_category: NewCategory,
    connection: &Connection,
) -> Result<Category, Error> {
    connection.execute(
        "INSERT INTO category (user_id, name, kind, color, budget_limit, is_default)
        VALUES (?1, ?2, ?3, ?4, ?5, 0)",
        (
            new_category.user_id.as_i64(),
            &new_category.name,
            new_category.kind.as_str(),
            &new_category.color,
            new_category.budget_limit,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        user_id: Some(new_category.user_id),
        name: new_category.name,
        kind: new_category.kind,
        color: new_category.color,
        budget_limit: new_category.budget_limit,
        is_default: false,
    })
}

/// Retrieve the categories visible to `user_id`: their own categories plus
/// the shared defaults.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_categories(user_id: UserId, connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, kind, color, budget_limit, is_default FROM category
            WHERE user_id = :user_id OR is_default = 1
            ORDER BY kind ASC, name ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_category_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Delete one of `user_id`'s categories from the database.
///
/// # Errors
/// Returns:
/// - [Error::DefaultCategoryReadOnly] if the category is a shared default.
/// - [Error::DeleteMissingCategory] if the category does not exist or
///   belongs to another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_category(
    category_id: CategoryId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let is_default: Option<bool> = connection
        .prepare("SELECT is_default FROM category WHERE id = :id")?
        .query_row(&[(":id", &category_id)], |row| row.get(0))
        .map(Some)
        .or_else(|error| match error {
            rusqlite::Error::QueryReturnedNoRows => Ok(None),
            error => Err(error),
        })?;

    match is_default {
        None => return Err(Error::DeleteMissingCategory),
        Some(true) => return Err(Error::DefaultCategoryReadOnly),
        Some(false) => {}
    }

    let rows_affected = connection.execute(
        "DELETE FROM category WHERE id = ?1 AND user_id = ?2",
        (category_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingCategory);
    }

    Ok(())
}

pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            user_id INTEGER,
            name TEXT NOT NULL,
            kind TEXT NOT NULL,
            color TEXT NOT NULL,
            budget_limit REAL,
            is_default INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_category_user_id ON category(user_id);",
    )?;

    Ok(())
}

/// Insert the shared default categories if they have not been seeded yet.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let default_count: i64 = connection.query_row(
        "SELECT COUNT(id) FROM category WHERE is_default = 1",
        [],
        |row| row.get(0),
    )?;

    if default_count > 0 {
        return Ok(());
    }

    let defaults = [
        ("Salary", TransactionKind::Income, "#10b981"),
        ("Freelance", TransactionKind::Income, "#06b6d4"),
        ("Investments", TransactionKind::Income, "#8b5cf6"),
        ("Other Income", TransactionKind::Income, "#6366f1"),
        ("Food & Dining", TransactionKind::Expense, "#f97316"),
        ("Groceries", TransactionKind::Expense, "#22c55e"),
        ("Transport", TransactionKind::Expense, "#3b82f6"),
        ("Shopping", TransactionKind::Expense, "#ec4899"),
        ("Entertainment", TransactionKind::Expense, "#a855f7"),
        ("Bills & Utilities", TransactionKind::Expense, "#eab308"),
        ("Health", TransactionKind::Expense, "#ef4444"),
        ("Other", TransactionKind::Expense, "#64748b"),
    ];

    for (name, kind, color) in defaults {
        connection.execute(
            "INSERT INTO category (user_id, name, kind, color, budget_limit, is_default)
            VALUES (NULL, ?1, ?2, ?3, NULL, 1)",
            (name, kind.as_str(), color),
        )?;
    }

    Ok(())
}

fn map_category_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: Option<i64> = row.get(1)?;
    let name = row.get(2)?;
    let raw_kind: String = row.get(3)?;
    let color = row.get(4)?;
    let budget_limit = row.get(5)?;
    let is_default = row.get(6)?;

    Ok(Category {
        id,
        user_id: raw_user_id.map(UserId::new),
        name,
        kind: raw_kind.parse().map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("invalid transaction kind {raw_kind:?}").into(),
            )
        })?,
        color,
        budget_limit,
        is_default,
    })
}

#[cfg(test)]
mod new_category_tests {
    use crate::{Error, transaction::TransactionKind, user::UserId};

    use super::NewCategory;

    #[test]
    fn validate_trims_name() {
        let new_category = NewCategory::validate(
            UserId::new(1),
            "  Groceries ",
            TransactionKind::Expense,
            "#10b981",
            None,
        )
        .unwrap();

        assert_eq!(new_category.name, "Groceries");
    }

    #[test]
    fn validate_rejects_empty_name_first() {
        let result = NewCategory::validate(
            UserId::new(1),
            " ",
            TransactionKind::Expense,
            "not-a-color",
            Some(-1.0),
        );

        assert_eq!(result, Err(Error::Validation("Name is required".to_owned())));
    }

    #[test]
    fn validate_rejects_bad_color() {
        let result = NewCategory::validate(
            UserId::new(1),
            "Groceries",
            TransactionKind::Expense,
            "10b981",
            None,
        );

        assert_eq!(
            result,
            Err(Error::Validation("Please select a valid color".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_zero_budget_limit() {
        let result = NewCategory::validate(
            UserId::new(1),
            "Groceries",
            TransactionKind::Expense,
            "#10b981",
            Some(0.0),
        );

        assert_eq!(
            result,
            Err(Error::Validation(
                "Budget limit must be positive".to_owned()
            ))
        );
    }
}

#[cfg(test)]
mod resolve_category_tests {
    use crate::{transaction::TransactionKind, user::UserId};

    use super::{Category, CategoryDisplay, resolve_category};

    fn test_category(id: i64, name: &str) -> Category {
        Category {
            id,
            user_id: Some(UserId::new(1)),
            name: name.to_owned(),
            kind: TransactionKind::Expense,
            color: "#10b981".to_owned(),
            budget_limit: None,
            is_default: false,
        }
    }

    #[test]
    fn resolves_matching_category() {
        let categories = vec![test_category(1, "Groceries"), test_category(2, "Transport")];

        let display = resolve_category(Some(2), &categories);

        assert_eq!(
            display,
            CategoryDisplay {
                name: "Transport".to_owned(),
                color: "#10b981".to_owned()
            }
        );
    }

    #[test]
    fn null_reference_resolves_to_uncategorized() {
        let categories = vec![test_category(1, "Groceries")];

        let display = resolve_category(None, &categories);

        assert_eq!(display.name, "Uncategorized");
    }

    #[test]
    fn dangling_reference_resolves_to_uncategorized() {
        let categories = vec![test_category(1, "Groceries")];

        let display = resolve_category(Some(42), &categories);

        assert_eq!(display.name, "Uncategorized");
    }
}

#[cfg(test)]
mod category_query_tests {
    use rusqlite::Connection;

    use crate::{
        Error, initialize_db,
        transaction::TransactionKind,
        user::{UserId, create_user},
    };

    use super::{Category, NewCategory, create_category, delete_category, get_categories};

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

    fn create_test_category(user_id: UserId, name: &str, connection: &Connection) -> Category {
        let new_category = NewCategory::validate(
            user_id,
            name,
            TransactionKind::Expense,
            "#10b981",
            None,
        )
        .unwrap();

        create_category(new_category, connection).expect("Could not create test category")
    }

    #[test]
    fn create_category_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let category = create_test_category(user_id, "Rent", &connection);

        assert!(category.id > 0);
        assert_eq!(category.name, "Rent");
        assert_eq!(category.user_id, Some(user_id));
        assert!(!category.is_default);
    }

    #[test]
    fn get_categories_includes_defaults_and_own() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let category = create_test_category(user_id, "Rent", &connection);

        let categories = get_categories(user_id, &connection).unwrap();

        assert!(categories.iter().any(|c| c.id == category.id));
        assert!(categories.iter().any(|c| c.is_default));
    }

    #[test]
    fn get_categories_excludes_other_users_categories() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let other_user_id = create_user(
            "other@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let other_category = create_test_category(other_user_id, "Secret", &connection);

        let categories = get_categories(user_id, &connection).unwrap();

        assert!(!categories.iter().any(|c| c.id == other_category.id));
    }

    #[test]
    fn delete_own_category_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let category = create_test_category(user_id, "Rent", &connection);

        let result = delete_category(category.id, user_id, &connection);

        assert_eq!(result, Ok(()));
        let categories = get_categories(user_id, &connection).unwrap();
        assert!(!categories.iter().any(|c| c.id == category.id));
    }

    #[test]
    fn delete_default_category_is_rejected() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let default_category_id = get_categories(user_id, &connection)
            .unwrap()
            .into_iter()
            .find(|c| c.is_default)
            .expect("No default categories seeded")
            .id;

        let result = delete_category(default_category_id, user_id, &connection);

        assert_eq!(result, Err(Error::DefaultCategoryReadOnly));
    }

    #[test]
    fn delete_missing_category_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = delete_category(999999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }

    #[test]
    fn delete_other_users_category_returns_missing() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let other_user_id = create_user(
            "other@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let other_category = create_test_category(other_user_id, "Secret", &connection);

        let result = delete_category(other_category.id, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingCategory));
    }
}

#[cfg(test)]
mod categories_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{Extension, extract::State, http::StatusCode};
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        initialize_db,
        user::create_user,
    };

    use super::{CategoriesPageState, get_categories_page};

    #[tokio::test]
    async fn render_page_shows_default_categories() {
        let connection = Connection::open_in_memory().unwrap();
        initialize_db(&connection).unwrap();
        let user_id = create_user(
            "foo@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let state = CategoriesPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_categories_page(State(state), Extension(user_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8_lossy(&body).to_string();
        let html = Html::parse_document(&text);
        assert!(html.errors.is_empty(), "Got HTML errors: {:?}", html.errors);
        assert!(text.contains("Salary"), "Expected default income category");
        assert!(
            text.contains("Groceries"),
            "Expected default expense category"
        );
    }
}
