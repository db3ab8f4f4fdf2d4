//! This file defines the `Goal` type, the types needed to create a savings
//! goal and the API routes for the goal type.

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
use time::Date;

use crate::{
    AppState, Error,
    aggregation::goal_completion,
    category::COLOR_OPTIONS,
    database_id::GoalId,
    endpoints,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, BUTTON_SECONDARY_STYLE, FORM_LABEL_STYLE,
        FORM_TEXT_INPUT_STYLE, PAGE_CONTAINER_STYLE, base, format_currency,
    },
    navigation::NavBar,
    user::UserId,
    validation,
};

/// A savings goal that the user contributes towards over time.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The owner of the goal.
    pub user_id: UserId,
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to reach.
    pub target_amount: f64,
    /// How much has been contributed so far.
    pub current_amount: f64,
    /// An optional date the user wants to reach the target by.
    ///
    /// The deadline is informational; progress is never blocked or reset
    /// when it passes.
    pub deadline: Option<Date>,
    /// An optional hex color for the goal's progress bar.
    pub color: Option<String>,
}

/// A goal that passed validation but has not been stored yet.
///
/// New goals always start with a current amount of zero; money only enters a
/// goal through contributions.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    user_id: UserId,
    name: String,
    target_amount: f64,
    deadline: Option<Date>,
    color: Option<String>,
}

impl NewGoal {
    /// Validate the fields for a new goal.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        name: &str,
        target_amount: f64,
        deadline: Option<Date>,
        color: Option<&str>,
    ) -> Result<Self, Error> {
        let name = validation::required_text(name, "Name", 100)?;
        let target_amount = validation::positive_amount(target_amount, "Target amount")?;
        let color = color.map(validation::hex_color).transpose()?;

        Ok(Self {
            user_id,
            name,
            target_amount,
            deadline,
            color,
        })
    }
}

fn goal_card_view(goal: &Goal) -> Markup {
    let completion = goal_completion(goal.current_amount, goal.target_amount);
    let contribute_endpoint = endpoints::format_endpoint(endpoints::CONTRIBUTE_GOAL, goal.id);
    let delete_endpoint = endpoints::format_endpoint(endpoints::DELETE_GOAL, goal.id);
    let bar_color = goal.color.as_deref().unwrap_or("#22c55e");

    html! {
        div class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700"
        {
            div class="flex items-center justify-between mb-2"
            {
                div
                {
                    span class="font-medium" { (goal.name) }

                    @if let Some(deadline) = goal.deadline
                    {
                        span class="ml-2 text-sm text-gray-500 dark:text-gray-400"
                        {
                            "by " (deadline)
                        }
                    }

                    @if completion.achieved
                    {
                        span class="ml-2 text-sm font-semibold text-green-600 dark:text-green-400"
                        {
                            "Achieved!"
                        }
                    }
                }

                button
                    class=(BUTTON_DELETE_STYLE)
                    hx-delete=(delete_endpoint)
                    hx-target-error="#alert-container"
                    hx-confirm="Delete this goal?"
                {
                    "Delete"
                }
            }

            div class="flex justify-between text-sm mb-1"
            {
                span
                {
                    (format_currency(goal.current_amount)) " of " (format_currency(goal.target_amount))
                }

                span { (format!("{:.0}%", completion.percentage)) }
            }

            div class="w-full h-2 rounded-full bg-gray-200 dark:bg-gray-700 mb-3"
            {
                div
                    class="h-2 rounded-full"
                    style=(format!(
                        "width: {:.0}%; background-color: {bar_color};",
                        completion.percentage
                    ))
                {}
            }

            form
                hx-post=(contribute_endpoint)
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
                    "Contribute"
                }
            }
        }
    }
}

fn new_goal_form_view() -> Markup {
    html! {
        form
            hx-post=(endpoints::POST_GOAL)
            hx-target-error="#alert-container"
            class="w-full p-4 rounded-xl bg-white dark:bg-gray-800 border border-gray-200 dark:border-gray-700 grid grid-cols-1 sm:grid-cols-3 gap-4"
        {
            div
            {
                label for="name" class=(FORM_LABEL_STYLE) { "Name" }

                input
                    id="name"
                    type="text"
                    name="name"
                    placeholder="e.g., Emergency fund"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="target_amount" class=(FORM_LABEL_STYLE) { "Target" }

                input
                    id="target_amount"
                    type="number"
                    name="target_amount"
                    step="0.01"
                    min="0.01"
                    placeholder="0.00"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="deadline" class=(FORM_LABEL_STYLE) { "Deadline (optional)" }

                input
                    id="deadline"
                    type="date"
                    name="deadline"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div class="sm:col-span-3"
            {
                label class=(FORM_LABEL_STYLE) { "Color (optional)" }

                div class="flex flex-wrap gap-2"
                {
                    @for (index, color) in COLOR_OPTIONS.iter().enumerate()
                    {
                        input
                            id=(format!("color-{index}"))
                            type="radio"
                            name="color"
                            value=(color)
                            class="w-8 h-8 rounded-lg appearance-none cursor-pointer checked:ring-2 checked:ring-blue-600"
                            style=(format!("background-color: {color}"));
                    }
                }
            }

            div class="sm:col-span-3"
            {
                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add Goal" }
            }
        }
    }
}

fn goals_view(goals: &[Goal]) -> Markup {
    let nav_bar = NavBar::new(endpoints::GOALS_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-screen-md flex flex-col gap-4"
            {
                h1 class="text-2xl font-bold" { "Savings Goals" }

                (new_goal_form_view())

                @if goals.is_empty()
                {
                    p class="text-gray-500 dark:text-gray-400"
                    {
                        "No goals yet. Add one above to start saving."
                    }
                }
                @else
                {
                    @for goal in goals
                    {
                        (goal_card_view(goal))
                    }
                }
            }
        }
    };

    base("Goals", &[], &content)
}

/// The state needed for the goals page.
#[derive(Debug, Clone)]
pub struct GoalsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating, contributing to or deleting a goal.
#[derive(Debug, Clone)]
pub struct GoalEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for GoalEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the goals page.
pub async fn get_goals_page(
    State(state): State<GoalsPageState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let goals = get_goals(user_id, &connection)?;

    Ok(goals_view(&goals).into_response())
}

/// The form data for creating a goal.
#[derive(Debug, Deserialize)]
pub struct GoalFormData {
    /// What the user is saving for.
    pub name: String,
    /// The amount the user wants to reach.
    pub target_amount: f64,
    /// An optional date to reach the target by.
    #[serde(default)]
    pub deadline: Option<Date>,
    /// An optional hex color for the goal's progress bar.
    #[serde(default)]
    pub color: Option<String>,
}

/// A route handler for creating a new goal, redirects to the goals view on
/// success.
pub async fn create_goal_endpoint(
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<GoalFormData>,
) -> Response {
    let new_goal = match NewGoal::validate(
        user_id,
        &form_data.name,
        form_data.target_amount,
        form_data.deadline,
        form_data.color.as_deref(),
    ) {
        Ok(new_goal) => new_goal,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_goal(new_goal, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a goal: {error}");

            error.into_alert_response()
        }
    }
}

/// The form data for contributing to a goal.
#[derive(Debug, Deserialize)]
pub struct ContributionFormData {
    /// The amount to add to the goal's current amount.
    pub amount: f64,
}

/// A route handler for contributing money towards a goal.
///
/// Contributions are additive. The current amount may exceed the target;
/// the progress display caps at 100% but the raw amount is kept.
pub async fn contribute_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<ContributionFormData>,
) -> Response {
    let amount = match validation::positive_amount(form_data.amount, "Contribution") {
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

    match contribute_to_goal(goal_id, user_id, amount, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::UpdateMissingGoal) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while contributing to goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// A route handler for deleting a goal.
pub async fn delete_goal_endpoint(
    Path(goal_id): Path<GoalId>,
    State(state): State<GoalEndpointState>,
    Extension(user_id): Extension<UserId>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match delete_goal(goal_id, user_id, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::GOALS_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ Error::DeleteMissingGoal) => error.into_alert_response(),
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while deleting goal {goal_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

/// Create a goal in the database with a current amount of zero.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn create_goal(new_goal: NewGoal, connection: &Connection) -> Result<Goal, Error> {
    connection.execute(
        "INSERT INTO goal (user_id, name, target_amount, current_amount, deadline, color)
        VALUES (?1, ?2, ?3, 0, ?4, ?5)",
        (
            new_goal.user_id.as_i64(),
            &new_goal.name,
            new_goal.target_amount,
            new_goal.deadline,
            &new_goal.color,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Goal {
        id,
        user_id: new_goal.user_id,
        name: new_goal.name,
        target_amount: new_goal.target_amount,
        current_amount: 0.0,
        deadline: new_goal.deadline,
        color: new_goal.color,
    })
}

/// Retrieve `user_id`'s goals in creation order.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_goals(user_id: UserId, connection: &Connection) -> Result<Vec<Goal>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, target_amount, current_amount, deadline, color FROM goal
            WHERE user_id = :user_id
            ORDER BY id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_goal_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Add `amount` to the current amount of one of `user_id`'s goals.
///
/// # Errors
/// Returns:
/// - [Error::UpdateMissingGoal] if the goal does not exist or belongs to
///   another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn contribute_to_goal(
    goal_id: GoalId,
    user_id: UserId,
    amount: f64,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET current_amount = current_amount + ?1 WHERE id = ?2 AND user_id = ?3",
        (amount, goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingGoal);
    }

    Ok(())
}

/// Delete one of `user_id`'s goals from the database.
///
/// # Errors
/// Returns:
/// - [Error::DeleteMissingGoal] if the goal does not exist or belongs to
///   another user.
/// - [Error::SqlError] if there is some other SQL error.
pub fn delete_goal(
    goal_id: GoalId,
    user_id: UserId,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM goal WHERE id = ?1 AND user_id = ?2",
        (goal_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingGoal);
    }

    Ok(())
}

pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            target_amount REAL NOT NULL,
            current_amount REAL NOT NULL DEFAULT 0,
            deadline TEXT,
            color TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_goal_row(row: &Row) -> Result<Goal, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_user_id: i64 = row.get(1)?;
    let name = row.get(2)?;
    let target_amount = row.get(3)?;
    let current_amount = row.get(4)?;
    let deadline = row.get(5)?;
    let color = row.get(6)?;

    Ok(Goal {
        id,
        user_id: UserId::new(raw_user_id),
        name,
        target_amount,
        current_amount,
        deadline,
        color,
    })
}

#[cfg(test)]
mod new_goal_tests {
    use crate::{Error, user::UserId};

    use super::NewGoal;

    #[test]
    fn validate_rejects_empty_name() {
        let result = NewGoal::validate(UserId::new(1), "  ", 100.0, None, None);

        assert_eq!(result, Err(Error::Validation("Name is required".to_owned())));
    }

    #[test]
    fn validate_rejects_zero_target() {
        let result = NewGoal::validate(UserId::new(1), "Emergency fund", 0.0, None, None);

        assert_eq!(
            result,
            Err(Error::Validation("Target amount must be positive".to_owned()))
        );
    }

    #[test]
    fn validate_rejects_malformed_color() {
        let result = NewGoal::validate(UserId::new(1), "Emergency fund", 100.0, None, Some("green"));

        assert_eq!(
            result,
            Err(Error::Validation("Please select a valid color".to_owned()))
        );
    }
}

#[cfg(test)]
mod goal_query_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error, initialize_db,
        user::{UserId, create_user},
    };

    use super::{Goal, NewGoal, contribute_to_goal, create_goal, delete_goal, get_goals};

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

    fn create_test_goal(user_id: UserId, connection: &Connection) -> Goal {
        let new_goal = NewGoal::validate(
            user_id,
            "Emergency fund",
            1000.0,
            Some(date!(2025 - 12 - 31)),
            Some("#22c55e"),
        )
        .unwrap();

        create_goal(new_goal, connection).expect("Could not create test goal")
    }

    #[test]
    fn create_goal_starts_at_zero() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let goal = create_test_goal(user_id, &connection);

        assert!(goal.id > 0);
        assert_eq!(goal.current_amount, 0.0);
        assert_eq!(goal.deadline, Some(date!(2025 - 12 - 31)));
        assert_eq!(goal.color, Some("#22c55e".to_owned()));
    }

    #[test]
    fn contributions_are_additive() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let goal = create_test_goal(user_id, &connection);

        contribute_to_goal(goal.id, user_id, 100.0, &connection).unwrap();
        contribute_to_goal(goal.id, user_id, 50.5, &connection).unwrap();

        let goals = get_goals(user_id, &connection).unwrap();
        assert_eq!(goals[0].current_amount, 150.5);
    }

    #[test]
    fn contribution_can_exceed_target() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let goal = create_test_goal(user_id, &connection);

        contribute_to_goal(goal.id, user_id, 1500.0, &connection).unwrap();

        let goals = get_goals(user_id, &connection).unwrap();
        assert_eq!(goals[0].current_amount, 1500.0);
    }

    #[test]
    fn contribute_to_missing_goal_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = contribute_to_goal(999999, user_id, 100.0, &connection);

        assert_eq!(result, Err(Error::UpdateMissingGoal));
    }

    #[test]
    fn contribute_to_other_users_goal_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let other_user_id = create_user(
            "other@bar.baz",
            crate::PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap()
        .id;
        let goal = create_test_goal(other_user_id, &connection);

        let result = contribute_to_goal(goal.id, user_id, 100.0, &connection);

        assert_eq!(result, Err(Error::UpdateMissingGoal));
    }

    #[test]
    fn delete_goal_succeeds() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);
        let goal = create_test_goal(user_id, &connection);

        let result = delete_goal(goal.id, user_id, &connection);

        assert_eq!(result, Ok(()));
        assert!(get_goals(user_id, &connection).unwrap().is_empty());
    }

    #[test]
    fn delete_missing_goal_returns_error() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let result = delete_goal(999999, user_id, &connection);

        assert_eq!(result, Err(Error::DeleteMissingGoal));
    }
}
