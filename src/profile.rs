//! This file defines the `Profile` type and the API routes for viewing and
//! updating the user's profile.
//!
//! Every user has exactly one profile. Users that have never saved their
//! profile get the defaults; the row is only written on first update.

use std::{
    fmt::Display,
    str::FromStr,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, State},
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

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        base,
    },
    navigation::NavBar,
    user::{UserId, get_user_by_id},
    validation,
};

/// The colour scheme the user prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    /// Always use the light colour scheme.
    Light,
    /// Always use the dark colour scheme.
    Dark,
    /// Follow the operating system preference.
    System,
}

impl Theme {
    /// The string stored in the database for this theme.
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "system" => Ok(Theme::System),
            _ => Err(Error::Validation(format!("'{s}' is not a valid theme"))),
        }
    }
}

impl Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Display preferences for a single user.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    /// The user the profile belongs to.
    pub user_id: UserId,
    /// The name shown on the dashboard greeting.
    pub full_name: Option<String>,
    /// The ISO 4217 code of the user's display currency.
    pub currency: String,
    /// The colour scheme the user prefers.
    pub theme: Theme,
}

impl Profile {
    /// The profile used for users that have never saved theirs.
    pub fn default_for(user_id: UserId) -> Self {
        Self {
            user_id,
            full_name: None,
            currency: "USD".to_owned(),
            theme: Theme::System,
        }
    }
}

/// A profile update that passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    user_id: UserId,
    full_name: Option<String>,
    currency: String,
    theme: Theme,
}

impl ProfileUpdate {
    /// Validate the fields for a profile update.
    ///
    /// Checks run in declared order and the first failing check produces the
    /// [Error::Validation] that is shown to the user.
    pub fn validate(
        user_id: UserId,
        full_name: Option<&str>,
        currency: &str,
        theme: Theme,
    ) -> Result<Self, Error> {
        let full_name = validation::optional_text(full_name, "Full name", 100)?;
        let currency = validation::required_text(currency, "Currency", 10)?;

        Ok(Self {
            user_id,
            full_name,
            currency,
            theme,
        })
    }
}

fn profile_view(email: &str, profile: &Profile) -> Markup {
    let nav_bar = NavBar::new(endpoints::PROFILE_VIEW).into_html();

    let form = html! {
        form
            hx-put=(endpoints::PUT_PROFILE)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label class=(FORM_LABEL_STYLE) { "Email" }

                p class="text-gray-500 dark:text-gray-400" { (email) }
            }

            div
            {
                label for="full_name" class=(FORM_LABEL_STYLE) { "Full Name" }

                input
                    id="full_name"
                    type="text"
                    name="full_name"
                    value=[profile.full_name.as_deref()]
                    placeholder="Your name"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="currency" class=(FORM_LABEL_STYLE) { "Currency" }

                input
                    id="currency"
                    type="text"
                    name="currency"
                    value=(profile.currency)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="theme" class=(FORM_LABEL_STYLE) { "Theme" }

                select id="theme" name="theme" class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for theme in ["light", "dark", "system"]
                    {
                        option value=(theme) selected[theme == profile.theme.as_str()]
                        {
                            (theme)
                        }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Profile" }
        }
    };

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("Profile", &[], &content)
}

/// The state needed for the profile page and update endpoint.
#[derive(Debug, Clone)]
pub struct ProfileState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProfileState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler for the profile page.
pub async fn get_profile_page(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)?;
    let profile = get_profile(user_id, &connection)?;

    Ok(profile_view(&user.email, &profile).into_response())
}

/// The form data for updating the profile.
#[derive(Debug, Deserialize)]
pub struct ProfileFormData {
    /// The name shown on the dashboard greeting.
    #[serde(default)]
    pub full_name: Option<String>,
    /// The ISO 4217 code of the user's display currency.
    pub currency: String,
    /// The colour scheme the user prefers.
    pub theme: Theme,
}

/// A route handler for updating the user's profile in place.
pub async fn update_profile_endpoint(
    State(state): State<ProfileState>,
    Extension(user_id): Extension<UserId>,
    Form(form_data): Form<ProfileFormData>,
) -> Response {
    let profile_update = match ProfileUpdate::validate(
        user_id,
        form_data.full_name.as_deref(),
        &form_data.currency,
        form_data.theme,
    ) {
        Ok(profile_update) => profile_update,
        Err(error) => return error.into_alert_response(),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match upsert_profile(profile_update, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PROFILE_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating the profile: {error}");

            error.into_alert_response()
        }
    }
}

/// Retrieve `user_id`'s profile, or the defaults if they have never saved
/// one.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn get_profile(user_id: UserId, connection: &Connection) -> Result<Profile, Error> {
    let result = connection
        .prepare(
            "SELECT user_id, full_name, currency, theme FROM profile WHERE user_id = :user_id",
        )?
        .query_row(&[(":user_id", &user_id.as_i64())], map_profile_row);

    match result {
        Ok(profile) => Ok(profile),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Profile::default_for(user_id)),
        Err(error) => Err(error.into()),
    }
}

/// Write `user_id`'s profile, creating the row on first save.
///
/// # Errors
/// This function will return an error if there is an SQL error.
pub fn upsert_profile(
    profile_update: ProfileUpdate,
    connection: &Connection,
) -> Result<Profile, Error> {
    connection.execute(
        "INSERT INTO profile (user_id, full_name, currency, theme)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT(user_id) DO UPDATE SET
            full_name = excluded.full_name,
            currency = excluded.currency,
            theme = excluded.theme",
        (
            profile_update.user_id.as_i64(),
            &profile_update.full_name,
            &profile_update.currency,
            profile_update.theme.as_str(),
        ),
    )?;

    Ok(Profile {
        user_id: profile_update.user_id,
        full_name: profile_update.full_name,
        currency: profile_update.currency,
        theme: profile_update.theme,
    })
}

pub fn create_profile_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS profile (
            user_id INTEGER PRIMARY KEY,
            full_name TEXT,
            currency TEXT NOT NULL,
            theme TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

fn map_profile_row(row: &Row) -> Result<Profile, rusqlite::Error> {
    let raw_user_id: i64 = row.get(0)?;
    let full_name = row.get(1)?;
    let currency = row.get(2)?;
    let raw_theme: String = row.get(3)?;

    let theme = raw_theme.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid theme {raw_theme:?}").into(),
        )
    })?;

    Ok(Profile {
        user_id: UserId::new(raw_user_id),
        full_name,
        currency,
        theme,
    })
}

#[cfg(test)]
mod theme_tests {
    use super::Theme;

    #[test]
    fn parses_known_themes() {
        assert_eq!("light".parse(), Ok(Theme::Light));
        assert_eq!("dark".parse(), Ok(Theme::Dark));
        assert_eq!("system".parse(), Ok(Theme::System));
    }

    #[test]
    fn rejects_unknown_theme() {
        let result: Result<Theme, _> = "solarized".parse();

        assert!(result.is_err());
    }
}

#[cfg(test)]
mod profile_query_tests {
    use rusqlite::Connection;

    use crate::{
        initialize_db,
        user::{UserId, create_user},
    };

    use super::{Profile, ProfileUpdate, Theme, get_profile, upsert_profile};

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

    #[test]
    fn get_profile_returns_defaults_before_first_save() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let profile = get_profile(user_id, &connection).unwrap();

        assert_eq!(profile, Profile::default_for(user_id));
        assert_eq!(profile.currency, "USD");
        assert_eq!(profile.theme, Theme::System);
    }

    #[test]
    fn upsert_creates_then_updates_in_place() {
        let connection = get_test_db_connection();
        let user_id = create_test_user(&connection);

        let first_update =
            ProfileUpdate::validate(user_id, Some("Jo Bloggs"), "NZD", Theme::Dark).unwrap();
        upsert_profile(first_update, &connection).unwrap();

        let profile = get_profile(user_id, &connection).unwrap();
        assert_eq!(profile.full_name.as_deref(), Some("Jo Bloggs"));
        assert_eq!(profile.currency, "NZD");

        let second_update =
            ProfileUpdate::validate(user_id, None, "EUR", Theme::Light).unwrap();
        upsert_profile(second_update, &connection).unwrap();

        let profile = get_profile(user_id, &connection).unwrap();
        assert_eq!(profile.full_name, None);
        assert_eq!(profile.currency, "EUR");
        assert_eq!(profile.theme, Theme::Light);

        let profile_count: i64 = connection
            .query_row("SELECT COUNT(user_id) FROM profile", [], |row| row.get(0))
            .unwrap();
        assert_eq!(profile_count, 1);
    }

    #[test]
    fn validate_rejects_overlong_currency_code() {
        let result = ProfileUpdate::validate(
            UserId::new(1),
            None,
            "NOTACURRENCYCODE",
            Theme::System,
        );

        assert!(result.is_err());
    }
}
