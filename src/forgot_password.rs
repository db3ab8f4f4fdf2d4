//! Static page describing how to reset a forgotten password.

use axum::{response::IntoResponse, response::Response};
use maud::{Markup, html};

use crate::{endpoints, html::base};

fn forgot_password_template() -> Markup {
    let content = html! {
        // Template adapted from https://flowbite.com/blocks/marketing/register/
        div
            class="flex flex-col items-center justify-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            a
                href="#"
                class="flex items-center mb-6 text-2xl font-semibold"
            {
                img
                    src="/static/favicon.svg"
                    alt="logo"
                    class="w-8 h-8 mr-2";
                "Fintrack"
            }
            div
                class="w-full bg-white rounded shadow dark:border md:mt-0 sm:max-w-md xl:p-0 dark:bg-gray-800 dark:border-gray-700"
            {
                div class="p-6 space-y-4 md:space-y-6 sm:p-8"
                {
                    h1
                        class="text-xl font-bold md:text-2xl"
                    {
                        "Forgot your password?"
                    }
                    p class="text-justify"
                    {
                        "Passwords can only be reset from the machine the server
                        runs on. Go to the directory where this server is running
                        from and run the program 'reset_password', point it to
                        your database file and enter the email address you
                        registered with."
                    }
                    p
                    {
                        a
                            href=(endpoints::LOG_IN_VIEW)
                            class="font-semibold text-blue-600 hover:text-blue-500 dark:text-blue-500 dark:hover:text-blue-400"
                        {
                            "Back to log in"
                        }
                    }
                }
            }
        }
    };

    base("Forgot Password", &[], &content)
}

/// Renders a page describing how the user's password can be reset.
pub async fn get_forgot_password_page() -> Response {
    forgot_password_template().into_response()
}

#[cfg(test)]
mod forgot_password_tests {
    use axum::http::StatusCode;
    use scraper::{Html, Selector};

    use crate::endpoints;

    use super::get_forgot_password_page;

    #[tokio::test]
    async fn page_links_back_to_log_in() {
        let response = get_forgot_password_page().await;
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

        let link_selector = Selector::parse("a[href]").unwrap();
        let hrefs: Vec<_> = document
            .select(&link_selector)
            .filter_map(|link| link.value().attr("href"))
            .collect();
        assert!(hrefs.contains(&endpoints::LOG_IN_VIEW));
    }
}
