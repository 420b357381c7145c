//! Route availability and access rules of the news site

mod common;

use axum::http::{header, StatusCode};
use common::{spawn_app, today};

#[tokio::test]
async fn public_pages_are_available_to_anonymous_users() {
    let app = spawn_app().await;
    let news = app.create_news("Заголовок", today()).await;

    let detail = format!("/news/{}/", news.id);
    for url in ["/news/", detail.as_str(), "/auth/login/", "/auth/logout/", "/auth/signup/"] {
        let response = app.server.get(url).await;
        assert_eq!(response.status_code(), StatusCode::OK, "{}", url);
    }
}

#[tokio::test]
async fn root_redirects_to_news() {
    let app = spawn_app().await;

    let response = app.server.get("/").await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header(header::LOCATION), "/news/");
}

#[tokio::test]
async fn missing_news_is_not_found() {
    let app = spawn_app().await;

    assert_eq!(app.server.get("/news/1/").await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.server.get("/news/abc/").await.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.server.get("/no/such/page/").await.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_pages_are_available_only_to_author() {
    let app = spawn_app().await;
    let news = app.create_news("Заголовок", today()).await;
    let author = app.login("Автор").await;
    let reader = app.login("Читатель_простой").await;
    let comment = app.create_comment(&news, &author.user, "Текст комментария").await;

    for url in [
        format!("/news/edit_comment/{}/", comment.id),
        format!("/news/delete_comment/{}/", comment.id),
    ] {
        let (name, value) = author.header();
        let response = app.server.get(&url).add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::OK, "author on {}", url);

        let (name, value) = reader.header();
        let response = app.server.get(&url).add_header(name, value).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND, "reader on {}", url);
    }
}

#[tokio::test]
async fn anonymous_user_is_redirected_to_login() {
    let app = spawn_app().await;
    let news = app.create_news("Заголовок", today()).await;
    let author = app.login("Автор").await;
    let comment = app.create_comment(&news, &author.user, "Текст комментария").await;

    for url in [
        format!("/news/edit_comment/{}/", comment.id),
        format!("/news/delete_comment/{}/", comment.id),
    ] {
        let response = app.server.get(&url).await;

        assert_eq!(response.status_code(), StatusCode::FOUND);
        assert_eq!(
            response.header(header::LOCATION),
            format!("/auth/login/?next={}", url).as_str()
        );
    }
}

#[tokio::test]
async fn not_found_page_is_html() {
    let app = spawn_app().await;

    let response = app.server.get("/news/42/").await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body = response.text();
    assert!(body.contains("<h1>404</h1>"));
    assert!(body.contains("Страница не найдена"));
}
