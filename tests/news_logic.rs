//! Creating, editing and deleting comments over HTTP

mod common;

use axum::http::{header, StatusCode};
use common::{spawn_app, today, TestApp};
use serde::Serialize;
use ya_sites::models::News;
use ya_sites::services::{BAD_WORDS, BAD_WORDS_WARNING};

const COMMENT_TEXT: &str = "Текст комментария";
const NEW_COMMENT_TEXT: &str = "Обновлённый комментарий";

#[derive(Serialize)]
struct CommentData<'a> {
    text: &'a str,
}

async fn setup() -> (TestApp, News) {
    let app = spawn_app().await;
    let news = app.create_news("Заголовок", today()).await;
    (app, news)
}

#[tokio::test]
async fn anonymous_user_cant_create_comment() {
    let (app, news) = setup().await;
    let url = format!("/news/{}/", news.id);

    let response = app
        .server
        .post(&url)
        .form(&CommentData { text: COMMENT_TEXT })
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        format!("/auth/login/?next={}", url).as_str()
    );
    assert_eq!(app.count("comments").await, 0);
}

#[tokio::test]
async fn user_can_create_comment() {
    let (app, news) = setup().await;
    let author = app.login("МимоКрокодил").await;
    let (name, value) = author.header();

    let response = app
        .server
        .post(&format!("/news/{}/", news.id))
        .add_header(name, value)
        .form(&CommentData { text: COMMENT_TEXT })
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        format!("/news/{}/#comments", news.id).as_str()
    );

    let comments = app.state.comment_service.list_for_news(news.id).await.unwrap();
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].text, COMMENT_TEXT);
    assert_eq!(comments[0].author_id, author.user.id);
    assert_eq!(comments[0].news_id, news.id);
}

#[tokio::test]
async fn user_cant_use_bad_words() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let (name, value) = author.header();

    let text = format!("Какой-то текст, {}, еще текст", BAD_WORDS[0]);
    let response = app
        .server
        .post(&format!("/news/{}/", news.id))
        .add_header(name, value)
        .form(&CommentData { text: &text })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(BAD_WORDS_WARNING));
    assert_eq!(app.count("comments").await, 0);
}

#[tokio::test]
async fn empty_comment_is_rejected() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let (name, value) = author.header();

    let response = app
        .server
        .post(&format!("/news/{}/", news.id))
        .add_header(name, value)
        .form(&CommentData { text: "   " })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains("Обязательное поле."));
    assert_eq!(app.count("comments").await, 0);
}

#[tokio::test]
async fn author_can_delete_comment() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let comment = app.create_comment(&news, &author.user, COMMENT_TEXT).await;
    let (name, value) = author.header();

    let response = app
        .server
        .post(&format!("/news/delete_comment/{}/", comment.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        format!("/news/{}/#comments", news.id).as_str()
    );
    assert_eq!(app.count("comments").await, 0);
}

#[tokio::test]
async fn user_cant_delete_comment_of_another_user() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let reader = app.login("Читатель").await;
    let comment = app.create_comment(&news, &author.user, COMMENT_TEXT).await;
    let (name, value) = reader.header();

    let response = app
        .server
        .post(&format!("/news/delete_comment/{}/", comment.id))
        .add_header(name, value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.count("comments").await, 1);
}

#[tokio::test]
async fn author_can_edit_comment() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let comment = app.create_comment(&news, &author.user, COMMENT_TEXT).await;
    let (name, value) = author.header();

    let response = app
        .server
        .post(&format!("/news/edit_comment/{}/", comment.id))
        .add_header(name, value)
        .form(&CommentData {
            text: NEW_COMMENT_TEXT,
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(
        response.header(header::LOCATION),
        format!("/news/{}/#comments", news.id).as_str()
    );
    assert_eq!(app.comment_text(comment.id).await.as_deref(), Some(NEW_COMMENT_TEXT));
}

#[tokio::test]
async fn user_cant_edit_comment_of_another_user() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let reader = app.login("Читатель").await;
    let comment = app.create_comment(&news, &author.user, COMMENT_TEXT).await;
    let (name, value) = reader.header();

    let response = app
        .server
        .post(&format!("/news/edit_comment/{}/", comment.id))
        .add_header(name, value)
        .form(&CommentData {
            text: NEW_COMMENT_TEXT,
        })
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(app.comment_text(comment.id).await.as_deref(), Some(COMMENT_TEXT));
}

#[tokio::test]
async fn edit_with_bad_word_keeps_old_text() {
    let (app, news) = setup().await;
    let author = app.login("Автор").await;
    let comment = app.create_comment(&news, &author.user, COMMENT_TEXT).await;
    let (name, value) = author.header();

    let text = format!("Ты {}", BAD_WORDS[1].to_uppercase());
    let response = app
        .server
        .post(&format!("/news/edit_comment/{}/", comment.id))
        .add_header(name, value)
        .form(&CommentData { text: &text })
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(response.text().contains(BAD_WORDS_WARNING));
    assert_eq!(app.comment_text(comment.id).await.as_deref(), Some(COMMENT_TEXT));
}
