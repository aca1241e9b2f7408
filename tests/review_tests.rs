// tests/review_tests.rs

mod common;

use common::{TestApp, send, spawn_app};
use serde_json::{Value, json};
use yamdb::models::user::Role;

async fn rating(app: &TestApp, title_id: i64) -> Value {
    let res = send(app.get(&format!("/titles/{}/", title_id), None)).await;
    let title: Value = res.json().await.unwrap();
    title["rating"].clone()
}

async fn post_review(app: &TestApp, token: &str, title_id: i64, score: i64) -> reqwest::Response {
    send(app.post(
        &format!("/titles/{}/reviews/", title_id),
        Some(token),
        &json!({"text": format!("Worth a {}.", score), "score": score}),
    ))
    .await
}

#[tokio::test]
async fn dune_rating_is_rounded_mean_and_second_review_is_rejected() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let bob = app.user_with_role("bob", Role::User).await;
    let dune = app.seed_dune(&admin).await;

    let res = post_review(&app, &alice, dune, 8).await;
    assert_eq!(res.status().as_u16(), 201);
    let review: Value = res.json().await.unwrap();
    assert_eq!(review["author"], "alice");
    assert_eq!(review["score"], 8);
    assert!(review["pub_date"].is_string());

    let res = post_review(&app, &bob, dune, 6).await;
    assert_eq!(res.status().as_u16(), 201);

    assert_eq!(rating(&app, dune).await, json!(7));

    let res = post_review(&app, &alice, dune, 10).await;
    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("non_field_errors").is_some());

    // The rejected review did not move the rating
    assert_eq!(rating(&app, dune).await, json!(7));
}

#[tokio::test]
async fn review_input_is_validated() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let dune = app.seed_dune(&admin).await;

    let res = post_review(&app, &alice, dune, 11).await;
    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("score").is_some());

    let res = send(app.post(
        &format!("/titles/{}/reviews/", dune),
        Some(&alice),
        &json!({"text": "  \n\t ", "score": 5}),
    ))
    .await;
    assert_eq!(res.status().as_u16(), 400);
    let body: Value = res.json().await.unwrap();
    assert!(body.get("text").is_some());

    let res = post_review(&app, &alice, 9999, 5).await;
    assert_eq!(res.status().as_u16(), 404);

    let res = send(app.post(
        &format!("/titles/{}/reviews/", dune),
        None,
        &json!({"text": "Anonymous.", "score": 5}),
    ))
    .await;
    assert_eq!(res.status().as_u16(), 401);
}

#[tokio::test]
async fn review_and_comment_text_is_stored_verbatim() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let dune = app.seed_dune(&admin).await;
    let text = "Tom & Jerry <3 a<b, <b>bold</b> claims";

    let res = send(app.post(
        &format!("/titles/{}/reviews/", dune),
        Some(&alice),
        &json!({"text": text, "score": 7}),
    ))
    .await;
    assert_eq!(res.status().as_u16(), 201);
    let review: Value = res.json().await.unwrap();
    assert_eq!(review["text"], text);

    let path = format!("/titles/{}/reviews/{}/", dune, review["id"]);
    let res = send(app.get(&path, None)).await;
    let fetched: Value = res.json().await.unwrap();
    assert_eq!(fetched["text"], text);

    let res = send(app.post(
        &format!("{}comments/", path),
        Some(&alice),
        &json!({"text": text}),
    ))
    .await;
    assert_eq!(res.status().as_u16(), 201);
    let comment: Value = res.json().await.unwrap();
    assert_eq!(comment["text"], text);
}

#[tokio::test]
async fn only_author_or_staff_can_edit_a_review() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let bob = app.user_with_role("bob", Role::User).await;
    let moderator = app.user_with_role("mod", Role::Moderator).await;
    let dune = app.seed_dune(&admin).await;

    let res = post_review(&app, &alice, dune, 8).await;
    let review: Value = res.json().await.unwrap();
    let path = format!("/titles/{}/reviews/{}/", dune, review["id"]);

    let res = send(app.patch(&path, Some(&bob), &json!({"score": 1}))).await;
    assert_eq!(res.status().as_u16(), 403);

    let res = send(app.delete(&path, Some(&bob))).await;
    assert_eq!(res.status().as_u16(), 403);

    let res = send(app.patch(&path, None, &json!({"score": 1}))).await;
    assert_eq!(res.status().as_u16(), 401);

    let res = send(app.patch(&path, Some(&alice), &json!({"score": 4}))).await;
    assert_eq!(res.status().as_u16(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["score"], 4);
    assert_eq!(updated["text"], review["text"]);
    assert_eq!(rating(&app, dune).await, json!(4));

    let res = send(app.patch(&path, Some(&moderator), &json!({"score": 3}))).await;
    assert_eq!(res.status().as_u16(), 200);
    assert_eq!(rating(&app, dune).await, json!(3));

    let res = send(app.delete(&path, Some(&moderator))).await;
    assert_eq!(res.status().as_u16(), 204);
    assert!(rating(&app, dune).await.is_null());
}

#[tokio::test]
async fn reviews_are_scoped_to_their_title() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let dune = app.seed_dune(&admin).await;

    let res = send(app.post(
        "/titles/",
        Some(&admin),
        &json!({"name": "Solaris", "year": 1961}),
    ))
    .await;
    let solaris: Value = res.json().await.unwrap();

    let res = post_review(&app, &alice, dune, 8).await;
    let review: Value = res.json().await.unwrap();

    let res = send(app.get(
        &format!("/titles/{}/reviews/{}/", solaris["id"], review["id"]),
        None,
    ))
    .await;
    assert_eq!(res.status().as_u16(), 404);

    let res = send(app.get(&format!("/titles/{}/reviews/", dune), None)).await;
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["count"], 1);
    assert_eq!(page["results"][0]["author"], "alice");
}

#[tokio::test]
async fn comments_follow_their_review() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let bob = app.user_with_role("bob", Role::User).await;
    let dune = app.seed_dune(&admin).await;

    let res = post_review(&app, &alice, dune, 8).await;
    let review: Value = res.json().await.unwrap();
    let review_path = format!("/titles/{}/reviews/{}/", dune, review["id"]);
    let comments_path = format!("{}comments/", review_path);

    let res = send(app.post(&comments_path, Some(&bob), &json!({"text": "Agreed."}))).await;
    assert_eq!(res.status().as_u16(), 201);
    let comment: Value = res.json().await.unwrap();
    assert_eq!(comment["author"], "bob");
    assert!(comment.get("score").is_none());
    let comment_path = format!("{}{}/", comments_path, comment["id"]);

    let res = send(app.patch(&comment_path, Some(&alice), &json!({"text": "No."}))).await;
    assert_eq!(res.status().as_u16(), 403);

    let res = send(app.patch(&comment_path, Some(&bob), &json!({"text": "Strongly agreed."}))).await;
    assert_eq!(res.status().as_u16(), 200);
    let updated: Value = res.json().await.unwrap();
    assert_eq!(updated["text"], "Strongly agreed.");

    let res = send(app.get(&comments_path, None)).await;
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["count"], 1);

    // Deleting the review takes its comments with it
    let res = send(app.delete(&review_path, Some(&alice))).await;
    assert_eq!(res.status().as_u16(), 204);

    let res = send(app.get(&comments_path, None)).await;
    assert_eq!(res.status().as_u16(), 404);

    let res = send(app.get(&comment_path, None)).await;
    assert_eq!(res.status().as_u16(), 404);
}

#[tokio::test]
async fn deleting_an_account_recomputes_ratings() {
    let app = spawn_app().await;
    let admin = app.user_with_role("root", Role::Admin).await;
    let alice = app.user_with_role("alice", Role::User).await;
    let bob = app.user_with_role("bob", Role::User).await;
    let dune = app.seed_dune(&admin).await;

    post_review(&app, &alice, dune, 8).await;
    post_review(&app, &bob, dune, 6).await;
    assert_eq!(rating(&app, dune).await, json!(7));

    let res = send(app.delete("/users/bob/", Some(&admin))).await;
    assert_eq!(res.status().as_u16(), 204);

    assert_eq!(rating(&app, dune).await, json!(8));

    // The deleted account's token no longer authenticates
    let res = post_review(&app, &bob, dune, 5).await;
    assert_eq!(res.status().as_u16(), 401);
}
