#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use common::{bearer, create_task, make_admin, register_user, send, test_state, user_id};

fn notifications_of(body: &Value) -> Vec<Value> {
    body["data"].as_array().cloned().unwrap_or_default()
}

#[actix_rt::test]
async fn test_task_routes_require_authentication() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;

    let req = test::TestRequest::post()
        .uri("/api/v1/task/create")
        .set_json(json!({ "title": "Unauthorized Task", "content": "nope" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 401);

    let req = test::TestRequest::get().uri("/api/v1/task").to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn test_task_crud_flow() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let token = register_user(&app, "Crud User", "crud@example.com", "password123").await;
    let me = user_id(&app, &token).await;

    let task = create_task(
        &app,
        &token,
        json!({ "title": "Write report", "content": "Quarterly numbers" }),
    )
    .await;
    assert_eq!(task["status"], "initial");
    assert_eq!(task["created_by"], me.to_string());
    assert_eq!(task["deleted"], false);
    let task_id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/detail/{}", task_id))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["title"], "Write report");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update/{}", task_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Write annual report", "created_by": Uuid::new_v4() }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "update failed: {}", body);
    assert_eq!(body["task"]["title"], "Write annual report");
    assert_eq!(body["task"]["content"], "Quarterly numbers");
    assert_eq!(body["task"]["created_by"], me.to_string());

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update-status/{}", task_id))
        .insert_header(bearer(&token))
        .set_json(json!({ "status": "whatever-we-like" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "whatever-we-like");

    let subtask = create_task(
        &app,
        &token,
        json!({ "title": "Gather data", "content": "From finance", "status": "todo", "parent_id": task_id }),
    )
    .await;
    assert_eq!(subtask["status"], "todo");

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task?parent_id={}", task_id))
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    let children = body["tasks"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], subtask["id"]);

    let req = test::TestRequest::get()
        .uri("/api/v1/task?search=ANNUAL")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::patch()
        .uri("/api/v1/task/update-multiple")
        .insert_header(bearer(&token))
        .set_json(json!({
            "ids": [task_id, subtask["id"], Uuid::new_v4()],
            "status": "done"
        }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"], json!({ "matched": 2, "modified": 2 }));

    let req = test::TestRequest::patch()
        .uri("/api/v1/task/update-multiple")
        .insert_header(bearer(&token))
        .set_json(json!({ "ids": [], "status": "done" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tasks"], json!({ "matched": 0, "modified": 0 }));

    let req = test::TestRequest::get()
        .uri("/api/v1/task?status=done")
        .insert_header(bearer(&token))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);
}

#[actix_rt::test]
async fn test_task_not_found_and_bad_input() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let token = register_user(&app, "Someone", "someone@example.com", "password123").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/detail/{}", Uuid::new_v4()))
        .insert_header(bearer(&token))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Task not found");

    let req = test::TestRequest::get()
        .uri("/api/v1/task/detail/not-a-uuid")
        .insert_header(bearer(&token))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/task/create")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "", "content": "x" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/task/create")
        .insert_header(bearer(&token))
        .set_json(json!({ "title": "Orphan", "content": "x", "parent_id": Uuid::new_v4() }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update-status/{}", Uuid::new_v4()))
        .insert_header(bearer(&token))
        .set_json(json!({ "status": "done" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_delete_is_admin_only_and_soft() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob", "bob@test.com", "password123").await;
    make_admin(&state, "bob@test.com").await;

    let t = create_task(&app, &alice, json!({ "title": "T", "content": "first" })).await;
    let u = create_task(&app, &alice, json!({ "title": "U", "content": "second" })).await;
    let t_id = t["id"].as_str().unwrap().to_string();
    let u_id = u["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", t_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "note to self" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/task/delete/{}", t_id))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK, "admin delete failed: {}", body);
    assert_eq!(body["task"]["deleted"], true);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/task/delete/{}", u_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/detail/{}", u_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["task"]["deleted"], false);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/detail/{}", t_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["deleted"], true);

    let req = test::TestRequest::get()
        .uri("/api/v1/task")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    let listed: Vec<&str> = body["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|t| t["id"].as_str())
        .collect();
    assert_eq!(listed, vec![u_id.as_str()]);

    let req = test::TestRequest::get()
        .uri("/api/v1/task?include_deleted=true")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update/{}", t_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "revived?" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/{}/comments", t_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/task/delete/{}", Uuid::new_v4()))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_comment_notifies_task_creator() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice Liddell", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob Builder", "bob@test.com", "password123").await;
    let bob_id = user_id(&app, &bob).await;

    let task = create_task(&app, &alice, json!({ "title": "Paint fence", "content": "white" })).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "content": "I'll start tomorrow" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(notifications_of(&body).is_empty(), "own comment notified");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "Need a hand?" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["author_id"], bob_id.to_string());

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    let notes = notifications_of(&body);
    assert_eq!(notes.len(), 1);
    assert_eq!(
        notes[0]["message"],
        "Bob Builder has commented on your task \"Paint fence\""
    );
    assert_eq!(
        notes[0]["link"],
        format!("/api/v1/task/detail/{}", task_id)
    );
    assert_eq!(notes[0]["is_read"], false);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&bob))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(notifications_of(&body).is_empty());

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&bob))
        .to_request();
    let (_, body) = send(&app, req).await;
    let comments = body["data"].as_array().unwrap();
    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0]["content"], "I'll start tomorrow");
    assert_eq!(comments[1]["author"]["full_name"], "Bob Builder");
    assert!(comments[1]["author"].get("password_hash").is_none());

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", Uuid::new_v4()))
        .insert_header(bearer(&bob))
        .set_json(json!({ "content": "anyone?" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_comment_mutation_permissions() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let author = register_user(&app, "Author", "author@test.com", "password123").await;
    let stranger = register_user(&app, "Stranger", "stranger@test.com", "password123").await;
    let admin = register_user(&app, "Admin", "admin@test.com", "password123").await;
    make_admin(&state, "admin@test.com").await;

    let task = create_task(&app, &author, json!({ "title": "T", "content": "c" })).await;
    let other_task = create_task(&app, &author, json!({ "title": "U", "content": "c" })).await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&author))
        .set_json(json!({ "content": "original" }))
        .to_request();
    let (_, body) = send(&app, req).await;
    let comment_id = body["data"]["id"].as_str().unwrap().to_string();
    let comment_uri = format!("/api/v1/task/{}/comments/{}", task_id, comment_id);

    let req = test::TestRequest::patch()
        .uri(&comment_uri)
        .insert_header(bearer(&stranger))
        .set_json(json!({ "content": "defaced" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        "Forbidden: You do not have permission to update/delete this comment"
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&stranger))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["data"][0]["content"], "original");

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .insert_header(bearer(&stranger))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = test::TestRequest::patch()
        .uri(&format!(
            "/api/v1/task/{}/comments/{}",
            other_task["id"].as_str().unwrap(),
            comment_id
        ))
        .insert_header(bearer(&author))
        .set_json(json!({ "content": "wrong task" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::patch()
        .uri(&comment_uri)
        .insert_header(bearer(&author))
        .set_json(json!({ "content": "edited by author" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "edited by author");

    let req = test::TestRequest::patch()
        .uri(&comment_uri)
        .insert_header(bearer(&admin))
        .set_json(json!({ "content": "edited by admin" }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "edited by admin");

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .insert_header(bearer(&admin))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::delete()
        .uri(&comment_uri)
        .insert_header(bearer(&author))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&author))
        .set_json(json!({ "content": "second thoughts" }))
        .to_request();
    let (_, body) = send(&app, req).await;
    let own_uri = format!(
        "/api/v1/task/{}/comments/{}",
        task_id,
        body["data"]["id"].as_str().unwrap()
    );

    let req = test::TestRequest::delete()
        .uri(&own_uri)
        .insert_header(bearer(&author))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/{}/comments", task_id))
        .insert_header(bearer(&author))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[actix_rt::test]
async fn test_added_participants_are_notified() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob", "bob@test.com", "password123").await;
    let carol = register_user(&app, "Carol", "carol@test.com", "password123").await;
    let bob_id = user_id(&app, &bob).await;
    let carol_id = user_id(&app, &carol).await;

    let task = create_task(
        &app,
        &alice,
        json!({ "title": "Offsite", "content": "Plan it", "participants": [bob_id] }),
    )
    .await;
    let task_id = task["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update/{}", task_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "participants": [bob_id, carol_id] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["participants"], json!([bob_id, carol_id]));

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&carol))
        .to_request();
    let (_, body) = send(&app, req).await;
    let notes = notifications_of(&body);
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["message"], "Alice added you to the task \"Offsite\"");

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&bob))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(notifications_of(&body).is_empty(), "existing participant notified");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/task/update/{}", task_id))
        .insert_header(bearer(&alice))
        .set_json(json!({ "participants": [bob_id, carol_id], "status": "planned" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&carol))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(notifications_of(&body).len(), 1);
}

#[actix_rt::test]
async fn test_unknown_participants_are_rejected() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob", "bob@test.com", "password123").await;
    let bob_id = user_id(&app, &bob).await;
    let ghost = Uuid::new_v4();

    let req = test::TestRequest::post()
        .uri("/api/v1/task/create")
        .insert_header(bearer(&alice))
        .set_json(json!({ "title": "Haunted", "content": "c", "participants": [ghost] }))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Participant not found");

    let task = create_task(
        &app,
        &alice,
        json!({ "title": "Real", "content": "c", "participants": [bob_id] }),
    )
    .await;
    let task_uri = format!("/api/v1/task/update/{}", task["id"].as_str().unwrap());

    let req = test::TestRequest::patch()
        .uri(&task_uri)
        .insert_header(bearer(&alice))
        .set_json(json!({ "participants": [bob_id, ghost], "title": "Renamed" }))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/task/detail/{}", task["id"].as_str().unwrap()))
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert_eq!(body["task"]["title"], "Real");
    assert_eq!(body["task"]["participants"], json!([bob_id]));
    assert!(state.store.list_notifications(ghost).await.unwrap().is_empty());
}

#[actix_rt::test]
async fn test_notification_read_flags() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob", "bob@test.com", "password123").await;

    let first = create_task(&app, &alice, json!({ "title": "First", "content": "c" })).await;
    let second = create_task(&app, &alice, json!({ "title": "Second", "content": "c" })).await;
    for task in [&first, &second] {
        let req = test::TestRequest::post()
            .uri(&format!(
                "/api/v1/task/{}/comments",
                task["id"].as_str().unwrap()
            ))
            .insert_header(bearer(&bob))
            .set_json(json!({ "content": "ping" }))
            .to_request();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    let notes = notifications_of(&body);
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0]["message"], "Bob has commented on your task \"Second\"");
    let newest_id = notes[0]["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/notifications/{}/read", newest_id))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND, "read someone else's notification");

    let req = test::TestRequest::patch()
        .uri(&format!("/api/v1/notifications/{}/read", newest_id))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_read"], true);

    let req = test::TestRequest::patch()
        .uri("/api/v1/notifications/read-all")
        .insert_header(bearer(&alice))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/notifications")
        .insert_header(bearer(&alice))
        .to_request();
    let (_, body) = send(&app, req).await;
    assert!(notifications_of(&body)
        .iter()
        .all(|n| n["is_read"] == true));
}

/// Alice (member) and Bob (admin): Bob may delete Alice's task, Alice may not
/// delete another one.
#[actix_rt::test]
async fn test_member_and_admin_end_to_end() {
    let (state, _) = test_state();
    let app = test::init_service(test_app!(state)).await;
    let alice = register_user(&app, "Alice", "alice@test.com", "password123").await;
    let bob = register_user(&app, "Bob", "bob@test.com", "password123").await;
    make_admin(&state, "bob@test.com").await;

    let t = create_task(&app, &alice, json!({ "title": "T", "content": "alice's" })).await;
    let other = create_task(&app, &bob, json!({ "title": "Other", "content": "bob's" })).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/task/delete/{}", t["id"].as_str().unwrap()))
        .insert_header(bearer(&bob))
        .to_request();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["deleted"], true);

    let req = test::TestRequest::delete()
        .uri(&format!(
            "/api/v1/task/delete/{}",
            other["id"].as_str().unwrap()
        ))
        .insert_header(bearer(&alice))
        .to_request();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
