use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use db::{
    DBService,
    models::{
        project::{CreateProject, Project},
        task::{CreateTask, Task},
        team::Team,
        user::{CreateUser, User, UserRole},
    },
};
use deployment::Deployment;
use http_body_util::BodyExt;
use local_deployment::LocalDeployment;
use serde_json::{Value, json};
use server::{middleware::USER_ID_HEADER, routes};
use services::services::config::Config;
use tower::ServiceExt;
use uuid::Uuid;

struct TestApp {
    app: Router,
    deployment: LocalDeployment,
    user: User,
    team: Team,
    project: Project,
}

async fn test_app(role: UserRole) -> TestApp {
    let db = DBService::new_in_memory().await.unwrap();
    let team = Team::create(&db.pool, Uuid::new_v4(), "Platform", None)
        .await
        .unwrap();
    let user = User::create(
        &db.pool,
        &CreateUser {
            email: "Ada@Example.com".to_string(),
            name: "Ada".to_string(),
            role: Some(role),
            team_id: Some(team.id),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    let project = Project::create(
        &db.pool,
        team.id,
        &CreateProject {
            name: "Website".to_string(),
            description: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    Task::create(
        &db.pool,
        &CreateTask::from_title_description(project.id, "Design review".to_string(), None),
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let deployment = LocalDeployment::from_db(Config::default(), db);
    TestApp {
        app: routes::router(deployment.clone()),
        deployment,
        user,
        team,
        project,
    }
}

impl TestApp {
    async fn add_user(&self, name: &str, role: UserRole) -> User {
        User::create(
            &self.deployment.db().pool,
            &CreateUser {
                email: format!("{}@example.com", name.to_lowercase()),
                name: name.to_string(),
                role: Some(role),
                team_id: Some(self.team.id),
            },
            Uuid::new_v4(),
        )
        .await
        .unwrap()
    }
}

fn request(method: &str, uri: &str, user_id: Option<Uuid>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        builder = builder.header(USER_ID_HEADER, user_id.to_string());
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn command(user_id: Uuid, message: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/assistant/command")
        .header("content-type", "application/json")
        .header(USER_ID_HEADER, user_id.to_string())
        .body(Body::from(json!({ "message": message }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let t = test_app(UserRole::Admin).await;
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();

    let (status, body) = call(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn command_without_caller_is_unauthorized() {
    let t = test_app(UserRole::Admin).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/assistant/command")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "message": "hi" }).to_string()))
        .unwrap();

    let (status, body) = call(&t.app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn command_updates_task_through_api() {
    let t = test_app(UserRole::Manager).await;

    let (status, body) = call(&t.app, command(t.user.id, "Mark 'design review' as done")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["action"], "update_status");
    assert_eq!(body["data"]["data"]["status"], "done");
    assert_eq!(body["data"]["data"]["project_name"], "Website");
}

#[tokio::test]
async fn task_listing_is_team_scoped() {
    let t = test_app(UserRole::Admin).await;
    let request = Request::builder()
        .uri("/api/tasks")
        .header(USER_ID_HEADER, t.user.id.to_string())
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    let tasks = body["data"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "Design review");
}

#[tokio::test]
async fn marking_unknown_notification_is_not_found() {
    let t = test_app(UserRole::Member).await;
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/api/notifications/{}/read", Uuid::new_v4()))
        .header(USER_ID_HEADER, t.user.id.to_string())
        .body(Body::empty())
        .unwrap();

    let (status, body) = call(&t.app, request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Notification not found");

    let request = Request::builder()
        .uri("/api/notifications")
        .header(USER_ID_HEADER, t.user.id.to_string())
        .body(Body::empty())
        .unwrap();
    let (status, body) = call(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["unread_count"], 0);
}

#[tokio::test]
async fn empty_database_can_be_bootstrapped_through_the_api() {
    let db = DBService::new_in_memory().await.unwrap();
    let app = routes::router(LocalDeployment::from_db(Config::default(), db));

    let (status, body) = call(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "lead@example.com", "name": "Lena" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "ADMIN");
    let user_id: Uuid = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let (status, body) = call(
        &app,
        request("POST", "/api/projects", Some(user_id), Some(json!({ "name": "Launch" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Launch");

    let (status, body) = call(&app, command(user_id, "Create a task called Ship the beta")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["action"], "create_task");
    assert_eq!(body["data"]["data"]["title"], "Ship the beta");
    assert_eq!(body["data"]["data"]["project_name"], "Launch");

    let (_, body) = call(&app, request("GET", "/api/team", Some(user_id), None)).await;
    assert_eq!(body["data"]["name"], "Lena's Team");
    assert_eq!(body["data"]["admin_id"], user_id.to_string());

    // registering again returns the same account
    let (_, body) = call(
        &app,
        request(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({ "email": "LEAD@example.com", "name": "Lena" })),
        ),
    )
    .await;
    assert_eq!(body["data"]["id"], user_id.to_string());
}

#[tokio::test]
async fn project_writes_are_role_gated() {
    let t = test_app(UserRole::Member).await;
    let uri = format!("/api/projects/{}", t.project.id);

    let (status, body) = call(
        &t.app,
        request("POST", "/api/projects", Some(t.user.id), Some(json!({ "name": "Docs" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied. Required roles: ADMIN, MANAGER");

    let (status, _) = call(&t.app, request("DELETE", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // reads stay open to members
    let (status, body) = call(&t.app, request("GET", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Website");

    let manager = t.add_user("Mona", UserRole::Manager).await;
    let (status, body) = call(
        &t.app,
        request("PUT", &uri, Some(manager.id), Some(json!({ "description": "Marketing site" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Website");
    assert_eq!(body["data"]["description"], "Marketing site");

    let (status, _) = call(&t.app, request("DELETE", &uri, Some(manager.id), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admin_project_delete_removes_its_tasks() {
    let t = test_app(UserRole::Admin).await;
    let uri = format!("/api/projects/{}", t.project.id);

    let (status, body) = call(&t.app, request("DELETE", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Project deleted successfully");

    let (status, _) = call(&t.app, request("GET", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        Task::count_for_team(&t.deployment.db().pool, t.team.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn task_crud_broadcasts_team_events() {
    let t = test_app(UserRole::Manager).await;
    let mut events = t.deployment.events().subscribe();

    let (status, body) = call(
        &t.app,
        request(
            "POST",
            "/api/tasks",
            Some(t.user.id),
            Some(json!({ "project_id": t.project.id, "title": "  Write release notes ", "priority": "high" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Write release notes");
    assert_eq!(body["data"]["status"], "todo");
    let task_id = body["data"]["id"].as_str().unwrap().to_string();
    let uri = format!("/api/tasks/{task_id}");

    let (status, body) = call(
        &t.app,
        request("PUT", &uri, Some(t.user.id), Some(json!({ "status": "in-progress" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in-progress");
    assert_eq!(body["data"]["priority"], "high");
    assert_eq!(body["data"]["title"], "Write release notes");

    let (status, body) = call(&t.app, request("DELETE", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = call(&t.app, request("GET", &uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.payload.name())
        .collect();
    assert_eq!(names, vec!["task:created", "task:updated", "task:deleted"]);
}

#[tokio::test]
async fn task_create_rejects_foreign_project_and_blank_title() {
    let t = test_app(UserRole::Admin).await;

    let (status, body) = call(
        &t.app,
        request(
            "POST",
            "/api/tasks",
            Some(t.user.id),
            Some(json!({ "project_id": Uuid::new_v4(), "title": "Orphan" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Access denied or project not found");

    let (status, _) = call(
        &t.app,
        request(
            "POST",
            "/api/tasks",
            Some(t.user.id),
            Some(json!({ "project_id": t.project.id, "title": "   " })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn reassignment_notifies_both_sides() {
    let t = test_app(UserRole::Admin).await;
    let sam = t.add_user("Sam", UserRole::Member).await;
    let task = Task::find_first_by_title(&t.deployment.db().pool, t.team.id, "design")
        .await
        .unwrap()
        .unwrap();
    let uri = format!("/api/tasks/{}", task.id);

    let (status, body) = call(
        &t.app,
        request("PUT", &uri, Some(t.user.id), Some(json!({ "assigned_to": sam.id }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["assignee_name"], "Sam");

    let (status, body) = call(
        &t.app,
        request("PUT", &uri, Some(t.user.id), Some(json!({ "assigned_to": null }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["assignee_name"].is_null());

    let (_, body) = call(&t.app, request("GET", "/api/notifications", Some(sam.id), None)).await;
    assert_eq!(body["data"]["unread_count"], 2);
    let titles: Vec<_> = body["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert!(titles.contains(&"Task Assigned to You".to_string()));
    assert!(titles.contains(&"Task Unassigned".to_string()));

    // members only see their own tasks, and may not delete
    let (_, body) = call(&t.app, request("GET", "/api/tasks", Some(sam.id), None)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
    let (status, body) = call(&t.app, request("DELETE", &uri, Some(sam.id), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Members are not allowed to delete tasks");
}

#[tokio::test]
async fn team_membership_lifecycle() {
    let t = test_app(UserRole::Admin).await;
    Team::set_admin(&t.deployment.db().pool, t.team.id, t.user.id)
        .await
        .unwrap();
    let mut events = t.deployment.events().subscribe();

    let (status, body) = call(
        &t.app,
        request(
            "POST",
            "/api/team/members",
            Some(t.user.id),
            Some(json!({ "email": "sam@example.com", "role": "MANAGER" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "sam");
    assert_eq!(body["data"]["role"], "MANAGER");
    let sam_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &t.app,
        request(
            "POST",
            "/api/team/members",
            Some(t.user.id),
            Some(json!({ "email": "SAM@example.com" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "User is already a member of this team");

    let (_, body) = call(&t.app, request("GET", "/api/team/members", Some(t.user.id), None)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let member_uri = format!("/api/team/members/{sam_id}");
    let (status, body) = call(
        &t.app,
        request("PUT", &member_uri, Some(t.user.id), Some(json!({ "role": "MEMBER" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "MEMBER");

    let self_uri = format!("/api/team/members/{}", t.user.id);
    let (status, body) = call(&t.app, request("DELETE", &self_uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Cannot remove yourself from the team");

    let (status, _) = call(&t.app, request("DELETE", &member_uri, Some(t.user.id), None)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = call(&t.app, request("GET", "/api/team/members", Some(t.user.id), None)).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let names: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|e| e.payload.name())
        .collect();
    assert_eq!(
        names,
        vec!["team:member-added", "team:member-updated", "team:member-removed"]
    );
}

#[tokio::test]
async fn team_messages_are_listed_oldest_first() {
    let t = test_app(UserRole::Member).await;
    let mut events = t.deployment.events().subscribe();

    for content in ["Morning all", "Standup in 5"] {
        let (status, body) = call(
            &t.app,
            request("POST", "/api/messages", Some(t.user.id), Some(json!({ "content": content }))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["sender_name"], "Ada");
    }
    let (status, _) = call(
        &t.app,
        request("POST", "/api/messages", Some(t.user.id), Some(json!({ "content": "  " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&t.app, request("GET", "/api/messages", Some(t.user.id), None)).await;
    let contents: Vec<_> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(contents, vec!["Morning all", "Standup in 5"]);

    let (_, body) = call(&t.app, request("GET", "/api/messages?limit=1", Some(t.user.id), None)).await;
    assert_eq!(body["data"][0]["content"], "Standup in 5");

    assert_eq!(events.try_recv().unwrap().payload.name(), "message:new");
}
