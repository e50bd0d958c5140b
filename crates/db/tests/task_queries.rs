use db::{
    DBService,
    models::{
        project::{CreateProject, Project},
        task::{CreateTask, Task, TaskFilter, TaskOrder, TaskPriority, TaskStatus},
        team::Team,
        user::{CreateUser, User, UserRole},
    },
};
use uuid::Uuid;

async fn seed_team(db: &DBService, name: &str) -> (Team, Project) {
    let team = Team::create(&db.pool, Uuid::new_v4(), name, None).await.unwrap();
    let project = Project::create(
        &db.pool,
        team.id,
        &CreateProject {
            name: format!("{name} board"),
            description: None,
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();
    (team, project)
}

async fn add_task(db: &DBService, project: &Project, title: &str, priority: TaskPriority) -> Task {
    let mut data = CreateTask::from_title_description(project.id, title.to_string(), None);
    data.priority = Some(priority);
    Task::create(&db.pool, &data, Uuid::new_v4()).await.unwrap()
}

#[tokio::test]
async fn title_lookup_is_case_insensitive_and_team_scoped() {
    let db = DBService::new_in_memory().await.unwrap();
    let (team_a, project_a) = seed_team(&db, "Alpha").await;
    let (team_b, project_b) = seed_team(&db, "Beta").await;

    add_task(&db, &project_a, "Fix Login Page", TaskPriority::Medium).await;
    add_task(&db, &project_b, "Fix login api", TaskPriority::Medium).await;

    let found = Task::find_first_by_title(&db.pool, team_a.id, "fix login")
        .await
        .unwrap()
        .expect("task in team A");
    assert_eq!(found.title, "Fix Login Page");

    let found = Task::find_first_by_title(&db.pool, team_b.id, "LOGIN")
        .await
        .unwrap()
        .expect("task in team B");
    assert_eq!(found.title, "Fix login api");
}

#[tokio::test]
async fn first_match_follows_insertion_order() {
    let db = DBService::new_in_memory().await.unwrap();
    let (team, project) = seed_team(&db, "Alpha").await;

    add_task(&db, &project, "Write docs for API", TaskPriority::Low).await;
    add_task(&db, &project, "Write docs for CLI", TaskPriority::High).await;

    let found = Task::find_first_by_title(&db.pool, team.id, "write docs")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.title, "Write docs for API");
}

#[tokio::test]
async fn wildcard_characters_in_fragment_are_literal() {
    let db = DBService::new_in_memory().await.unwrap();
    let (team, project) = seed_team(&db, "Alpha").await;

    add_task(&db, &project, "Reach 100% coverage", TaskPriority::Medium).await;
    add_task(&db, &project, "Rename user_id column", TaskPriority::Medium).await;

    let none = Task::find_first_by_title(&db.pool, team.id, "100_")
        .await
        .unwrap();
    assert!(none.is_none());

    let hit = Task::find_first_by_title(&db.pool, team.id, "user_id")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hit.title, "Rename user_id column");
}

#[tokio::test]
async fn filtered_listing_orders_by_priority_and_scopes_assignee() {
    let db = DBService::new_in_memory().await.unwrap();
    let (team, project) = seed_team(&db, "Alpha").await;
    let member = User::create(
        &db.pool,
        &CreateUser {
            email: "sam@example.com".into(),
            name: "Sam".into(),
            role: Some(UserRole::Member),
            team_id: Some(team.id),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    add_task(&db, &project, "low one", TaskPriority::Low).await;
    let high = add_task(&db, &project, "high one", TaskPriority::High).await;
    add_task(&db, &project, "medium one", TaskPriority::Medium).await;
    Task::update_assignee(&db.pool, high.id, Some(member.id)).await.unwrap();

    let all = Task::find_filtered(
        &db.pool,
        &TaskFilter::for_team(team.id),
        TaskOrder::PriorityThenNewest,
        None,
    )
    .await
    .unwrap();
    let titles: Vec<_> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["high one", "medium one", "low one"]);

    let mine = Task::find_filtered(
        &db.pool,
        &TaskFilter::for_team(team.id).assigned_to(Some(member.id)),
        TaskOrder::NewestFirst,
        None,
    )
    .await
    .unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].assignee_name.as_deref(), Some("Sam"));
    assert_eq!(mine[0].project_name, "Alpha board");
}

#[tokio::test]
async fn status_update_returns_new_row() {
    let db = DBService::new_in_memory().await.unwrap();
    let (_, project) = seed_team(&db, "Alpha").await;
    let task = add_task(&db, &project, "Ship it", TaskPriority::Medium).await;
    assert_eq!(task.status, TaskStatus::Todo);

    let updated = Task::update_status(&db.pool, task.id, TaskStatus::Done).await.unwrap();
    assert_eq!(updated.status, TaskStatus::Done);
    assert_eq!(updated.id, task.id);

    let deleted = Task::delete(&db.pool, task.id).await.unwrap();
    assert_eq!(deleted, 1);
    assert!(Task::find_by_id(&db.pool, task.id).await.unwrap().is_none());
}

#[tokio::test]
async fn lookups_fold_non_ascii_case() {
    let db = DBService::new_in_memory().await.unwrap();
    let (team, project) = seed_team(&db, "Alpha").await;
    add_task(&db, &project, "Été planning", TaskPriority::Medium).await;
    User::create(
        &db.pool,
        &CreateUser {
            email: "elodie@example.com".into(),
            name: "Élodie Martin".into(),
            role: None,
            team_id: Some(team.id),
        },
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    let found = Task::find_first_by_title(&db.pool, team.id, "ÉTÉ PLANNING")
        .await
        .unwrap()
        .expect("accented title");
    assert_eq!(found.title, "Été planning");

    let hits = Task::find_filtered(
        &db.pool,
        &TaskFilter::for_team(team.id).matching("été"),
        TaskOrder::Stored,
        Some(10),
    )
    .await
    .unwrap();
    assert_eq!(hits.len(), 1);

    let user = User::find_first_in_team_by_name(&db.pool, team.id, "élodie")
        .await
        .unwrap()
        .expect("accented name");
    assert_eq!(user.name, "Élodie Martin");
}
