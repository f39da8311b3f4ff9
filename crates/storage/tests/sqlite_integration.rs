use chrono::{Duration, NaiveDate};
use storage::repository::{GoalRepository, SessionReader, SessionRepository, StorageError};
use storage::sqlite::SqliteRepository;
use study_core::model::{
    ExamScope, Goal, GoalDraft, GoalId, GoalUpdate, SessionId, StudySession, UserId,
};
use study_core::time::fixed_now;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

fn build_goal(owner: &str, title: &str, minutes: i64) -> Goal {
    Goal::new(
        GoalId::generate(),
        user(owner),
        GoalDraft {
            title: title.into(),
            description: Some("practice tests".into()),
            provider: "aws".into(),
            exam: "saa".into(),
            target_score: 80,
            target_date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
        },
        fixed_now() + Duration::minutes(minutes),
    )
    .unwrap()
}

#[tokio::test]
async fn sqlite_goal_roundtrip_and_ownership() {
    let repo = connect("memdb_goal_roundtrip").await;
    let goal = build_goal("alice", "Pass SAA", 0);
    repo.create_goal(&goal).await.unwrap();

    let fetched = repo
        .find_goal(goal.id(), &user("alice"))
        .await
        .unwrap()
        .expect("goal present");
    assert_eq!(fetched, goal);

    assert!(repo.find_goal(goal.id(), &user("bob")).await.unwrap().is_none());
    assert!(matches!(
        repo.create_goal(&goal).await,
        Err(StorageError::Conflict)
    ));
}

#[tokio::test]
async fn sqlite_update_and_delete_are_conditional() {
    let repo = connect("memdb_goal_conditional").await;
    let mut goal = build_goal("alice", "Pass SAA", 0);

    assert!(matches!(
        repo.update_goal(&goal).await,
        Err(StorageError::NotFound)
    ));

    repo.create_goal(&goal).await.unwrap();
    goal.apply_update(
        GoalUpdate::default().with_current_score(85),
        fixed_now() + Duration::hours(1),
    )
    .unwrap();
    repo.update_goal(&goal).await.unwrap();

    let fetched = repo
        .find_goal(goal.id(), &user("alice"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.current_score(), 85);
    assert!(fetched.is_completed());

    assert!(matches!(
        repo.delete_goal(goal.id(), &user("bob")).await,
        Err(StorageError::NotFound)
    ));
    repo.delete_goal(goal.id(), &user("alice")).await.unwrap();
    assert!(matches!(
        repo.delete_goal(goal.id(), &user("alice")).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_lists_goals_newest_first() {
    let repo = connect("memdb_goal_listing").await;
    for (i, title) in ["first", "second", "third"].iter().enumerate() {
        let minutes = i64::try_from(i).unwrap();
        repo.create_goal(&build_goal("alice", title, minutes))
            .await
            .unwrap();
    }
    repo.create_goal(&build_goal("bob", "other", 10))
        .await
        .unwrap();

    let goals = repo.list_goals_by_user(&user("alice"), 2).await.unwrap();
    let titles: Vec<_> = goals.iter().map(Goal::title).collect();
    assert_eq!(titles, vec!["third", "second"]);
}

#[tokio::test]
async fn sqlite_session_lifecycle_persists_counts() {
    let repo = connect("memdb_sessions").await;
    let scope = ExamScope::new("aws", "saa").unwrap();

    let mut session = StudySession::start(
        SessionId::generate(),
        user("alice"),
        scope.clone(),
        10,
        fixed_now(),
    )
    .unwrap();
    repo.insert_session(&session).await.unwrap();

    for correct in [true, true, false] {
        session.record_answer(correct).unwrap();
    }
    session.complete(fixed_now() + Duration::minutes(20)).unwrap();
    repo.update_session(&session).await.unwrap();

    let fetched = repo
        .get_session(session.id(), &user("alice"))
        .await
        .unwrap()
        .expect("session present");
    assert_eq!(fetched, session);
    assert!(fetched.is_completed());
    assert_eq!(fetched.answered_questions(), 3);
    assert_eq!(fetched.correct_answers(), 2);

    let later = StudySession::start(
        SessionId::generate(),
        user("alice"),
        scope,
        5,
        fixed_now() + Duration::hours(2),
    )
    .unwrap();
    repo.insert_session(&later).await.unwrap();

    let listed = repo.list_user_sessions(&user("alice"), 1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id(), later.id());

    assert!(
        repo.list_user_sessions(&user("bob"), 10)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn sqlite_open_goals_in_scope_ignore_listing_window() {
    let repo = connect("memdb_open_goals").await;
    let open = build_goal("alice", "oldest open", 0);
    repo.create_goal(&open).await.unwrap();

    let mut done = build_goal("alice", "done", 1);
    done.record_score(95, fixed_now() + Duration::minutes(1));
    repo.create_goal(&done).await.unwrap();

    for i in 0..5 {
        let mut other = build_goal("alice", "other exam", 10 + i);
        other
            .apply_update(
                GoalUpdate {
                    exam: Some("dva".into()),
                    ..GoalUpdate::default()
                },
                fixed_now() + Duration::minutes(10 + i),
            )
            .unwrap();
        repo.create_goal(&other).await.unwrap();
    }

    let newest = repo.list_goals_by_user(&user("alice"), 3).await.unwrap();
    assert!(newest.iter().all(|g| g.id() != open.id()));

    let scope = ExamScope::new("aws", "saa").unwrap();
    let goals = repo
        .list_open_goals_in_scope(&user("alice"), &scope)
        .await
        .unwrap();
    let ids: Vec<_> = goals.iter().map(Goal::id).collect();
    assert_eq!(ids, vec![open.id()]);

    assert!(
        repo.list_open_goals_in_scope(&user("bob"), &scope)
            .await
            .unwrap()
            .is_empty()
    );
}
