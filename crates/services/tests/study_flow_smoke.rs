use chrono::Duration;
use services::{AppServices, Clock, GoalRefreshStatus, NewSession};
use study_core::model::{GoalDraft, GoalUpdate, UserId};
use study_core::time::fixed_now;

fn draft(target_score: u8) -> GoalDraft {
    GoalDraft {
        title: "Pass SAA".into(),
        description: Some("two practice exams a week".into()),
        provider: "aws".into(),
        exam: "saa".into(),
        target_score,
        target_date: (fixed_now() + Duration::days(40)).date_naive(),
    }
}

async fn finish_session(app: &AppServices, user: &UserId, correct: u32, total: u32) {
    let sessions = app.sessions();
    let session = sessions
        .start_session(
            user,
            NewSession {
                provider: "aws".into(),
                exam: "saa".into(),
                total_questions: total,
            },
        )
        .await
        .unwrap();
    for i in 0..total {
        sessions
            .record_answer(session.id(), user, i < correct)
            .await
            .unwrap();
    }
    sessions
        .complete_session(session.id(), user)
        .await
        .unwrap()
        .expect("session exists");
}

#[tokio::test]
async fn sqlite_study_flow_completes_goal() {
    let app = AppServices::new_sqlite(
        "sqlite:file:services_study_flow?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
    )
    .await
    .unwrap();
    let user = UserId::new("alice").unwrap();
    let goals = app.goals();

    let goal = goals.create_goal(&user, draft(75)).await.unwrap();

    finish_session(&app, &user, 6, 10).await;
    let report = goals
        .get_goal_progress(goal.id(), &user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.current_score, 60);
    assert_eq!(report.percentage, 80);
    assert!(!report.is_completed);

    finish_session(&app, &user, 10, 10).await;
    let report = goals
        .get_goal_progress(goal.id(), &user)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(report.current_score, 80);
    assert!(report.is_completed);
    assert_eq!(report.completed_sessions, 2);

    let analytics = app.analytics().user_analytics(&user).await.unwrap();
    assert_eq!(analytics.completed_sessions, 2);
    assert_eq!(analytics.accuracy, 80);
}

#[tokio::test]
async fn in_memory_refresh_and_manual_update_agree() {
    let app = AppServices::in_memory(Clock::fixed(fixed_now()));
    let user = UserId::new("bob").unwrap();
    let goals = app.goals();

    let goal = goals.create_goal(&user, draft(90)).await.unwrap();
    finish_session(&app, &user, 7, 10).await;

    let refresh = goals
        .update_goal_progress(&user, goal.scope())
        .await
        .unwrap();
    assert_eq!(refresh.current_score, 70);
    assert_eq!(
        refresh.outcomes[0].status,
        GoalRefreshStatus::Updated { completed: false }
    );

    let updated = goals
        .update_goal(goal.id(), &user, GoalUpdate::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.current_score(), refresh.current_score);

    let list = goals.list_goals(&user, 20).await.unwrap();
    assert_eq!((list.total, list.active, list.completed), (1, 1, 0));
}
