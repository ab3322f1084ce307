use chrono::NaiveDate;
use choreboard_core::db::open_db_in_memory;
use choreboard_core::{
    AssignmentService, GenerationOutcome, Group, MemberRepository, Recurrence, RepoError, Role,
    ScoreBand, ScoringError, ScoringService, SqliteMemberRepository, SqliteTaskRepository,
    SqliteTemplateRepository, Task, TaskRepository, TaskStatus, TaskTemplate, TemplateRepository,
    User,
};
use rusqlite::Connection;
use uuid::Uuid;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn generated_task(conn: &Connection) -> Task {
    let members = SqliteMemberRepository::try_new(conn).unwrap();
    let templates = SqliteTemplateRepository::try_new(conn).unwrap();

    let group = Group::new("family");
    members.create_group(&group).unwrap();
    let child = User::new(group.uuid, Role::Child, "Sam");
    members.create_user(&child).unwrap();

    let mut template = TaskTemplate::new(
        group.uuid,
        "feed the cat",
        10,
        Recurrence::Daily,
        date(2024, 1, 1),
    );
    template.legacy_category_title = Some("household".to_string());
    templates.create_template(&template).unwrap();

    let service = AssignmentService::new(SqliteTaskRepository::try_new(conn).unwrap());
    match service.generate(&template, &child, date(2024, 3, 4)).unwrap() {
        GenerationOutcome::Created(task) => task,
        other => panic!("expected creation, got {other:?}"),
    }
}

#[test]
fn self_evaluation_then_validation_locks_the_task() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service.submit_self_score(task.uuid, 80).unwrap();
    assert_eq!(task.status, TaskStatus::SelfEvaluated);
    assert_eq!(task.self_score.map(|score| score.value()), Some(80));
    assert!(task.locked_at.is_none());

    let task = service
        .validate_task(task.uuid, 65, Some("good effort".to_string()))
        .unwrap();
    assert_eq!(task.status, TaskStatus::Validated);
    assert_eq!(task.parent_score.map(|score| score.value()), Some(65));
    assert_eq!(task.parent_comment.as_deref(), Some("good effort"));
    assert!(task.locked_at.is_some());
    assert_eq!(task.self_score.map(|score| score.value()), Some(80));
}

#[test]
fn validation_is_allowed_directly_from_assigned() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service.validate_task(task.uuid, 100, None).unwrap();

    assert_eq!(task.status, TaskStatus::Validated);
    assert!(task.self_score.is_none());
    assert!(task.parent_comment.is_none());
    assert!(task.locked_at.is_some());
}

#[test]
fn self_score_boundaries_follow_the_score_domain() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let err = service.submit_self_score(task.uuid, -1).unwrap_err();
    assert!(matches!(err, ScoringError::InvalidScore(_)));
    let err = service.submit_self_score(task.uuid, 101).unwrap_err();
    assert!(matches!(err, ScoringError::InvalidScore(_)));

    let task = service.submit_self_score(task.uuid, 0).unwrap();
    assert_eq!(task.self_score.map(|score| score.value()), Some(0));
    let task = service.submit_self_score(task.uuid, 100).unwrap();
    assert_eq!(task.self_score.map(|score| score.value()), Some(100));
}

#[test]
fn self_score_resubmission_overwrites_until_validated() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    service.submit_self_score(task.uuid, 30).unwrap();
    let task = service.submit_self_score(task.uuid, 70).unwrap();

    assert_eq!(task.status, TaskStatus::SelfEvaluated);
    assert_eq!(task.self_score.map(|score| score.value()), Some(70));
}

#[test]
fn validated_task_rejects_every_mutation_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let locked = service
        .validate_task(task.uuid, 55, Some("done".to_string()))
        .unwrap();

    let err = service.submit_self_score(locked.uuid, 10).unwrap_err();
    assert!(matches!(err, ScoringError::TaskLocked(id) if id == locked.uuid));
    let err = service.validate_task(locked.uuid, 99, None).unwrap_err();
    assert!(matches!(err, ScoringError::TaskLocked(id) if id == locked.uuid));

    // No field changed after the rejected mutations.
    let reloaded = service.get_task(locked.uuid).unwrap().unwrap();
    assert_eq!(reloaded, locked);
}

#[test]
fn invalid_score_during_validation_does_not_transition() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let err = service.validate_task(task.uuid, 101, None).unwrap_err();
    assert!(matches!(err, ScoringError::InvalidScore(_)));

    let reloaded = service.get_task(task.uuid).unwrap().unwrap();
    assert_eq!(reloaded.status, TaskStatus::Assigned);
    assert!(reloaded.parent_score.is_none());
    assert!(reloaded.locked_at.is_none());
}

#[test]
fn scoring_unknown_task_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let missing = Uuid::new_v4();
    let err = service.submit_self_score(missing, 50).unwrap_err();
    assert!(matches!(err, ScoringError::TaskNotFound(id) if id == missing));
}

#[test]
fn concurrent_transition_is_rejected_as_stale() {
    let conn = open_db_in_memory().unwrap();
    let created = generated_task(&conn);
    let repo = SqliteTaskRepository::try_new(&conn).unwrap();

    // Two callers load the same Assigned snapshot.
    let mut first = repo.get_task(created.uuid).unwrap().unwrap();
    let mut second = repo.get_task(created.uuid).unwrap().unwrap();

    first
        .submit_self_score(choreboard_core::Score::new(40).unwrap())
        .unwrap();
    repo.update_task_guarded(&first, TaskStatus::Assigned).unwrap();

    // The second writer still expects Assigned and must lose the race.
    second
        .validate(
            choreboard_core::Score::new(90).unwrap(),
            None,
            chrono::Utc::now(),
        )
        .unwrap();
    let err = repo
        .update_task_guarded(&second, TaskStatus::Assigned)
        .unwrap_err();

    assert!(matches!(err, RepoError::StaleStatus(id) if id == created.uuid));
    let stored = repo.get_task(created.uuid).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::SelfEvaluated);
}

#[test]
fn validated_scores_band_for_presentation() {
    let conn = open_db_in_memory().unwrap();
    let task = generated_task(&conn);
    let service = ScoringService::new(SqliteTaskRepository::try_new(&conn).unwrap());

    let task = service.validate_task(task.uuid, 76, None).unwrap();
    assert_eq!(task.parent_score.map(|score| score.band()), Some(ScoreBand::High));
}
