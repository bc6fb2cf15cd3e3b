//! Registration, login, tokens and profiles.

use chrono::{Duration, TimeZone, Utc};
use studystream_core::{
    account::Registration,
    clock::FixedClock,
    event::StudyEvent,
    StudyError, StudyService,
};

fn build() -> (StudyService, FixedClock) {
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap());
    let service = StudyService::build_test(Box::new(clock.clone())).expect("build test service");
    (service, clock)
}

fn registration(username: &str) -> Registration {
    Registration {
        username: username.into(),
        password: "correct horse".into(),
        grade_level: "10th Grade".into(),
        subjects: vec!["Mathematics".into(), "Science".into()],
    }
}

#[test]
fn register_returns_profile_and_working_token() {
    let (service, _) = build();
    let session = service.register(registration("ada")).unwrap();

    assert_eq!(session.user.username, "ada");
    assert_eq!(session.user.subjects, ["Mathematics", "Science"]);
    assert_eq!(session.user.total_points, 0);
    assert_eq!(session.user.current_streak, 0);
    assert_eq!(session.user.joined_date, "2024-09-02T08:00:00.000Z");

    let claims = service.authenticate(&session.token).unwrap();
    assert_eq!(claims.sub, session.user.id);
    assert_eq!(claims.username, "ada");
}

#[test]
fn duplicate_username_conflicts() {
    let (service, _) = build();
    service.register(registration("ada")).unwrap();
    let err = service.register(registration("ada")).unwrap_err();
    assert!(matches!(err, StudyError::Conflict(_)), "got {err:?}");
    assert_eq!(err.to_string(), "Username already exists");
}

#[test]
fn registration_requires_a_subject() {
    let (service, _) = build();
    let mut reg = registration("ada");
    reg.subjects.clear();
    let err = service.register(reg).unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));
}

#[test]
fn login_checks_password() {
    let (service, _) = build();
    service.register(registration("ada")).unwrap();

    let session = service.login("ada", "correct horse").unwrap();
    assert_eq!(session.user.username, "ada");

    let err = service.login("ada", "wrong").unwrap_err();
    assert!(matches!(err, StudyError::InvalidCredentials));
    let err = service.login("nobody", "correct horse").unwrap_err();
    assert!(matches!(err, StudyError::InvalidCredentials));
    let err = service.login("", "").unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));
}

#[test]
fn usernames_are_trimmed_on_register_and_login() {
    let (service, _) = build();
    let session = service.register(registration(" ada ")).unwrap();
    assert_eq!(session.user.username, "ada");

    assert!(service.login(" ada ", "correct horse").is_ok());
    assert!(service.login("ada", "correct horse").is_ok());
    let err = service.login("   ", "correct horse").unwrap_err();
    assert!(matches!(err, StudyError::Validation(_)));
}

#[test]
fn tokens_expire_after_a_week() {
    let (service, clock) = build();
    let session = service.register(registration("ada")).unwrap();

    clock.advance(Duration::days(6));
    assert!(service.authenticate(&session.token).is_ok());

    clock.advance(Duration::days(2));
    let err = service.authenticate(&session.token).unwrap_err();
    assert!(matches!(err, StudyError::InvalidToken(_)));
}

#[test]
fn registration_is_logged() {
    let (service, _) = build();
    let session = service.register(registration("ada")).unwrap();
    let events = service.activity(&session.user.id, 10).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].event, StudyEvent::UserRegistered { username: "ada".into() });
}

#[test]
fn unknown_profile_is_not_found() {
    let (service, _) = build();
    let err = service.profile("missing").unwrap_err();
    assert_eq!(err.to_string(), "User not found");
}
