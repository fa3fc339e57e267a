use super::*;
use crate::state::form::ErrorKey;
use crate::state::session::{MemorySession, SessionError};
use crate::util::validate::{PASSWORD_TOO_SHORT, USERNAME_INVALID_CHARS};
use async_trait::async_trait;
use std::cell::RefCell;
use std::time::Duration;

// =========================================================================
// Mocks
// =========================================================================

struct MockBackend {
    replies: RefCell<Vec<Result<SubmissionResult, ApiError>>>,
    calls: RefCell<Vec<(Mode, FormFields)>>,
}

impl MockBackend {
    fn replying(reply: Result<SubmissionResult, ApiError>) -> Self {
        Self { replies: RefCell::new(vec![reply]), calls: RefCell::new(Vec::new()) }
    }

    fn accepting(user_id: &str, profile_completed: bool) -> Self {
        Self::replying(Ok(SubmissionResult::Accepted { user_id: user_id.to_owned(), profile_completed }))
    }

    fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

#[async_trait(?Send)]
impl AuthBackend for MockBackend {
    async fn authenticate(&self, mode: Mode, fields: &FormFields) -> Result<SubmissionResult, ApiError> {
        self.calls.borrow_mut().push((mode, fields.clone()));
        let mut replies = self.replies.borrow_mut();
        if replies.is_empty() {
            Err(ApiError::Transport("no scripted reply".to_owned()))
        } else {
            replies.remove(0)
        }
    }
}

#[derive(Default)]
struct RecordingNavigator {
    visits: Vec<(String, Option<NavState>)>,
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, path: &str, state: Option<&NavState>) {
        self.visits.push((path.to_owned(), state.cloned()));
    }
}

struct FailingSession;

impl SessionStore for FailingSession {
    fn user_id(&self) -> Option<String> {
        None
    }

    fn set_user_id(&mut self, _user_id: &str) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("disk full".to_owned()))
    }
}

/// Backend whose request never resolves.
struct StalledBackend;

#[async_trait(?Send)]
impl AuthBackend for StalledBackend {
    async fn authenticate(&self, _mode: Mode, _fields: &FormFields) -> Result<SubmissionResult, ApiError> {
        std::future::pending().await
    }
}

type TestController = AuthController<MockBackend, MemorySession, RecordingNavigator>;

fn controller(mode: Mode, backend: MockBackend) -> TestController {
    AuthController::with_mode(mode, backend, MemorySession::new(), RecordingNavigator::default())
}

fn fill_login(c: &mut TestController) {
    c.set_field(Field::Username, "alice");
    c.set_field(Field::Password, "secret1");
}

fn fill_signup(c: &mut TestController) {
    fill_login(c);
    c.set_field(Field::ConfirmPassword, "secret1");
    c.set_field(Field::Email, "a@b.com");
}

fn user(id: &str) -> Option<NavState> {
    Some(NavState { user_id: id.to_owned() })
}

// =========================================================================
// destination
// =========================================================================

#[test]
fn destination_login_complete_goes_main_without_payload() {
    assert_eq!(destination(Mode::Login, "u1", true), (Route::Main, None));
}

#[test]
fn destination_login_incomplete_goes_questions_with_user() {
    assert_eq!(destination(Mode::Login, "u2", false), (Route::Questions, user("u2")));
}

#[test]
fn destination_signup_always_goes_questions() {
    assert_eq!(destination(Mode::Signup, "u3", false), (Route::Questions, user("u3")));
    assert_eq!(destination(Mode::Signup, "u3", true), (Route::Questions, user("u3")));
}

// =========================================================================
// validation gate
// =========================================================================

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    c.set_field(Field::Username, "bob!");
    c.set_field(Field::Password, "123");

    assert_eq!(c.submit().await, SubmitOutcome::Invalid);

    assert_eq!(c.backend().call_count(), 0);
    assert_eq!(c.form().errors().get(Field::Username), Some(USERNAME_INVALID_CHARS));
    assert_eq!(c.form().errors().get(Field::Password), Some(PASSWORD_TOO_SHORT));
    assert!(!c.form().is_loading());
    assert!(c.navigator().visits.is_empty());
    assert_eq!(c.session().user_id(), None);
}

#[tokio::test]
async fn resubmitting_recomputes_errors_wholesale() {
    let mut c = controller(Mode::Login, MockBackend::replying(Ok(SubmissionResult::Rejected { error: None })));
    assert_eq!(c.submit().await, SubmitOutcome::Invalid);
    assert!(c.form().is_invalid(Field::Username));

    fill_login(&mut c);
    assert_eq!(c.submit().await, SubmitOutcome::Rejected { message: AUTH_FAILED_MESSAGE.to_owned() });
    assert!(!c.form().is_invalid(Field::Username));
    assert!(!c.form().is_invalid(Field::Password));
}

// =========================================================================
// success paths
// =========================================================================

#[tokio::test]
async fn login_with_completed_profile_navigates_to_main() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    fill_login(&mut c);

    let outcome = c.submit().await;

    assert_eq!(outcome, SubmitOutcome::Navigated { route: Route::Main, user_id: "u1".to_owned() });
    assert_eq!(c.session().user_id(), Some("u1".to_owned()));
    assert_eq!(c.navigator().visits, vec![("/nutrition".to_owned(), None)]);
    assert!(!c.form().is_loading());
}

#[tokio::test]
async fn login_with_incomplete_profile_navigates_to_questions() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u2", false));
    fill_login(&mut c);

    c.submit().await;

    assert_eq!(c.navigator().visits, vec![("/questions".to_owned(), user("u2"))]);
    assert_eq!(c.session().user_id(), Some("u2".to_owned()));
}

#[tokio::test]
async fn signup_navigates_to_questions_even_if_profile_flagged_complete() {
    let mut c = controller(Mode::Signup, MockBackend::accepting("u3", true));
    fill_signup(&mut c);

    let outcome = c.submit().await;

    assert!(outcome.is_navigated());
    assert_eq!(c.navigator().visits, vec![("/questions".to_owned(), user("u3"))]);
}

#[tokio::test]
async fn request_uses_mode_and_full_field_payload() {
    let mut c = controller(Mode::Signup, MockBackend::accepting("u3", false));
    fill_signup(&mut c);
    c.submit().await;

    let calls = c.backend().calls.borrow();
    assert_eq!(calls.len(), 1);
    let (mode, fields) = &calls[0];
    assert_eq!(*mode, Mode::Signup);
    assert_eq!(fields.username, "alice");
    assert_eq!(fields.confirm_password, "secret1");
    assert_eq!(fields.email, "a@b.com");
}

#[tokio::test]
async fn login_payload_still_carries_email_and_confirm_fields() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    fill_login(&mut c);
    c.submit().await;

    let json = serde_json::to_value(&c.backend().calls.borrow()[0].1).unwrap();
    assert_eq!(json["confirmPassword"], "");
    assert_eq!(json["email"], "");
}

#[tokio::test]
async fn successful_login_overwrites_previous_session() {
    let backend = MockBackend::accepting("new", true);
    let mut session = MemorySession::new();
    session.set_user_id("old").unwrap();
    let mut c = AuthController::new(backend, session, RecordingNavigator::default());
    fill_login(&mut c);

    c.submit().await;

    assert_eq!(c.session().user_id(), Some("new".to_owned()));
}

#[tokio::test]
async fn session_write_failure_still_navigates() {
    let mut c = AuthController::new(MockBackend::accepting("u1", false), FailingSession, RecordingNavigator::default());
    c.set_field(Field::Username, "alice");
    c.set_field(Field::Password, "secret1");

    let outcome = c.submit().await;

    assert!(outcome.is_navigated());
    assert_eq!(c.navigator().visits.len(), 1);
    assert!(!c.form().is_loading());
}

// =========================================================================
// failure paths
// =========================================================================

#[tokio::test]
async fn rejection_shows_server_message_and_stays_editable() {
    let backend = MockBackend::replying(Ok(SubmissionResult::Rejected { error: Some("bad creds".to_owned()) }));
    let mut c = controller(Mode::Login, backend);
    fill_login(&mut c);

    let outcome = c.submit().await;

    assert_eq!(outcome, SubmitOutcome::Rejected { message: "bad creds".to_owned() });
    assert_eq!(c.form().errors().get(ErrorKey::General), Some("bad creds"));
    assert!(c.navigator().visits.is_empty());
    assert_eq!(c.session().user_id(), None);
    assert!(!c.form().is_loading());
    assert!(c.set_field(Field::Password, "another1"));
}

#[tokio::test]
async fn rejection_without_message_uses_fallback() {
    let mut c = controller(Mode::Signup, MockBackend::replying(Ok(SubmissionResult::Rejected { error: None })));
    fill_signup(&mut c);

    c.submit().await;

    assert_eq!(c.form().errors().get(ErrorKey::General), Some(AUTH_FAILED_MESSAGE));
}

#[tokio::test]
async fn transport_failure_shows_network_message() {
    let backend = MockBackend::replying(Err(ApiError::Transport("connection refused".to_owned())));
    let mut c = controller(Mode::Login, backend);
    fill_login(&mut c);

    let outcome = c.submit().await;

    assert_eq!(outcome, SubmitOutcome::TransportFailed);
    assert_eq!(c.form().errors().get(ErrorKey::General), Some(NETWORK_ERROR_MESSAGE));
    assert!(c.navigator().visits.is_empty());
    assert_eq!(c.session().user_id(), None);
    assert!(!c.form().is_loading());
}

#[tokio::test]
async fn malformed_success_is_a_transport_failure() {
    let mut c = controller(Mode::Login, MockBackend::replying(Err(ApiError::MissingUserId)));
    fill_login(&mut c);
    assert_eq!(c.submit().await, SubmitOutcome::TransportFailed);
    assert_eq!(c.session().user_id(), None);
}

#[tokio::test]
async fn failures_are_not_retried() {
    let backend = MockBackend::replying(Err(ApiError::Transport("timeout".to_owned())));
    let mut c = controller(Mode::Login, backend);
    fill_login(&mut c);
    c.submit().await;
    assert_eq!(c.backend().call_count(), 1);
}

#[tokio::test]
async fn editing_after_failure_clears_general_error() {
    let backend = MockBackend::replying(Err(ApiError::Transport("down".to_owned())));
    let mut c = controller(Mode::Login, backend);
    fill_login(&mut c);
    c.submit().await;

    c.set_field(Field::Username, "alice2");

    assert!(c.form().errors().is_empty());
}

// =========================================================================
// in-flight guard
// =========================================================================

#[test]
fn begin_submit_marks_in_flight_and_blocks_input() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    fill_login(&mut c);

    let pending = c.begin_submit().unwrap();

    assert!(c.form().is_loading());
    assert_eq!(pending.mode(), Mode::Login);
    assert_eq!(pending.fields().username, "alice");
    assert!(!c.set_field(Field::Username, "mallory"));
    assert!(!c.toggle_mode());
    assert_eq!(c.form().fields().username, "alice");
    assert_eq!(c.form().mode(), Mode::Login);
    assert!(matches!(c.begin_submit(), Err(SubmitOutcome::Busy)));

    let outcome = c.finish_submit(pending, Err(ApiError::Transport("down".to_owned())));
    assert_eq!(outcome, SubmitOutcome::TransportFailed);
    assert!(!c.form().is_loading());
    assert!(c.set_field(Field::Username, "bob"));
}

#[test]
fn finish_submit_clears_in_flight_on_every_path() {
    let results = [
        Ok(SubmissionResult::Accepted { user_id: "u1".to_owned(), profile_completed: true }),
        Ok(SubmissionResult::Rejected { error: Some("no".to_owned()) }),
        Err(ApiError::Decode { status: 500, message: "eof".to_owned() }),
    ];
    for result in results {
        let mut c = controller(Mode::Login, MockBackend::accepting("unused", true));
        fill_login(&mut c);
        let pending = c.begin_submit().unwrap();
        assert!(c.form().is_loading());
        c.finish_submit(pending, result);
        assert!(!c.form().is_loading());
    }
}

#[test]
fn invalid_submit_never_enters_in_flight() {
    let mut c = controller(Mode::Signup, MockBackend::accepting("u1", false));
    fill_login(&mut c);
    c.set_field(Field::ConfirmPassword, "mismatch");

    assert!(matches!(c.begin_submit(), Err(SubmitOutcome::Invalid)));
    assert!(!c.form().is_loading());
    assert!(c.form().is_invalid(Field::ConfirmPassword));
}

#[tokio::test]
async fn dropped_submit_future_re_enables_form() {
    let mut c = AuthController::new(StalledBackend, MemorySession::new(), RecordingNavigator::default());
    c.set_field(Field::Username, "alice");
    c.set_field(Field::Password, "secret1");

    let timed_out = tokio::time::timeout(Duration::from_millis(20), c.submit()).await;

    assert!(timed_out.is_err());
    assert!(!c.form().is_loading());
    assert!(c.form().errors().is_empty());
    assert_eq!(c.session().user_id(), None);
    assert!(c.navigator().visits.is_empty());
    assert!(c.set_field(Field::Username, "bob"));
    assert!(c.toggle_mode());
    assert_eq!(c.form().mode(), Mode::Signup);
}

#[tokio::test]
async fn submit_is_accepted_again_after_dropped_request() {
    let mut c = AuthController::new(StalledBackend, MemorySession::new(), RecordingNavigator::default());
    c.set_field(Field::Username, "alice");
    c.set_field(Field::Password, "secret1");

    assert!(tokio::time::timeout(Duration::from_millis(20), c.submit()).await.is_err());

    let pending = c.begin_submit().unwrap();
    assert!(c.form().is_loading());
    c.abort_submit(pending);
    assert!(!c.form().is_loading());
}

#[test]
fn abort_submit_leaves_in_flight_without_side_effects() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    fill_login(&mut c);
    let pending = c.begin_submit().unwrap();
    assert!(!c.set_field(Field::Username, "mallory"));

    c.abort_submit(pending);

    assert!(!c.form().is_loading());
    assert!(c.form().errors().is_empty());
    assert_eq!(c.backend().call_count(), 0);
    assert_eq!(c.session().user_id(), None);
    assert!(c.navigator().visits.is_empty());
    assert!(c.set_field(Field::Username, "bob"));
    assert!(c.begin_submit().is_ok());
}

// =========================================================================
// toggle
// =========================================================================

#[test]
fn toggle_clears_fields_and_errors() {
    let mut c = controller(Mode::Login, MockBackend::accepting("u1", true));
    c.set_field(Field::Username, "al");
    assert!(matches!(c.begin_submit(), Err(SubmitOutcome::Invalid)));
    assert!(!c.form().errors().is_empty());

    assert!(c.toggle_mode());

    assert_eq!(c.form().mode(), Mode::Signup);
    assert!(c.form().fields().is_blank());
    assert!(c.form().errors().is_empty());
}
