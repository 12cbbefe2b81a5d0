use core_test_support::backend_for;
use core_test_support::note_json;
use core_test_support::start_mock_server;
use pretty_assertions::assert_eq;
use serde_json::json;
use warden_core::BackendClient;
use warden_core::notes::NoteCategory;
use warden_core::notes::NoteComposer;
use warden_core::notes::NoteSubmission;
use warden_core::notes::SubmitStep;
use warden_core::notes::visible_notes;
use wiremock::Mock;
use wiremock::ResponseTemplate;
use wiremock::matchers::body_string;
use wiremock::matchers::header;
use wiremock::matchers::method;
use wiremock::matchers::path;

#[tokio::test]
async fn two_step_submit_posts_form() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/User/7/Note"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("Message=griefer&Category=1&Confidential=true"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let mut composer = NoteComposer::new(7, "bob");
    "griefer".chars().for_each(|c| composer.push_char(c));
    composer.toggle_confidential();

    assert_eq!(composer.press_submit(), SubmitStep::Armed);
    let SubmitStep::Send(submission) = composer.press_submit() else {
        panic!("second press should send");
    };
    assert_eq!(submission.category, NoteCategory::Admin);

    let outcome = backend.submit_note(composer.player_id(), &submission).await;
    assert_eq!(composer.finish(&outcome), "Added note to bob.");
    assert!(composer.is_closed());
    Ok(())
}

#[tokio::test]
async fn empty_acknowledgement_is_a_failure() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/User/7/Note"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let mut composer = NoteComposer::new(7, "bob");
    composer.push_char('x');
    composer.press_submit();
    let SubmitStep::Send(submission) = composer.press_submit() else {
        panic!("second press should send");
    };

    let outcome = backend.submit_note(7, &submission).await;
    assert_eq!(outcome.as_ref().ok(), Some(&false));
    assert_eq!(composer.finish(&outcome), "Failed to add note.");
    assert!(composer.is_closed());
    Ok(())
}

#[tokio::test]
async fn whitespace_acknowledgement_is_a_success() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("POST"))
        .and(path("/User/7/Note"))
        .respond_with(ResponseTemplate::new(200).set_body_string("\n"))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let submission = NoteSubmission {
        message: "x".to_string(),
        category: NoteCategory::Admin,
        confidential: false,
    };
    assert!(backend.submit_note(7, &submission).await?);
    Ok(())
}

#[tokio::test]
async fn applied_notes_are_filtered_for_display() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/User/3/AppliedNotes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            note_json(1, "watch this one", 1),
            note_json(2, "", 2),
            note_json(3, "approved for CO", 3)
        ])))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    let notes = backend.applied_notes(3).await?;
    assert_eq!(notes.len(), 3);
    let shown: Vec<i64> = visible_notes(&notes).map(|note| note.id).collect();
    assert_eq!(shown, vec![1, 3]);
    Ok(())
}

#[tokio::test]
async fn null_applied_notes_are_empty() -> anyhow::Result<()> {
    let server = start_mock_server().await;
    Mock::given(method("GET"))
        .and(path("/User/3/AppliedNotes"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let backend = backend_for(&server)?;
    assert!(backend.applied_notes(3).await?.is_empty());
    Ok(())
}
