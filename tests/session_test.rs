use inner_companion::profile::DEFAULT_USER_ID;
use inner_companion::safety::CRISIS_MESSAGE;
use inner_companion::{
    Classifier, CompanionEngine, EmotionTag, JsonProfileStore, ProfileStore, ResponseGenerator,
    Session, Speaker,
};

fn offline_session(dir: &tempfile::TempDir) -> Session<JsonProfileStore> {
    let store = JsonProfileStore::new(dir.path().join("memory").join("user_memory.json"));
    Session::new(CompanionEngine::new(
        Classifier::default(),
        ResponseGenerator::offline(),
        store,
    ))
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = offline_session(&dir);

    assert_eq!(session.send("   ").await.unwrap(), None);
    assert_eq!(session.turn_count(), 0);
    assert!(session.transcript().is_empty());
}

#[tokio::test]
async fn turns_advance_through_phases() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = offline_session(&dir);

    let first = session.send("I'm worried about tomorrow").await.unwrap().unwrap();
    assert!(first.text.ends_with('?'));
    assert_eq!(first.emotion, Some(EmotionTag::Anxious));

    session.send("It's a job interview").await.unwrap();
    let third = session.send("I keep thinking I'll mess it up").await.unwrap().unwrap();
    assert!(third.text.starts_with("From what you told me"));

    assert_eq!(session.turn_count(), 3);
    assert_eq!(session.transcript().len(), 6);
    assert_eq!(session.transcript()[0], (Speaker::User, "I'm worried about tomorrow".to_string()));
    assert_eq!(session.transcript()[1].0, Speaker::Companion);
}

#[tokio::test]
async fn crisis_shortcut_bypasses_engine() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = offline_session(&dir);

    let reply = session.send("I can't go on anymore").await.unwrap().unwrap();
    assert_eq!(reply.text, CRISIS_MESSAGE);
    assert_eq!(reply.emotion, Some(EmotionTag::Crisis));
    assert_eq!(session.turn_count(), 1);

    // Nothing is persisted for the shortcut
    let profile = session.engine().store().load(DEFAULT_USER_ID).unwrap();
    assert!(profile.contexts.is_empty());
    assert!(profile.emotion_log.is_empty());
}

#[tokio::test]
async fn remembered_details_feed_the_summary() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = offline_session(&dir);

    assert_eq!(session.user_summary().unwrap(), "First-time user.");

    session
        .remember(Some("Alex".to_string()), Some("24".to_string()), Some("exam stress".to_string()))
        .unwrap();
    session.remember(None, None, Some("exam stress".to_string())).unwrap();
    session.send("hi there").await.unwrap();

    assert_eq!(
        session.user_summary().unwrap(),
        "Name: Alex. Age: 24. Background: exam stress."
    );

    let profile = session.engine().store().load(DEFAULT_USER_ID).unwrap();
    assert_eq!(profile.contexts.iter().filter(|c| *c == "exam stress").count(), 1);
}
