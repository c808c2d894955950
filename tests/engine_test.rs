use async_trait::async_trait;
use inner_companion::profile::DEFAULT_USER_ID;
use inner_companion::templates::SAFETY_SCRIPT;
use inner_companion::{
    Classifier, CompanionEngine, EmotionTag, GenerationError, GenerationRequest, JsonProfileStore,
    Phase, ProfileStore, ReplySource, ResponseGenerator, ResponseTemplates, TextGenerator,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Backend double that replays canned results and records requests
#[derive(Default)]
struct ScriptState {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

struct ScriptedBackend(Arc<ScriptState>);

#[async_trait]
impl TextGenerator for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.0.requests.lock().unwrap().push(request.clone());
        self.0
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Other("script exhausted".to_string())))
    }
}

fn temp_store(dir: &tempfile::TempDir) -> JsonProfileStore {
    JsonProfileStore::new(dir.path().join("user_memory.json"))
}

fn offline_engine(dir: &tempfile::TempDir) -> CompanionEngine<JsonProfileStore> {
    CompanionEngine::new(Classifier::default(), ResponseGenerator::offline(), temp_store(dir))
}

fn scripted_engine(
    dir: &tempfile::TempDir,
    replies: Vec<Result<String, GenerationError>>,
) -> (CompanionEngine<JsonProfileStore>, Arc<ScriptState>) {
    let state = Arc::new(ScriptState::default());
    state.replies.lock().unwrap().extend(replies);
    let generator = ResponseGenerator::new(
        Some(Box::new(ScriptedBackend(state.clone()))),
        ResponseTemplates::default(),
    );
    let engine = CompanionEngine::new(Classifier::default(), generator, temp_store(dir));
    (engine, state)
}

#[tokio::test]
async fn first_lonely_turn_offline() {
    let dir = tempfile::tempdir().unwrap();
    let engine = offline_engine(&dir);

    let reply = engine
        .handle_turn("I feel so lonely and left out", "First-time user.", 1)
        .await
        .unwrap();

    assert!(reply.text.contains("I hear the quiet ache of loneliness in your words."));
    assert!(!reply.text.contains("[EMOTION="));
    assert_eq!(reply.emotion, Some(EmotionTag::Lonely));
    assert_eq!(reply.phase, Phase::Understanding);
    assert_eq!(reply.source, ReplySource::Template);

    let profile = engine.store().load(DEFAULT_USER_ID).unwrap();
    assert_eq!(
        profile.contexts,
        vec![
            "User: I feel so lonely and left out".to_string(),
            format!("Companion: {}", reply.text),
        ]
    );
    assert_eq!(profile.emotion_log.len(), 1);
    assert_eq!(profile.emotion_log[0].emotion, "lonely");
}

#[tokio::test]
async fn blackmail_gets_safety_script_on_any_turn() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(&dir, Vec::new());

    for turn in [1, 2, 5, 9] {
        let reply = engine
            .handle_turn("he is threatening to leak my photos, please comfort me, bye", "", turn)
            .await
            .unwrap();
        assert_eq!(reply.text, SAFETY_SCRIPT);
        assert_eq!(reply.emotion, Some(EmotionTag::Sad));
        assert_eq!(reply.phase, Phase::Safety);
    }

    // The backend is never consulted for safety turns
    assert!(state.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn later_turns_move_to_opinion() {
    let dir = tempfile::tempdir().unwrap();
    let engine = offline_engine(&dir);

    let reply = engine
        .handle_turn("My roommate keeps eating my food", "", 4)
        .await
        .unwrap();

    assert_eq!(reply.phase, Phase::Opinion);
    assert!(reply.text.starts_with(
        "From what you told me, it seems that this situation is about My roommate keeps eating my food."
    ));
    assert_eq!(reply.emotion, Some(EmotionTag::Default));
}

#[tokio::test]
async fn distress_switches_to_comfort_from_third_turn() {
    let dir = tempfile::tempdir().unwrap();
    let engine = offline_engine(&dir);

    let early = engine.handle_turn("I'm so overwhelmed", "", 2).await.unwrap();
    assert_eq!(early.phase, Phase::Understanding);

    let later = engine.handle_turn("I'm so overwhelmed", "", 3).await.unwrap();
    assert_eq!(later.phase, Phase::OpinionComfort);
}

#[tokio::test]
async fn close_request_wins_over_comfort() {
    let dir = tempfile::tempdir().unwrap();
    let engine = offline_engine(&dir);

    let reply = engine
        .handle_turn("cheer me up before I go, goodnight", "", 6)
        .await
        .unwrap();
    assert_eq!(reply.phase, Phase::Closing);
}

#[tokio::test]
async fn generative_reply_is_used_and_history_is_passed() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(
        &dir,
        vec![
            Ok("That sounds hard.\n\nWhat happened next?\n\n[EMOTION=anxious]".to_string()),
            Ok("I'm glad you shared that.".to_string()),
        ],
    );

    let first = engine.handle_turn("I have a big interview", "Name: Sam.", 1).await.unwrap();
    assert_eq!(first.text, "That sounds hard.\n\nWhat happened next?");
    assert_eq!(first.emotion, Some(EmotionTag::Anxious));
    assert_eq!(first.source, ReplySource::Generative);

    // No marker: text kept whole, emotion absent, nothing logged
    let second = engine.handle_turn("It went fine actually", "Name: Sam.", 2).await.unwrap();
    assert_eq!(second.text, "I'm glad you shared that.");
    assert_eq!(second.emotion, None);

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].history.is_empty());
    assert_eq!(requests[0].summary, "Name: Sam.");
    assert_eq!(
        requests[1].history,
        vec![
            "User: I have a big interview".to_string(),
            "Companion: That sounds hard.\n\nWhat happened next?".to_string(),
        ]
    );

    let profile = engine.store().load(DEFAULT_USER_ID).unwrap();
    assert_eq!(profile.contexts.len(), 4);
    assert_eq!(profile.emotion_log.len(), 1);
}

#[tokio::test]
async fn bad_markers_keep_text_without_emotion() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(
        &dir,
        vec![
            Ok("That sounds heavy.\n\n[EMOTION=melancholy]".to_string()),
            Ok("I'm still here with you.\n\n[EMOTION=sad".to_string()),
        ],
    );

    let unknown = engine.handle_turn("I feel so lonely", "", 1).await.unwrap();
    assert_eq!(unknown.text, "That sounds heavy.");
    assert_eq!(unknown.emotion, None);
    assert_eq!(unknown.source, ReplySource::Generative);

    let unclosed = engine.handle_turn("it keeps going", "", 2).await.unwrap();
    assert_eq!(unclosed.text, "I'm still here with you.");
    assert_eq!(unclosed.emotion, None);
    assert_eq!(unclosed.source, ReplySource::Generative);

    // One backend call per turn, no retry on a bad marker
    assert_eq!(state.requests.lock().unwrap().len(), 2);

    let profile = engine.store().load(DEFAULT_USER_ID).unwrap();
    assert_eq!(profile.contexts.len(), 4);
    assert!(profile.emotion_log.is_empty());
}

#[tokio::test]
async fn history_is_limited_to_last_ten_entries() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(&dir, vec![Ok("ok\n\n[EMOTION=default]".to_string())]);

    let mut profile = engine.store().load(DEFAULT_USER_ID).unwrap();
    for i in 0..14 {
        profile.add_context(&format!("note {}", i));
    }
    engine.store().save(DEFAULT_USER_ID, &profile).unwrap();

    engine.handle_turn("hello", "", 3).await.unwrap();

    let requests = state.requests.lock().unwrap();
    assert_eq!(requests[0].history.len(), 10);
    assert_eq!(requests[0].history[0], "note 4");
}

#[tokio::test]
async fn rate_limit_falls_back_without_retry() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(
        &dir,
        vec![
            Err(GenerationError::RateLimited("429".to_string())),
            Ok("should never be used".to_string()),
        ],
    );

    let reply = engine.handle_turn("I'm so tired", "", 1).await.unwrap();
    assert_eq!(reply.source, ReplySource::Template);
    assert!(reply.text.starts_with("Your exhaustion is so valid after everything."));
    assert_eq!(reply.emotion, Some(EmotionTag::Tired));
    assert_eq!(state.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn repeated_failures_fall_back_after_two_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let (engine, state) = scripted_engine(
        &dir,
        vec![
            Err(GenerationError::Timeout),
            Err(GenerationError::Other("connection reset".to_string())),
        ],
    );

    let reply = engine
        .handle_turn("I failed my exam and my parents shouted at me", "", 1)
        .await
        .unwrap();
    assert_eq!(reply.source, ReplySource::Template);
    assert_eq!(reply.emotion, Some(EmotionTag::Sad));
    assert_eq!(state.requests.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn corrupt_profile_file_fails_the_turn() {
    let dir = tempfile::tempdir().unwrap();
    let engine = offline_engine(&dir);
    std::fs::write(dir.path().join("user_memory.json"), "{ broken").unwrap();

    assert!(engine.handle_turn("hello", "", 1).await.is_err());
}
