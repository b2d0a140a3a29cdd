use std::sync::Arc;
use std::time::Duration;

use assessment_core::model::{
    AnswerValue, AssessmentVersion, DraftAnswers, QuestionId, SessionToken,
};
use assessment_core::time::fixed_clock;
use dioxus::core::NoOpMutations;
use services::{AddressBar, DraftStore};
use tokio::time::timeout;

use super::test_harness::{
    TestGateway, YieldingRepo, descriptor, drive_dom, setup_quick_answers, setup_view_harness,
};

#[tokio::test(flavor = "current_thread")]
async fn pending_check_renders_loading_placeholder() {
    let mut harness = setup_view_harness(
        "app://assessment/?version=deep&token=abc123",
        TestGateway::Pending,
    );
    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Checking for a saved assessment"), "missing loading in {html}");
    assert!(!html.contains("Pick up where you left off"), "unexpected prompt in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn resumable_session_renders_prompt_with_progress() {
    let mut harness = setup_view_harness(
        "app://assessment/?version=deep&token=abc123",
        TestGateway::Found(descriptor("abc123", AssessmentVersion::Deep, 2, 4)),
    );
    let saved: DraftAnswers = [(QuestionId::new("c2q1"), AnswerValue::Scale(4))]
        .into_iter()
        .collect();
    harness
        .drafts
        .set(
            AssessmentVersion::Deep,
            Some(&SessionToken::parse("abc123").unwrap()),
            2,
            &saved,
        )
        .await;

    harness.rebuild();
    harness.drive_async().await;

    let html = harness.render();
    assert!(html.contains("Pick up where you left off?"), "missing prompt in {html}");
    assert!(html.contains("Part 2 of 4"), "missing progress in {html}");
    assert!(html.contains("1 answer on this part is saved."), "missing draft note in {html}");
    assert!(html.contains("Start fresh"), "missing start fresh in {html}");
    assert!(harness.address.current().as_str().contains("token=abc123"));
}

#[tokio::test(flavor = "current_thread")]
async fn unknown_token_starts_a_new_flow() {
    let mut harness = setup_view_harness(
        "app://assessment/?version=quick&token=gone",
        TestGateway::Missing,
    );
    harness.rebuild();
    for _ in 0..3 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(html.contains("Part 1 of 2"), "missing flow in {html}");
    assert!(html.contains("Statement 1"), "missing question in {html}");
    assert_eq!(
        harness.address.current().as_str(),
        "app://assessment/?version=quick&token=new1"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn fresh_visit_skips_prompt() {
    let mut harness = setup_view_harness("app://assessment/", TestGateway::Pending);
    harness.rebuild();
    for _ in 0..3 {
        harness.drive_async().await;
    }

    let html = harness.render();
    assert!(!html.contains("Pick up where you left off"), "unexpected prompt in {html}");
    assert!(html.contains("0 / 2 answered"), "missing flow in {html}");
    assert_eq!(harness.repo.len().unwrap(), 0);
}

#[tokio::test(flavor = "current_thread")]
async fn back_to_back_answers_are_all_recorded() {
    let drafts = DraftStore::new(Arc::new(YieldingRepo::default())).with_clock(fixed_clock());
    let mut dom = setup_quick_answers(drafts.clone());
    dom.rebuild_in_place();
    drive_dom(&mut dom);

    let mut panel_seen = false;
    for _ in 0..8 {
        let _ = timeout(Duration::from_millis(50), dom.wait_for_work()).await;
        dom.render_immediate(&mut NoOpMutations);
        dom.process_events();
        let html = dioxus_ssr::render(&dom);
        if panel_seen {
            assert!(html.contains("answered"), "panel dropped while busy: {html}");
            assert!(!html.contains("Checking for a saved assessment"), "{html}");
        }
        panel_seen |= html.contains("answered");
    }

    let html = dioxus_ssr::render(&dom);
    assert!(html.contains("2 / 2 answered"), "missing answers in {html}");
    let saved = drafts.get(AssessmentVersion::Quick).await.expect("draft saved");
    assert_eq!(saved.answers.len(), 2);
    assert_eq!(
        saved.answers.get(&QuestionId::new("c1q2")),
        Some(&AnswerValue::Scale(5))
    );
}
