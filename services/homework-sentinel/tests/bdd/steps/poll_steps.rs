//! BDD step definitions for status change and error reporting features

use cucumber::{given, then, when};

use homework_sentinel::poll_loop::CycleOutcome;
use homework_sentinel::verdict::status_change_message;

use crate::world::HomeworkWorld;

fn canned_payload(name: &str) -> String {
    match name {
        "missing homeworks" => r#"{"current_date": 1700000000}"#,
        "homeworks not list" => r#"{"homeworks": "hw1"}"#,
        "not json" => "<html>502 Bad Gateway</html>",
        "api error" => r#"{"code": "not_authenticated", "message": "no credentials"}"#,
        other => panic!("Unknown payload: {}", other),
    }
    .to_string()
}

#[given(expr = "the status API will return {string} with status {string} updated at {int}")]
fn api_returns_record(world: &mut HomeworkWorld, name: String, status: String, updated_at: i64) {
    world.api.push_body(format!(
        r#"{{"homeworks":[{{"homework_name":"{}","status":"{}","updated_at":{}}}],"current_date":{}}}"#,
        name, status, updated_at, updated_at
    ));
}

#[given(expr = "the status API will return the {string} payload")]
fn api_returns_payload(world: &mut HomeworkWorld, payload: String) {
    world.api.push_body(canned_payload(&payload));
}

#[given(expr = "the status API will be unreachable with {string}")]
fn api_unreachable(world: &mut HomeworkWorld, detail: String) {
    world.api.push_failure(&detail);
}

#[given(expr = "the status API will answer with HTTP status {int}")]
fn api_http_status(world: &mut HomeworkWorld, status: u16) {
    world.api.push_status(status);
}

#[given("the chat is offline")]
fn chat_offline(world: &mut HomeworkWorld) {
    world.chat.set_offline(true);
}

#[given("the chat is back online")]
fn chat_online(world: &mut HomeworkWorld) {
    world.chat.set_offline(false);
}

#[when("a poll cycle runs")]
async fn run_one_cycle(world: &mut HomeworkWorld) {
    let outcome = world.poll_loop().run_cycle().await;
    world.last_outcome = Some(outcome);
}

#[when(expr = "{int} poll cycles run")]
async fn run_cycles(world: &mut HomeworkWorld, count: u32) {
    for _ in 0..count {
        let outcome = world.poll_loop().run_cycle().await;
        world.last_outcome = Some(outcome);
    }
}

#[then(expr = "the chat should have received {int} message(s)")]
fn chat_received(world: &mut HomeworkWorld, count: usize) {
    assert_eq!(world.chat.delivered().len(), count, "{:?}", world.chat.delivered());
}

#[then(expr = "the last message should be the status change of {string} to {string}")]
fn last_message_is_change(world: &mut HomeworkWorld, name: String, verdict: String) {
    let delivered = world.chat.delivered();
    let last = delivered.last().expect("no message delivered");
    assert_eq!(last, &status_change_message(&name, &verdict));
}

#[then(expr = "the last message should contain {string}")]
fn last_message_contains(world: &mut HomeworkWorld, text: String) {
    let delivered = world.chat.delivered();
    let last = delivered.last().expect("no message delivered");
    assert!(last.contains(&text), "{last}");
}

#[then(expr = "the tracker should hold {string} for {string}")]
fn tracker_holds(world: &mut HomeworkWorld, status: String, name: String) {
    assert_eq!(
        world.poll_loop().tracker().last_status(&name),
        Some(status.as_str())
    );
}

#[then(expr = "the tracker should not hold {string}")]
fn tracker_does_not_hold(world: &mut HomeworkWorld, name: String) {
    assert_eq!(world.poll_loop().tracker().last_status(&name), None);
}

#[then(expr = "the next poll should ask for records since {int}")]
fn next_poll_since(world: &mut HomeworkWorld, since: i64) {
    assert_eq!(world.poll_loop().last_timestamp(), since);
}

#[then("the cycle should have backed off")]
fn cycle_backed_off(world: &mut HomeworkWorld) {
    let outcome = world.last_outcome.as_ref().expect("no cycle has run");
    assert!(
        matches!(outcome, CycleOutcome::Backoff { .. }),
        "{outcome:?}"
    );
}
