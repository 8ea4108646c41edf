use mockito::{mock, Matcher as Match};
use prbridge::slack;
use reqwest::blocking::Client;

fn pretend_static<T>(t: &T) -> &'static T {
  unsafe { std::mem::transmute::<&T, &'static T>(t) }
}

fn mk_api(client: &'static Client) -> slack::Api {
  slack::Api::new(mockito::server_url(), "xoxb", client)
}

#[test]
pub fn message_send() {
  use slack::msg::Messages;

  let body_expected = serde_json::json!({"channel": "C1234", "text": "hello"});

  let rep = serde_json::json!({
    "ok": true,
    "channel": "C1234",
    "ts": "1503435956.000247",
  });

  let moq = mockito::mock("POST", "/chat.postMessage").match_header("authorization", Match::Exact("Bearer xoxb".into()))
                                                       .match_body(Match::Json(body_expected))
                                                       .with_status(200)
                                                       .with_header("Content-Type", "application/json")
                                                       .with_body(serde_json::to_string(&rep).unwrap())
                                                       .create();

  let client = Client::new();
  let client_ref = &client;
  let api = mk_api(pretend_static(client_ref));

  let res = api.send("C1234", "hello");

  moq.assert();

  assert_eq!(res.unwrap().id,
             slack::msg::Id { ts: "1503435956.000247".to_string(), channel: "C1234".to_string() });
}

#[test]
pub fn message_update() {
  use slack::msg::Messages;

  let body_expected = serde_json::json!({"channel": "C1234", "ts": "z1234", "text": "edited"});
  let rep = serde_json::json!({"ok": true});

  let moq = mock("POST", "/chat.update").match_header("authorization", Match::Exact("Bearer xoxb".into()))
                                        .match_body(Match::Json(body_expected))
                                        .with_status(200)
                                        .with_header("Content-Type", "application/json")
                                        .with_body(serde_json::to_string(&rep).unwrap())
                                        .create();

  let client = Client::new();
  let client_ref = &client;
  let api = mk_api(pretend_static(client_ref));

  let res = api.update("C1234", "z1234", "edited");

  moq.assert();
  assert!(res.is_ok());
}

#[test]
pub fn message_delete_tolerates_already_gone() {
  use slack::msg::Messages;

  let rep = serde_json::json!({"ok": false, "error": "message_not_found"});

  let moq = mock("POST", "/chat.delete").with_status(200)
                                        .with_header("Content-Type", "application/json")
                                        .with_body(serde_json::to_string(&rep).unwrap())
                                        .create();

  let client = Client::new();
  let client_ref = &client;
  let api = mk_api(pretend_static(client_ref));

  let err = api.delete("C1234", "z1234").unwrap_err();

  moq.assert();
  assert!(err.is_expected_noop());
}

#[test]
pub fn reaction_add() {
  use slack::reactions::Reactions;

  let body_expected = serde_json::json!({"channel": "C1234", "timestamp": "z1234", "name": "white_check_mark"});
  let rep = serde_json::json!({"ok": true});

  let moq = mock("POST", "/reactions.add").match_header("authorization", Match::Exact("Bearer xoxb".into()))
                                          .match_body(Match::Json(body_expected))
                                          .with_status(200)
                                          .with_header("Content-Type", "application/json")
                                          .with_body(serde_json::to_string(&rep).unwrap())
                                          .create();

  let client = Client::new();
  let client_ref = &client;
  let api = mk_api(pretend_static(client_ref));

  let res = api.add("C1234", "z1234", "white_check_mark");

  moq.assert();
  assert!(res.is_ok());
}

#[test]
pub fn reaction_remove_swallows_no_reaction_noop() {
  use slack::reactions::{swallow_noop, Reactions};

  let rep = serde_json::json!({"ok": false, "error": "no_reaction"});

  let moq = mock("POST", "/reactions.remove").with_status(200)
                                             .with_header("Content-Type", "application/json")
                                             .with_body(serde_json::to_string(&rep).unwrap())
                                             .create();

  let client = Client::new();
  let client_ref = &client;
  let api = mk_api(pretend_static(client_ref));

  let res = swallow_noop(api.remove("C1234", "z1234", "white_check_mark"));

  moq.assert();
  assert!(res.is_ok());
}

#[test]
pub fn authentic_request_matches_known_signature() {
  // from slack's own webhook-verification docs
  let signing_secret = "8f742231b10e8888abcd99yyyzzz85a5";
  let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
  let timestamp = "1531420618";
  let inbound_sig = "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503";

  // This fixture's timestamp is long in the past; a real-time skew check would reject it, so we
  // pass a max_age large enough to accept it and isolate the signature check.
  let max_age = std::time::Duration::from_secs(u64::MAX / 2);

  assert!(slack::request_authentic(signing_secret, max_age, body, timestamp, inbound_sig));
}
