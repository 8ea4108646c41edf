use prbridge::github::client::ClientCache;
use prbridge::github::Client;
use reqwest::blocking::Client as HttpClient;

fn pretend_static<T>(t: &T) -> &'static T {
  unsafe { std::mem::transmute::<&T, &'static T>(t) }
}

// A throwaway 2048-bit RSA key, valid only for signing the app JWT in this test.
const TEST_PRIVATE_KEY: &str = include_str!("fixtures/test_app_key.pem");

#[test]
fn list_reviews_mints_and_reuses_installation_token() {
  let token_rep = serde_json::json!({"token": "ghs_abc123"});

  let token_mock =
    mockito::mock("POST", "/app/installations/42/access_tokens").with_status(200)
                                                                 .with_header("Content-Type", "application/json")
                                                                 .with_body(serde_json::to_string(&token_rep).unwrap())
                                                                 .expect(1)
                                                                 .create();

  let reviews_rep = serde_json::json!([
    {"id": 1, "user": {"id": 9, "login": "reviewer-a"}, "state": "APPROVED"},
  ]);

  let reviews_mock = mockito::mock("GET", "/repos/o/r/pulls/5/reviews")
    .match_header("authorization", "Bearer ghs_abc123")
    .with_status(200)
    .with_header("Content-Type", "application/json")
    .with_body(serde_json::to_string(&reviews_rep).unwrap())
    .expect(2)
    .create();

  let client = HttpClient::new();
  let client_ref = pretend_static(&client);

  let cache = ClientCache::with_base_url("12345".to_string(),
                                         TEST_PRIVATE_KEY.to_string(),
                                         mockito::server_url(),
                                         client_ref);

  let first = cache.list_reviews(42, "o/r", 5).unwrap();
  assert_eq!(first.len(), 1);
  assert_eq!(first[0].user.login, "reviewer-a");

  // Second call within the token's lifetime must not re-mint.
  let second = cache.list_reviews(42, "o/r", 5).unwrap();
  assert_eq!(second.len(), 1);

  token_mock.assert();
  reviews_mock.assert();
}
