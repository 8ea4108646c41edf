//! # prbridge
//! A stateful bridge between GitHub pull requests and Slack: posts one notification message per
//! PR per subscribed channel and keeps it annotated with review-state and terminal reactions over
//! the PR's lifetime.

#![cfg_attr(not(test), forbid(missing_debug_implementations, unreachable_pub, unsafe_code))]
#![cfg_attr(not(test), deny(missing_copy_implementations))]

use std::sync::Arc;

use warp::Filter;

use prbridge::{config, dispatcher, State};

type StateFilter = warp::filters::BoxedFilter<(Arc<State>,)>;

fn create_state_filter() -> StateFilter {
  // A note on this filter and dependency injection:
  //
  // Context: it's important to isolate IO (the document store, outbound Slack/GitHub calls) from
  // handler logic so it can be replaced with fakes during testing.
  //
  // Passing dependencies into `filter` closures is difficult since filter closures need to be
  // independent of local state and re-runnable. The solution is a filter that clones an `Arc`
  // to a STATE static, so any number of filters can access (but not mutate) application state
  // while staying isolated from the implementors of the traits.
  warp::filters::any::any().map(|| prbridge::STATE.clone()).boxed()
}

/// Entry point
#[tokio::main]
pub async fn main() {
  config::bootstrap();

  let bind_addr: std::net::SocketAddr =
    prbridge::STATE.config.bind_addr.parse().expect("SERVER_BIND_ADDR must be a valid socket address");

  let api = filters::api(create_state_filter).with(warp::log("prbridge"));

  warp::serve(api).run(bind_addr).await;
}

/// Warp filters
pub mod filters {
  use warp::{reject::{Reject, Rejection},
             reply::{Reply, WithStatus},
             Filter};

  use super::*;

  /// 401 Unauthorized rejection
  #[derive(Debug)]
  struct Unauthorized;
  impl Reject for Unauthorized {}

  /// 400 malformed-input rejection
  #[derive(Debug)]
  struct Malformed;
  impl Reject for Malformed {}

  /// expands to gross filter type
  macro_rules! filter {
    () => {impl Filter<Extract = impl Reply, Error = Rejection> + Clone};
    ($reply: ty) => {impl Filter<Extract = $reply, Error = Rejection> + Clone};
  }

  async fn handle_rejection(err: Rejection) -> Result<impl Reply, Rejection> {
    if err.find::<Unauthorized>().is_some() {
      log::warn!("rejected request: signature/secret mismatch");
      Ok(warp::reply::with_status("", http::StatusCode::UNAUTHORIZED))
    } else if err.find::<Malformed>().is_some() {
      log::warn!("rejected request: malformed body");
      Ok(warp::reply::with_status("", http::StatusCode::BAD_REQUEST))
    } else {
      log::error!("unhandled rejection: {:#?}", err);
      Err(err)
    }
  }

  fn ok<T: Reply>(t: T) -> WithStatus<T> {
    warp::reply::with_status(t, http::StatusCode::OK)
  }

  /// The composite warp filter that defines our HTTP api.
  pub fn api(state: fn() -> StateFilter) -> filter!() {
    health().or(ready(state))
           .or(github_webhook(state))
           .or(slack_events(state))
           .or(slack_interactions())
           .or(jobs_process(state))
           .recover(handle_rejection)
  }

  /// `GET /health` — liveness.
  fn health() -> filter!(impl Reply) {
    warp::path!("health").and(warp::get()).map(|| ok(""))
  }

  /// `GET /ready` — readiness; 503 unless the document store answers a point read.
  fn ready(state: fn() -> StateFilter) -> filter!(impl Reply) {
    warp::path!("ready").and(warp::get()).and(state()).and_then(|state: Arc<State>| async move {
                                                        tokio::task::spawn_blocking(move || {
                                                          match state.store.get("health", "ping") {
                                                            | Ok(_) => ok(""),
                                                            | Err(_) => warp::reply::with_status("", http::StatusCode::SERVICE_UNAVAILABLE),
                                                          }
                                                        }).await
                                                          .map_err(|_| warp::reject::reject())
                                                      })
  }

  /// `POST /webhooks/github` — HMAC-verified code-host webhook ingress.
  fn github_webhook(state: fn() -> StateFilter) -> filter!(impl Reply) {
    warp::path!("webhooks" / "github")
      .and(warp::post())
      .and(state())
      .and(warp::filters::body::bytes())
      .and(warp::filters::header::value("x-hub-signature-256"))
      .and(warp::filters::header::value("x-github-event"))
      .and(warp::filters::header::optional::<String>("x-github-delivery"))
      .and_then(|state: Arc<State>, body: bytes::Bytes, sig: http::HeaderValue, event_type: http::HeaderValue,
                 delivery_id: Option<String>| async move {
        let sig = sig.to_str().unwrap_or("");
        if !prbridge::github::webhook::request_authentic(&state.config.github_webhook_secret, &body, sig) {
          return Err(warp::reject::custom(Unauthorized));
        }

        let event_type = event_type.to_str().unwrap_or("").to_string();

        let parsed: serde_json::Value = serde_json::from_slice(&body).map_err(|_| warp::reject::custom(Malformed))?;
        if parsed.get("action").is_none() || parsed.get("repository").is_none() {
          return Err(warp::reject::custom(Malformed));
        }

        let trace_id = prbridge::ids::new_trace_id();

        let payload = prbridge::fanout::CodeHostWebhookPayload {
          id: prbridge::ids::new_id(),
          event_type,
          delivery_id: delivery_id.unwrap_or_default(),
          raw_body: String::from_utf8_lossy(&body).into_owned(),
          received_at: chrono::Utc::now(),
          trace_id: trace_id.clone(),
        };

        let envelope = prbridge::queue::Envelope::new(prbridge::queue::JobType::CodeHostWebhook,
                                                      trace_id,
                                                      serde_json::to_value(&payload).expect("payload always serializes"));

        tokio::task::spawn_blocking(move || state.queue.enqueue(envelope)).await
                                                                          .map_err(|_| warp::reject::reject())?
                                                                          .map_err(|e| {
                                                                            log::error!("enqueue failed: {:#?}", e);
                                                                            warp::reject::reject()
                                                                          })?;

        Ok(ok(String::new()))
      })
  }

  /// `POST /webhooks/slack/events` — HMAC-verified chat webhook ingress.
  fn slack_events(state: fn() -> StateFilter) -> filter!(impl Reply) {
    warp::path!("webhooks" / "slack" / "events")
      .and(warp::post())
      .and(state())
      .and(warp::filters::body::bytes())
      .and(warp::filters::header::value("x-slack-request-timestamp"))
      .and(warp::filters::header::value("x-slack-signature"))
      .and_then(|state: Arc<State>, body: bytes::Bytes, ts: http::HeaderValue, sig: http::HeaderValue| async move {
        let ts = ts.to_str().unwrap_or("");
        let sig = sig.to_str().unwrap_or("");

        let authentic = prbridge::slack::request_authentic(&state.config.slack_signing_secret,
                                                            state.config.slack_timestamp_max_age,
                                                            &body,
                                                            ts,
                                                            sig);
        if !authentic {
          return Err(warp::reject::custom(Unauthorized));
        }

        let event: prbridge::slack::event::Event =
          serde_json::from_slice(&body).map_err(|_| warp::reject::custom(Malformed))?;

        tokio::task::spawn_blocking(move || handle_slack_event(&state, event)).await
                                                                              .map_err(|_| warp::reject::reject())
      })
  }

  fn handle_slack_event(state: &State, event: prbridge::slack::event::Event) -> WithStatus<String> {
    use prbridge::slack::event::{Event, EventPayload, ReactionItem};

    match event {
      | Event::Challenge { challenge } => ok(challenge),
      | Event::Event { team_id, event } => {
        let trace_id = prbridge::ids::new_trace_id();
        match event {
          | EventPayload::ReactionAdded { reaction, item: ReactionItem::Message { channel, ts }, .. }
            if reaction == state.config.delete_reaction_emoji =>
          {
            let payload = prbridge::deletion::DeleteTrackedMessagePayload { slack_channel: channel,
                                                                            slack_message_ts: ts,
                                                                            slack_team_id: team_id,
                                                                            trace_id: trace_id.clone() };
            enqueue(state,
                    prbridge::queue::JobType::DeleteTrackedMessage,
                    trace_id,
                    &payload)
          },
          | EventPayload::Message { channel, ts, text, bot_id: None, .. } => {
            match prbridge::manual_link::extract_single_pr_url(&text) {
              | Some((repo_full_name, pr_number)) => {
                let payload = prbridge::manual_link::ManualPrLinkPayload { pr_number,
                                                                           repo_full_name,
                                                                           slack_channel: channel,
                                                                           slack_message_ts: ts,
                                                                           slack_team_id: team_id,
                                                                           trace_id: trace_id.clone() };
                enqueue(state, prbridge::queue::JobType::ManualPrLink, trace_id, &payload)
              },
              | None => ok(String::new()),
            }
          },
          | other => {
            log::debug!("not responding to event: {:#?}", other);
            ok(String::new())
          },
        }
      },
    }
  }

  fn enqueue<T: serde::Serialize>(state: &State, job_type: prbridge::queue::JobType, trace_id: String, payload: &T) -> WithStatus<String> {
    let envelope = prbridge::queue::Envelope::new(job_type,
                                                  trace_id,
                                                  serde_json::to_value(payload).expect("payload always serializes"));

    match state.queue.enqueue(envelope) {
      | Ok(()) => ok(String::new()),
      | Err(e) => {
        log::error!("enqueue failed: {:#?}", e);
        ok(String::new())
      },
    }
  }

  /// `POST /webhooks/slack/interactions` — acknowledged but not otherwise acted on.
  fn slack_interactions() -> filter!(impl Reply) {
    warp::path!("webhooks" / "slack" / "interactions").and(warp::post())
                                                       .map(|| ok(String::new()))
  }

  /// `POST /jobs/process` — the task queue's worker callback.
  fn jobs_process(state: fn() -> StateFilter) -> filter!(impl Reply) {
    warp::path!("jobs" / "process")
      .and(warp::post())
      .and(state())
      .and(warp::filters::header::value("x-cloud-tasks-secret"))
      .and(warp::filters::body::bytes())
      .and_then(|state: Arc<State>, secret: http::HeaderValue, body: bytes::Bytes| async move {
        let provided = secret.to_str().unwrap_or("");
        if !dispatcher::secret_matches(&state.config.cloud_tasks_secret, provided) {
          return Err(warp::reject::custom(Unauthorized));
        }

        let envelope: prbridge::queue::Envelope =
          serde_json::from_slice(&body).map_err(|_| warp::reject::custom(Malformed))?;

        let timeout = state.config.webhook_processing_timeout;

        let result = tokio::time::timeout(timeout,
                                          tokio::task::spawn_blocking(move || dispatcher::dispatch(&state, &envelope))).await;

        match result {
          | Ok(Ok(Ok(()))) => Ok(ok(String::new())),
          | Ok(Ok(Err(e))) => {
            log::warn!("job failed, queue will retry: {:#?}", e);
            Ok(warp::reply::with_status(String::new(), http::StatusCode::INTERNAL_SERVER_ERROR))
          },
          | Ok(Err(_)) | Err(_) => {
            log::error!("job handler panicked or exceeded its deadline");
            Ok(warp::reply::with_status(String::new(), http::StatusCode::INTERNAL_SERVER_ERROR))
          },
        }
      })
  }
}
