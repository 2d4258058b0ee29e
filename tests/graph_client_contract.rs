//! Purpose: Contract tests for `GraphClient` against an in-process fake Graph API.
//! Exports: None (integration test module).
//! Role: Pin pagination, retry, token handling and typed reads without a network.
//! Invariants: The fake serves fixed 10-item pages and records every request URL.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;

use adgraph::api::{
    ApiResult, ClientConfig, ErrorKind, GraphClient, ListOptions, Params, Sleeper, Transport,
};
use adgraph::core::timestamp;
use adgraph::core::value::FieldValue;
use adgraph::models::{AdCampaign, Model, ResourceKind};
use serde_json::{Value, json};
use url::Url;

const PAGE_SIZE: usize = 10;
const TOKEN: &str = "test-token";

struct FakeGraph {
    total: usize,
    gets: RefCell<Vec<Url>>,
    posts: RefCell<Vec<(Url, Params)>>,
}

impl FakeGraph {
    fn with_items(total: usize) -> Self {
        Self {
            total,
            gets: RefCell::new(Vec::new()),
            posts: RefCell::new(Vec::new()),
        }
    }

    fn get_count(&self) -> usize {
        self.gets.borrow().len()
    }

    fn campaign(index: usize) -> Value {
        json!({ "id": index.to_string(), "name": format!("campaign {index}") })
    }
}

fn query(url: &Url, key: &str) -> Vec<String> {
    url.query_pairs()
        .filter(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
        .collect()
}

impl Transport for FakeGraph {
    fn get_json(&self, url: &Url) -> ApiResult<Value> {
        self.gets.borrow_mut().push(url.clone());
        if url.path() == "/oauth/access_token" {
            return Ok(json!({ "access_token": "long-lived", "expires": 5183999 }));
        }
        if let Some(ids) = query(url, "ids").first() {
            let by_id: serde_json::Map<String, Value> = ids
                .split(',')
                .map(|id| (id.to_string(), json!({ "id": id, "name": format!("campaign {id}") })))
                .collect();
            return Ok(Value::Object(by_id));
        }
        let offset = query(url, "offset")
            .first()
            .and_then(|raw| raw.parse::<usize>().ok())
            .unwrap_or(0);
        let end = (offset + PAGE_SIZE).min(self.total);
        let data: Vec<Value> = (offset..end).map(|index| Self::campaign(index + 1)).collect();
        let mut page = json!({ "data": data });
        if end < self.total {
            page["paging"] = json!({
                "next": format!(
                    "https://graph.test{}?offset={end}&access_token=stale",
                    url.path()
                )
            });
        }
        Ok(page)
    }

    fn post_form(&self, url: &Url, form: &Params) -> ApiResult<Value> {
        self.posts.borrow_mut().push((url.clone(), form.clone()));
        Ok(json!({ "id": "6001" }))
    }

    fn delete(&self, _url: &Url, _body: &str, _content_type: &str) -> ApiResult<String> {
        Ok("true".to_string())
    }
}

struct AlwaysFailing {
    gets: RefCell<usize>,
}

impl Transport for AlwaysFailing {
    fn get_json(&self, _url: &Url) -> ApiResult<Value> {
        *self.gets.borrow_mut() += 1;
        Ok(json!({
            "error": {
                "message": "(#17) User request limit reached",
                "type": "OAuthException",
                "code": 17
            }
        }))
    }

    fn post_form(&self, _url: &Url, _form: &Params) -> ApiResult<Value> {
        Ok(json!({ "error": { "message": "Invalid parameter", "code": 100 } }))
    }

    fn delete(&self, _url: &Url, _body: &str, _content_type: &str) -> ApiResult<String> {
        Ok(String::new())
    }
}

/// Answers GETs from a queue and records every URL it is handed.
struct ScriptedGraph {
    replies: RefCell<VecDeque<Value>>,
    post_reply: Value,
    delete_reply: String,
    seen: RefCell<Vec<Url>>,
}

impl ScriptedGraph {
    fn new(replies: Vec<Value>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            post_reply: json!(true),
            delete_reply: "true".to_string(),
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl Transport for ScriptedGraph {
    fn get_json(&self, url: &Url) -> ApiResult<Value> {
        self.seen.borrow_mut().push(url.clone());
        Ok(self
            .replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| json!({ "data": [] })))
    }

    fn post_form(&self, url: &Url, _form: &Params) -> ApiResult<Value> {
        self.seen.borrow_mut().push(url.clone());
        Ok(self.post_reply.clone())
    }

    fn delete(&self, url: &Url, _body: &str, _content_type: &str) -> ApiResult<String> {
        self.seen.borrow_mut().push(url.clone());
        Ok(self.delete_reply.clone())
    }
}

#[derive(Default)]
struct RecordingSleeper {
    delays: RefCell<Vec<Duration>>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, delay: Duration) {
        self.delays.borrow_mut().push(delay);
    }
}

fn config() -> ClientConfig {
    ClientConfig::new()
        .with_graph_endpoint("https://graph.test")
        .expect("endpoint")
        .with_access_token(TOKEN)
}

#[test]
fn get_all_walks_every_page_in_order() {
    let graph = FakeGraph::with_items(30);
    let client = GraphClient::with_transport(config(), &graph);

    let items = client
        .get_all("/act_1/adcampaigns", &Params::new())
        .expect("items");

    assert_eq!(items.len(), 30);
    assert_eq!(graph.get_count(), 3);
    let ids: Vec<&str> = items.iter().filter_map(|item| item["id"].as_str()).collect();
    let expected: Vec<String> = (1..=30).map(|index| index.to_string()).collect();
    assert_eq!(ids, expected.iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn every_request_carries_exactly_the_configured_token() {
    let graph = FakeGraph::with_items(25);
    let client = GraphClient::with_transport(config(), &graph);

    client
        .get_all("/act_1/adcampaigns", &Params::new())
        .expect("items");

    for url in graph.gets.borrow().iter() {
        assert_eq!(query(url, "access_token"), vec![TOKEN.to_string()]);
    }
}

#[test]
fn limit_truncates_across_pages() {
    let graph = FakeGraph::with_items(30);
    let client = GraphClient::with_transport(config(), &graph);
    let mut params = Params::new();
    params.insert("limit".to_string(), "15".to_string());

    let items = client.get_all("/act_1/adcampaigns", &params).expect("items");

    assert_eq!(items.len(), 15);
    assert_eq!(items[14]["id"], "15");
    assert_eq!(graph.get_count(), 2);
}

#[test]
fn offset_past_the_end_yields_nothing() {
    let graph = FakeGraph::with_items(30);
    let client = GraphClient::with_transport(config(), &graph);
    let options = ListOptions::default().offset(50);

    let items = client
        .get_all("/act_1/adcampaigns", &options.to_params())
        .expect("items");

    assert!(items.is_empty());
    assert_eq!(graph.get_count(), 1);
}

#[test]
fn error_payload_is_retried_once_then_raised() {
    let transport = AlwaysFailing {
        gets: RefCell::new(0),
    };
    let sleeper = RecordingSleeper::default();
    let client = GraphClient::with_transport(config(), &transport).with_sleeper(&sleeper);

    let err = client.get("/me", &Params::new()).expect_err("remote error");

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.message(), Some("(#17) User request limit reached"));
    assert_eq!(
        err.payload().and_then(|payload| payload.get("code")),
        Some(&json!(17))
    );
    assert_eq!(*transport.gets.borrow(), 2);
    assert_eq!(*sleeper.delays.borrow(), vec![Duration::from_secs(5)]);
}

#[test]
fn post_errors_are_not_retried() {
    let transport = AlwaysFailing {
        gets: RefCell::new(0),
    };
    let sleeper = RecordingSleeper::default();
    let client = GraphClient::with_transport(config(), &transport).with_sleeper(&sleeper);

    let err = client
        .post("/6001", &Params::new())
        .expect_err("remote error");

    assert_eq!(err.kind(), ErrorKind::Remote);
    assert!(sleeper.delays.borrow().is_empty());
}

#[test]
fn missing_token_fails_before_any_request() {
    let graph = FakeGraph::with_items(5);
    let client = GraphClient::with_transport(ClientConfig::new(), &graph);

    let err = client.get("/me", &Params::new()).expect_err("no token");

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(graph.get_count(), 0);
}

#[test]
fn exchange_token_replaces_the_client_token() {
    let graph = FakeGraph::with_items(0);
    let config = config().with_app_id("123").with_app_secret("shh");
    let mut client = GraphClient::with_transport(config, &graph);

    let token = client.exchange_token().expect("token");

    assert_eq!(token, "long-lived");
    assert_eq!(client.access_token(), Some("long-lived"));
    let gets = graph.gets.borrow();
    let exchange = gets.first().expect("exchange request");
    assert_eq!(query(exchange, "fb_exchange_token"), vec![TOKEN.to_string()]);
    assert_eq!(query(exchange, "client_id"), vec!["123".to_string()]);
    assert_eq!(query(exchange, "grant_type"), vec!["fb_exchange_token".to_string()]);
}

#[test]
fn exchange_token_requires_app_credentials() {
    let graph = FakeGraph::with_items(0);
    let mut client = GraphClient::with_transport(config(), &graph);

    let err = client.exchange_token().expect_err("no app id");

    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(client.access_token(), Some(TOKEN));
    assert_eq!(graph.get_count(), 0);
}

#[test]
fn typed_list_reads_coerce_string_ids() {
    let graph = FakeGraph::with_items(12);
    let client = GraphClient::with_transport(config(), &graph);

    let campaigns = client
        .ad_campaigns()
        .find_by_adaccount_id("42", ListOptions::default())
        .expect("campaigns");

    assert_eq!(campaigns.len(), 12);
    assert_eq!(campaigns[0].id(), Some(1));
    assert_eq!(campaigns[11].name(), Some("campaign 12"));
    assert_eq!(graph.gets.borrow()[0].path(), "/act_42/adcampaigns");
}

#[test]
fn find_by_ids_requires_ids() {
    let graph = FakeGraph::with_items(0);
    let client = GraphClient::with_transport(config(), &graph);
    let none: [u64; 0] = [];

    let err = client
        .ad_campaigns()
        .find_by_ids(&none)
        .expect_err("empty ids");
    assert_eq!(err.kind(), ErrorKind::Argument);

    let campaigns = client
        .ad_campaigns()
        .find_by_ids(&[7u64, 9])
        .expect("campaigns");
    assert_eq!(campaigns.len(), 2);
    assert_eq!(query(&graph.gets.borrow()[0], "ids"), vec!["7,9".to_string()]);
}

#[test]
fn create_validates_then_posts_and_assigns_the_id() {
    let graph = FakeGraph::with_items(0);
    let client = GraphClient::with_transport(config(), &graph);
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), FieldValue::from("spring"));
    fields.insert("campaign_status".to_string(), FieldValue::Int(2));

    let created = client
        .create(ResourceKind::AdCampaign, "42", fields)
        .expect("created")
        .into_model::<AdCampaign>()
        .expect("campaign");

    assert_eq!(created.id(), Some(6001));
    let posts = graph.posts.borrow();
    let (url, form) = posts.first().expect("post");
    assert_eq!(url.path(), "/act_42/adcampaigns");
    assert_eq!(form.get("name").map(String::as_str), Some("spring"));
    assert_eq!(form.get("campaign_status").map(String::as_str), Some("2"));
}

#[test]
fn create_rejects_bad_choices_without_posting() {
    let graph = FakeGraph::with_items(0);
    let client = GraphClient::with_transport(config(), &graph);
    let mut fields = BTreeMap::new();
    fields.insert("campaign_status".to_string(), FieldValue::Int(9));

    let err = client
        .create(ResourceKind::AdCampaign, "42", fields)
        .expect_err("choice");

    assert_eq!(err.kind(), ErrorKind::Choice);
    assert!(graph.posts.borrow().is_empty());
}

#[test]
fn stats_window_must_not_run_backwards() {
    let graph = FakeGraph::with_items(0);
    let client = GraphClient::with_transport(config(), &graph);

    let err = client
        .ad_statistics()
        .find_by_start_time_end_time(
            "42",
            timestamp::from_unix(1359763200).expect("start"),
            timestamp::from_unix(1359676800).expect("end"),
        )
        .expect_err("reversed window");

    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(graph.get_count(), 0);
}

#[test]
fn typed_model_round_trips_through_json() {
    let campaign = AdCampaign::from_json_str(r#"{"id": "5", "start_time": 1359676800}"#)
        .expect("campaign");
    assert_eq!(campaign.to_json(), json!({ "id": 5, "start_time": 1359676800 }));
}

#[test]
fn requests_never_leave_the_configured_host() {
    let graph = FakeGraph::with_items(15);
    let client = GraphClient::with_transport(config(), &graph);

    let err = client
        .get_one("/evil.example/x", ResourceKind::AdCampaign)
        .expect_err("slash in id");
    assert_eq!(err.kind(), ErrorKind::Argument);
    let err = client
        .get_list("", ResourceKind::AdCampaign, &Params::new())
        .expect_err("empty container");
    assert_eq!(err.kind(), ErrorKind::Argument);
    let err = client
        .create(ResourceKind::AdCampaign, "1/../../x", BTreeMap::new())
        .expect_err("slash in account");
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(graph.get_count(), 0);
    assert!(graph.posts.borrow().is_empty());

    client.get("//evil.example/x", &Params::new()).expect("raw get");
    client
        .get_list("act_1", ResourceKind::AdCampaign, &Params::new())
        .expect("list");
    for url in graph.gets.borrow().iter() {
        assert_eq!(url.host_str(), Some("graph.test"));
    }
    assert_eq!(graph.gets.borrow()[0].path(), "//evil.example/x");
}

#[test]
fn update_treats_a_bare_true_as_success() {
    let graph = ScriptedGraph::new(Vec::new());
    let client = GraphClient::with_transport(config(), &graph);
    let mut fields = BTreeMap::new();
    fields.insert("name".to_string(), FieldValue::from("renamed"));

    let response = client.update("6001", &fields).expect("updated");

    assert_eq!(response, json!(true));
    assert_eq!(graph.seen.borrow()[0].path(), "/6001");
}

#[test]
fn failed_page_discards_everything_collected() {
    let graph = ScriptedGraph::new(vec![
        json!({
            "data": [{ "id": "1" }, { "id": "2" }],
            "paging": { "next": "https://graph.test/act_1/adcampaigns?offset=2" }
        }),
        json!({ "paging": {} }),
    ]);
    let client = GraphClient::with_transport(config(), &graph);

    let err = client
        .get_all("/act_1/adcampaigns", &Params::new())
        .expect_err("broken second page");

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert_eq!(graph.seen.borrow().len(), 2);
}

#[test]
fn get_returns_the_retried_response_after_one_sleep() {
    let graph = ScriptedGraph::new(vec![
        json!({ "error": { "message": "temporarily unavailable", "code": 2 } }),
        json!({ "id": "me", "name": "Ada" }),
    ]);
    let sleeper = RecordingSleeper::default();
    let client = GraphClient::with_transport(config(), &graph).with_sleeper(&sleeper);

    let response = client.get("/me", &Params::new()).expect("second attempt");

    assert_eq!(response["name"], "Ada");
    assert_eq!(graph.seen.borrow().len(), 2);
    assert_eq!(sleeper.delays.borrow().len(), 1);
}

#[test]
fn limit_reached_ignores_the_remaining_cursor() {
    let graph = ScriptedGraph::new(vec![json!({
        "data": [{ "id": "1" }, { "id": "2" }],
        "paging": { "next": "not a url" }
    })]);
    let client = GraphClient::with_transport(config(), &graph);
    let mut params = Params::new();
    params.insert("limit".to_string(), "2".to_string());

    let items = client.get_all("/act_1/adcampaigns", &params).expect("items");

    assert_eq!(items.len(), 2);
}

#[test]
fn refreshed_config_leaves_the_client_token_alone() {
    let graph = FakeGraph::with_items(0);
    let config = config().with_app_id("123").with_app_secret("shh");
    let client = GraphClient::with_transport(config, &graph);

    let refreshed = client.refreshed_config().expect("refreshed");

    assert_eq!(refreshed.access_token(), Some("long-lived"));
    assert_eq!(client.access_token(), Some(TOKEN));
}

#[test]
fn delete_carries_the_token_and_returns_the_raw_body() {
    let graph = ScriptedGraph::new(Vec::new());
    let client = GraphClient::with_transport(config(), &graph);

    let body = client
        .delete("/6001", "", "application/x-www-form-urlencoded")
        .expect("deleted");

    assert_eq!(body, "true");
    let seen = graph.seen.borrow();
    assert_eq!(seen[0].path(), "/6001");
    assert_eq!(query(&seen[0], "access_token"), vec![TOKEN.to_string()]);
}
