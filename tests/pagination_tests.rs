//! Integration tests for paginated collection traversal.

use recurly_api::resource::Pager;
use recurly_api::resources::ACCOUNT;
use recurly_api::{ApiKey, HttpClient, RecurlyConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> HttpClient {
    let config = RecurlyConfig::builder()
        .api_key(ApiKey::new("test-api-key").unwrap())
        .base_url(format!("{}/v2/", server.uri()))
        .build()
        .unwrap();
    HttpClient::new(config)
}

fn accounts_page(codes: &[&str]) -> String {
    let mut body = String::from(r#"<accounts type="array">"#);
    for code in codes {
        body.push_str(&format!(
            "<account><account_code>{code}</account_code></account>"
        ));
    }
    body.push_str("</accounts>");
    body
}

fn page_response(body: String, next: Option<String>) -> ResponseTemplate {
    let mut response =
        ResponseTemplate::new(200).set_body_raw(body, "application/xml; charset=utf-8");
    if let Some(next) = next {
        response = response.insert_header("Link", format!(r#"<{next}>; rel="next""#).as_str());
    }
    response
}

/// Mounts a three-page collection: pages 1 and 2 advertise a next link,
/// page 3 does not.
async fn mount_three_pages(server: &MockServer) {
    // Cursor pages first: wiremock picks the first mock whose matchers all
    // pass, and the plain collection mock matches any query.
    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .and(query_param("cursor", "p2"))
        .respond_with(page_response(
            accounts_page(&["c", "d"]),
            Some(format!("{}/v2/accounts?cursor=p3", server.uri())),
        ))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .and(query_param("cursor", "p3"))
        .respond_with(page_response(accounts_page(&["e"]), None))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .respond_with(
            page_response(
                accounts_page(&["a", "b"]),
                Some(format!("{}/v2/accounts?cursor=p2", server.uri())),
            )
            .insert_header("X-Records", "5"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_three_page_collection_yields_all_entities_in_order() {
    let server = MockServer::start().await;
    let client = test_client(&server);
    mount_three_pages(&server).await;

    let mut pager = ACCOUNT.all().unwrap();
    let mut codes = Vec::new();
    while let Some(account) = pager.next(&client).await.unwrap() {
        codes.push(
            account
                .attribute_get("account_code")
                .unwrap()
                .as_str()
                .unwrap()
                .to_string(),
        );
    }

    assert_eq!(codes, vec!["a", "b", "c", "d", "e"]);
    assert_eq!(pager.total_records(), Some(5));

    // Past the end the pager keeps yielding None without further requests;
    // the expect(1) counts on the cursor mocks assert that on drop.
    assert!(pager.next(&client).await.unwrap().is_none());
    assert!(pager.next(&client).await.unwrap().is_none());
}

#[tokio::test]
async fn test_restart_reissues_the_original_url() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .respond_with(page_response(accounts_page(&["a"]), None))
        .expect(2)
        .mount(&server)
        .await;

    let mut pager = Pager::new("accounts");
    assert!(pager.next(&client).await.unwrap().is_some());
    assert!(pager.next(&client).await.unwrap().is_none());

    pager.restart();
    assert!(pager.next(&client).await.unwrap().is_some());
    assert!(pager.next(&client).await.unwrap().is_none());
}

#[tokio::test]
async fn test_state_filter_is_sent_as_query_parameter() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .and(query_param("state", "past_due"))
        .respond_with(page_response(accounts_page(&["late"]), None))
        .expect(1)
        .mount(&server)
        .await;

    let mut pager = ACCOUNT.all_with_state("past_due").unwrap();
    let account = pager.next(&client).await.unwrap().unwrap();
    assert_eq!(
        account.attribute_get("account_code").unwrap().as_str(),
        Some("late")
    );
}

#[tokio::test]
async fn test_empty_collection_terminates_immediately() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/v2/transactions"))
        .respond_with(page_response(r#"<transactions type="array"></transactions>"#.to_string(), None))
        .expect(1)
        .mount(&server)
        .await;

    let mut pager = Pager::new("transactions");
    assert!(pager.next(&client).await.unwrap().is_none());
}

#[tokio::test]
async fn test_page_entities_decode_through_the_registry() {
    let server = MockServer::start().await;
    let client = test_client(&server);

    Mock::given(method("GET"))
        .and(path("/v2/accounts"))
        .respond_with(page_response(accounts_page(&["a"]), None))
        .mount(&server)
        .await;

    let mut pager = Pager::new("accounts");
    let account = pager.next(&client).await.unwrap().unwrap();
    assert_eq!(account.schema().nodename, "account");
}
