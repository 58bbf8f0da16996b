//! Property fetch against a live HTTP source.

use iep_platformservice::dynamic::{FetchError, PropertiesReader, RemoteFetcher};
use std::net::TcpListener;
use std::time::Duration;
use url::Url;

mod common;

#[test]
fn test_fetch_properties_over_http() {
    let addr = common::start_static_server(
        "# overrides\nfeature.x.enabled=true\nservice.timeout = 5s\n",
    );
    let url = Url::parse(&format!("http://{}/x.properties", addr)).unwrap();

    let snapshot = PropertiesReader::new().fetch(&url).unwrap();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot.get("feature.x.enabled"), Some("true"));
    assert_eq!(snapshot.get("service.timeout"), Some("5s"));
}

#[test]
fn test_non_success_status_is_a_failure() {
    let addr = common::start_property_server(|| (404, "missing".to_string()));
    let url = Url::parse(&format!("http://{}/x.properties", addr)).unwrap();

    let err = PropertiesReader::new().fetch(&url).unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[test]
fn test_connection_refused_is_a_failure() {
    // Bind and release a port so nothing is listening on it.
    let addr = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap();
    let url = Url::parse(&format!("http://{}/x.properties", addr)).unwrap();

    let reader = PropertiesReader::with_timeout(Duration::from_secs(2));
    assert!(matches!(reader.fetch(&url), Err(FetchError::Http { .. })));
}

#[test]
fn test_malformed_body_is_a_failure() {
    let addr = common::start_static_server("bad=\\uZZZZ\n");
    let url = Url::parse(&format!("http://{}/x.properties", addr)).unwrap();

    let err = PropertiesReader::new().fetch(&url).unwrap_err();
    assert!(matches!(err, FetchError::Parse(_)));
}
