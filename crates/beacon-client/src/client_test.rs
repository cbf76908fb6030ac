use super::*;

fn test_client(base_url: &str) -> BeaconClient {
    BeaconClient::with_base_url(base_url, 30).expect("client construction should not fail")
}

#[test]
fn endpoint_appends_to_root() {
    let client = test_client("http://localhost:8000");
    let url = client.endpoint("upload").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/upload");
}

#[test]
fn endpoint_keeps_base_path_prefix() {
    let client = test_client("https://beacon.example.dev/api/");
    let url = client.endpoint("match").unwrap();
    assert_eq!(url.as_str(), "https://beacon.example.dev/api/match");
}

#[test]
fn non_http_base_is_rejected() {
    let err = BeaconClient::with_base_url("ftp://beacon.example.dev", 30).unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl { .. }), "got: {err:?}");
}

#[test]
fn absolute_image_url_passes_through() {
    let client = test_client("http://localhost:8000");
    let url = resolve_image_url(client.base_url(), "https://cdn.example.com/a.jpg").unwrap();
    assert_eq!(url.as_str(), "https://cdn.example.com/a.jpg");
}

#[test]
fn relative_image_path_resolves_against_base() {
    let client = test_client("http://localhost:8000");
    let url = resolve_image_url(client.base_url(), "/uploads/item-7.jpg").unwrap();
    assert_eq!(url.as_str(), "http://localhost:8000/uploads/item-7.jpg");
}

#[test]
fn relative_image_path_keeps_base_path_prefix() {
    let client = test_client("https://beacon.example.dev/api");
    let leading = resolve_image_url(client.base_url(), "/uploads/a.jpg").unwrap();
    let bare = resolve_image_url(client.base_url(), "uploads/a.jpg").unwrap();
    assert_eq!(leading.as_str(), "https://beacon.example.dev/api/uploads/a.jpg");
    assert_eq!(leading, bare);
}

#[test]
fn empty_image_url_is_invalid() {
    let client = test_client("http://localhost:8000");
    let err = resolve_image_url(client.base_url(), "   ").unwrap_err();
    assert!(matches!(err, ClientError::InvalidUrl { .. }));
}

#[test]
fn data_url_is_rejected() {
    let client = test_client("http://localhost:8000");
    let err = resolve_image_url(client.base_url(), "data:image/png;base64,AAAA").unwrap_err();
    assert!(
        matches!(err, ClientError::InvalidUrl { ref reason, .. } if reason.contains("data")),
        "got: {err:?}"
    );
}
