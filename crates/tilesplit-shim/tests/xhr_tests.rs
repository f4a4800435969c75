use pretty_assertions::assert_eq;
use std::sync::Arc;
use tilesplit_shim::{install_xhr, RequestBody, XhrRequest, XhrTransport};
use tilesplit_test_utils::{
    original_body, pixel_url, processor_with, RecordingXhrTransport, ScriptedConsole, XhrEvent,
};

const SPLIT_ANSWER: &str = r#"{"coords": [10, 20, 1100, 300, 2050, 1], "colors": [1, 2, 3]}"#;

fn text(body: &str) -> Option<RequestBody> {
    Some(RequestBody::Text(body.to_string()))
}

#[tokio::test]
async fn test_non_eligible_request_passes_through() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console.clone()));

    let mut request = xhr.create();
    request.open("GET", &pixel_url(5, 10)).unwrap();
    request.send(None).await.unwrap();

    let mut request = xhr.create();
    request.open("POST", "https://backend.wplace.live/me").unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(
        native.sends(),
        vec![
            (pixel_url(5, 10), None),
            ("https://backend.wplace.live/me".to_string(), text(&original_body())),
        ]
    );
    assert_eq!(console.prompt_count(), 0);
}

#[tokio::test]
async fn test_send_without_open_is_forwarded() {
    let console = Arc::new(ScriptedConsole::new());
    let xhr = install_xhr(RecordingXhrTransport::new(), processor_with(console));

    let mut request = xhr.create();
    assert!(request.send(text("{}")).await.is_err());
    assert!(request.context().is_none());
}

#[tokio::test]
async fn test_context_captures_open_and_headers() {
    let console = Arc::new(ScriptedConsole::new());
    let xhr = install_xhr(RecordingXhrTransport::new(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(1, 2)).unwrap();
    request.set_request_header("content-type", "text/plain").unwrap();

    let context = request.context().unwrap();
    assert_eq!(context.method, "POST");
    assert_eq!(context.url, pixel_url(1, 2));
    assert_eq!(
        context.headers,
        vec![("content-type".to_string(), "text/plain".to_string())]
    );
}

#[tokio::test]
async fn test_split_sends_sequentially_on_fresh_objects() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console.clone()));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(5, 10)).unwrap();
    request.set_request_header("content-type", "text/plain").unwrap();
    request.send(text(&original_body())).await.unwrap();

    let sends = native.sends();
    let urls: Vec<_> = sends.iter().map(|(url, _)| url.clone()).collect();
    assert_eq!(urls, vec![pixel_url(5, 10), pixel_url(6, 10), pixel_url(7, 10)]);
    assert_eq!(
        sends[1].1,
        text(r#"{"colors":[2],"coords":[100,300],"t":"turnstile-token","fp":"fingerprint"}"#)
    );

    let caller_id = request.inner().id();
    let events = native.events();
    assert!(!events
        .iter()
        .any(|e| matches!(e, XhrEvent::Send { id, .. } if *id == caller_id)));
    assert_eq!(native.created(), 4);

    let replayed = events
        .iter()
        .filter(|e| matches!(e, XhrEvent::Header { id, .. } if *id != caller_id))
        .count();
    assert_eq!(replayed, 3);
    assert_eq!(console.prompt_count(), 1);
}

#[tokio::test]
async fn test_split_stops_at_first_failure() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let native = RecordingXhrTransport::new().failing_on(pixel_url(6, 10));
    let xhr = install_xhr(native.clone(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(5, 10)).unwrap();
    let result = request.send(text(&original_body())).await;

    assert!(result.is_ok());
    let urls: Vec<_> = native.sends().into_iter().map(|(url, _)| url).collect();
    assert_eq!(urls, vec![pixel_url(5, 10), pixel_url(6, 10)]);
}

#[tokio::test]
async fn test_single_tile_replaces_body() {
    let console = Arc::new(ScriptedConsole::new().answer(r#"{"coords": [3, 4], "colors": [9]}"#));
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(2, 2)).unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(
        native.sends(),
        vec![(
            pixel_url(2, 2),
            text(r#"{"colors":[9],"coords":[3,4],"t":"turnstile-token","fp":"fingerprint"}"#)
        )]
    );
    assert_eq!(native.created(), 1);
}

#[tokio::test]
async fn test_single_foreign_tile_reopens_same_object() {
    let console =
        Arc::new(ScriptedConsole::new().answer(r#"{"coords": [3, 1004], "colors": [9]}"#));
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(2, 2)).unwrap();
    request.set_request_header("x-token", "abc").unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(native.created(), 1);
    assert_eq!(
        native.sends(),
        vec![(
            pixel_url(2, 3),
            text(r#"{"colors":[9],"coords":[3,4],"t":"turnstile-token","fp":"fingerprint"}"#)
        )]
    );
    assert_eq!(request.context().unwrap().url, pixel_url(2, 3));

    let headers = native
        .events()
        .into_iter()
        .filter(|e| matches!(e, XhrEvent::Header { .. }))
        .count();
    assert_eq!(headers, 2);
}

#[tokio::test]
async fn test_cancelled_prompt_sends_original() {
    let console = Arc::new(ScriptedConsole::new().cancel());
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(2, 2)).unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(native.sends(), vec![(pixel_url(2, 2), text(&original_body()))]);
}

#[tokio::test]
async fn test_binary_body_is_not_processed() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let native = RecordingXhrTransport::new();
    let xhr = install_xhr(native.clone(), processor_with(console.clone()));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(2, 2)).unwrap();
    request
        .send(Some(RequestBody::Binary(vec![0xde, 0xad])))
        .await
        .unwrap();

    assert_eq!(
        native.sends(),
        vec![(pixel_url(2, 2), Some(RequestBody::Binary(vec![0xde, 0xad])))]
    );
    assert_eq!(console.prompt_count(), 0);
}

#[tokio::test]
async fn test_failed_redirect_sends_original_to_original_tile() {
    let console =
        Arc::new(ScriptedConsole::new().answer(r#"{"coords": [3, 1004], "colors": [9]}"#));
    let native = RecordingXhrTransport::new().rejecting_headers_on(pixel_url(2, 3));
    let xhr = install_xhr(native.clone(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(2, 2)).unwrap();
    request.set_request_header("x-token", "abc").unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(native.sends(), vec![(pixel_url(2, 2), text(&original_body()))]);
    assert_eq!(request.context().unwrap().url, pixel_url(2, 2));

    let replayed_on_original = native
        .events()
        .into_iter()
        .filter(|e| matches!(e, XhrEvent::Header { name, .. } if name == "x-token"))
        .count();
    assert_eq!(replayed_on_original, 2);
}

#[tokio::test]
async fn test_failed_open_leaves_request_uninterceptable() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let native = RecordingXhrTransport::new().rejecting_opens_on(pixel_url(5, 10));
    let xhr = install_xhr(native.clone(), processor_with(console.clone()));

    let mut request = xhr.create();
    assert!(request.open("POST", &pixel_url(5, 10)).is_err());
    assert!(request.context().is_none());

    assert!(request.send(text(&original_body())).await.is_err());
    assert_eq!(console.prompt_count(), 0);
    assert!(native.sends().is_empty());
}

#[tokio::test]
async fn test_interceptor_exposes_native_transport() {
    let console = Arc::new(ScriptedConsole::new().answer(SPLIT_ANSWER));
    let xhr = install_xhr(RecordingXhrTransport::new(), processor_with(console));

    let mut request = xhr.create();
    request.open("POST", &pixel_url(5, 10)).unwrap();
    request.send(text(&original_body())).await.unwrap();

    assert_eq!(xhr.inner().created(), 4);
    assert_eq!(xhr.inner().sends().len(), 3);
}
