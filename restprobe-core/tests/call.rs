use std::cell::RefCell;
use std::collections::BTreeMap;

use restprobe_core::{
    load_schema_str, BodyEncoding, DocumentFormat, HttpMethod, Method, Params, Transport,
    TransportError, TransportResponse, CONTENT_TYPE_JSON, CONTENT_TYPE_OCTET_STREAM,
};
use serde_json::json;

#[derive(Debug, Clone)]
struct SeenRequest {
    method: HttpMethod,
    url: String,
    body: Option<Vec<u8>>,
    content_type: String,
}

struct MockTransport {
    status: u16,
    body: String,
    seen: RefCell<Vec<SeenRequest>>,
}

impl MockTransport {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            seen: RefCell::new(Vec::new()),
        }
    }

    fn last(&self) -> SeenRequest {
        self.seen.borrow().last().cloned().expect("no request seen")
    }
}

impl Transport for MockTransport {
    fn request(
        &self,
        method: HttpMethod,
        url: &str,
        body: Option<&[u8]>,
        content_type: &str,
    ) -> Result<TransportResponse, TransportError> {
        self.seen.borrow_mut().push(SeenRequest {
            method,
            url: url.to_string(),
            body: body.map(<[u8]>::to_vec),
            content_type: content_type.to_string(),
        });
        Ok(TransportResponse {
            status: self.status,
            headers: BTreeMap::new(),
            body: self.body.clone(),
        })
    }
}

struct FailingTransport;

impl Transport for FailingTransport {
    fn request(
        &self,
        _method: HttpMethod,
        _url: &str,
        _body: Option<&[u8]>,
        _content_type: &str,
    ) -> Result<TransportResponse, TransportError> {
        Err(TransportError::Timeout)
    }
}

fn load_one(doc: &str) -> Method {
    let mut methods = load_schema_str(doc, DocumentFormat::Yaml, None).unwrap();
    methods.remove(0)
}

fn item_get() -> Method {
    load_one(
        r#"
base_url: http://test
methods:
  - name: item_get
    url: [GET, "/items/{id}"]
    inputs:
      url_input:
        id: {_type: resource, resource_name: item_id}
"#,
    )
}

fn params(value: serde_json::Value) -> Params {
    value.as_object().cloned().unwrap()
}

#[test]
fn url_substitution_consumes_the_url_key_and_sends_no_body() {
    let transport = MockTransport::new(200, "{}");
    let result = item_get()
        .call(&transport, Some(params(json!({"url_input": {"id": 5}}))))
        .unwrap();

    let seen = transport.last();
    assert_eq!(seen.method, HttpMethod::Get);
    assert_eq!(seen.url, "http://test/items/5");
    assert_eq!(seen.body, None);
    assert_eq!(seen.content_type, CONTENT_TYPE_JSON);

    assert_eq!(result.url, "http://test/items/5");
    assert_eq!(result.request_body, None);
    assert_eq!(result.status, Some(200));
}

#[test]
fn failed_substitution_falls_back_to_the_literal_template() {
    let transport = MockTransport::new(200, "{}");
    item_get()
        .call(&transport, Some(params(json!({"url_input": {"wrong": 5}}))))
        .unwrap();
    assert_eq!(transport.last().url, "http://test/items/{id}");
}

#[test]
fn call_without_params_uses_the_template_as_is() {
    let transport = MockTransport::new(200, "{}");
    item_get().call(&transport, None).unwrap();
    assert_eq!(transport.last().url, "http://test/items/{id}");
    assert_eq!(transport.last().body, None);
}

#[test]
fn remaining_params_are_sent_as_a_json_body() {
    let method = load_one(
        r#"
base_url: http://test
methods:
  - name: item_create
    url: [POST, "/items"]
    inputs:
      name: {_type: string}
"#,
    );
    let transport = MockTransport::new(200, "{}");
    let result = method
        .call(&transport, Some(params(json!({"name": "one"}))))
        .unwrap();

    let seen = transport.last();
    assert_eq!(seen.content_type, CONTENT_TYPE_JSON);
    let sent: serde_json::Value = serde_json::from_slice(&seen.body.unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "one"}));
    assert_eq!(result.request_body.as_deref(), Some(r#"{"name":"one"}"#));
}

#[test]
fn url_key_is_removed_before_body_encoding() {
    let transport = MockTransport::new(200, "{}");
    item_get()
        .call(
            &transport,
            Some(params(json!({"url_input": {"id": 5}, "name": "one"}))),
        )
        .unwrap();

    let seen = transport.last();
    assert_eq!(seen.url, "http://test/items/5");
    let sent: serde_json::Value = serde_json::from_slice(&seen.body.unwrap()).unwrap();
    assert_eq!(sent, json!({"name": "one"}));
}

#[test]
fn string_raw_data_is_sent_as_opaque_bytes() {
    let transport = MockTransport::new(200, "{}");
    item_get()
        .call(&transport, Some(params(json!({"raw_data": "\x00garbage"}))))
        .unwrap();

    let seen = transport.last();
    assert_eq!(seen.body.as_deref(), Some("\x00garbage".as_bytes()));
    assert_eq!(seen.content_type, CONTENT_TYPE_OCTET_STREAM);
}

#[test]
fn non_string_raw_data_degrades_to_no_body() {
    let transport = MockTransport::new(200, "{}");
    item_get()
        .call(&transport, Some(params(json!({"raw_data": 5}))))
        .unwrap();

    let seen = transport.last();
    assert_eq!(seen.body, None);
    assert_eq!(seen.content_type, CONTENT_TYPE_JSON);
}

#[test]
fn body_encoding_branches_directly() {
    assert_eq!(BodyEncoding::encode(&Params::new()), BodyEncoding::Empty);
    assert_eq!(BodyEncoding::Empty.content_type(), CONTENT_TYPE_JSON);
    assert_eq!(
        BodyEncoding::encode(&params(json!({"raw_data": "x"}))),
        BodyEncoding::Raw(b"x".to_vec())
    );
    assert_eq!(
        BodyEncoding::encode(&params(json!({"raw_data": {"not": "text"}}))),
        BodyEncoding::Empty
    );
    let encoded = BodyEncoding::encode(&params(json!({"a": 1})));
    assert_eq!(encoded, BodyEncoding::Json(br#"{"a":1}"#.to_vec()));
    assert_eq!(encoded.content_type(), CONTENT_TYPE_JSON);
}

fn server_list() -> Method {
    load_one(
        r#"
base_url: http://test
methods:
  - name: server_list
    url: [GET, "/servers"]
    outputs:
      ids: {json_extract: "/ids"}
"#,
    )
}

#[test]
fn success_with_array_output_splats_into_a_list() {
    let transport = MockTransport::new(200, r#"{"ids": [1, 2, 3]}"#);
    let result = server_list().call(&transport, None).unwrap();
    assert_eq!(result.outputs["ids"], vec![json!(1), json!(2), json!(3)]);
    assert!(result.is_success());
}

#[test]
fn scalar_output_is_normalized_to_a_single_element_list() {
    let method = load_one(
        r#"
base_url: http://test
methods:
  - name: item_get
    url: [GET, "/item"]
    outputs:
      id: {json_extract: "/id"}
"#,
    );
    let transport = MockTransport::new(200, r#"{"id": 7}"#);
    let result = method.call(&transport, None).unwrap();
    assert_eq!(result.outputs["id"], vec![json!(7)]);
}

#[test]
fn wildcard_output_collects_every_match() {
    let method = load_one(
        r#"
base_url: http://test
methods:
  - name: server_list
    url: [GET, "/servers"]
    outputs:
      server_ids: {json_extract: "/servers/*/id"}
"#,
    );
    let transport = MockTransport::new(200, r#"{"servers": [{"id": 1}, {"id": 2}]}"#);
    let result = method.call(&transport, None).unwrap();
    assert_eq!(result.outputs["server_ids"], vec![json!(1), json!(2)]);
}

#[test]
fn non_2xx_response_leaves_outputs_empty() {
    let transport = MockTransport::new(404, r#"{"ids": [1, 2, 3]}"#);
    let result = server_list().call(&transport, None).unwrap();
    assert!(result.outputs.is_empty());
    assert_eq!(result.status, Some(404));
    assert!(!result.is_success());
}

#[test]
fn empty_body_leaves_outputs_empty() {
    let transport = MockTransport::new(200, "");
    let result = server_list().call(&transport, None).unwrap();
    assert!(result.outputs.is_empty());
}

#[test]
fn undecodable_body_abandons_extraction_but_keeps_the_record() {
    let transport = MockTransport::new(200, "not json at all");
    let result = server_list().call(&transport, None).unwrap();
    assert!(result.outputs.is_empty());
    assert_eq!(result.response_body.as_deref(), Some("not json at all"));
    assert_eq!(result.status, Some(200));
}

#[test]
fn failing_output_is_omitted_without_touching_its_siblings() {
    let method = load_one(
        r#"
base_url: http://test
methods:
  - name: server_list
    url: [GET, "/servers"]
    outputs:
      ids: {json_extract: "/ids"}
      missing: {json_extract: "/nope/deeper"}
"#,
    );
    let transport = MockTransport::new(200, r#"{"ids": [1]}"#);
    let result = method.call(&transport, None).unwrap();
    assert_eq!(result.outputs["ids"], vec![json!(1)]);
    assert!(!result.outputs.contains_key("missing"));
}

#[test]
fn transport_failure_is_the_one_error_call_surfaces() {
    let err = server_list().call(&FailingTransport, None).unwrap_err();
    assert!(matches!(err, TransportError::Timeout));
}

#[test]
fn call_result_serializes_for_reporting() {
    let transport = MockTransport::new(200, r#"{"ids": [1]}"#);
    let result = server_list().call(&transport, None).unwrap();
    let report = serde_json::to_value(&result).unwrap();
    assert_eq!(report["name"], "server_list");
    assert_eq!(report["http_method"], "GET");
    assert_eq!(report["status"], 200);
    assert_eq!(report["outputs"]["ids"], json!([1]));
}
