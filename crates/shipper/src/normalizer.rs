//! 레코드 정규화기
//!
//! 로그 호출 한 번의 원시 바이트를 [`EventRecord`]로 변환합니다.
//! JSON 객체로 디코딩되면 구조화 레코드, 그렇지 않으면 평문 레코드가 됩니다.
//! 정규화는 I/O를 하지 않으며 실패하지 않습니다.
//!
//! # 사용 예시
//! ```ignore
//! use logwire_shipper::normalizer::RecordNormalizer;
//!
//! let normalizer = RecordNormalizer::default();
//! let record = normalizer.normalize(br#"{"level":"warn","message":"low stock"}"#);
//! assert_eq!(record.body, "low stock");
//! ```

use std::collections::HashMap;
use std::time::SystemTime;

use serde_json::{Map, Value};

use logwire_core::metrics as m;
use logwire_core::types::{EventRecord, RecordKind, Severity};

/// 이름 있는 필드로 추출되어 `attributes`에 들어가지 않는 키
pub const RESERVED_KEYS: &[&str] = &[
    "level", "message", "msg", "time", "trace_id", "traceID", "traceId", "span_id", "spanID",
    "spanId", "meta_err",
];

const TRACE_ID_KEYS: &[&str] = &["trace_id", "traceID", "traceId"];
const SPAN_ID_KEYS: &[&str] = &["span_id", "spanID", "spanId"];

/// 기본 최대 엔트리 크기 (1MB)
pub const DEFAULT_MAX_ENTRY_BYTES: usize = 1024 * 1024;

/// 레코드 정규화기
///
/// 상태가 없으므로 여러 스레드에서 동시에 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    /// 구조화 디코딩을 시도할 최대 엔트리 크기
    max_entry_bytes: usize,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRY_BYTES)
    }
}

impl RecordNormalizer {
    /// 최대 엔트리 크기를 지정하여 정규화기를 생성합니다.
    ///
    /// 이보다 큰 엔트리는 디코딩하지 않고 평문으로 처리합니다.
    pub fn new(max_entry_bytes: usize) -> Self {
        Self { max_entry_bytes }
    }

    /// 원시 엔트리를 정규화합니다.
    pub fn normalize(&self, raw: &[u8]) -> EventRecord {
        let record = match self.decode(raw) {
            Some(fields) => structured(raw, fields),
            None => EventRecord::plain(String::from_utf8_lossy(raw)),
        };

        metrics::counter!(
            m::SHIPPER_RECORDS_NORMALIZED_TOTAL,
            m::LABEL_KIND => record.kind.as_str()
        )
        .increment(1);

        record
    }

    /// JSON 객체 디코딩. 최상위 값이 객체가 아니면 `None`.
    fn decode(&self, raw: &[u8]) -> Option<Map<String, Value>> {
        if raw.len() > self.max_entry_bytes {
            tracing::trace!(
                size = raw.len(),
                max = self.max_entry_bytes,
                "entry exceeds max size, skipping structured decode"
            );
            return None;
        }
        serde_json::from_slice::<Map<String, Value>>(raw).ok()
    }
}

/// 디코딩된 필드 맵으로 구조화 레코드를 구성합니다.
fn structured(raw: &[u8], fields: Map<String, Value>) -> EventRecord {
    let level = fields.get("level").map(stringify_value).unwrap_or_default();

    let body = ["message", "msg"]
        .into_iter()
        .filter_map(|key| fields.get(key).map(stringify_value))
        .find(|text| !text.is_empty())
        .unwrap_or_else(|| String::from_utf8_lossy(raw).into_owned());

    let trace_id = first_present(&fields, TRACE_ID_KEYS);
    let span_id = first_present(&fields, SPAN_ID_KEYS);
    let meta_err = fields.get("meta_err").map(stringify_value).unwrap_or_default();

    let attributes: HashMap<String, String> = fields
        .iter()
        .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), stringify_value(value)))
        .collect();

    let (severity, severity_text) = Severity::from_level(&level);

    EventRecord {
        timestamp: SystemTime::now(),
        kind: RecordKind::Structured,
        severity,
        severity_text,
        body,
        trace_id,
        span_id,
        meta_err,
        attributes,
    }
}

/// 후보 키 중 맵에 존재하는 첫 번째 키의 값을 문자열로 반환합니다.
///
/// 값이 null이거나 빈 문자열이어도 키가 존재하면 탐색을 멈춥니다.
fn first_present(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|key| fields.get(*key))
        .map(stringify_value)
        .unwrap_or_default()
}

/// JSON 값을 속성 문자열로 변환합니다.
///
/// - null: 빈 문자열
/// - 문자열: 그대로
/// - 숫자: 표준 텍스트 표현. 정수값 실수는 소수부 없이 (`42.0` -> `"42"`)
/// - 불리언: `true` / `false`
/// - 배열, 객체: 압축 JSON 텍스트
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            // 1e21 이상은 지수 표기 그대로 둠
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalize(raw: &str) -> EventRecord {
        RecordNormalizer::default().normalize(raw.as_bytes())
    }

    #[test]
    fn structured_warn_with_attribute() {
        let record = normalize(r#"{"level":"warn","message":"low stock","order_id":"ORD-00001"}"#);
        assert_eq!(record.kind, RecordKind::Structured);
        assert_eq!(record.severity, Severity::Warn);
        assert_eq!(record.severity_text, "warn");
        assert_eq!(record.body, "low stock");
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.attributes["order_id"], "ORD-00001");
    }

    #[test]
    fn plain_text_line() {
        let record = normalize("plain text line");
        assert_eq!(record.kind, RecordKind::Plain);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.severity_text, "info");
        assert_eq!(record.body, "plain text line");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn msg_fallback_with_ids_and_number() {
        let record = normalize(r#"{"msg":"ok","trace_id":"t1","span_id":"s1","extra":42}"#);
        assert_eq!(record.body, "ok");
        assert_eq!(record.trace_id, "t1");
        assert_eq!(record.span_id, "s1");
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.attributes["extra"], "42");
        // level 키가 없으면 빈 레벨
        assert_eq!(record.severity, Severity::Unspecified);
        assert_eq!(record.severity_text, "");
    }

    #[test]
    fn plain_preserves_trailing_newline() {
        let record = normalize("connection refused\n");
        assert_eq!(record.body, "connection refused\n");
    }

    #[test]
    fn plain_lossy_decodes_invalid_utf8() {
        let record = RecordNormalizer::default().normalize(&[b'a', 0xff, b'b']);
        assert_eq!(record.kind, RecordKind::Plain);
        assert_eq!(record.body, "a\u{fffd}b");
    }

    #[test]
    fn non_object_json_is_plain() {
        for raw in ["[1,2,3]", "\"just a string\"", "42", "null"] {
            let record = normalize(raw);
            assert_eq!(record.kind, RecordKind::Plain, "input: {raw}");
            assert_eq!(record.body, raw);
        }
    }

    #[test]
    fn empty_message_falls_back_to_msg() {
        let record = normalize(r#"{"message":"","msg":"from msg"}"#);
        assert_eq!(record.body, "from msg");
    }

    #[test]
    fn missing_body_falls_back_to_raw_text() {
        let raw = r#"{"level":"error","code":7}"#;
        let record = normalize(raw);
        assert_eq!(record.body, raw);
        assert_eq!(record.severity, Severity::Error);
        assert_eq!(record.attributes["code"], "7");
    }

    #[test]
    fn alternate_id_spellings() {
        let record = normalize(r#"{"message":"m","traceID":"T","spanId":"S"}"#);
        assert_eq!(record.trace_id, "T");
        assert_eq!(record.span_id, "S");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn present_null_trace_id_stops_search() {
        let record = normalize(r#"{"message":"m","trace_id":null,"traceId":"later"}"#);
        assert_eq!(record.trace_id, "");
        assert!(!record.attributes.contains_key("traceId"));
    }

    #[test]
    fn meta_err_extracted() {
        let record = normalize(r#"{"level":"error","message":"db down","meta_err":"timeout"}"#);
        assert_eq!(record.meta_err, "timeout");
        assert!(record.attributes.is_empty());
    }

    #[test]
    fn reserved_keys_never_in_attributes() {
        let raw = r#"{"level":"info","message":"a","msg":"b","time":"2024-01-15T12:00:00Z",
            "trace_id":"1","traceID":"2","traceId":"3","span_id":"4","spanID":"5","spanId":"6",
            "meta_err":"e","user":"alice"}"#;
        let record = normalize(raw);
        for key in RESERVED_KEYS {
            assert!(!record.attributes.contains_key(*key), "reserved key leaked: {key}");
        }
        assert_eq!(record.attributes.len(), 1);
        assert_eq!(record.attributes["user"], "alice");
    }

    #[test]
    fn nested_values_are_compact_json() {
        let record = normalize(r#"{"message":"m","tags":["a","b"],"ctx":{"k":1},"ok":true,"n":null}"#);
        assert_eq!(record.attributes["tags"], r#"["a","b"]"#);
        assert_eq!(record.attributes["ctx"], r#"{"k":1}"#);
        assert_eq!(record.attributes["ok"], "true");
        assert_eq!(record.attributes["n"], "");
    }

    #[test]
    fn unknown_level_preserves_text() {
        let record = normalize(r#"{"level":"NOTICE","message":"m"}"#);
        assert_eq!(record.severity, Severity::Unspecified);
        assert_eq!(record.severity_text, "NOTICE");
    }

    #[test]
    fn numeric_level_is_stringified() {
        let record = normalize(r#"{"level":30,"message":"m"}"#);
        assert_eq!(record.severity, Severity::Unspecified);
        assert_eq!(record.severity_text, "30");
    }

    #[test]
    fn oversized_entry_is_plain() {
        let normalizer = RecordNormalizer::new(16);
        let raw = br#"{"level":"warn","message":"this is long"}"#;
        let record = normalizer.normalize(raw);
        assert_eq!(record.kind, RecordKind::Plain);
        assert_eq!(record.severity, Severity::Info);
        assert_eq!(record.body.as_bytes(), raw);
    }

    #[test]
    fn stringify_numbers() {
        assert_eq!(stringify_value(&serde_json::json!(42)), "42");
        assert_eq!(stringify_value(&serde_json::json!(-1.5)), "-1.5");
        assert_eq!(stringify_value(&serde_json::json!(false)), "false");
    }

    #[test]
    fn integral_floats_drop_fraction() {
        assert_eq!(stringify_value(&serde_json::json!(42.0)), "42");
        assert_eq!(stringify_value(&serde_json::json!(-3.0)), "-3");
        assert_eq!(stringify_value(&serde_json::json!(0.25)), "0.25");

        let record = normalize(r#"{"msg":"paid","amount":42.0,"qty":3}"#);
        assert_eq!(record.attributes["amount"], "42");
        assert_eq!(record.attributes["qty"], "3");
    }

    #[test]
    fn timestamp_is_assigned_at_normalization() {
        let before = SystemTime::now();
        let record = normalize(r#"{"message":"m","time":"1999-01-01T00:00:00Z"}"#);
        assert!(record.timestamp >= before);
    }

    // Property-based tests using proptest
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn normalize_arbitrary_bytes_does_not_panic(bytes in prop::collection::vec(any::<u8>(), 0..1000)) {
                let _ = RecordNormalizer::default().normalize(&bytes);
            }

            #[test]
            fn reserved_keys_never_leak(
                key in prop::sample::select(RESERVED_KEYS.to_vec()),
                value in "[a-z0-9]{0,16}",
                extra in "[a-z]{1,8}",
            ) {
                let mut map = Map::new();
                map.insert(key.to_owned(), Value::String(value));
                map.insert(format!("x_{extra}"), Value::Bool(true));
                let raw = serde_json::to_vec(&map).unwrap();
                let record = RecordNormalizer::default().normalize(&raw);
                prop_assert_eq!(record.kind, RecordKind::Structured);
                for reserved in RESERVED_KEYS {
                    prop_assert!(!record.attributes.contains_key(*reserved));
                }
                prop_assert_eq!(record.attributes.len(), 1);
            }

            #[test]
            fn non_json_text_is_verbatim_plain(text in "[a-zA-Z ]{1,200}") {
                let record = RecordNormalizer::default().normalize(text.as_bytes());
                prop_assert_eq!(record.kind, RecordKind::Plain);
                prop_assert_eq!(record.body, text);
                prop_assert_eq!(record.severity, Severity::Info);
            }
        }
    }
}
