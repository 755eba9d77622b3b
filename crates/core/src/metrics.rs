//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`
//! 매크로를 호출합니다. 익스포터 설치는 호스트 애플리케이션의 몫입니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `logwire_`
//! - 모듈명: `shipper_`
//! - 접미어: `_total` (counter), 없음 (gauge)
//!
//! # 사용 예시
//!
//! ```ignore
//! use metrics::counter;
//!
//! counter!(logwire_core::metrics::SHIPPER_RECORDS_DISPATCHED_TOTAL).increment(1);
//! ```

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 레코드 종류 레이블 키 (plain, structured)
pub const LABEL_KIND: &str = "kind";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// ─── Log Shipper 메트릭 ─────────────────────────────────────────────

/// Shipper: 정규화된 레코드 수 (counter, label: kind)
pub const SHIPPER_RECORDS_NORMALIZED_TOTAL: &str = "logwire_shipper_records_normalized_total";

/// Shipper: 백그라운드 전송으로 넘긴 레코드 수 (counter)
pub const SHIPPER_RECORDS_DISPATCHED_TOTAL: &str = "logwire_shipper_records_dispatched_total";

/// Shipper: 전송 호출 자체가 실패한 수 (counter)
pub const SHIPPER_SEND_FAILURES_TOTAL: &str = "logwire_shipper_send_failures_total";

/// Shipper: 수집기가 성공 외 코드로 응답한 수 (counter)
pub const SHIPPER_REJECTED_TOTAL: &str = "logwire_shipper_rejected_total";

/// Shipper: 연결 시도 수 (counter, label: result)
pub const SHIPPER_RECONNECT_ATTEMPTS_TOTAL: &str = "logwire_shipper_reconnect_attempts_total";

/// Shipper: 채널 준비 상태 (gauge, 1 = READY)
pub const SHIPPER_CONNECTION_READY: &str = "logwire_shipper_connection_ready";

// ─── 설명 등록 함수 ─────────────────────────────────────────────────

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge};

    describe_counter!(
        SHIPPER_RECORDS_NORMALIZED_TOTAL,
        "Total number of log entries normalized, by record kind"
    );
    describe_counter!(
        SHIPPER_RECORDS_DISPATCHED_TOTAL,
        "Total number of records handed to background delivery"
    );
    describe_counter!(
        SHIPPER_SEND_FAILURES_TOTAL,
        "Total number of collector submissions that failed at the transport level"
    );
    describe_counter!(
        SHIPPER_REJECTED_TOTAL,
        "Total number of collector responses with a non-success code"
    );
    describe_counter!(
        SHIPPER_RECONNECT_ATTEMPTS_TOTAL,
        "Total number of collector connection attempts, by result"
    );
    describe_gauge!(
        SHIPPER_CONNECTION_READY,
        "Whether the collector channel was READY at the last supervisor tick"
    );
}
