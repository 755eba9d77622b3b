//! 수집기 전송 계층
//!
//! 연결 감시자와 디스패처가 의존하는 두 개의 seam을 정의합니다.
//!
//! - [`Connection`]: 연결 상태 조회와 재연결 트리거 (감시자 전용)
//! - [`EventSink`]: 이벤트 전송만 가능한 뷰 (디스패처 전용)
//!
//! 구현체는 [`grpc`] 모듈의 tonic 기반 [`GrpcConnection`]/[`CollectorHandle`]입니다.

pub mod grpc;

use std::fmt;
use std::future::Future;

use logwire_core::types::{EventRecord, Severity};

use crate::proto::{EventLog, SendEventResponse, SeverityNumber};

pub use grpc::{CollectorHandle, GrpcConnection};

/// 채널 연결 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectivityState {
    /// 아직 연결을 시도하지 않음
    Idle = 0,
    /// 연결 시도 중
    Connecting = 1,
    /// 전송 가능
    Ready = 2,
    /// 마지막 연결 또는 전송이 실패함
    TransientFailure = 3,
    /// 종료됨
    Shutdown = 4,
}

impl ConnectivityState {
    /// READY 여부. 감시자는 이 값만 보고 재연결을 결정합니다.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// 상태 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Ready => "ready",
            Self::TransientFailure => "transient_failure",
            Self::Shutdown => "shutdown",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Connecting,
            2 => Self::Ready,
            3 => Self::TransientFailure,
            _ => Self::Shutdown,
        }
    }
}

impl fmt::Display for ConnectivityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 감시 대상 연결
///
/// 연결 감시자가 독점적으로 소유하며, 전송 경로에는 [`Connection::handle`]로
/// 얻은 전송 전용 뷰만 전달됩니다.
pub trait Connection: Send + Sync + 'static {
    /// 전송 전용 핸들 타입
    type Handle: EventSink;

    /// 현재 연결 상태를 반환합니다.
    fn state(&self) -> ConnectivityState;

    /// 재연결을 요청합니다.
    ///
    /// 블로킹하지 않습니다. 연결 시도는 백그라운드에서 진행되고
    /// 결과는 이후의 [`state`](Connection::state) 조회로만 드러납니다.
    fn connect(&self);

    /// 전송 전용 핸들을 반환합니다.
    fn handle(&self) -> Self::Handle;

    /// 연결을 종료 상태로 전환합니다.
    fn close(&self) {}
}

/// 이벤트 전송 대상
///
/// 디스패처는 이 trait만 보고 레코드를 전송합니다. 호출마다 복제되어
/// 백그라운드 태스크로 이동하므로 `Clone + 'static`이어야 합니다.
pub trait EventSink: Clone + Send + Sync + 'static {
    /// 이벤트 하나를 수집기에 전송하고 응답을 반환합니다.
    fn send_event(
        &self,
        event: EventLog,
    ) -> impl Future<Output = Result<SendEventResponse, tonic::Status>> + Send;
}

/// 심각도를 OpenTelemetry 심각도 번호로 변환합니다.
pub fn severity_number(severity: Severity) -> SeverityNumber {
    match severity {
        Severity::Unspecified => SeverityNumber::Unspecified,
        Severity::Trace => SeverityNumber::Trace,
        Severity::Debug => SeverityNumber::Debug,
        Severity::Info => SeverityNumber::Info,
        Severity::Warn => SeverityNumber::Warn,
        Severity::Error => SeverityNumber::Error,
        Severity::Fatal => SeverityNumber::Fatal,
    }
}

impl From<EventRecord> for EventLog {
    fn from(record: EventRecord) -> Self {
        Self {
            time_unix_nano: Some(prost_types::Timestamp::from(record.timestamp)),
            severity: severity_number(record.severity) as i32,
            severity_text: record.severity_text,
            body: record.body,
            trace_id: record.trace_id,
            span_id: record.span_id,
            attributes: record.attributes,
            meta_err: record.meta_err,
        }
    }
}
