//! 도메인 타입 -- 정규화된 로그 레코드와 심각도
//!
//! 호스트 프로그램의 로그 한 줄은 정규화를 거쳐 [`EventRecord`]가 되고,
//! 전송 계층은 이 타입만 보고 수집기로 보낼 메시지를 만듭니다.

use std::collections::HashMap;
use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 심각도 레벨
///
/// `Ord` 구현으로 심각도 비교가 가능합니다
/// (`Unspecified < Trace < Debug < Info < Warn < Error < Fatal`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// 알 수 없는 레벨
    #[default]
    Unspecified,
    /// 추적
    Trace,
    /// 디버그
    Debug,
    /// 정보성
    Info,
    /// 경고
    Warn,
    /// 에러
    Error,
    /// 치명적
    Fatal,
}

impl Severity {
    /// 로그 레벨 문자열을 `(심각도, 심각도 텍스트)`로 변환합니다.
    ///
    /// 대소문자를 구분하지 않습니다. 인식하지 못한 레벨은 `Unspecified`가 되며
    /// 텍스트는 입력을 대소문자 그대로 보존합니다.
    pub fn from_level(level: &str) -> (Self, String) {
        let severity = match level.to_lowercase().as_str() {
            "trace" => Self::Trace,
            "debug" => Self::Debug,
            "info" => Self::Info,
            "warn" | "warning" => Self::Warn,
            "error" => Self::Error,
            "fatal" | "panic" => Self::Fatal,
            _ => return (Self::Unspecified, level.to_owned()),
        };
        (severity, severity.as_str().to_owned())
    }

    /// 소문자 정규 텍스트를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unspecified => "unspecified",
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정규화 결과 종류
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    /// 구조화 디코딩에 실패한 평문 로그
    #[default]
    Plain,
    /// key-value 맵으로 디코딩된 구조화 로그
    Structured,
}

impl RecordKind {
    /// 메트릭 레이블 등에 쓰는 이름
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Structured => "structured",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 정규화된 로그 레코드
///
/// 로그 호출 한 번마다 하나씩 생성되어 전송 계층으로 넘어간 뒤 버려집니다.
/// `attributes`에는 이름 있는 필드로 추출된 예약 키가 들어가지 않습니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    /// 정규화 시각 (원본 로그의 시각 필드가 아님)
    pub timestamp: SystemTime,
    /// 정규화 결과 종류
    pub kind: RecordKind,
    /// 심각도
    pub severity: Severity,
    /// 심각도 텍스트
    pub severity_text: String,
    /// 본문 메시지
    pub body: String,
    /// 분산 추적 ID (없으면 빈 문자열)
    pub trace_id: String,
    /// 스팬 ID (없으면 빈 문자열)
    pub span_id: String,
    /// 보조 에러 컨텍스트 (없으면 빈 문자열)
    pub meta_err: String,
    /// 나머지 필드의 문자열 표현
    pub attributes: HashMap<String, String>,
}

impl EventRecord {
    /// 평문 레코드를 생성합니다. 심각도는 항상 `Info`입니다.
    pub fn plain(body: impl Into<String>) -> Self {
        Self {
            timestamp: SystemTime::now(),
            kind: RecordKind::Plain,
            severity: Severity::Info,
            severity_text: Severity::Info.as_str().to_owned(),
            body: body.into(),
            trace_id: String::new(),
            span_id: String::new(),
            meta_err: String::new(),
            attributes: HashMap::new(),
        }
    }
}

impl fmt::Display for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.severity_text, self.body.trim_end())?;
        if !self.trace_id.is_empty() {
            write!(f, " trace={}", self.trace_id)?;
        }
        if !self.span_id.is_empty() {
            write!(f, " span={}", self.span_id)?;
        }
        Ok(())
    }
}
