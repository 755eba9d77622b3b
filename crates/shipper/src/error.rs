//! 로그 전송기 에러 타입
//!
//! [`ShipperError`]는 전송기를 구성하는 시점에 발생하는 에러만 표현합니다.
//! 로그 호출 경로(정규화, 전송)의 실패는 호출자에게 전파되지 않고
//! 진단 로그와 메트릭으로만 드러납니다.
//! `From<ShipperError> for LogwireError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use logwire_core::error::{ConfigError, LogwireError, TransportError};

/// 로그 전송기 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ShipperError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 수집기 엔드포인트 URI 파싱 실패
    #[error("invalid collector endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        /// 입력된 엔드포인트
        endpoint: String,
        /// 실패 사유
        reason: String,
    },

    /// 전송기가 비활성화된 상태에서 시작을 요청함
    #[error("log shipper is disabled")]
    Disabled,

    /// tokio 런타임 밖에서 생성을 시도함
    #[error("no tokio runtime: {0}")]
    Runtime(String),

    /// 전역 tracing subscriber 설치 실패
    #[error("tracing init failed: {0}")]
    TracingInit(String),
}

impl From<ConfigError> for ShipperError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::InvalidValue { field, reason } => Self::Config { field, reason },
            other => Self::Config {
                field: "log_shipper".to_owned(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<ShipperError> for LogwireError {
    fn from(err: ShipperError) -> Self {
        match err {
            ShipperError::Config { field, reason } => {
                LogwireError::Config(ConfigError::InvalidValue { field, reason })
            }
            ShipperError::InvalidEndpoint { endpoint, reason } => {
                LogwireError::Transport(TransportError::InvalidEndpoint { endpoint, reason })
            }
            other => LogwireError::Transport(TransportError::InitFailed(other.to_string())),
        }
    }
}
