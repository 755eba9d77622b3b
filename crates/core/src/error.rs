//! 에러 타입 -- 도메인별 에러 정의

/// logwire 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum LogwireError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 수집기 전송 계층 에러
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 수집기 전송 계층 에러
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// 수집기 엔드포인트 URI가 유효하지 않음
    #[error("invalid collector endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// 전송 계층 초기화 실패
    #[error("transport init failed: {0}")]
    InitFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_to_logwire_error() {
        let err: LogwireError = ConfigError::InvalidValue {
            field: "log_shipper.poll_interval_secs".to_owned(),
            reason: "must be 1-3600".to_owned(),
        }
        .into();
        assert!(matches!(err, LogwireError::Config(_)));
        assert!(err.to_string().contains("poll_interval_secs"));
    }

    #[test]
    fn invalid_endpoint_display() {
        let err = TransportError::InvalidEndpoint {
            endpoint: "localhost:50051".to_owned(),
            reason: "missing scheme".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("localhost:50051"));
        assert!(msg.contains("missing scheme"));
    }

    #[test]
    fn io_error_converts_to_logwire_error() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: LogwireError = io.into();
        assert!(matches!(err, LogwireError::Io(_)));
    }
}
