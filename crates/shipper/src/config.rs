//! 로그 전송기 설정
//!
//! [`ShipperConfig`]는 core의 [`LogShipperConfig`](logwire_core::config::LogShipperConfig)를
//! 기반으로 전송기 내부에서 쓰는 `Duration` 단위 설정을 제공합니다.
//!
//! # 사용 예시
//! ```ignore
//! use logwire_core::config::LogwireConfig;
//! use logwire_shipper::config::ShipperConfig;
//!
//! let core_config = LogwireConfig::default();
//! let config = ShipperConfig::from_core(&core_config.log_shipper)?;
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use logwire_core::config::{LogShipperConfig, MAX_INTERVAL_SECS};

use crate::error::ShipperError;

/// 로그 전송기 설정
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipperConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수집기 gRPC 엔드포인트
    pub collector_endpoint: String,
    /// 연결 상태 점검 주기
    pub poll_interval: Duration,
    /// 연결 수립 타임아웃
    pub connect_timeout: Duration,
    /// 전송 요청 타임아웃
    pub request_timeout: Duration,
    /// 수집기 응답의 성공 코드
    pub success_code: String,
    /// 구조화 디코딩을 시도할 최대 엔트리 크기 (바이트)
    pub max_entry_bytes: usize,
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self::from_core_unchecked(&LogShipperConfig::default())
    }
}

impl ShipperConfig {
    /// core의 `LogShipperConfig`에서 전송기 설정을 생성합니다.
    ///
    /// 초 단위 값을 `Duration`으로 변환한 뒤 유효성을 검증합니다.
    pub fn from_core(core: &LogShipperConfig) -> Result<Self, ShipperError> {
        let config = Self::from_core_unchecked(core);
        config.validate()?;
        Ok(config)
    }

    fn from_core_unchecked(core: &LogShipperConfig) -> Self {
        Self {
            enabled: core.enabled,
            collector_endpoint: core.collector_endpoint.clone(),
            poll_interval: Duration::from_secs(core.poll_interval_secs),
            connect_timeout: Duration::from_secs(core.connect_timeout_secs),
            request_timeout: Duration::from_secs(core.request_timeout_secs),
            success_code: core.success_code.clone(),
            max_entry_bytes: core.max_entry_bytes,
        }
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ShipperError> {
        let endpoint = self.collector_endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ShipperError::Config {
                field: "collector_endpoint".to_owned(),
                reason: format!("'{endpoint}' must start with http:// or https://"),
            });
        }

        let max = Duration::from_secs(MAX_INTERVAL_SECS);
        let durations = [
            ("poll_interval", self.poll_interval),
            ("connect_timeout", self.connect_timeout),
            ("request_timeout", self.request_timeout),
        ];
        for (field, value) in durations {
            if value.is_zero() || value > max {
                return Err(ShipperError::Config {
                    field: field.to_owned(),
                    reason: format!("must be between 1ms and {MAX_INTERVAL_SECS}s"),
                });
            }
        }

        if self.success_code.trim().is_empty() {
            return Err(ShipperError::Config {
                field: "success_code".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.max_entry_bytes == 0 {
            return Err(ShipperError::Config {
                field: "max_entry_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 전송기 설정 빌더
///
/// 테스트나 임베딩 호스트에서 TOML 없이 설정을 구성할 때 사용합니다.
#[derive(Default)]
pub struct ShipperConfigBuilder {
    config: ShipperConfig,
}

impl ShipperConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 활성화 여부를 설정합니다.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// 수집기 엔드포인트를 설정합니다.
    pub fn collector_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.collector_endpoint = endpoint.into();
        self
    }

    /// 연결 상태 점검 주기를 설정합니다.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// 연결 수립 타임아웃을 설정합니다.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// 전송 요청 타임아웃을 설정합니다.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// 성공 코드를 설정합니다.
    pub fn success_code(mut self, code: impl Into<String>) -> Self {
        self.config.success_code = code.into();
        self
    }

    /// 최대 엔트리 크기를 설정합니다.
    pub fn max_entry_bytes(mut self, bytes: usize) -> Self {
        self.config.max_entry_bytes = bytes;
        self
    }

    /// 설정을 검증하고 `ShipperConfig`를 생성합니다.
    pub fn build(self) -> Result<ShipperConfig, ShipperError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
