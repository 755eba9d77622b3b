//! 설정 관리 -- logwire.toml 파싱 및 런타임 설정
//!
//! [`LogwireConfig`]는 모든 섹션의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. 환경변수 (`LOGWIRE_LOG_SHIPPER_COLLECTOR_ENDPOINT=http://collector:50051` 형식)
//! 2. 설정 파일 (`logwire.toml`)
//! 3. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), logwire_core::error::LogwireError> {
//! use logwire_core::config::LogwireConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = LogwireConfig::load("logwire.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = LogwireConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, LogwireError};

/// 폴링/타임아웃 간격 상한 (초)
pub const MAX_INTERVAL_SECS: u64 = 3600;

/// logwire 통합 설정
///
/// `logwire.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogwireConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 로그 전송기 설정
    #[serde(default)]
    pub log_shipper: LogShipperConfig,
}

impl LogwireConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, LogwireError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, LogwireError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                LogwireError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                LogwireError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, LogwireError> {
        toml::from_str(toml_str).map_err(|e| {
            LogwireError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `LOGWIRE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "LOGWIRE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "LOGWIRE_GENERAL_LOG_FORMAT");

        // Log Shipper
        override_bool(&mut self.log_shipper.enabled, "LOGWIRE_LOG_SHIPPER_ENABLED");
        override_string(
            &mut self.log_shipper.collector_endpoint,
            "LOGWIRE_LOG_SHIPPER_COLLECTOR_ENDPOINT",
        );
        override_u64(
            &mut self.log_shipper.poll_interval_secs,
            "LOGWIRE_LOG_SHIPPER_POLL_INTERVAL_SECS",
        );
        override_u64(
            &mut self.log_shipper.connect_timeout_secs,
            "LOGWIRE_LOG_SHIPPER_CONNECT_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.log_shipper.request_timeout_secs,
            "LOGWIRE_LOG_SHIPPER_REQUEST_TIMEOUT_SECS",
        );
        override_string(
            &mut self.log_shipper.success_code,
            "LOGWIRE_LOG_SHIPPER_SUCCESS_CODE",
        );
        override_usize(
            &mut self.log_shipper.max_entry_bytes,
            "LOGWIRE_LOG_SHIPPER_MAX_ENTRY_BYTES",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), LogwireError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.log_shipper.enabled {
            self.log_shipper.validate()?;
        }

        Ok(())
    }
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로컬 진단 로그 형식 (json, pretty)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
        }
    }
}

/// 로그 전송기 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogShipperConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 수집기 gRPC 엔드포인트 (예: "http://localhost:50051")
    pub collector_endpoint: String,
    /// 연결 상태 점검 주기 (초)
    pub poll_interval_secs: u64,
    /// 연결 수립 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 전송 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
    /// 수집기 응답의 성공 코드
    pub success_code: String,
    /// 구조화 디코딩을 시도할 최대 엔트리 크기 (바이트)
    pub max_entry_bytes: usize,
}

impl Default for LogShipperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collector_endpoint: "http://localhost:50051".to_owned(),
            poll_interval_secs: 5,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            success_code: "200".to_owned(),
            max_entry_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl LogShipperConfig {
    /// 전송기 섹션의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let endpoint = self.collector_endpoint.as_str();
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "log_shipper.collector_endpoint".to_owned(),
                reason: format!("'{endpoint}' must start with http:// or https://"),
            });
        }

        let intervals = [
            ("log_shipper.poll_interval_secs", self.poll_interval_secs),
            ("log_shipper.connect_timeout_secs", self.connect_timeout_secs),
            ("log_shipper.request_timeout_secs", self.request_timeout_secs),
        ];
        for (field, secs) in intervals {
            if secs == 0 || secs > MAX_INTERVAL_SECS {
                return Err(ConfigError::InvalidValue {
                    field: field.to_owned(),
                    reason: format!("must be 1-{MAX_INTERVAL_SECS}"),
                });
            }
        }

        if self.success_code.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "log_shipper.success_code".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.max_entry_bytes == 0 {
            return Err(ConfigError::InvalidValue {
                field: "log_shipper.max_entry_bytes".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}
