#![doc = include_str!("../README.md")]
//!
//! # 모듈 구성
//!
//! - [`normalizer`]: 원시 로그 바이트를 `EventRecord`로 정규화
//! - [`transport`]: 연결/전송 trait과 tonic 기반 수집기 연결
//! - [`supervisor`]: 연결 상태 점검 및 재연결 루프
//! - [`dispatcher`]: 정규화 후 백그라운드 전송 예약
//! - [`writer`]: `io::Write` / `MakeWriter` 어댑터
//! - [`logging`]: tracing subscriber 초기화
//! - [`shipper`]: 전체 조립 및 생명주기
//! - [`config`]: 전송기 설정 (core 설정 확장)
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! tracing -> ShipperWriter -> Dispatcher -> RecordNormalizer -> spawn -> CollectorHandle
//!                                                                             |
//!                        ConnectionSupervisor -> GrpcConnection -------> collector
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod logging;
pub mod normalizer;
pub mod shipper;
pub mod supervisor;
pub mod transport;
pub mod writer;

// collector/v1/collector.proto 에서 생성된 타입
pub mod proto {
    #![allow(clippy::derive_partial_eq_without_eq)]

    include!("proto/collector.v1.rs");

    pub use collector_server::{Collector, CollectorServer};
}

/// 전송기 자신의 진단 로그 타깃. 전송 레이어에서 제외됩니다.
pub const DIAGNOSTICS_TARGET: &str = "logwire::diagnostics";

// --- 주요 타입 re-export ---

pub use config::{ShipperConfig, ShipperConfigBuilder};
pub use dispatcher::Dispatcher;
pub use error::ShipperError;
pub use normalizer::RecordNormalizer;
pub use shipper::LogShipper;
pub use supervisor::ConnectionSupervisor;
pub use transport::{
    CollectorHandle, Connection, ConnectivityState, EventSink, GrpcConnection,
};
pub use writer::ShipperWriter;
