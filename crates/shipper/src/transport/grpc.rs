//! tonic 기반 수집기 연결
//!
//! [`GrpcConnection`]은 tonic `Endpoint`와 현재 `Channel`, 그리고 자체 연결 상태를
//! 소유합니다. tonic `Channel`은 연결 상태를 노출하지 않으므로 상태는 연결 시도와
//! 전송 결과로부터 직접 추적합니다.
//!
//! # 채널 교체
//! 재연결에 성공하면 새 `Channel`을 `watch` 채널로 게시합니다. 전송 측은 호출마다
//! 현재 채널을 복제하므로 전송 경로에 락이 없습니다. 채널을 교체하는 쪽은
//! 연결 시도 태스크 하나뿐입니다.

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::runtime::Handle;
use tokio::sync::watch;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

use logwire_core::metrics as m;

use super::{Connection, ConnectivityState, EventSink};
use crate::DIAGNOSTICS_TARGET;
use crate::config::ShipperConfig;
use crate::error::ShipperError;
use crate::proto::collector_client::CollectorClient;
use crate::proto::{EventLog, SendEventResponse};

/// 연결과 핸들이 공유하는 상태
#[derive(Debug)]
struct Shared {
    /// 연결 상태 (`ConnectivityState as u8`)
    state: AtomicU8,
    /// 현재 채널
    channel: watch::Sender<Channel>,
}

impl Shared {
    fn state(&self) -> ConnectivityState {
        ConnectivityState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// 상태를 전환합니다. 종료 상태는 덮어쓰지 않습니다.
    fn transition(&self, next: ConnectivityState) {
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                (current != ConnectivityState::Shutdown as u8).then_some(next as u8)
            });
    }

    /// 연결 시도 권한을 얻습니다. 이미 시도 중이거나 종료됐으면 `false`.
    fn claim_connecting(&self) -> bool {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                match ConnectivityState::from_u8(current) {
                    ConnectivityState::Connecting | ConnectivityState::Shutdown => None,
                    _ => Some(ConnectivityState::Connecting as u8),
                }
            })
            .is_ok()
    }
}

/// 수집기 gRPC 연결
///
/// 연결 감시자가 독점적으로 소유합니다. 생성 직후 상태는 `Idle`이며,
/// 채널은 lazy 채널로 시작하므로 첫 연결 전에도 전송 시도가 가능합니다.
#[derive(Debug)]
pub struct GrpcConnection {
    /// 재연결에 사용할 엔드포인트
    endpoint: Endpoint,
    /// 로그용 엔드포인트 문자열
    target: Arc<str>,
    /// 연결 시도 태스크를 스폰할 런타임
    runtime: Handle,
    shared: Arc<Shared>,
}

impl GrpcConnection {
    /// 설정으로 연결을 생성합니다.
    ///
    /// 네트워크 I/O를 하지 않습니다. 엔드포인트 URI가 잘못됐거나 tokio 런타임
    /// 밖에서 호출하면 에러를 반환합니다.
    pub fn new(config: &ShipperConfig) -> Result<Self, ShipperError> {
        let runtime = Handle::try_current().map_err(|e| ShipperError::Runtime(e.to_string()))?;
        Self::with_runtime(config, runtime)
    }

    /// 지정한 런타임에서 연결 시도를 수행하는 연결을 생성합니다.
    pub fn with_runtime(config: &ShipperConfig, runtime: Handle) -> Result<Self, ShipperError> {
        let endpoint = Endpoint::from_shared(config.collector_endpoint.clone())
            .map_err(|e| ShipperError::InvalidEndpoint {
                endpoint: config.collector_endpoint.clone(),
                reason: e.to_string(),
            })?
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout);

        // lazy 채널은 내부 워커를 스폰하므로 런타임 컨텍스트가 필요함
        let channel = {
            let _guard = runtime.enter();
            endpoint.connect_lazy()
        };
        let (channel, _) = watch::channel(channel);

        debug!(endpoint = %config.collector_endpoint, "collector connection configured (lazy)");

        Ok(Self {
            endpoint,
            target: Arc::from(config.collector_endpoint.as_str()),
            runtime,
            shared: Arc::new(Shared {
                state: AtomicU8::new(ConnectivityState::Idle as u8),
                channel,
            }),
        })
    }

    /// 수집기 엔드포인트
    pub fn target(&self) -> &str {
        &self.target
    }
}

impl Connection for GrpcConnection {
    type Handle = CollectorHandle;

    fn state(&self) -> ConnectivityState {
        self.shared.state()
    }

    fn connect(&self) {
        if !self.shared.claim_connecting() {
            return;
        }

        let endpoint = self.endpoint.clone();
        let shared = Arc::clone(&self.shared);
        let target = Arc::clone(&self.target);

        self.runtime.spawn(async move {
            match endpoint.connect().await {
                Ok(channel) => {
                    shared.channel.send_replace(channel);
                    shared.transition(ConnectivityState::Ready);
                    metrics::counter!(
                        m::SHIPPER_RECONNECT_ATTEMPTS_TOTAL,
                        m::LABEL_RESULT => "success"
                    )
                    .increment(1);
                    debug!(endpoint = %target, "collector channel connected");
                }
                Err(e) => {
                    shared.transition(ConnectivityState::TransientFailure);
                    metrics::counter!(
                        m::SHIPPER_RECONNECT_ATTEMPTS_TOTAL,
                        m::LABEL_RESULT => "failure"
                    )
                    .increment(1);
                    warn!(
                        target: DIAGNOSTICS_TARGET,
                        endpoint = %target,
                        error = %e,
                        "failed to connect to collector"
                    );
                }
            }
        });
    }

    fn handle(&self) -> CollectorHandle {
        CollectorHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    fn close(&self) {
        self.shared
            .state
            .store(ConnectivityState::Shutdown as u8, Ordering::Release);
    }
}

/// 전송 전용 수집기 핸들
///
/// 재연결 제어 권한이 없습니다. 복제 비용이 낮아 로그 호출마다 복제됩니다.
#[derive(Debug, Clone)]
pub struct CollectorHandle {
    shared: Arc<Shared>,
}

impl CollectorHandle {
    /// 현재 연결 상태를 반환합니다 (읽기 전용).
    pub fn state(&self) -> ConnectivityState {
        self.shared.state()
    }
}

impl EventSink for CollectorHandle {
    async fn send_event(&self, event: EventLog) -> Result<SendEventResponse, tonic::Status> {
        let channel = self.shared.channel.borrow().clone();
        let mut client = CollectorClient::new(channel);

        match client.send_event(event).await {
            Ok(response) => {
                self.shared.transition(ConnectivityState::Ready);
                Ok(response.into_inner())
            }
            Err(status) => {
                if status.code() == tonic::Code::Unavailable {
                    self.shared.transition(ConnectivityState::TransientFailure);
                }
                Err(status)
            }
        }
    }
}
