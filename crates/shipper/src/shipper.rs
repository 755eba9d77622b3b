//! 로그 전송기 -- 연결, 감시자, 디스패처를 조립하여 하나의 생명주기로 관리합니다.
//!
//! # 내부 아키텍처
//! ```text
//! host logger -> ShipperWriter -> Dispatcher -> normalize -> spawn(deliver)
//!                                                               |
//!                                            CollectorHandle::send_event -> collector
//! ConnectionSupervisor::monitor (별도 태스크) -> GrpcConnection::connect
//! ```

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::ShipperConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ShipperError;
use crate::supervisor::ConnectionSupervisor;
use crate::transport::{CollectorHandle, ConnectivityState, GrpcConnection};
use crate::writer::ShipperWriter;

/// 로그 전송기
///
/// # 사용 예시
/// ```ignore
/// use logwire_shipper::{LogShipper, ShipperConfig};
///
/// let shipper = LogShipper::start(ShipperConfig::default())?;
/// logwire_shipper::logging::init_tracing(&general, shipper.writer())?;
///
/// tracing::warn!(order_id = "ORD-00001", "low stock");
///
/// shipper.shutdown().await;
/// ```
pub struct LogShipper {
    writer: ShipperWriter<CollectorHandle>,
    handle: CollectorHandle,
    cancel: CancellationToken,
    supervisor_task: Option<JoinHandle<()>>,
}

impl LogShipper {
    /// 전송기를 시작합니다.
    ///
    /// tokio 런타임 안에서 호출해야 합니다. 네트워크 연결을 기다리지 않으며,
    /// 첫 연결 시도는 백그라운드에서 진행됩니다.
    pub fn start(config: ShipperConfig) -> Result<Self, ShipperError> {
        if !config.enabled {
            return Err(ShipperError::Disabled);
        }
        config.validate()?;

        let runtime = Handle::try_current().map_err(|e| ShipperError::Runtime(e.to_string()))?;

        let connection = GrpcConnection::with_runtime(&config, runtime.clone())?;
        let supervisor = ConnectionSupervisor::new(connection, config.poll_interval);
        let handle = supervisor.handle();

        let dispatcher = Dispatcher::with_runtime(handle.clone(), &config, runtime.clone());
        let writer = ShipperWriter::new(dispatcher);

        let cancel = CancellationToken::new();
        let supervisor_task = runtime.spawn(supervisor.monitor(cancel.child_token()));

        info!(
            endpoint = %config.collector_endpoint,
            poll_interval = ?config.poll_interval,
            "log shipper started"
        );

        Ok(Self {
            writer,
            handle,
            cancel,
            supervisor_task: Some(supervisor_task),
        })
    }

    /// 호스트 로깅 계층에 연결할 writer를 반환합니다.
    pub fn writer(&self) -> ShipperWriter<CollectorHandle> {
        self.writer.clone()
    }

    /// 현재 수집기 연결 상태
    pub fn connection_state(&self) -> ConnectivityState {
        self.handle.state()
    }

    /// 감시자를 중단하고 종료를 기다립니다.
    ///
    /// 이미 예약된 전송 태스크는 추적하지 않으므로 기다리지 않습니다.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.supervisor_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "connection supervisor task failed");
            }
        }
        info!("log shipper stopped");
    }
}

impl Drop for LogShipper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
