//! 디스패처 -- 로그 호출 한 번을 정규화하고 백그라운드 전송을 예약합니다.
//!
//! 정규화는 호출자 스레드에서 동기적으로 수행하고, 전송은 항상 백그라운드
//! 태스크로 넘깁니다. 평문/구조화 레코드 모두 같은 정책을 따르며,
//! 호출자는 전송 결과를 기다리지 않습니다. 전송 실패는 진단 로그와
//! 메트릭으로만 드러나며 재시도하지 않습니다.

use std::io;
use std::sync::Arc;

use tokio::runtime::Handle;
use tracing::{error, trace, warn};

use logwire_core::metrics as m;

use crate::DIAGNOSTICS_TARGET;
use crate::config::ShipperConfig;
use crate::error::ShipperError;
use crate::normalizer::RecordNormalizer;
use crate::proto::EventLog;
use crate::transport::EventSink;

/// 디스패처
///
/// 생성 시점의 tokio 런타임 핸들을 보관하므로, 런타임 밖의 스레드에서도
/// [`dispatch`](Dispatcher::dispatch)를 호출할 수 있습니다.
pub struct Dispatcher<S: EventSink> {
    normalizer: RecordNormalizer,
    sink: S,
    runtime: Handle,
    success_code: Arc<str>,
}

impl<S: EventSink> Dispatcher<S> {
    /// 현재 tokio 런타임에서 디스패처를 생성합니다.
    pub fn new(sink: S, config: &ShipperConfig) -> Result<Self, ShipperError> {
        let runtime = Handle::try_current().map_err(|e| ShipperError::Runtime(e.to_string()))?;
        Ok(Self::with_runtime(sink, config, runtime))
    }

    /// 지정한 런타임에 전송 태스크를 스폰하는 디스패처를 생성합니다.
    pub fn with_runtime(sink: S, config: &ShipperConfig, runtime: Handle) -> Self {
        Self {
            normalizer: RecordNormalizer::new(config.max_entry_bytes),
            sink,
            runtime,
            success_code: Arc::from(config.success_code.as_str()),
        }
    }

    /// 원시 엔트리 하나를 처리합니다.
    ///
    /// 전송 태스크를 예약한 즉시 `Ok(raw.len())`을 반환합니다.
    /// 정규화와 전송 실패는 호출자에게 에러로 전파되지 않습니다.
    pub fn dispatch(&self, raw: &[u8]) -> io::Result<usize> {
        let event = EventLog::from(self.normalizer.normalize(raw));

        let sink = self.sink.clone();
        let success_code = Arc::clone(&self.success_code);
        // 추적하지 않는 best-effort 전송
        self.runtime.spawn(deliver(sink, event, success_code));

        metrics::counter!(m::SHIPPER_RECORDS_DISPATCHED_TOTAL).increment(1);
        Ok(raw.len())
    }
}

/// 전송 하나를 수행하고 결과를 진단 로그로 남깁니다.
async fn deliver<S: EventSink>(sink: S, event: EventLog, success_code: Arc<str>) {
    match sink.send_event(event).await {
        Ok(response) if response.code == *success_code => {
            trace!(code = %response.code, "event accepted by collector");
        }
        Ok(response) => {
            metrics::counter!(m::SHIPPER_REJECTED_TOTAL).increment(1);
            warn!(
                target: DIAGNOSTICS_TARGET,
                code = %response.code,
                detail = %response.message,
                "collector rejected event"
            );
        }
        Err(status) => {
            metrics::counter!(m::SHIPPER_SEND_FAILURES_TOTAL).increment(1);
            error!(
                target: DIAGNOSTICS_TARGET,
                code = ?status.code(),
                detail = status.message(),
                "failed to send event to collector"
            );
        }
    }
}
