//! 연결 감시자
//!
//! [`ConnectionSupervisor`]는 수집기 연결을 독점적으로 소유하고, 고정 주기로
//! 연결 상태를 점검하여 READY가 아니면 재연결을 요청합니다.
//! 백오프나 재시도 상한은 없습니다. 매 점검 주기가 곧 재시도 주기입니다.
//!
//! # 사용 예시
//! ```ignore
//! let supervisor = ConnectionSupervisor::new(connection, Duration::from_secs(5));
//! let handle = supervisor.handle();      // 디스패처에 전달
//! tokio::spawn(supervisor.monitor(cancel.child_token()));
//! ```

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use logwire_core::metrics as m;

use crate::DIAGNOSTICS_TARGET;
use crate::transport::Connection;

/// 연결 감시자
pub struct ConnectionSupervisor<C: Connection> {
    connection: C,
    poll_interval: Duration,
}

impl<C: Connection> ConnectionSupervisor<C> {
    /// 감시자를 생성합니다.
    ///
    /// 연결이 READY가 아니면 첫 연결 시도를 즉시 요청합니다 (블로킹하지 않음).
    pub fn new(connection: C, poll_interval: Duration) -> Self {
        if !connection.state().is_ready() {
            connection.connect();
        }
        Self {
            connection,
            poll_interval,
        }
    }

    /// 전송 전용 핸들을 반환합니다.
    pub fn handle(&self) -> C::Handle {
        self.connection.handle()
    }

    /// 점검 주기
    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// 취소될 때까지 연결 상태를 감시합니다.
    ///
    /// 첫 점검은 한 주기가 지난 뒤에 수행합니다. 종료 시 연결을 닫습니다.
    pub async fn monitor(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval의 첫 tick은 즉시 완료됨
        ticker.tick().await;

        debug!(interval = ?self.poll_interval, "connection supervisor started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!("connection supervisor cancelled");
                    break;
                }
                _ = ticker.tick() => self.check(),
            }
        }

        self.connection.close();
    }

    /// 한 번의 상태 점검
    fn check(&self) {
        let state = self.connection.state();
        let ready = state.is_ready();
        metrics::gauge!(m::SHIPPER_CONNECTION_READY).set(if ready { 1.0 } else { 0.0 });

        if !ready {
            warn!(
                target: DIAGNOSTICS_TARGET,
                state = %state,
                "collector channel not ready, reconnecting"
            );
            self.connection.connect();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};

    use crate::proto::{EventLog, SendEventResponse};
    use crate::transport::{ConnectivityState, EventSink};

    #[derive(Clone)]
    struct NullSink;

    impl EventSink for NullSink {
        async fn send_event(&self, _event: EventLog) -> Result<SendEventResponse, tonic::Status> {
            Ok(SendEventResponse::default())
        }
    }

    /// 상태를 외부에서 조작할 수 있는 테스트용 연결
    #[derive(Clone)]
    struct MockConnection {
        state: Arc<AtomicU8>,
        connects: Arc<AtomicUsize>,
        closed: Arc<AtomicBool>,
        /// true면 connect() 호출 시 READY로 전환
        heal_on_connect: bool,
    }

    impl MockConnection {
        fn new(state: ConnectivityState) -> Self {
            Self {
                state: Arc::new(AtomicU8::new(state as u8)),
                connects: Arc::new(AtomicUsize::new(0)),
                closed: Arc::new(AtomicBool::new(false)),
                heal_on_connect: false,
            }
        }

        fn set_state(&self, state: ConnectivityState) {
            self.state.store(state as u8, Ordering::SeqCst);
        }

        fn connects(&self) -> usize {
            self.connects.load(Ordering::SeqCst)
        }
    }

    impl Connection for MockConnection {
        type Handle = NullSink;

        fn state(&self) -> ConnectivityState {
            ConnectivityState::from_u8(self.state.load(Ordering::SeqCst))
        }

        fn connect(&self) {
            self.connects.fetch_add(1, Ordering::SeqCst);
            if self.heal_on_connect {
                self.set_state(ConnectivityState::Ready);
            }
        }

        fn handle(&self) -> NullSink {
            NullSink
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    const INTERVAL: Duration = Duration::from_secs(5);

    #[tokio::test(start_paused = true)]
    async fn new_connects_eagerly_when_not_ready() {
        let conn = MockConnection::new(ConnectivityState::Idle);
        let _supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        assert_eq!(conn.connects(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn new_skips_connect_when_ready() {
        let conn = MockConnection::new(ConnectivityState::Ready);
        let _supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        assert_eq!(conn.connects(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_happens_after_one_interval() {
        let conn = MockConnection::new(ConnectivityState::TransientFailure);
        let supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor.monitor(cancel.clone()));

        tokio::time::sleep(INTERVAL - Duration::from_secs(1)).await;
        assert_eq!(conn.connects(), 1, "only the eager connect before the first tick");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(conn.connects(), 2);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn each_non_ready_tick_triggers_one_connect() {
        let conn = MockConnection::new(ConnectivityState::TransientFailure);
        let supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor.monitor(cancel.clone()));

        // 5s, 10s, 15s 에 점검
        tokio::time::sleep(INTERVAL * 3 + Duration::from_secs(1)).await;
        assert_eq!(conn.connects(), 1 + 3);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn ready_ticks_trigger_no_connect() {
        let conn = MockConnection::new(ConnectivityState::Ready);
        let supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor.monitor(cancel.clone()));

        tokio::time::sleep(INTERVAL * 4 + Duration::from_secs(1)).await;
        assert_eq!(conn.connects(), 0);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stops_reconnecting_once_healed() {
        let mut conn = MockConnection::new(ConnectivityState::Connecting);
        conn.heal_on_connect = true;
        let supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        // 생성 시 connect()로 이미 READY
        assert_eq!(conn.connects(), 1);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor.monitor(cancel.clone()));

        tokio::time::sleep(INTERVAL * 2 + Duration::from_secs(1)).await;
        assert_eq!(conn.connects(), 1);

        // 다시 끊기면 다음 점검에서 한 번 재연결
        conn.set_state(ConnectivityState::TransientFailure);
        tokio::time::sleep(INTERVAL).await;
        assert_eq!(conn.connects(), 2);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_closes_connection() {
        let conn = MockConnection::new(ConnectivityState::Ready);
        let supervisor = ConnectionSupervisor::new(conn.clone(), INTERVAL);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(supervisor.monitor(cancel.clone()));

        cancel.cancel();
        task.await.unwrap();
        assert!(conn.closed.load(Ordering::SeqCst));
    }
}
