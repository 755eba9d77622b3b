//! 로그 출력 스트림 어댑터
//!
//! [`ShipperWriter`]는 `std::io::Write`와 `tracing_subscriber`의 `MakeWriter`를
//! 구현하여 호스트의 로깅 계층이 포맷된 로그 한 줄마다 `write`를 호출하도록 합니다.
//! 한 번의 `write` 호출이 하나의 로그 엔트리입니다.

use std::io;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;

use crate::dispatcher::Dispatcher;
use crate::transport::EventSink;

/// 전송기 writer
///
/// 복제 비용이 낮으며 모든 복제본이 같은 디스패처를 공유합니다.
pub struct ShipperWriter<S: EventSink> {
    dispatcher: Arc<Dispatcher<S>>,
}

impl<S: EventSink> ShipperWriter<S> {
    /// 디스패처를 감싸는 writer를 생성합니다.
    pub fn new(dispatcher: Dispatcher<S>) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl<S: EventSink> Clone for ShipperWriter<S> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: Arc::clone(&self.dispatcher),
        }
    }
}

impl<S: EventSink> io::Write for ShipperWriter<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.dispatcher.dispatch(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        // 버퍼링하지 않음
        Ok(())
    }
}

impl<'a, S: EventSink> MakeWriter<'a> for ShipperWriter<S> {
    type Writer = ShipperWriter<S>;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use tokio::sync::mpsc;

    use crate::config::ShipperConfig;
    use crate::proto::{EventLog, SendEventResponse};

    #[derive(Clone)]
    struct ChannelSink(mpsc::UnboundedSender<EventLog>);

    impl EventSink for ChannelSink {
        async fn send_event(&self, event: EventLog) -> Result<SendEventResponse, tonic::Status> {
            let _ = self.0.send(event);
            Ok(SendEventResponse {
                code: "200".to_owned(),
                message: String::new(),
            })
        }
    }

    fn writer() -> (ShipperWriter<ChannelSink>, mpsc::UnboundedReceiver<EventLog>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Dispatcher::new(ChannelSink(tx), &ShipperConfig::default()).unwrap();
        (ShipperWriter::new(dispatcher), rx)
    }

    #[tokio::test]
    async fn write_reports_full_length() {
        let (mut writer, mut rx) = writer();
        let line = b"{\"level\":\"error\",\"message\":\"payment failed\"}\n";
        assert_eq!(writer.write(line).unwrap(), line.len());
        writer.flush().unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.body, "payment failed");
    }

    #[tokio::test]
    async fn write_all_issues_single_entry() {
        let (mut writer, mut rx) = writer();
        writer.write_all(b"one line").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.body, "one line");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn make_writer_shares_dispatcher() {
        let (writer, mut rx) = writer();
        let mut a = writer.make_writer();
        let mut b = writer.make_writer();
        a.write_all(b"a").unwrap();
        b.write_all(b"b").unwrap();

        let mut bodies = Vec::new();
        for _ in 0..2 {
            let event = tokio::time::timeout(Duration::from_secs(1), rx.recv())
                .await
                .unwrap()
                .unwrap();
            bodies.push(event.body);
        }
        bodies.sort();
        assert_eq!(bodies, ["a", "b"]);
    }
}
