//! tracing 초기화
//!
//! 호스트 프로그램의 `tracing` 이벤트를 두 갈래로 내보냅니다.
//!
//! - stderr fmt 레이어: `[general]` 설정의 `log_format` (json, pretty)
//! - 전송 레이어: 평탄화된 JSON 한 줄을 [`ShipperWriter`](crate::ShipperWriter)로 전달
//!
//! 전송기 자신의 로그(진단 타깃 [`DIAGNOSTICS_TARGET`](crate::DIAGNOSTICS_TARGET) 포함)와 gRPC 전송 스택의
//! 내부 이벤트는 전송 레이어에서 제외되어 stderr로만 출력됩니다. 전송 중에 발생한
//! 이벤트가 다시 전송되면 로그 한 줄이 끝없이 증폭됩니다.

use tracing::Subscriber;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;

use logwire_core::config::GeneralConfig;

use crate::error::ShipperError;

/// 전송 경로에서 이벤트를 내는 크레이트
const TRANSPORT_CRATES: &[&str] = &[
    "tonic",
    "h2",
    "hyper",
    "hyper_util",
    "tower",
    "tokio",
    "tokio_util",
];

/// 전송 레이어로 내보낼 수 있는 타깃인지 확인합니다.
///
/// 타깃의 첫 경로 구간이 `logwire`로 시작하거나(진단 타깃 포함)
/// 전송 스택 크레이트이면 `false`.
pub fn is_shippable_target(target: &str) -> bool {
    let krate = target.split("::").next().unwrap_or(target);
    !krate.starts_with("logwire") && !TRANSPORT_CRATES.contains(&krate)
}

/// 전송 레이어를 생성합니다.
///
/// 이벤트 필드를 최상위로 평탄화한 JSON 한 줄(`{"level":"WARN","message":...}`)을
/// writer에 기록합니다. [`is_shippable_target`]이 거부하는 타깃은 제외합니다.
pub fn shipping_layer<S, W>(writer: W) -> impl Layer<S> + Send + Sync + 'static
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt::layer()
        .json()
        .flatten_event(true)
        .with_current_span(false)
        .with_span_list(false)
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter_fn(|meta| is_shippable_target(meta.target())))
}

/// 전역 tracing subscriber를 초기화합니다.
///
/// 프로세스당 한 번만 호출해야 합니다. `RUST_LOG`가 설정되어 있으면
/// `general.log_level`보다 우선합니다.
///
/// # Formats
///
/// * `"json"` - 기계 파싱용 JSON lines
/// * `"pretty"` - 사람이 읽기 쉬운 형식
pub fn init_tracing<W>(config: &GeneralConfig, writer: W) -> Result<(), ShipperError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .with(shipping_layer(writer))
            .try_init()
            .map_err(|e| {
                ShipperError::TracingInit(format!(
                    "failed to initialize JSON tracing subscriber: {e}"
                ))
            }),
        "pretty" => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_writer(std::io::stderr),
            )
            .with(shipping_layer(writer))
            .try_init()
            .map_err(|e| {
                ShipperError::TracingInit(format!(
                    "failed to initialize pretty tracing subscriber: {e}"
                ))
            }),
        other => Err(ShipperError::TracingInit(format!(
            "unknown log format '{other}', expected 'json' or 'pretty'"
        ))),
    }
}
