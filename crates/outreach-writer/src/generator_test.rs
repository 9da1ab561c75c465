use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use outreach_core::{ExtractionStatus, RecordRef};

use super::*;

enum Reply {
    Text(&'static str),
    Fail,
    Hang,
}

struct FakeTransport {
    reply: Reply,
    calls: AtomicU32,
}

impl FakeTransport {
    fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl GenerationTransport for FakeTransport {
    async fn complete(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Reply::Text(t) => Ok(t.to_owned()),
            Reply::Fail => Err(GenerationError::UnexpectedStatus {
                status: 500,
                message: "internal".to_owned(),
            }),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

fn generator(transport: Arc<FakeTransport>) -> MessageGenerator {
    MessageGenerator::new(transport, SenderProfile::default(), Duration::from_secs(5))
}

fn prospect() -> ProspectRecord {
    ProspectRecord::new("jane@acme.com", "Acme", "https://acme.com")
}

fn insight(status: ExtractionStatus) -> Insight {
    Insight {
        record: RecordRef {
            position: 3,
            email: "jane@acme.com".to_owned(),
        },
        summary: if status == ExtractionStatus::Ok {
            "Title: Acme".to_owned()
        } else {
            String::new()
        },
        status,
    }
}

#[tokio::test]
async fn successful_generation_is_ai_generated() {
    let transport = FakeTransport::new(Reply::Text("Subject: Hi Acme\n\nBody:\nHello Jane"));
    let msg = generator(Arc::clone(&transport))
        .generate(&prospect(), &insight(ExtractionStatus::Ok), "partnership")
        .await;
    assert_eq!(msg.status, GenerationStatus::AiGenerated);
    assert_eq!(msg.subject, "Hi Acme");
    assert_eq!(msg.body, "Hello Jane");
    assert_eq!(msg.record.position, 3);
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn degraded_insight_still_attempts_generation_once() {
    for status in [ExtractionStatus::FetchFailed, ExtractionStatus::NoContent] {
        let transport = FakeTransport::new(Reply::Text("Subject: Hello\nBody:\nHi"));
        let msg = generator(Arc::clone(&transport))
            .generate(&prospect(), &insight(status), "partnership")
            .await;
        assert_eq!(msg.status, GenerationStatus::AiGenerated);
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }
}

#[tokio::test]
async fn service_error_with_insight_uses_generation_failure_template() {
    let transport = FakeTransport::new(Reply::Fail);
    let msg = generator(Arc::clone(&transport))
        .generate(&prospect(), &insight(ExtractionStatus::Ok), "partnership")
        .await;
    assert_eq!(msg.status, GenerationStatus::FallbackTemplate);
    assert_eq!(msg.subject, "Quick question about Acme");
    assert!(msg.body.contains("partnership"));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn service_error_without_insight_uses_no_insight_template() {
    let transport = FakeTransport::new(Reply::Fail);
    let msg = generator(transport)
        .generate(&prospect(), &insight(ExtractionStatus::FetchFailed), "partnership")
        .await;
    assert_eq!(msg.status, GenerationStatus::FallbackTemplate);
    assert_eq!(msg.subject, "Exploring partnership opportunities with Acme");
}

#[tokio::test]
async fn empty_response_falls_back() {
    let transport = FakeTransport::new(Reply::Text("Subject: Only this\nBody:\n"));
    let msg = generator(transport)
        .generate(&prospect(), &insight(ExtractionStatus::Ok), "partnership")
        .await;
    assert_eq!(msg.status, GenerationStatus::FallbackTemplate);
}

#[tokio::test(start_paused = true)]
async fn hung_service_times_out_into_fallback() {
    let transport = FakeTransport::new(Reply::Hang);
    let started = tokio::time::Instant::now();
    let msg = generator(transport)
        .generate(&prospect(), &insight(ExtractionStatus::Ok), "partnership")
        .await;
    assert_eq!(msg.status, GenerationStatus::FallbackTemplate);
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(5) && elapsed < Duration::from_secs(6));
}

#[tokio::test]
async fn blank_purpose_uses_default() {
    let transport = FakeTransport::new(Reply::Fail);
    let msg = generator(transport)
        .generate(&prospect(), &insight(ExtractionStatus::NoContent), "   ")
        .await;
    assert!(msg.body.contains(DEFAULT_PURPOSE));
}
