use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::Router;
use doc_intake::config::IntakeConfig;
use doc_intake::workflows::intake::{
    Attachment, CertificateDraft, DocumentKind, DocumentSelection, EntryDraft,
    HttpSubmissionGateway, IdentityDraft, InvoiceDraft, SessionController, SubmissionGateway,
    SubmissionOutcome, SubmissionState, TransportError,
};

#[derive(Debug, Clone)]
struct ReceivedPart {
    name: String,
    file_name: Option<String>,
    content_type: Option<String>,
    body: Vec<u8>,
}

type Received = Arc<Mutex<Vec<Vec<ReceivedPart>>>>;

#[derive(Clone)]
struct IntakeStub {
    status: StatusCode,
    received: Received,
}

async fn intake(State(stub): State<IntakeStub>, mut multipart: Multipart) -> StatusCode {
    let mut parts = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let body = field
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default();
        parts.push(ReceivedPart {
            name,
            file_name,
            content_type,
            body,
        });
    }
    stub.received.lock().expect("received mutex").push(parts);
    stub.status
}

/// Serves the stub on its own thread and runtime; the gateway blocks on a
/// separate runtime of its own.
fn spawn_intake(status: StatusCode) -> (String, Received) {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    listener.set_nonblocking(true).expect("nonblocking listener");
    let addr = listener.local_addr().expect("stub address");

    let received: Received = Arc::new(Mutex::new(Vec::new()));
    let stub = IntakeStub {
        status,
        received: received.clone(),
    };

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("stub runtime");
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(listener).expect("tokio listener");
            let app = Router::new().route("/hook", post(intake)).with_state(stub);
            axum::serve(listener, app).await.expect("stub serves");
        });
    });

    (format!("http://{addr}/hook"), received)
}

/// Direct client so proxy settings in the environment cannot intercept
/// loopback traffic.
fn gateway_for(endpoint: &str) -> HttpSubmissionGateway {
    let client = reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("client builds");
    let runtime = tokio::runtime::Runtime::new().expect("gateway runtime");
    HttpSubmissionGateway::new(client, endpoint, runtime)
}

fn identity() -> IdentityDraft {
    IdentityDraft {
        name: "Yossi Cohen".to_string(),
        phone: "0521234567".to_string(),
    }
}

fn session_with_batch() -> SessionController {
    let mut session = SessionController::default();
    for (client, file) in [("Acme", "march.pdf"), ("", "april.jpg")] {
        let content_type = if file.ends_with(".pdf") {
            "application/pdf"
        } else {
            "image/jpeg"
        };
        session
            .add_entry(EntryDraft::Invoice(InvoiceDraft {
                client_name: client.to_string(),
                client_phone: String::new(),
                file: Some(Attachment::new(file, content_type, file.as_bytes().to_vec())),
            }))
            .expect("valid invoice");
    }
    session
        .add_entry(EntryDraft::Certificate(CertificateDraft {
            certificate_name: "Licensed electrician".to_string(),
            issue_date: "2021-11-30".to_string(),
            file: Some(Attachment::new("license.png", "image/png", vec![0x89, b'P'])),
        }))
        .expect("valid certificate");
    session
}

#[test]
fn accepted_submission_arrives_as_one_ordered_multipart_request() {
    let (endpoint, received) = spawn_intake(StatusCode::OK);
    let gateway = gateway_for(&endpoint);
    let mut session = session_with_batch();

    let receipt = session
        .submit(&identity(), DocumentSelection::Invoices, &gateway)
        .expect("submitted");

    assert_eq!(receipt.outcome, SubmissionOutcome::Success);
    assert_eq!(session.state(DocumentKind::Invoices), SubmissionState::Success);
    assert_eq!(session.len(DocumentKind::Invoices), 0);
    assert_eq!(session.len(DocumentKind::Certificates), 1);

    let requests = received.lock().expect("received mutex").clone();
    assert_eq!(requests.len(), 1, "exactly one request per submit");
    let parts = &requests[0];

    let names: Vec<&str> = parts.iter().map(|part| part.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "professionalName",
            "professionalPhone",
            "documentType",
            "clientsData",
            "invoices",
            "invoices",
        ]
    );
    assert_eq!(parts[0].body, b"Yossi Cohen");
    assert_eq!(parts[2].body, b"invoices");

    let records: Vec<serde_json::Value> =
        serde_json::from_slice(&parts[3].body).expect("metadata is json");
    assert_eq!(records.len(), 2);
    for (i, (record, file)) in records.iter().zip(&parts[4..]).enumerate() {
        assert_eq!(record["index"], i);
        assert_eq!(record["fileName"].as_str(), file.file_name.as_deref());
    }
    assert_eq!(parts[4].file_name.as_deref(), Some("0_march.pdf"));
    assert_eq!(parts[4].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(parts[4].body, b"march.pdf");
    assert_eq!(parts[5].file_name.as_deref(), Some("1_april.jpg"));
    assert_eq!(parts[5].content_type.as_deref(), Some("image/jpeg"));
    assert_eq!(records[1]["clientName"], "");
}

#[test]
fn non_success_status_is_a_generic_failure() {
    let (endpoint, received) = spawn_intake(StatusCode::INTERNAL_SERVER_ERROR);
    let gateway = gateway_for(&endpoint);
    let mut session = session_with_batch();

    let receipt = session
        .submit(&identity(), DocumentSelection::Both, &gateway)
        .expect("attempted");

    assert_eq!(receipt.outcome, SubmissionOutcome::Failure(TransportError));
    assert_eq!(receipt.kinds.len(), 2);
    for kind in DocumentKind::ALL {
        assert_eq!(session.state(kind), SubmissionState::Error);
    }
    assert_eq!(session.len(DocumentKind::Invoices), 2);
    assert_eq!(session.len(DocumentKind::Certificates), 1);

    let requests = received.lock().expect("received mutex");
    assert_eq!(requests.len(), 1, "no automatic retry");
    let document_type = requests[0]
        .iter()
        .find(|part| part.name == "documentType")
        .expect("document type sent");
    assert_eq!(document_type.body, b"both");
}

#[test]
fn unreachable_endpoint_is_the_same_generic_failure() {
    let port = {
        let spare = std::net::TcpListener::bind("127.0.0.1:0").expect("spare port bind");
        spare.local_addr().expect("spare port address").port()
    };
    let gateway = gateway_for(&format!("http://127.0.0.1:{port}/hook"));
    let mut session = session_with_batch();

    let pending = session
        .begin_submission(&identity(), DocumentSelection::Certificates)
        .expect("started");
    let outcome = gateway.send(pending.payload());
    assert_eq!(outcome, SubmissionOutcome::Failure(TransportError));

    let receipt = session.complete(pending, outcome).expect("own session");
    assert_eq!(receipt.entry_count, 1);
    assert_eq!(session.state(DocumentKind::Certificates), SubmissionState::Error);
    assert_eq!(session.len(DocumentKind::Certificates), 1);
}

#[test]
fn gateway_builds_from_config() {
    let config = IntakeConfig::new("http://127.0.0.1:9/hook").expect("valid endpoint");
    let gateway = HttpSubmissionGateway::from_config(&config).expect("gateway builds");
    assert_eq!(gateway.endpoint(), "http://127.0.0.1:9/hook");
    assert!(format!("{gateway:?}").contains("127.0.0.1:9"));
}
