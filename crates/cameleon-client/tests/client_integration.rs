//! End-to-end tests against a mock controller on an ephemeral local port.
//!
//! The mock speaks the real wire protocol: it strips the 10-digit frame
//! header, captures the XML-RPC request for assertions, and answers with a
//! canned framed response.

use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use cameleon_client::CameleonClient;
use cameleon_protocol::protocol::{
    CameleonError, CredentialStatus, EventTime, EventType, MessagePhase, UpdateStatus, UpdateTime,
};
use cameleon_protocol::transport::framing;
use cameleon_protocol::xmlrpc::Value;

const SET_MESSAGE_OK: &str = "<methodResponse><params><param><value><struct>\
    <member><name>ServerName</name><value><string>Server</string></value></member>\
    <member><name>UpdateStatus</name><value><string>AllUpdated</string></value></member>\
    </struct></value></param></params></methodResponse>";

const SCHEDULED_MESSAGES: &str = "<methodResponse><params><param><value><array><data>\
    <value><struct>\
    <member><name>MessageID</name><value><int>4</int></value></member>\
    <member><name>Recipients</name><value><array><data>\
    <value><string>Device_12</string></value></data></array></value></member>\
    <member><name>UpdateTime</name><value><struct>\
    <member><name>EventType</name><value><int>0</int></value></member>\
    </struct></value></member>\
    <member><name>NextUpdateTime</name><value><dateTime.iso8601>20251224T23:00:00</dateTime.iso8601></value></member>\
    <member><name>UpdateSchedule</name><value><string>Once</string></value></member>\
    <member><name>MessageLevel</name><value><int>2</int></value></member>\
    <member><name>UserName</name><value><string>ops</string></value></member>\
    <member><name>MessageName</name><value><string>Closure</string></value></member>\
    <member><name>EndTime</name><value><struct>\
    <member><name>EventType</name><value><int>0</int></value></member>\
    </struct></value></member>\
    <member><name>NextEndTime</name><value><dateTime.iso8601>20251225T06:00:00</dateTime.iso8601></value></member>\
    <member><name>EndTimeSchedule</name><value><string>Once</string></value></member>\
    </struct></value>\
    </data></array></value></param></params></methodResponse>";

const BUSINESS_ERROR: &str = "<methodResponse><params><param>\
    <value><string>Invalid credentials</string></value>\
    </param></params></methodResponse>";

/// Accept one connection, answer with `response_xml` framed, and report the
/// captured request plus whether the client closed the connection after the
/// exchange.
async fn spawn_controller(response_xml: String) -> (u16, JoinHandle<(String, bool)>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut header = [0u8; framing::HEADER_LEN];
        socket.read_exact(&mut header).await.unwrap();
        let total: usize = std::str::from_utf8(&header).unwrap().parse().unwrap();
        let mut body = vec![0u8; total - framing::HEADER_LEN];
        socket.read_exact(&mut body).await.unwrap();

        let reply = framing::frame(response_xml.as_bytes()).unwrap();
        socket.write_all(&reply).await.unwrap();
        socket.flush().await.unwrap();

        let mut probe = [0u8; 1];
        let closed = matches!(socket.read(&mut probe).await, Ok(0));
        (String::from_utf8(body).unwrap(), closed)
    });
    (port, handle)
}

#[tokio::test]
async fn set_message_immediately_round_trips() {
    let (port, controller) = spawn_controller(SET_MESSAGE_OK.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let response = client
        .set_message_immediately(
            &["Device_12".to_string()],
            2,
            "ops",
            "secret",
            "Closure",
            None,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.server_name, "Server");
    assert_eq!(response.update_status, UpdateStatus::AllUpdated);
    assert!(response.signs_not_updated.is_empty());

    let (request, closed) = controller.await.unwrap();
    assert!(request.contains("<methodName>SetMessage</methodName>"));
    assert!(request.contains("<value><string>Immediately</string></value>"));
    assert!(
        !request.contains("<struct>"),
        "immediate calls must not serialize a schedule struct"
    );
    assert!(closed, "connection must be closed after the exchange");
}

#[tokio::test]
async fn invalid_recipient_fails_before_any_network_activity() {
    // Nothing is listening on this port; a connection attempt would fail
    // with Connection, not InvalidArgument.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = CameleonClient::new("127.0.0.1", port);
    let err = client
        .set_message_immediately(
            &["device_12".to_string()],
            2,
            "ops",
            "secret",
            "Closure",
            None,
            None,
            None,
            None,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, CameleonError::InvalidArgument(_)));
}

#[tokio::test]
async fn mixed_operation_surfaces_the_business_error_string() {
    let (port, controller) = spawn_controller(BUSINESS_ERROR.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let result = client.get_scheduled_messages().await.unwrap();
    assert_eq!(result.error_message(), Some("Invalid credentials"));
    assert_eq!(result.data(), None);
    controller.await.unwrap();
}

#[tokio::test]
async fn mixed_operation_decodes_the_structured_reply() {
    let (port, controller) = spawn_controller(SCHEDULED_MESSAGES.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let result = client
        .cancel_scheduled_messages(&["4".to_string()])
        .await
        .unwrap();

    let messages = result.data().expect("structured reply expected");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].message_id, 4);
    assert_eq!(messages[0].recipients, vec!["Device_12".to_string()]);
    assert_eq!(messages[0].update_time.event_type, EventType::Once);

    let (request, _) = controller.await.unwrap();
    assert!(request.contains("<methodName>CancelScheduledMessages</methodName>"));
    assert!(request.contains("<value><string>4</string></value>"));
}

#[tokio::test]
async fn get_sign_ids_tolerates_partial_directory_entries() {
    let xml = "<methodResponse><params><param><value><array><data>\
        <value><struct>\
        <member><name>ID</name><value><string>12</string></value></member>\
        <member><name>Location</name><value><string>I-90 EB MP 12</string></value></member>\
        </struct></value>\
        <value><struct>\
        <member><name>SignGroup</name><value><string>Eastbound</string></value></member>\
        </struct></value>\
        </data></array></value></param></params></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let signs = client.get_sign_ids().await.unwrap();
    assert_eq!(signs.len(), 2);
    assert_eq!(signs[0].id.as_deref(), Some("12"));
    assert_eq!(signs[0].sign_group, None);
    assert_eq!(signs[1].sign_group.as_deref(), Some("Eastbound"));

    let (request, _) = controller.await.unwrap();
    assert!(request.contains("<methodName>GetSignIDs</methodName>"));
    assert!(
        !request.contains("<params>"),
        "zero-argument calls must omit the params element"
    );
}

#[tokio::test]
async fn fault_reply_is_surfaced_as_a_fault() {
    let xml = "<methodResponse><fault><value><struct>\
        <member><name>faultCode</name><value><int>4</int></value></member>\
        <member><name>faultString</name><value><string>Too many parameters.</string></value></member>\
        </struct></value></fault></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let err = client.get_global_messages().await.unwrap_err();
    match err {
        CameleonError::Fault { code, message } => {
            assert_eq!(code, 4);
            assert_eq!(message, "Too many parameters.");
        }
        other => panic!("expected Fault, got {other:?}"),
    }
    controller.await.unwrap();
}

#[tokio::test]
async fn dont_care_message_name_sends_the_short_arity() {
    let (port, controller) = spawn_controller(SET_MESSAGE_OK.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let phases = [MessagePhase {
        line_text: vec!["ROAD WORK".to_string()],
        dwell_time: 4,
        blank_time: 0.1,
    }];
    client
        .set_message_immediately(
            &["Group_7".to_string()],
            2,
            "ops",
            "secret",
            "DontCare",
            Some(&phases),
            Some(
                chrono::NaiveDate::from_ymd_opt(2025, 12, 24)
                    .unwrap()
                    .and_hms_opt(23, 0, 0)
                    .unwrap(),
            ),
            Some(1),
            Some(1),
        )
        .await
        .unwrap();

    let (request, _) = controller.await.unwrap();
    assert_eq!(
        request.matches("<param>").count(),
        6,
        "sentinel names must not carry the trailing argument group"
    );
}

#[tokio::test]
async fn edit_without_end_time_sends_the_empty_string() {
    let (port, controller) = spawn_controller(SCHEDULED_MESSAGES.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let schedule = EventTime::new(EventType::Once, 0);
    client
        .edit_scheduled_messages(&["4".to_string()], &schedule, None)
        .await
        .unwrap();

    let (request, _) = controller.await.unwrap();
    assert!(request.contains("<methodName>EditScheduledMessages</methodName>"));
    assert_eq!(request.matches("<param>").count(), 3);
    assert!(request.ends_with(
        "<param><value><string></string></value></param></params></methodCall>"
    ));
}

#[tokio::test]
async fn scheduled_update_sends_the_schedule_struct() {
    let (port, controller) = spawn_controller(SET_MESSAGE_OK.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let mut schedule = EventTime::new(EventType::Once, 1);
    schedule.event_time = Some("11:00:00 PM".to_string());
    schedule.day = Some("24/12/2025".to_string());
    client
        .set_message(
            &["Device_12".to_string()],
            UpdateTime::At(schedule),
            2,
            "ops",
            "secret",
            "Closure",
            None,
            None,
            None,
            None,
        )
        .await
        .unwrap();

    let (request, _) = controller.await.unwrap();
    assert!(request.contains("<member><name>EventType</name><value><int>0</int></value></member>"));
    assert!(request.contains("<member><name>IsMessage</name><value><int>1</int></value></member>"));
    assert!(!request.contains("Immediately"));
}

#[tokio::test]
async fn validate_username_password_sends_both_credentials() {
    let xml = "<methodResponse><params><param>\
        <value><string>Valid</string></value></param></params></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let status = client
        .validate_username_password("ops", "secret")
        .await
        .unwrap();
    assert_eq!(status, CredentialStatus::Valid);

    let (request, _) = controller.await.unwrap();
    assert_eq!(request.matches("<param>").count(), 2);
    assert!(request.contains("<value><string>ops</string></value>"));
    assert!(request.contains("<value><string>secret</string></value>"));
}

#[tokio::test]
async fn get_current_message_decodes_the_typed_reply() {
    let xml = "<methodResponse><params><param><value><struct>\
        <member><name>ServerName</name><value><string>Server</string></value></member>\
        <member><name>Color</name><value><int>1</int></value></member>\
        <member><name>FullMatrix</name><value><boolean>1</boolean></value></member>\
        <member><name>message</name><value><array><data>\
        <value><struct>\
        <member><name>LineText</name><value><array><data>\
        <value><string>ROAD WORK</string></value>\
        <value><string>AHEAD</string></value>\
        </data></array></value></member>\
        <member><name>DwellTime</name><value><int>4</int></value></member>\
        <member><name>BlankTime</name><value><double>0.1</double></value></member>\
        </struct></value>\
        </data></array></value></member>\
        <member><name>NumPhases</name><value><int>1</int></value></member>\
        <member><name>NumRows</name><value><int>3</int></value></member>\
        <member><name>MessageName</name><value><string>WorkZone</string></value></member>\
        </struct></value></param></params></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let current = client.get_current_message(12).await.unwrap();
    assert_eq!(current.server_name, "Server");
    assert!(current.full_matrix);
    assert_eq!(current.phases.len(), 1);
    assert_eq!(
        current.phases[0].line_text,
        vec!["ROAD WORK".to_string(), "AHEAD".to_string()]
    );

    let (request, _) = controller.await.unwrap();
    assert!(request.contains("<methodName>GetCurrentMessage</methodName>"));
    assert!(request.contains("<value><int>12</int></value>"));
}

#[tokio::test]
async fn get_current_messages_returns_the_dynamic_struct() {
    let xml = "<methodResponse><params><param><value><struct>\
        <member><name>I-90 EB MP 12</name><value><string>ROAD WORK AHEAD</string></value></member>\
        <member><name>I-90 WB MP 14</name><value><string>ALL CLEAR</string></value></member>\
        </struct></value></param></params></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let messages = client.get_current_messages().await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(
        messages["I-90 EB MP 12"],
        Value::String("ROAD WORK AHEAD".to_string())
    );
    controller.await.unwrap();
}

#[tokio::test]
async fn global_messages_decode_through_the_mixed_slot() {
    let xml = "<methodResponse><params><param><value><array><data>\
        <value><struct>\
        <member><name>ID</name><value><int>1</int></value></member>\
        <member><name>Message</name><value><string>AMBER ALERT</string></value></member>\
        </struct></value>\
        </data></array></value></param></params></methodResponse>";
    let (port, controller) = spawn_controller(xml.to_string()).await;
    let client = CameleonClient::new("127.0.0.1", port);

    let result = client.get_global_messages().await.unwrap();
    let messages = result.data().unwrap();
    assert_eq!(messages[0].id, 1);
    assert_eq!(messages[0].message, "AMBER ALERT");
    controller.await.unwrap();
}

#[tokio::test]
async fn whole_call_deadline_yields_timeout_and_closes_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    // A peer that accepts, reads the request, and never answers.
    let controller = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut header = [0u8; framing::HEADER_LEN];
        socket.read_exact(&mut header).await.unwrap();
        let total: usize = std::str::from_utf8(&header).unwrap().parse().unwrap();
        let mut body = vec![0u8; total - framing::HEADER_LEN];
        socket.read_exact(&mut body).await.unwrap();

        let mut probe = [0u8; 1];
        matches!(socket.read(&mut probe).await, Ok(0))
    });

    let client = CameleonClient::new("127.0.0.1", port).with_timeout(Duration::from_millis(100));
    let err = client.get_sign_ids().await.unwrap_err();
    assert!(matches!(err, CameleonError::Timeout(100)));

    let closed = controller.await.unwrap();
    assert!(closed, "timeout must still close the connection");
}

#[tokio::test]
async fn connection_refused_is_a_connection_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = CameleonClient::new("127.0.0.1", port);
    let err = client.get_sign_ids().await.unwrap_err();
    assert!(matches!(err, CameleonError::Connection(_)));
}
