//! Log output of the driver, captured with `tracing-test`.

use ssg3021x::prelude::*;
use tracing_test::traced_test;

fn mock_driver(mock: &MockTransport) -> Ssg3021x<MockTransport> {
    Ssg3021x::with_transport(ConnectionSettings::new("mock", 5025), mock.clone()).unwrap()
}

#[tokio::test]
#[traced_test]
async fn test_connect_logs_serial_and_firmware() {
    let mock = MockTransport::new();
    let mut ssg = mock_driver(&mock);
    ssg.connect().await.unwrap();

    assert!(logs_contain("SSG3021X connected"));
    assert!(logs_contain("SSG3XBAQ000001"));
}

#[tokio::test]
#[traced_test]
async fn test_identity_rejection_is_warned() {
    let mock = MockTransport::new().with_identity("Rigol Technologies,DSG815,DSG8A0001,00.01.05");
    let mut ssg = mock_driver(&mock);
    assert!(ssg.connect().await.is_err());

    assert!(logs_contain("identity check failed"));
}

#[tokio::test]
#[traced_test]
async fn test_session_drop_is_logged() {
    let mock = MockTransport::new();
    {
        let _session = mock_driver(&mock).open_session().await.unwrap();
    }

    assert!(logs_contain("session dropped without close"));
}
