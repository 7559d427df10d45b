use fieldkit_core::{FormConfig, SubmitHandler};
use fieldkit_schema::Record;
use fieldkit_test_utils::*;
use std::time::Duration;

#[test]
fn demo_fixtures_are_reexported() {
    assert_eq!(fruit_options().len(), 4);
    assert!(times_schema().is_ok());
}

#[tokio::test(start_paused = true)]
async fn recording_submit_counts_and_fails_on_demand() {
    let ok = RecordingSubmit::new(Duration::from_millis(5));
    let values = flat_defaults();
    assert_eq!(ok.submit(values.clone()).await.unwrap(), values.clone().into_value());
    assert_eq!(ok.calls(), 1);
    assert_eq!(ok.last_values(), Some(values));

    let failing = RecordingSubmit::failing(Duration::ZERO, "nope");
    assert_eq!(failing.submit(Record::new()).await.unwrap_err().message(), "nope");
    assert_eq!(failing.calls(), 1);
    assert_eq!(FormConfig::default().submit_delay_ms, 1500);
}
