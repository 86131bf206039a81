//! Replaying adapters: serve recorded outputs instead of calling out.

pub mod clock;
pub mod pages;
pub mod tracker;

pub use clock::ReplayingClock;
pub use pages::ReplayingPageFetcher;
pub use tracker::ReplayingIssueTracker;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::PortError;

/// Take the next recorded output for `port::method`.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_interaction(port, method).output
}

/// Decode an `{"ok": value}` / `{"err": message}` output.
///
/// Mirror of `recording::record_result`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
) -> Result<T, PortError> {
    if let Some(err) = output.get("err") {
        return Err(err.as_str().unwrap_or("unknown error").to_string().into());
    }
    let value = match output {
        serde_json::Value::Object(mut map) if map.contains_key("ok") => {
            map.remove("ok").unwrap_or_default()
        }
        other => other,
    };
    serde_json::from_value(value).map_err(|e| format!("failed to deserialize replayed output: {e}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replay_result_unwraps_ok() {
        let value: Vec<u64> = replay_result(json!({"ok": [1, 2]})).unwrap();
        assert_eq!(value, vec![1, 2]);
    }

    #[test]
    fn replay_result_surfaces_err_message() {
        let err = replay_result::<()>(json!({"err": "HTTP 502"})).unwrap_err();
        assert_eq!(err.to_string(), "HTTP 502");
    }

    #[test]
    fn replay_result_unit_from_null() {
        replay_result::<()>(json!({"ok": null})).unwrap();
    }
}
