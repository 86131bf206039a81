//! Serves recorded interactions back in order.

use std::collections::{HashMap, VecDeque};

use super::format::{Cassette, Interaction};

/// Replays interactions from a loaded cassette.
///
/// Each `port::method` pair has its own queue, so calls on different methods
/// may interleave differently from the recording.
pub struct CassetteReplayer {
    queues: HashMap<(String, String), VecDeque<Interaction>>,
}

impl CassetteReplayer {
    /// Create a new replayer from a loaded cassette.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<(String, String), VecDeque<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            queues
                .entry((interaction.port.clone(), interaction.method.clone()))
                .or_default()
                .push_back(interaction.clone());
        }
        Self { queues }
    }

    /// Take the next interaction recorded for `port` and `method`.
    ///
    /// # Panics
    ///
    /// Panics if nothing (more) was recorded for the pair, listing what the
    /// cassette still holds.
    pub fn next_interaction(&mut self, port: &str, method: &str) -> Interaction {
        let key = (port.to_string(), method.to_string());
        if let Some(interaction) = self.queues.get_mut(&key).and_then(VecDeque::pop_front) {
            return interaction;
        }

        let mut remaining: Vec<String> = self
            .queues
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|((port, method), queue)| format!("{port}::{method} ({})", queue.len()))
            .collect();
        remaining.sort();
        panic!(
            "Cassette exhausted: no interactions left for port={port:?} method={method:?}. \
             Remaining: [{}]",
            remaining.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn interaction(seq: u64, port: &str, method: &str, output: serde_json::Value) -> Interaction {
        Interaction { seq, port: port.into(), method: method.into(), input: json!({}), output }
    }

    fn cassette(interactions: Vec<Interaction>) -> Cassette {
        Cassette {
            name: "test".into(),
            recorded_at: Utc::now(),
            repo: "octo/widgets".into(),
            interactions,
        }
    }

    #[test]
    fn serves_each_method_in_recorded_order() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![
            interaction(0, "tracker", "mutate", json!({"ok": null})),
            interaction(1, "pages", "fetch", json!({"ok": {"status": 200, "body": ""}})),
            interaction(2, "tracker", "mutate", json!({"err": "rate limited"})),
        ]));

        assert_eq!(replayer.next_interaction("tracker", "mutate").seq, 0);
        assert_eq!(replayer.next_interaction("pages", "fetch").seq, 1);
        let second = replayer.next_interaction("tracker", "mutate");
        assert_eq!(second.output, json!({"err": "rate limited"}));
    }

    #[test]
    #[should_panic(expected = "Cassette exhausted")]
    fn exhausted_method_panics() {
        let mut replayer =
            CassetteReplayer::new(&cassette(vec![interaction(0, "clock", "now", json!("x"))]));
        let _ = replayer.next_interaction("clock", "now");
        let _ = replayer.next_interaction("clock", "now");
    }

    #[test]
    #[should_panic(expected = "pages::fetch (1)")]
    fn panic_lists_remaining_interactions() {
        let mut replayer = CassetteReplayer::new(&cassette(vec![interaction(
            0,
            "pages",
            "fetch",
            json!({}),
        )]));
        let _ = replayer.next_interaction("tracker", "issue");
    }
}
