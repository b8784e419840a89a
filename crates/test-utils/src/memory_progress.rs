use std::sync::{Arc, Mutex};

use learnbench::errors::Result;
use learnbench::progress::ProgressSink;

/// In-memory `ProgressSink` that records the writes the session performs.
pub struct MemoryProgress {
    attempts: Arc<Mutex<Vec<(String, String)>>>,
    completions: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemoryProgress {
    pub fn new(
        attempts: Arc<Mutex<Vec<(String, String)>>>,
        completions: Arc<Mutex<Vec<(String, String)>>>,
    ) -> Self {
        Self {
            attempts,
            completions,
        }
    }
}

impl ProgressSink for MemoryProgress {
    fn record_attempt(&mut self, exercise_id: &str, code: &str) -> Result<()> {
        self.attempts
            .lock()
            .unwrap()
            .push((exercise_id.to_string(), code.to_string()));
        Ok(())
    }

    fn record_completion(&mut self, exercise_id: &str, code: &str) -> Result<()> {
        self.completions
            .lock()
            .unwrap()
            .push((exercise_id.to_string(), code.to_string()));
        Ok(())
    }
}
