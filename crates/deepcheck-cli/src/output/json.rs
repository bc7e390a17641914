//! JSON output adapter.

use anyhow::Result;
use deepcheck_core::{ResultOutput, VideoVerdict};
use std::io::{self, Write};
use std::sync::Mutex;

/// JSON Lines output adapter.
pub struct JsonOutput {
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonOutput {
    /// Creates a new JSON output writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Box::new(io::stdout()))
    }

    /// Creates a new JSON output writing to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Writes a batch of verdicts as a JSON array.
    #[allow(clippy::significant_drop_tightening)]
    pub fn write_array(&self, verdicts: &[VideoVerdict], pretty: bool) -> Result<()> {
        let json = if pretty {
            serde_json::to_string_pretty(verdicts)?
        } else {
            serde_json::to_string(verdicts)?
        };
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }
}

impl ResultOutput for JsonOutput {
    #[allow(clippy::significant_drop_tightening)]
    fn write(&self, verdict: &VideoVerdict) -> Result<()> {
        let json = serde_json::to_string(verdict)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writeln!(writer, "{json}")?;
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    fn flush(&self) -> Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {e}"))?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use deepcheck_core::Label;
    use std::sync::Arc;

    /// Writer sharing its buffer so tests can inspect what was written.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn fake(video: &str) -> VideoVerdict {
        VideoVerdict {
            video: video.into(),
            label: Label::Fake,
            score: 1.0,
        }
    }

    #[test]
    fn test_jsonl_one_object_per_line() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        output.write(&fake("a")).unwrap();
        output.write(&VideoVerdict::unknown("b")).unwrap();
        output.flush().unwrap();

        let text = buf.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#"{"video":"a","label":"Fake","score":1.0}"#);
        assert_eq!(lines[1], r#"{"video":"b","label":"Unknown","score":0.0}"#);
    }

    #[test]
    fn test_json_array() {
        let buf = SharedBuf::default();
        let output = JsonOutput::new(Box::new(buf.clone()));
        output.write_array(&[fake("a")], false).unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&buf.text()).unwrap();
        assert_eq!(parsed[0]["label"], "Fake");
    }
}
