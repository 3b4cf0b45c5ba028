use anyhow::{Context, Result};
use flume::Sender;
use std::io::{BufRead, BufReader};
use std::process::{Child, Command, Stdio};
use std::thread;
use tracing::warn;

/// What a running transcription session reports back to the UI loop.
#[derive(Debug, Clone, PartialEq)]
pub enum TranscriptEvent {
    /// A finalized fragment of recognized speech.
    Fragment(String),
    /// The engine ended the session on its own (silence timeout, EOF,
    /// engine shutdown). The app must report "not listening" on this.
    Ended,
}

/// Handle to a running session. Stopping is explicit; implementations also
/// release the underlying engine when the handle is dropped, so no exit
/// path can leak a recorder.
pub trait TranscriptionSession: Send {
    fn stop(&mut self);
}

/// A speech-to-text collaborator. Starting yields a session handle;
/// finalized fragments arrive on `sink` until the session is stopped or
/// the engine gives up.
pub trait TranscriptionEngine: Send {
    fn start(&self, sink: Sender<TranscriptEvent>) -> Result<Box<dyn TranscriptionSession>>;
}

/// Engine backed by an external transcriber process.
///
/// The configured shell command is expected to stream one finalized
/// fragment per stdout line for as long as it runs. The locale is passed
/// through the `JOT_LOCALE` environment variable.
pub struct CommandEngine {
    command: String,
    locale: String,
}

impl CommandEngine {
    pub fn new(command: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            locale: locale.into(),
        }
    }
}

impl TranscriptionEngine for CommandEngine {
    fn start(&self, sink: Sender<TranscriptEvent>) -> Result<Box<dyn TranscriptionSession>> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("JOT_LOCALE", &self.locale)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .context("Failed to spawn transcriber command")?;

        let stdout = child
            .stdout
            .take()
            .context("Transcriber command has no stdout")?;

        thread::spawn(move || {
            let reader = BufReader::new(stdout);
            for line in reader.lines() {
                let Ok(line) = line else { break };
                let fragment = line.trim();
                if fragment.is_empty() {
                    continue;
                }
                if sink.send(TranscriptEvent::Fragment(fragment.to_string())).is_err() {
                    // Receiver is gone; the session was torn down.
                    return;
                }
            }
            let _ = sink.send(TranscriptEvent::Ended);
        });

        Ok(Box::new(CommandSession {
            child,
            stopped: false,
        }))
    }
}

struct CommandSession {
    child: Child,
    stopped: bool,
}

impl TranscriptionSession for CommandSession {
    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        if let Err(e) = self.child.kill() {
            warn!(error = %e, "failed to stop transcriber process");
        }
        let _ = self.child.wait();
    }
}

impl Drop for CommandSession {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_engine_streams_lines_as_fragments() {
        let engine = CommandEngine::new("printf 'hello world\\nsecond line\\n'", "en-US");
        let (tx, rx) = flume::unbounded();

        let _session = engine.start(tx).unwrap();

        let first = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        let second = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        let ended = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();

        assert_eq!(first, TranscriptEvent::Fragment(String::from("hello world")));
        assert_eq!(second, TranscriptEvent::Fragment(String::from("second line")));
        assert_eq!(ended, TranscriptEvent::Ended);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let engine = CommandEngine::new("printf '\\n  \\nfragment\\n'", "en-US");
        let (tx, rx) = flume::unbounded();

        let _session = engine.start(tx).unwrap();

        let first = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(first, TranscriptEvent::Fragment(String::from("fragment")));
    }

    #[test]
    fn stop_kills_a_long_running_transcriber() {
        let engine = CommandEngine::new("sleep 60", "en-US");
        let (tx, rx) = flume::unbounded();

        let mut session = engine.start(tx).unwrap();
        session.stop();

        // The reader thread observes EOF once the child dies.
        let event = rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap();
        assert_eq!(event, TranscriptEvent::Ended);
    }
}
