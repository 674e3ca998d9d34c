//! Patch authority running in a child process, spoken to over stdio.
//!
//! The client stays runtime-agnostic: a writer thread and a reader thread move framed messages
//! through `mpsc` channels, and [`PatchAuthority::poll`] drains whatever has arrived without
//! blocking.

use grid_core::{PatchAuthority, PatchError, PatchReply, PatchRequest};
use serde_json::Value;
use std::io::{self, BufReader, BufWriter};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::mpsc;
use std::thread;

use crate::codec::PatchCodec;
use crate::transport::{read_message, write_message};

#[derive(Debug)]
enum Inbound {
    Message(Value),
    IoError(String),
}

/// A [`PatchAuthority`] backed by a spawned process.
pub struct StdioAuthority {
    child: Child,
    tx: mpsc::Sender<Value>,
    rx: mpsc::Receiver<Inbound>,
    codec: PatchCodec,
    failure: Option<String>,
}

impl StdioAuthority {
    /// Spawn the authority process and connect via its stdio.
    ///
    /// `stdin`/`stdout` are overridden to be piped; callers may configure `stderr` first
    /// (e.g. `Stdio::null()` under a TUI).
    pub fn spawn(mut cmd: Command) -> io::Result<Self> {
        cmd.stdin(Stdio::piped()).stdout(Stdio::piped());
        let child = cmd.spawn()?;
        Self::from_child(child)
    }

    /// Wrap an already-spawned child with piped stdio.
    pub fn from_child(mut child: Child) -> io::Result<Self> {
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("authority stdin is not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("authority stdout is not piped"))?;

        let (tx_out, rx_out) = mpsc::channel::<Value>();
        let (tx_in, rx_in) = mpsc::channel::<Inbound>();

        {
            let tx_in = tx_in.clone();
            thread::spawn(move || write_loop(stdin, rx_out, tx_in));
        }
        thread::spawn(move || read_loop(stdout, tx_in));

        tracing::debug!(pid = child.id(), "patch authority connected");
        Ok(Self {
            child,
            tx: tx_out,
            rx: rx_in,
            codec: PatchCodec::new(),
            failure: None,
        })
    }

    /// Why the connection stopped, if it has.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Requests sent but not yet answered.
    pub fn pending_count(&self) -> usize {
        self.codec.pending_count()
    }

    fn disconnect(&mut self, reason: String, replies: &mut Vec<PatchReply>) {
        tracing::warn!(%reason, "patch authority disconnected");
        for ticket in self.codec.drain_pending() {
            replies.push(PatchReply {
                ticket,
                result: Err(PatchError::Transport(reason.clone())),
            });
        }
        self.failure = Some(reason);
    }
}

impl PatchAuthority for StdioAuthority {
    fn send(&mut self, request: PatchRequest) -> Result<(), PatchError> {
        if let Some(reason) = &self.failure {
            return Err(PatchError::Transport(reason.clone()));
        }
        let message = self.codec.encode_request(&request);
        if let Err(mpsc::SendError(message)) = self.tx.send(message) {
            self.codec.abandon(&message);
            return Err(PatchError::Transport("writer thread stopped".into()));
        }
        Ok(())
    }

    fn poll(&mut self) -> Vec<PatchReply> {
        let mut replies = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(Inbound::Message(message)) => match self.codec.decode_reply(message) {
                    Ok(Some(reply)) => replies.push(reply),
                    Ok(None) => {}
                    Err(err) => tracing::warn!(error = %err, "ignoring undecodable message"),
                },
                Ok(Inbound::IoError(err)) => {
                    self.disconnect(err, &mut replies);
                    break;
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    if self.failure.is_none() {
                        self.disconnect("reader thread stopped".into(), &mut replies);
                    }
                    break;
                }
            }
        }
        replies
    }
}

impl Drop for StdioAuthority {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

fn write_loop(stdin: ChildStdin, rx: mpsc::Receiver<Value>, tx_in: mpsc::Sender<Inbound>) {
    let mut writer = BufWriter::new(stdin);
    for message in rx {
        if let Err(err) = write_message(&mut writer, &message) {
            let _ = tx_in.send(Inbound::IoError(err.to_string()));
            break;
        }
    }
}

fn read_loop(stdout: ChildStdout, tx: mpsc::Sender<Inbound>) {
    let mut reader = BufReader::new(stdout);
    loop {
        match read_message(&mut reader) {
            Ok(Some(message)) => {
                if tx.send(Inbound::Message(message)).is_err() {
                    break;
                }
            }
            Ok(None) => {
                let _ = tx.send(Inbound::IoError("authority closed its output".into()));
                break;
            }
            Err(err) => {
                let _ = tx.send(Inbound::IoError(err.to_string()));
                break;
            }
        }
    }
}
