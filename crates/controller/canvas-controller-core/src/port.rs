//! Outbound seam to the trajectory solver.
//!
//! The controller never owns a socket; hosts inject a [`SolverPort`] and pump
//! responses back through
//! [`AnimationController::handle_message`](crate::AnimationController::handle_message).

use std::collections::VecDeque;
use std::fmt;
use std::io::Write;

use crate::error::PortError;
use crate::protocol::SolverRequest;

pub trait SolverPort: fmt::Debug {
    fn send(&mut self, request: SolverRequest) -> Result<(), PortError>;
}

/// In-memory queue of requests awaiting a host to forward them.
#[derive(Debug, Default)]
pub struct Outbox {
    queue: VecDeque<SolverRequest>,
    closed: bool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued request, oldest first.
    pub fn drain(&mut self) -> Vec<SolverRequest> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> impl Iterator<Item = &SolverRequest> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Refuse further requests, as a dropped connection would.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn reopen(&mut self) {
        self.closed = false;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl SolverPort for Outbox {
    fn send(&mut self, request: SolverRequest) -> Result<(), PortError> {
        if self.closed {
            return Err(PortError::Closed);
        }
        self.queue.push_back(request);
        Ok(())
    }
}

/// Writes each request as one line of JSON.
#[derive(Debug)]
pub struct WriterPort<W: Write + fmt::Debug> {
    writer: W,
}

impl<W: Write + fmt::Debug> WriterPort<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + fmt::Debug> SolverPort for WriterPort<W> {
    fn send(&mut self, request: SolverRequest) -> Result<(), PortError> {
        serde_json::to_writer(&mut self.writer, &request)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()?;
        Ok(())
    }
}
