// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Bounded single-producer, single-consumer pipe.
//!
//! A producer thread pushes a sequence of items followed by a terminator; the
//! consumer pulls them lazily as a single-pass iterator. With a finite
//! capacity the producer blocks once the buffer is full, so memory stays
//! bounded while the consumer (typically a [`JsonEncoder`] writing to a
//! socket) drains it.
//!
//! # Architecture
//!
//! ```text
//! producer thread                          consumer thread
//! submit(rows) --> [ item | item | .. | END ] --> next() --> encoder
//!                  crossbeam channel (capacity N)
//! ```
//!
//! The consumer is a small state machine:
//!
//! ```text
//! Empty --pull--> Ready(item) --next()--> Empty
//!   |
//!   +----pull(END)----> Done (permanent)
//! ```
//!
//! # Example
//!
//! ```
//! use lode::codec::JsonEncoder;
//! use lode::config::PipeConfig;
//! use lode::pipe::Pipe;
//!
//! let (producer, consumer) = Pipe::<i64>::new(PipeConfig::default().with_capacity(2)).split();
//! let worker = std::thread::spawn(move || producer.submit(1..=3));
//!
//! let text = JsonEncoder::compact().encode_to_string(&consumer.into_value()).unwrap();
//! assert_eq!(text, "[1,2,3]");
//! worker.join().unwrap().unwrap();
//! ```
//!
//! [`JsonEncoder`]: crate::codec::JsonEncoder

use crate::beans::ToValue;
use crate::config::PipeConfig;
use crate::value::Value;
use crate::{Error, Result};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, SendTimeoutError, Sender};
use std::time::Duration;

enum Slot<T> {
    Item(T),
    /// Producer-side failure handed to the consumer in place of the terminator.
    Failed(Error),
    Terminator,
}

/// Unsplit pipe; call [`Pipe::split`] to obtain both ends.
pub struct Pipe<T> {
    producer: PipeProducer<T>,
    consumer: PipeConsumer<T>,
}

impl<T: Send> Pipe<T> {
    pub fn new(config: PipeConfig) -> Self {
        let (sender, receiver) = match config.capacity {
            Some(capacity) => channel::bounded(capacity),
            None => channel::unbounded(),
        };
        Self {
            producer: PipeProducer {
                sender,
                timeout: config.timeout,
                pushed: 0,
            },
            consumer: PipeConsumer {
                receiver,
                timeout: config.timeout,
                state: State::Empty,
            },
        }
    }

    /// Configuration from `LODE_PIPE_CAPACITY` / `LODE_PIPE_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        Self::new(PipeConfig::from_env())
    }

    pub fn split(self) -> (PipeProducer<T>, PipeConsumer<T>) {
        (self.producer, self.consumer)
    }
}

// ============================================================================
// Producer
// ============================================================================

/// Writing end. Submitting consumes it, so a pipe carries one sequence.
pub struct PipeProducer<T> {
    sender: Sender<Slot<T>>,
    timeout: Option<Duration>,
    pushed: u64,
}

impl<T> PipeProducer<T> {
    /// Pushes every item, then the terminator.
    ///
    /// Fails with [`Error::Timeout`] if one push cannot complete within the
    /// configured timeout, or [`Error::ChannelClosed`] once the consumer is
    /// gone.
    pub fn submit<I>(mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        for item in items {
            self.push(Slot::Item(item))?;
        }
        self.finish(Slot::Terminator)
    }

    /// Like [`submit`](Self::submit) for fallible producers.
    ///
    /// The first item error ends the sequence; it is delivered to the
    /// consumer in place of the terminator. The returned result only
    /// reports failures of the pipe itself.
    pub fn try_submit<I>(mut self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = Result<T>>,
    {
        for item in items {
            match item {
                Ok(item) => self.push(Slot::Item(item))?,
                Err(e) => {
                    log::debug!("[pipe] producer failed after {} items: {}", self.pushed, e);
                    return self.finish(Slot::Failed(e));
                }
            }
        }
        self.finish(Slot::Terminator)
    }

    fn finish(&mut self, last: Slot<T>) -> Result<()> {
        self.push(last)?;
        log::debug!("[pipe] submitted {} items", self.pushed);
        Ok(())
    }

    fn push(&mut self, slot: Slot<T>) -> Result<()> {
        let counts = matches!(slot, Slot::Item(_));
        match self.timeout {
            Some(timeout) => self.sender.send_timeout(slot, timeout).map_err(|e| match e {
                SendTimeoutError::Timeout(_) => {
                    log::warn!("[pipe] push timed out after {:?}", timeout);
                    Error::Timeout {
                        operation: "push",
                        timeout,
                    }
                }
                SendTimeoutError::Disconnected(_) => Error::ChannelClosed,
            })?,
            None => self.sender.send(slot).map_err(|_| Error::ChannelClosed)?,
        }
        if counts {
            self.pushed += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Consumer
// ============================================================================

enum State<T> {
    /// Nothing pulled yet.
    Empty,
    /// One item pulled and not yet handed out.
    Ready(T),
    Failed(Error),
    /// Terminator observed.
    Done,
}

/// Reading end: a single-pass iterator over the submitted items.
pub struct PipeConsumer<T> {
    receiver: Receiver<Slot<T>>,
    timeout: Option<Duration>,
    state: State<T>,
}

impl<T> PipeConsumer<T> {
    /// Blocks until an item or the terminator is available.
    pub fn has_next(&mut self) -> Result<bool> {
        self.pull()?;
        Ok(!matches!(self.state, State::Done))
    }

    pub fn is_done(&self) -> bool {
        matches!(self.state, State::Done)
    }

    fn pull(&mut self) -> Result<()> {
        if !matches!(self.state, State::Empty) {
            return Ok(());
        }
        let slot = match self.timeout {
            Some(timeout) => self.receiver.recv_timeout(timeout).map_err(|e| match e {
                RecvTimeoutError::Timeout => {
                    log::warn!("[pipe] pull timed out after {:?}", timeout);
                    Error::Timeout {
                        operation: "pull",
                        timeout,
                    }
                }
                RecvTimeoutError::Disconnected => Error::ChannelClosed,
            }),
            None => self.receiver.recv().map_err(|_| Error::ChannelClosed),
        };
        self.state = match slot {
            Ok(Slot::Item(item)) => State::Ready(item),
            Ok(Slot::Failed(e)) => State::Failed(e),
            Ok(Slot::Terminator) => {
                log::debug!("[pipe] terminator observed");
                State::Done
            }
            Err(Error::ChannelClosed) => {
                log::warn!("[pipe] producer dropped before the terminator");
                State::Failed(Error::ChannelClosed)
            }
            Err(e) => return Err(e),
        };
        Ok(())
    }
}

impl<T: ToValue + Send + 'static> PipeConsumer<T> {
    /// Single-pass list view over the remaining items.
    pub fn into_value(self) -> Value {
        Value::try_sequence(self.map(|item| item.map(|item| item.to_value())))
    }
}

impl<T> Iterator for PipeConsumer<T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.pull() {
            return Some(Err(e));
        }
        match std::mem::replace(&mut self.state, State::Empty) {
            State::Ready(item) => Some(Ok(item)),
            State::Failed(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
            State::Done | State::Empty => {
                self.state = State::Done;
                None
            }
        }
    }
}
