//! Control-side plumbing between a project and the audio thread reading it.
//!
//! The session writes transport values into an [`EngineHandle`]; the audio
//! host takes the matching [`EngineProcessor`] and drains it from its callback
//! without locking. Until a host takes the processor, the handle keeps it and
//! applies commands directly, so the latest values are always observable.
//!
//! Alongside the queue the handle mirrors the latest values into atomics. If
//! the queue overflows, the processor picks the mirror up after draining, so
//! an edit that did not fit is delayed rather than lost.

use daw_transport::{TransportSnapshot, TransportValue};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU32, Ordering};

const COMMAND_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// A single parameter changed, live or committed.
    Set(TransportValue),
    /// Replace every parameter, e.g. after undo or load.
    Sync(TransportSnapshot),
}

/// Latest transport values, readable from the audio thread.
struct SharedTransport {
    beats_per_minute: AtomicU32,
    default_numerator: AtomicU8,
    default_denominator: AtomicU8,
    /// Set when a command could not be queued.
    resync: AtomicBool,
}

impl SharedTransport {
    fn new(snapshot: TransportSnapshot) -> Self {
        Self {
            beats_per_minute: AtomicU32::new(snapshot.beats_per_minute.to_bits()),
            default_numerator: AtomicU8::new(snapshot.default_numerator),
            default_denominator: AtomicU8::new(snapshot.default_denominator),
            resync: AtomicBool::new(false),
        }
    }

    fn store(&self, snapshot: TransportSnapshot) {
        self.beats_per_minute
            .store(snapshot.beats_per_minute.to_bits(), Ordering::Relaxed);
        self.default_numerator
            .store(snapshot.default_numerator, Ordering::Relaxed);
        self.default_denominator
            .store(snapshot.default_denominator, Ordering::Relaxed);
    }

    fn load(&self) -> TransportSnapshot {
        TransportSnapshot {
            beats_per_minute: f32::from_bits(self.beats_per_minute.load(Ordering::Relaxed)),
            default_numerator: self.default_numerator.load(Ordering::Relaxed),
            default_denominator: self.default_denominator.load(Ordering::Relaxed),
        }
    }
}

pub struct EngineHandle {
    commands: rtrb::Producer<Command>,
    processor: Option<EngineProcessor>,
    latest: TransportSnapshot,
    shared: Arc<SharedTransport>,
}

pub struct EngineProcessor {
    commands: rtrb::Consumer<Command>,
    transport: TransportSnapshot,
    shared: Arc<SharedTransport>,
}

pub fn start(initial: TransportSnapshot) -> EngineHandle {
    let (command_tx, command_rx) = rtrb::RingBuffer::<Command>::new(COMMAND_CAPACITY);
    let shared = Arc::new(SharedTransport::new(initial));

    EngineHandle {
        commands: command_tx,
        processor: Some(EngineProcessor {
            commands: command_rx,
            transport: initial,
            shared: Arc::clone(&shared),
        }),
        latest: initial,
        shared,
    }
}

impl EngineHandle {
    /// Returns `false` if the queue was full. The value still reaches the
    /// processor on its next [`EngineProcessor::process_commands`].
    pub fn send(&mut self, value: TransportValue) -> bool {
        self.latest.apply(value);
        self.push(Command::Set(value))
    }

    pub fn sync(&mut self, snapshot: TransportSnapshot) -> bool {
        self.latest = snapshot;
        self.push(Command::Sync(snapshot))
    }

    fn push(&mut self, command: Command) -> bool {
        if let Some(processor) = self.processor.as_mut() {
            processor.handle(command);
            return true;
        }

        self.shared.store(self.latest);
        match self.commands.push(command) {
            Ok(()) => true,
            Err(_) => {
                self.shared.resync.store(true, Ordering::Release);
                log::warn!("engine command queue full, deferring {command:?} to resync");
                false
            }
        }
    }

    /// Values most recently sent, whether or not the processor has seen them.
    pub fn latest(&self) -> TransportSnapshot {
        self.latest
    }

    /// Hand the processor to the audio host. Returns `None` if it was already
    /// taken.
    pub fn take_processor(&mut self) -> Option<EngineProcessor> {
        self.processor.take()
    }

    pub fn processor(&self) -> Option<&EngineProcessor> {
        self.processor.as_ref()
    }

    pub fn is_attached(&self) -> bool {
        self.processor.is_none()
    }
}

impl EngineProcessor {
    /// Apply every queued command, then the mirrored values if anything was
    /// dropped. Returns the number of queued commands applied. Safe to call
    /// from the audio callback.
    pub fn process_commands(&mut self) -> usize {
        let mut count = 0;
        while let Ok(command) = self.commands.pop() {
            self.handle(command);
            count += 1;
        }
        if self.shared.resync.swap(false, Ordering::Acquire) {
            self.transport = self.shared.load();
        }
        count
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Set(value) => self.transport.apply(value),
            Command::Sync(snapshot) => self.transport = snapshot,
        }
    }

    pub fn transport(&self) -> TransportSnapshot {
        self.transport
    }

    pub fn beats_per_minute(&self) -> f32 {
        self.transport.beats_per_minute
    }
}
