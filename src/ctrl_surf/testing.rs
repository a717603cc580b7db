//! In-memory doubles for the control surface ports.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
    thread,
    time::{Duration, Instant},
};

use super::{transport::InboundCallback, ActionDispatch, Descriptor, Transport};
use crate::{actions, midi};

pub fn descriptor() -> Descriptor {
    Descriptor {
        name: "Test Controller".into(),
        button_ids: [0, 1].into(),
        knob_ids: [2, 3].into(),
        button_value_off: 0,
        button_value_on: 127,
        knob_value_min: 0,
        knob_value_max: 127,
        default_channel: midi::Channel::from_number(1),
    }
}

/// Polls `cond` until it holds or a couple of seconds elapsed.
pub fn wait_for(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }

    cond()
}

#[derive(Default)]
pub struct MockTransport {
    sent: Mutex<Vec<Vec<u8>>>,
    callback: Mutex<Option<InboundCallback>>,
    pub fail_send: AtomicBool,
    pub fail_set_callback: AtomicBool,
}

impl MockTransport {
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent.lock().unwrap().clone()
    }

    pub fn count(&self, msg: [u8; 3]) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|sent| sent.as_slice() == msg.as_slice())
            .count()
    }

    pub fn clear(&self) {
        self.sent.lock().unwrap().clear();
    }

    pub fn has_callback(&self) -> bool {
        self.callback.lock().unwrap().is_some()
    }

    /// Delivers `buf` as if it came from the device.
    pub fn inject(&self, buf: &[u8]) {
        if let Some(callback) = self.callback.lock().unwrap().as_mut() {
            callback(0, buf);
        }
    }
}

impl Transport for MockTransport {
    fn send(&self, msg: &midi::Msg) -> Result<(), midi::Error> {
        if self.fail_send.load(Ordering::SeqCst) {
            return Err(midi::Error::NotConnected);
        }

        self.sent.lock().unwrap().push(msg.inner().to_vec());
        Ok(())
    }

    fn set_callback(&self, callback: InboundCallback) -> Result<(), midi::Error> {
        if self.fail_set_callback.load(Ordering::SeqCst) {
            return Err(midi::Error::Connect("mock in".into()));
        }

        *self.callback.lock().unwrap() = Some(callback);
        Ok(())
    }

    fn cancel_callback(&self) {
        *self.callback.lock().unwrap() = None;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Button(u8),
    Knob { id: u8, old: u8, new: u8 },
}

#[derive(Default)]
pub struct RecordingActions {
    calls: Mutex<Vec<Call>>,
    toggled: Mutex<BTreeMap<u8, bool>>,
    failing: Mutex<BTreeSet<u8>>,
    toggle_reads: AtomicUsize,
}

impl RecordingActions {
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn set_toggled(&self, id: u8, toggled: bool) {
        self.toggled.lock().unwrap().insert(id, toggled);
    }

    pub fn set_failing(&self, id: u8) {
        self.failing.lock().unwrap().insert(id);
    }

    /// Number of toggle state reads so far.
    pub fn toggle_reads(&self) -> usize {
        self.toggle_reads.load(Ordering::SeqCst)
    }
}

impl ActionDispatch for RecordingActions {
    fn execute_button(&self, id: u8) -> Result<(), actions::Error> {
        self.calls.lock().unwrap().push(Call::Button(id));
        Ok(())
    }

    fn execute_knob(&self, id: u8, old: u8, new: u8) -> Result<(), actions::Error> {
        self.calls.lock().unwrap().push(Call::Knob { id, old, new });
        Ok(())
    }

    fn is_button_toggled(&self, id: u8) -> Result<Option<bool>, actions::Error> {
        self.toggle_reads.fetch_add(1, Ordering::SeqCst);

        if self.failing.lock().unwrap().contains(&id) {
            return Err(actions::Error::CommandFailed {
                id: format!("button-{id}").into(),
                reason: "test failure".into(),
            });
        }

        Ok(self.toggled.lock().unwrap().get(&id).copied())
    }
}
