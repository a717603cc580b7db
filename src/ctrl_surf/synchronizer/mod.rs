use crossbeam_channel as channel;
use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
    thread,
    time::Duration,
};

use super::{
    flash::ExclusiveSet, ActionDispatch, Descriptor, Element, Error, Event, Transport,
};
use crate::{
    bytes,
    midi::{self, tag, Channel, Tag},
};

/// Callback receiving the id of the element the user acted on while paused.
pub type ElementCallback = Arc<dyn Fn(u8) + Send + Sync + 'static>;

#[derive(Clone, Debug)]
pub struct Timing {
    /// Period of the button synchronization loop.
    pub tick: Duration,
    /// Ticks after which an unchanged LED state is sent again.
    pub resend_ceiling: u32,
    pub flash_repetitions: usize,
    pub flash_delay: Duration,
    pub knob_sweep_steps: u8,
    pub knob_step_delay: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            resend_ceiling: 25,
            flash_repetitions: 3,
            flash_delay: Duration::from_millis(300),
            knob_sweep_steps: 16,
            knob_step_delay: Duration::from_millis(30),
        }
    }
}

#[derive(Clone)]
struct Paused {
    on_button: ElementCallback,
    on_knob: ElementCallback,
}

struct Engagement {
    knobs: BTreeMap<u8, u8>,
    force_sync: BTreeMap<u8, bool>,
    paused: Option<Paused>,
}

/// Last LED state sent by the synchronization loop for a button.
#[derive(Clone, Copy, Debug, Default)]
struct LedState {
    is_on: bool,
    ticks_since_send: u32,
}

struct Shared {
    desc: Descriptor,
    timing: Timing,
    actions: Arc<dyn ActionDispatch>,
    transport: Arc<dyn Transport>,
    engagement: Mutex<Engagement>,
    flashing: ExclusiveSet<Element>,
    stopped: AtomicBool,
}

/// Keeps a control surface and the host in sync.
///
/// Incoming messages are dispatched to the [`ActionDispatch`] from the
/// transport's callback. A background thread periodically reads the
/// toggle state of the buttons' actions and updates the LEDs accordingly.
///
/// The transport is released and the thread joined on [`Synchronizer::stop`]
/// or when the `Synchronizer` is dropped. Neither must happen from within an
/// [`ActionDispatch`] call, since the transport waits for the callback to return.
pub struct Synchronizer {
    shared: Arc<Shared>,
    stop_tx: Option<channel::Sender<()>>,
    sync_thread: Option<thread::JoinHandle<()>>,
}

impl Synchronizer {
    /// Resets the device, starts listening to it and spawns the synchronization loop.
    pub fn start(
        desc: Descriptor,
        actions: Arc<dyn ActionDispatch>,
        transport: Arc<dyn Transport>,
        timing: Timing,
    ) -> Result<Self, Error> {
        let engagement = Engagement {
            knobs: desc
                .knob_ids
                .iter()
                .map(|&id| (id, desc.knob_value_min))
                .collect(),
            force_sync: desc.button_ids.iter().map(|&id| (id, true)).collect(),
            paused: None,
        };

        let shared = Arc::new(Shared {
            desc,
            timing,
            actions,
            transport,
            engagement: Mutex::new(engagement),
            flashing: ExclusiveSet::default(),
            stopped: AtomicBool::new(false),
        });

        shared.reset_device();

        let weak = Arc::downgrade(&shared);
        shared.transport.set_callback(Box::new(move |_ts, buf| {
            if let Some(shared) = weak.upgrade() {
                shared.on_message(buf);
            }
        }))?;

        let (stop_tx, stop_rx) = channel::bounded(0);
        let sync_thread = thread::Builder::new()
            .name("button-sync".to_string())
            .spawn({
                let shared = shared.clone();
                move || shared.run_sync_loop(stop_rx)
            })
            .map_err(|err| {
                shared.transport.cancel_callback();
                Error::Spawn(err)
            })?;

        log::info!("Synchronizing control surface {}", shared.desc.name);

        Ok(Self {
            shared,
            stop_tx: Some(stop_tx),
            sync_thread: Some(sync_thread),
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.shared.desc
    }

    /// Decodes and dispatches a raw message as received from the device.
    pub fn on_message(&self, buf: &[u8]) {
        self.shared.on_message(buf);
    }

    pub fn handle_midi_message(&self, command: Tag, chan: Channel, data: [u8; 2]) {
        self.shared.handle_midi_message(command, chan, data);
    }

    /// Redirects button releases and knob moves to the callbacks.
    ///
    /// While paused, no actions are executed and the LEDs are left untouched.
    pub fn pause(
        &self,
        on_button: impl Fn(u8) + Send + Sync + 'static,
        on_knob: impl Fn(u8) + Send + Sync + 'static,
    ) {
        self.shared.engagement().paused = Some(Paused {
            on_button: Arc::new(on_button),
            on_knob: Arc::new(on_knob),
        });

        log::debug!("Paused {}", self.shared.desc.name);
    }

    /// Restores action dispatching and refreshes the whole device.
    pub fn resume(&self) {
        let knobs: Vec<(u8, u8)> = {
            let mut engagement = self.shared.engagement();
            engagement.paused = None;
            engagement
                .force_sync
                .values_mut()
                .for_each(|force| *force = true);

            engagement
                .knobs
                .iter()
                .map(|(&id, &value)| (id, value))
                .collect()
        };

        for (id, value) in knobs {
            self.shared.change_knob_value(id, value);
        }

        log::debug!("Resumed {}", self.shared.desc.name);
    }

    pub fn is_paused(&self) -> bool {
        self.shared.engagement().paused.is_some()
    }

    /// Returns the last value received from or restored to the knob.
    pub fn knob_value(&self, id: u8) -> Option<u8> {
        self.shared.engagement().knobs.get(&id).copied()
    }

    /// Blinks the button's LED in a thread of its own.
    ///
    /// Returns `None` without doing anything if the button is already
    /// flashing or is not on the device.
    pub fn flash_button(&self, id: u8) -> Option<thread::JoinHandle<()>> {
        if !self.shared.desc.is_button(id) {
            log::warn!("Can't flash unknown button {id}");
            return None;
        }

        self.flash(Element::Button(id))
    }

    /// Sweeps the knob's ring in a thread of its own, then restores its value.
    ///
    /// Returns `None` without doing anything if the knob is already
    /// flashing or is not on the device.
    pub fn flash_knob(&self, id: u8) -> Option<thread::JoinHandle<()>> {
        if !self.shared.desc.is_knob(id) {
            log::warn!("Can't flash unknown knob {id}");
            return None;
        }

        self.flash(Element::Knob(id))
    }

    pub fn is_flashing(&self, element: Element) -> bool {
        self.shared.flashing.contains(&element)
    }

    fn flash(&self, element: Element) -> Option<thread::JoinHandle<()>> {
        let token = match self.shared.flashing.try_acquire(element) {
            Some(token) => token,
            None => {
                log::debug!("{element} is already flashing");
                return None;
            }
        };

        let shared = self.shared.clone();
        thread::Builder::new()
            .name(format!("flash {element}"))
            .spawn(move || {
                let _token = token;
                match element {
                    Element::Button(id) => shared.flash_button(id),
                    Element::Knob(id) => shared.flash_knob(id),
                }
            })
            .map_err(|err| log::error!("Couldn't spawn flash thread for {element}: {err}"))
            .ok()
    }

    pub fn change_knob_value(&self, id: u8, value: u8) {
        self.shared.change_knob_value(id, value);
    }

    pub fn turn_on_button_led(&self, id: u8) {
        self.shared.turn_on_button_led(id);
    }

    pub fn turn_off_button_led(&self, id: u8) {
        self.shared.turn_off_button_led(id);
    }

    /// Stops listening to the device and joins the synchronization loop.
    ///
    /// Flash threads still running are not waited for.
    pub fn stop(&mut self) {
        let sync_thread = match self.sync_thread.take() {
            Some(sync_thread) => sync_thread,
            None => return,
        };

        self.shared.transport.cancel_callback();
        self.shared.stopped.store(true, Ordering::Release);
        // Dropping the sender wakes the loop up.
        self.stop_tx = None;

        if sync_thread.join().is_err() {
            log::error!("Button synchronization loop panicked");
        }

        log::info!("Stopped synchronizing {}", self.shared.desc.name);
    }
}

impl Drop for Synchronizer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Shared {
    fn engagement(&self) -> MutexGuard<'_, Engagement> {
        self.engagement
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn reset_device(&self) {
        for &id in self.desc.button_ids.iter() {
            self.turn_off_button_led(id);
        }

        for &id in self.desc.knob_ids.iter() {
            self.change_knob_value(id, self.desc.knob_value_min);
        }
    }

    fn on_message(&self, buf: &[u8]) {
        if self.stopped.load(Ordering::Acquire) {
            return;
        }

        match midi::msg::decode(buf) {
            Ok((command, chan, data)) => self.handle_midi_message(command, chan, data),
            Err(err) => log::debug!("Ignoring device msg: {err}"),
        }
    }

    fn handle_midi_message(&self, command: Tag, chan: Channel, data: [u8; 2]) {
        match Event::resolve(&self.desc, command, data) {
            Some(Event::KnobTurned { id, value }) => self.on_knob_turned(id, value),
            // Actions are triggered on release.
            Some(Event::ButtonPressed(_)) => (),
            Some(Event::ButtonReleased(id)) => {
                // The device toggles the LED on its own.
                self.engagement().force_sync.insert(id, true);
                self.on_button_released(id);
            }
            None => {
                let buf = [u8::from(command) | u8::from(chan), data[0], data[1]];
                log::debug!("No element for {:#}", bytes::Displayable::from(buf.as_slice()));
            }
        }
    }

    fn on_button_released(&self, id: u8) {
        let paused = self.engagement().paused.clone();

        match paused {
            Some(paused) => (paused.on_button)(id),
            None => {
                if let Err(err) = self.actions.execute_button(id) {
                    log::error!("Button {id}: {err}");
                }
            }
        }
    }

    fn on_knob_turned(&self, id: u8, value: u8) {
        let (prev, paused) = {
            let mut engagement = self.engagement();
            let prev = engagement
                .knobs
                .insert(id, value)
                .unwrap_or(self.desc.knob_value_min);

            (
                self.desc.knob_prev_value(prev, value),
                engagement.paused.clone(),
            )
        };

        match paused {
            Some(paused) => (paused.on_knob)(id),
            None => {
                if let Err(err) = self.actions.execute_knob(id, prev, value) {
                    log::error!("Knob {id}: {err}");
                }
            }
        }
    }

    fn send(&self, msg: midi::Msg) {
        if let Err(err) = self.transport.send(&msg) {
            log::warn!("Couldn't send {} to {}: {err}", msg.display(), self.desc.name);
        }
    }

    fn change_knob_value(&self, id: u8, value: u8) {
        self.send(midi::build_message(
            tag::CONTROL_CHANGE.into(),
            self.desc.default_channel,
            [id, value],
        ));
    }

    fn turn_on_button_led(&self, id: u8) {
        self.send(midi::build_message(
            tag::BUTTON_ENGAGED.into(),
            self.desc.default_channel,
            [id, self.desc.button_value_on],
        ));
    }

    fn turn_off_button_led(&self, id: u8) {
        self.send(midi::build_message(
            tag::BUTTON_DISENGAGED.into(),
            self.desc.default_channel,
            [id, self.desc.button_value_off],
        ));
    }

    fn flash_button(&self, id: u8) {
        for _ in 0..self.timing.flash_repetitions {
            self.turn_on_button_led(id);
            thread::sleep(self.timing.flash_delay);
            self.turn_off_button_led(id);
            thread::sleep(self.timing.flash_delay);
        }
    }

    fn flash_knob(&self, id: u8) {
        let restore = self
            .engagement()
            .knobs
            .get(&id)
            .copied()
            .unwrap_or(self.desc.knob_value_min);

        for value in self.desc.knob_sweep(self.timing.knob_sweep_steps) {
            self.change_knob_value(id, value);
            thread::sleep(self.timing.knob_step_delay);
        }

        self.change_knob_value(id, restore);
    }

    fn run_sync_loop(&self, stop_rx: channel::Receiver<()>) {
        let ticker = channel::tick(self.timing.tick);
        let mut leds = BTreeMap::<u8, LedState>::new();

        loop {
            channel::select! {
                recv(stop_rx) -> _ => break,
                recv(ticker) -> _ => {
                    if self.stopped.load(Ordering::Acquire) {
                        break;
                    }

                    self.synchronize_buttons(&mut leds);
                }
            }
        }

        log::debug!("Shutting down button synchronization loop");
    }

    /// Sends the LED state of the buttons which need it.
    ///
    /// A state is sent if it changed, if it was forced
    /// or if it wasn't sent for `resend_ceiling` ticks.
    fn synchronize_buttons(&self, leds: &mut BTreeMap<u8, LedState>) {
        if self.engagement().paused.is_some() {
            return;
        }

        for &id in self.desc.button_ids.iter() {
            let is_on = match self.actions.is_button_toggled(id) {
                Ok(toggled) => toggled.unwrap_or(false),
                Err(err) => {
                    log::warn!("Toggle state for button {id}: {err}");
                    continue;
                }
            };

            let led = leds.entry(id).or_default();
            let must_send = {
                let mut engagement = self.engagement();
                if engagement.paused.is_some() {
                    return;
                }

                let forced = engagement
                    .force_sync
                    .get_mut(&id)
                    .map(std::mem::take)
                    .unwrap_or(false);

                forced || is_on != led.is_on || led.ticks_since_send > self.timing.resend_ceiling
            };

            if must_send {
                if is_on {
                    self.turn_on_button_led(id);
                } else {
                    self.turn_off_button_led(id);
                }

                *led = LedState {
                    is_on,
                    ticks_since_send: 0,
                };
            } else {
                led.ticks_since_send = led.ticks_since_send.saturating_add(1);
            }
        }
    }
}
