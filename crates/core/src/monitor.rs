use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::str;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use anyhow::{Context, Error};
use nix::sys::stat::Mode;
use nix::unistd::mkfifo;
use crate::battery::{Battery, BatteryReading, BatteryUpdate};
use crate::event::{Emitter, Event, ListenerId};

const POLL_TIMEOUT_MS: libc::c_int = 1000;
// First token of a status line we recognize as a battery notification.
const RECOGNIZED_SUBSYSTEM: &str = "power_supply";

/// Raw platform notifications, as read off the power status pipe.
#[derive(Debug, Clone, PartialEq)]
pub enum PowerEvent {
    BatteryChanged(BatteryUpdate),
    Other(String),
}

/// Bridges platform battery notifications into application events.
pub struct Monitor {
    battery: Box<dyn Battery>,
    emitter: Emitter,
}

impl Monitor {
    pub fn new(battery: Box<dyn Battery>) -> Monitor {
        Monitor { battery, emitter: Emitter::new() }
    }

    pub fn on<F>(&mut self, listener: F) -> ListenerId
    where F: FnMut(&Event) + Send + 'static {
        self.emitter.on(listener)
    }

    pub fn off(&mut self, id: ListenerId) -> bool {
        self.emitter.off(id)
    }

    /// Pulls the freshest snapshot from the platform and decodes it,
    /// without emitting. `None` when there's no payload to decode.
    pub fn reading(&mut self) -> Option<BatteryReading> {
        self.battery.poll()
            .map_err(|e| eprintln!("Can't poll the battery: {:#}.", e))
            .ok()
            .flatten()
            .map(|update| update.reading())
    }

    /// Decodes a pushed platform event and emits the derived battery
    /// event to every listener, in registration order, before
    /// returning. Unrecognized events are logged and dropped.
    pub fn dispatch(&mut self, event: PowerEvent) {
        match event {
            PowerEvent::BatteryChanged(update) => {
                self.emitter.emit(&Event::BatteryChanged(update.reading()));
            },
            PowerEvent::Other(kind) => {
                eprintln!("Ignoring power event: {}.", kind);
            },
        }
    }
}

/// A live platform subscription. Dropping it (or calling `stop`)
/// releases the watcher thread.
pub struct Subscription {
    rx: Receiver<PowerEvent>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn events(&self) -> &Receiver<PowerEvent> {
        &self.rx
    }

    pub fn stop(mut self) {
        self.halt();
    }

    fn halt(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(thread) = self.thread.take() {
            thread.join().ok();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Subscribes to the power status pipe at `path`. Lines announcing a
/// power_supply change trigger a poll of `battery`, so the payload
/// travels with the event; every other line is forwarded as
/// `PowerEvent::Other`.
pub fn power_events<P: AsRef<Path>>(path: P, battery: Box<dyn Battery>) -> Subscription {
    let path = path.as_ref().to_path_buf();
    let (tx, rx) = mpsc::channel();
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    let thread = thread::spawn(move || watch_power_pipe(&path, battery, &tx, &flag));
    Subscription { rx, stop, thread: Some(thread) }
}

/// Creates the status fifo when nothing has set it up yet.
pub fn ensure_power_pipe<P: AsRef<Path>>(path: P) -> Result<(), Error> {
    let path = path.as_ref();
    if !path.exists() {
        mkfifo(path, Mode::from_bits_truncate(0o644))
            .with_context(|| format!("can't create power status pipe {}", path.display()))?;
    }
    Ok(())
}

fn watch_power_pipe(path: &Path, mut battery: Box<dyn Battery>, tx: &Sender<PowerEvent>, stop: &AtomicBool) {
    let c_path = match CString::new(path.as_os_str().as_bytes()) {
        Ok(c_path) => c_path,
        Err(..) => return,
    };
    let fd = unsafe { libc::open(c_path.as_ptr(), libc::O_NONBLOCK | libc::O_RDWR) };

    if fd < 0 {
        eprintln!("Can't open the power status pipe {}.", path.display());
        return;
    }

    let mut pfd = libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    };

    const BUF_LEN: usize = 256;
    let mut buf = [0u8; BUF_LEN];

    while !stop.load(Ordering::Relaxed) {
        let ret = unsafe { libc::poll(&mut pfd as *mut libc::pollfd, 1, POLL_TIMEOUT_MS) };

        if ret < 0 {
            break;
        }

        if ret == 0 || pfd.revents & libc::POLLIN == 0 {
            continue;
        }

        let n = unsafe { libc::read(fd, buf.as_mut_ptr() as *mut libc::c_void, BUF_LEN) };
        if n <= 0 {
            break;
        }

        let s = match str::from_utf8(&buf[..n as usize]) {
            Ok(s) => s,
            Err(..) => continue,
        };

        for msg in s.lines() {
            let msg = msg.trim();
            if msg.is_empty() {
                continue;
            }
            if msg.split_whitespace().next() == Some(RECOGNIZED_SUBSYSTEM) {
                match battery.poll() {
                    Ok(Some(update)) => { tx.send(PowerEvent::BatteryChanged(update)).ok(); },
                    Ok(None) => eprintln!("Power supply changed but no payload is available."),
                    Err(e) => eprintln!("Can't poll the battery: {:#}.", e),
                }
            } else {
                tx.send(PowerEvent::Other(msg.to_string())).ok();
            }
        }
    }

    unsafe { libc::close(fd); }
}
