use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use folio_core::AmbientScheduler;
use folio_protocol::{EnergyLine, HostCommand};
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::timers::RemovalTimers;

/// Browser side of the ambient scheduler.
///
/// The repeating spawn timer is owned here and cancelled on drop. Each
/// attached line arms a one-shot removal timer that captures exactly the
/// element it created. Fired timers are released on the next spawn tick;
/// lines still attached at teardown are removed straight away.
pub struct AmbientLayer {
    scheduler: Rc<RefCell<AmbientScheduler>>,
    timers: Rc<RefCell<RemovalTimers<ArmedLine>>>,
    interval: Option<Interval>,
}

/// An attached line and the timer that will remove it.
struct ArmedLine {
    element: Element,
    _timeout: Timeout,
}

impl AmbientLayer {
    pub fn start(document: &Document, container_id: &str, scheduler: AmbientScheduler) -> Self {
        let scheduler = Rc::new(RefCell::new(scheduler));
        let timers = Rc::new(RefCell::new(RemovalTimers::default()));
        let container = document.get_element_by_id(container_id);
        let mut rng = fastrand::Rng::with_seed(seed(js_sys::Math::random()));

        let initial = scheduler
            .borrow_mut()
            .activate(now(), container.is_some(), &mut rng);
        let Some(container) = container else {
            web_sys::console::log_1(
                &format!("folio: no #{container_id} element, ambient lines disabled").into(),
            );
            return Self {
                scheduler,
                timers,
                interval: None,
            };
        };
        apply(&scheduler, &timers, &container, initial);

        let period = timer_millis(scheduler.borrow().config().period());
        let interval = Interval::new(period, {
            let scheduler = Rc::clone(&scheduler);
            let timers = Rc::clone(&timers);
            move || {
                timers.borrow_mut().sweep();
                let spawned = scheduler.borrow_mut().spawn(now(), &mut rng);
                apply(&scheduler, &timers, &container, spawned);
            }
        });

        Self {
            scheduler,
            timers,
            interval: Some(interval),
        }
    }

    pub fn live_count(&self) -> usize {
        self.scheduler.borrow().live_count()
    }

    /// Cancel the repeating timer and every pending removal timer, and take
    /// the lines they would have removed off the page now.
    pub fn stop(&mut self) {
        // Dropping the interval clears it.
        self.interval = None;
        let mut scheduler = self.scheduler.borrow_mut();
        scheduler.deactivate();
        for (id, armed) in self.timers.borrow_mut().drain() {
            armed.element.remove();
            scheduler.retire(id);
        }
    }
}

impl Drop for AmbientLayer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn apply(
    scheduler: &Rc<RefCell<AmbientScheduler>>,
    timers: &RefCell<RemovalTimers<ArmedLine>>,
    container: &Element,
    commands: impl IntoIterator<Item = HostCommand>,
) {
    for command in commands {
        let HostCommand::AttachLine { line } = command else {
            continue;
        };
        match attach(Rc::downgrade(scheduler), timers, container, &line) {
            Ok(armed) => timers.borrow_mut().arm(line.id, armed),
            Err(e) => {
                web_sys::console::error_2(&"folio: failed to attach energy line".into(), &e);
                scheduler.borrow_mut().retire(line.id);
            }
        }
    }
}

fn attach(
    scheduler: Weak<RefCell<AmbientScheduler>>,
    timers: &RefCell<RemovalTimers<ArmedLine>>,
    container: &Element,
    line: &EnergyLine,
) -> Result<ArmedLine, JsValue> {
    let document = container
        .owner_document()
        .ok_or_else(|| JsValue::from_str("container has no owner document"))?;
    let element = document.create_element("div")?;
    element.set_class_name(&line.class_name());
    element.set_attribute("style", &line.style())?;
    container.append_child(&element)?;

    let id = line.id;
    let fired = timers.borrow().fired();
    let timeout = Timeout::new(timer_millis(line.lifetime()), {
        let element = element.clone();
        move || {
            element.remove();
            // The layer may already be gone; the element removal above is
            // all that matters then.
            if let Some(scheduler) = scheduler.upgrade() {
                scheduler.borrow_mut().retire(id);
            }
            fired.borrow_mut().push(id);
        }
    });
    Ok(ArmedLine {
        element,
        _timeout: timeout,
    })
}

fn now() -> Duration {
    Duration::from_millis(js_sys::Date::now().max(0.0) as u64)
}

/// Milliseconds for a gloo timer. Browsers take a signed 32-bit delay, so
/// anything longer is clamped to `i32::MAX` instead of wrapping negative.
fn timer_millis(duration: Duration) -> u32 {
    let millis = duration.as_millis().min(i32::MAX as u128);
    u32::try_from(millis).unwrap_or(i32::MAX as u32)
}

/// Spread a `Math.random()` sample over the full seed space.
fn seed(sample: f64) -> u64 {
    (sample.clamp(0.0, 1.0) * u64::MAX as f64) as u64
}
