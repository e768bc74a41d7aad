use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use folio_protocol::LineId;

/// Owns the one-shot removal timer of every attached line.
///
/// A timer callback cannot drop its own handle, so it reports its id
/// through [`fired`](Self::fired) and the handle is released by the next
/// [`sweep`](Self::sweep). Whatever is still armed at teardown comes back
/// out of [`drain`](Self::drain).
pub struct RemovalTimers<H> {
    armed: HashMap<LineId, H>,
    fired: Rc<RefCell<Vec<LineId>>>,
}

impl<H> Default for RemovalTimers<H> {
    fn default() -> Self {
        Self {
            armed: HashMap::new(),
            fired: Rc::default(),
        }
    }
}

impl<H> RemovalTimers<H> {
    /// Sink a timer callback pushes its line id into once it has run.
    pub fn fired(&self) -> Rc<RefCell<Vec<LineId>>> {
        Rc::clone(&self.fired)
    }

    pub fn arm(&mut self, id: LineId, handle: H) {
        self.armed.insert(id, handle);
    }

    /// Drop the handles of every timer that has fired. Returns how many
    /// were released.
    pub fn sweep(&mut self) -> usize {
        let fired = std::mem::take(&mut *self.fired.borrow_mut());
        fired
            .into_iter()
            .filter(|id| self.armed.remove(id).is_some())
            .count()
    }

    /// Take every handle still armed, for teardown.
    pub fn drain(&mut self) -> impl Iterator<Item = (LineId, H)> + '_ {
        self.fired.borrow_mut().clear();
        self.armed.drain()
    }
}

#[cfg(test)]
impl<H> RemovalTimers<H> {
    fn len(&self) -> usize {
        self.armed.len()
    }
}
