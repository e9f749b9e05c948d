//! Named device state reported on change.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use flp_line::Label;
use flp_registry::{ArgumentSpec, Numeric, NumericKind, ProtocolError, Result, StateValue};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::shared::{self, Core};

/// Read access the engine keeps to a registered state.
pub(crate) trait StateSource {
    fn numeric(&self) -> Numeric;
    fn precision(&self) -> Option<usize>;
}

/// Registered states by name. Entries are weak; a state whose cell is gone
/// no longer counts.
#[derive(Default)]
pub(crate) struct StateTable {
    entries: BTreeMap<String, Weak<dyn StateSource>>,
}

impl StateTable {
    pub(crate) fn insert(&mut self, name: &str, source: Weak<dyn StateSource>) -> Result<()> {
        if self.contains(name) {
            return Err(ProtocolError::InvalidArgument(format!(
                "state {name} already registered"
            )));
        }
        self.entries.insert(name.to_string(), source);
        Ok(())
    }

    /// Remove `name`. Idempotent.
    pub(crate) fn remove(&mut self, name: &str) -> bool {
        self.entries.remove(name).is_some()
    }

    /// Remove `name` only while it still refers to `source`.
    fn remove_source(&mut self, name: &str, source: &Weak<dyn StateSource>) -> bool {
        match self.entries.get(name) {
            Some(current) if Weak::ptr_eq(current, source) => self.remove(name),
            _ => false,
        }
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|source| source.strong_count() > 0)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .values()
            .filter(|source| source.strong_count() > 0)
            .count()
    }

    /// Current values as a JSON object keyed by state name.
    pub(crate) fn snapshot(&self) -> Value {
        let values = self
            .entries
            .iter()
            .filter_map(|(name, source)| {
                let source = source.upgrade()?;
                Some((name.clone(), source.numeric().to_json(source.precision())))
            })
            .collect::<Map<String, Value>>();
        Value::Object(values)
    }
}

struct CellInner<T> {
    name: String,
    value: Cell<T>,
    precision: Cell<Option<usize>>,
    reporting: Cell<bool>,
    core: Weak<RefCell<Core>>,
}

impl<T: StateValue> CellInner<T> {
    fn set(&self, value: T) {
        self.value.set(value);
        if self.reporting.get() {
            self.report();
        }
    }

    fn report(&self) {
        let Some(core) = self.core.upgrade() else {
            debug!(state = self.name.as_str(), "engine gone, report discarded");
            return;
        };
        let payload = self.numeric().render(self.precision.get());
        shared::emit(&core, Label::Report, &self.name, &payload);
    }
}

impl<T: StateValue> StateSource for CellInner<T> {
    fn numeric(&self) -> Numeric {
        self.value.get().into_numeric()
    }

    fn precision(&self) -> Option<usize> {
        self.precision.get()
    }
}

/// A named piece of device state registered with an engine.
///
/// Every [`StateCell::set`] emits an `R` line with the new value while
/// reporting is enabled. Dropping the cell unregisters the name; arguments
/// bound through [`StateCell::argument`] then stop writing.
pub struct StateCell<T: StateValue> {
    inner: Rc<CellInner<T>>,
}

impl<T: StateValue> StateCell<T> {
    pub(crate) fn register(core: &Rc<RefCell<Core>>, name: &str, initial: T) -> Result<Self> {
        let inner = Rc::new(CellInner {
            name: name.to_string(),
            value: Cell::new(initial),
            precision: Cell::new(None),
            reporting: Cell::new(true),
            core: Rc::downgrade(core),
        });

        let weak = Rc::downgrade(&inner);
        let source: Weak<dyn StateSource> = weak;
        let mut core = core.try_borrow_mut().map_err(|_| {
            ProtocolError::InvalidArgument(format!("state {name} registered while engine busy"))
        })?;
        core.states.insert(name, source)?;

        debug!(state = name, kind = %T::KIND, "state registered");
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn kind(&self) -> NumericKind {
        T::KIND
    }

    pub fn get(&self) -> T {
        self.inner.value.get()
    }

    /// Store `value` and report it if reporting is enabled.
    pub fn set(&self, value: T) {
        self.inner.set(value);
    }

    /// Report the current value now, regardless of the reporting flag.
    pub fn report(&self) {
        self.inner.report();
    }

    pub fn set_reporting(&self, enabled: bool) {
        self.inner.reporting.set(enabled);
    }

    pub fn is_reporting(&self) -> bool {
        self.inner.reporting.get()
    }

    /// Render real values with exactly `digits` decimals.
    pub fn with_precision(self, digits: usize) -> Self {
        self.set_precision(Some(digits));
        self
    }

    pub fn set_precision(&self, digits: Option<usize>) {
        self.inner.precision.set(digits);
    }

    pub fn precision(&self) -> Option<usize> {
        self.inner.precision.get()
    }

    /// Argument descriptor writing into this state.
    ///
    /// The default range predicate of the state's kind is attached; calling
    /// `with_validator` on the result replaces it.
    pub fn argument(&self) -> ArgumentSpec {
        let target = Rc::downgrade(&self.inner);
        let name = self.inner.name.clone();
        ArgumentSpec::from_numeric_setter(T::KIND, move |value| match target.upgrade() {
            Some(inner) => inner.set(T::from_numeric(value)),
            None => warn!(state = name.as_str(), "argument bound to a dropped state"),
        })
        .with_default_validator()
    }
}

impl<T: StateValue> Drop for StateCell<T> {
    fn drop(&mut self) {
        let Some(core) = self.inner.core.upgrade() else {
            return;
        };
        let weak = Rc::downgrade(&self.inner);
        let source: Weak<dyn StateSource> = weak;
        match core.try_borrow_mut() {
            Ok(mut core) => {
                if core.states.remove_source(&self.inner.name, &source) {
                    debug!(state = self.inner.name.as_str(), "state unregistered");
                }
            }
            // The entry's weak reference is dead from here on, so the name
            // already reads as free.
            Err(_) => debug!(state = self.inner.name.as_str(), "state dropped while engine busy"),
        };
    }
}

impl<T: StateValue + fmt::Debug> fmt::Debug for StateCell<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("name", &self.inner.name)
            .field("value", &self.inner.value.get())
            .field("reporting", &self.inner.reporting.get())
            .finish()
    }
}
