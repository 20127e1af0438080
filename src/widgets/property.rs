//! Typed, defaulted metadata slots attachable to any widget.
//!
//! A [`Property`] is an out-of-band descriptor: the value lives in the
//! [`Widgets`] world keyed by `(widget, name)`, never inside the widget
//! node itself, so callers can hang data off widgets they do not own.

use super::{WidgetId, Widgets};

/// Descriptor for a per-widget metadata slot.
///
/// Reads fall back to `default` when no value was ever stored. Writes that
/// do not change the value are ignored; writes that do invoke the optional
/// `changed` hook with the world and the owning widget.
pub struct Property<T> {
    name: &'static str,
    default: T,
    changed: Option<fn(&mut Widgets, WidgetId)>,
}

impl<T: Clone + PartialEq + 'static> Property<T> {
    pub const fn new(name: &'static str, default: T) -> Self {
        Self {
            name,
            default,
            changed: None,
        }
    }

    pub const fn with_changed(
        name: &'static str,
        default: T,
        changed: fn(&mut Widgets, WidgetId),
    ) -> Self {
        Self {
            name,
            default,
            changed: Some(changed),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn default_value(&self) -> T {
        self.default.clone()
    }

    /// Current value for `widget`, or the declared default.
    pub fn get(&self, widgets: &Widgets, widget: WidgetId) -> T {
        widgets
            .props
            .get(&(widget, self.name))
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
            .unwrap_or_else(|| self.default.clone())
    }

    /// Store a value for `widget`, firing the change hook when it differs
    /// from the current one.
    pub fn set(&self, widgets: &mut Widgets, widget: WidgetId, value: T) {
        if self.get(widgets, widget) == value {
            return;
        }
        widgets.props.insert((widget, self.name), Box::new(value));
        if let Some(changed) = self.changed {
            changed(widgets, widget);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static COUNTER: Property<u32> = Property::new("counter", 7);

    #[test]
    fn get_returns_default_until_set() {
        let mut widgets = Widgets::new();
        let w = widgets.create_widget();
        assert_eq!(COUNTER.get(&widgets, w), 7);
        COUNTER.set(&mut widgets, w, 11);
        assert_eq!(COUNTER.get(&widgets, w), 11);
    }

    #[test]
    fn values_are_per_widget() {
        let mut widgets = Widgets::new();
        let a = widgets.create_widget();
        let b = widgets.create_widget();
        COUNTER.set(&mut widgets, a, 1);
        assert_eq!(COUNTER.get(&widgets, a), 1);
        assert_eq!(COUNTER.get(&widgets, b), 7);
    }

    #[test]
    fn change_hook_fires_only_on_change() {
        static TRACKED: Property<u32> = Property::with_changed("tracked", 0, |widgets, id| {
            // Record hook invocations in a second slot so the test can
            // observe them without global state.
            let hits = HITS.get(widgets, id);
            HITS.set(widgets, id, hits + 1);
        });
        static HITS: Property<u32> = Property::new("tracked-hits", 0);

        let mut widgets = Widgets::new();
        let w = widgets.create_widget();
        TRACKED.set(&mut widgets, w, 5);
        TRACKED.set(&mut widgets, w, 5);
        assert_eq!(HITS.get(&widgets, w), 1);
        TRACKED.set(&mut widgets, w, 6);
        assert_eq!(HITS.get(&widgets, w), 2);
    }
}
