/// Ordered queue of typed events.
///
/// Producers push during input handling; the owner drains once per update and
/// applies the events in emission order.
#[derive(Debug)]
pub struct EventBus<E> {
    events: Vec<E>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self { events: Vec::new() }
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: E) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[E] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::EventBus;

    #[test]
    fn keeps_emission_order() {
        let mut bus = EventBus::new();
        bus.emit("a");
        bus.emit("b");
        assert_eq!(bus.events(), &["a", "b"]);
    }

    #[test]
    fn drain_clears_events() {
        let mut bus = EventBus::new();
        bus.emit(1);
        let drained = bus.drain();
        assert_eq!(drained, vec![1]);
        assert!(bus.is_empty());
    }
}
