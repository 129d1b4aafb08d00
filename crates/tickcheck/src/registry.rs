use std::fmt;

/// Body of a single-frame test: runs to completion in one call.
pub type SingleFrameFn = Box<dyn FnMut()>;

/// Body of a multi-frame test: polled once per tick until it returns `true`.
pub type MultiFrameFn = Box<dyn FnMut() -> bool>;

pub struct SingleFrameTest {
    name: String,
    action: SingleFrameFn,
}

impl SingleFrameTest {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn run(&mut self) {
        (self.action)();
    }
}

pub struct MultiFrameTest {
    name: String,
    poll: MultiFrameFn,
}

impl MultiFrameTest {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` once the test has finished.
    pub(crate) fn poll(&mut self) -> bool {
        (self.poll)()
    }
}

/// Ordered test sequences.
///
/// Sequences only grow. Names are diagnostic: duplicates are kept, never looked up.
#[derive(Default)]
pub struct TestRegistry {
    single_frame: Vec<SingleFrameTest>,
    multi_frame: Vec<MultiFrameTest>,
}

impl TestRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_single_frame<F>(&mut self, name: impl Into<String>, action: F)
    where
        F: FnMut() + 'static,
    {
        let name = name.into();
        log::info!("single-frame test registered: {name}");
        self.single_frame.push(SingleFrameTest {
            name,
            action: Box::new(action),
        });
    }

    pub fn register_multi_frame<F>(&mut self, name: impl Into<String>, poll: F)
    where
        F: FnMut() -> bool + 'static,
    {
        let name = name.into();
        log::info!("multi-frame test registered: {name}");
        self.multi_frame.push(MultiFrameTest {
            name,
            poll: Box::new(poll),
        });
    }

    pub fn single_frame_len(&self) -> usize {
        self.single_frame.len()
    }

    pub fn multi_frame_len(&self) -> usize {
        self.multi_frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.single_frame.is_empty() && self.multi_frame.is_empty()
    }

    pub fn single_frame_names(&self) -> impl Iterator<Item = &str> {
        self.single_frame.iter().map(SingleFrameTest::name)
    }

    pub fn multi_frame_names(&self) -> impl Iterator<Item = &str> {
        self.multi_frame.iter().map(MultiFrameTest::name)
    }

    pub(crate) fn single_frame_mut(&mut self, index: usize) -> Option<&mut SingleFrameTest> {
        self.single_frame.get_mut(index)
    }

    pub(crate) fn multi_frame_mut(&mut self) -> &mut [MultiFrameTest] {
        &mut self.multi_frame
    }
}

impl fmt::Debug for TestRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRegistry")
            .field("single_frame", &self.single_frame_names().collect::<Vec<_>>())
            .field("multi_frame", &self.multi_frame_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Registration refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A run is in progress; sequences are frozen until it reports.
    Locked { name: String },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Locked { name } => {
                write!(f, "cannot register test {name:?} while a run is in progress")
            }
        }
    }
}

impl std::error::Error for RegistryError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn keeps_registration_order_and_duplicates() {
        let mut r = TestRegistry::new();
        r.register_single_frame("b", || {});
        r.register_single_frame("a", || {});
        r.register_single_frame("b", || {});
        r.register_multi_frame("m", || true);

        assert_eq!(r.single_frame_names().collect::<Vec<_>>(), ["b", "a", "b"]);
        assert_eq!(r.multi_frame_len(), 1);
        assert!(!r.is_empty());
    }

    #[test]
    fn closures_keep_private_state() {
        let mut r = TestRegistry::new();
        let mut count = 0;
        r.register_multi_frame("counter", move || {
            count += 1;
            count >= 2
        });

        let test = &mut r.multi_frame_mut()[0];
        assert!(!test.poll());
        assert!(test.poll());
    }

    #[test]
    fn single_frame_lookup_past_end_is_none() {
        let hits = Rc::new(Cell::new(0));
        let mut r = TestRegistry::new();
        let h = Rc::clone(&hits);
        r.register_single_frame("only", move || h.set(h.get() + 1));

        r.single_frame_mut(0).unwrap().run();
        assert!(r.single_frame_mut(1).is_none());
        assert_eq!(hits.get(), 1);
    }
}
