//! A single observable parameter with two write modes.
//!
//! Live writes (`is_patch = false`) are meant for continuous gestures such as a
//! slider drag: the value changes immediately but nothing is recorded. A
//! committed write (`is_patch = true`) ends the gesture and reports the change
//! from the last committed value, which the owner turns into an undo step.

/// Result of a committed write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlChange<T> {
    /// Value at the previous commit, before any live writes of this gesture.
    pub old: T,
    pub new: T,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Control<T> {
    value: T,
    committed: T,
}

impl<T: Copy + PartialEq> Control<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            committed: value,
        }
    }

    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    /// The value as of the last committed write.
    #[inline]
    pub fn committed(&self) -> T {
        self.committed
    }

    /// Returns `true` while live writes have moved the value away from the
    /// last committed one.
    pub fn is_in_gesture(&self) -> bool {
        self.value != self.committed
    }

    pub fn set(&mut self, value: T, is_patch: bool) -> Option<ControlChange<T>> {
        self.value = value;
        if !is_patch {
            return None;
        }

        let old = self.committed;
        self.committed = value;
        Some(ControlChange { old, new: value })
    }

    /// Overwrite both the live and committed value without reporting a change.
    /// Used when replaying history and when loading.
    pub fn restore(&mut self, value: T) {
        self.value = value;
        self.committed = value;
    }
}

impl<T: Copy + PartialEq + Default> Default for Control<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
