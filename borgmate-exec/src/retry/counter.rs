/// Counts invocations of the external operation for one request.
///
/// The count never exceeds `max`: [`AttemptCounter::try_begin`] refuses to
/// start an attempt once the ceiling is reached.
#[derive(Debug, Clone)]
pub struct AttemptCounter {
    max: u32,
    current: u32,
}

impl AttemptCounter {
    pub fn new(max: u32) -> Self {
        Self { max, current: 0 }
    }

    /// Record the start of a new attempt. Returns `false`, leaving the count
    /// unchanged, when the ceiling has been reached.
    pub fn try_begin(&mut self) -> bool {
        if self.current >= self.max {
            return false;
        }
        self.current += 1;
        true
    }

    /// 1-based number of the attempt in progress; 0 before the first.
    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn remaining(&self) -> u32 {
        self.max - self.current
    }
}
