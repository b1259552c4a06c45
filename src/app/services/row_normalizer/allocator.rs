//! Test number allocation for parameters without limits-table entries.
//!
//! Each unique output parameter needs one stable test number for the life
//! of a conversion run. Parameters with a limits-table entry reserve that
//! entry's number; everything else receives a synthesized number from a
//! shared counter that skips every number already registered.

use crate::constants::FIRST_TEST_NUMBER;
use indexmap::IndexMap;

/// Registry assigning one collision-free test number per parameter name
#[derive(Debug, Clone)]
pub struct TestNumberAllocator {
    assigned: IndexMap<String, u32>,
    counter: u32,
}

impl TestNumberAllocator {
    pub fn new() -> Self {
        Self {
            assigned: IndexMap::new(),
            counter: FIRST_TEST_NUMBER,
        }
    }

    /// Allocate (or return the already-assigned) test number for a
    /// parameter. Idempotent: repeat calls return the same number, and no
    /// two distinct names receive the same number within one run.
    pub fn allocate(&mut self, parameter: &str) -> u32 {
        if let Some(&number) = self.assigned.get(parameter) {
            return number;
        }
        // The first allocation takes the counter directly; later ones
        // advance it past every number already registered, including
        // numbers reserved from the limits table.
        if !self.assigned.is_empty() {
            while self.assigned.values().any(|&n| n == self.counter) {
                self.counter += 1;
            }
        }
        let number = self.counter;
        self.assigned.insert(parameter.to_string(), number);
        self.counter += 1;
        number
    }

    /// Reserve a limits-table-sourced number for a parameter. A parameter
    /// that already holds a number keeps it; never reassigns.
    pub fn reserve(&mut self, parameter: &str, number: u32) {
        self.assigned.entry(parameter.to_string()).or_insert(number);
    }

    /// Look up a previously assigned number without allocating
    pub fn lookup(&self, parameter: &str) -> Option<u32> {
        self.assigned.get(parameter).copied()
    }

    /// Whether the parameter has been registered (allocated or reserved)
    pub fn is_registered(&self, parameter: &str) -> bool {
        self.assigned.contains_key(parameter)
    }

    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }
}

impl Default for TestNumberAllocator {
    fn default() -> Self {
        Self::new()
    }
}
