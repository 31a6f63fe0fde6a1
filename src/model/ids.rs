/// Monotonic id source.
///
/// Ids are `{prefix}{separator}{n}` with `n` strictly increasing, so two calls
/// in the same millisecond can never collide. Callers pass a `taken` predicate so
/// that ids already present in data received from another frame are skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self, prefix: &str, separator: char, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let n = self.bump();
            let id = format!("{}{}{}", prefix, separator, n);
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Returns the raw counter value and advances it.
    fn bump(&mut self) -> u64 {
        if self.next == 0 {
            self.next = 1;
        }
        let n = self.next;
        self.next += 1;
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_ids_that_already_exist() {
        let existing = ["field_1", "field_2"];
        let mut ids = IdGenerator::new();
        let id = ids.next_id("field", '_', |candidate| existing.contains(&candidate));
        assert_eq!(id, "field_3");
        assert_eq!(ids.next_id("field", '_', |_| false), "field_4");
    }

    #[test]
    fn default_generator_starts_at_one() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_id("node", '-', |_| false), "node-1");
    }
}
