use crate::constants::common::ANONYMOUS_PREFIX;
use crate::define_id_generator;

define_id_generator!(anonymous, pub);

/// State shared by every stage of one pipeline run.
#[derive(Debug, Default)]
pub struct Context {
    anonymous: AnonymousIdGenerator,
}

impl Context {
    #[must_use]
    pub fn new() -> Context {
        Context::default()
    }

    /// Symbol for the next unnamed function literal.
    pub fn next_anonymous_symbol(&mut self) -> String {
        format!("{ANONYMOUS_PREFIX}_{}", self.anonymous.next_anonymous_id())
    }
}

#[cfg(test)]
mod tests {
    use super::Context;

    #[test]
    fn anonymous_symbols_are_unique_per_context() {
        let mut context = Context::new();
        assert_eq!(context.next_anonymous_symbol(), "anonymous_0");
        assert_eq!(context.next_anonymous_symbol(), "anonymous_1");

        let mut other = Context::new();
        assert_eq!(other.next_anonymous_symbol(), "anonymous_0");
    }
}
