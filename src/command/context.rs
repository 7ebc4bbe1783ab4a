/*!
context.rs - per-dispatch scratch space.

A `CommandContext` carries:
  - the full token array of the in-flight dispatch
  - a cursor (`depth`) into that array, unset between dispatches
  - a key/value map (insertion ordered) used by acceptors to hand converted
    values to executors

A context is NOT meant to be shared between concurrent dispatches; every
dispatch acquires its own (see `Dispatcher`). It is `Send`, so it can be
created on one thread and used on another.
*/

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

pub type Value = Box<dyn Any + Send>;

#[derive(Default)]
pub struct CommandContext {
    values: IndexMap<String, Value>,
    arguments: Vec<String>,
    depth: Option<usize>,
}

impl CommandContext {
    pub fn new() -> Self {
        Self::default()
    }

    /* ---- Values ---- */

    /// Store `value` under `key`, returning the previous value if any.
    ///
    /// # Panics
    /// If `key` is blank.
    pub fn put<T: Any + Send>(&mut self, key: impl Into<String>, value: T) -> Option<Value> {
        let key = key.into();
        assert_key(&key);
        self.values.insert(key, Box::new(value))
    }

    /// Typed lookup; `None` when the key is missing or holds another type.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        assert_key(key);
        self.values.get(key)?.downcast_ref::<T>()
    }

    pub fn get_raw(&self, key: &str) -> Option<&(dyn Any + Send)> {
        assert_key(key);
        self.values.get(key).map(|v| v.as_ref())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        assert_key(key);
        self.values.shift_remove(key)
    }

    /// Remove and return the value only if it has type `T`; otherwise the
    /// entry is left in place.
    pub fn take<T: Any>(&mut self, key: &str) -> Option<T> {
        if !self.get_raw(key).is_some_and(|v| v.is::<T>()) {
            return None;
        }
        self.values
            .shift_remove(key)
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }

    pub fn has_key(&self, key: &str) -> bool {
        assert_key(key);
        self.values.contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Drop all values; arguments and cursor are kept.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Drop values, arguments and cursor.
    pub fn reset(&mut self) {
        self.clear();
        self.arguments.clear();
        self.depth = None;
    }

    /* ---- Arguments / cursor ---- */

    /// Token under the cursor, or `""` while the cursor is unset.
    pub fn argument(&self) -> &str {
        self.depth
            .and_then(|d| self.arguments.get(d))
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Replace the token array. Nothing is copied when `args` equals the
    /// current array, which is the common case while walking one dispatch.
    /// A cursor that falls outside the new array is unset.
    pub fn set_arguments(&mut self, args: &[String]) {
        if self.arguments.as_slice() != args {
            self.arguments = args.to_vec();
        }
        if self.depth.is_some_and(|d| d >= self.arguments.len()) {
            self.depth = None;
        }
    }

    pub fn depth(&self) -> Option<usize> {
        self.depth
    }

    /// # Panics
    /// If `depth` is not a valid index into the current arguments.
    pub fn set_depth(&mut self, depth: usize) {
        assert!(
            depth < self.arguments.len(),
            "context depth {depth} out of range (arguments: {})",
            self.arguments.len()
        );
        self.depth = Some(depth);
    }

    /// True when nothing from a previous dispatch is left behind.
    pub fn is_reset(&self) -> bool {
        self.values.is_empty() && self.arguments.is_empty() && self.depth.is_none()
    }
}

fn assert_key(key: &str) {
    assert!(!key.trim().is_empty(), "context key must not be blank");
}

impl fmt::Debug for CommandContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandContext")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .field("arguments", &self.arguments)
            .field("depth", &self.depth)
            .finish()
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::*;

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn values_keep_insertion_order() {
        let mut ctx = CommandContext::new();
        ctx.put("second", 2_i32);
        ctx.put("first", "one".to_string());
        ctx.put("third", true);
        assert_eq!(ctx.keys().collect::<Vec<_>>(), vec!["second", "first", "third"]);
    }

    #[test]
    fn typed_get_and_take() {
        let mut ctx = CommandContext::new();
        ctx.put("n", 7_i64);
        assert_eq!(ctx.get::<i64>("n"), Some(&7));
        assert_eq!(ctx.get::<String>("n"), None);

        assert_eq!(ctx.take::<String>("n"), None, "wrong type leaves the entry");
        assert!(ctx.has_key("n"));
        assert_eq!(ctx.take::<i64>("n"), Some(7));
        assert!(!ctx.has_key("n"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let mut ctx = CommandContext::new();
        ctx.put("Name", 1_u8);
        assert!(ctx.has_key("Name"));
        assert!(!ctx.has_key("name"));
    }

    #[test]
    #[should_panic(expected = "blank")]
    fn blank_key_panics() {
        CommandContext::new().put("  ", 1_u8);
    }

    #[test]
    fn cursor_reads_current_token() {
        let mut ctx = CommandContext::new();
        assert_eq!(ctx.argument(), "");
        ctx.set_arguments(&args(&["hello", "world"]));
        ctx.set_depth(1);
        assert_eq!(ctx.argument(), "world");
        assert_eq!(ctx.depth(), Some(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn cursor_out_of_range_panics() {
        let mut ctx = CommandContext::new();
        ctx.set_arguments(&args(&["only"]));
        ctx.set_depth(1);
    }

    #[test]
    fn shrinking_arguments_unsets_cursor() {
        let mut ctx = CommandContext::new();
        ctx.set_arguments(&args(&["a", "b", "c"]));
        ctx.set_depth(2);
        ctx.set_arguments(&args(&["a"]));
        assert_eq!(ctx.depth(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut ctx = CommandContext::new();
        ctx.set_arguments(&args(&["a"]));
        ctx.set_depth(0);
        ctx.put("k", 1_u8);
        assert!(!ctx.is_reset());

        ctx.clear();
        assert!(ctx.is_empty());
        assert_eq!(ctx.arguments().len(), 1, "clear keeps arguments");

        ctx.reset();
        assert!(ctx.is_reset());
    }
}
