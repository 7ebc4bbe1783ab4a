/*!
hooks.rs - pluggable node behavior.

A node may carry up to five hooks, each optional and single-slot:

  ArgumentAcceptor   does this node consume the token under the cursor?
  ActionInterceptor  veto COMPLETE / EXECUTE for this node (true = block)
  ExampleProvider    raw suggestion candidates for this node
  Completer          filter candidates against the token being typed
  Executor           terminal action; returns success / failure

Stock hooks live in the `acceptors`, `examples` and `interceptors` submodules.
All hooks are `Send + Sync` so a finished tree can be shared between threads.
*/

use std::fmt;

use super::context::CommandContext;

/// Action an interceptor is asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Complete,
    Execute,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Complete => "complete",
            Action::Execute => "execute",
        })
    }
}

pub type ArgumentAcceptor = Box<dyn Fn(&mut CommandContext) -> bool + Send + Sync>;
pub type ActionInterceptor = Box<dyn Fn(&CommandContext, Action) -> bool + Send + Sync>;
pub type ExampleProvider = Box<dyn Fn(&CommandContext) -> Vec<String> + Send + Sync>;
pub type Completer = Box<dyn Fn(&CommandContext, Vec<String>) -> Vec<String> + Send + Sync>;
pub type Executor = Box<dyn Fn(&mut CommandContext) -> bool + Send + Sync>;

/// Hook slots of a single node.
#[derive(Default)]
pub struct Hooks {
    pub example_provider: Option<ExampleProvider>,
    pub action_interceptor: Option<ActionInterceptor>,
    pub argument_acceptor: Option<ArgumentAcceptor>,
    pub completer: Option<Completer>,
    pub executor: Option<Executor>,
}

impl Hooks {
    /// Short names of the configured hooks, in slot order.
    pub fn names(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.argument_acceptor.is_some() {
            out.push("accept");
        }
        if self.example_provider.is_some() {
            out.push("examples");
        }
        if self.completer.is_some() {
            out.push("complete");
        }
        if self.action_interceptor.is_some() {
            out.push("intercept");
        }
        if self.executor.is_some() {
            out.push("execute");
        }
        out
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/* ---- Acceptors ---- */

pub mod acceptors {
    use super::ArgumentAcceptor;
    use crate::command::context::CommandContext;

    pub fn equals(expected: impl Into<String>) -> ArgumentAcceptor {
        let expected = expected.into();
        Box::new(move |ctx: &mut CommandContext| ctx.argument() == expected)
    }

    pub fn not_equals(unexpected: impl Into<String>) -> ArgumentAcceptor {
        let unexpected = unexpected.into();
        Box::new(move |ctx: &mut CommandContext| ctx.argument() != unexpected)
    }

    pub fn equals_ignore_case(expected: impl Into<String>) -> ArgumentAcceptor {
        let expected = expected.into().to_lowercase();
        Box::new(move |ctx: &mut CommandContext| ctx.argument().to_lowercase() == expected)
    }

    pub fn not_equals_ignore_case(unexpected: impl Into<String>) -> ArgumentAcceptor {
        let unexpected = unexpected.into().to_lowercase();
        Box::new(move |ctx: &mut CommandContext| ctx.argument().to_lowercase() != unexpected)
    }

    pub fn contains<I, S>(allowed: I) -> ArgumentAcceptor
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: Vec<String> = allowed.into_iter().map(Into::into).collect();
        Box::new(move |ctx: &mut CommandContext| allowed.iter().any(|a| a == ctx.argument()))
    }

    pub fn not_contains<I, S>(denied: I) -> ArgumentAcceptor
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let denied: Vec<String> = denied.into_iter().map(Into::into).collect();
        Box::new(move |ctx: &mut CommandContext| !denied.iter().any(|d| d == ctx.argument()))
    }

    /// Optional sign followed by ASCII digits.
    pub fn integral() -> ArgumentAcceptor {
        Box::new(|ctx: &mut CommandContext| is_integral(ctx.argument()))
    }

    /// Optional sign, digits, at most one decimal point (`1`, `-2.5`, `.5`, `3.`).
    pub fn numeric() -> ArgumentAcceptor {
        Box::new(|ctx: &mut CommandContext| is_numeric(ctx.argument()))
    }

    pub fn is_integral(raw: &str) -> bool {
        let digits = raw.strip_prefix(['+', '-']).unwrap_or(raw);
        !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
    }

    pub fn is_numeric(raw: &str) -> bool {
        let body = raw.strip_prefix(['+', '-']).unwrap_or(raw);
        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (body, None),
        };
        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        match frac_part {
            None => !int_part.is_empty() && all_digits(int_part),
            Some(frac) => {
                (!int_part.is_empty() || !frac.is_empty()) && all_digits(int_part) && all_digits(frac)
            }
        }
    }
}

/* ---- Example providers ---- */

pub mod examples {
    use super::ExampleProvider;
    use crate::command::context::CommandContext;

    pub fn singleton(example: impl Into<String>) -> ExampleProvider {
        let example = example.into();
        Box::new(move |_: &CommandContext| vec![example.clone()])
    }

    pub fn collection<I, S>(examples: I) -> ExampleProvider
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let examples: Vec<String> = examples.into_iter().map(Into::into).collect();
        Box::new(move |_: &CommandContext| examples.clone())
    }
}

/* ---- Interceptors ---- */

pub mod interceptors {
    use super::{Action, ActionInterceptor};
    use crate::command::context::CommandContext;

    /// React only to `Action::Complete`; everything else is allowed.
    pub fn on_complete<F>(predicate: F) -> ActionInterceptor
    where
        F: Fn(&CommandContext) -> bool + Send + Sync + 'static,
    {
        Box::new(move |ctx: &CommandContext, action: Action| match action {
            Action::Complete => predicate(ctx),
            Action::Execute => false,
        })
    }

    /// React only to `Action::Execute`; everything else is allowed.
    pub fn on_execute<F>(predicate: F) -> ActionInterceptor
    where
        F: Fn(&CommandContext) -> bool + Send + Sync + 'static,
    {
        Box::new(move |ctx: &CommandContext, action: Action| match action {
            Action::Execute => predicate(ctx),
            Action::Complete => false,
        })
    }
}

/* ---- Tests ---- */
#[cfg(test)]
mod tests {
    use super::acceptors::{is_integral, is_numeric};
    use super::*;

    fn ctx_at(token: &str) -> CommandContext {
        let mut ctx = CommandContext::new();
        ctx.set_arguments(&[token.to_string()]);
        ctx.set_depth(0);
        ctx
    }

    #[test]
    fn equality_acceptors() {
        let mut ctx = ctx_at("Hello");
        assert!(acceptors::equals("Hello")(&mut ctx));
        assert!(!acceptors::equals("hello")(&mut ctx));
        assert!(acceptors::equals_ignore_case("hello")(&mut ctx));
        assert!(acceptors::not_equals("hello")(&mut ctx));
        assert!(!acceptors::not_equals_ignore_case("HELLO")(&mut ctx));
    }

    #[test]
    fn membership_acceptors() {
        let mut ctx = ctx_at("world");
        assert!(acceptors::contains(["ketikai", "world"])(&mut ctx));
        assert!(!acceptors::not_contains(vec!["world".to_string()])(&mut ctx));
    }

    #[test]
    fn integral_and_numeric_shapes() {
        assert!(is_integral("42"));
        assert!(is_integral("-7"));
        assert!(!is_integral("+"));
        assert!(!is_integral("4.2"));
        assert!(is_numeric("4.2"));
        assert!(is_numeric(".5"));
        assert!(is_numeric("3."));
        assert!(!is_numeric("."));
        assert!(!is_numeric("1.2.3"));
        assert!(!is_numeric("abc"));
    }

    #[test]
    fn interceptors_filter_by_action() {
        let ctx = ctx_at("x");
        let block_complete = interceptors::on_complete(|_| true);
        assert!(block_complete(&ctx, Action::Complete));
        assert!(!block_complete(&ctx, Action::Execute));

        let block_execute = interceptors::on_execute(|c| c.argument() == "x");
        assert!(block_execute(&ctx, Action::Execute));
        assert!(!block_execute(&ctx, Action::Complete));
    }

    #[test]
    fn example_providers() {
        let ctx = CommandContext::new();
        assert_eq!(examples::singleton("hello")(&ctx), vec!["hello"]);
        assert_eq!(examples::collection(["a", "b"])(&ctx), vec!["a", "b"]);
    }

    #[test]
    fn hook_names_follow_slot_order() {
        let hooks = Hooks {
            executor: Some(Box::new(|_: &mut CommandContext| true)),
            argument_acceptor: Some(acceptors::integral()),
            ..Default::default()
        };
        assert_eq!(hooks.names(), vec!["accept", "execute"]);
    }
}
