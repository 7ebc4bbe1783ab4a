/*!
tree.rs - command tree arena, builder and token acceptance.

Nodes live in a single `Vec` and refer to each other by `NodeId`. The tree is
assembled through `TreeBuilder` (parent links are assigned exactly once, child
lists are append-only) and frozen with `TreeBuilder::finish`. The resulting
`CommandTree` is read-only and can be shared between concurrent dispatches;
all per-call state lives in `CommandContext`.

Depth is derived, never stored: the number of non-root ancestors of a node.
Children of the root therefore have depth 0, matching token index 0.
*/

use std::fmt;

use super::complete::default_completer;
use super::context::CommandContext;
use super::error::{BuildError, Result};
use super::hooks::{
    Action, ActionInterceptor, ArgumentAcceptor, Completer, ExampleProvider, Executor, Hooks,
};
use crate::log_trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(&self) -> usize {
        self.0
    }
}

/* ---- Node ---- */

pub struct CommandNode {
    description: String,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
    parent_assigned: bool,
    hooks: Hooks,
}

impl CommandNode {
    fn new(description: String, parent_assigned: bool) -> Result<Self> {
        if description.trim().is_empty() {
            return Err(BuildError::BlankDescription);
        }
        Ok(Self {
            description,
            children: Vec::new(),
            parent: None,
            parent_assigned,
            hooks: Hooks::default(),
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn example_provider(&self) -> Option<&ExampleProvider> {
        self.hooks.example_provider.as_ref()
    }

    pub fn action_interceptor(&self) -> Option<&ActionInterceptor> {
        self.hooks.action_interceptor.as_ref()
    }

    pub fn argument_acceptor(&self) -> Option<&ArgumentAcceptor> {
        self.hooks.argument_acceptor.as_ref()
    }

    pub fn completer(&self) -> Option<&Completer> {
        self.hooks.completer.as_ref()
    }

    pub fn executor(&self) -> Option<&Executor> {
        self.hooks.executor.as_ref()
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandNode")
            .field("description", &self.description)
            .field("children", &self.children)
            .field("parent", &self.parent)
            .field("hooks", &self.hooks)
            .finish()
    }
}

/* ---- Builder ---- */

/// Mutable assembly phase of a `CommandTree`.
pub struct TreeBuilder {
    nodes: Vec<CommandNode>,
    root: NodeId,
}

impl TreeBuilder {
    /// Start a tree whose root carries `description`. The root's parent slot
    /// counts as assigned, so it can never be attached below another node.
    pub fn new(description: impl Into<String>) -> Result<Self> {
        let root = CommandNode::new(description.into(), true)?;
        Ok(Self {
            nodes: vec![root],
            root: NodeId(0),
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node with the default prefix completer installed.
    pub fn command(&mut self, description: impl Into<String>) -> Result<NodeId> {
        let mut node = CommandNode::new(description.into(), false)?;
        node.hooks.completer = Some(default_completer());
        self.nodes.push(node);
        Ok(NodeId(self.nodes.len() - 1))
    }

    /// Hook setters for `id`.
    ///
    /// # Panics
    /// If `id` was not produced by this builder.
    pub fn node(&mut self, id: NodeId) -> NodeMut<'_> {
        let len = self.nodes.len();
        let node = self
            .nodes
            .get_mut(id.0)
            .unwrap_or_else(|| panic!("node #{} does not belong to this tree ({len} nodes)", id.0));
        NodeMut { node }
    }

    /// Attach `child` as the last child of `parent`.
    pub fn sub_command(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;
        if self.nodes[child.0].parent_assigned {
            return Err(BuildError::ParentAlreadySet {
                description: self.nodes[child.0].description.clone(),
            });
        }
        // `child` has no parent yet, so a cycle can only appear if `child` is
        // `parent` itself or one of its ancestors.
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(BuildError::Cycle {
                    parent: self.nodes[parent.0].description.clone(),
                    child: self.nodes[child.0].description.clone(),
                });
            }
            cursor = self.nodes[id.0].parent;
        }

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.parent_assigned = true;
        self.nodes[parent.0].children.push(child);
        Ok(())
    }

    pub fn sub_commands(
        &mut self,
        parent: NodeId,
        children: impl IntoIterator<Item = NodeId>,
    ) -> Result<()> {
        for child in children {
            self.sub_command(parent, child)?;
        }
        Ok(())
    }

    pub fn finish(self) -> CommandTree {
        let detached = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| *i != self.root.0 && !n.parent_assigned)
            .count();
        if detached > 0 {
            crate::log_debug!("[tree] {detached} node(s) were never attached and are unreachable");
        }
        CommandTree {
            nodes: self.nodes,
            root: self.root,
        }
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if id.0 < self.nodes.len() {
            Ok(())
        } else {
            Err(BuildError::UnknownNode { index: id.0 })
        }
    }
}

/// Single-slot, last-write-wins hook setters for one node.
pub struct NodeMut<'a> {
    node: &'a mut CommandNode,
}

impl NodeMut<'_> {
    pub fn argument_acceptor(
        &mut self,
        acceptor: impl Fn(&mut CommandContext) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.hooks.argument_acceptor = Some(Box::new(acceptor));
        self
    }

    pub fn action_interceptor(
        &mut self,
        interceptor: impl Fn(&CommandContext, Action) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.hooks.action_interceptor = Some(Box::new(interceptor));
        self
    }

    pub fn example_provider(
        &mut self,
        provider: impl Fn(&CommandContext) -> Vec<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.hooks.example_provider = Some(Box::new(provider));
        self
    }

    pub fn completer(
        &mut self,
        completer: impl Fn(&CommandContext, Vec<String>) -> Vec<String> + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.hooks.completer = Some(Box::new(completer));
        self
    }

    pub fn without_completer(&mut self) -> &mut Self {
        self.node.hooks.completer = None;
        self
    }

    pub fn executor(
        &mut self,
        executor: impl Fn(&mut CommandContext) -> bool + Send + Sync + 'static,
    ) -> &mut Self {
        self.node.hooks.executor = Some(Box::new(executor));
        self
    }
}

/* ---- Finished tree ---- */

/// Read-only command tree.
pub struct CommandTree {
    nodes: Vec<CommandNode>,
    root: NodeId,
}

impl CommandTree {
    pub fn builder(description: impl Into<String>) -> Result<TreeBuilder> {
        TreeBuilder::new(description)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    /// If `id` belongs to another tree.
    pub fn node(&self, id: NodeId) -> &CommandNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&CommandNode> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn is_root(&self, id: NodeId) -> bool {
        self.node(id).parent.is_none()
    }

    /// Number of ancestors strictly above `id`, not counting the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut cursor = self.node(id).parent;
        while let Some(ancestor) = cursor {
            if self.is_root(ancestor) {
                break;
            }
            depth += 1;
            cursor = self.node(ancestor).parent;
        }
        depth
    }

    /// Descriptions from the first level below the root down to `id`.
    pub fn path(&self, id: NodeId) -> Vec<&str> {
        let mut out = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if self.is_root(current) {
                break;
            }
            out.push(self.node(current).description());
            cursor = self.node(current).parent;
        }
        out.reverse();
        out
    }

    /// Pre-order walk from the root, children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![self.root];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.node(id).children.iter().rev().copied());
            Some(id)
        })
    }

    /* ---- Token acceptance ---- */

    /// Does node `id` consume the token at its depth?
    ///
    /// Blank or missing tokens are rejected without calling the acceptor, and a
    /// node without an acceptor rejects everything.
    pub fn accept_argument(&self, id: NodeId, ctx: &mut CommandContext, args: &[String]) -> bool {
        let node = self.node(id);
        let depth = self.depth(id);
        let Some(token) = args.get(depth) else {
            return false;
        };
        if token.trim().is_empty() {
            return false;
        }
        ctx.set_arguments(args);
        ctx.set_depth(depth);
        let accepted = node
            .hooks
            .argument_acceptor
            .as_ref()
            .is_some_and(|acceptor| acceptor(ctx));
        log_trace!(
            "[tree]({}) {} token '{}' (args={}, depth={})",
            node.description,
            if accepted { "accepted" } else { "rejected" },
            token,
            args.len(),
            depth
        );
        accepted
    }

    /// First child of `id` that accepts its token, in insertion order.
    pub fn accept(&self, id: NodeId, ctx: &mut CommandContext, args: &[String]) -> Option<NodeId> {
        if args.len() <= self.depth(id) {
            return None;
        }
        self.node(id)
            .children
            .iter()
            .copied()
            .find(|&child| self.accept_argument(child, ctx, args))
    }

    /// Ask the interceptor of `id` whether `action` is blocked. Only consulted
    /// when there is a token at the node's depth; otherwise the action is allowed.
    pub(crate) fn intercepts(
        &self,
        id: NodeId,
        ctx: &CommandContext,
        action: Action,
        args: &[String],
    ) -> bool {
        let depth = self.depth(id);
        if args.len() <= depth {
            return false;
        }
        let node = self.node(id);
        let blocked = node
            .hooks
            .action_interceptor
            .as_ref()
            .is_some_and(|interceptor| interceptor(ctx, action));
        log_trace!(
            "[tree]({}) {} {action} on '{}' (args={}, depth={})",
            node.description,
            if blocked { "blocked" } else { "allowed" },
            args[depth],
            args.len(),
            depth
        );
        blocked
    }
}

impl fmt::Debug for CommandTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandTree")
            .field("root", &self.root)
            .field("nodes", &self.nodes)
            .finish()
    }
}

/* ---- Tests ---- */
