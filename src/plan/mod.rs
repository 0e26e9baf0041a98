//! Call plan construction.
//!
//! A plan is a tree of remote calls:
//! - `Single`: one call
//! - `Sequence`: a call issued after its predecessor completes
//! - `Join`: two branches that may run concurrently
//! - `Then`: the aggregation callback, only ever at the root
//!
//! Building is pure. The only validation is structural: a `Then` may be
//! applied once per plan and must be the outermost node.
//!
//! Result slots follow the node shape. `Single` and `Sequence` each yield
//! exactly one slot (for a sequence, the outcome of its last call); `Join`
//! concatenates the slots of its arms, left arm first.

use crate::descriptor::{Gas, RemoteCallDescriptor, ServiceId};
use crate::error::{OrchestrationError, Result};

/// Node of a call plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallPlanNode {
    Single(RemoteCallDescriptor),
    Sequence(Box<CallPlanNode>, RemoteCallDescriptor),
    Join(Box<CallPlanNode>, Box<CallPlanNode>),
    Then(Box<CallPlanNode>, RemoteCallDescriptor),
}

/// A plan consisting of one call.
pub fn single(descriptor: RemoteCallDescriptor) -> CallPlanNode {
    CallPlanNode::Single(descriptor)
}

/// Append a call that runs once `node` has completed.
pub fn sequence(node: CallPlanNode, descriptor: RemoteCallDescriptor) -> Result<CallPlanNode> {
    if node.has_callback() {
        return Err(OrchestrationError::malformed(format!(
            "cannot sequence '{}' after a plan that already has a callback",
            descriptor.method()
        )));
    }
    Ok(CallPlanNode::Sequence(Box::new(node), descriptor))
}

/// Combine two independent branches.
pub fn join(a: CallPlanNode, b: CallPlanNode) -> Result<CallPlanNode> {
    if a.has_callback() || b.has_callback() {
        return Err(OrchestrationError::malformed(
            "cannot join a plan that already has a callback",
        ));
    }
    Ok(CallPlanNode::Join(Box::new(a), Box::new(b)))
}

/// Attach the aggregation callback. Must be the last builder step.
pub fn then(node: CallPlanNode, callback: RemoteCallDescriptor) -> Result<CallPlanNode> {
    if node.has_callback() {
        return Err(OrchestrationError::malformed(format!(
            "callback '{}' attached to a plan that already has one",
            callback.method()
        )));
    }
    Ok(CallPlanNode::Then(Box::new(node), callback))
}

impl CallPlanNode {
    /// True if a `Then` appears anywhere in this subtree.
    pub fn has_callback(&self) -> bool {
        match self {
            CallPlanNode::Single(_) => false,
            CallPlanNode::Sequence(node, _) => node.has_callback(),
            CallPlanNode::Join(a, b) => a.has_callback() || b.has_callback(),
            CallPlanNode::Then(..) => true,
        }
    }

    /// Number of result slots this node contributes to an outcome table.
    pub fn slot_count(&self) -> usize {
        match self {
            CallPlanNode::Single(_) | CallPlanNode::Sequence(..) => 1,
            CallPlanNode::Join(a, b) => a.slot_count() + b.slot_count(),
            CallPlanNode::Then(node, _) => node.slot_count(),
        }
    }

    /// Number of remote calls in this subtree, callback included.
    pub fn call_count(&self) -> usize {
        match self {
            CallPlanNode::Single(_) => 1,
            CallPlanNode::Sequence(node, _) | CallPlanNode::Then(node, _) => node.call_count() + 1,
            CallPlanNode::Join(a, b) => a.call_count() + b.call_count(),
        }
    }

    /// Sum of every descriptor's fee, callback included.
    pub fn total_fee(&self) -> Gas {
        match self {
            CallPlanNode::Single(d) => d.fee(),
            CallPlanNode::Sequence(node, d) | CallPlanNode::Then(node, d) => node.total_fee() + d.fee(),
            CallPlanNode::Join(a, b) => a.total_fee() + b.total_fee(),
        }
    }

    /// Target shared by every call of a same-target chain, if this is one.
    ///
    /// Such chains are submitted as a single batch.
    pub fn batch_target(&self) -> Option<&ServiceId> {
        match self {
            CallPlanNode::Single(d) => Some(d.target()),
            CallPlanNode::Sequence(node, d) => node
                .batch_target()
                .filter(|target| *target == d.target()),
            _ => None,
        }
    }

    /// Descriptors of a same-target chain, in issue order.
    pub(crate) fn batch_calls(&self) -> Vec<&RemoteCallDescriptor> {
        let mut calls = Vec::new();
        self.collect_batch(&mut calls);
        calls
    }

    fn collect_batch<'a>(&'a self, out: &mut Vec<&'a RemoteCallDescriptor>) {
        match self {
            CallPlanNode::Single(d) => out.push(d),
            CallPlanNode::Sequence(node, d) => {
                node.collect_batch(out);
                out.push(d);
            }
            _ => {}
        }
    }

    /// Split a submittable plan into its body and callback.
    ///
    /// Fails unless the root is the plan's only `Then`.
    pub fn split_root(&self) -> Result<(&CallPlanNode, &RemoteCallDescriptor)> {
        match self {
            CallPlanNode::Then(body, callback) if !body.has_callback() => Ok((body, callback)),
            CallPlanNode::Then(..) => Err(OrchestrationError::malformed(
                "plan has a nested callback",
            )),
            _ => Err(OrchestrationError::malformed(
                "plan has no callback at its root",
            )),
        }
    }
}

/// Fluent plan builder.
///
/// ```rust,ignore
/// let plan = CallPlan::new("hello.test")
///     .function_call("set_greeting", args, fee)
///     .function_call("get_greeting", Vec::new(), fee)
///     .and(CallPlan::new("counter.test").function_call("get_num", Vec::new(), fee))
///     .then(RemoteCallDescriptor::no_args(self_id, "callback", fee))?;
/// ```
///
/// Repeated `function_call`s address the plan's current target and form one
/// batch. Misuse is recorded and reported by `then` / `build`.
#[derive(Debug, Clone)]
pub struct CallPlan {
    target: Option<ServiceId>,
    node: Option<CallPlanNode>,
    error: Option<String>,
}

impl CallPlan {
    /// Start a plan whose calls address `target`.
    pub fn new(target: impl Into<ServiceId>) -> Self {
        Self {
            target: Some(target.into()),
            node: None,
            error: None,
        }
    }

    /// Wrap an existing node. Its target context is the last call's target.
    pub fn from_node(node: CallPlanNode) -> Self {
        let target = match &node {
            CallPlanNode::Single(d) | CallPlanNode::Sequence(_, d) => Some(d.target().clone()),
            _ => None,
        };
        Self {
            target,
            node: Some(node),
            error: None,
        }
    }

    /// Append a call on the current target.
    pub fn function_call(mut self, method: impl Into<String>, payload: Vec<u8>, fee: Gas) -> Self {
        let method = method.into();
        let Some(target) = self.target.clone() else {
            self.record(format!("function_call '{method}' on a joined plan has no target"));
            return self;
        };
        self.push(RemoteCallDescriptor::new(target, method, payload, fee))
    }

    /// Append a call, possibly on another target, after everything so far.
    pub fn then_call(mut self, descriptor: RemoteCallDescriptor) -> Self {
        self.target = Some(descriptor.target().clone());
        self.push(descriptor)
    }

    /// Join with another plan. The result has no single target.
    pub fn and(mut self, other: CallPlan) -> Self {
        if let Some(err) = other.error {
            self.record(err);
        }
        self.node = match (self.node.take(), other.node) {
            (Some(a), Some(b)) => match join(a, b) {
                Ok(node) => Some(node),
                Err(e) => {
                    self.record(e.to_string());
                    None
                }
            },
            (a, b) => {
                self.record("cannot join an empty plan".to_string());
                a.or(b)
            }
        };
        self.target = None;
        self
    }

    /// Attach the aggregation callback and produce a submittable plan.
    pub fn then(self, callback: RemoteCallDescriptor) -> Result<CallPlanNode> {
        then(self.build()?, callback)
    }

    /// Finish without a callback, e.g. to nest inside a larger plan.
    pub fn build(self) -> Result<CallPlanNode> {
        if let Some(err) = self.error {
            return Err(OrchestrationError::MalformedPlan(err));
        }
        self.node
            .ok_or_else(|| OrchestrationError::malformed("plan has no calls"))
    }

    fn push(mut self, descriptor: RemoteCallDescriptor) -> Self {
        self.node = match self.node.take() {
            None => Some(single(descriptor)),
            Some(node) => match sequence(node, descriptor) {
                Ok(node) => Some(node),
                Err(e) => {
                    self.record(e.to_string());
                    None
                }
            },
        };
        self
    }

    fn record(&mut self, err: String) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}
