use std::sync::Arc;

use counter::Counter;

pub mod counter;

/// A memory accounting scope that aggregates the usage of all contexts created
/// from it.
///
/// Aggregated contexts form a tree. Every byte reported by a [`LocalMemoryContext`]
/// is accounted in its aggregated parent and in all ancestors of that parent.
/// Any node may carry a limit; a report that would push a node past its limit
/// fails and leaves the whole tree unchanged.
///
/// The context is cheap to clone and safe to share between threads: readers
/// of different columns may create child contexts from the same parent concurrently.
#[derive(Clone)]
pub struct AggregatedMemoryContext(Arc<ContextNode>);

impl AggregatedMemoryContext {
    /// Creates a new unlimited root context.
    pub fn new_root() -> AggregatedMemoryContext {
        AggregatedMemoryContext(ContextNode::new("root", None, None))
    }

    /// Creates a new root context that refuses usage above `limit` bytes.
    pub fn new_root_with_limit(limit: u64) -> AggregatedMemoryContext {
        AggregatedMemoryContext(ContextNode::new("root", None, Some(limit)))
    }

    /// Returns the name of this context.
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the limit of this context, if any. Ancestors may impose lower ones.
    pub fn limit(&self) -> Option<u64> {
        self.0.limit
    }

    /// Returns the bytes currently accounted in this context and its descendants.
    ///
    /// **Note**: the returned value may be outdated in a concurrent environment.
    pub fn bytes(&self) -> u64 {
        self.0.used.read()
    }

    /// Creates a child aggregated context with no limit of its own.
    pub fn new_aggregated_context(&self, name: impl Into<String>) -> AggregatedMemoryContext {
        AggregatedMemoryContext(ContextNode::new(name, Some(self.0.clone()), None))
    }

    /// Creates a child aggregated context that refuses usage above `limit` bytes.
    pub fn new_aggregated_context_with_limit(
        &self,
        name: impl Into<String>,
        limit: u64,
    ) -> AggregatedMemoryContext {
        AggregatedMemoryContext(ContextNode::new(name, Some(self.0.clone()), Some(limit)))
    }

    /// Creates a named leaf context through which a single owner reports its usage.
    pub fn new_local_memory_context(&self, name: impl Into<String>) -> LocalMemoryContext {
        LocalMemoryContext {
            parent: self.0.clone(),
            name: name.into(),
            bytes: 0,
        }
    }
}

impl std::fmt::Debug for AggregatedMemoryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatedMemoryContext")
            .field("name", &self.0.name)
            .field("bytes", &self.bytes())
            .field("limit", &self.0.limit)
            .finish()
    }
}

/// A leaf memory context owned by a single consumer.
///
/// The consumer reports its total current usage with [`set_bytes`](Self::set_bytes);
/// the difference to the previous report is propagated to the parent contexts.
/// Everything still reported is returned to the parents on [`close`](Self::close)
/// or when the context is dropped.
pub struct LocalMemoryContext {
    parent: Arc<ContextNode>,
    name: String,
    bytes: u64,
}

impl LocalMemoryContext {
    /// Name given to this context at creation.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Currently reported usage.
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Replaces the reported usage with `bytes`.
    ///
    /// Fails without changing anything if the growth would exceed the limit of any
    /// ancestor context.
    pub fn set_bytes(&mut self, bytes: u64) -> Result<(), MemoryLimitError> {
        if bytes > self.bytes {
            self.parent.reserve(bytes - self.bytes, &self.name)?;
        } else if bytes < self.bytes {
            self.parent.release(self.bytes - bytes);
        }
        self.bytes = bytes;
        Ok(())
    }

    /// Returns all reported usage to the parent contexts.
    ///
    /// The context stays usable; a later `set_bytes` reports again.
    pub fn close(&mut self) {
        if self.bytes != 0 {
            self.parent.release(self.bytes);
            self.bytes = 0;
        }
    }
}

impl Drop for LocalMemoryContext {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LocalMemoryContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMemoryContext")
            .field("name", &self.name)
            .field("bytes", &self.bytes)
            .finish_non_exhaustive()
    }
}

/// An error that occurs when reported usage would exceed a context limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemoryLimitError {
    /// Name of the local context whose report failed.
    pub context: String,
    /// Name of the aggregated context whose limit was hit.
    pub limit_context: String,
    /// Growth that was refused.
    pub requested: u64,
    /// Limit of `limit_context`.
    pub limit: u64,
}

impl std::fmt::Display for MemoryLimitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' requested {} more bytes, exceeding the limit {} of '{}'",
            self.context, self.requested, self.limit, self.limit_context
        )
    }
}

impl std::error::Error for MemoryLimitError {}

/// A node in the context tree.
struct ContextNode {
    name: String,
    /// All usage accounted here is also accounted in the parent.
    parent: Option<Arc<ContextNode>>,
    used: Counter,
    limit: Option<u64>,
}

impl ContextNode {
    fn new(
        name: impl Into<String>,
        parent: Option<Arc<ContextNode>>,
        limit: Option<u64>,
    ) -> Arc<ContextNode> {
        Arc::new(ContextNode {
            name: name.into(),
            parent,
            used: Counter::new(0),
            limit,
        })
    }

    fn reserve(&self, amount: u64, requester: &str) -> Result<(), MemoryLimitError> {
        let limit = self.limit.unwrap_or(u64::MAX);
        if !self.used.try_add(amount, limit) {
            return Err(MemoryLimitError {
                context: requester.to_string(),
                limit_context: self.name.clone(),
                requested: amount,
                limit,
            });
        }

        if let Some(parent) = self.parent.as_deref() {
            if let Err(e) = parent.reserve(amount, requester) {
                self.used.sub(amount);
                return Err(e);
            }
        }
        Ok(())
    }

    fn release(&self, amount: u64) {
        let released = self.used.sub(amount);
        if let Some(parent) = self.parent.as_deref() {
            parent.release(released);
        }
    }
}
