//! Query plan cache for avoiding repeated optimization.
//!
//! This module provides a simple LRU cache for compiled physical plans.
//! When the same bound plan is executed multiple times, the cached
//! physical plan can be reused, skipping optimization and physical
//! planning entirely.

use crate::ast::Expr;
use crate::planner::{BoundPlan, PhysicalPlan};
use alloc::collections::BTreeMap;
use core::hash::Hasher;

/// A simple hasher for computing plan fingerprints.
/// Uses FNV-1a algorithm which is fast and has good distribution.
#[derive(Default)]
struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    fn new() -> Self {
        Self {
            state: Self::FNV_OFFSET,
        }
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.state ^= *byte as u64;
            self.state = self.state.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Computes a fingerprint (hash) for a bound plan.
/// Plans with the same structure will have the same fingerprint.
pub fn compute_plan_fingerprint(plan: &BoundPlan) -> u64 {
    let mut hasher = FnvHasher::new();
    hash_bound_plan(plan, &mut hasher);
    hasher.finish()
}

fn hash_bound_plan<H: Hasher>(plan: &BoundPlan, hasher: &mut H) {
    match plan {
        BoundPlan::Scan { table } => {
            hasher.write(b"scan");
            hasher.write(table.as_bytes());
        }
        BoundPlan::Filter { input, predicate } => {
            hasher.write(b"filter");
            hash_bound_plan(input, hasher);
            hash_expr(predicate, hasher);
        }
        BoundPlan::Project { input, columns } => {
            hasher.write(b"project");
            hash_bound_plan(input, hasher);
            for col in columns {
                hash_expr(col, hasher);
            }
        }
        BoundPlan::Join {
            left,
            right,
            condition,
            join_type,
        } => {
            hasher.write(b"join");
            hash_bound_plan(left, hasher);
            hash_bound_plan(right, hasher);
            hash_expr(condition, hasher);
            hasher.write(&[*join_type as u8]);
        }
        BoundPlan::Aggregate {
            input,
            group_by,
            aggregates,
        } => {
            hasher.write(b"aggregate");
            hash_bound_plan(input, hasher);
            for col in group_by {
                hash_expr(col, hasher);
            }
            for (func, expr) in aggregates {
                hasher.write(&[*func as u8]);
                hash_expr(expr, hasher);
            }
        }
        BoundPlan::Sort { input, order_by } => {
            hasher.write(b"sort");
            hash_bound_plan(input, hasher);
            for (expr, order) in order_by {
                hash_expr(expr, hasher);
                hasher.write(&[*order as u8]);
            }
        }
        BoundPlan::Limit {
            input,
            limit,
            offset,
        } => {
            hasher.write(b"limit");
            hash_bound_plan(input, hasher);
            hasher.write(&limit.to_le_bytes());
            hasher.write(&offset.to_le_bytes());
        }
        BoundPlan::CrossProduct { left, right } => {
            hasher.write(b"cross_product");
            hash_bound_plan(left, hasher);
            hash_bound_plan(right, hasher);
        }
        BoundPlan::Empty => {
            hasher.write(b"empty");
        }
    }
}

fn hash_expr<H: Hasher>(expr: &Expr, hasher: &mut H) {
    match expr {
        Expr::Column(col_ref) => {
            hasher.write(b"col");
            hasher.write(col_ref.table.as_bytes());
            hasher.write(col_ref.column.as_bytes());
            hasher.write(&col_ref.index.to_le_bytes());
        }
        Expr::Literal(v) => {
            hasher.write(b"lit");
            hash_value(v, hasher);
        }
        Expr::BinaryOp { left, op, right } => {
            hasher.write(b"binop");
            hasher.write(&[*op as u8]);
            hash_expr(left, hasher);
            hash_expr(right, hasher);
        }
        Expr::UnaryOp { op, expr } => {
            hasher.write(b"unop");
            hasher.write(&[*op as u8]);
            hash_expr(expr, hasher);
        }
        Expr::Function { name, args } => {
            hasher.write(b"func");
            hasher.write(name.as_bytes());
            for arg in args {
                hash_expr(arg, hasher);
            }
        }
        Expr::Aggregate {
            func,
            expr,
            distinct,
        } => {
            hasher.write(b"agg");
            hasher.write(&[*func as u8]);
            if let Some(e) = expr {
                hash_expr(e, hasher);
            }
            hasher.write(&[*distinct as u8]);
        }
        Expr::Between { expr, low, high } => {
            hasher.write(b"between");
            hash_expr(expr, hasher);
            hash_expr(low, hasher);
            hash_expr(high, hasher);
        }
        Expr::NotBetween { expr, low, high } => {
            hasher.write(b"not_between");
            hash_expr(expr, hasher);
            hash_expr(low, hasher);
            hash_expr(high, hasher);
        }
        Expr::In { expr, list } => {
            hasher.write(b"in");
            hash_expr(expr, hasher);
            for item in list {
                hash_expr(item, hasher);
            }
        }
        Expr::NotIn { expr, list } => {
            hasher.write(b"not_in");
            hash_expr(expr, hasher);
            for item in list {
                hash_expr(item, hasher);
            }
        }
        Expr::Like { expr, pattern } => {
            hasher.write(b"like");
            hash_expr(expr, hasher);
            hasher.write(pattern.as_bytes());
        }
        Expr::NotLike { expr, pattern } => {
            hasher.write(b"not_like");
            hash_expr(expr, hasher);
            hasher.write(pattern.as_bytes());
        }
        Expr::Match { expr, pattern } => {
            hasher.write(b"match");
            hash_expr(expr, hasher);
            hasher.write(pattern.as_bytes());
        }
        Expr::NotMatch { expr, pattern } => {
            hasher.write(b"not_match");
            hash_expr(expr, hasher);
            hasher.write(pattern.as_bytes());
        }
    }
}

fn hash_value<H: Hasher>(value: &cynos_core::Value, hasher: &mut H) {
    use cynos_core::Value;
    match value {
        Value::Null => hasher.write(b"null"),
        Value::Boolean(b) => {
            hasher.write(b"bool");
            hasher.write(&[*b as u8]);
        }
        Value::Int32(i) => {
            hasher.write(b"i32");
            hasher.write(&i.to_le_bytes());
        }
        Value::Int64(i) => {
            hasher.write(b"i64");
            hasher.write(&i.to_le_bytes());
        }
        Value::Float64(f) => {
            hasher.write(b"f64");
            hasher.write(&f.to_le_bytes());
        }
        Value::String(s) => {
            hasher.write(b"str");
            hasher.write(s.as_bytes());
        }
        Value::DateTime(dt) => {
            hasher.write(b"dt");
            hasher.write(&dt.to_le_bytes());
        }
        Value::Bytes(b) => {
            hasher.write(b"bytes");
            hasher.write(b);
        }
        Value::Jsonb(j) => {
            hasher.write(b"jsonb");
            // Hash the debug representation for simplicity
            use alloc::format;
            let s = format!("{:?}", j);
            hasher.write(s.as_bytes());
        }
    }
}

/// Cache entry with access tracking for LRU eviction.
struct CacheEntry {
    plan: PhysicalPlan,
    last_access: u64,
}

/// LRU cache for compiled physical plans.
///
/// The cache stores physical plans keyed by their bound-plan fingerprint.
/// When the cache is full, the least recently used entry is evicted.
pub struct PlanCache {
    /// Cached plans indexed by fingerprint.
    cache: BTreeMap<u64, CacheEntry>,
    /// Maximum number of entries.
    max_size: usize,
    /// Global access counter for LRU tracking.
    access_counter: u64,
    /// Cache statistics.
    hits: u64,
    misses: u64,
}

impl PlanCache {
    /// Creates a new plan cache with the given maximum size.
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: BTreeMap::new(),
            max_size,
            access_counter: 0,
            hits: 0,
            misses: 0,
        }
    }

    /// Creates a plan cache with default size (64 entries).
    pub fn default_size() -> Self {
        Self::new(64)
    }

    /// Gets a cached plan by fingerprint, or returns None if not cached.
    pub fn get(&mut self, fingerprint: u64) -> Option<&PhysicalPlan> {
        self.access_counter += 1;
        if let Some(entry) = self.cache.get_mut(&fingerprint) {
            entry.last_access = self.access_counter;
            self.hits += 1;
            Some(&entry.plan)
        } else {
            self.misses += 1;
            None
        }
    }

    /// Inserts a plan into the cache.
    /// If the cache is full, evicts the least recently used entry.
    pub fn insert(&mut self, fingerprint: u64, plan: PhysicalPlan) {
        // Evict if necessary
        if self.cache.len() >= self.max_size {
            self.evict_lru();
        }

        self.access_counter += 1;
        self.cache.insert(
            fingerprint,
            CacheEntry {
                plan,
                last_access: self.access_counter,
            },
        );
    }

    /// Gets a cached plan or compiles and caches a new one.
    pub fn get_or_insert_with<F>(&mut self, fingerprint: u64, compile: F) -> &PhysicalPlan
    where
        F: FnOnce() -> PhysicalPlan,
    {
        self.access_counter += 1;

        if self.cache.contains_key(&fingerprint) {
            let entry = self.cache.get_mut(&fingerprint).unwrap();
            entry.last_access = self.access_counter;
            self.hits += 1;
            &self.cache.get(&fingerprint).unwrap().plan
        } else {
            self.misses += 1;

            // Evict if necessary
            if self.cache.len() >= self.max_size {
                self.evict_lru();
            }

            let plan = compile();
            self.cache.insert(
                fingerprint,
                CacheEntry {
                    plan,
                    last_access: self.access_counter,
                },
            );
            &self.cache.get(&fingerprint).unwrap().plan
        }
    }

    /// Evicts the least recently used entry.
    fn evict_lru(&mut self) {
        if self.cache.is_empty() {
            return;
        }

        // Find the entry with the smallest last_access
        let lru_key = self
            .cache
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(k, _)| *k);

        if let Some(key) = lru_key {
            self.cache.remove(&key);
        }
    }

    /// Clears the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }

    /// Returns the number of cached plans.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns cache hit count.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Returns cache miss count.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns cache hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Invalidates all cached plans for a specific table.
    /// Call this when table schema or data changes significantly.
    pub fn invalidate_table(&mut self, _table: &str) {
        // For simplicity, clear the entire cache.
        // A more sophisticated implementation could track which plans
        // reference which tables and only invalidate those.
        self.cache.clear();
    }
}
