//! Equi-depth histograms and the builders that produce them.
//!
//! A `Histogram` backs the planner's row-count estimates: one per indexed
//! column (built streaming, exact, during `ANALYZE`) and one per
//! non-indexed column sampled for (built approximate, from a presorted
//! sample). Bucket `count` is always the *cumulative* row count through
//! that bucket, never the bucket's own count alone - this lets range
//! queries answer with a single subtraction between two bucket lookups.

use crate::error::{PlanError, Result};
use alloc::vec::Vec;
use core::cmp::Ordering;
use cynos_core::Value;

/// One bucket of an equi-depth histogram.
///
/// `value` is the bucket's upper boundary; `count` is cumulative through
/// this bucket; `repeats` counts how many rows equal `value` exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub count: u64,
    pub value: Value,
    pub repeats: u64,
}

/// An equi-depth histogram over a column or an index's composite key.
#[derive(Clone, Debug, Default)]
pub struct Histogram {
    pub id: i64,
    pub ndv: u64,
    pub buckets: Vec<Bucket>,
}

impl Histogram {
    /// Creates an empty histogram with the given id.
    pub fn empty(id: i64) -> Self {
        Self {
            id,
            ndv: 0,
            buckets: Vec::new(),
        }
    }

    /// Total row count covered by the histogram (the last bucket's
    /// cumulative count, or zero if there are no buckets).
    pub fn total_count(&self) -> u64 {
        self.buckets.last().map(|b| b.count).unwrap_or(0)
    }
}

/// Encodes a row's columns into a single composite-key `Value::Bytes`,
/// one length-prefixed, type-tagged datum per column. Used by
/// [`build_index`] for multi-column indexes, and decoded back a single
/// column at a time by [`copy_from_index_columns`].
pub(crate) fn encode_composite_key(row: &[Value]) -> Value {
    let mut out = Vec::new();
    for v in row {
        encode_datum(v, &mut out);
    }
    Value::Bytes(out)
}

fn encode_datum(v: &Value, out: &mut Vec<u8>) {
    let mut payload = Vec::new();
    let tag: u8 = match v {
        Value::Null => 0,
        Value::Boolean(b) => {
            payload.push(*b as u8);
            1
        }
        Value::Int32(i) => {
            payload.extend_from_slice(&i.to_be_bytes());
            2
        }
        Value::Int64(i) => {
            payload.extend_from_slice(&i.to_be_bytes());
            3
        }
        Value::Float64(f) => {
            payload.extend_from_slice(&f.to_be_bytes());
            4
        }
        Value::String(s) => {
            payload.extend_from_slice(s.as_bytes());
            5
        }
        Value::DateTime(d) => {
            payload.extend_from_slice(&d.to_be_bytes());
            6
        }
        Value::Bytes(b) => {
            payload.extend_from_slice(b);
            7
        }
        Value::Jsonb(j) => {
            payload.extend_from_slice(&j.0);
            8
        }
    };
    out.push(tag);
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(&payload);
}

/// Decodes the first datum out of a composite-key encoding, returning the
/// decoded value and the number of bytes it consumed. Returns `None` when
/// `bytes` is empty - the sentinel [`copy_from_index_columns`] stops at.
fn decode_first_datum(bytes: &[u8]) -> Option<(Value, usize)> {
    if bytes.is_empty() {
        return None;
    }
    let tag = bytes[0];
    let len = u32::from_be_bytes(bytes[1..5].try_into().ok()?) as usize;
    let payload = &bytes[5..5 + len];
    let value = match tag {
        0 => Value::Null,
        1 => Value::Boolean(payload[0] != 0),
        2 => Value::Int32(i32::from_be_bytes(payload.try_into().ok()?)),
        3 => Value::Int64(i64::from_be_bytes(payload.try_into().ok()?)),
        4 => Value::Float64(f64::from_be_bytes(payload.try_into().ok()?)),
        5 => Value::String(core::str::from_utf8(payload).ok()?.into()),
        6 => Value::DateTime(i64::from_be_bytes(payload.try_into().ok()?)),
        7 => Value::Bytes(payload.into()),
        8 => Value::Jsonb(cynos_core::JsonbValue::new(payload.into())),
        _ => return None,
    };
    Some((value, 5 + len))
}

/// Pairwise-fuses adjacent buckets, halving the bucket count and doubling
/// `values_per_bucket`. `new buckets[i] = old buckets[2i+1]` - its `count`
/// is already cumulative, so it already includes the fused-away bucket
/// `2i`'s rows.
fn merge_buckets(
    buckets: &mut Vec<Bucket>,
    bucket_idx: &mut usize,
    values_per_bucket: &mut u64,
    last_number: &mut u64,
) {
    let pairs = buckets.len() / 2;
    let mut merged = Vec::with_capacity(pairs);
    for i in 0..pairs {
        let b = &buckets[2 * i + 1];
        merged.push(Bucket {
            count: b.count,
            value: b.value.clone(),
            repeats: b.repeats,
        });
    }
    *buckets = merged;
    *values_per_bucket *= 2;
    *bucket_idx /= 2;
    *last_number = if *bucket_idx > 0 {
        buckets[*bucket_idx - 1].count
    } else {
        0
    };
}

/// Streaming, exact equi-depth histogram builder for indexes and primary
/// keys. `records` must yield rows in ascending key order; `n` is the
/// bucket cap. When `is_index` is set, each row is reduced to the
/// composite-key encoding of all its columns (a multi-column index);
/// otherwise only the row's first datum is used (a primary key scan).
///
/// Returns the total row count observed and the resulting histogram.
pub fn build_index<I>(records: I, n: usize, is_index: bool, id: i64) -> Result<(u64, Histogram)>
where
    I: IntoIterator<Item = Result<Vec<Value>>>,
{
    let mut buckets: Vec<Bucket> = Vec::new();
    let mut values_per_bucket: u64 = 1;
    let mut last_number: u64 = 0;
    let mut bucket_idx: usize = 0;
    let mut ndv: u64 = 0;
    let mut total_count: u64 = 0;

    if n == 0 {
        return Err(PlanError::internal("build_index: bucket cap must be > 0"));
    }

    for row in records {
        let row = row?;
        total_count += 1;
        let data = if is_index {
            encode_composite_key(&row)
        } else {
            row.first().cloned().unwrap_or(Value::Null)
        };

        if buckets.is_empty() {
            buckets.push(Bucket {
                count: 1,
                value: data,
                repeats: 1,
            });
            ndv = 1;
            continue;
        }

        match data.cmp(&buckets[bucket_idx].value) {
            Ordering::Equal => {
                buckets[bucket_idx].count += 1;
                buckets[bucket_idx].repeats += 1;
            }
            Ordering::Less => {
                return Err(PlanError::internal(
                    "build_index: records not in ascending key order",
                ));
            }
            Ordering::Greater => {
                let fits = buckets[bucket_idx].count + 1 - last_number <= values_per_bucket;
                if fits {
                    buckets[bucket_idx].value = data;
                    buckets[bucket_idx].repeats = 1;
                    buckets[bucket_idx].count += 1;
                    ndv += 1;
                } else if bucket_idx + 1 == n {
                    merge_buckets(&mut buckets, &mut bucket_idx, &mut values_per_bucket, &mut last_number);
                    let fits_after_merge =
                        buckets[bucket_idx].count + 1 - last_number <= values_per_bucket;
                    if fits_after_merge {
                        buckets[bucket_idx].value = data;
                        buckets[bucket_idx].repeats = 1;
                        buckets[bucket_idx].count += 1;
                        ndv += 1;
                    } else {
                        last_number = buckets[bucket_idx].count;
                        buckets.push(Bucket {
                            count: last_number + 1,
                            value: data,
                            repeats: 1,
                        });
                        bucket_idx = buckets.len() - 1;
                        ndv += 1;
                    }
                } else {
                    last_number = buckets[bucket_idx].count;
                    buckets.push(Bucket {
                        count: last_number + 1,
                        value: data,
                        repeats: 1,
                    });
                    bucket_idx = buckets.len() - 1;
                    ndv += 1;
                }
            }
        }
    }

    Ok((total_count, Histogram { id, ndv, buckets }))
}

/// Approximate histogram builder for non-indexed columns, built from a
/// presorted sample rather than a full streaming pass.
pub fn build_column(ndv: u64, count: u64, mut samples: Vec<Value>, n: usize, id: i64) -> Histogram {
    if count == 0 || samples.is_empty() || n == 0 {
        return Histogram::empty(id);
    }
    samples.sort();

    let values_per_bucket = count / n as u64 + 1;
    let sample_factor = (count / samples.len() as u64).max(1);
    let ndv_factor = if ndv == 0 {
        sample_factor
    } else {
        (count / ndv).min(sample_factor).max(1)
    };

    let mut buckets: Vec<Bucket> = Vec::new();
    let mut bucket_idx: usize = 0;
    let mut last_count: u64 = 0;

    for (i, sample) in samples.iter().enumerate() {
        let total_count = (i as u64 + 1) * sample_factor;
        if !buckets.is_empty() && *sample == buckets[bucket_idx].value {
            buckets[bucket_idx].count = total_count;
            if buckets[bucket_idx].repeats == ndv_factor {
                buckets[bucket_idx].repeats = 2 * sample_factor;
            } else {
                buckets[bucket_idx].repeats += sample_factor;
            }
        } else if !buckets.is_empty()
            && total_count - last_count <= values_per_bucket
        {
            buckets[bucket_idx].value = sample.clone();
            buckets[bucket_idx].count = total_count;
            buckets[bucket_idx].repeats = ndv_factor;
        } else {
            last_count = buckets.last().map(|b| b.count).unwrap_or(0);
            buckets.push(Bucket {
                count: total_count,
                value: sample.clone(),
                repeats: ndv_factor,
            });
            bucket_idx = buckets.len() - 1;
        }
    }

    Histogram { id, ndv, buckets }
}

/// Decodes a single-column index histogram into a column histogram by
/// stripping the composite-key encoding from each bucket boundary. Stops
/// at the first bucket whose encoded value is empty (the sentinel).
pub fn copy_from_index_columns(idx_hist: &Histogram, id: i64) -> Histogram {
    let mut buckets = Vec::with_capacity(idx_hist.buckets.len());
    for b in &idx_hist.buckets {
        let bytes = match &b.value {
            Value::Bytes(bytes) => bytes.as_slice(),
            _ => break,
        };
        match decode_first_datum(bytes) {
            Some((value, _consumed)) => buckets.push(Bucket {
                count: b.count,
                value,
                repeats: b.repeats,
            }),
            None => break,
        }
    }
    Histogram {
        id,
        ndv: idx_hist.ndv,
        buckets,
    }
}
