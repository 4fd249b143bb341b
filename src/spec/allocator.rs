//! Operand allocator: positional values to operand slots.
//!
//! Binding follows flexible function-signature semantics rather than plain
//! left-to-right assignment:
//!
//! ```text
//! required, optional = default, *rest, required_trailer
//! ```
//!
//! Without a repeatable slot, trailing required slots are fed from the end
//! and optional leading slots only take values once every required leading
//! slot is satisfied. With one, the slots before and after it are satisfied
//! first and the repeatable slot takes whatever is left in the middle.

use crate::spec::definition::OperandDef;
use crate::spec::error::BindError;
use crate::spec::value::ArgValue;

/// Assign `values` to `slots`, returning one resolved value per slot.
///
/// Fails on missing required values, nil where not allowed, nil inside a
/// repeatable slot, and surplus values.
pub(crate) fn allocate(
    slots: &[&OperandDef],
    values: &[ArgValue],
) -> Result<Vec<ArgValue>, BindError> {
    let assigned = match slots.iter().position(|s| s.repeatable) {
        Some(index) => allocate_with_repeatable(slots, index, values)?,
        None => allocate_fixed(slots, values)?,
    };

    slots
        .iter()
        .zip(assigned)
        .map(|(slot, value)| finish_slot(slot, value))
        .collect()
}

/// No repeatable slot: reserve the trailing required run, then walk the
/// leading slots.
fn allocate_fixed(
    slots: &[&OperandDef],
    values: &[ArgValue],
) -> Result<Vec<Option<ArgValue>>, BindError> {
    let trailing_len = slots.iter().rev().take_while(|s| s.needs_value()).count();
    let (leading, trailing) = slots.split_at(slots.len() - trailing_len);

    let reserved = trailing_len.min(values.len());
    let (head, tail) = values.split_at(values.len() - reserved);

    let (mut assigned, consumed) = allocate_leading(leading, head);
    if consumed < head.len() {
        return Err(BindError::UnexpectedArguments {
            values: head[consumed..].iter().map(ToString::to_string).collect(),
        });
    }

    for (i, slot) in trailing.iter().enumerate() {
        assigned.push(tail.get(i).cloned().or_else(|| slot.default.clone()));
    }

    tracing::trace!(
        leading = leading.len(),
        trailing = trailing_len,
        values = values.len(),
        "allocated fixed operands"
    );
    Ok(assigned)
}

/// Walk leading slots in order. Required slots always take the next value;
/// optional slots take one only while the extras budget lasts.
///
/// Returns the per-slot assignment and how many values were consumed.
fn allocate_leading(slots: &[&OperandDef], values: &[ArgValue]) -> (Vec<Option<ArgValue>>, usize) {
    let required = slots.iter().filter(|s| s.required).count();
    let mut extras = values.len().saturating_sub(required);
    let mut cursor = 0;
    let mut assigned = Vec::with_capacity(slots.len());

    for slot in slots {
        let takes = cursor < values.len() && (slot.required || extras > 0);
        if takes {
            if !slot.required {
                extras -= 1;
            }
            assigned.push(Some(values[cursor].clone()));
            cursor += 1;
        } else {
            assigned.push(slot.default.clone());
        }
    }
    (assigned, cursor)
}

/// One repeatable slot at `index`: pre slots, the repeatable middle, post slots.
fn allocate_with_repeatable(
    slots: &[&OperandDef],
    index: usize,
    values: &[ArgValue],
) -> Result<Vec<Option<ArgValue>>, BindError> {
    let pre = &slots[..index];
    let repeatable = slots[index];
    let post = &slots[index + 1..];
    let total = values.len();

    let post_required = post.iter().filter(|s| s.required).count();
    let pre_available = total.saturating_sub(post_required);
    let pre_end = pre_available.min(pre.len());
    let post_start = pre_end.max(total.saturating_sub(post.len()));

    let (mut assigned, consumed) = allocate_leading(pre, &values[..pre_end]);
    if consumed < pre_end {
        return Err(BindError::UnexpectedArguments {
            values: values[consumed..pre_end].iter().map(ToString::to_string).collect(),
        });
    }

    assigned.push(Some(collect_repeatable(repeatable, &values[pre_end..post_start])?));

    let tail = &values[post_start..];
    for (i, slot) in post.iter().enumerate() {
        assigned.push(tail.get(i).cloned().or_else(|| slot.default.clone()));
    }

    tracing::trace!(
        operand = %repeatable.name,
        pre_end,
        post_start,
        values = total,
        "allocated repeatable operand"
    );
    Ok(assigned)
}

/// Flatten the middle slice one level. Empty or all-nil falls back to the
/// slot's default (an empty list when none is declared); nil mixed with real
/// values is ambiguous and rejected.
fn collect_repeatable(slot: &OperandDef, slice: &[ArgValue]) -> Result<ArgValue, BindError> {
    let mut items = Vec::new();
    for value in slice {
        match value {
            ArgValue::List(inner) => items.extend(inner.iter().cloned()),
            other => items.push(other.clone()),
        }
    }

    if items.iter().all(ArgValue::is_nil) {
        return Ok(slot.default.clone().unwrap_or(ArgValue::List(Vec::new())));
    }
    if items.iter().any(ArgValue::is_nil) {
        return Err(BindError::NilInRepeatable {
            name: slot.name.clone(),
        });
    }
    Ok(ArgValue::List(items))
}

/// Enforce required / allow_nil on the final assignment of one slot.
fn finish_slot(slot: &OperandDef, value: Option<ArgValue>) -> Result<ArgValue, BindError> {
    let missing = || BindError::MissingRequired {
        what: "operand",
        name: slot.name.clone(),
    };
    match value {
        None if slot.required => Err(missing()),
        None => Ok(ArgValue::Nil),
        Some(ArgValue::Nil) if slot.required && !slot.allow_nil => Err(BindError::NilNotAllowed {
            what: "Operand",
            name: slot.name.clone(),
        }),
        Some(ArgValue::List(items)) if slot.repeatable && slot.required && items.is_empty() => {
            Err(missing())
        }
        Some(value) => Ok(value),
    }
}
