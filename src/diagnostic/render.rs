//! Human-readable text for structural mismatches.

use hookcheck_types::{encode_sequence, TypeDescriptor};

use super::{Incompatibility, Mismatch};
use crate::Mode;

/// Render an incompatibility as a sentence a caller can act on.
///
/// Types render as their encodings in backticks; parameter lists render as
/// concatenated encodings, or `none` when empty.
pub fn describe(incompatibility: &Incompatibility) -> String {
    let prefix = mode_prefix(incompatibility.mode);
    let method = if incompatibility.lifecycle {
        "teardown method"
    } else {
        "method"
    };

    match &incompatibility.mismatch {
        Mismatch::ReturnType { expected, actual } => match incompatibility.mode {
            Mode::Before | Mode::After => format!(
                "{prefix}, the hook closure must return {}, but it returns {}.",
                ty(expected),
                ty(actual)
            ),
            Mode::Instead => format!(
                "{prefix}, the hook closure must return the {method}'s return type {}, but it returns {}.",
                ty(expected),
                ty(actual)
            ),
        },
        Mismatch::Parameters { expected, actual } => {
            let closure = match incompatibility.mode {
                Mode::Before | Mode::After => "hook closure",
                Mode::Instead => "hook closure (after `original`)",
            };
            format!(
                "{prefix}, the {closure} parameters must be the same as the {method}'s. \
                 The closure parameters are {}, the {method} parameters are {}.",
                list(actual),
                list(expected)
            )
        }
        Mismatch::Arity { expected, actual } => format!(
            "{prefix}, the hook closure takes the `original` closure followed by the {method}'s parameters. \
             The hook closure has {actual} parameter{} after `original`, the {method} has {expected}.",
            plural(*actual)
        ),
        Mismatch::NotACallable { actual } => format!(
            "{prefix}, the hook closure's first parameter must be the `original` closure, but it is {}.",
            ty(actual)
        ),
        Mismatch::OriginalReturnType { expected, actual } => format!(
            "{prefix}, the `original` closure must return the {method}'s return type {}, but it returns {}.",
            ty(expected),
            ty(actual)
        ),
        Mismatch::OriginalParameters { expected, actual } => format!(
            "{prefix}, the `original` closure parameters must be the same as the {method}'s. \
             The `original` closure parameters are {}, the {method} parameters are {}.",
            list(actual),
            list(expected)
        ),
    }
}

fn mode_prefix(mode: Mode) -> &'static str {
    match mode {
        Mode::Before | Mode::After => "For `before` and `after` mode",
        Mode::Instead => "For `instead` mode",
    }
}

fn ty(descriptor: &TypeDescriptor) -> String {
    format!("`{descriptor}`")
}

fn list(types: &[TypeDescriptor]) -> String {
    if types.is_empty() {
        "none".to_string()
    } else {
        format!("`{}`", encode_sequence(types))
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}
