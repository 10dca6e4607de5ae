//! Mode-specific structural matching of two signatures.

use hookcheck_types::{Signature, SignatureKind, TypeDescriptor};
use tracing::trace;

use crate::diagnostic::{Diagnostic, Incompatibility, InvariantViolation, Mismatch, Side};
use crate::Mode;

/// Match an interceptor signature against a target signature for `mode`.
///
/// `target` must be a method signature (receiver and dispatch-key slots
/// first) and `interceptor` a closure signature (context slot first). Both
/// implicit prefixes are stripped before comparing. Teardown members follow
/// the same convention; `lifecycle` only changes how a mismatch is worded.
pub fn check_signatures(
    target: &Signature,
    interceptor: &Signature,
    mode: Mode,
    lifecycle: bool,
) -> Result<(), Diagnostic> {
    let target_args = explicit_arguments(Side::Target, target, SignatureKind::Method)?;
    let closure_args = explicit_arguments(Side::Interceptor, interceptor, SignatureKind::Closure)?;

    let result = match mode {
        Mode::Before | Mode::After => {
            match_around(target_args, interceptor.return_type(), closure_args)
        }
        Mode::Instead => match_instead(
            target.return_type(),
            target_args,
            interceptor.return_type(),
            closure_args,
        )?,
    };

    result.map_err(|mismatch| {
        Diagnostic::IncompatibleSignature(Incompatibility {
            mode,
            lifecycle,
            mismatch,
        })
    })
}

fn explicit_arguments(
    side: Side,
    signature: &Signature,
    expected: SignatureKind,
) -> Result<&[TypeDescriptor], Diagnostic> {
    if signature.kind() != expected {
        return Err(Diagnostic::InternalInvariantViolation(
            InvariantViolation::WrongSignatureKind {
                side,
                expected,
                actual: signature.kind(),
            },
        ));
    }
    signature.explicit_arguments().ok_or_else(|| {
        Diagnostic::InternalInvariantViolation(InvariantViolation::MissingImplicitSlots {
            side,
            required: expected.implicit_slots(),
            actual: signature.argument_types().len(),
        })
    })
}

/// `before` / `after`: void return, and either no parameters or exactly the
/// target's.
fn match_around(
    target_args: &[TypeDescriptor],
    closure_return: &TypeDescriptor,
    closure_args: &[TypeDescriptor],
) -> Result<(), Mismatch> {
    trace!("matching before/after return type");
    if !closure_return.is_void() {
        return Err(Mismatch::ReturnType {
            expected: TypeDescriptor::Void,
            actual: closure_return.clone(),
        });
    }

    // A closure may ignore every parameter.
    if closure_args.is_empty() {
        return Ok(());
    }

    trace!("matching before/after parameters");
    if closure_args != target_args {
        return Err(Mismatch::Parameters {
            expected: target_args.to_vec(),
            actual: closure_args.to_vec(),
        });
    }
    Ok(())
}

/// `instead`: first closure parameter is `original`, whose signature must be
/// the target's; the closure itself must also look like the target.
///
/// The outer `Result` carries internal violations, the inner one mismatches.
fn match_instead(
    target_return: &TypeDescriptor,
    target_args: &[TypeDescriptor],
    closure_return: &TypeDescriptor,
    closure_args: &[TypeDescriptor],
) -> Result<Result<(), Mismatch>, Diagnostic> {
    trace!("matching instead arity");
    if closure_args.len() != target_args.len() + 1 {
        return Ok(Err(Mismatch::Arity {
            expected: target_args.len(),
            actual: closure_args.len().saturating_sub(1),
        }));
    }

    let Some((original, rest)) = closure_args.split_first() else {
        return Ok(Err(Mismatch::Arity {
            expected: target_args.len(),
            actual: 0,
        }));
    };
    if !original.is_callable() {
        return Ok(Err(Mismatch::NotACallable {
            actual: original.clone(),
        }));
    }

    let original_signature = original.nested_signature().ok_or(
        Diagnostic::InternalInvariantViolation(InvariantViolation::OpaqueOriginalSignature),
    )?;

    trace!("matching original closure");
    if original_signature.return_type() != target_return {
        return Ok(Err(Mismatch::OriginalReturnType {
            expected: target_return.clone(),
            actual: original_signature.return_type().clone(),
        }));
    }
    let original_args = original_signature.argument_types().get(1..).ok_or(
        Diagnostic::InternalInvariantViolation(InvariantViolation::OriginalMissingContextSlot),
    )?;
    if original_args != target_args {
        return Ok(Err(Mismatch::OriginalParameters {
            expected: target_args.to_vec(),
            actual: original_args.to_vec(),
        }));
    }

    trace!("matching instead closure");
    if closure_return != target_return {
        return Ok(Err(Mismatch::ReturnType {
            expected: target_return.clone(),
            actual: closure_return.clone(),
        }));
    }
    if rest != target_args {
        return Ok(Err(Mismatch::Parameters {
            expected: target_args.to_vec(),
            actual: rest.to_vec(),
        }));
    }
    Ok(Ok(()))
}
