//! Overload resolution for method calls.
//!
//! ## Algorithm
//!
//! 1. Drop candidates whose signature was already seen (an override and the
//!    method it replaces are one candidate; the most derived one is kept)
//! 2. Filter candidates by argument count
//! 3. Sum the implicit conversion cost of every argument
//! 4. The unique cheapest candidate wins; a tie is ambiguous

use rustc_hash::FxHashSet;

use portc_core::ir::Expr;
use portc_core::{MethodId, ResolveError, Span};
use portc_registry::Program;

use crate::checker::const_value;
use crate::conversion::find_implicit;

/// A viable candidate and the total cost of calling it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverloadMatch {
    pub method: MethodId,
    pub cost: u32,
}

/// Total conversion cost of calling `method` with `args`, if applicable.
pub fn call_cost(program: &Program, method: MethodId, args: &[Expr]) -> Option<u32> {
    let params = &program.method(method).params;
    if params.len() != args.len() {
        return None;
    }
    params.iter().zip(args).try_fold(0, |total, (param, arg)| {
        let value = const_value(program, arg);
        find_implicit(program, &arg.ty, &param.ty, value.as_ref()).map(|c| total + c.cost)
    })
}

/// Pick the overload of `name` to call with `args`.
///
/// `candidates` must be ordered most derived first.
pub fn resolve_overload(
    program: &Program,
    name: &str,
    candidates: &[MethodId],
    args: &[Expr],
    span: Span,
) -> Result<OverloadMatch, ResolveError> {
    let mut seen = FxHashSet::default();
    let viable: Vec<OverloadMatch> = candidates
        .iter()
        .copied()
        .filter(|m| seen.insert(program.method(*m).signature))
        .filter_map(|method| call_cost(program, method, args).map(|cost| OverloadMatch { method, cost }))
        .collect();

    let Some(best) = viable.iter().map(|m| m.cost).min() else {
        let args: Vec<String> = args.iter().map(|a| a.ty.display(program).to_string()).collect();
        return Err(ResolveError::NoApplicableOverload {
            name: name.to_string(),
            args: args.join(", "),
            span,
        });
    };

    let winners: Vec<&OverloadMatch> = viable.iter().filter(|m| m.cost == best).collect();
    match winners.as_slice() {
        [single] => Ok(**single),
        tied => Err(ResolveError::AmbiguousCall {
            name: name.to_string(),
            candidates: tied
                .iter()
                .map(|m| program.method_signature_display(m.method))
                .collect(),
            span,
        }),
    }
}
