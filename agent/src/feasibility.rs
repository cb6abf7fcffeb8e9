//! Feasibility gate: can the chain actually settle this intent?
//!
//! Runs after synthesis, once the prospective `amount_out` is known. A
//! failure here after a clean policy pass means either a race with an
//! on-chain state change or configuration drift — it is reported with
//! enough detail to tell those apart, and never retried inside the core.

use domain::{ChainSnapshot, RejectReason};

use crate::types::{GateTrace, Rejection};

pub fn check_feasibility(
    chain: &ChainSnapshot,
    amount_out: u128,
    trace: &mut GateTrace,
) -> Result<(), Rejection> {
    if !chain.active {
        trace.fail("STRATEGY_ACTIVE_CHECK");
        return Err(Rejection::new(
            RejectReason::StrategyInactive,
            format!("strategy {} holds zero tokens on-chain", chain.strategy_id),
        ));
    }
    trace.pass("STRATEGY_ACTIVE_CHECK");

    if chain.docked {
        trace.fail("STRATEGY_DOCKED_CHECK");
        return Err(Rejection::new(
            RejectReason::StrategyDocked,
            format!("strategy {} is docked", chain.strategy_id),
        ));
    }
    trace.pass("STRATEGY_DOCKED_CHECK");

    if chain.token_out_budget < amount_out {
        trace.fail("BUDGET_CHECK");
        return Err(Rejection::new(
            RejectReason::InsufficientBudget,
            format!(
                "strategy budget {} < required {}",
                chain.token_out_budget, amount_out
            ),
        ));
    }
    trace.pass("BUDGET_CHECK");

    if chain.allowance < amount_out {
        trace.fail("ALLOWANCE_CHECK");
        return Err(Rejection::new(
            RejectReason::InsufficientAllowance,
            format!(
                "maker allowance {} < required {} (allowance drift?)",
                chain.allowance, amount_out
            ),
        ));
    }
    trace.pass("ALLOWANCE_CHECK");

    Ok(())
}
