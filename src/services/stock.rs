//! Toolkit stock rules
//!
//! Pure functions over a toolkit's stock counters. The loan and toolkit
//! services call them while holding the toolkit row lock, then persist the
//! returned level. Every successful call leaves `0 <= available <= quantity`.

use crate::{
    error::{AppError, AppResult},
    models::{
        enums::{LoanStatus, ToolkitStatus},
        toolkit::Toolkit,
    },
};

/// Stock counters and status of one toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub quantity: i32,
    pub available: i32,
    pub status: ToolkitStatus,
}

/// The part of a loan that affects stock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoanState {
    pub quantity: i32,
    pub status: LoanStatus,
}

impl From<&Toolkit> for StockLevel {
    fn from(toolkit: &Toolkit) -> Self {
        StockLevel {
            quantity: toolkit.quantity,
            available: toolkit.available,
            status: toolkit.status,
        }
    }
}

impl StockLevel {
    pub fn apply_to(&self, toolkit: &mut Toolkit) {
        toolkit.quantity = self.quantity;
        toolkit.available = self.available;
        toolkit.status = self.status;
    }

    /// Units currently out on loan
    pub fn outstanding(&self) -> i32 {
        self.quantity - self.available
    }
}

/// Availability-derived status. `maintenance` and `retired` are set by hand
/// and are kept as they are; otherwise the status mirrors `available`.
pub fn derive_status(level: &StockLevel) -> ToolkitStatus {
    if !level.status.follows_stock() {
        level.status
    } else if level.available > 0 {
        ToolkitStatus::Available
    } else {
        ToolkitStatus::Borrowed
    }
}

/// Lend `quantity` units for a new loan
pub fn reserve(level: StockLevel, quantity: i32) -> AppResult<StockLevel> {
    ensure_lendable(&level)?;
    take(level, quantity)
}

/// Reconcile stock for a loan moving from `old` to `new`.
///
/// Only the first matching rule applies:
/// 1. not returned -> returned: the new quantity goes back on the shelf
/// 2. returned -> not returned: the new quantity is taken again
/// 3. still out with a different quantity: the difference is taken or released
/// 4. anything else leaves stock alone
pub fn reconcile_loan_update(
    level: StockLevel,
    old: LoanState,
    new: LoanState,
) -> AppResult<StockLevel> {
    match (old.status.is_returned(), new.status.is_returned()) {
        (false, true) => {
            if new.quantity > old.quantity {
                return Err(AppError::Validation(format!(
                    "Cannot return {} units on a loan of {}",
                    new.quantity, old.quantity
                )));
            }
            Ok(release(level, new.quantity))
        }
        (true, false) => {
            ensure_lendable(&level)?;
            take(level, new.quantity)
        }
        (false, false) if new.quantity != old.quantity => {
            let diff = new.quantity - old.quantity;
            if diff > 0 {
                ensure_lendable(&level)?;
                take(level, diff)
            } else {
                Ok(release(level, -diff))
            }
        }
        _ => Ok(level),
    }
}

/// Give back `quantity` units, e.g. when an unreturned loan is deleted.
/// `available` never climbs above `quantity`.
pub fn release(level: StockLevel, quantity: i32) -> StockLevel {
    let available = level.available.saturating_add(quantity).min(level.quantity);
    settle(StockLevel { available, ..level })
}

/// Apply a manual stock correction to both counters, clamped at zero
pub fn adjust(level: StockLevel, quantity_change: i32) -> StockLevel {
    let quantity = level.quantity.saturating_add(quantity_change).max(0);
    let available = level.available.saturating_add(quantity_change).clamp(0, quantity);
    settle(StockLevel {
        quantity,
        available,
        ..level
    })
}

/// Change the number of owned units from a catalog edit. Units on loan stay
/// on loan, so `available` moves by the same amount.
pub fn resize(level: StockLevel, new_quantity: i32) -> AppResult<StockLevel> {
    if new_quantity < 0 {
        return Err(AppError::Validation("Quantity cannot be negative".to_string()));
    }
    let outstanding = level.outstanding();
    if new_quantity < outstanding {
        return Err(AppError::InsufficientStock(format!(
            "Cannot reduce quantity to {}: {} units are on loan",
            new_quantity, outstanding
        )));
    }
    Ok(settle(StockLevel {
        quantity: new_quantity,
        available: new_quantity - outstanding,
        ..level
    }))
}

/// Apply a status requested by a catalog edit. `available` and `borrowed`
/// put the toolkit back in service and are recomputed from stock.
pub fn set_status(level: StockLevel, requested: ToolkitStatus) -> StockLevel {
    let status = if requested.follows_stock() {
        ToolkitStatus::Available
    } else {
        requested
    };
    settle(StockLevel { status, ..level })
}

fn take(level: StockLevel, quantity: i32) -> AppResult<StockLevel> {
    if quantity < 1 {
        return Err(AppError::Validation("Quantity must be at least 1".to_string()));
    }
    if level.available < quantity {
        tracing::warn!(
            requested = quantity,
            available = level.available,
            "Rejected loan: insufficient stock"
        );
        return Err(AppError::InsufficientStock(format!(
            "Requested {} units but only {} available",
            quantity, level.available
        )));
    }
    let next = settle(StockLevel {
        available: level.available - quantity,
        ..level
    });
    check_invariant(&next)?;
    Ok(next)
}

fn ensure_lendable(level: &StockLevel) -> AppResult<()> {
    if level.status.is_lendable() {
        Ok(())
    } else {
        Err(AppError::BusinessRule(format!(
            "Toolkit is {} and cannot be lent",
            level.status
        )))
    }
}

fn settle(level: StockLevel) -> StockLevel {
    StockLevel {
        status: derive_status(&level),
        ..level
    }
}

fn check_invariant(level: &StockLevel) -> AppResult<()> {
    if level.available < 0 || level.available > level.quantity {
        return Err(AppError::Internal(format!(
            "Stock invariant violated: available {} of {}",
            level.available, level.quantity
        )));
    }
    Ok(())
}
