//! User-facing messages for failed cart commands.
//!
//! Commands return `CartError`; the presentation layer decides whether and how
//! to show it. [`Notice::for_failure`] is the default mapping: stock shortages
//! are warnings, everything else is an error with a per-operation message.

use std::fmt;

use crate::error::CartError;

/// The cart command that produced a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CartOperation {
    Add,
    Remove,
    Update,
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Warning,
    Error,
}

/// A human-readable message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: &'static str,
}

pub const STOCK_EXCEEDED: &str = "Requested quantity is out of stock";
pub const ADD_FAILED: &str = "Could not add the product to the cart";
pub const REMOVE_FAILED: &str = "Could not remove the product from the cart";
pub const UPDATE_FAILED: &str = "Could not change the product quantity";

impl Notice {
    /// Map a failed command to the message shown to the shopper.
    ///
    /// Collaborator details never leak into the message; log the error for
    /// diagnostics instead.
    #[must_use]
    pub const fn for_failure(operation: CartOperation, error: &CartError) -> Self {
        if matches!(error, CartError::StockExceeded { .. }) {
            return Self {
                level: NoticeLevel::Warning,
                message: STOCK_EXCEEDED,
            };
        }

        let message = match operation {
            CartOperation::Add => ADD_FAILED,
            CartOperation::Remove => REMOVE_FAILED,
            CartOperation::Update => UPDATE_FAILED,
        };

        Self {
            level: NoticeLevel::Error,
            message,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.level {
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "{prefix}: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use rocketshoes_core::ProductId;

    use super::*;
    use crate::collaborators::LookupError;

    fn stock_exceeded() -> CartError {
        CartError::StockExceeded {
            product_id: ProductId::new(1),
            requested: 2,
            available: 1,
        }
    }

    #[test]
    fn test_stock_exceeded_is_a_warning_for_every_operation() {
        for operation in [CartOperation::Add, CartOperation::Update] {
            let notice = Notice::for_failure(operation, &stock_exceeded());
            assert_eq!(notice.level, NoticeLevel::Warning);
            assert_eq!(notice.message, STOCK_EXCEEDED);
        }
    }

    #[test]
    fn test_messages_distinguish_operations() {
        let lookup = CartError::Lookup(LookupError::Unavailable("503".to_string()));

        assert_eq!(
            Notice::for_failure(CartOperation::Add, &lookup).message,
            ADD_FAILED
        );
        assert_eq!(
            Notice::for_failure(CartOperation::Update, &lookup).message,
            UPDATE_FAILED
        );
        assert_eq!(
            Notice::for_failure(CartOperation::Remove, &CartError::NotFound(ProductId::new(1))),
            Notice {
                level: NoticeLevel::Error,
                message: REMOVE_FAILED,
            }
        );
    }

    #[test]
    fn test_display() {
        let notice = Notice::for_failure(CartOperation::Add, &stock_exceeded());
        assert_eq!(
            notice.to_string(),
            "warning: Requested quantity is out of stock"
        );
    }
}
