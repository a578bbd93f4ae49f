//! Cart commands.
//!
//! Each command runs against a `CartStore` and yields the resulting cart, or
//! the shopper-facing notice for a failure. Failure details go to the log.

use std::fmt::Write as _;
use std::io;

use rocketshoes_cart::{
    CartError, CartOperation, CartStore, Notice, Outcome, PersistentStore, ProductCatalog,
    StockService,
};
use rocketshoes_core::{Cart, CurrencyCode, Price, ProductId};
use tracing::{error, info, warn};

/// A cart command requested on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Show,
    Add(ProductId),
    Remove(ProductId),
    Update(ProductId, i64),
}

impl CartCommand {
    const fn operation(self) -> Option<CartOperation> {
        match self {
            Self::Show => None,
            Self::Add(_) => Some(CartOperation::Add),
            Self::Remove(_) => Some(CartOperation::Remove),
            Self::Update(..) => Some(CartOperation::Update),
        }
    }
}

/// Run `command` and return the cart to display.
///
/// # Errors
///
/// Returns the `Notice` to show the shopper if the command failed.
pub async fn execute<S, C, P>(
    store: &CartStore<S, C, P>,
    command: CartCommand,
) -> Result<Cart, Notice>
where
    S: StockService,
    C: ProductCatalog,
    P: PersistentStore,
{
    let result = match command {
        CartCommand::Show => return Ok(store.cart()),
        CartCommand::Add(product_id) => store.add_product(product_id).await,
        CartCommand::Remove(product_id) => store.remove_product(product_id).await,
        CartCommand::Update(product_id, amount) => {
            store.update_product_amount(product_id, amount).await
        }
    };

    match result {
        Ok(Outcome::Committed(cart)) => Ok(cart),
        Ok(Outcome::Ignored(reason)) => {
            info!(?reason, "Cart unchanged");
            Ok(store.cart())
        }
        Err(e) => {
            report(&e);
            let operation = command.operation().unwrap_or(CartOperation::Update);
            Err(Notice::for_failure(operation, &e))
        }
    }
}

/// Show `notice` to the shopper, one line per notice.
///
/// # Errors
///
/// Returns the I/O error if `out` cannot be written.
pub fn write_notice(out: &mut impl io::Write, notice: &Notice) -> io::Result<()> {
    writeln!(out, "{notice}")
}

fn report(e: &CartError) {
    if e.is_collaborator_failure() {
        error!(error = %e, "Cart command failed");
    } else {
        warn!(error = %e, "Cart command rejected");
    }
}

/// Render the cart as a plain-text table with totals.
#[must_use]
pub fn render(cart: &Cart, currency_code: CurrencyCode) -> String {
    if cart.is_empty() {
        return "Cart is empty".to_string();
    }

    let mut out = String::new();
    for product in cart {
        let _ = writeln!(
            out,
            "{:>5}  {:<40}  x{:<3}  {:>12}  {:>12}",
            product.id,
            product.title,
            product.amount,
            Price::new(product.price, currency_code).to_string(),
            Price::new(product.line_total(), currency_code).to_string(),
        );
    }
    let _ = write!(
        out,
        "Items: {}  Subtotal: {}",
        cart.item_count(),
        cart.subtotal(currency_code)
    );
    out
}
