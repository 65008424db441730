//! Minecart filter matching.
//!
//! Filters are item stacks. Most cart types match a filter when it names
//! their own item; carts with contents (tank carts) may also look at what
//! the cart is carrying.

/// Decides whether a cart matches an item filter.
///
/// `Stack` and `Cart` are the host's item stack and cart entity types.
pub trait CartFilter {
    type Stack;
    type Cart;

    fn does_cart_match_filter(&self, filter: &Self::Stack, cart: &Self::Cart) -> bool;
}
