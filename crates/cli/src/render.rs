//! Plain-text rendering of menus and kiosk screens.
//!
//! Everything renders into a `String` so it can be tested; callers decide
//! where it is printed.

use std::fmt::Write;

use kiosk::{Catalog, MenuItem, OrderReceipt, ViewModel};
use kiosk_core::{CurrencyCode, Price, Screen};

const RULE: &str = "----------------------------------------";

/// The full menu, grouped by category.
pub fn menu(catalog: &Catalog, currency: CurrencyCode) -> String {
    let mut out = String::new();
    for category in catalog.categories() {
        let _ = writeln!(out, "{} {} [{}]", category.icon, category.name, category.id);
        for item in &category.items {
            item_row(&mut out, item, currency);
        }
        out.push('\n');
    }
    out
}

/// Items matched by a menu search.
pub fn search_results(query: &str, hits: &[&MenuItem], currency: CurrencyCode) -> String {
    let mut out = String::new();
    if hits.is_empty() {
        let _ = writeln!(out, "No items match \"{query}\"");
        return out;
    }
    let _ = writeln!(out, "{} item(s) match \"{query}\"", hits.len());
    for item in hits {
        item_row(&mut out, item, currency);
    }
    out
}

/// The current kiosk screen.
pub fn view(view: &ViewModel, catalog: &Catalog) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");

    match view.screen {
        Screen::Welcome => {
            if let Some(receipt) = &view.last_order {
                out.push_str(&self::receipt(receipt));
            }
            let _ = writeln!(out, "Welcome! Type `start` to order.");
        }
        Screen::CategoryList => {
            let _ = writeln!(out, "Choose a category:");
            for category in catalog.categories() {
                let _ = writeln!(out, "  [{}] {} {}", category.id, category.icon, category.name);
            }
        }
        Screen::ItemList => {
            if let Some(selected) = &view.selected_category {
                let _ = writeln!(out, "{} {}", selected.icon, selected.name);
                if let Some(category) = catalog.find_category(selected.id) {
                    for item in &category.items {
                        item_row(&mut out, item, view.currency);
                    }
                }
            }
        }
        Screen::Cart => cart(&mut out, view),
    }

    if view.screen != Screen::Welcome {
        let _ = writeln!(
            out,
            "Cart: {} line(s), total {}",
            view.line_count(),
            view.price(view.total)
        );
    }
    out
}

/// A placed order.
pub fn receipt(receipt: &OrderReceipt) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Order #{} placed at {}",
        receipt.order_id,
        receipt.placed_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    for line in &receipt.lines {
        let _ = writeln!(
            out,
            "  {} x{}  {}",
            line.item.name,
            line.quantity,
            Price::new(line.line_total(), receipt.currency)
        );
    }
    let _ = writeln!(out, "  Total {}", receipt.total());
    out
}

/// Every receipt in `orders`, in the order given.
pub fn order_history(orders: &[OrderReceipt]) -> String {
    if orders.is_empty() {
        return "No orders yet.\n".to_string();
    }
    orders.iter().map(receipt).collect::<Vec<_>>().join("\n")
}

fn cart(out: &mut String, view: &ViewModel) {
    if view.cart_lines.is_empty() {
        let _ = writeln!(out, "Your cart is empty.");
        return;
    }

    let _ = writeln!(out, "Your order:");
    for line in &view.cart_lines {
        let _ = writeln!(
            out,
            "  #{} {} {} x{}  {}",
            line.line_id,
            line.item.image,
            line.item.name,
            line.quantity,
            view.price(line.line_total())
        );
    }
    let _ = writeln!(out, "  Subtotal  {}", view.price(view.subtotal));
    let _ = writeln!(out, "  Tax       {}", view.price(view.tax));
    let _ = writeln!(out, "  Delivery  {}", view.price(view.delivery_fee));
    let _ = writeln!(out, "  Total     {}", view.price(view.total));
    if let Some(remaining) = view.free_delivery_remaining {
        let _ = writeln!(
            out,
            "  Add {} more for free delivery",
            view.price(remaining)
        );
    }
}

fn item_row(out: &mut String, item: &MenuItem, currency: CurrencyCode) {
    let _ = writeln!(
        out,
        "  [{}] {} {}  {}",
        item.id,
        item.image,
        item.name,
        Price::new(item.price, currency)
    );
}
