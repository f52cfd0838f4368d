//! User intents emitted by the rendering layer.

use kiosk_core::{CategoryId, ItemId, LineId, OrderId};
use serde::{Deserialize, Serialize};

/// A discrete user action.
///
/// Serialized with an `intent` tag so scripts read naturally:
///
/// ```yaml
/// - intent: start
/// - intent: select_category
///   category_id: 1
/// - intent: add_to_cart
///   item_id: 1
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "intent", rename_all = "snake_case")]
pub enum Intent {
    Start,
    SelectCategory { category_id: CategoryId },
    ViewCart,
    Back,
    AddToCart { item_id: ItemId },
    SetQuantity { line_id: LineId, quantity: i64 },
    RemoveLine { line_id: LineId },
    Increment { line_id: LineId },
    Decrement { line_id: LineId },
    ClearCart,
    PlaceOrder,
    Reorder { order_id: OrderId },
    /// Touch without a semantic action; only re-arms the inactivity timer.
    AnyActivity,
}

impl Intent {
    /// Name used in logs and errors.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::SelectCategory { .. } => "select_category",
            Self::ViewCart => "view_cart",
            Self::Back => "back",
            Self::AddToCart { .. } => "add_to_cart",
            Self::SetQuantity { .. } => "set_quantity",
            Self::RemoveLine { .. } => "remove_line",
            Self::Increment { .. } => "increment",
            Self::Decrement { .. } => "decrement",
            Self::ClearCart => "clear_cart",
            Self::PlaceOrder => "place_order",
            Self::Reorder { .. } => "reorder",
            Self::AnyActivity => "any_activity",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_script_parses() {
        let yaml = r"
- intent: start
- intent: select_category
  category_id: 1
- intent: add_to_cart
  item_id: 1
- intent: set_quantity
  line_id: 1
  quantity: -2
- intent: place_order
";
        let intents: Vec<Intent> = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            intents,
            [
                Intent::Start,
                Intent::SelectCategory {
                    category_id: CategoryId::new(1)
                },
                Intent::AddToCart {
                    item_id: ItemId::new(1)
                },
                Intent::SetQuantity {
                    line_id: LineId::new(1),
                    quantity: -2
                },
                Intent::PlaceOrder,
            ]
        );
    }

    #[test]
    fn test_json_tag() {
        let json = serde_json::to_string(&Intent::RemoveLine {
            line_id: LineId::new(3),
        })
        .unwrap();
        assert_eq!(json, r#"{"intent":"remove_line","line_id":3}"#);
    }
}
