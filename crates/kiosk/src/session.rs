//! One kiosk terminal's session state and intent dispatch.
//!
//! A [`KioskSession`] owns the cart, the navigator and the inactivity
//! monitor. Each customer interaction runs from `welcome` to the next reset
//! (order placed or idle timeout); the order history outlives those resets.
//!
//! All entry points take the current time explicitly so the same code runs
//! under the real clock and under a paused test clock.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use kiosk_core::{CategoryId, ItemId, LineId, OrderId, Screen};
use tokio::time::Instant;
use tracing::{debug, error, info, instrument, warn};

use crate::cart::CartStore;
use crate::catalog::{Catalog, Category, MenuItem};
use crate::config::{KioskConfig, PricingConfig};
use crate::error::{KioskError, Result};
use crate::history::{OrderHistory, OrderReceipt};
use crate::inactivity::InactivityMonitor;
use crate::intent::Intent;
use crate::navigation::{NavEvent, Navigator};
use crate::view::{SelectedCategory, ViewModel};

/// What an accepted intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Navigation or cart state changed (or only the timer was re-armed).
    Updated,
    /// New cart lines were appended.
    Added(Vec<LineId>),
    /// The order was placed and the session returned to `welcome`.
    OrderPlaced(Box<OrderReceipt>),
}

/// Session state for one kiosk terminal.
#[derive(Debug, Clone)]
pub struct KioskSession {
    catalog: Arc<Catalog>,
    pricing: PricingConfig,
    add_debounce: Duration,
    navigator: Navigator,
    cart: CartStore,
    monitor: InactivityMonitor,
    history: OrderHistory,
    last_order: Option<OrderReceipt>,
    last_add: Option<(ItemId, Instant)>,
}

impl KioskSession {
    /// A fresh session on the welcome screen with an empty cart.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, config: &KioskConfig) -> Self {
        Self {
            catalog,
            pricing: config.pricing,
            add_debounce: config.add_debounce,
            navigator: Navigator::new(),
            cart: CartStore::new(),
            monitor: InactivityMonitor::new(config.inactivity_timeout),
            history: OrderHistory::default(),
            last_order: None,
            last_add: None,
        }
    }

    /// Handle one user intent.
    ///
    /// Every intent counts as activity and re-arms the inactivity timer,
    /// including ones that are rejected.
    ///
    /// # Errors
    ///
    /// Any [`KioskError`]. Rejections leave the session unchanged, except
    /// `InternalInconsistency`, which is reported after a full reset.
    #[instrument(skip(self, intent, now), fields(intent = intent.name()))]
    pub fn dispatch(&mut self, intent: Intent, now: Instant) -> Result<Outcome> {
        self.monitor.reset(now);
        self.ensure_consistent()?;

        let result = self.apply(intent, now);
        match &result {
            Ok(_) => debug!(
                screen = %self.navigator.screen(),
                lines = self.cart.len(),
                "Intent applied"
            ),
            Err(e) => warn!(
                screen = %self.navigator.screen(),
                error = %e,
                "Intent rejected"
            ),
        }
        result
    }

    /// Run the inactivity reset if the timer has expired at `now`.
    ///
    /// Returns whether the reset ran.
    pub fn poll_inactivity(&mut self, now: Instant) -> bool {
        if !self.monitor.is_expired(now) {
            return false;
        }
        self.inactivity_timeout();
        true
    }

    /// Reset to `welcome` with an empty cart and no selection.
    pub fn inactivity_timeout(&mut self) {
        let dropped_lines = self.cart.len();
        match self
            .navigator
            .apply(NavEvent::InactivityTimeout, self.cart.is_empty())
        {
            Ok(transition) => info!(
                from = %transition.from,
                dropped_lines,
                idle_secs = self.monitor.timeout().as_secs(),
                "Inactivity timeout, session reset"
            ),
            Err(e) => error!(error = %e, "Inactivity transition rejected, forcing reset"),
        }
        self.reset_session();
    }

    /// Cancel the pending timer. Call before dropping the session.
    pub fn shutdown(&mut self) {
        if self.monitor.cancel() {
            debug!("Cancelled pending inactivity timer");
        }
    }

    /// Snapshot for the rendering layer.
    #[must_use]
    pub fn view(&self) -> ViewModel {
        let totals = self.cart.totals(&self.pricing);
        ViewModel {
            screen: self.navigator.screen(),
            selected_category: self.selected_category().map(SelectedCategory::from),
            cart_lines: self.cart.lines().to_vec(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            delivery_fee: totals.delivery_fee,
            total: totals.total,
            item_count: totals.item_count,
            free_delivery_remaining: totals.free_delivery_remaining,
            currency: self.pricing.currency,
            last_order: self.last_order.clone(),
        }
    }

    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.navigator.screen()
    }

    /// The selected category, resolved against the catalog.
    #[must_use]
    pub fn selected_category(&self) -> Option<&Category> {
        self.navigator
            .selected_category()
            .and_then(|id| self.catalog.find_category(id))
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn history(&self) -> &OrderHistory {
        &self.history
    }

    #[must_use]
    pub const fn monitor(&self) -> &InactivityMonitor {
        &self.monitor
    }

    #[must_use]
    pub const fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    #[must_use]
    pub const fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    // =========================================================================
    // Intent handlers
    // =========================================================================

    fn apply(&mut self, intent: Intent, now: Instant) -> Result<Outcome> {
        match intent {
            Intent::Start => {
                let outcome = self.navigate(NavEvent::Start)?;
                self.last_order = None;
                Ok(outcome)
            }
            Intent::SelectCategory { category_id } => self.select_category(category_id),
            Intent::ViewCart => self.navigate(NavEvent::ViewCart),
            Intent::Back => self.navigate(NavEvent::Back),
            Intent::PlaceOrder => self.place_order(),
            Intent::AddToCart { item_id } => {
                self.require_started(intent)?;
                self.add_to_cart(item_id, now)
            }
            Intent::SetQuantity { line_id, quantity } => {
                self.require_started(intent)?;
                self.cart.set_quantity(line_id, quantity)?;
                Ok(Outcome::Updated)
            }
            Intent::RemoveLine { line_id } => {
                self.require_started(intent)?;
                self.cart.remove(line_id)?;
                Ok(Outcome::Updated)
            }
            Intent::Increment { line_id } => {
                self.require_started(intent)?;
                self.cart.increment(line_id)?;
                Ok(Outcome::Updated)
            }
            Intent::Decrement { line_id } => {
                self.require_started(intent)?;
                self.cart.decrement(line_id)?;
                Ok(Outcome::Updated)
            }
            Intent::ClearCart => {
                self.require_started(intent)?;
                self.cart.clear();
                Ok(Outcome::Updated)
            }
            Intent::Reorder { order_id } => {
                self.require_started(intent)?;
                self.reorder(order_id)
            }
            Intent::AnyActivity => Ok(Outcome::Updated),
        }
    }

    fn navigate(&mut self, event: NavEvent) -> Result<Outcome> {
        let transition = self.navigator.apply(event, self.cart.is_empty())?;
        if transition.clears_cart {
            self.cart.clear();
        }
        debug!(from = %transition.from, to = %transition.to, event = event.name(), "Navigated");
        Ok(Outcome::Updated)
    }

    fn select_category(&mut self, category_id: CategoryId) -> Result<Outcome> {
        if self.catalog.find_category(category_id).is_none() {
            return Err(KioskError::NotFound(format!("category {category_id}")));
        }
        self.navigate(NavEvent::SelectCategory(category_id))
    }

    fn add_to_cart(&mut self, item_id: ItemId, now: Instant) -> Result<Outcome> {
        let item = self.resolve_item(item_id)?;

        if !self.add_debounce.is_zero()
            && let Some((last_item, at)) = self.last_add
            && last_item == item_id
            && now.saturating_duration_since(at) < self.add_debounce
        {
            return Err(KioskError::InvalidArgument(format!(
                "repeated tap on item {item_id} ignored"
            )));
        }

        let line_id = self.cart.add(item);
        self.last_add = Some((item_id, now));
        Ok(Outcome::Added(vec![line_id]))
    }

    /// Prefer the selected category, then any category.
    fn resolve_item(&self, item_id: ItemId) -> Result<MenuItem> {
        self.navigator
            .selected_category()
            .and_then(|category_id| self.catalog.find_item(category_id, item_id))
            .or_else(|| self.catalog.find_item_anywhere(item_id))
            .cloned()
            .ok_or_else(|| KioskError::NotFound(format!("menu item {item_id}")))
    }

    fn place_order(&mut self) -> Result<Outcome> {
        let transition = self
            .navigator
            .apply(NavEvent::PlaceOrder, self.cart.is_empty())?;

        let totals = self.cart.totals(&self.pricing);
        let lines = self.cart.lines().to_vec();
        self.cart.clear();
        let receipt = self
            .history
            .record(lines, totals, self.pricing.currency, Utc::now());

        self.monitor.cancel();
        self.last_add = None;
        self.last_order = Some(receipt.clone());

        info!(
            order_id = %receipt.order_id,
            total = %receipt.total(),
            items = totals.item_count,
            to = %transition.to,
            "Order placed"
        );
        Ok(Outcome::OrderPlaced(Box::new(receipt)))
    }

    fn reorder(&mut self, order_id: OrderId) -> Result<Outcome> {
        let order = self
            .history
            .get(order_id)
            .ok_or_else(|| KioskError::NotFound(format!("order {order_id}")))?;

        let items: Vec<(MenuItem, u32)> = order
            .lines
            .iter()
            .filter_map(|line| {
                self.catalog
                    .find_item_anywhere(line.item.id)
                    .map(|item| (item.clone(), line.quantity))
            })
            .collect();
        if items.is_empty() {
            return Err(KioskError::NotFound(format!(
                "no items of order {order_id} are on the menu"
            )));
        }

        let line_ids = items
            .into_iter()
            .map(|(item, quantity)| self.cart.add_with_quantity(item, quantity))
            .collect();
        Ok(Outcome::Added(line_ids))
    }

    fn require_started(&self, intent: Intent) -> Result<()> {
        if self.navigator.screen() == Screen::Welcome {
            return Err(KioskError::InvalidTransition {
                screen: Screen::Welcome,
                intent: intent.name(),
            });
        }
        Ok(())
    }

    /// Verify navigation invariants, resetting the session if they fail.
    fn ensure_consistent(&mut self) -> Result<()> {
        let check = self.navigator.check().and_then(|()| {
            match self.navigator.selected_category() {
                Some(id) if self.catalog.find_category(id).is_none() => {
                    Err(KioskError::InternalInconsistency(format!(
                        "selected category {id} is not in the catalog"
                    )))
                }
                _ => Ok(()),
            }
        });

        if let Err(e) = check {
            error!(error = %e, "Navigation invariant violated, resetting session");
            self.reset_session();
            return Err(e);
        }
        Ok(())
    }

    fn reset_session(&mut self) {
        self.navigator.reset();
        self.cart.clear();
        self.monitor.cancel();
        self.last_add = None;
        self.last_order = None;
    }

    #[cfg(test)]
    pub(crate) fn force_navigator(&mut self, navigator: Navigator) {
        self.navigator = navigator;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    const MAINS: CategoryId = CategoryId::new(1);
    const SIDES: CategoryId = CategoryId::new(2);
    const BURGER: ItemId = ItemId::new(1);
    const FRIES: ItemId = ItemId::new(5);

    fn session() -> KioskSession {
        KioskSession::new(Arc::new(Catalog::builtin()), &KioskConfig::default())
    }

    fn session_with(config: &KioskConfig) -> KioskSession {
        KioskSession::new(Arc::new(Catalog::builtin()), config)
    }

    fn run(session: &mut KioskSession, intents: &[Intent]) {
        let now = Instant::now();
        for intent in intents {
            session.dispatch(*intent, now).unwrap();
        }
    }

    fn in_mains(session: &mut KioskSession) {
        run(
            session,
            &[
                Intent::Start,
                Intent::SelectCategory {
                    category_id: MAINS,
                },
            ],
        );
    }

    fn added_line(outcome: Outcome) -> LineId {
        match outcome {
            Outcome::Added(ids) => ids[0],
            other => panic!("expected Added, got {other:?}"),
        }
    }

    #[test]
    fn test_mains_scenario() {
        let mut session = session();
        assert_eq!(session.screen(), Screen::Welcome);

        session.dispatch(Intent::Start, Instant::now()).unwrap();
        assert_eq!(session.screen(), Screen::CategoryList);

        session
            .dispatch(Intent::SelectCategory { category_id: MAINS }, Instant::now())
            .unwrap();
        let view = session.view();
        assert_eq!(view.screen, Screen::ItemList);
        assert_eq!(view.selected_category.unwrap().name, "Mains");

        run(
            &mut session,
            &[
                Intent::AddToCart { item_id: BURGER },
                Intent::AddToCart { item_id: BURGER },
            ],
        );
        let view = session.view();
        assert_eq!(view.cart_lines.len(), 2);
        assert_eq!(view.item_count, 2);

        session.dispatch(Intent::ViewCart, Instant::now()).unwrap();
        let view = session.view();
        assert_eq!(view.screen, Screen::Cart);
        assert_eq!(view.subtotal, Decimal::new(2580, 2));
        assert_eq!(view.total, view.subtotal + view.tax + view.delivery_fee);
    }

    #[test]
    fn test_select_unknown_category() {
        let mut session = session();
        run(&mut session, &[Intent::Start]);
        let err = session
            .dispatch(
                Intent::SelectCategory {
                    category_id: CategoryId::new(99),
                },
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
        assert_eq!(session.screen(), Screen::CategoryList);
    }

    #[test]
    fn test_add_unknown_item_is_noop() {
        let mut session = session();
        in_mains(&mut session);
        let err = session
            .dispatch(
                Intent::AddToCart {
                    item_id: ItemId::new(404),
                },
                Instant::now(),
            )
            .unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_add_resolves_outside_selected_category() {
        let mut session = session();
        in_mains(&mut session);
        session
            .dispatch(Intent::AddToCart { item_id: FRIES }, Instant::now())
            .unwrap();
        assert_eq!(session.cart().lines()[0].item.name, "Crispy Fries");
    }

    #[test]
    fn test_cart_intents_rejected_on_welcome() {
        let mut session = session();
        for intent in [
            Intent::AddToCart { item_id: BURGER },
            Intent::ClearCart,
            Intent::RemoveLine {
                line_id: LineId::new(1),
            },
        ] {
            let err = session.dispatch(intent, Instant::now()).unwrap_err();
            assert!(matches!(err, KioskError::InvalidTransition { .. }));
        }
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_quantity_edits() {
        let mut session = session();
        in_mains(&mut session);
        let now = Instant::now();
        let line = added_line(
            session
                .dispatch(Intent::AddToCart { item_id: BURGER }, now)
                .unwrap(),
        );

        session
            .dispatch(Intent::SetQuantity { line_id: line, quantity: 3 }, now)
            .unwrap();
        assert_eq!(session.view().item_count, 3);

        let err = session
            .dispatch(Intent::SetQuantity { line_id: line, quantity: -1 }, now)
            .unwrap_err();
        assert!(matches!(err, KioskError::InvalidArgument(_)));
        assert_eq!(session.view().item_count, 3);

        session.dispatch(Intent::Increment { line_id: line }, now).unwrap();
        session.dispatch(Intent::Decrement { line_id: line }, now).unwrap();
        assert_eq!(session.view().item_count, 3);

        session
            .dispatch(Intent::SetQuantity { line_id: line, quantity: 0 }, now)
            .unwrap();
        assert!(session.view().cart_lines.is_empty());

        let err = session
            .dispatch(Intent::RemoveLine { line_id: line }, now)
            .unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
    }

    #[test]
    fn test_oversized_quantity_keeps_session_usable() {
        let mut session = session();
        in_mains(&mut session);
        let now = Instant::now();
        let line = added_line(
            session
                .dispatch(Intent::AddToCart { item_id: BURGER }, now)
                .unwrap(),
        );
        let before = session.view();

        let err = session
            .dispatch(
                Intent::SetQuantity {
                    line_id: line,
                    quantity: 4_000_000_000,
                },
                now,
            )
            .unwrap_err();
        assert!(matches!(err, KioskError::InvalidArgument(_)));
        assert_eq!(session.view(), before);
        assert_eq!(session.view().subtotal, Decimal::new(1290, 2));
    }

    #[test]
    fn test_place_order_on_empty_cart_keeps_screen() {
        let mut session = session();
        run(&mut session, &[Intent::Start, Intent::ViewCart]);

        let err = session
            .dispatch(Intent::PlaceOrder, Instant::now())
            .unwrap_err();
        assert!(matches!(err, KioskError::InvalidArgument(_)));
        assert_eq!(session.screen(), Screen::Cart);
        assert!(session.history().is_empty());
    }

    #[test]
    fn test_place_order_resets_and_records_receipt() {
        let mut session = session();
        in_mains(&mut session);
        run(
            &mut session,
            &[Intent::AddToCart { item_id: BURGER }, Intent::ViewCart],
        );

        let outcome = session.dispatch(Intent::PlaceOrder, Instant::now()).unwrap();
        let Outcome::OrderPlaced(receipt) = outcome else {
            panic!("expected OrderPlaced");
        };
        assert_eq!(receipt.order_id, OrderId::new(1));
        assert_eq!(receipt.lines.len(), 1);

        let view = session.view();
        assert_eq!(view.screen, Screen::Welcome);
        assert!(view.cart_lines.is_empty());
        assert!(view.selected_category.is_none());
        assert_eq!(view.last_order.as_ref().map(|r| r.order_id), Some(OrderId::new(1)));
        assert!(!session.monitor().is_armed());

        // the receipt is dropped once the next customer starts
        session.dispatch(Intent::Start, Instant::now()).unwrap();
        assert!(session.view().last_order.is_none());
        assert_eq!(session.history().len(), 1);
    }

    #[test]
    fn test_back_from_cart_without_category() {
        let mut session = session();
        run(&mut session, &[Intent::Start, Intent::ViewCart, Intent::Back]);
        assert_eq!(session.screen(), Screen::CategoryList);
    }

    #[test]
    fn test_back_from_cart_with_category() {
        let mut session = session();
        in_mains(&mut session);
        run(&mut session, &[Intent::ViewCart, Intent::Back]);
        assert_eq!(session.screen(), Screen::ItemList);
        assert_eq!(session.selected_category().unwrap().id, MAINS);
    }

    #[test]
    fn test_inactivity_timeout_from_any_screen() {
        let paths: [&[Intent]; 4] = [
            &[],
            &[Intent::Start],
            &[
                Intent::Start,
                Intent::SelectCategory { category_id: SIDES },
                Intent::AddToCart { item_id: FRIES },
            ],
            &[
                Intent::Start,
                Intent::SelectCategory { category_id: SIDES },
                Intent::AddToCart { item_id: FRIES },
                Intent::ViewCart,
            ],
        ];

        for path in paths {
            let mut session = session();
            run(&mut session, path);
            session.inactivity_timeout();

            let view = session.view();
            assert_eq!(view.screen, Screen::Welcome);
            assert!(view.cart_lines.is_empty());
            assert!(view.selected_category.is_none());
            assert!(!session.monitor().is_armed());
        }
    }

    #[test]
    fn test_poll_inactivity_respects_deadline() {
        let mut session = session();
        let start = Instant::now();
        session.dispatch(Intent::Start, start).unwrap();
        session
            .dispatch(Intent::SelectCategory { category_id: MAINS }, start)
            .unwrap();

        assert!(!session.poll_inactivity(start + Duration::from_secs(119)));
        assert_eq!(session.screen(), Screen::ItemList);

        // activity pushes the deadline out
        session
            .dispatch(Intent::AnyActivity, start + Duration::from_secs(100))
            .unwrap();
        assert!(!session.poll_inactivity(start + Duration::from_secs(200)));
        assert!(session.poll_inactivity(start + Duration::from_secs(220)));
        assert_eq!(session.screen(), Screen::Welcome);

        // disarmed after the reset
        assert!(!session.poll_inactivity(start + Duration::from_secs(1000)));
    }

    #[test]
    fn test_rejected_intent_still_counts_as_activity() {
        let mut session = session();
        let start = Instant::now();
        session.dispatch(Intent::Start, start).unwrap();
        let later = start + Duration::from_secs(90);
        assert!(session.dispatch(Intent::PlaceOrder, later).is_err());
        assert_eq!(
            session.monitor().deadline(),
            Some(later + Duration::from_secs(120))
        );
    }

    #[test]
    fn test_inconsistent_navigation_resets() {
        let mut session = session();
        in_mains(&mut session);
        run(&mut session, &[Intent::AddToCart { item_id: BURGER }]);
        session.force_navigator(Navigator::from_parts(Screen::ItemList, None));

        let err = session
            .dispatch(Intent::ViewCart, Instant::now())
            .unwrap_err();
        assert!(matches!(err, KioskError::InternalInconsistency(_)));
        assert_eq!(session.screen(), Screen::Welcome);
        assert!(session.cart().is_empty());
    }

    #[test]
    fn test_debounce_ignores_rapid_repeat() {
        let config = KioskConfig {
            add_debounce: Duration::from_secs(1),
            ..KioskConfig::default()
        };
        let mut session = session_with(&config);
        in_mains(&mut session);

        let start = Instant::now();
        session
            .dispatch(Intent::AddToCart { item_id: BURGER }, start)
            .unwrap();
        let err = session
            .dispatch(
                Intent::AddToCart { item_id: BURGER },
                start + Duration::from_millis(500),
            )
            .unwrap_err();
        assert!(matches!(err, KioskError::InvalidArgument(_)));

        // a different item is not debounced
        session
            .dispatch(
                Intent::AddToCart { item_id: ItemId::new(2) },
                start + Duration::from_millis(600),
            )
            .unwrap();
        session
            .dispatch(
                Intent::AddToCart { item_id: BURGER },
                start + Duration::from_millis(1700),
            )
            .unwrap();
        assert_eq!(session.cart().len(), 3);
    }

    #[test]
    fn test_reorder_copies_quantities() {
        let mut session = session();
        in_mains(&mut session);
        let now = Instant::now();
        let line = added_line(
            session
                .dispatch(Intent::AddToCart { item_id: BURGER }, now)
                .unwrap(),
        );
        session
            .dispatch(Intent::SetQuantity { line_id: line, quantity: 2 }, now)
            .unwrap();
        run(
            &mut session,
            &[
                Intent::AddToCart { item_id: FRIES },
                Intent::ViewCart,
                Intent::PlaceOrder,
                Intent::Start,
            ],
        );

        let outcome = session
            .dispatch(Intent::Reorder { order_id: OrderId::new(1) }, now)
            .unwrap();
        assert!(matches!(outcome, Outcome::Added(ref ids) if ids.len() == 2));
        assert_eq!(session.view().item_count, 3);

        let err = session
            .dispatch(Intent::Reorder { order_id: OrderId::new(9) }, now)
            .unwrap_err();
        assert!(matches!(err, KioskError::NotFound(_)));
    }

    #[test]
    fn test_view_formats_in_configured_currency() {
        let mut config = KioskConfig::default();
        config.pricing.currency = kiosk_core::CurrencyCode::MYR;
        let mut session = session_with(&config);
        in_mains(&mut session);
        run(&mut session, &[Intent::AddToCart { item_id: BURGER }]);

        let view = session.view();
        assert_eq!(view.price(view.subtotal).display(), "RM12.90");
        assert_eq!(view.free_delivery_remaining, Some(Decimal::new(1210, 2)));
    }
}
