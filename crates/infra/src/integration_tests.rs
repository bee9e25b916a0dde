//! End-to-end ledger scenarios, run against every `Ledger` implementation.
//!
//! Verifies:
//! - upsert is additive on quantity and last-write-wins on price
//! - a sale captures its total and decrements stock atomically
//! - failed sales leave products and sales untouched
//! - stock always equals what was added minus what was sold

#[cfg(test)]
mod tests {
    use shopkeeper_core::{Entity, ProductId};
    use shopkeeper_products::{Product, UpsertProduct};
    use shopkeeper_sales::{RecordSale, SaleEntry};

    use crate::config::LedgerConfig;
    use crate::ledger::{InMemoryLedger, Ledger, LedgerError, SqliteLedger};

    async fn sqlite() -> SqliteLedger {
        let ledger = SqliteLedger::connect(&LedgerConfig::in_memory()).await.unwrap();
        ledger.initialize().await.unwrap();
        ledger
    }

    async fn snapshot(ledger: &dyn Ledger) -> (Vec<Product>, Vec<SaleEntry>) {
        (
            ledger.list_products().await.unwrap(),
            ledger.list_sales().await.unwrap(),
        )
    }

    async fn widget_scenario(ledger: &dyn Ledger) {
        // Register.
        let created = ledger
            .upsert_product(UpsertProduct::new("Widget", 5.0, 10))
            .await
            .unwrap();
        assert!(created.is_created());
        let widget_id = created.product().id();

        let products = ledger.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity().get(), 10);
        assert_eq!(products[0].price().get(), 5.0);

        // Re-register: additive quantity, replaced price.
        let restocked = ledger
            .upsert_product(UpsertProduct::new("Widget", 6.0, 5))
            .await
            .unwrap();
        assert!(!restocked.is_created());
        let products = ledger.list_products().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].quantity().get(), 15);
        assert_eq!(products[0].price().get(), 6.0);

        // Sell.
        let sale = ledger.record_sale(RecordSale::new(widget_id, 4)).await.unwrap();
        assert_eq!(sale.total(), 24.0);
        let widget = ledger.get_product(widget_id).await.unwrap().unwrap();
        assert_eq!(widget.quantity().get(), 11);

        // Oversell: rejected, nothing changes.
        let before = snapshot(ledger).await;
        let err = ledger
            .record_sale(RecordSale::new(widget_id, 1000))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientStock { requested: 1000, available: 11, .. }));
        assert_eq!(snapshot(ledger).await, before);

        // Unknown product: rejected, nothing changes.
        let err = ledger
            .record_sale(RecordSale::new(ProductId::new(999), 1))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound { .. }));
        assert_eq!(snapshot(ledger).await, before);

        // A later price change leaves the captured total alone.
        ledger
            .upsert_product(UpsertProduct::new("Widget", 100.0, 0))
            .await
            .unwrap();
        let sales = ledger.list_sales().await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].product_name, "Widget");
        assert_eq!(sales[0].sale.id(), sale.id());
        assert_eq!(sales[0].sale.total(), 24.0);
    }

    async fn stock_is_added_minus_sold(ledger: &dyn Ledger) {
        let gadget = ledger
            .upsert_product(UpsertProduct::new("Gadget", 1.25, 20))
            .await
            .unwrap()
            .into_product();
        let gizmo = ledger
            .upsert_product(UpsertProduct::new("Gizmo", 3.0, 2))
            .await
            .unwrap()
            .into_product();

        let mut added = 20;
        let attempts = [(gadget.id(), 7), (gizmo.id(), 3), (gadget.id(), 14), (gizmo.id(), 2)];
        for (product_id, quantity) in attempts {
            let _ = ledger.record_sale(RecordSale::new(product_id, quantity)).await;
        }
        ledger
            .upsert_product(UpsertProduct::new("Gadget", 1.5, 10))
            .await
            .unwrap();
        added += 10;
        let _ = ledger.record_sale(RecordSale::new(gadget.id(), 14)).await;

        let sold: i64 = ledger
            .list_sales()
            .await
            .unwrap()
            .iter()
            .filter(|e| e.sale.product_id() == gadget.id())
            .map(|e| e.sale.quantity().get())
            .sum();
        let on_hand = ledger
            .get_product(gadget.id())
            .await
            .unwrap()
            .unwrap()
            .quantity()
            .get();

        assert_eq!(sold, 7 + 14);
        assert_eq!(on_hand, added - sold);

        let gizmo_after = ledger.get_product(gizmo.id()).await.unwrap().unwrap();
        assert!(gizmo_after.quantity().is_zero());
    }

    #[tokio::test]
    async fn widget_scenario_sqlite() {
        widget_scenario(&sqlite().await).await;
    }

    #[tokio::test]
    async fn widget_scenario_in_memory() {
        widget_scenario(&InMemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn stock_accounting_sqlite() {
        stock_is_added_minus_sold(&sqlite().await).await;
    }

    #[tokio::test]
    async fn stock_accounting_in_memory() {
        stock_is_added_minus_sold(&InMemoryLedger::new()).await;
    }

    #[tokio::test]
    async fn implementations_agree() {
        let sqlite = sqlite().await;
        let memory = InMemoryLedger::new();

        for ledger in [&sqlite as &dyn Ledger, &memory as &dyn Ledger] {
            ledger.upsert_product(UpsertProduct::new("A", 2.0, 3)).await.unwrap();
            ledger.upsert_product(UpsertProduct::new("B", 0.5, 8)).await.unwrap();
            ledger.upsert_product(UpsertProduct::new("A", 2.5, 1)).await.unwrap();
            ledger.record_sale(RecordSale::new(ProductId::new(2), 8)).await.unwrap();
            ledger.record_sale(RecordSale::new(ProductId::new(1), 2)).await.unwrap();
            let _ = ledger.record_sale(RecordSale::new(ProductId::new(1), 5)).await;
        }

        assert_eq!(snapshot(&sqlite).await, snapshot(&memory).await);
    }
}
