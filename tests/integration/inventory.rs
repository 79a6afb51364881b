//! An `Inventory` service, its production implementation, a canned substitute
//! and the wrapper a code generator would emit for it.

use dynamock::{args, CallInterceptor, Contract, Member, MockContext};
use futures_util::future::{self, BoxFuture, FutureExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub type RestockListener = Arc<dyn Fn(&str, u32) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    OutOfStock { sku: String, available: u32 },
}

pub trait Inventory: Send + Sync {
    fn stock(&self, sku: &str) -> u32;
    fn reserve(&self, sku: &str, quantity: u32) -> Result<u32, InventoryError>;
    fn price(&self, sku: &str) -> BoxFuture<'static, u64>;
    fn audit(&self);
    fn region(&self) -> String;
    fn set_region(&self, region: String);
    fn on_restocked(&self, listener: RestockListener);
    fn off_restocked(&self);
}

impl Contract for dyn Inventory {
    const NAME: &'static str = "Inventory";

    const MEMBERS: &'static [Member] = &[
        Member::method("stock", 1),
        Member::method("reserve", 2),
        Member::method("price", 1),
        Member::method("audit", 0),
        Member::property("region"),
        Member::event("restocked"),
    ];
}

/// Production implementation backed by an in-memory table.
pub struct Warehouse {
    stock: Mutex<HashMap<String, u32>>,
    region: Mutex<String>,
    listeners: Mutex<Vec<RestockListener>>,
    pub audits: AtomicUsize,
}

impl Warehouse {
    pub fn new(stock: &[(&str, u32)]) -> Self {
        Self {
            stock: Mutex::new(stock.iter().map(|(k, v)| (k.to_string(), *v)).collect()),
            region: Mutex::new("eu-west".to_string()),
            listeners: Mutex::new(Vec::new()),
            audits: AtomicUsize::new(0),
        }
    }

    pub fn restock(&self, sku: &str, quantity: u32) {
        *self.stock.lock().unwrap().entry(sku.to_string()).or_default() += quantity;
        for listener in self.listeners.lock().unwrap().iter() {
            listener(sku, quantity);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap().len()
    }
}

impl Inventory for Warehouse {
    fn stock(&self, sku: &str) -> u32 {
        self.stock.lock().unwrap().get(sku).copied().unwrap_or(0)
    }

    fn reserve(&self, sku: &str, quantity: u32) -> Result<u32, InventoryError> {
        let mut stock = self.stock.lock().unwrap();
        let available = stock.get(sku).copied().unwrap_or(0);
        if available < quantity {
            return Err(InventoryError::OutOfStock {
                sku: sku.to_string(),
                available,
            });
        }
        stock.insert(sku.to_string(), available - quantity);
        Ok(available - quantity)
    }

    fn price(&self, sku: &str) -> BoxFuture<'static, u64> {
        let cents = sku.len() as u64 * 100;
        async move {
            tokio::task::yield_now().await;
            cents
        }
        .boxed()
    }

    fn audit(&self) {
        self.audits.fetch_add(1, Ordering::SeqCst);
    }

    fn region(&self) -> String {
        self.region.lock().unwrap().clone()
    }

    fn set_region(&self, region: String) {
        *self.region.lock().unwrap() = region;
    }

    fn on_restocked(&self, listener: RestockListener) {
        self.listeners.lock().unwrap().push(listener);
    }

    fn off_restocked(&self) {
        self.listeners.lock().unwrap().clear();
    }
}

/// Substitute answering every member with fixed values.
pub struct Canned {
    pub stock: u32,
    pub price: u64,
    pub audits: AtomicUsize,
    pub subscriptions: AtomicUsize,
    region: Mutex<String>,
}

impl Canned {
    pub fn new(stock: u32) -> Self {
        Self {
            stock,
            price: 1,
            audits: AtomicUsize::new(0),
            subscriptions: AtomicUsize::new(0),
            region: Mutex::new("mock-region".to_string()),
        }
    }

    pub fn priced(mut self, price: u64) -> Self {
        self.price = price;
        self
    }
}

impl Inventory for Canned {
    fn stock(&self, _sku: &str) -> u32 {
        self.stock
    }

    fn reserve(&self, sku: &str, _quantity: u32) -> Result<u32, InventoryError> {
        Err(InventoryError::OutOfStock {
            sku: sku.to_string(),
            available: self.stock,
        })
    }

    fn price(&self, _sku: &str) -> BoxFuture<'static, u64> {
        future::ready(self.price).boxed()
    }

    fn audit(&self) {
        self.audits.fetch_add(1, Ordering::SeqCst);
    }

    fn region(&self) -> String {
        self.region.lock().unwrap().clone()
    }

    fn set_region(&self, region: String) {
        *self.region.lock().unwrap() = region;
    }

    fn on_restocked(&self, _listener: RestockListener) {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
    }

    fn off_restocked(&self) {
        self.subscriptions.store(0, Ordering::SeqCst);
    }
}

/// What a wrapper generator emits for `Inventory`: every member forwards
/// through the interceptor.
pub struct InventoryProxy {
    pub interceptor: CallInterceptor<dyn Inventory>,
}

impl InventoryProxy {
    pub fn new(context: Arc<dyn MockContext<dyn Inventory>>, real: Arc<dyn Inventory>) -> Self {
        Self {
            interceptor: CallInterceptor::new(context, real),
        }
    }
}

impl Inventory for InventoryProxy {
    fn stock(&self, sku: &str) -> u32 {
        self.interceptor.intercept_method(
            "stock",
            args![sku.to_owned()],
            |m| m.stock(sku),
            |r| r.stock(sku),
        )
    }

    fn reserve(&self, sku: &str, quantity: u32) -> Result<u32, InventoryError> {
        self.interceptor.intercept_method(
            "reserve",
            args![sku.to_owned(), quantity],
            |m| m.reserve(sku, quantity),
            |r| r.reserve(sku, quantity),
        )
    }

    fn price(&self, sku: &str) -> BoxFuture<'static, u64> {
        self.interceptor.intercept_method(
            "price",
            args![sku.to_owned()],
            |m| m.price(sku),
            |r| r.price(sku),
        )
    }

    fn audit(&self) {
        self.interceptor
            .intercept_void_method("audit", args![], |m| m.audit(), |r| r.audit())
    }

    fn region(&self) -> String {
        self.interceptor
            .intercept_property_get("region", |m| m.region(), |r| r.region())
    }

    fn set_region(&self, region: String) {
        self.interceptor
            .intercept_property_set("region", region, |target, value| target.set_region(value))
    }

    fn on_restocked(&self, listener: RestockListener) {
        self.interceptor
            .intercept_event_add("restocked", |target| target.on_restocked(listener))
    }

    fn off_restocked(&self) {
        self.interceptor
            .intercept_event_remove("restocked", |target| target.off_restocked())
    }
}
