//! # Order Book Engine
//!
//! Listing, buying, modifying, cancelling and expiring orders. Every
//! operation validates first and mutates second, so a failed request
//! leaves both the book and the caller's account untouched.
//!
//! ## The asymmetric modification rule
//!
//! A sell order's quantity may only decrease — growing it would let a
//! seller add stock that was never escrowed. A buy order's quantity may
//! only increase, and the delta credits are escrowed at modification
//! time. Price moves freely within the configured band on either side.

use std::collections::HashMap;

use serde::Deserialize;

use blackice_shared::{ItemType, OrderId, PlayerId, ResourceKind, SimTime};

use crate::account::Account;
use crate::error::{MarketError, MarketResult};
use crate::order::{Good, MarketOrder, OrderType, OwnOrder, PublicOrder, Seller};

/// Market balance configuration.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    /// Flat fee for every listing and every modification, credits.
    pub listing_fee: u64,
    /// Transaction fee burned on sales, basis points of the total.
    pub transaction_fee_bps: u32,
    /// Lowest accepted unit price.
    pub min_price: u64,
    /// Highest accepted unit price.
    pub max_price: u64,
    /// Maximum concurrent open orders per player.
    pub max_active_orders: usize,
    /// Cooldown between modifications of one order, ms.
    pub modify_cooldown_ms: u64,
    /// Order lifetime until the expiry sweep collects it, ms.
    pub order_lifetime_ms: u64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        use blackice_shared::constants as c;
        Self {
            listing_fee: c::MARKET_LISTING_FEE,
            transaction_fee_bps: c::MARKET_TRANSACTION_FEE_BPS,
            min_price: c::MARKET_MIN_PRICE,
            max_price: c::MARKET_MAX_PRICE,
            max_active_orders: c::MARKET_MAX_ACTIVE_ORDERS,
            modify_cooldown_ms: c::MARKET_MODIFY_COOLDOWN_MS,
            order_lifetime_ms: c::MARKET_ORDER_LIFETIME_MS,
        }
    }
}

/// Receipt for a successful listing.
#[derive(Clone, Debug)]
pub struct ListReceipt {
    /// The new order's id.
    pub order_id: OrderId,
    /// Fee charged.
    pub fee: u64,
}

/// Receipt for a successful purchase.
#[derive(Clone, Debug)]
pub struct TradeReceipt {
    /// The purchased order's id.
    pub order_id: OrderId,
    /// The good delivered to the buyer.
    pub good: Good,
    /// Quantity delivered.
    pub quantity: u32,
    /// Credits the buyer paid.
    pub paid: u64,
    /// Payout owed to a player seller, if the seller was a player.
    /// Vendor payouts are burned.
    pub seller_payout: Option<(PlayerId, u64)>,
}

/// Receipt for a successful modification.
#[derive(Clone, Debug)]
pub struct ModifyReceipt {
    /// Quantity after the change.
    pub new_amount: u32,
    /// Unit price after the change.
    pub new_price: u64,
    /// Fee charged for the modification.
    pub fee: u64,
}

/// Receipt for a successful cancellation.
#[derive(Clone, Debug)]
pub struct CancelReceipt {
    /// The escrow that was returned.
    pub returned: ReturnedEscrow,
}

/// Escrow returned to an originator on cancel or expiry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReturnedEscrow {
    /// Goods went back on hand.
    Goods {
        /// The good returned.
        good: Good,
        /// Quantity returned.
        quantity: u32,
    },
    /// Escrowed credits went back on hand.
    Credits {
        /// Amount returned.
        amount: u64,
    },
}

/// An order removed by the expiry sweep, with its escrow still owed.
#[derive(Clone, Debug)]
pub struct ExpiredOrder {
    /// The removed order.
    pub order: MarketOrder,
}

/// The anonymized order book.
pub struct MarketEngine {
    config: MarketConfig,
    orders: HashMap<OrderId, MarketOrder>,
    next_id: OrderId,
}

impl MarketEngine {
    /// Creates an empty book.
    #[must_use]
    pub fn new(config: MarketConfig) -> Self {
        Self {
            config,
            orders: HashMap::new(),
            next_id: 1,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MarketConfig {
        &self.config
    }

    /// Looks up an order.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&MarketOrder> {
        self.orders.get(&id)
    }

    /// Number of open orders.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of open orders owned by a player.
    #[must_use]
    pub fn player_order_count(&self, player: PlayerId) -> usize {
        self.orders
            .values()
            .filter(|o| o.seller == Seller::Player(player))
            .count()
    }

    /// Number of open NPC sell orders for a good.
    #[must_use]
    pub fn npc_order_count(&self, good: Good) -> usize {
        self.orders
            .values()
            .filter(|o| o.is_npc && o.good == good && o.order_type == OrderType::Sell)
            .count()
    }

    fn check_price(&self, unit_price: u64) -> MarketResult<()> {
        if unit_price < self.config.min_price || unit_price > self.config.max_price {
            return Err(MarketError::PriceOutOfBand {
                min: self.config.min_price,
                max: self.config.max_price,
            });
        }
        Ok(())
    }

    fn allocate_id(&mut self) -> OrderId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Lists a player sell order for a resource.
    ///
    /// The quantity is escrowed from the account immediately and the
    /// flat listing fee is charged.
    ///
    /// # Errors
    ///
    /// Validation errors (amount, price band), precondition errors
    /// (order cap, insufficient resources or credits for the fee).
    pub fn list_sell(
        &mut self,
        seller: PlayerId,
        account: &mut Account,
        kind: ResourceKind,
        amount: u32,
        unit_price: u64,
        now: SimTime,
    ) -> MarketResult<ListReceipt> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        self.check_price(unit_price)?;
        if self.player_order_count(seller) >= self.config.max_active_orders {
            return Err(MarketError::TooManyOrders {
                max: self.config.max_active_orders,
            });
        }
        // Validate both debits before touching either balance.
        account.ensure_credits(self.config.listing_fee)?;
        account.take_resource(kind, amount)?;
        account
            .charge(self.config.listing_fee)
            .expect("checked above");

        let id = self.allocate_id();
        self.orders.insert(
            id,
            MarketOrder {
                id,
                seller: Seller::Player(seller),
                is_npc: false,
                good: Good::Resource(kind),
                quantity: amount,
                unit_price,
                order_type: OrderType::Sell,
                created_at: now,
                last_modified: now,
                expires_at: now + self.config.order_lifetime_ms,
            },
        );
        Ok(ListReceipt {
            order_id: id,
            fee: self.config.listing_fee,
        })
    }

    /// Places a buy order, escrowing `quantity × unit_price` credits.
    ///
    /// Latent feature: present in the data model and modification rules,
    /// but no message handler creates one.
    ///
    /// # Errors
    ///
    /// Same validation and precondition errors as [`Self::list_sell`].
    pub fn place_buy(
        &mut self,
        buyer: PlayerId,
        account: &mut Account,
        good: Good,
        amount: u32,
        unit_price: u64,
        now: SimTime,
    ) -> MarketResult<ListReceipt> {
        if amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        self.check_price(unit_price)?;
        if self.player_order_count(buyer) >= self.config.max_active_orders {
            return Err(MarketError::TooManyOrders {
                max: self.config.max_active_orders,
            });
        }
        let escrow = u64::from(amount) * unit_price;
        account.charge(escrow + self.config.listing_fee)?;

        let id = self.allocate_id();
        self.orders.insert(
            id,
            MarketOrder {
                id,
                seller: Seller::Player(buyer),
                is_npc: false,
                good,
                quantity: amount,
                unit_price,
                order_type: OrderType::Buy,
                created_at: now,
                last_modified: now,
                expires_at: now + self.config.order_lifetime_ms,
            },
        );
        Ok(ListReceipt {
            order_id: id,
            fee: self.config.listing_fee,
        })
    }

    /// Inserts a pre-built NPC sell order. Used by seeding and restock.
    pub fn insert_npc_order(
        &mut self,
        vendor_code: &'static str,
        good: Good,
        quantity: u32,
        unit_price: u64,
        now: SimTime,
    ) -> OrderId {
        let id = self.allocate_id();
        self.orders.insert(
            id,
            MarketOrder {
                id,
                seller: Seller::Vendor(vendor_code),
                is_npc: true,
                good,
                quantity,
                unit_price,
                order_type: OrderType::Sell,
                created_at: now,
                last_modified: now,
                expires_at: now + self.config.order_lifetime_ms,
            },
        );
        id
    }

    /// Buys an order atomically and in full.
    ///
    /// Credits move buyer → seller minus the burned transaction fee, the
    /// goods transfer to the buyer, and the order is deleted. There are
    /// no partial fills.
    ///
    /// # Errors
    ///
    /// [`MarketError::OrderNotFound`], [`MarketError::SelfTrade`], or
    /// [`MarketError::InsufficientCredits`].
    pub fn buy(
        &mut self,
        buyer: PlayerId,
        buyer_account: &mut Account,
        order_id: OrderId,
    ) -> MarketResult<TradeReceipt> {
        let order = self.orders.get(&order_id).ok_or(MarketError::OrderNotFound)?;
        if order.seller == Seller::Player(buyer) {
            return Err(MarketError::SelfTrade);
        }
        let total = order.total();
        buyer_account.charge(total)?;

        // Past the last fallible step: commit.
        let order = self.orders.remove(&order_id).expect("looked up above");
        match order.good {
            Good::Resource(kind) => buyer_account.give_resource(kind, order.quantity),
            Good::Computer(id) | Good::Module(id) => {
                buyer_account.give_gear(id, order.quantity);
            }
        }

        let fee = total * u64::from(self.config.transaction_fee_bps) / 10_000;
        let payout = total - fee;
        let seller_payout = match order.seller {
            Seller::Player(seller) => Some((seller, payout)),
            Seller::Vendor(_) => None, // vendors have no balance; burned
        };

        Ok(TradeReceipt {
            order_id,
            good: order.good,
            quantity: order.quantity,
            paid: total,
            seller_payout,
        })
    }

    /// Cancels an own order, returning 100% of the escrow. Fees are not
    /// refunded.
    ///
    /// # Errors
    ///
    /// [`MarketError::OrderNotFound`] or [`MarketError::NotYourOrder`].
    pub fn cancel(
        &mut self,
        who: PlayerId,
        account: &mut Account,
        order_id: OrderId,
    ) -> MarketResult<CancelReceipt> {
        let order = self.orders.get(&order_id).ok_or(MarketError::OrderNotFound)?;
        if order.seller != Seller::Player(who) {
            return Err(MarketError::NotYourOrder);
        }

        let order = self.orders.remove(&order_id).expect("looked up above");
        let returned = Self::return_escrow(&order, account);
        Ok(CancelReceipt { returned })
    }

    /// Modifies an own order: quantity per the asymmetric rule, price
    /// freely within the band. Re-charges the flat listing fee.
    ///
    /// # Errors
    ///
    /// Ownership, cooldown, band, monotonicity and balance errors; the
    /// order and account are unchanged on any of them.
    #[allow(clippy::too_many_lines)]
    pub fn modify(
        &mut self,
        who: PlayerId,
        account: &mut Account,
        order_id: OrderId,
        new_amount: Option<u32>,
        new_price: Option<u64>,
        now: SimTime,
    ) -> MarketResult<ModifyReceipt> {
        let fee = self.config.listing_fee;
        let cooldown = self.config.modify_cooldown_ms;
        let (min_price, max_price) = (self.config.min_price, self.config.max_price);

        let order = self
            .orders
            .get(&order_id)
            .ok_or(MarketError::OrderNotFound)?;
        if order.seller != Seller::Player(who) {
            return Err(MarketError::NotYourOrder);
        }
        if now.saturating_sub(order.last_modified) < cooldown {
            return Err(MarketError::ModifyCooldown);
        }

        let target_amount = new_amount.unwrap_or(order.quantity);
        let target_price = new_price.unwrap_or(order.unit_price);
        if target_amount == 0 {
            return Err(MarketError::InvalidAmount);
        }
        if target_price < min_price || target_price > max_price {
            return Err(MarketError::PriceOutOfBand {
                min: min_price,
                max: max_price,
            });
        }

        match order.order_type {
            OrderType::Sell => {
                if target_amount > order.quantity {
                    return Err(MarketError::SellIncreaseForbidden);
                }
                let returned = order.quantity - target_amount;
                let good = order.good;
                // Only the fee can fail from here on.
                account.charge(fee)?;
                if returned > 0 {
                    match good {
                        Good::Resource(kind) => account.give_resource(kind, returned),
                        Good::Computer(id) | Good::Module(id) => account.give_gear(id, returned),
                    }
                }
            }
            OrderType::Buy => {
                if target_amount < order.quantity {
                    return Err(MarketError::BuyDecreaseForbidden);
                }
                let old_escrow = order.total();
                let new_escrow = u64::from(target_amount) * target_price;
                if new_escrow >= old_escrow {
                    // Fee plus the escrow delta, atomically.
                    account.charge(fee + (new_escrow - old_escrow))?;
                } else {
                    account.charge(fee)?;
                    account.deposit(old_escrow - new_escrow);
                }
            }
        }

        let order = self.orders.get_mut(&order_id).expect("looked up above");
        order.quantity = target_amount;
        order.unit_price = target_price;
        order.last_modified = now;

        Ok(ModifyReceipt {
            new_amount: target_amount,
            new_price: target_price,
            fee,
        })
    }

    /// Removes every expired order. The caller returns each record's
    /// escrow to its originator (vendor escrow is synthetic and simply
    /// vanishes).
    pub fn sweep_expired(&mut self, now: SimTime) -> Vec<ExpiredOrder> {
        let mut expired_ids: Vec<OrderId> = self
            .orders
            .values()
            .filter(|o| now >= o.expires_at)
            .map(|o| o.id)
            .collect();
        expired_ids.sort_unstable();

        expired_ids
            .into_iter()
            .filter_map(|id| self.orders.remove(&id))
            .map(|order| ExpiredOrder { order })
            .collect()
    }

    /// Returns an order's escrow to an account. Used for cancellation
    /// and expiry.
    pub fn return_escrow(order: &MarketOrder, account: &mut Account) -> ReturnedEscrow {
        match order.order_type {
            OrderType::Sell => {
                match order.good {
                    Good::Resource(kind) => account.give_resource(kind, order.quantity),
                    Good::Computer(id) | Good::Module(id) => {
                        account.give_gear(id, order.quantity);
                    }
                }
                ReturnedEscrow::Goods {
                    good: order.good,
                    quantity: order.quantity,
                }
            }
            OrderType::Buy => {
                let amount = order.total();
                account.deposit(amount);
                ReturnedEscrow::Credits { amount }
            }
        }
    }

    /// Builds the anonymized listing plus the requester's own orders.
    ///
    /// Public rows never carry a real seller identity — not for players,
    /// not for vendors. Sorted by item then unit price; own orders by
    /// creation time.
    #[must_use]
    pub fn list_view(
        &self,
        requester: PlayerId,
        filter: Option<ItemType>,
    ) -> (Vec<PublicOrder>, Vec<OwnOrder>) {
        let mut orders: Vec<PublicOrder> = self
            .orders
            .values()
            .filter(|o| filter.map_or(true, |f| o.good.item_type() == f))
            .map(MarketOrder::public_view)
            .collect();
        orders.sort_by(|a, b| {
            (a.item_type, a.item_id, a.price_per_unit).cmp(&(
                b.item_type,
                b.item_id,
                b.price_per_unit,
            ))
        });

        let mut mine: Vec<&MarketOrder> = self
            .orders
            .values()
            .filter(|o| o.seller == Seller::Player(requester))
            .collect();
        mine.sort_by_key(|o| o.created_at);
        let mine = mine.into_iter().map(MarketOrder::own_view).collect();

        (orders, mine)
    }
}
