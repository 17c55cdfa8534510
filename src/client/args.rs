//! Query arguments shared by every delegate.

use sea_orm::{Condition, EntityTrait, Order};

/// Arguments for `find_first` / `find_many`.
#[derive(Debug, Clone)]
pub struct FindArgs<E: EntityTrait> {
    pub filter: Condition,
    pub order_by: Vec<(E::Column, Order)>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
    /// Lock matched rows until the transaction ends.
    pub for_update: bool,
}

impl<E: EntityTrait> Default for FindArgs<E> {
    fn default() -> Self {
        Self {
            filter: Condition::all(),
            order_by: Vec::new(),
            skip: None,
            take: None,
            for_update: false,
        }
    }
}

impl<E: EntityTrait> FindArgs<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = condition;
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }

    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }
}

/// Which aggregates to compute, per column.
#[derive(Debug, Clone)]
pub struct AggregateArgs<E: EntityTrait> {
    pub filter: Condition,
    pub count: bool,
    pub avg: Vec<E::Column>,
    pub sum: Vec<E::Column>,
    pub min: Vec<E::Column>,
    pub max: Vec<E::Column>,
}

impl<E: EntityTrait> Default for AggregateArgs<E> {
    fn default() -> Self {
        Self {
            filter: Condition::all(),
            count: false,
            avg: Vec::new(),
            sum: Vec::new(),
            min: Vec::new(),
            max: Vec::new(),
        }
    }
}

impl<E: EntityTrait> AggregateArgs<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.filter = condition;
        self
    }

    pub fn count(mut self) -> Self {
        self.count = true;
        self
    }

    pub fn avg(mut self, column: E::Column) -> Self {
        self.avg.push(column);
        self
    }

    pub fn sum(mut self, column: E::Column) -> Self {
        self.sum.push(column);
        self
    }

    pub fn min(mut self, column: E::Column) -> Self {
        self.min.push(column);
        self
    }

    pub fn max(mut self, column: E::Column) -> Self {
        self.max.push(column);
        self
    }

    pub(crate) fn is_empty(&self) -> bool {
        !self.count
            && self.avg.is_empty()
            && self.sum.is_empty()
            && self.min.is_empty()
            && self.max.is_empty()
    }
}

/// Arguments for `group_by`.
///
/// `order_by` may only name columns listed in `by`; `skip`/`take` require an
/// explicit `order_by`.
#[derive(Debug, Clone)]
pub struct GroupByArgs<E: EntityTrait> {
    pub by: Vec<E::Column>,
    pub aggregates: AggregateArgs<E>,
    pub having: Option<Condition>,
    pub order_by: Vec<(E::Column, Order)>,
    pub skip: Option<u64>,
    pub take: Option<u64>,
}

impl<E: EntityTrait> GroupByArgs<E> {
    pub fn new(by: Vec<E::Column>) -> Self {
        Self {
            by,
            aggregates: AggregateArgs::default(),
            having: None,
            order_by: Vec::new(),
            skip: None,
            take: None,
        }
    }

    pub fn aggregates(mut self, aggregates: AggregateArgs<E>) -> Self {
        self.aggregates = aggregates;
        self
    }

    pub fn having(mut self, condition: Condition) -> Self {
        self.having = Some(condition);
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order_by.push((column, order));
        self
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = Some(take);
        self
    }
}
