//! The AI contract (spec.md §4.6): `produce_orders(view) -> orders`.
//!
//! Every concrete strategy is a small zero-field struct implementing this
//! trait, the same "one struct per policy behind one shared trait" shape
//! the teacher uses for `RandomAI`/`SkipAI`. Output is not expected to be
//! strictly legal; the Turn Dispatcher runs it through the Order Validator
//! in keep-valid mode before it ever reaches the Turn Processor.

use common::game::orders::Orders;
use common::game::view::PlayerView;
use rand::RngCore;

pub trait Strategy: Send + Sync {
    fn produce_orders(&self, view: &PlayerView, rng: &mut dyn RngCore) -> Orders;
}
