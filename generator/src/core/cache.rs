//! Run-scoped, single-flight memo over a content generator
//!
//! One `OnceCell` per key: the first requester runs the generator, concurrent
//! requesters for the same key await that same initialization, and later
//! requesters read the stored value. Failures are stored too, so a key that
//! failed once stays failed for the rest of the run.

use std::collections::{BTreeMap, HashMap};
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::FutureExt;
use tokio::sync::{Mutex, OnceCell};

use shared::GenerationKey;
use crate::error::{GenerationError, GenerationResult};
use crate::traits::ContentGenerator;

/// Content for one key, shared by every subscriber of that key
pub type SharedContent = Arc<str>;

type Slot = Arc<OnceCell<GenerationResult<SharedContent>>>;

pub struct GenerationCache<G>
where
    G: ContentGenerator,
{
    generator: G,
    slots: Mutex<HashMap<GenerationKey, Slot>>,
    invocations: AtomicUsize,
}

impl<G> GenerationCache<G>
where
    G: ContentGenerator,
{
    pub fn new(generator: G) -> Self {
        Self {
            generator,
            slots: Mutex::new(HashMap::new()),
            invocations: AtomicUsize::new(0),
        }
    }

    /// Content for `key`, generating it at most once for the lifetime of this cache
    pub async fn get_or_generate(&self, key: GenerationKey) -> GenerationResult<SharedContent> {
        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(key).or_default().clone()
        };

        slot.get_or_init(|| self.invoke(key)).await.clone()
    }

    /// Number of underlying generator calls made so far
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Completed results by key. In-flight keys are not included.
    pub async fn results(&self) -> BTreeMap<GenerationKey, GenerationResult<SharedContent>> {
        let slots = self.slots.lock().await;
        slots
            .iter()
            .filter_map(|(key, slot)| slot.get().map(|result| (*key, result.clone())))
            .collect()
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    async fn invoke(&self, key: GenerationKey) -> GenerationResult<SharedContent> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        // A panicking generator must not leave the cell empty, or the next
        // requester would run it again. The call itself sits inside the async
        // block so a panic while building the future is caught as well.
        let generation = async { self.generator.generate(key).await };
        match AssertUnwindSafe(generation).catch_unwind().await {
            Ok(Ok(content)) => Ok(SharedContent::from(content)),
            Ok(Err(e)) => Err(e),
            Err(panic) => Err(GenerationError::Aborted {
                key,
                message: panic_message(panic.as_ref()),
            }),
        }
    }
}

/// Best-effort text of a caught panic payload
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panic".to_string()
    }
}
